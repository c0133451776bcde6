//! A cell: content plus dependency-graph metadata.
//!
//! A `Cell` is inert data. All edit orchestration — cycle checks, cache
//! invalidation, edge rewiring — lives on [`crate::Sheet`], which owns every
//! cell and addresses its neighbours by [`Position`] rather than by pointer.
//! That indirection is what lets `refs_out`/`refs_in` form a relation that
//! is cyclic at the data level (A points at B, B points back at A) while the
//! directed graph they encode stays a DAG (see invariant I2 in the design
//! notes) without Rust ever needing `Rc<RefCell<_>>` back-edges.

use std::collections::BTreeSet;

use sheet_formula::Position;

use crate::content::CellContent;
use crate::value::Value;

#[derive(Clone, Debug)]
pub struct Cell {
    pub(crate) content: CellContent,
    /// Positions this cell's formula reads.
    pub(crate) refs_out: BTreeSet<Position>,
    /// Positions whose formulas read this cell.
    pub(crate) refs_in: BTreeSet<Position>,
    pub(crate) cache: Option<Value>,
}

impl Cell {
    pub(crate) fn empty() -> Cell {
        Cell {
            content: CellContent::Empty,
            refs_out: BTreeSet::new(),
            refs_in: BTreeSet::new(),
            cache: None,
        }
    }

    /// A cell the sparse grid is allowed to drop: no content worth keeping,
    /// and nothing still depends on it.
    pub(crate) fn is_droppable(&self) -> bool {
        self.content.is_empty() && self.refs_in.is_empty()
    }

    pub fn content(&self) -> &CellContent {
        &self.content
    }

    pub fn text(&self) -> String {
        self.content.text()
    }

    pub fn references(&self) -> Vec<Position> {
        self.refs_out.iter().copied().collect()
    }

    pub fn is_referenced(&self) -> bool {
        !self.refs_in.is_empty()
    }

    pub fn cached_value(&self) -> Option<&Value> {
        self.cache.as_ref()
    }
}
