//! Sparse row -> column -> cell storage with O(log n) printable-extent
//! queries, backed by `BTreeMap`'s natural key ordering (the ordered index
//! per axis the design calls for, without a side index to keep in sync).

use std::collections::BTreeMap;

use sheet_formula::Position;

use crate::cell::Cell;

#[derive(Default)]
pub(crate) struct SparseGrid {
    rows: BTreeMap<i64, BTreeMap<i64, Cell>>,
}

impl SparseGrid {
    pub(crate) fn new() -> SparseGrid {
        SparseGrid {
            rows: BTreeMap::new(),
        }
    }

    pub(crate) fn get(&self, pos: Position) -> Option<&Cell> {
        self.rows.get(&pos.row)?.get(&pos.col)
    }

    pub(crate) fn get_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.rows.get_mut(&pos.row)?.get_mut(&pos.col)
    }

    pub(crate) fn contains(&self, pos: Position) -> bool {
        self.get(pos).is_some()
    }

    pub(crate) fn insert(&mut self, pos: Position, cell: Cell) {
        self.rows.entry(pos.row).or_default().insert(pos.col, cell);
    }

    pub(crate) fn remove(&mut self, pos: Position) -> Option<Cell> {
        let row = self.rows.get_mut(&pos.row)?;
        let cell = row.remove(&pos.col);
        if row.is_empty() {
            self.rows.remove(&pos.row);
        }
        cell
    }

    /// 1-based `(rows, cols)` tightly bounding every non-empty cell, or
    /// `(0, 0)` when the grid holds nothing.
    pub(crate) fn printable_size(&self) -> (i64, i64) {
        let Some((&max_row, _)) = self.rows.last_key_value() else {
            return (0, 0);
        };
        let max_col = self
            .rows
            .values()
            .filter_map(|row| row.last_key_value().map(|(&col, _)| col))
            .max()
            .unwrap_or(0);
        (max_row + 1, max_col + 1)
    }

    /// Iterate over `(Position, Option<&Cell>)` across the tight printable
    /// rectangle, in row-major, 0-indexed order, for printing.
    pub(crate) fn iter_printable(&self) -> impl Iterator<Item = (Position, Option<&Cell>)> {
        let (rows, cols) = self.printable_size();
        (0..rows).flat_map(move |row| {
            let row_map = self.rows.get(&row);
            (0..cols).map(move |col| {
                let pos = Position::new(row, col);
                (pos, row_map.and_then(|r| r.get(&col)))
            })
        })
    }
}
