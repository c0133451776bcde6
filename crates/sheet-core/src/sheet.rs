//! The public façade: a sparse, lazily-evaluated, memoizing spreadsheet.

use std::collections::BTreeSet;

use sheet_formula::{ErrorKind, Position};
use tracing::{debug, warn};

use crate::cell::Cell;
use crate::content::CellContent;
use crate::cycle;
use crate::error::{Result, SheetError};
use crate::grid::SparseGrid;
use crate::value::Value;

/// A sheet: a sparse grid of cells, their dependency graph, and the
/// operations that keep both consistent on every edit.
#[derive(Default)]
pub struct Sheet {
    grid: SparseGrid,
}

impl Sheet {
    pub fn new() -> Sheet {
        Sheet {
            grid: SparseGrid::new(),
        }
    }

    fn validate(pos: Position) -> Result<()> {
        if pos.is_valid() {
            Ok(())
        } else {
            Err(SheetError::InvalidPosition)
        }
    }

    /// Replace the content at `pos`. Either the edit fully applies — content
    /// swapped, graph rewired, downstream caches invalidated — or, on
    /// `ParseError`/`CircularDependency`, the sheet is left byte-for-byte
    /// unchanged.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<()> {
        Self::validate(pos)?;
        let new_content = CellContent::parse(text)?;

        let new_refs_out: BTreeSet<Position> = new_content
            .references()
            .iter()
            .copied()
            .filter(Position::is_valid)
            .collect();

        if !new_refs_out.is_empty() && cycle::would_cycle(&self.grid, pos, &new_refs_out) {
            warn!(?pos, "rejected edit that would introduce a circular dependency");
            return Err(SheetError::CircularDependency);
        }

        for &referenced in &new_refs_out {
            if !self.grid.contains(referenced) {
                debug!(?referenced, from = ?pos, "materializing referenced cell as empty");
                self.grid.insert(referenced, Cell::empty());
            }
        }
        if !self.grid.contains(pos) {
            self.grid.insert(pos, Cell::empty());
        }

        let old_refs_out = {
            let cell = self.grid.get_mut(pos).expect("just materialized above");
            let old = std::mem::take(&mut cell.refs_out);
            cell.content = new_content;
            cell.cache = None;
            old
        };

        self.invalidate_downstream(pos);

        for old in &old_refs_out {
            if let Some(c) = self.grid.get_mut(*old) {
                c.refs_in.remove(&pos);
            }
        }
        for &new in &new_refs_out {
            if let Some(c) = self.grid.get_mut(new) {
                c.refs_in.insert(pos);
            }
        }
        self.grid.get_mut(pos).expect("materialized above").refs_out = new_refs_out;

        Ok(())
    }

    /// Reset `pos` to `Empty`, dropping its out-edges and invalidating
    /// downstream caches. The cell itself is only dropped from the grid if
    /// nothing still depends on it.
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        Self::validate(pos)?;
        if !self.grid.contains(pos) {
            return Ok(());
        }

        let old_refs_out = {
            let cell = self.grid.get_mut(pos).expect("checked contains above");
            let old = std::mem::take(&mut cell.refs_out);
            cell.content = CellContent::Empty;
            cell.cache = None;
            old
        };

        for old in &old_refs_out {
            if let Some(c) = self.grid.get_mut(*old) {
                c.refs_in.remove(&pos);
            }
        }

        self.invalidate_downstream(pos);

        if self.grid.get(pos).is_some_and(Cell::is_droppable) {
            self.grid.remove(pos);
        }

        Ok(())
    }

    /// The memoized or freshly computed value at `pos`.
    pub fn value(&mut self, pos: Position) -> Result<Value> {
        Self::validate(pos)?;
        Ok(self.compute_value(pos))
    }

    /// The textual form of the cell at `pos` (`""` if absent).
    pub fn text(&self, pos: Position) -> Result<String> {
        Self::validate(pos)?;
        Ok(self.grid.get(pos).map(Cell::text).unwrap_or_default())
    }

    /// Positions referenced by the formula at `pos`, ascending and unique.
    pub fn references(&self, pos: Position) -> Result<Vec<Position>> {
        Self::validate(pos)?;
        Ok(self.grid.get(pos).map(Cell::references).unwrap_or_default())
    }

    /// Whether any other cell's formula reads `pos`.
    pub fn is_referenced(&self, pos: Position) -> Result<bool> {
        Self::validate(pos)?;
        Ok(self.grid.get(pos).map(Cell::is_referenced).unwrap_or(false))
    }

    /// Read-only access to the underlying cell, if materialized.
    pub fn cell(&self, pos: Position) -> Result<Option<&Cell>> {
        Self::validate(pos)?;
        Ok(self.grid.get(pos))
    }

    /// `(rows, cols)`, 1-based, tightly bounding every non-empty cell;
    /// `(0, 0)` for an empty sheet.
    pub fn printable_size(&self) -> (i64, i64) {
        self.grid.printable_size()
    }

    /// Render the sheet's values over its printable extent: tab-separated,
    /// one line per row.
    pub fn print_values(&mut self) -> String {
        let (_, cols) = self.grid.printable_size();
        let positions: Vec<(Position, bool)> = self
            .grid
            .iter_printable()
            .map(|(pos, cell)| (pos, cell.is_some()))
            .collect();

        let mut out = String::new();
        for (pos, present) in positions {
            if present {
                out.push_str(&self.compute_value(pos).to_string());
            }
            if pos.col + 1 < cols {
                out.push('\t');
            } else {
                out.push('\n');
            }
        }
        out
    }

    /// Render the sheet's raw texts over its printable extent: tab-separated,
    /// one line per row.
    pub fn print_texts(&self) -> String {
        let (_, cols) = self.grid.printable_size();
        let mut out = String::new();
        for (pos, cell) in self.grid.iter_printable() {
            if let Some(cell) = cell {
                out.push_str(&cell.text());
            }
            if pos.col + 1 < cols {
                out.push('\t');
            } else {
                out.push('\n');
            }
        }
        out
    }

    /// Forward BFS along `refs_in`, starting at `pos`'s direct dependents
    /// (`pos`'s own cache was already cleared by the caller), clearing every
    /// visited cell's cache. The visited set bounds the walk even though the
    /// traversal fans out; invariant I2 guarantees it terminates.
    fn invalidate_downstream(&mut self, pos: Position) {
        let mut visited = BTreeSet::new();
        let mut stack: Vec<Position> = self
            .grid
            .get(pos)
            .map(|c| c.refs_in.iter().copied().collect())
            .unwrap_or_default();

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(cell) = self.grid.get_mut(current) {
                cell.cache = None;
                stack.extend(cell.refs_in.iter().copied());
            }
        }
    }

    fn compute_value(&mut self, pos: Position) -> Value {
        if let Some(cached) = self.grid.get(pos).and_then(|c| c.cache.clone()) {
            return cached;
        }
        let Some(content) = self.grid.get(pos).map(|c| c.content.clone()) else {
            return Value::text("");
        };

        let value = content.value(&mut |referenced| self.resolve_number(referenced));

        if let Some(cell) = self.grid.get_mut(pos) {
            cell.cache = Some(value.clone());
        }
        value
    }

    fn resolve_number(&mut self, pos: Position) -> std::result::Result<f64, ErrorKind> {
        if !pos.is_valid() {
            return Err(ErrorKind::Ref);
        }
        if !self.grid.contains(pos) {
            return Ok(0.0);
        }
        match self.compute_value(pos) {
            Value::Number(n) => Ok(n),
            Value::Text(s) if s.is_empty() => Ok(0.0),
            Value::Text(s) => s.parse::<f64>().map_err(|_| ErrorKind::Value),
            Value::Error(kind) => Err(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: i64, col: i64) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn literal_arithmetic() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos(0, 0), "=1+2*3").unwrap();
        assert_eq!(sheet.value(pos(0, 0)).unwrap(), Value::Number(7.0));
        assert_eq!(sheet.text(pos(0, 0)).unwrap(), "=1+2*3");
    }

    #[test]
    fn reference_chain_invalidates_on_upstream_change() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos(0, 0), "10").unwrap(); // A1
        sheet.set_cell(pos(0, 1), "=A1+5").unwrap(); // B1
        sheet.set_cell(pos(0, 2), "=B1*2").unwrap(); // C1
        assert_eq!(sheet.value(pos(0, 2)).unwrap(), Value::Number(30.0));

        sheet.set_cell(pos(0, 0), "20").unwrap();
        assert!(sheet.cell(pos(0, 1)).unwrap().unwrap().cached_value().is_none());
        assert!(sheet.cell(pos(0, 2)).unwrap().unwrap().cached_value().is_none());
        assert_eq!(sheet.value(pos(0, 2)).unwrap(), Value::Number(50.0));
    }

    #[test]
    fn cycle_is_rejected_and_state_is_unchanged() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos(0, 0), "=B1").unwrap(); // A1
        sheet.set_cell(pos(0, 1), "=C1").unwrap(); // B1
        let before = sheet.print_texts();

        let err = sheet.set_cell(pos(0, 2), "=A1").unwrap_err(); // C1
        assert_eq!(err, SheetError::CircularDependency);
        assert_eq!(sheet.print_texts(), before);
        assert_eq!(sheet.value(pos(0, 0)).unwrap(), Value::Number(0.0));
    }

    #[test]
    fn self_reference_is_rejected() {
        let mut sheet = Sheet::new();
        let err = sheet.set_cell(pos(0, 0), "=A1").unwrap_err();
        assert_eq!(err, SheetError::CircularDependency);
    }

    #[test]
    fn reference_to_absent_cell_materializes_it_as_empty() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos(0, 0), "=B1").unwrap();
        assert_eq!(sheet.value(pos(0, 0)).unwrap(), Value::Number(0.0));
        assert!(sheet.cell(pos(0, 1)).unwrap().is_some());
    }

    #[test]
    fn value_coercion_failure_is_a_value_error() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos(0, 0), "hello").unwrap();
        sheet.set_cell(pos(0, 1), "=A1+1").unwrap();
        assert_eq!(
            sheet.value(pos(0, 1)).unwrap(),
            Value::Error(ErrorKind::Value)
        );
    }

    #[test]
    fn division_by_zero_propagates_through_dependents() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos(0, 0), "=1/0").unwrap();
        sheet.set_cell(pos(0, 1), "=A1+2").unwrap();
        assert_eq!(sheet.value(pos(0, 0)).unwrap(), Value::Error(ErrorKind::Div0));
        assert_eq!(sheet.value(pos(0, 1)).unwrap(), Value::Error(ErrorKind::Div0));
    }

    #[test]
    fn clear_collapses_to_empty_text() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos(0, 0), "hello").unwrap();
        sheet.clear_cell(pos(0, 0)).unwrap();
        assert_eq!(sheet.value(pos(0, 0)).unwrap(), Value::text(""));
    }

    #[test]
    fn clear_keeps_cell_alive_while_still_referenced() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos(0, 0), "10").unwrap();
        sheet.set_cell(pos(0, 1), "=A1").unwrap();
        sheet.clear_cell(pos(0, 0)).unwrap();
        assert!(sheet.cell(pos(0, 0)).unwrap().is_some());
        assert_eq!(sheet.value(pos(0, 1)).unwrap(), Value::Number(0.0));
    }

    #[test]
    fn clear_drops_unreferenced_cell_from_the_grid() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos(0, 0), "10").unwrap();
        sheet.clear_cell(pos(0, 0)).unwrap();
        assert!(sheet.cell(pos(0, 0)).unwrap().is_none());
        assert_eq!(sheet.printable_size(), (0, 0));
    }

    #[test]
    fn escape_sigil_round_trips() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos(0, 0), "'=1+1").unwrap();
        assert_eq!(sheet.value(pos(0, 0)).unwrap(), Value::text("=1+1"));
        assert_eq!(sheet.text(pos(0, 0)).unwrap(), "'=1+1");
    }

    #[test]
    fn set_is_idempotent() {
        let mut once = Sheet::new();
        once.set_cell(pos(0, 0), "=1+2").unwrap();

        let mut twice = Sheet::new();
        twice.set_cell(pos(0, 0), "=1+2").unwrap();
        twice.set_cell(pos(0, 0), "=1+2").unwrap();

        assert_eq!(once.print_texts(), twice.print_texts());
        assert_eq!(
            once.value(pos(0, 0)).unwrap(),
            twice.value(pos(0, 0)).unwrap()
        );
    }

    #[test]
    fn malformed_formula_leaves_cell_untouched() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos(0, 0), "42").unwrap();
        let err = sheet.set_cell(pos(0, 0), "=1+").unwrap_err();
        assert!(matches!(err, SheetError::ParseError(_)));
        assert_eq!(sheet.text(pos(0, 0)).unwrap(), "42");
    }

    #[test]
    fn invalid_position_is_rejected_without_state_change() {
        let mut sheet = Sheet::new();
        let bad = Position::new(-1, 0);
        assert_eq!(sheet.set_cell(bad, "1").unwrap_err(), SheetError::InvalidPosition);
        assert_eq!(sheet.value(bad).unwrap_err(), SheetError::InvalidPosition);
    }

    #[test]
    fn printable_size_is_zero_for_empty_sheet() {
        let sheet = Sheet::new();
        assert_eq!(sheet.printable_size(), (0, 0));
    }

    #[test]
    fn is_referenced_reflects_dependents() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos(0, 0), "10").unwrap();
        assert!(!sheet.is_referenced(pos(0, 0)).unwrap());
        sheet.set_cell(pos(0, 1), "=A1").unwrap();
        assert!(sheet.is_referenced(pos(0, 0)).unwrap());
    }
}
