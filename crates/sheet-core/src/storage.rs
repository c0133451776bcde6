//! Plain-text tab-separated import/export: a best-effort bridge for the CLI,
//! not a durable persistence format.

use std::io::Write;
use std::path::Path;

use sheet_formula::Position;

use crate::error::{StorageError, StorageResult};
use crate::sheet::Sheet;

/// Load a sheet from a tab-separated plain-text file. Each line is a row;
/// each tab-delimited field is set verbatim into the corresponding cell via
/// [`Sheet::set_cell`] (so a field like `=A1+1` is parsed as a formula, not
/// frozen as its evaluated value). Empty fields are skipped, leaving the
/// cell absent rather than materializing it.
pub fn import(path: &Path) -> StorageResult<Sheet> {
    let content = std::fs::read_to_string(path)?;
    let mut sheet = Sheet::new();

    for (row, line) in content.lines().enumerate() {
        for (col, field) in line.split('\t').enumerate() {
            if field.is_empty() {
                continue;
            }
            let pos = Position::new(row as i64, col as i64);
            sheet
                .set_cell(pos, field)
                .map_err(|source| StorageError::Cell { row, col, source })?;
        }
    }

    Ok(sheet)
}

/// Export a sheet's evaluated values to a tab-separated plain-text file,
/// over its printable extent.
pub fn export_values(path: &Path, sheet: &mut Sheet) -> StorageResult<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(sheet.print_values().as_bytes())?;
    Ok(())
}

/// Export a sheet's raw cell texts (formulas uncomputed) to a tab-separated
/// plain-text file, over its printable extent.
pub fn export_texts(path: &Path, sheet: &Sheet) -> StorageResult<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(sheet.print_texts().as_bytes())?;
    Ok(())
}
