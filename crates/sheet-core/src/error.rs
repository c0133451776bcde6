//! Error types for the sheet document model.

use thiserror::Error;

pub use sheet_formula::ParseError as FormulaParseError;

/// Errors that can occur while editing or loading a sheet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    #[error("position out of bounds")]
    InvalidPosition,

    #[error(transparent)]
    ParseError(#[from] FormulaParseError),

    #[error("circular dependency detected")]
    CircularDependency,
}

pub type Result<T> = std::result::Result<T, SheetError>;

/// Errors from the plain-text import/export helpers (`storage`). Kept
/// separate from `SheetError`: these are ambient I/O plumbing around the
/// engine, not structural edit failures.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("row {row} column {col}: {source}")]
    Cell {
        row: usize,
        col: usize,
        #[source]
        source: SheetError,
    },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;
