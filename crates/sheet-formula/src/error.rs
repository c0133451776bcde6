//! Error types for the formula lexer, parser and evaluator.

use thiserror::Error;

/// A formula failed to parse. The cell's prior content is left untouched by
/// callers — parsing happens before any state is committed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("formula parse error: {0}")]
pub struct ParseError(pub String);

impl ParseError {
    pub fn new(message: impl Into<String>) -> ParseError {
        ParseError(message.into())
    }
}

/// The category of a formula evaluation failure. Also doubles as the
/// embedded payload of `Value::Error` — a computational error is data, not
/// an out-of-band exception (see the crate's cache/resolver contract).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced position was outside the sheet's addressable bounds.
    #[error("#REF!")]
    Ref,
    /// A referenced cell's text could not be coerced to a number.
    #[error("#VALUE!")]
    Value,
    /// Division by zero.
    #[error("#DIV/0!")]
    Div0,
    /// An arithmetic result was not finite (e.g. NaN, overflow).
    #[error("#ARITHM!")]
    Arithmetic,
}
