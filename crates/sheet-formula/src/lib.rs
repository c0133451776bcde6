//! Formula lexer, parser, AST and evaluator.
//!
//! This crate is a fixed-contract collaborator for the cell dependency graph
//! in `sheet-core`: it turns a formula body into an [`Ast`] that can report
//! the positions it references, be executed against a resolver, and be
//! re-serialized in canonical form. It knows nothing about sheets, cells, or
//! caching — those concerns live entirely in `sheet-core`.

mod ast;
mod error;
mod lexer;
mod parser;
mod position;

pub use error::{ErrorKind, ParseError};
pub use position::{Position, MAX_COLS, MAX_ROWS};

pub use ast::Resolver;

/// A parsed formula: an expression tree plus the positions it references,
/// computed once at parse time.
#[derive(Clone, Debug, PartialEq)]
pub struct Ast {
    root: ast::Expr,
    cells: Vec<Position>,
}

impl Ast {
    /// Parse a formula body (the text *after* the leading `=`).
    pub fn parse(body: &str) -> Result<Ast, ParseError> {
        let root = parser::parse(body)?;
        let mut cells = Vec::new();
        root.collect_cells(&mut cells);
        cells.sort();
        cells.dedup();
        Ok(Ast { root, cells })
    }

    /// Positions referenced by this formula, ascending and unique.
    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    /// Evaluate the tree, resolving referenced cells through `resolver`.
    pub fn execute(&self, resolver: &mut Resolver) -> Result<f64, ErrorKind> {
        self.root.execute(resolver)
    }

    /// Canonical re-serialization: parentheses minimized, semantics preserved.
    pub fn to_canonical_string(&self) -> String {
        let mut out = String::new();
        self.root.write_canonical(&mut out);
        out
    }
}
