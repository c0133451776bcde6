//! The polymorphic content stored in a cell: `Empty` / `Text` / `Formula`.

use sheet_formula::{Ast, ErrorKind, ParseError, Position};

use crate::value::Value;

const ESCAPE_SIGN: char = '\'';
const FORMULA_SIGN: char = '=';

/// One of the three kinds of content a cell can hold.
#[derive(Clone, Debug)]
pub enum CellContent {
    Empty,
    Text(String),
    Formula { ast: Ast, canonical: String },
}

impl CellContent {
    /// Classify and build content from raw user input.
    ///
    /// - `""` -> `Empty`
    /// - starts with `=` and has at least one following character -> `Formula`
    /// - anything else -> `Text` (a lone `"="` is text, not a formula)
    pub fn parse(input: &str) -> Result<CellContent, ParseError> {
        if input.is_empty() {
            return Ok(CellContent::Empty);
        }
        if input.len() >= 2 && input.starts_with(FORMULA_SIGN) {
            let body = &input[FORMULA_SIGN.len_utf8()..];
            let ast = Ast::parse(body)?;
            let canonical = ast.to_canonical_string();
            return Ok(CellContent::Formula { ast, canonical });
        }
        Ok(CellContent::Text(input.to_string()))
    }

    /// The textual form as it would be re-entered (`CellContent.text` in the
    /// spec): raw text for `Text`, `"=" + canonical` for `Formula`.
    pub fn text(&self) -> String {
        match self {
            CellContent::Empty => String::new(),
            CellContent::Text(s) => s.clone(),
            CellContent::Formula { canonical, .. } => format!("{FORMULA_SIGN}{canonical}"),
        }
    }

    /// Positions this content's formula references, ascending and unique.
    /// Empty for non-formula content.
    pub fn references(&self) -> &[Position] {
        match self {
            CellContent::Formula { ast, .. } => ast.cells(),
            _ => &[],
        }
    }

    /// Evaluate this content, resolving referenced positions through
    /// `resolver`. Formula errors are caught here and embedded as
    /// `Value::Error` — this method never fails.
    pub fn value(&self, resolver: &mut dyn FnMut(Position) -> Result<f64, ErrorKind>) -> Value {
        match self {
            CellContent::Empty => Value::text(""),
            CellContent::Text(s) => match s.strip_prefix(ESCAPE_SIGN) {
                Some(escaped) => Value::text(escaped),
                None => Value::text(s.clone()),
            },
            CellContent::Formula { ast, .. } => match ast.execute(resolver) {
                Ok(n) => Value::Number(n),
                Err(kind) => Value::Error(kind),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellContent::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero(_: Position) -> Result<f64, ErrorKind> {
        Ok(0.0)
    }

    #[test]
    fn empty_string_is_empty_content() {
        let c = CellContent::parse("").unwrap();
        assert!(matches!(c, CellContent::Empty));
        assert_eq!(c.text(), "");
        assert_eq!(c.value(&mut zero), Value::text(""));
    }

    #[test]
    fn lone_equals_sign_is_text_not_formula() {
        let c = CellContent::parse("=").unwrap();
        assert!(matches!(c, CellContent::Text(_)));
        assert_eq!(c.text(), "=");
    }

    #[test]
    fn plain_text_round_trips() {
        let c = CellContent::parse("hello").unwrap();
        assert_eq!(c.text(), "hello");
        assert_eq!(c.value(&mut zero), Value::text("hello"));
    }

    #[test]
    fn escape_sigil_is_preserved_in_text_and_stripped_in_value() {
        let c = CellContent::parse("'=1+1").unwrap();
        assert_eq!(c.text(), "'=1+1");
        assert_eq!(c.value(&mut zero), Value::text("=1+1"));
    }

    #[test]
    fn formula_is_parsed_and_references_extracted() {
        let c = CellContent::parse("=A1+B2*2").unwrap();
        assert_eq!(c.text(), "=A1+B2*2");
        assert_eq!(
            c.references(),
            &[Position::new(0, 0), Position::new(1, 1)]
        );
    }

    #[test]
    fn malformed_formula_is_rejected() {
        assert!(CellContent::parse("=1+").is_err());
    }

    #[test]
    fn formula_evaluates_via_resolver() {
        let c = CellContent::parse("=A1+1").unwrap();
        let mut resolver = |_: Position| Ok(9.0);
        assert_eq!(c.value(&mut resolver), Value::Number(10.0));
    }
}
