mod error;
mod grammar;

pub use error::ParseError;

use winnow::Parser;

use crate::Expr;

/// Parse expression text into an [`Expr`].
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a single well-formed expression.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    grammar::parse_expression
        .parse(input)
        .map_err(|e| ParseError::at(e.offset(), e.inner().to_string()))
}
