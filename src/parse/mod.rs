mod error;
mod expr;
mod grammar;
mod lower;

pub use error::ParseError;
pub(crate) use grammar::KEYWORDS;

use crate::types::RuleGroup;

/// Parse a textual filter expression into a rule tree.
///
/// Blank input yields an empty `AND` group. Node ids of the returned tree are
/// unassigned until the tree is installed in a session.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a well-formed expression.
pub fn parse(input: &str) -> Result<RuleGroup, ParseError> {
    use winnow::Parser;
    let expr = grammar::query
        .parse(input)
        .map_err(|e| ParseError::new(e.offset(), e.to_string()))?;
    Ok(match expr {
        Some(expr) => lower::lower(expr),
        None => RuleGroup::and(),
    })
}
