use crate::types::Rule;

/// Expression tree produced by the grammar, before grouping is resolved.
///
/// `Paren` records explicit parentheses (and an optional `NOT` in front of
/// them); `And`/`Or` hold two or more operands each.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Compare(Rule),
    Literal(bool),
    Paren { not: bool, inner: Box<Expr> },
    And(Vec<Expr>),
    Or(Vec<Expr>),
}
