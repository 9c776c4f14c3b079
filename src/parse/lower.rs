use crate::types::{Combinator, Node, RuleGroup};

use super::expr::Expr;

/// Turn a parsed expression into a rule tree.
///
/// Each parenthesized expression becomes a group. A whole input of the form
/// `NOT (...)` negates the root itself.
pub(crate) fn lower(expr: Expr) -> RuleGroup {
    match expr {
        Expr::Paren { not: true, inner } => body(*inner, true),
        other => body(other, false),
    }
}

/// The group whose body is `expr`.
fn body(expr: Expr, not: bool) -> RuleGroup {
    let mut group = match expr {
        Expr::Or(terms) => chain(Combinator::Or, terms),
        Expr::And(terms) => chain(Combinator::And, terms),
        Expr::Literal(true) => RuleGroup::and(),
        Expr::Literal(false) => RuleGroup::or(),
        single => {
            let mut g = RuleGroup::and();
            g.rules.push(node(single));
            g
        }
    };
    group.not = not;
    group
}

/// A chain's operands become the group's children. Identity literals
/// (`true` under AND, `false` under OR) contribute nothing and are dropped.
fn chain(combinator: Combinator, terms: Vec<Expr>) -> RuleGroup {
    let identity = combinator == Combinator::And;
    let mut group = RuleGroup::new(combinator);
    group.rules = terms
        .into_iter()
        .filter(|t| !matches!(t, Expr::Literal(b) if *b == identity))
        .map(node)
        .collect();
    group
}

fn node(expr: Expr) -> Node {
    match expr {
        Expr::Compare(rule) => Node::Rule(rule),
        Expr::Paren { not, inner } => Node::Group(body(*inner, not)),
        // An AND chain directly under an OR chain, or a constant in a
        // non-identity position.
        other => Node::Group(body(other, false)),
    }
}
