//! Rendering of rule trees as textual filter expressions.
//!
//! Every nested group is parenthesized and a negated group is written
//! `NOT (...)`; the root is written bare. A few shapes have no direct textual
//! form and are written with the identity element of their combinator:
//!
//! - an empty group is `true` (AND) or `false` (OR),
//! - an OR group with a single child is `child OR false`,
//! - a plain AND root whose only child is a negated group is
//!   `NOT (...) AND true`, so it is not read back as a negated root.
//!
//! The parser drops those identities again, which makes
//! `parse(&to_text(tree))` reproduce `tree` exactly.

use std::fmt::{self, Write};

use crate::parse::KEYWORDS;
use crate::types::{kind_of, symbol_of, Combinator, Node, OperatorKind, Rule, RuleGroup, RuleValue};

/// Render `tree` as a textual expression.
#[must_use]
pub fn to_text(tree: &RuleGroup) -> String {
    tree.to_string()
}

impl fmt::Display for RuleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.not {
            f.write_str("NOT (")?;
            write_body(f, self)?;
            return f.write_char(')');
        }
        write_body(f, self)?;
        let lone_negated_group = matches!(self.rules.as_slice(), [Node::Group(g)] if g.not);
        if self.combinator == Combinator::And && lone_negated_group {
            f.write_str(" AND true")?;
        }
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_name(f, &self.field)?;
        match self.operator.as_str() {
            "null" => return f.write_str(" is null"),
            "notNull" => return f.write_str(" is not null"),
            _ => {}
        }
        f.write_char(' ')?;
        match symbol_of(&self.operator) {
            Some(sym) => f.write_str(sym)?,
            None => write_name(f, &self.operator)?,
        }
        f.write_char(' ')?;
        match (kind_of(&self.operator), &self.value) {
            (OperatorKind::Membership, RuleValue::List(items)) => write_list(f, items),
            (OperatorKind::Membership, RuleValue::Scalar(s)) => {
                write_list(f, std::slice::from_ref(s))
            }
            (_, RuleValue::Scalar(s)) => write_string(f, s),
            (_, RuleValue::List(items)) => write_string(f, &items.join(",")),
        }
    }
}

fn write_body(f: &mut fmt::Formatter<'_>, group: &RuleGroup) -> fmt::Result {
    let joiner = match group.combinator {
        Combinator::And => " AND ",
        Combinator::Or => " OR ",
    };
    if group.rules.is_empty() {
        return f.write_str(match group.combinator {
            Combinator::And => "true",
            Combinator::Or => "false",
        });
    }
    for (i, child) in group.rules.iter().enumerate() {
        if i > 0 {
            f.write_str(joiner)?;
        }
        match child {
            Node::Rule(r) => write!(f, "{r}")?,
            Node::Group(g) => {
                f.write_str(if g.not { "NOT (" } else { "(" })?;
                write_body(f, g)?;
                f.write_char(')')?;
            }
        }
    }
    if group.combinator == Combinator::Or && group.rules.len() == 1 {
        f.write_str(" OR false")?;
    }
    Ok(())
}

/// Whether `name` can be written without backticks.
pub(crate) fn is_plain_ident(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        && !KEYWORDS.contains(&name)
}

fn write_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if is_plain_ident(name) {
        return f.write_str(name);
    }
    f.write_char('`')?;
    for c in name.chars() {
        match c {
            '`' => f.write_str("\\`")?,
            '\\' => f.write_str("\\\\")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('`')
}

fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[String]) -> fmt::Result {
    f.write_char('[')?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_string(f, item)?;
    }
    f.write_char(']')
}
