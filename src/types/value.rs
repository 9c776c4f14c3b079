use std::fmt;

use super::operator::OperatorKind;

/// The operand of a rule: one string, or an ordered list of strings for
/// membership operators.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RuleValue {
    Scalar(String),
    List(Vec<String>),
}

impl Default for RuleValue {
    fn default() -> Self {
        RuleValue::Scalar(String::new())
    }
}

impl RuleValue {
    /// The cleared value for an operator of the given kind.
    #[must_use]
    pub fn empty_for(kind: OperatorKind) -> Self {
        match kind {
            OperatorKind::Membership => RuleValue::List(Vec::new()),
            OperatorKind::Scalar | OperatorKind::NoOperand => RuleValue::default(),
        }
    }

    /// Convert into the shape an operator of `kind` expects, keeping as much
    /// of the entered text as the target shape can hold.
    ///
    /// A scalar becomes a one-element list (or an empty list when blank); a
    /// list becomes its entries joined with `,`. No-operand operators always
    /// get an empty scalar. Lists come out deduplicated.
    #[must_use]
    pub fn coerce(self, kind: OperatorKind) -> Self {
        match (kind, self) {
            (OperatorKind::NoOperand, _) => RuleValue::default(),
            (OperatorKind::Scalar, RuleValue::Scalar(s)) => RuleValue::Scalar(s),
            (OperatorKind::Scalar, RuleValue::List(items)) => RuleValue::Scalar(items.join(",")),
            (OperatorKind::Membership, RuleValue::Scalar(s)) if s.is_empty() => {
                RuleValue::List(Vec::new())
            }
            (OperatorKind::Membership, RuleValue::Scalar(s)) => RuleValue::List(vec![s]),
            (OperatorKind::Membership, RuleValue::List(items)) => RuleValue::List(dedup(items)),
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            RuleValue::Scalar(s) => Some(s),
            RuleValue::List(_) => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            RuleValue::List(items) => Some(items),
            RuleValue::Scalar(_) => None,
        }
    }

    /// Whether the value carries no text at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            RuleValue::Scalar(s) => s.is_empty(),
            RuleValue::List(items) => items.is_empty(),
        }
    }
}

/// Remove repeated entries, keeping the first occurrence of each.
#[must_use]
pub fn dedup(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

impl From<&str> for RuleValue {
    fn from(v: &str) -> Self {
        RuleValue::Scalar(v.to_owned())
    }
}

impl From<String> for RuleValue {
    fn from(v: String) -> Self {
        RuleValue::Scalar(v)
    }
}

impl From<Vec<String>> for RuleValue {
    fn from(v: Vec<String>) -> Self {
        RuleValue::List(v)
    }
}

impl From<&[&str]> for RuleValue {
    fn from(v: &[&str]) -> Self {
        RuleValue::List(v.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RuleValue {
    fn from(v: [&str; N]) -> Self {
        RuleValue::List(v.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleValue::Scalar(v) => write!(f, "{v}"),
            RuleValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}
