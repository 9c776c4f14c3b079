use std::fmt;

/// How an operator consumes its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    /// Takes no value (`null`, `notNull`).
    NoOperand,
    /// Takes a single string value.
    Scalar,
    /// Takes a set of values (`in`, `notIn`).
    Membership,
}

/// A comparison operator a rule can use, identified by name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Operator {
    pub name: String,
    pub label: String,
}

const STANDARD: &[(&str, &str)] = &[
    ("=", "="),
    ("!=", "!="),
    ("<", "<"),
    (">", ">"),
    ("<=", "<="),
    (">=", ">="),
    ("contains", "contains"),
    ("beginsWith", "begins with"),
    ("endsWith", "ends with"),
    ("doesNotContain", "does not contain"),
    ("doesNotBeginWith", "does not begin with"),
    ("doesNotEndWith", "does not end with"),
    ("null", "is null"),
    ("notNull", "is not null"),
    ("in", "in"),
    ("notIn", "not in"),
];

impl Operator {
    #[must_use]
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
        }
    }

    /// The standard operator list used when neither the field nor the catalog
    /// supplies its own.
    #[must_use]
    pub fn standard() -> Vec<Operator> {
        STANDARD
            .iter()
            .map(|(name, label)| Operator::new(name, label))
            .collect()
    }

    #[must_use]
    pub fn kind(&self) -> OperatorKind {
        kind_of(&self.name)
    }
}

/// Classify an operator name. Anything not recognised as no-operand or
/// membership takes a scalar.
#[must_use]
pub fn kind_of(name: &str) -> OperatorKind {
    match name {
        "null" | "notNull" => OperatorKind::NoOperand,
        "in" | "notIn" => OperatorKind::Membership,
        _ => OperatorKind::Scalar,
    }
}

/// Textual symbol for operators written infix in expressions.
pub(crate) fn symbol_of(name: &str) -> Option<&'static str> {
    match name {
        "=" => Some("=="),
        "!=" => Some("!="),
        "<" => Some("<"),
        ">" => Some(">"),
        "<=" => Some("<="),
        ">=" => Some(">="),
        _ => None,
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}
