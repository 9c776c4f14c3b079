use std::collections::HashMap;

use super::operator::Operator;

/// A selectable value for a field, shown in membership pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueOption {
    pub name: String,
    pub label: String,
}

impl ValueOption {
    #[must_use]
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
        }
    }
}

/// A field rules can filter on.
///
/// `group` is the source category the field belongs to and only drives how the
/// field selector groups its options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Field {
    pub name: String,
    pub label: String,
    #[cfg_attr(feature = "serde", serde(rename = "groupTitle", default))]
    pub group: String,
    #[cfg_attr(feature = "serde", serde(rename = "values", default))]
    pub value_options: Vec<ValueOption>,
    /// Operators legal for this field. `None` defers to the catalog's list.
    #[cfg_attr(feature = "serde", serde(default))]
    pub operators: Option<Vec<Operator>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub default_operator: Option<String>,
    /// Whether a blank scalar value counts as valid.
    #[cfg_attr(feature = "serde", serde(default))]
    pub allow_empty_value: bool,
}

impl Field {
    #[must_use]
    pub fn new(name: &str, label: &str, group: &str) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
            group: group.to_owned(),
            value_options: Vec::new(),
            operators: None,
            default_operator: None,
            allow_empty_value: false,
        }
    }

    #[must_use]
    pub fn with_values(mut self, options: impl IntoIterator<Item = ValueOption>) -> Self {
        self.value_options = options.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_operators(mut self, operators: impl IntoIterator<Item = Operator>) -> Self {
        self.operators = Some(operators.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_default_operator(mut self, name: &str) -> Self {
        self.default_operator = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty_value = true;
        self
    }
}

/// The read-only set of fields available to a session, in the order the
/// field catalog supplied them.
///
/// Lookups by name go through an index built once at construction.
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
    operators: Vec<Operator>,
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FieldCatalog {
    /// Build a catalog using the standard operator list as the fallback for
    /// fields that declare no operators. A repeated name keeps its first
    /// definition.
    #[must_use]
    pub fn new(fields: Vec<Field>) -> Self {
        Self::with_operators(fields, Operator::standard())
    }

    #[must_use]
    pub fn with_operators(fields: Vec<Field>, operators: Vec<Operator>) -> Self {
        let mut index = HashMap::new();
        let mut kept = Vec::with_capacity(fields.len());
        for field in fields {
            if index.contains_key(&field.name) {
                continue;
            }
            index.insert(field.name.clone(), kept.len());
            kept.push(field);
        }
        Self {
            fields: kept,
            index,
            operators,
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&idx| &self.fields[idx])
    }

    /// The operators legal for `field`.
    #[must_use]
    pub fn operators_for<'a>(&'a self, field: &'a Field) -> &'a [Operator] {
        field.operators.as_deref().unwrap_or(&self.operators)
    }

    /// The operator a rule gets when its field is selected: the declared
    /// default if it is legal, otherwise the first legal operator.
    #[must_use]
    pub fn default_operator<'a>(&'a self, field: &'a Field) -> Option<&'a Operator> {
        let legal = self.operators_for(field);
        field
            .default_operator
            .as_deref()
            .and_then(|name| legal.iter().find(|op| op.name == name))
            .or_else(|| legal.first())
    }

    #[must_use]
    pub fn is_legal(&self, field: &Field, operator: &str) -> bool {
        self.operators_for(field).iter().any(|op| op.name == operator)
    }

    #[must_use]
    pub fn first(&self) -> Option<&Field> {
        self.fields.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }
}
