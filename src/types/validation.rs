use std::collections::HashMap;

use thiserror::Error;

use super::tree::NodeId;

/// Why a rule failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationReason {
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    #[error("unsupported operator '{operator}' for field '{field}'")]
    UnsupportedOperator { field: String, operator: String },

    #[error("value is required")]
    EmptyValue,

    #[error("at least one value must be selected")]
    EmptySelection,

    #[error("operator '{operator}' expects {expected}")]
    ShapeMismatch {
        operator: String,
        expected: &'static str,
    },
}

/// Outcome of validating one rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    reasons: Vec<ValidationReason>,
}

impl ValidationResult {
    #[must_use]
    pub fn valid() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn invalid(reason: ValidationReason) -> Self {
        Self {
            reasons: vec![reason],
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.reasons.is_empty()
    }

    #[must_use]
    pub fn reasons(&self) -> &[ValidationReason] {
        &self.reasons
    }
}

/// Validation results for every rule of a tree, keyed by rule id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    results: HashMap<NodeId, ValidationResult>,
}

impl Validation {
    pub(crate) fn insert(&mut self, id: NodeId, result: ValidationResult) {
        self.results.insert(id, result);
    }

    /// The result for a rule. `None` for ids that are not rules of the
    /// validated tree.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&ValidationResult> {
        self.results.get(&id)
    }

    /// Whether every rule of the tree is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.results.values().all(ValidationResult::is_valid)
    }

    /// Ids of rules that failed, in ascending id order.
    #[must_use]
    pub fn invalid_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .results
            .iter()
            .filter(|(_, r)| !r.is_valid())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
