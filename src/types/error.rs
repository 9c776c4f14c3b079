use thiserror::Error;

use super::tree::NodeId;

/// Errors produced when a mutation cannot be applied to the rule tree.
///
/// A failed mutation leaves the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("no node with id {id}")]
    UnknownNode { id: NodeId },

    #[error("node {id} is not a group")]
    NotAGroup { id: NodeId },

    #[error("node {id} is not a rule")]
    NotARule { id: NodeId },

    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    #[error("operator '{operator}' is not available for field '{field}'")]
    UnsupportedOperator { field: String, operator: String },

    #[error("the root group cannot be removed")]
    CannotRemoveRoot,

    #[error("no fields available; at least one field is required to add a rule")]
    NoFields,
}
