mod error;
mod field;
mod operator;
mod tree;
mod validation;
mod value;

pub use error::TreeError;
pub use field::{Field, FieldCatalog, ValueOption};
pub use operator::{kind_of, Operator, OperatorKind};
pub(crate) use operator::symbol_of;
pub use tree::{Combinator, Node, NodeId, NodeRef, Rule, RuleGroup};
pub use validation::{Validation, ValidationReason, ValidationResult};
pub use value::{dedup, RuleValue};
