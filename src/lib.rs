//! Headless filter-expression builder.
//!
//! A [`Session`] holds a tree of [`Rule`]s combined by AND/OR groups and keeps
//! it editable through two surfaces: per-rule controls that produce view
//! models and [`Mutation`]s, and a textual expression that parses back into the
//! same tree.
//!
//! ```
//! use filtree::{BuilderMode, Field, SessionBuilder, ValueOption};
//!
//! let mut session = SessionBuilder::new()
//!     .fields(vec![Field::new("cos_provider", "Provider", "billing")
//!         .with_default_operator("in")
//!         .with_values([ValueOption::new("aws", "AWS")])])
//!     .build();
//! let root = session.tree().id();
//! let rule = session.add_rule(root).unwrap();
//! session.select_values(rule, &["aws".to_owned()]).unwrap();
//!
//! session.set_mode(BuilderMode::Textual).unwrap();
//! assert_eq!(session.text(), r#"cos_provider in ["aws"]"#);
//! ```

pub mod controls;
mod debounce;
mod error;
mod model;
pub mod parse;
mod serialize;
mod session;
mod sync;
mod types;
mod validate;

pub use debounce::{Debouncer, PendingCommit, DEFAULT_DEBOUNCE};
pub use error::FiltreeError;
pub use model::{Mutation, QueryTree};
pub use parse::{parse, ParseError};
pub use serialize::to_text;
pub use session::{ChangeListener, Session, SessionBuilder};
pub use sync::{BuilderMode, ModeSync, TextOutcome};
pub use types::{
    dedup, kind_of, Combinator, Field, FieldCatalog, Node, NodeId, NodeRef, Operator,
    OperatorKind, Rule, RuleGroup, RuleValue, TreeError, Validation, ValidationReason,
    ValidationResult, ValueOption,
};
pub use validate::{validate, validate_rule};
