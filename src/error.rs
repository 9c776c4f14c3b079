use thiserror::Error;

use crate::parse::ParseError;
use crate::types::TreeError;

/// Unified error type covering textual parsing and tree mutation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FiltreeError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Tree(#[from] TreeError),
}
