use std::fmt;

/// A textual filter expression that could not be parsed.
///
/// The tree being edited is never touched by a failed parse; the error only
/// describes where the text went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    offset: usize,
    message: String,
}

impl ParseError {
    pub(crate) fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }

    /// Byte offset into the input at which parsing stopped.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The parser's description of what was expected, with the offending
    /// input underlined.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at offset {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for ParseError {}
