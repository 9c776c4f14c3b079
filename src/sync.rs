//! Switching between the structured and the textual editing surface.

use tracing::debug;

use crate::model::QueryTree;
use crate::parse::{parse, ParseError};
use crate::serialize::to_text;
use crate::types::RuleGroup;

/// Which surface the user is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuilderMode {
    #[default]
    Structured,
    Textual,
}

impl BuilderMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            BuilderMode::Structured => BuilderMode::Textual,
            BuilderMode::Textual => BuilderMode::Structured,
        }
    }
}

/// What happened to a piece of text handed to the textual editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOutcome {
    /// The session is in structured mode; the text was ignored.
    Inactive,
    /// The text is what the session last produced or accepted.
    Echo,
    /// The text parsed to the tree already installed.
    Unchanged,
    /// The text parsed to a different tree, which is now installed.
    Applied,
    /// The text does not parse. The tree is untouched.
    Rejected(ParseError),
}

/// Mode state and the textual form kept alongside the tree.
#[derive(Debug, Clone, Default)]
pub struct ModeSync {
    mode: BuilderMode,
    text: String,
    query_error: bool,
}

impl ModeSync {
    #[must_use]
    pub fn mode(&self) -> BuilderMode {
        self.mode
    }

    /// The current text of the textual editor.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the last text handed to the session failed to parse.
    #[must_use]
    pub fn query_error(&self) -> bool {
        self.query_error
    }

    /// Re-derive the text after the tree changed by other means.
    pub fn refresh(&mut self, tree: &RuleGroup) {
        if self.mode == BuilderMode::Textual {
            self.text = to_text(tree);
            self.query_error = false;
        }
    }

    /// Switch to `target`. Returns whether the tree was replaced.
    ///
    /// # Errors
    ///
    /// Leaving textual mode parses the current text; on failure the mode stays
    /// textual, the error flag is set and the [`ParseError`] is returned.
    pub fn set_mode(&mut self, target: BuilderMode, tree: &mut QueryTree) -> Result<bool, ParseError> {
        if target == self.mode {
            return Ok(false);
        }
        match target {
            BuilderMode::Textual => {
                self.text = to_text(tree.root());
                self.query_error = false;
                self.mode = BuilderMode::Textual;
                debug!(text = %self.text, "switched to textual mode");
                Ok(false)
            }
            BuilderMode::Structured => {
                let parsed = parse(&self.text).inspect_err(|e| {
                    debug!(error = %e, "cannot leave textual mode");
                    self.query_error = true;
                })?;
                let changed = parsed != *tree.root();
                if changed {
                    tree.replace(parsed);
                }
                self.query_error = false;
                self.mode = BuilderMode::Structured;
                debug!(changed, "switched to structured mode");
                Ok(changed)
            }
        }
    }

    /// Accept text typed into the textual editor, installing it into `tree`
    /// when it parses to a different tree.
    pub fn edit_text(&mut self, text: &str, tree: &mut QueryTree) -> TextOutcome {
        if self.mode != BuilderMode::Textual {
            return TextOutcome::Inactive;
        }
        if text == self.text {
            return TextOutcome::Echo;
        }
        text.clone_into(&mut self.text);
        match parse(text) {
            Err(e) => {
                debug!(error = %e, "textual query rejected");
                self.query_error = true;
                TextOutcome::Rejected(e)
            }
            Ok(parsed) => {
                self.query_error = false;
                if parsed == *tree.root() {
                    TextOutcome::Unchanged
                } else {
                    tree.replace(parsed);
                    TextOutcome::Applied
                }
            }
        }
    }
}
