//! Structural question errors.
//!
//! These are the hard rejections raised before a builder touches a question.
//! Advisory findings (for example a question with no correct option) are
//! reported as [`crate::parser::ValidationWarning`]s instead.

use thiserror::Error;

/// Errors that make a question unbuildable in any target format.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The question text is missing or blank.
    #[error("question {index}: question text is empty")]
    EmptyPrompt { index: usize },

    /// The option map has no entries.
    #[error("question {index}: 'options' must be a non-empty map")]
    EmptyOptions { index: usize },

    /// Two options share the same display text. A later duplicate would
    /// silently overwrite the earlier entry's correctness flag.
    #[error("question {index}: duplicate option text: {text:?}")]
    DuplicateOption { index: usize, text: String },
}

impl BuildError {
    /// 1-based index of the offending question.
    pub fn question_index(&self) -> usize {
        match self {
            BuildError::EmptyPrompt { index }
            | BuildError::EmptyOptions { index }
            | BuildError::DuplicateOption { index, .. } => *index,
        }
    }
}
