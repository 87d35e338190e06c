//! JSON question-bank parser and validator.
//!
//! Accepts the two top-level shapes the upstream tooling produces: a bare
//! array of question objects, or an object wrapping that array under a
//! `questions` key. Anything else is a malformed-input error.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::Question;

#[derive(Debug, Deserialize)]
struct QuestionFile {
    questions: Vec<Question>,
}

/// Load and parse a question file from disk.
pub fn load_questions(path: &Path) -> Result<Vec<Question>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question file: {}", path.display()))?;
    let questions = parse_questions_str(&content)
        .with_context(|| format!("failed to parse question file: {}", path.display()))?;
    tracing::debug!("loaded {} questions from {}", questions.len(), path.display());
    Ok(questions)
}

/// Parse a JSON string into a question list.
pub fn parse_questions_str(content: &str) -> Result<Vec<Question>> {
    // Dispatch on the first significant byte instead of an untagged enum so
    // serde errors keep pointing at the offending entry.
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<Question>>(content).context("invalid question list")
    } else if trimmed.starts_with('{') {
        let file: QuestionFile =
            serde_json::from_str(content).context("invalid question object")?;
        Ok(file.questions)
    } else {
        anyhow::bail!("JSON must be an array of questions or an object with a 'questions' list")
    }
}

/// Parse raw bytes into a question list.
pub fn parse_questions_slice(bytes: &[u8]) -> Result<Vec<Question>> {
    let content = std::str::from_utf8(bytes).context("question file is not valid UTF-8")?;
    parse_questions_str(content)
}

/// An advisory finding from question validation.
///
/// Warnings do not stop an export; structural problems that do are raised as
/// [`crate::error::BuildError`] by [`Question::validate`].
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 1-based question index.
    pub index: usize,
    /// Warning message.
    pub message: String,
}

/// Check a question list for suspicious-but-importable content.
pub fn validate_questions(questions: &[Question]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (i, q) in questions.iter().enumerate() {
        let index = i + 1;

        // Both target formats accept an item with no correct option; it just
        // can never be answered correctly.
        if !q.options.is_empty() && q.options.correct_count() == 0 {
            warnings.push(ValidationWarning {
                index,
                message: "no option is marked correct; the item can never award credit".into(),
            });
        }

        for choice in &q.options {
            if choice.text.trim().is_empty() {
                warnings.push(ValidationWarning {
                    index,
                    message: "option with empty display text".into(),
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_JSON: &str = r#"
    [
      {
        "question": "2+2=?",
        "options": {"3": false, "4": true, "5": false},
        "success": "Correct.",
        "error": "Try again."
      }
    ]
    "#;

    #[test]
    fn parse_bare_list() {
        let questions = parse_questions_str(LIST_JSON).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].prompt, "2+2=?");
        assert_eq!(questions[0].options.len(), 3);
    }

    #[test]
    fn parse_wrapped_object() {
        let json = format!(r#"{{"questions": {}}}"#, LIST_JSON.trim());
        let questions = parse_questions_str(&json).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].success_feedback, "Correct.");
    }

    #[test]
    fn reject_scalar_top_level() {
        let err = parse_questions_str("42").unwrap_err();
        assert!(err.to_string().contains("array of questions"));
    }

    #[test]
    fn reject_object_without_questions_key() {
        assert!(parse_questions_str(r#"{"items": []}"#).is_err());
    }

    #[test]
    fn reject_duplicate_option_text() {
        let json = r#"[{"question":"q","options":{"a":true,"a":false}}]"#;
        let err = parse_questions_str(json).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate option text"));
    }

    #[test]
    fn parse_slice_requires_utf8() {
        assert!(parse_questions_slice(&[0xff, 0xfe]).is_err());
        assert!(parse_questions_slice(LIST_JSON.as_bytes()).is_ok());
    }

    #[test]
    fn warn_on_zero_correct_options() {
        let json = r#"[{"question":"q","options":{"a":false,"b":false}}]"#;
        let questions = parse_questions_str(json).unwrap();
        let warnings = validate_questions(&questions);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].index, 1);
        assert!(warnings[0].message.contains("no option is marked correct"));
    }

    #[test]
    fn warn_on_empty_option_text() {
        let json = r#"[{"question":"q","options":{"": true, "b": false}}]"#;
        let questions = parse_questions_str(json).unwrap();
        let warnings = validate_questions(&questions);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("empty display text")));
    }

    #[test]
    fn no_warnings_for_clean_input() {
        let questions = parse_questions_str(LIST_JSON).unwrap();
        assert!(validate_questions(&questions).is_empty());
    }
}
