//! Core data model for quiz questions.
//!
//! One [`Question`] is one multiple-choice exam item in the iNUX JSON shape:
//! a prompt, an ordered map of option text to correctness, and optional
//! feedback texts for fully-correct and otherwise-classified responses.

use std::collections::HashSet;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::BuildError;

/// One answer choice: display text plus its correctness flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub text: String,
    pub correct: bool,
}

/// The ordered option map of a question.
///
/// Option order is load-bearing: it fixes both the display order and the
/// generated choice-identifier sequence (ID_1, ID_2, ...), and Moodle
/// fraction values are positionally tied to it. Deserialization walks the
/// JSON map entry by entry, so a repeated option text is an error rather
/// than a silent overwrite of the earlier entry's correctness flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options(Vec<Choice>);

impl Options {
    pub fn new(choices: Vec<Choice>) -> Self {
        Options(choices)
    }

    /// Build from `(text, correct)` pairs, preserving order.
    pub fn from_pairs<S, I>(pairs: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, bool)>,
    {
        Options(
            pairs
                .into_iter()
                .map(|(text, correct)| Choice {
                    text: text.into(),
                    correct,
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Choice> {
        self.0.iter()
    }

    /// Number of options flagged correct.
    pub fn correct_count(&self) -> usize {
        self.0.iter().filter(|c| c.correct).count()
    }
}

impl<'a> IntoIterator for &'a Options {
    type Item = &'a Choice;
    type IntoIter = std::slice::Iter<'a, Choice>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Options {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for choice in &self.0 {
            map.serialize_entry(&choice.text, &choice.correct)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Options {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionsVisitor;

        impl<'de> Visitor<'de> for OptionsVisitor {
            type Value = Options;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of option text to a correctness boolean")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Options, A::Error> {
                let mut choices = Vec::with_capacity(access.size_hint().unwrap_or(0));
                let mut seen = HashSet::new();

                while let Some((text, correct)) = access.next_entry::<String, bool>()? {
                    if !seen.insert(text.clone()) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate option text: {text:?}"
                        )));
                    }
                    choices.push(Choice { text, correct });
                }

                Ok(Options(choices))
            }
        }

        deserializer.deserialize_map(OptionsVisitor)
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// The question text. May carry lightweight markup and `$...$` math.
    #[serde(rename = "question")]
    pub prompt: String,
    /// Ordered option map; see [`Options`].
    pub options: Options,
    /// Feedback shown when all correct choices (and no others) are selected.
    #[serde(default, rename = "success")]
    pub success_feedback: String,
    /// Feedback shown on partially or wholly incorrect responses.
    #[serde(default, rename = "error")]
    pub error_feedback: String,
}

impl Question {
    /// Structural check run before any builder. `index` is 1-based and only
    /// used for error context.
    pub fn validate(&self, index: usize) -> Result<(), BuildError> {
        if self.prompt.trim().is_empty() {
            return Err(BuildError::EmptyPrompt { index });
        }
        if self.options.is_empty() {
            return Err(BuildError::EmptyOptions { index });
        }
        // Programmatic construction can bypass the deserializer's check.
        let mut seen = HashSet::new();
        for choice in &self.options {
            if !seen.insert(choice.text.as_str()) {
                return Err(BuildError::DuplicateOption {
                    index,
                    text: choice.text.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_preserve_order() {
        let json = r#"{"question":"q","options":{"c":false,"a":true,"b":false}}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        let texts: Vec<&str> = q.options.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "a", "b"]);
        assert!(q.options.iter().nth(1).unwrap().correct);
    }

    #[test]
    fn duplicate_option_text_rejected() {
        let json = r#"{"question":"q","options":{"same":true,"same":false}}"#;
        let err = serde_json::from_str::<Question>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate option text"));
    }

    #[test]
    fn feedback_defaults_to_empty() {
        let json = r#"{"question":"q","options":{"a":true}}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert!(q.success_feedback.is_empty());
        assert!(q.error_feedback.is_empty());
    }

    #[test]
    fn serde_roundtrip_keeps_order() {
        let q = Question {
            prompt: "Pick one".into(),
            options: Options::from_pairs([("z", false), ("a", true), ("m", false)]),
            success_feedback: "yes".into(),
            error_feedback: "no".into(),
        };
        let json = serde_json::to_string(&q).unwrap();
        let back: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(back.options, q.options);
        assert_eq!(back.success_feedback, "yes");
    }

    #[test]
    fn validate_empty_prompt() {
        let q = Question {
            prompt: "   ".into(),
            options: Options::from_pairs([("a", true)]),
            success_feedback: String::new(),
            error_feedback: String::new(),
        };
        assert!(matches!(
            q.validate(3),
            Err(BuildError::EmptyPrompt { index: 3 })
        ));
    }

    #[test]
    fn validate_empty_options() {
        let q = Question {
            prompt: "q".into(),
            options: Options::default(),
            success_feedback: String::new(),
            error_feedback: String::new(),
        };
        assert!(matches!(
            q.validate(1),
            Err(BuildError::EmptyOptions { index: 1 })
        ));
    }

    #[test]
    fn validate_programmatic_duplicates() {
        let q = Question {
            prompt: "q".into(),
            options: Options::from_pairs([("x", true), ("x", false)]),
            success_feedback: String::new(),
            error_feedback: String::new(),
        };
        assert!(matches!(
            q.validate(2),
            Err(BuildError::DuplicateOption { index: 2, .. })
        ));
    }
}
