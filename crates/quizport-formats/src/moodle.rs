//! Moodle question-bank XML emission (`multichoice` dialect).
//!
//! Unlike the QTI path, grading here is encoded as per-answer percentage
//! fractions, so answer order in the output must match the option order the
//! fractions were computed from.

use std::fmt;
use std::str::FromStr;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use quizport_core::grading::{detect_mode, moodle_fractions, GradingMode};
use quizport_core::model::Question;
use quizport_core::transform::{clean_general_text, clean_option_text, wrap_paragraph, TextOptions};

use crate::error::FormatError;

/// Fallback feedback shown when the question supplies none.
const DEFAULT_CORRECT_FEEDBACK: &str = "Your answer is correct.";
const DEFAULT_INCORRECT_FEEDBACK: &str = "Your answer is partially or wholly incorrect.";

/// Moodle's answer-numbering styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerNumbering {
    #[default]
    Abc,
    Upper,
    Digits,
    None,
}

impl fmt::Display for AnswerNumbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerNumbering::Abc => write!(f, "abc"),
            AnswerNumbering::Upper => write!(f, "ABCD"),
            AnswerNumbering::Digits => write!(f, "123"),
            AnswerNumbering::None => write!(f, "none"),
        }
    }
}

impl FromStr for AnswerNumbering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abc" => Ok(AnswerNumbering::Abc),
            "ABCD" => Ok(AnswerNumbering::Upper),
            "123" => Ok(AnswerNumbering::Digits),
            "none" => Ok(AnswerNumbering::None),
            other => Err(format!(
                "unknown answer numbering: {other} (expected abc, ABCD, 123, or none)"
            )),
        }
    }
}

/// Configuration for the Moodle export path.
#[derive(Debug, Clone)]
pub struct MoodleConfig {
    /// Prefix for generated question names (and the document filename).
    pub name_prefix: String,
    /// Strip leading "A) " style labels from option text.
    pub strip_prefixes: bool,
    /// Rewrite `$...$` inline math to `$$...$$`.
    pub convert_math: bool,
    /// Default grade per question.
    pub default_grade: f64,
    /// Penalty factor for repeated attempts.
    pub penalty: f64,
    pub answer_numbering: AnswerNumbering,
    pub shuffle: bool,
    /// When on, a question with exactly one correct option becomes a
    /// single-choice (radio-button) item.
    pub auto_single: bool,
}

impl Default for MoodleConfig {
    fn default() -> Self {
        Self {
            name_prefix: "Item".to_string(),
            strip_prefixes: true,
            convert_math: true,
            default_grade: 1.0,
            penalty: 0.3333333,
            answer_numbering: AnswerNumbering::Abc,
            shuffle: true,
            auto_single: true,
        }
    }
}

/// Build the complete quiz document: every question under one `<quiz>` root,
/// two-space indentation, UTF-8 declaration.
pub fn build_quiz(questions: &[Question], config: &MoodleConfig) -> Result<Vec<u8>, FormatError> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.write_event(Event::Start(BytesStart::new("quiz")))?;

    for (i, question) in questions.iter().enumerate() {
        write_question(&mut w, i + 1, question, config)?;
    }

    w.write_event(Event::End(BytesEnd::new("quiz")))?;
    Ok(w.into_inner())
}

/// Emit one `<question type="multichoice">` node. `index` is 1-based.
pub fn write_question(
    w: &mut Writer<Vec<u8>>,
    index: usize,
    question: &Question,
    config: &MoodleConfig,
) -> Result<(), FormatError> {
    question.validate(index)?;

    let mode = detect_mode(&question.options, config.auto_single);
    let fractions = moodle_fractions(&question.options, mode);
    let text_opts = TextOptions {
        strip_prefixes: config.strip_prefixes,
        convert_math: config.convert_math,
    };

    let mut node = BytesStart::new("question");
    node.push_attribute(("type", "multichoice"));
    w.write_event(Event::Start(node))?;

    // <name><text>{prefix}{index:03}</text></name>
    w.write_event(Event::Start(BytesStart::new("name")))?;
    write_plain_text(w, &format!("{}{:03}", config.name_prefix, index))?;
    w.write_event(Event::End(BytesEnd::new("name")))?;

    let prompt = clean_general_text(&question.prompt, config.convert_math);
    write_html_block(w, "questiontext", &wrap_paragraph(&prompt))?;

    // Outcome feedback only; general feedback stays empty.
    write_html_block(w, "generalfeedback", "")?;

    write_scalar(w, "defaultgrade", &format_number(config.default_grade))?;
    write_scalar(w, "penalty", &format_number(config.penalty))?;
    write_scalar(w, "hidden", "0")?;
    write_scalar(w, "idnumber", "")?;
    write_scalar(w, "single", bool_str(mode == GradingMode::Single))?;
    write_scalar(w, "shuffleanswers", bool_str(config.shuffle))?;
    write_scalar(w, "answernumbering", &config.answer_numbering.to_string())?;
    write_scalar(w, "showstandardinstruction", "0")?;

    let correct_fb = non_empty_or(&question.success_feedback, DEFAULT_CORRECT_FEEDBACK);
    let wrong_fb = non_empty_or(&question.error_feedback, DEFAULT_INCORRECT_FEEDBACK);

    write_html_block(w, "correctfeedback", &wrap_paragraph(correct_fb))?;
    write_html_block(w, "partiallycorrectfeedback", &wrap_paragraph(wrong_fb))?;
    write_html_block(w, "incorrectfeedback", &wrap_paragraph(wrong_fb))?;

    w.write_event(Event::Empty(BytesStart::new("shownumcorrect")))?;

    // Answers, positionally aligned with the computed fractions.
    for (choice, fraction) in question.options.iter().zip(&fractions) {
        let mut answer = BytesStart::new("answer");
        answer.push_attribute(("fraction", fraction.as_str()));
        answer.push_attribute(("format", "html"));
        w.write_event(Event::Start(answer))?;

        let display = clean_option_text(&choice.text, text_opts);
        write_cdata_text(w, &wrap_paragraph(&display))?;

        write_html_block(w, "feedback", "")?;

        w.write_event(Event::End(BytesEnd::new("answer")))?;
    }

    w.write_event(Event::End(BytesEnd::new("question")))?;
    Ok(())
}

fn non_empty_or<'a>(s: &'a str, fallback: &'a str) -> &'a str {
    if s.trim().is_empty() {
        fallback
    } else {
        s
    }
}

/// Trim trailing zeros the way Moodle's own exports do (1.0 -> "1").
fn format_number(v: f64) -> String {
    format!("{v}")
}

fn bool_str(v: bool) -> &'static str {
    if v {
        "true"
    } else {
        "false"
    }
}

/// `<tag>text</tag>` with a plain text child.
///
/// The text event is written even when empty so the closing tag stays on the
/// same line and no indentation whitespace leaks into the element value.
fn write_scalar(w: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<(), FormatError> {
    w.write_event(Event::Start(BytesStart::new(tag)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// `<text>...</text>` with plain (escaped) content.
fn write_plain_text(w: &mut Writer<Vec<u8>>, text: &str) -> Result<(), FormatError> {
    w.write_event(Event::Start(BytesStart::new("text")))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new("text")))?;
    Ok(())
}

/// `<text><![CDATA[...]]></text>` carrying HTML content.
fn write_cdata_text(w: &mut Writer<Vec<u8>>, html: &str) -> Result<(), FormatError> {
    w.write_event(Event::Start(BytesStart::new("text")))?;
    w.write_event(Event::CData(BytesCData::new(html)))?;
    w.write_event(Event::End(BytesEnd::new("text")))?;
    Ok(())
}

/// `<tag format="html"><text><![CDATA[...]]></text></tag>`
fn write_html_block(w: &mut Writer<Vec<u8>>, tag: &str, html: &str) -> Result<(), FormatError> {
    let mut block = BytesStart::new(tag);
    block.push_attribute(("format", "html"));
    w.write_event(Event::Start(block))?;
    write_cdata_text(w, html)?;
    w.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizport_core::error::BuildError;
    use quizport_core::model::Options;

    fn arithmetic_question() -> Question {
        Question {
            prompt: "2+2=?".into(),
            options: Options::from_pairs([("3", false), ("4", true), ("5", false)]),
            success_feedback: String::new(),
            error_feedback: String::new(),
        }
    }

    fn primes_question() -> Question {
        Question {
            prompt: "Pick primes".into(),
            options: Options::from_pairs([
                ("2", true),
                ("3", true),
                ("4", false),
                ("9", false),
            ]),
            success_feedback: "Nice.".into(),
            error_feedback: "Not quite.".into(),
        }
    }

    fn quiz_str(questions: &[Question], config: &MoodleConfig) -> String {
        String::from_utf8(build_quiz(questions, config).unwrap()).unwrap()
    }

    /// Fraction attribute values in document order.
    fn fractions_of(xml: &str) -> Vec<&str> {
        xml.match_indices("fraction=\"")
            .map(|(i, m)| {
                let rest = &xml[i + m.len()..];
                &rest[..rest.find('"').unwrap()]
            })
            .collect()
    }

    #[test]
    fn single_mode_fractions_are_positional() {
        let xml = quiz_str(&[arithmetic_question()], &MoodleConfig::default());

        assert!(xml.contains("<single>true</single>"));
        assert_eq!(fractions_of(&xml), vec!["0", "100.000000", "0"]);
    }

    #[test]
    fn multi_mode_splits_credit() {
        let xml = quiz_str(&[primes_question()], &MoodleConfig::default());

        assert!(xml.contains("<single>false</single>"));
        assert_eq!(xml.matches(r#"fraction="50.000000""#).count(), 2);
        assert_eq!(xml.matches(r#"fraction="-50.000000""#).count(), 2);
    }

    #[test]
    fn auto_single_off_forces_multi() {
        let config = MoodleConfig {
            auto_single: false,
            ..MoodleConfig::default()
        };
        let xml = quiz_str(&[arithmetic_question()], &config);

        assert!(xml.contains("<single>false</single>"));
        assert!(xml.contains(r#"fraction="100.000000""#));
        assert_eq!(xml.matches(r#"fraction="-50.000000""#).count(), 2);
    }

    #[test]
    fn question_names_use_prefix_and_padding() {
        let config = MoodleConfig {
            name_prefix: "Bio".into(),
            ..MoodleConfig::default()
        };
        let questions = vec![arithmetic_question(), primes_question()];
        let xml = quiz_str(&questions, &config);

        assert!(xml.contains("<text>Bio001</text>"));
        assert!(xml.contains("<text>Bio002</text>"));
    }

    #[test]
    fn feedback_falls_back_to_generic_strings() {
        let xml = quiz_str(&[arithmetic_question()], &MoodleConfig::default());
        assert!(xml.contains("Your answer is correct."));
        assert!(xml.contains("Your answer is partially or wholly incorrect."));
    }

    #[test]
    fn supplied_feedback_is_used_for_both_error_blocks() {
        let xml = quiz_str(&[primes_question()], &MoodleConfig::default());
        assert!(xml.contains("<p>Nice.</p>"));
        // error text feeds both partiallycorrect and incorrect blocks
        assert_eq!(xml.matches("<p>Not quite.</p>").count(), 2);
    }

    #[test]
    fn question_text_is_cdata_wrapped_html() {
        let xml = quiz_str(&[arithmetic_question()], &MoodleConfig::default());
        assert!(xml.contains("<![CDATA[<p>2+2=?</p>]]>"));
    }

    #[test]
    fn numeric_fields_use_compact_literals() {
        let xml = quiz_str(&[arithmetic_question()], &MoodleConfig::default());
        assert!(xml.contains("<defaultgrade>1</defaultgrade>"));
        assert!(xml.contains("<penalty>0.3333333</penalty>"));
        assert!(xml.contains("<answernumbering>abc</answernumbering>"));
        assert!(xml.contains("<shownumcorrect/>"));
    }

    #[test]
    fn option_transforms_honor_config() {
        let question = Question {
            prompt: "Solve $E=mc^2$".into(),
            options: Options::from_pairs([("A) $x$", true), ("B) y", false)]),
            success_feedback: String::new(),
            error_feedback: String::new(),
        };
        let xml = quiz_str(&[question.clone()], &MoodleConfig::default());
        assert!(xml.contains("Solve $$E=mc^2$$"));
        assert!(xml.contains("<![CDATA[<p>$$x$$</p>]]>"));
        assert!(!xml.contains("A)"));

        let keep = MoodleConfig {
            strip_prefixes: false,
            convert_math: false,
            ..MoodleConfig::default()
        };
        let xml = quiz_str(&[question], &keep);
        assert!(xml.contains("Solve $E=mc^2$"));
        assert!(xml.contains("<![CDATA[<p>A) $x$</p>]]>"));
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let questions = vec![arithmetic_question(), primes_question()];
        let config = MoodleConfig {
            shuffle: false,
            ..MoodleConfig::default()
        };
        let first = build_quiz(&questions, &config).unwrap();
        let second = build_quiz(&questions, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_options_rejected() {
        let question = Question {
            prompt: "q".into(),
            options: Options::default(),
            success_feedback: String::new(),
            error_feedback: String::new(),
        };
        let err = build_quiz(&[question], &MoodleConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            FormatError::Build(BuildError::EmptyOptions { index: 1 })
        ));
    }

    #[test]
    fn answer_numbering_parses_and_displays() {
        assert_eq!("abc".parse::<AnswerNumbering>().unwrap(), AnswerNumbering::Abc);
        assert_eq!(
            "ABCD".parse::<AnswerNumbering>().unwrap(),
            AnswerNumbering::Upper
        );
        assert_eq!(
            "123".parse::<AnswerNumbering>().unwrap(),
            AnswerNumbering::Digits
        );
        assert_eq!(AnswerNumbering::None.to_string(), "none");
        assert!("xyz".parse::<AnswerNumbering>().is_err());
    }
}
