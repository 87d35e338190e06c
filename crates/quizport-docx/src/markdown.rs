//! Markdown rendering of question lists for the Word export path.
//!
//! Two variants: the plain question sheet handed to students, and the answer
//! key with TRUE/FALSE markers and feedback paragraphs. Math conversion is
//! never applied here; Word gets the text as authored. Questions missing a
//! prompt or options are skipped rather than rejected, since the output is a
//! human-readable document, not an LMS import.

use quizport_core::model::Question;
use quizport_core::transform::{clean_option_text, TextOptions};

/// Option label letter for the option at `position` (0-based).
fn option_letter(position: usize) -> char {
    (b'A' + (position % 26) as u8) as char
}

fn docx_text_options(strip_prefixes: bool) -> TextOptions {
    TextOptions {
        strip_prefixes,
        convert_math: false,
    }
}

/// Render the student question sheet: numbered prompts with lettered options.
pub fn questions_markdown(questions: &[Question], strip_prefixes: bool) -> String {
    let opts = docx_text_options(strip_prefixes);
    let mut md = Vec::new();

    for (i, q) in questions.iter().enumerate() {
        if q.prompt.trim().is_empty() || q.options.is_empty() {
            continue;
        }

        md.push(format!("**{}. {}**", i + 1, q.prompt.trim()));
        md.push(String::new());

        for (j, choice) in q.options.iter().enumerate() {
            let display = clean_option_text(&choice.text, opts);
            // Two trailing spaces: hard line break in Markdown.
            md.push(format!("**{}.** {}  ", option_letter(j), display));
        }

        md.push(String::new());
    }

    md.join("\n")
}

/// Render the answer key: options carry TRUE/FALSE markers and the feedback
/// texts follow each question in their own paragraphs.
pub fn answer_key_markdown(questions: &[Question], strip_prefixes: bool) -> String {
    let opts = docx_text_options(strip_prefixes);
    let mut md = Vec::new();

    for (i, q) in questions.iter().enumerate() {
        if q.prompt.trim().is_empty() || q.options.is_empty() {
            continue;
        }

        md.push(format!("**{}. {}**", i + 1, q.prompt.trim()));
        md.push(String::new());

        for (j, choice) in q.options.iter().enumerate() {
            let display = clean_option_text(&choice.text, opts);
            let status = if choice.correct { "TRUE" } else { "FALSE" };
            md.push(format!(
                "**{}.** {} — **{}**  ",
                option_letter(j),
                display,
                status
            ));
            md.push(String::new());
        }

        let success = q.success_feedback.trim();
        if !success.is_empty() {
            md.push("*Feedback for correct answers:*".to_string());
            md.push(format!("{success}  "));
            md.push(String::new());
        }

        let error = q.error_feedback.trim();
        if !error.is_empty() {
            md.push("*Feedback for incorrect/partial answers:*".to_string());
            md.push(format!("{error}  "));
            md.push(String::new());
        }

        md.push(String::new());
    }

    md.join("\n")
}
