//! Stateless text transforms applied to prompts, options, and feedback.
//!
//! All functions here are pure string-to-string; which of them run is decided
//! by the per-format configuration records, never by global state.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Leading label token such as "A) ", "3. ", "a: ".
static OPTION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[A-Za-z0-9]+[).:]\s+").expect("option prefix pattern"));

/// A run of `$` delimiters with non-`$` content between.
///
/// The `regex` crate has no look-around, so single-`$` detection is done on
/// the captured delimiter runs instead of the original `\$(?!\$)` pattern.
static DOLLAR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\$+)([^$]+)(\$+)").expect("math delimiter pattern"));

/// Per-call text transform toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    pub strip_prefixes: bool,
    pub convert_math: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            strip_prefixes: true,
            convert_math: true,
        }
    }
}

/// Remove a leading option label ("A) ", "1. ", "b: ") if present.
pub fn strip_option_prefix(s: &str) -> String {
    OPTION_PREFIX.replace(s, "").into_owned()
}

/// Rewrite single-delimited inline math `$...$` to `$$...$$`.
///
/// Text already using `$$...$$` is left untouched, so the transform is
/// idempotent.
pub fn to_display_math(s: &str) -> String {
    DOLLAR_RUN
        .replace_all(s, |caps: &Captures<'_>| {
            if &caps[1] == "$" && &caps[3] == "$" {
                format!("$${}$$", &caps[2])
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Wrap a plain-text block in a paragraph tag.
///
/// Input already starting with a markup tag is returned as-is; empty input
/// yields empty output rather than an empty tag.
pub fn wrap_paragraph(s: &str) -> String {
    let t = s.trim();
    if t.is_empty() {
        String::new()
    } else if t.starts_with('<') {
        t.to_string()
    } else {
        format!("<p>{t}</p>")
    }
}

/// Transforms applied to option display text.
pub fn clean_option_text(s: &str, opts: TextOptions) -> String {
    let mut text = s.to_string();
    if opts.strip_prefixes {
        text = strip_option_prefix(&text);
    }
    if opts.convert_math {
        text = to_display_math(&text);
    }
    text
}

/// Transforms applied to prompts and feedback (no prefix stripping).
pub fn clean_general_text(s: &str, convert_math: bool) -> String {
    if convert_math {
        to_display_math(s)
    } else {
        s.to_string()
    }
}
