//! CLI configuration file support.
//!
//! Settings live in `quizport.toml`; command-line flags override file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level quizport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizportConfig {
    /// Strip leading "A) " style labels from option text.
    #[serde(default = "default_true")]
    pub strip_prefixes: bool,
    /// Rewrite `$...$` inline math to `$$...$$`.
    #[serde(default = "default_true")]
    pub convert_math: bool,
    /// Let the LMS shuffle answer order.
    #[serde(default = "default_true")]
    pub shuffle: bool,
    /// Auto-detect single-correct questions for Moodle.
    #[serde(default = "default_true")]
    pub auto_single: bool,
    /// Default grade per Moodle question.
    #[serde(default = "default_grade")]
    pub default_grade: f64,
    /// Moodle retry penalty factor.
    #[serde(default = "default_penalty")]
    pub penalty: f64,
    /// Moodle answer numbering: abc, ABCD, 123, or none.
    #[serde(default = "default_numbering")]
    pub answer_numbering: String,
    /// Timeout for the external document converter.
    #[serde(default = "default_pandoc_timeout")]
    pub pandoc_timeout_secs: u64,
    /// Optional reference .docx used to style Word output.
    #[serde(default)]
    pub reference_doc: Option<PathBuf>,
    /// Output directory for converted files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_true() -> bool {
    true
}
fn default_grade() -> f64 {
    1.0
}
fn default_penalty() -> f64 {
    0.3333333
}
fn default_numbering() -> String {
    "abc".to_string()
}
fn default_pandoc_timeout() -> u64 {
    30
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizport-out")
}

impl Default for QuizportConfig {
    fn default() -> Self {
        Self {
            strip_prefixes: true,
            convert_math: true,
            shuffle: true,
            auto_single: true,
            default_grade: default_grade(),
            penalty: default_penalty(),
            answer_numbering: default_numbering(),
            pandoc_timeout_secs: default_pandoc_timeout(),
            reference_doc: None,
            output_dir: default_output_dir(),
        }
    }
}

/// Load config from an explicit path, or search the default locations:
/// `quizport.toml` in the current directory, then
/// `~/.config/quizport/config.toml`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizportConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizport.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            global.exists().then_some(global)
        } else {
            None
        }
    };

    match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))
        }
        None => Ok(QuizportConfig::default()),
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizport"))
}
