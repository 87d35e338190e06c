//! Export orchestrator.
//!
//! Validates the question list once, then runs only the requested builders.
//! A failure in one format is collected and reported; it never prevents the
//! other format from completing. Bundling is plain concatenation into a zip
//! after all individual buffers exist.

use std::fmt;
use std::io::{Cursor, Write};
use std::str::FromStr;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use quizport_core::error::BuildError;
use quizport_core::ident::IdGenerator;
use quizport_core::model::Question;

use crate::error::FormatError;
use crate::moodle::{self, MoodleConfig};
use crate::qti::{self, QtiConfig};

/// A target LMS format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Qti,
    Moodle,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Qti => write!(f, "qti"),
            Format::Moodle => write!(f, "moodle"),
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qti" => Ok(Format::Qti),
            "moodle" => Ok(Format::Moodle),
            other => Err(format!("unknown format: {other}")),
        }
    }
}

/// Which formats to build, with their configuration records.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub qti: Option<QtiConfig>,
    pub moodle: Option<MoodleConfig>,
}

impl ExportRequest {
    pub fn is_empty(&self) -> bool {
        self.qti.is_none() && self.moodle.is_none()
    }
}

/// One produced output buffer with its download metadata.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub format: Format,
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// A format that failed to build.
#[derive(Debug, Clone)]
pub struct FormatFailure {
    pub format: Format,
    pub error: String,
}

/// The result of one export call: produced buffers plus isolated failures.
#[derive(Debug, Clone, Default)]
pub struct ExportOutcome {
    pub files: Vec<ExportFile>,
    pub failures: Vec<FormatFailure>,
}

impl ExportOutcome {
    /// True when at least one format was requested and none succeeded.
    pub fn all_failed(&self) -> bool {
        self.files.is_empty() && !self.failures.is_empty()
    }
}

/// Run the requested builders over the question list.
///
/// Structural question errors are raised before any builder runs, so an
/// invalid list never yields partial output in either format. Build-time
/// failures after that point are isolated per format.
pub fn export(
    questions: &[Question],
    request: &ExportRequest,
    ids: &mut dyn IdGenerator,
) -> Result<ExportOutcome, BuildError> {
    for (i, question) in questions.iter().enumerate() {
        question.validate(i + 1)?;
    }

    let mut outcome = ExportOutcome::default();

    if let Some(config) = &request.qti {
        match qti::build_package(questions, config, ids) {
            Ok(bytes) => outcome.files.push(ExportFile {
                format: Format::Qti,
                filename: format!("{}_qti_mcq.zip", config.item_prefix),
                mime: "application/zip",
                bytes,
            }),
            Err(e) => {
                tracing::error!("QTI package build failed: {e}");
                outcome.failures.push(FormatFailure {
                    format: Format::Qti,
                    error: e.to_string(),
                });
            }
        }
    }

    if let Some(config) = &request.moodle {
        match moodle::build_quiz(questions, config) {
            Ok(bytes) => outcome.files.push(ExportFile {
                format: Format::Moodle,
                filename: format!("{}_moodle_mcq.xml", config.name_prefix),
                mime: "application/xml",
                bytes,
            }),
            Err(e) => {
                tracing::error!("Moodle XML build failed: {e}");
                outcome.failures.push(FormatFailure {
                    format: Format::Moodle,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(outcome)
}

/// Concatenate named buffers into one zip archive.
pub fn bundle<'a, I>(entries: I) -> Result<Vec<u8>, FormatError>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let entry_opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, bytes) in entries {
        zip.start_file(name, entry_opts)?;
        zip.write_all(bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}
