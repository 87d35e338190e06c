//! Format-build error types.

use thiserror::Error;

use quizport_core::error::BuildError;

/// Errors raised while emitting one target format.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The question itself is structurally unusable.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// XML serialization failed.
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Zip archive construction failed.
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Buffer I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
