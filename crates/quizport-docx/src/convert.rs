//! External document conversion.
//!
//! The converter is a subprocess seam: Markdown goes in, a .docx binary
//! comes out. The subprocess runs under an explicit timeout and a non-zero
//! exit is a reported, recoverable failure carrying the tool's diagnostics.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

/// Errors from the external conversion step.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The converter binary is not installed or not on PATH.
    #[error("document converter '{0}' not found on PATH")]
    ToolMissing(String),

    /// The converter ran and reported failure.
    #[error("document conversion failed (exit code {code}): {stderr}")]
    ToolFailed { code: i32, stderr: String },

    /// The converter did not finish within the configured timeout.
    #[error("document conversion timed out after {0}s")]
    Timeout(u64),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Markdown-to-binary-document conversion seam.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Convert formatted text into a binary document.
    async fn convert(&self, markdown: &str) -> Result<Vec<u8>, ConvertError>;
}

/// Pandoc-backed converter producing .docx.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    program: String,
    reference_doc: Option<PathBuf>,
    timeout: Duration,
}

impl PandocConverter {
    pub fn new() -> Self {
        Self::with_program("pandoc")
    }

    /// Use a different converter binary (tests point this at a stub).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            reference_doc: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Style the output from a reference document, when the file exists.
    pub fn reference_doc(mut self, path: impl Into<PathBuf>) -> Self {
        self.reference_doc = Some(path.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentConverter for PandocConverter {
    async fn convert(&self, markdown: &str) -> Result<Vec<u8>, ConvertError> {
        let work_dir = tempfile::tempdir()?;
        let md_path = work_dir.path().join("input.md");
        let docx_path = work_dir.path().join("output.docx");

        tokio::fs::write(&md_path, markdown).await?;

        let mut cmd = Command::new(&self.program);
        cmd.arg(&md_path)
            .arg("-o")
            .arg(&docx_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(reference) = &self.reference_doc {
            if reference.exists() {
                cmd.arg("--reference-doc").arg(reference);
            } else {
                tracing::warn!(
                    "reference document {} not found, converting without it",
                    reference.display()
                );
            }
        }

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(result) => result.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConvertError::ToolMissing(self.program.clone())
                } else {
                    ConvertError::Io(e)
                }
            })?,
            Err(_) => return Err(ConvertError::Timeout(self.timeout.as_secs())),
        };

        if !output.status.success() {
            return Err(ConvertError::ToolFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(tokio::fs::read(&docx_path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_tool_is_reported() {
        let converter = PandocConverter::with_program("quizport-no-such-converter");
        let err = converter.convert("# hello").await.unwrap_err();
        assert!(matches!(err, ConvertError::ToolMissing(_)));
        assert!(err.to_string().contains("quizport-no-such-converter"));
    }

    #[tokio::test]
    async fn nonzero_exit_is_reported_with_code() {
        // `false` accepts any arguments and exits 1 without producing output.
        let converter = PandocConverter::with_program("false");
        let err = converter.convert("# hello").await.unwrap_err();
        match err {
            ConvertError::ToolFailed { code, .. } => assert_eq!(code, 1),
            other => panic!("expected ToolFailed, got {other:?}"),
        }
    }

    #[test]
    fn builder_configures_timeout_and_reference() {
        let converter = PandocConverter::new()
            .timeout(Duration::from_secs(5))
            .reference_doc("custom-reference.docx");
        assert_eq!(converter.timeout, Duration::from_secs(5));
        assert!(converter.reference_doc.is_some());
    }
}
