//! quizport-docx — Word export via an external document converter.
//!
//! Questions are rendered to Markdown here; turning that into a .docx binary
//! is delegated to an external tool (Pandoc) behind the
//! [`DocumentConverter`] seam.

pub mod convert;
pub mod markdown;

pub use convert::{ConvertError, DocumentConverter, PandocConverter};
pub use markdown::{answer_key_markdown, questions_markdown};
