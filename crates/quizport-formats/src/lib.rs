//! quizport-formats — QTI 2.1 and Moodle XML emission.
//!
//! Each builder is a pure function from questions plus a configuration
//! record to output bytes; the export orchestrator in [`export`] runs the
//! requested builders and isolates per-format failures.

pub mod error;
pub mod export;
pub mod moodle;
pub mod qti;
