//! Error types for the pdf2course library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`IngestError`] — **Fatal**: the run cannot proceed at all (input
//!   directory missing, no usable LLM backend, output file unwritable).
//!   Returned as `Err(IngestError)` from [`crate::ingest::run`].
//!
//! * [`FileError`] — **Non-fatal**: a single input file failed to yield any
//!   text (unreadable or corrupt PDF). The file is logged and skipped, it is
//!   NOT recorded in the resume set, and the run continues with the next
//!   file — so the file stays eligible for retry on the next run.
//!
//! Generation failures (elaboration or quiz calls) are a third, softer
//! category: [`GenerateError`] never escapes the pipeline. The caller
//! substitutes a deterministic fallback value and the file still counts as
//! processed.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2course library.
///
/// Per-file failures use [`FileError`] and are absorbed by the ingestion
/// loop rather than propagated here.
#[derive(Debug, Error)]
pub enum IngestError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input root directory was not found.
    #[error("Input directory not found: '{path}'\nCreate it and place one subdirectory per course module inside.")]
    InputDirNotFound { path: PathBuf },

    /// The input root exists but is not a directory.
    #[error("Input path '{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// No LLM backend could be resolved (missing API key etc.).
    #[error("No usable LLM backend.\n{hint}")]
    ProviderNotConfigured { hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not write the corpus JSON file.
    #[error("Failed to write corpus file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single input file.
///
/// Raised only by the extraction stage: a file that produces this error is
/// skipped for the current run and retried on the next one, because its id
/// never enters the resume set.
#[derive(Debug, Error)]
pub enum FileError {
    /// The file could not be read from disk.
    #[error("Cannot read '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The PDF text layer could not be extracted.
    #[error("Text extraction failed for '{path}': {detail}")]
    ExtractionFailed { path: PathBuf, detail: String },
}

/// A failed content-generation call (elaboration or quiz).
///
/// Never crosses the pipeline boundary: the caller falls back to a
/// deterministic substitute and logs the message at WARN.
#[derive(Debug, Error)]
#[error("content generation failed: {message}")]
pub struct GenerateError {
    pub message: String,
}

impl GenerateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_dir_not_found_display() {
        let e = IngestError::InputDirNotFound {
            path: PathBuf::from("input_pdfs"),
        };
        let msg = e.to_string();
        assert!(msg.contains("input_pdfs"), "got: {msg}");
        assert!(msg.contains("not found"));
    }

    #[test]
    fn provider_not_configured_display() {
        let e = IngestError::ProviderNotConfigured {
            hint: "Set GEMINI_API_KEY".into(),
        };
        assert!(e.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn extraction_failed_display() {
        let e = FileError::ExtractionFailed {
            path: PathBuf::from("M1/lec1.pdf"),
            detail: "bad xref table".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("lec1.pdf"));
        assert!(msg.contains("bad xref"));
    }

    #[test]
    fn generate_error_display() {
        let e = GenerateError::new("HTTP 429");
        assert!(e.to_string().contains("HTTP 429"));
    }
}
