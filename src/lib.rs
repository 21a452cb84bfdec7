//! # pdf2course
//!
//! Convert a directory tree of PDF lecture slides into a structured JSON
//! course corpus of explanations and quizzes, incrementally.
//!
//! ## Why this crate?
//!
//! Slide decks are terse: bullet fragments, bare formulas, no connective
//! prose. This crate extracts each deck's text layer and has an LLM rewrite
//! it as a textbook-style explanation, then generates multiple-choice
//! quizzes from that explanation. The result is one JSON file a study
//! frontend can consume directly.
//!
//! Runs are incremental and resumable: the corpus is persisted after every
//! processed file, already-processed files are skipped by id on the next
//! run, and a crash loses at most one file's work.
//!
//! ## Pipeline Overview
//!
//! ```text
//! <input>/<module>/<deck>.pdf
//!  │
//!  ├─ 1. Walk      enumerate modules and files in sorted order
//!  ├─ 2. Skip      drop files whose page id is already in the corpus
//!  ├─ 3. Extract   pull the PDF text layer (pdf-extract)
//!  ├─ 4. Elaborate LLM rewrites raw slide text as an explanation
//!  ├─ 5. Quiz      LLM generates 1–3 validated multiple-choice questions
//!  └─ 6. Merge     append the page, persist the full corpus to disk
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2course::{ingest, IngestConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY
//!     let config = IngestConfig::builder()
//!         .input_dir("input_pdfs")
//!         .output_path("data.json")
//!         .build()?;
//!     let output = ingest::run(&config).await?;
//!     eprintln!(
//!         "{} processed, {} skipped, {} failed",
//!         output.stats.processed, output.stats.skipped, output.stats.failed
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2course` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2course = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod corpus;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{IngestConfig, IngestConfigBuilder};
pub use corpus::{Corpus, CourseModule, Page, Quiz};
pub use error::{FileError, GenerateError, IngestError};
pub use ingest::{run, IngestOutput, RunStats};
pub use pipeline::extract::{PdfTextExtractor, TextExtractor};
pub use pipeline::generator::{ContentGenerator, LlmGenerator};
pub use pipeline::quiz::{parse_quiz_response, ParsedQuizzes};
pub use progress::{IngestProgressCallback, NoopProgressCallback, ProgressCallback};
