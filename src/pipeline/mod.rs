//! Pipeline stages for slide-deck ingestion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. stub the generator in tests) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! walker ──▶ extract ──▶ generator ──▶ quiz ──▶ merge (ingest)
//! (dir tree)  (pdf text)  (LLM calls)   (parse)   (corpus + save)
//! ```
//!
//! 1. [`walker`]    — enumerate (module, file) work items in deterministic
//!    sorted order
//! 2. [`extract`]   — pull the embedded text layer out of one PDF; the only
//!    stage whose failure skips a file
//! 3. [`generator`] — drive the LLM calls with retry/backoff; the only stage
//!    with network I/O
//! 4. [`quiz`]      — parse-and-validate the model's quiz JSON into a tagged
//!    result consumed by the fallback policy

pub mod extract;
pub mod generator;
pub mod quiz;
pub mod walker;
