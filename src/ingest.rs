//! The ingestion orchestrator: incremental processing with resume.
//!
//! One call to [`run`] walks the input tree, processes every PDF that is not
//! already in the corpus, and persists the full corpus after each merged
//! page. The per-page save is the sole durability checkpoint: a run killed
//! at any point loses at most one file's work, and because an id enters the
//! resume set only after its page is durably written, the next run picks
//! that file up again.
//!
//! Per-file processing is a four-step sequence —
//! Extracting → Elaborating → Quizzing → Merged — where only extraction can
//! fail the file. Generation failures degrade to deterministic substitutes
//! and the file still counts as processed (never retried; a known
//! fidelity/durability trade-off).

use crate::config::IngestConfig;
use crate::corpus::{Corpus, Page, Quiz};
use crate::error::{FileError, IngestError};
use crate::pipeline::extract::{PdfTextExtractor, TextExtractor};
use crate::pipeline::generator::{resolve_generator, ContentGenerator};
use crate::pipeline::quiz::{parse_quiz_response, ParsedQuizzes};
use crate::pipeline::walker::{self, WorkItem};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Content stored for a file whose extracted text is empty or
/// whitespace-only. The generator is not called for such files.
pub const EMPTY_TEXT_PLACEHOLDER: &str = "(No text on page)";

/// Counters for one ingestion run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// PDF files discovered by the walk, including skipped ones.
    pub discovered: usize,
    /// Files processed and merged this run.
    pub processed: usize,
    /// Files skipped because their id was already in the corpus.
    pub skipped: usize,
    /// Files that failed extraction (left for the next run).
    pub failed: usize,
    /// Wall-clock duration of the whole run.
    pub total_duration_ms: u64,
}

/// Result of one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOutput {
    /// The corpus as persisted after the last merged page.
    pub corpus: Corpus,
    pub stats: RunStats,
}

/// The set of page ids considered already processed.
///
/// Membership by id is the only admission criterion for skipping — no
/// content hashing, no modification-time check. A file whose content changes
/// while its derived id stays the same is silently skipped until a
/// reprocess run.
#[derive(Debug, Default)]
struct ResumeTracker {
    ids: HashSet<String>,
}

impl ResumeTracker {
    /// Start empty (reprocess run, or no prior corpus).
    fn empty() -> Self {
        Self::default()
    }

    /// Seed with every page id found in the loaded corpus.
    fn from_corpus(corpus: &Corpus) -> Self {
        Self {
            ids: corpus.processed_ids(),
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Record an id. Call only after the page has been durably written.
    fn mark_processed(&mut self, id: String) {
        self.ids.insert(id);
    }
}

/// Run the full ingestion pipeline with the given configuration.
///
/// # Errors
/// Returns `Err(IngestError)` only for fatal conditions: missing input
/// directory (before any output is produced or modified), no usable LLM
/// backend, or a failed corpus write. Per-file extraction failures are
/// absorbed: logged, counted in [`RunStats::failed`], and retried on the
/// next run.
pub async fn run(config: &IngestConfig) -> Result<IngestOutput, IngestError> {
    let total_start = Instant::now();
    info!(
        "Starting ingestion: {} -> {}",
        config.input_dir.display(),
        config.output_path.display()
    );

    // ── Step 1: Enumerate work ───────────────────────────────────────────
    // Also validates the input root; a missing directory halts here,
    // leaving any existing output untouched.
    let items = walker::walk(&config.input_dir)?;

    // ── Step 2: Resolve collaborators ────────────────────────────────────
    let generator = resolve_generator(config)?;
    let extractor: Arc<dyn TextExtractor> = config
        .extractor
        .clone()
        .unwrap_or_else(|| Arc::new(PdfTextExtractor));

    // ── Step 3: Load prior state, seed the resume set ────────────────────
    let (mut corpus, mut tracker) = if config.reprocess {
        info!("Reprocess flag set. All files will be reprocessed.");
        (Corpus::default(), ResumeTracker::empty())
    } else {
        let corpus = Corpus::load(&config.output_path);
        let tracker = ResumeTracker::from_corpus(&corpus);
        (corpus, tracker)
    };

    // ── Step 4: Sequential per-file loop ─────────────────────────────────
    let total = items.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    let mut stats = RunStats {
        discovered: total,
        ..RunStats::default()
    };
    let mut current_module = String::new();

    for item in &items {
        if item.module != current_module {
            info!("Processing module: {}", item.module);
            current_module = item.module.clone();
        }

        let id = item.page_id();
        if tracker.contains(&id) {
            debug!("Skipping {} (already processed)", item.path.display());
            stats.skipped += 1;
            if let Some(ref cb) = config.progress_callback {
                cb.on_file_skipped(&id, total);
            }
            continue;
        }

        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(&id, total);
        }

        match build_page(
            extractor.as_ref(),
            generator.as_ref(),
            config.quiz_token_threshold,
            item,
        )
        .await
        {
            Err(e) => {
                warn!("Skipping {}: {}", item.path.display(), e);
                stats.failed += 1;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_error(&item.path, total, &e.to_string());
                }
            }
            Ok(page) => {
                let quiz_count = page.tests.len();
                corpus.module_mut(&item.module).pages.push(page);
                // Durability checkpoint: the full corpus, after every page.
                corpus.save(&config.output_path).await?;
                tracker.mark_processed(id.clone());
                stats.processed += 1;
                debug!("Merged {} ({} quiz items)", id, quiz_count);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_complete(&id, total, quiz_count);
                }
            }
        }
    }

    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(stats.processed, stats.skipped, stats.failed);
    }
    info!(
        "Ingestion complete: {} processed, {} skipped, {} failed, {}ms",
        stats.processed, stats.skipped, stats.failed, stats.total_duration_ms
    );

    Ok(IngestOutput { corpus, stats })
}

/// Transform one input file into a [`Page`] record.
///
/// Extraction failure is the only error path. Elaboration and quizzing
/// degrade instead:
/// * empty extracted text → fixed placeholder content, no generator call
/// * elaboration failure → raw text with whitespace runs collapsed
/// * explanation under `quiz_token_threshold` tokens → zero quiz items,
///   no generator call
/// * quiz failure, malformed response, or an empty-but-valid list → exactly
///   one fixed placeholder quiz
async fn build_page(
    extractor: &dyn TextExtractor,
    generator: &dyn ContentGenerator,
    quiz_token_threshold: usize,
    item: &WorkItem,
) -> Result<Page, FileError> {
    // ── Extracting ───────────────────────────────────────────────────────
    debug!("Reading {}", item.path.display());
    let raw_text = extractor.extract(&item.path)?;

    // ── Elaborating ──────────────────────────────────────────────────────
    let content = if raw_text.trim().is_empty() {
        EMPTY_TEXT_PLACEHOLDER.to_string()
    } else {
        match generator.elaborate(&raw_text).await {
            Ok(text) => text,
            Err(e) => {
                warn!("{}: elaboration failed ({}); keeping raw text", item.page_id(), e);
                collapse_whitespace(&raw_text)
            }
        }
    };

    // ── Quizzing ─────────────────────────────────────────────────────────
    let tests = if content.split_whitespace().count() < quiz_token_threshold {
        Vec::new()
    } else {
        match generator.quiz(&content).await {
            Err(e) => {
                warn!("{}: quiz generation failed ({}); using placeholder", item.page_id(), e);
                vec![Quiz::placeholder()]
            }
            Ok(raw) => match parse_quiz_response(&raw) {
                ParsedQuizzes::Valid(quizzes) => quizzes,
                ParsedQuizzes::Malformed(reason) => {
                    warn!("{}: quiz response malformed ({}); using placeholder", item.page_id(), reason);
                    vec![Quiz::placeholder()]
                }
            },
        }
    };

    Ok(Page {
        id: item.page_id(),
        title: item.title(),
        content,
        tests,
    })
}

/// Collapse internal whitespace runs (including newlines) to single spaces.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerateError;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn item() -> WorkItem {
        WorkItem {
            module: "M1".into(),
            stem: "lec1".into(),
            path: PathBuf::from("M1/lec1.pdf"),
        }
    }

    struct StubExtractor {
        text: Option<String>,
    }

    impl TextExtractor for StubExtractor {
        fn extract(&self, path: &std::path::Path) -> Result<String, FileError> {
            match &self.text {
                Some(text) => Ok(text.clone()),
                None => Err(FileError::ExtractionFailed {
                    path: path.to_path_buf(),
                    detail: "stub failure".into(),
                }),
            }
        }
    }

    struct StubGenerator {
        elaborate: Result<String, String>,
        quiz: Result<String, String>,
        elaborate_calls: AtomicUsize,
        quiz_calls: AtomicUsize,
    }

    impl StubGenerator {
        fn new(elaborate: Result<&str, &str>, quiz: Result<&str, &str>) -> Self {
            Self {
                elaborate: elaborate.map(str::to_string).map_err(str::to_string),
                quiz: quiz.map(str::to_string).map_err(str::to_string),
                elaborate_calls: AtomicUsize::new(0),
                quiz_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ContentGenerator for StubGenerator {
        async fn elaborate(&self, _raw_text: &str) -> Result<String, GenerateError> {
            self.elaborate_calls.fetch_add(1, Ordering::SeqCst);
            self.elaborate.clone().map_err(GenerateError::new)
        }

        async fn quiz(&self, _content: &str) -> Result<String, GenerateError> {
            self.quiz_calls.fetch_add(1, Ordering::SeqCst);
            self.quiz.clone().map_err(GenerateError::new)
        }
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[tokio::test]
    async fn extraction_failure_fails_the_file() {
        let extractor = StubExtractor { text: None };
        let generator = StubGenerator::new(Ok("x"), Ok("[]"));

        let result = build_page(&extractor, &generator, 100, &item()).await;
        assert!(matches!(result, Err(FileError::ExtractionFailed { .. })));
        assert_eq!(generator.elaborate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_text_short_circuits_to_placeholder_content() {
        let extractor = StubExtractor {
            text: Some("  \n\t ".into()),
        };
        let generator = StubGenerator::new(Ok("should not be called"), Ok("[]"));

        let page = build_page(&extractor, &generator, 100, &item()).await.unwrap();
        assert_eq!(page.content, EMPTY_TEXT_PLACEHOLDER);
        assert!(page.tests.is_empty());
        assert_eq!(generator.elaborate_calls.load(Ordering::SeqCst), 0);
        assert_eq!(generator.quiz_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn elaboration_failure_degrades_to_collapsed_raw_text() {
        let extractor = StubExtractor {
            text: Some("raw   slide\n\ntext".into()),
        };
        let generator = StubGenerator::new(Err("HTTP 500"), Ok("[]"));

        let page = build_page(&extractor, &generator, 100, &item()).await.unwrap();
        assert_eq!(page.content, "raw slide text");
    }

    #[tokio::test]
    async fn short_explanation_yields_no_quiz() {
        let extractor = StubExtractor {
            text: Some("slides".into()),
        };
        let ninety_nine = words(99);
        let generator = StubGenerator::new(Ok(&ninety_nine), Ok("[]"));

        let page = build_page(&extractor, &generator, 100, &item()).await.unwrap();
        assert!(page.tests.is_empty());
        assert_eq!(generator.quiz_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_quiz_yields_exactly_one_placeholder() {
        let extractor = StubExtractor {
            text: Some("slides".into()),
        };
        let hundred = words(100);
        let generator = StubGenerator::new(Ok(&hundred), Ok("not json at all"));

        let page = build_page(&extractor, &generator, 100, &item()).await.unwrap();
        assert_eq!(page.tests, vec![Quiz::placeholder()]);
        assert_eq!(generator.quiz_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn quiz_call_failure_yields_placeholder() {
        let extractor = StubExtractor {
            text: Some("slides".into()),
        };
        let hundred = words(100);
        let generator = StubGenerator::new(Ok(&hundred), Err("timeout"));

        let page = build_page(&extractor, &generator, 100, &item()).await.unwrap();
        assert_eq!(page.tests, vec![Quiz::placeholder()]);
    }

    #[tokio::test]
    async fn valid_quiz_response_is_kept() {
        let extractor = StubExtractor {
            text: Some("slides".into()),
        };
        let hundred = words(100);
        let raw = r#"[{"question": "q?", "options": ["a","b","c","d"], "correct_answer": "b", "explanation": "because"}]"#;
        let generator = StubGenerator::new(Ok(&hundred), Ok(raw));

        let page = build_page(&extractor, &generator, 100, &item()).await.unwrap();
        assert_eq!(page.tests.len(), 1);
        assert_eq!(page.tests[0].correct_answer, "b");
    }

    #[test]
    fn collapse_whitespace_flattens_runs() {
        assert_eq!(collapse_whitespace("a  b\n\nc\td"), "a b c d");
        assert_eq!(collapse_whitespace("  lone  "), "lone");
    }

    #[test]
    fn tracker_seeds_from_corpus() {
        let mut corpus = Corpus::default();
        corpus.module_mut("M1").pages.push(Page {
            id: "M1_lec1".into(),
            title: "lec1".into(),
            content: String::new(),
            tests: Vec::new(),
        });

        let tracker = ResumeTracker::from_corpus(&corpus);
        assert!(tracker.contains("M1_lec1"));
        assert!(!tracker.contains("M1_lec2"));

        let empty = ResumeTracker::empty();
        assert!(!empty.contains("M1_lec1"));
    }
}
