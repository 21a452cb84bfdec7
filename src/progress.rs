//! Progress-callback trait for per-file ingestion events.
//!
//! Inject an [`Arc<dyn IngestProgressCallback>`] via
//! [`crate::config::IngestConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline works through the input tree.
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a terminal progress bar, a log file, or a UI
//! channel without the library knowing anything about how the host
//! application communicates.

use std::path::Path;
use std::sync::Arc;

/// Called by the ingestion pipeline as it processes each input file.
///
/// The pipeline is strictly sequential, so events for different files never
/// interleave; the `Send + Sync` bound exists because the callback is stored
/// in the cloneable config. All methods have default no-op implementations
/// so callers only override what they care about.
pub trait IngestProgressCallback: Send + Sync {
    /// Called once after the walk, before any file is processed.
    ///
    /// `total_files` counts every discovered PDF, including files that will
    /// be skipped by the resume set.
    fn on_run_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called when a file is skipped because its page id is already in the
    /// corpus.
    fn on_file_skipped(&self, page_id: &str, total_files: usize) {
        let _ = (page_id, total_files);
    }

    /// Called just before extraction starts for a file.
    fn on_file_start(&self, page_id: &str, total_files: usize) {
        let _ = (page_id, total_files);
    }

    /// Called when a file's page has been merged and persisted.
    fn on_file_complete(&self, page_id: &str, total_files: usize, quiz_count: usize) {
        let _ = (page_id, total_files, quiz_count);
    }

    /// Called when extraction fails and the file is left for the next run.
    fn on_file_error(&self, path: &Path, total_files: usize, error: &str) {
        let _ = (path, total_files, error);
    }

    /// Called once after every file has been attempted.
    fn on_run_complete(&self, processed: usize, skipped: usize, failed: usize) {
        let _ = (processed, skipped, failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl IngestProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::IngestConfig`].
pub type ProgressCallback = Arc<dyn IngestProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        skips: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
    }

    impl IngestProgressCallback for TrackingCallback {
        fn on_file_skipped(&self, _page_id: &str, _total: usize) {
            self.skips.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _page_id: &str, _total: usize, _quiz_count: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, _path: &Path, _total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(3);
        cb.on_file_skipped("M1_lec1", 3);
        cb.on_file_start("M1_lec2", 3);
        cb.on_file_complete("M1_lec2", 3, 2);
        cb.on_file_error(Path::new("M1/lec3.pdf"), 3, "unreadable");
        cb.on_run_complete(1, 1, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            skips: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        };

        tracker.on_file_skipped("M1_lec1", 3);
        tracker.on_file_complete("M1_lec2", 3, 1);
        tracker.on_file_error(Path::new("M1/lec3.pdf"), 3, "boom");

        assert_eq!(tracker.skips.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn IngestProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_run_start(10);
        cb.on_file_complete("M1_lec1", 10, 3);
    }
}
