//! Progress-callback trait for download and assembly events.
//!
//! Inject an [`Arc<dyn JobProgressCallback>`] via
//! [`crate::config::JobConfigBuilder::progress_callback`] to receive events
//! as the pipeline runs. Callbacks keep the library free of any opinion
//! about presentation: the bundled CLI forwards them to indicatif bars, a
//! server could forward them to a websocket, tests count them.

use std::sync::Arc;

/// Called by the pipeline as the run progresses.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` — the
/// assembly stage invokes them from a blocking worker thread.
pub trait JobProgressCallback: Send + Sync {
    /// Called when the archive download begins.
    ///
    /// `total_bytes` is the server-reported content length, when known.
    fn on_download_start(&self, total_bytes: Option<u64>) {
        let _ = total_bytes;
    }

    /// Called after each chunk is written to the archive file.
    fn on_download_progress(&self, bytes_written: u64, total_bytes: Option<u64>) {
        let _ = (bytes_written, total_bytes);
    }

    /// Called once the images to be assembled are known.
    fn on_assembly_start(&self, total_images: usize) {
        let _ = total_images;
    }

    /// Called when a page has been added for an image.
    ///
    /// `index` is 1-based and counts candidate images, not pages, so a
    /// progress bar driven by added+skipped always reaches `total`.
    fn on_image_added(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when an image could not be decoded and was skipped.
    fn on_image_skipped(&self, index: usize, total: usize, name: &str, reason: String) {
        let _ = (index, total, name, reason);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl JobProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::JobConfig`].
pub type ProgressCallback = Arc<dyn JobProgressCallback>;
