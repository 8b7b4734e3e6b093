//! Progress reporting and cancellation support.
//!
//! [`ProgressCallback`] observes batch rendering one item at a time and
//! [`CancellationToken`] lets another thread stop a batch between items.
//! Cancelling a batch never disposes the [`Session`](crate::Session); the
//! session stays usable for subsequent calls.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use stillshot::{
//!     CancellationToken, ProgressCallback, ProgressInfo, RenderOptions, Session,
//!     StillshotError, VideoSource,
//! };
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{}/{} ({} failed)", info.current, info.total, info.failed);
//!     }
//! }
//!
//! let mut session = Session::open(VideoSource::path("input.mp4"))?;
//! let options = RenderOptions::new().with_progress(Arc::new(PrintProgress));
//! let thumbnails = session.render_interval(60.0, 10, &options)?;
//! # Ok::<(), StillshotError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// A snapshot of batch progress, delivered after each item.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// How many items have been attempted so far.
    pub current: u64,
    /// How many items the batch contains.
    pub total: u64,
    /// How many of the attempted items failed.
    pub failed: u64,
    /// Completion percentage (0.0 – 100.0).
    pub percentage: f32,
    /// Wall-clock time elapsed since the batch started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Timestamp of the item just attempted, in seconds.
    pub current_timestamp: Option<f64>,
}

/// Trait for receiving progress updates during batch rendering.
///
/// Implementations must be [`Send`] and [`Sync`] because callbacks may be
/// invoked from rayon workers or blocking tokio threads.
///
/// Progress callbacks are **infallible**. Use [`CancellationToken`] to stop
/// a batch.
pub trait ProgressCallback: Send + Sync {
    /// Called after each batch item, whether it succeeded or not.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. Used when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clones share state; call [`cancel`](CancellationToken::cancel) from any
/// thread. Batch loops check the token before each item.
///
/// # Example
///
/// ```
/// use stillshot::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks batch timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: u64,
    current: u64,
    failed: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: u64) -> Self {
        Self {
            callback,
            total,
            current: 0,
            failed: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one attempted item and fire the callback.
    pub(crate) fn advance(&mut self, timestamp: f64, succeeded: bool) {
        self.current += 1;
        if !succeeded {
            self.failed += 1;
        }

        let elapsed = self.start_time.elapsed();
        let percentage = if self.total > 0 {
            (self.current as f32 / self.total as f32) * 100.0
        } else {
            100.0
        };
        let remaining = self.total.saturating_sub(self.current);
        let estimated_remaining = (self.current > 0).then(|| {
            let per_item = elapsed / self.current as u32;
            per_item * remaining as u32
        });

        self.callback.on_progress(&ProgressInfo {
            current: self.current,
            total: self.total,
            failed: self.failed,
            percentage,
            elapsed,
            estimated_remaining,
            current_timestamp: Some(timestamp),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Recording(Mutex<Vec<ProgressInfo>>);

    impl ProgressCallback for Recording {
        fn on_progress(&self, info: &ProgressInfo) {
            self.0.lock().unwrap().push(info.clone());
        }
    }

    #[test]
    fn tracker_counts_failures_and_percentage() {
        let recording = Arc::new(Recording(Mutex::new(Vec::new())));
        let mut tracker = ProgressTracker::new(recording.clone(), 4);
        tracker.advance(1.0, true);
        tracker.advance(2.0, false);

        let infos = recording.0.lock().unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[1].current, 2);
        assert_eq!(infos[1].failed, 1);
        assert!((infos[1].percentage - 50.0).abs() < f32::EPSILON);
        assert_eq!(infos[1].current_timestamp, Some(2.0));
    }

    #[test]
    fn clones_share_cancellation() {
        let token = CancellationToken::default();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
