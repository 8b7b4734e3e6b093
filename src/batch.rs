//! Batch rendering.
//!
//! Three entry points sit on top of [`Session::render_one`]:
//!
//! - [`render_list`](Session::render_list): explicit timestamps, in order.
//! - [`render_interval`](Session::render_interval): `count` evenly spaced
//!   timestamps strictly inside `(0, duration)`.
//! - [`render_events`](Session::render_events): one thumbnail per
//!   [`EventRef`], keyed by event id.
//!
//! Items run strictly one after another against the session's single
//! decoder. Under [`BatchPolicy::BestEffort`] a failing item is logged and
//! left out of the result; a result shorter than the input (or an event
//! map missing ids) is how partial failure shows. Under
//! [`BatchPolicy::Strict`] the first failure ends the batch with its error.
//! Duplicate timestamps are rendered independently.

use std::collections::HashMap;

use crate::configuration::{BatchPolicy, RenderOptions};
use crate::error::StillshotError;
use crate::progress::ProgressTracker;
use crate::session::Session;
use crate::thumbnail::Thumbnail;

/// A caller-defined event to illustrate with one thumbnail.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRef {
    /// Key under which the thumbnail is returned.
    pub id: String,
    /// Event start, in seconds.
    pub start_seconds: f64,
    /// Optional event end, in seconds.
    pub end_seconds: Option<f64>,
}

impl EventRef {
    /// An instantaneous event sampled at `start_seconds`.
    pub fn at<S: Into<String>>(id: S, start_seconds: f64) -> Self {
        Self {
            id: id.into(),
            start_seconds,
            end_seconds: None,
        }
    }

    /// A ranged event sampled at the midpoint of `[start, end]`.
    pub fn span<S: Into<String>>(id: S, start_seconds: f64, end_seconds: f64) -> Self {
        Self {
            id: id.into(),
            start_seconds,
            end_seconds: Some(end_seconds),
        }
    }

    /// The timestamp this event is sampled at.
    pub fn sample_timestamp(&self) -> f64 {
        match self.end_seconds {
            Some(end) => (self.start_seconds + end) / 2.0,
            None => self.start_seconds,
        }
    }
}

/// Why one batch item produced no thumbnail.
#[derive(Debug)]
pub struct BatchFailure {
    /// Position of the item in the input.
    pub index: usize,
    /// Timestamp that was attempted, in seconds.
    pub timestamp_seconds: f64,
    /// Event id, for event batches.
    pub event_id: Option<String>,
    /// The error the item failed with.
    pub error: StillshotError,
}

/// Successful thumbnails plus a record of every skipped item.
#[derive(Debug, Default)]
pub struct BatchOutcome<T> {
    /// Produced results, in input order.
    pub thumbnails: T,
    /// Items that failed, in input order.
    pub failures: Vec<BatchFailure>,
    /// Whether the batch stopped early on cancellation.
    pub cancelled: bool,
}

impl<T> BatchOutcome<T> {
    /// Whether every item was rendered.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

/// Event thumbnails keyed by id, iterated in the callers' event order.
///
/// A failed event has no entry. When several events share an id the last
/// successful one wins and keeps the position of the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventThumbnails {
    entries: Vec<(String, Thumbnail)>,
}

impl EventThumbnails {
    fn insert(&mut self, id: String, thumbnail: Thumbnail) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = thumbnail,
            None => self.entries.push((id, thumbnail)),
        }
    }

    /// Thumbnail for `id`, if that event rendered.
    pub fn get(&self, id: &str) -> Option<&Thumbnail> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, thumbnail)| thumbnail)
    }

    /// Whether `id` rendered.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of rendered events.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no event rendered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(id, thumbnail)` pairs in event order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Thumbnail)> {
        self.entries
            .iter()
            .map(|(id, thumbnail)| (id.as_str(), thumbnail))
    }

    /// Convert into an unordered map.
    pub fn into_map(self) -> HashMap<String, Thumbnail> {
        self.entries.into_iter().collect()
    }
}

/// `count` timestamps evenly spaced strictly inside `(0, duration)`.
///
/// With `interval = duration / (count + 1)` the timestamps are
/// `interval, 2 × interval, …, count × interval`.
///
/// ```
/// assert_eq!(
///     stillshot::interval_timestamps(600.0, 5),
///     vec![100.0, 200.0, 300.0, 400.0, 500.0],
/// );
/// ```
pub fn interval_timestamps(duration_seconds: f64, count: usize) -> Vec<f64> {
    let interval = duration_seconds / (count as f64 + 1.0);
    (0..count).map(|index| (index as f64 + 1.0) * interval).collect()
}

/// One unit of batch work.
struct BatchItem<'e> {
    timestamp: f64,
    event_id: Option<&'e str>,
}

impl Session<'_> {
    /// Render `timestamps` in the given order.
    ///
    /// # Errors
    ///
    /// Under [`BatchPolicy::BestEffort`] only
    /// [`StillshotError::SessionClosed`]; individual failures are skipped.
    /// Under [`BatchPolicy::Strict`] the first item error, or
    /// [`StillshotError::Cancelled`].
    pub fn render_list(
        &mut self,
        timestamps: &[f64],
        options: &RenderOptions,
    ) -> Result<Vec<Thumbnail>, StillshotError> {
        Ok(self.render_list_with_report(timestamps, options)?.thumbnails)
    }

    /// Like [`render_list`](Session::render_list), also returning the
    /// failures that were skipped.
    ///
    /// # Errors
    ///
    /// Same as [`render_list`](Session::render_list).
    pub fn render_list_with_report(
        &mut self,
        timestamps: &[f64],
        options: &RenderOptions,
    ) -> Result<BatchOutcome<Vec<Thumbnail>>, StillshotError> {
        let items = timestamps.iter().map(|&timestamp| BatchItem {
            timestamp,
            event_id: None,
        });
        let mut thumbnails = Vec::with_capacity(timestamps.len());
        let (failures, cancelled) =
            self.run_batch(items, timestamps.len(), options, |_, thumbnail| {
                thumbnails.push(thumbnail);
            })?;
        Ok(BatchOutcome {
            thumbnails,
            failures,
            cancelled,
        })
    }

    /// Render `count` thumbnails evenly spaced across `duration_seconds`.
    ///
    /// `render_interval(600.0, 5, …)` samples 100, 200, 300, 400 and 500
    /// seconds. Pass the session's own duration (see
    /// [`metadata`](Session::metadata)) or a shorter span.
    ///
    /// # Errors
    ///
    /// [`StillshotError::InvalidRequest`] if `duration_seconds` is not a
    /// positive finite number, otherwise as
    /// [`render_list`](Session::render_list).
    pub fn render_interval(
        &mut self,
        duration_seconds: f64,
        count: usize,
        options: &RenderOptions,
    ) -> Result<Vec<Thumbnail>, StillshotError> {
        if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
            return Err(StillshotError::InvalidRequest(format!(
                "interval duration must be positive, got {duration_seconds}"
            )));
        }
        let timestamps = interval_timestamps(duration_seconds, count);
        log::debug!("Rendering {count} thumbnails across {duration_seconds:.3}s");
        self.render_list(&timestamps, options)
    }

    /// Render one thumbnail per event, keyed by event id.
    ///
    /// Ranged events are sampled at their midpoint, instantaneous ones at
    /// their start. Failed events are absent from the result.
    ///
    /// # Errors
    ///
    /// Same as [`render_list`](Session::render_list).
    pub fn render_events(
        &mut self,
        events: &[EventRef],
        options: &RenderOptions,
    ) -> Result<EventThumbnails, StillshotError> {
        Ok(self.render_events_with_report(events, options)?.thumbnails)
    }

    /// Like [`render_events`](Session::render_events), also returning the
    /// failures that were skipped.
    ///
    /// # Errors
    ///
    /// Same as [`render_list`](Session::render_list).
    pub fn render_events_with_report(
        &mut self,
        events: &[EventRef],
        options: &RenderOptions,
    ) -> Result<BatchOutcome<EventThumbnails>, StillshotError> {
        let items = events.iter().map(|event| BatchItem {
            timestamp: event.sample_timestamp(),
            event_id: Some(event.id.as_str()),
        });
        let mut thumbnails = EventThumbnails::default();
        let (failures, cancelled) =
            self.run_batch(items, events.len(), options, |id, thumbnail| {
                if let Some(id) = id {
                    thumbnails.insert(id.to_string(), thumbnail);
                }
            })?;
        Ok(BatchOutcome {
            thumbnails,
            failures,
            cancelled,
        })
    }

    /// Drive `items` through [`render_one`](Session::render_one) one at a
    /// time, honouring cancellation, progress and the batch policy.
    fn run_batch<'e, I, F>(
        &mut self,
        items: I,
        total: usize,
        options: &RenderOptions,
        mut collect: F,
    ) -> Result<(Vec<BatchFailure>, bool), StillshotError>
    where
        I: Iterator<Item = BatchItem<'e>>,
        F: FnMut(Option<&'e str>, Thumbnail),
    {
        if self.is_closed() {
            return Err(StillshotError::SessionClosed);
        }

        let mut tracker = ProgressTracker::new(options.progress.clone(), total as u64);
        let mut failures = Vec::new();

        for (index, item) in items.enumerate() {
            if options.is_cancelled() {
                log::debug!("Batch cancelled after {index} of {total} items");
                if options.batch_policy == BatchPolicy::Strict {
                    return Err(StillshotError::Cancelled);
                }
                return Ok((failures, true));
            }

            match self.render_one(item.timestamp, options) {
                Ok(thumbnail) => {
                    collect(item.event_id, thumbnail);
                    tracker.advance(item.timestamp, true);
                }
                Err(error) => {
                    tracker.advance(item.timestamp, false);
                    if options.batch_policy == BatchPolicy::Strict
                        || matches!(error, StillshotError::SessionClosed)
                    {
                        return Err(error);
                    }
                    log::warn!(
                        "Skipping batch item {index} at {:.3}s{}: {error}",
                        item.timestamp,
                        item.event_id
                            .map(|id| format!(" (event {id})"))
                            .unwrap_or_default(),
                    );
                    failures.push(BatchFailure {
                        index,
                        timestamp_seconds: item.timestamp,
                        event_id: item.event_id.map(str::to_string),
                        error,
                    });
                }
            }
        }

        Ok((failures, false))
    }
}
