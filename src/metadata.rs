//! Video metadata.
//!
//! [`VideoMetadata`] is probed once when a decoder is opened and is
//! immutable for the lifetime of the [`Session`](crate::Session).

use std::time::Duration;

/// Intrinsic properties of an opened video stream.
///
/// # Example
///
/// ```no_run
/// use stillshot::{Session, StillshotError, VideoSource};
///
/// let session = Session::open(VideoSource::path("input.mp4"))?;
/// let metadata = session.metadata()?;
/// println!("{}x{}, {:.1}s", metadata.width, metadata.height, metadata.duration_seconds());
/// # Ok::<(), StillshotError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Native frame width in pixels.
    pub width: u32,
    /// Native frame height in pixels.
    pub height: u32,
    /// Total duration of the stream.
    pub duration: Duration,
    /// Frames per second (approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
}

impl VideoMetadata {
    /// Duration in fractional seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }

    /// Native aspect ratio (`width / height`).
    ///
    /// Returns `1.0` for degenerate zero-height streams.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f64 / self.height as f64
        }
    }
}
