//! Render configuration.
//!
//! [`RenderOptions`] is the one configuration-with-defaults struct passed by
//! reference into every render and batch call. It covers output geometry and
//! encoding (`width`, `height`, `quality`, `format`) as well as operational
//! settings: seek timeout, timestamp clamping, batch failure policy,
//! progress callback and cancellation token.
//!
//! | Setting        | Default                 |
//! |----------------|-------------------------|
//! | size           | 320×180 ([`compact`](RenderOptions::compact): 160×90) |
//! | quality        | 0.8                     |
//! | format         | JPEG                    |
//! | fit            | letterbox (black bars)  |
//! | seek timeout   | 10 s                    |
//! | clamping       | off                     |
//! | batch policy   | best effort             |
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use stillshot::{BatchPolicy, ImageFormat, RenderOptions};
//!
//! let options = RenderOptions::new()
//!     .with_size(640, 360)
//!     .with_format(ImageFormat::Webp)
//!     .with_quality(0.6)
//!     .with_seek_timeout(Duration::from_secs(2))
//!     .with_batch_policy(BatchPolicy::Strict);
//! assert_eq!(options.width, 640);
//! ```

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

use crate::error::StillshotError;
use crate::layout::FitMode;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Default thumbnail width.
pub const DEFAULT_WIDTH: u32 = 320;
/// Default thumbnail height.
pub const DEFAULT_HEIGHT: u32 = 180;
/// Default encoder quality for lossy formats.
pub const DEFAULT_QUALITY: f32 = 0.8;
/// Default upper bound for a single seek + decode.
pub const DEFAULT_SEEK_TIMEOUT: Duration = Duration::from_secs(10);

/// Output image encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// Lossy JPEG; quality applies.
    #[default]
    Jpeg,
    /// Lossless PNG; quality is ignored.
    Png,
    /// Lossy WebP; quality applies.
    Webp,
}

impl ImageFormat {
    /// MIME type used in data URLs.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Webp => "image/webp",
        }
    }

    /// Conventional file extension (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
        }
    }

    /// Whether the quality setting affects the output.
    pub fn is_lossy(self) -> bool {
        !matches!(self, ImageFormat::Png)
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
            ImageFormat::Webp => "WebP",
        };
        f.write_str(name)
    }
}

/// How a batch reacts to a failing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Log the failure, skip the item, continue with the rest.
    #[default]
    BestEffort,
    /// Stop at the first failure and return its error.
    Strict,
}

/// A single-frame render request.
///
/// Built from a timestamp and a [`RenderOptions`] via
/// [`RenderOptions::request`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    /// Where to sample, in seconds.
    pub timestamp_seconds: f64,
    /// Output width in pixels.
    pub target_width: u32,
    /// Output height in pixels.
    pub target_height: u32,
    /// Encoder quality in `[0, 1]`.
    pub quality: f32,
    /// Output format.
    pub format: ImageFormat,
    /// How the frame is fitted into the target box.
    pub fit: FitMode,
    /// Upper bound for the seek + decode.
    pub seek_timeout: Duration,
    /// Clamp a timestamp outside `[0, duration]` instead of rejecting it.
    pub clamp_timestamp: bool,
}

impl RenderRequest {
    /// Validate everything that can be checked without the source.
    ///
    /// # Errors
    ///
    /// Returns [`StillshotError::InvalidRequest`] for zero dimensions, a
    /// quality outside `[0, 1]`, a non-finite timestamp, or a negative one
    /// when clamping is off.
    pub fn validate(&self) -> Result<(), StillshotError> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(StillshotError::InvalidRequest(format!(
                "target dimensions must be positive, got {}x{}",
                self.target_width, self.target_height
            )));
        }
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(StillshotError::InvalidRequest(format!(
                "quality must be within [0, 1], got {}",
                self.quality
            )));
        }
        if !self.timestamp_seconds.is_finite()
            || (self.timestamp_seconds < 0.0 && !self.clamp_timestamp)
        {
            return Err(StillshotError::InvalidRequest(format!(
                "timestamp must be a non-negative number of seconds, got {}",
                self.timestamp_seconds
            )));
        }
        Ok(())
    }
}

/// Configuration for render and batch operations.
#[derive(Clone)]
pub struct RenderOptions {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Encoder quality in `[0, 1]`. Ignored for PNG.
    pub quality: f32,
    /// Output format.
    pub format: ImageFormat,
    /// Letterbox (default) or crop-to-fill.
    pub fit: FitMode,
    /// Upper bound for one seek + decode.
    pub seek_timeout: Duration,
    /// Clamp out-of-range timestamps into `[0, duration]` instead of
    /// rejecting them.
    pub clamp_timestamps: bool,
    /// Reaction to failing batch items.
    pub batch_policy: BatchPolicy,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
}

impl Debug for RenderOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RenderOptions")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("quality", &self.quality)
            .field("format", &self.format)
            .field("fit", &self.fit)
            .field("seek_timeout", &self.seek_timeout)
            .field("clamp_timestamps", &self.clamp_timestamps)
            .field("batch_policy", &self.batch_policy)
            .field("has_cancellation", &self.cancellation.is_some())
            .finish()
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderOptions {
    /// Create options with the documented defaults.
    pub fn new() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            quality: DEFAULT_QUALITY,
            format: ImageFormat::default(),
            fit: FitMode::default(),
            seek_timeout: DEFAULT_SEEK_TIMEOUT,
            clamp_timestamps: false,
            batch_policy: BatchPolicy::default(),
            progress: Arc::new(NoOpProgress),
            cancellation: None,
        }
    }

    /// The 160×90 preset used for dense timelines.
    pub fn compact() -> Self {
        Self::new().with_size(160, 90)
    }

    /// Set the output dimensions.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the encoder quality (`0.0` – `1.0`).
    #[must_use]
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the fit mode.
    #[must_use]
    pub fn with_fit(mut self, fit: FitMode) -> Self {
        self.fit = fit;
        self
    }

    /// Set the per-frame seek timeout.
    #[must_use]
    pub fn with_seek_timeout(mut self, timeout: Duration) -> Self {
        self.seek_timeout = timeout;
        self
    }

    /// Clamp out-of-range timestamps instead of rejecting them.
    #[must_use]
    pub fn with_clamp_timestamps(mut self, clamp: bool) -> Self {
        self.clamp_timestamps = clamp;
        self
    }

    /// Set the batch failure policy.
    #[must_use]
    pub fn with_batch_policy(mut self, policy: BatchPolicy) -> Self {
        self.batch_policy = policy;
        self
    }

    /// Attach a progress callback, fired after every batch item.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token, checked before every batch item.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Build the single-frame request for `timestamp_seconds`.
    pub fn request(&self, timestamp_seconds: f64) -> RenderRequest {
        RenderRequest {
            timestamp_seconds,
            target_width: self.width,
            target_height: self.height,
            quality: self.quality,
            format: self.format,
            fit: self.fit,
            seek_timeout: self.seek_timeout,
            clamp_timestamp: self.clamp_timestamps,
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
