//! Error types for the `stillshot` crate.
//!
//! This module defines [`StillshotError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry enough context to tell
//! which source, timestamp, or request failed without extra logging at the
//! call site.

use std::{io::Error as IoError, time::Duration};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `stillshot` operations.
///
/// Single-frame operations surface these directly. Batch operations catch
/// them per item and only fail as a whole under
/// [`BatchPolicy::Strict`](crate::BatchPolicy::Strict).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StillshotError {
    /// The video source could not be opened or probed.
    #[error("Failed to open video source {source_name}: {reason}")]
    SourceUnreadable {
        /// Display form of the source (path, URL, or `<memory: N bytes>`).
        source_name: String,
        /// Underlying reason the probe failed.
        reason: String,
    },

    /// The source has no decodable video stream.
    #[error("No video stream found in source")]
    NoVideoStream,

    /// The seek did not settle within the configured bound.
    #[error("Seek to {timestamp:.3}s did not complete within {timeout:?}")]
    SeekTimeout {
        /// Target timestamp in seconds.
        timestamp: f64,
        /// The bound that expired.
        timeout: Duration,
    },

    /// No frame could be produced at the resolved position.
    #[error("Failed to decode video frame: {0}")]
    DecodeError(String),

    /// The pixel buffer could not be encoded to the requested format.
    #[error("Failed to encode thumbnail: {0}")]
    EncodeError(String),

    /// The session was already disposed.
    #[error("Session is closed")]
    SessionClosed,

    /// The request failed validation (dimensions, quality, or timestamp).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A strict batch was stopped via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// An I/O error occurred while staging or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),
}

impl From<FfmpegError> for StillshotError {
    fn from(error: FfmpegError) -> Self {
        StillshotError::DecodeError(format!("FFmpeg: {error}"))
    }
}
