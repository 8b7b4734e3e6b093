//! FFmpeg initialisation and log level configuration.
//!
//! FFmpeg prints its own warnings to stderr, separately from the Rust
//! [`log`](https://crates.io/crates/log) facade. [`set_ffmpeg_log_level`]
//! tunes or silences that output without importing `ffmpeg-next` directly.
//! Rust-side diagnostics from this crate go through `log` and are configured
//! with whatever logger the application installs.
//!
//! # Example
//!
//! ```no_run
//! use stillshot::FfmpegLogLevel;
//!
//! stillshot::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! ```

use std::sync::OnceLock;

use ffmpeg_next::util::log::Level;

use crate::error::StillshotError;

/// FFmpeg internal log verbosity, from quietest to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// No output at all.
    Quiet,
    /// Unrecoverable errors only.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Debugging messages.
    Debug,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Debug => Level::Debug,
        }
    }

    fn from_ffmpeg_level(level: Level) -> Option<Self> {
        match level {
            Level::Quiet => Some(FfmpegLogLevel::Quiet),
            Level::Panic | Level::Fatal => Some(FfmpegLogLevel::Fatal),
            Level::Error => Some(FfmpegLogLevel::Error),
            Level::Warning => Some(FfmpegLogLevel::Warning),
            Level::Info | Level::Verbose => Some(FfmpegLogLevel::Info),
            Level::Debug | Level::Trace => Some(FfmpegLogLevel::Debug),
        }
    }
}

/// Set FFmpeg's own stderr verbosity. Does not affect `log` output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

/// Current FFmpeg stderr verbosity, if it maps to a known level.
pub fn get_ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    ffmpeg_next::util::log::get_level()
        .ok()
        .and_then(FfmpegLogLevel::from_ffmpeg_level)
}

/// Initialise FFmpeg once per process.
///
/// The outcome of the first call is remembered; later calls return it
/// without touching FFmpeg again.
pub(crate) fn initialize() -> Result<(), StillshotError> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();

    INIT.get_or_init(|| {
        log::debug!("Initialising FFmpeg");
        ffmpeg_next::init().map_err(|error| error.to_string())
    })
    .clone()
    .map_err(|reason| StillshotError::SourceUnreadable {
        source_name: "<ffmpeg>".to_string(),
        reason: format!("FFmpeg initialisation failed: {reason}"),
    })
}
