//! # stillshot
//!
//! Timestamp-addressed video thumbnails: open a video, seek to timestamps,
//! and get back scaled, letterboxed, encoded still frames, one at a time or
//! in batches keyed by timestamp or by event id.
//!
//! Decoding is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate; compositing
//! and encoding use the [`image`](https://crates.io/crates/image) crate.
//!
//! ## Quick Start
//!
//! ### One thumbnail
//!
//! ```no_run
//! use stillshot::{RenderOptions, Session, VideoSource};
//!
//! let mut session = Session::open(VideoSource::path("input.mp4")).unwrap();
//! let thumbnail = session.render_one(5.0, &RenderOptions::new()).unwrap();
//! thumbnail.save("frame_5s.jpg").unwrap();
//! ```
//!
//! ### Evenly spaced thumbnails, scoped session
//!
//! ```no_run
//! use stillshot::{ImageFormat, RenderOptions, VideoSource, with_session};
//!
//! let options = RenderOptions::compact().with_format(ImageFormat::Webp);
//! let thumbnails = with_session(&VideoSource::path("input.mp4"), |session| {
//!     let duration = session.metadata()?.duration_seconds();
//!     session.render_interval(duration, 10, &options)
//! })
//! .unwrap();
//! ```
//!
//! ### Event thumbnails
//!
//! ```no_run
//! use stillshot::{EventRef, RenderOptions, Session, VideoSource};
//!
//! let mut session = Session::open(VideoSource::path("match.mp4")).unwrap();
//! let events = vec![EventRef::span("goal", 10.0, 20.0), EventRef::at("kickoff", 0.5)];
//! let thumbnails = session.render_events(&events, &RenderOptions::new()).unwrap();
//! if !thumbnails.contains("goal") {
//!     eprintln!("goal thumbnail failed");
//! }
//! ```
//!
//! ## Behaviour
//!
//! - **Exact output size**: thumbnails are always the requested size; the
//!   frame keeps its aspect ratio and the rest is opaque black.
//! - **One seek at a time**: a [`Session`] renders through `&mut self`;
//!   independent sessions run in parallel freely.
//! - **Best-effort or strict batches**: see [`BatchPolicy`].
//! - **Deterministic release**: [`Session::dispose`], drop, or
//!   [`with_session`] release the decoder exactly once.
//! - **Bounded seeks**: each frame render carries a timeout.
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `async` | `ThumbnailStream` renders on a blocking Tokio thread |
//! | `rayon` | `render_sources_parallel()` renders many sources at once |
//! | `full`  | Enables all of the above |
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`](https://crates.io/crates/log) facade.
//! FFmpeg's own stderr output is tuned with [`set_ffmpeg_log_level`].

pub mod batch;
pub mod configuration;
mod conversion;
pub mod decoder;
pub mod encode;
pub mod error;
pub mod ffmpeg;
pub mod layout;
pub mod metadata;
#[cfg(feature = "rayon")]
mod parallel;
pub mod progress;
pub mod renderer;
pub mod session;
pub mod source;
#[cfg(feature = "async")]
pub mod stream;
pub mod thumbnail;

pub use batch::{BatchFailure, BatchOutcome, EventRef, EventThumbnails, interval_timestamps};
pub use configuration::{BatchPolicy, ImageFormat, RenderOptions, RenderRequest};
pub use decoder::{FfmpegDecoder, FrameDecoder};
pub use encode::encode;
pub use error::StillshotError;
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use layout::{FitLayout, FitMode};
pub use metadata::VideoMetadata;
#[cfg(feature = "rayon")]
pub use parallel::render_sources_parallel;
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo};
pub use renderer::PixelBuffer;
pub use session::{Session, with_decoder, with_session};
pub use source::VideoSource;
#[cfg(feature = "async")]
pub use stream::ThumbnailStream;
pub use thumbnail::Thumbnail;
