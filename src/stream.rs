//! Async thumbnail streaming.
//!
//! [`ThumbnailStream`] renders a list of timestamps on a
//! `tokio::task::spawn_blocking` thread and yields each result through a
//! bounded channel, keeping FFmpeg work off the async executor. The session
//! lives entirely on the blocking thread and is disposed when rendering
//! ends or the stream is dropped.
//!
//! # Example
//!
//! ```no_run
//! use tokio_stream::StreamExt;
//!
//! use stillshot::{RenderOptions, StillshotError, ThumbnailStream, VideoSource};
//!
//! # async fn example() -> Result<(), StillshotError> {
//! let mut stream = ThumbnailStream::spawn(
//!     VideoSource::path("input.mp4"),
//!     vec![1.0, 2.0, 3.0],
//!     RenderOptions::new(),
//! );
//! while let Some(result) = stream.next().await {
//!     let thumbnail = result?;
//!     println!("{}s: {} bytes", thumbnail.timestamp_seconds, thumbnail.payload.len());
//! }
//! # Ok(())
//! # }
//! ```

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinHandle;
use tokio_stream::Stream;

use crate::configuration::RenderOptions;
use crate::error::StillshotError;
use crate::session::Session;
use crate::source::VideoSource;
use crate::thumbnail::Thumbnail;

/// Bounded channel capacity. Small, since each item holds an encoded image.
const DEFAULT_CHANNEL_CAPACITY: usize = 8;

/// A stream of per-timestamp render results.
///
/// Every item is forwarded, failures included, so the consumer decides
/// whether to skip or stop. Dropping the stream closes the channel and the
/// background thread stops before the next item.
pub struct ThumbnailStream {
    receiver: Receiver<Result<Thumbnail, StillshotError>>,
    #[allow(dead_code)]
    handle: JoinHandle<()>,
}

impl ThumbnailStream {
    /// Start rendering `timestamps` from `source` in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(source: VideoSource, timestamps: Vec<f64>, options: RenderOptions) -> Self {
        let (sender, receiver) = tokio::sync::mpsc::channel(DEFAULT_CHANNEL_CAPACITY);
        let handle = tokio::task::spawn_blocking(move || {
            render_into(source, &timestamps, &options, &sender);
        });
        Self { receiver, handle }
    }
}

fn render_into(
    source: VideoSource,
    timestamps: &[f64],
    options: &RenderOptions,
    sender: &Sender<Result<Thumbnail, StillshotError>>,
) {
    let mut session = match Session::open(source) {
        Ok(session) => session,
        Err(error) => {
            let _ = sender.blocking_send(Err(error));
            return;
        }
    };

    for &timestamp in timestamps {
        if options.is_cancelled() {
            let _ = sender.blocking_send(Err(StillshotError::Cancelled));
            break;
        }
        let result = session.render_one(timestamp, options);
        if sender.blocking_send(result).is_err() {
            log::debug!("Thumbnail stream dropped; stopping at {timestamp:.3}s");
            break;
        }
    }

    session.dispose();
}

impl Stream for ThumbnailStream {
    type Item = Result<Thumbnail, StillshotError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
