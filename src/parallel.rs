//! Parallel rendering across independent sources.
//!
//! Each source gets its own [`Session`](crate::Session) on a rayon worker,
//! so no decoder is ever shared between threads. Within a session items
//! still run one at a time.

use ::rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::configuration::RenderOptions;
use crate::error::StillshotError;
use crate::session::with_session;
use crate::source::VideoSource;
use crate::thumbnail::Thumbnail;

/// Render the same `timestamps` from every source in parallel.
///
/// Returns one result per source, in the order of `sources`. A source that
/// cannot be opened yields `Err` without affecting the others; inside each
/// source the batch policy of `options` applies as in
/// [`Session::render_list`](crate::Session::render_list).
///
/// # Example
///
/// ```no_run
/// use stillshot::{RenderOptions, VideoSource, render_sources_parallel};
///
/// let sources = vec![VideoSource::path("a.mp4"), VideoSource::path("b.mp4")];
/// let results = render_sources_parallel(&sources, &[1.0, 2.0], &RenderOptions::new());
/// for result in results {
///     println!("{:?}", result.map(|thumbnails| thumbnails.len()));
/// }
/// ```
pub fn render_sources_parallel(
    sources: &[VideoSource],
    timestamps: &[f64],
    options: &RenderOptions,
) -> Vec<Result<Vec<Thumbnail>, StillshotError>> {
    log::debug!(
        "Rendering {} timestamps from {} sources in parallel",
        timestamps.len(),
        sources.len()
    );
    sources
        .par_iter()
        .map(|source| {
            if options.is_cancelled() {
                return Err(StillshotError::Cancelled);
            }
            with_session(source, |session| session.render_list(timestamps, options))
        })
        .collect()
}
