//! Parallel rendering across sources (requires the `rayon` feature).

#![cfg(feature = "rayon")]

mod common;

use std::path::Path;

use common::SAMPLE_VIDEO;
use stillshot::{RenderOptions, StillshotError, VideoSource, render_sources_parallel};

#[test]
fn unreadable_source_does_not_affect_others() {
    let mut sources = vec![VideoSource::path("missing_a.mp4"), VideoSource::path("missing_b.mp4")];
    let fixture_present = Path::new(SAMPLE_VIDEO).exists();
    if fixture_present {
        sources.push(VideoSource::path(SAMPLE_VIDEO));
    }

    let results = render_sources_parallel(&sources, &[0.5, 1.0], &RenderOptions::compact());
    assert_eq!(results.len(), sources.len());
    assert!(matches!(results[0], Err(StillshotError::SourceUnreadable { .. })));
    assert!(matches!(results[1], Err(StillshotError::SourceUnreadable { .. })));
    if fixture_present {
        let thumbnails = results[2].as_ref().expect("fixture should render");
        assert_eq!(thumbnails.len(), 2);
    }
}
