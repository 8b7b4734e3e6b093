//! Error handling for the FFmpeg backend.
//!
//! Fixture-based tests are skipped when `tests/fixtures/sample_video.mp4`
//! is absent.

mod common;

use std::path::Path;
use std::time::{Duration, Instant};

use common::SAMPLE_VIDEO;
use stillshot::{
    FfmpegDecoder, FrameDecoder, RenderOptions, Session, StillshotError, VideoSource,
    with_session,
};

#[test]
fn open_nonexistent_file() {
    let result = Session::open(VideoSource::path("this_file_does_not_exist.mp4"));
    let error = result.expect_err("missing file should not open");

    assert!(matches!(error, StillshotError::SourceUnreadable { .. }));
    let message = error.to_string();
    assert!(
        message.contains("this_file_does_not_exist.mp4"),
        "Error should name the source: {message}",
    );
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = Session::open(VideoSource::path(&invalid_file_path));
    assert!(result.is_err(), "Expected error for invalid media file");
}

#[test]
fn open_invalid_memory_buffer() {
    let result = Session::open(VideoSource::memory(b"definitely not a container".to_vec()));
    assert!(matches!(
        result,
        Err(StillshotError::SourceUnreadable { .. }) | Err(StillshotError::NoVideoStream)
    ));
}

#[test]
fn scoped_session_surfaces_open_error() {
    let result = with_session(&VideoSource::path("missing.mp4"), |session| {
        session.render_one(0.0, &RenderOptions::new())
    });
    assert!(matches!(result, Err(StillshotError::SourceUnreadable { .. })));
}

#[test]
fn fixture_renders_exact_dimensions() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let mut session = Session::open(VideoSource::path(SAMPLE_VIDEO)).expect("Failed to open fixture");
    let duration = session.metadata().expect("open").duration_seconds();
    let options = RenderOptions::new().with_size(100, 100);
    let buffer = session
        .render_frame(&options.request(duration / 2.0))
        .expect("Failed to render");
    assert_eq!(buffer.dimensions(), (100, 100));
}

#[test]
fn fixture_out_of_range_timestamp() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let mut session = Session::open(VideoSource::path(SAMPLE_VIDEO)).expect("Failed to open fixture");
    let result = session.render_one(3600.0, &RenderOptions::new());
    let message = result.expect_err("one hour is past the fixture").to_string();
    assert!(message.contains("Invalid request"), "{message}");
}

#[test]
fn fixture_from_memory_matches_path() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let bytes = std::fs::read(SAMPLE_VIDEO).expect("Failed to read fixture");
    let options = RenderOptions::compact().with_format(stillshot::ImageFormat::Png);

    let from_path = with_session(&VideoSource::path(SAMPLE_VIDEO), |session| {
        session.render_one(1.0, &options)
    })
    .expect("render from path");
    let from_memory = with_session(&VideoSource::memory(bytes), |session| {
        session.render_one(1.0, &options)
    })
    .expect("render from memory");

    assert_eq!(from_path.payload, from_memory.payload);
}

#[test]
fn fixture_repeated_seek_is_deterministic() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let mut session = Session::open(VideoSource::path(SAMPLE_VIDEO)).expect("Failed to open fixture");
    let request = RenderOptions::new().request(2.0);
    let first = session.render_frame(&request).expect("first render");
    let _ = session.render_frame(&RenderOptions::new().request(0.5));
    let second = session.render_frame(&request).expect("second render");
    assert_eq!(first, second);

    session.dispose();
    assert!(matches!(
        session.render_frame(&request),
        Err(StillshotError::SessionClosed)
    ));
}

#[test]
fn fixture_passed_deadline_times_out() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let mut decoder =
        FfmpegDecoder::open(&VideoSource::path(SAMPLE_VIDEO)).expect("Failed to open fixture");
    let result = decoder.decode_at(2.0, Instant::now());
    assert!(
        matches!(result, Err(StillshotError::SeekTimeout { .. })),
        "expected SeekTimeout, got {result:?}",
    );
}

#[test]
fn fixture_zero_probe_timeout_is_unreadable() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let result = FfmpegDecoder::open_with_timeout(&VideoSource::path(SAMPLE_VIDEO), Duration::ZERO);
    assert!(matches!(result, Err(StillshotError::SourceUnreadable { .. })));
}
