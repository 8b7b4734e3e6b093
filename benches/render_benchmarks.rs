//! Benchmarks for single-frame and batch rendering.
//!
//! Run with: cargo bench
//!
//! Requires `tests/fixtures/sample_video.mp4` (see
//! `tests/fixtures/generate_fixtures.sh`).

use std::path::Path;

use criterion::{Criterion, criterion_group, criterion_main};
use image::{Rgb, RgbImage};
use stillshot::{
    FfmpegLogLevel, ImageFormat, RenderOptions, Session, VideoSource, encode,
    set_ffmpeg_log_level,
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn benchmark_encoding(criterion: &mut Criterion) {
    let buffer = RgbImage::from_fn(320, 180, |x, y| Rgb([x as u8, y as u8, 96]));

    for format in [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::Webp] {
        criterion.bench_function(&format!("encode 320x180 {format}"), |bencher| {
            bencher.iter(|| encode(&buffer, 0.0, format, 0.8).unwrap());
        });
    }
}

fn benchmark_single_frame(criterion: &mut Criterion) {
    set_ffmpeg_log_level(FfmpegLogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let mut session = Session::open(VideoSource::path(SAMPLE_VIDEO)).unwrap();
    let options = RenderOptions::new();

    criterion.bench_function("render one thumbnail (mid-video seek)", |bencher| {
        bencher.iter(|| session.render_one(2.5, &options).unwrap());
    });
}

fn benchmark_interval(criterion: &mut Criterion) {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let mut session = Session::open(VideoSource::path(SAMPLE_VIDEO)).unwrap();
    let duration = session.metadata().unwrap().duration_seconds();
    let options = RenderOptions::compact();

    criterion.bench_function("render 10 interval thumbnails", |bencher| {
        bencher.iter(|| session.render_interval(duration, 10, &options).unwrap());
    });
}

criterion_group!(
    benches,
    benchmark_encoding,
    benchmark_single_frame,
    benchmark_interval
);
criterion_main!(benches);
