//! CancellationToken and RenderOptions builder behaviour.

use std::time::Duration;

use stillshot::{BatchPolicy, CancellationToken, FitMode, ImageFormat, RenderOptions};

#[test]
fn cancellation_token_default_not_cancelled() {
    let token = CancellationToken::new();
    assert!(!token.is_cancelled());
}

#[test]
fn cancellation_token_clone_shares_state() {
    let token = CancellationToken::new();
    let clone = token.clone();
    assert!(!clone.is_cancelled());

    token.cancel();
    assert!(clone.is_cancelled());
}

#[test]
fn cancellation_across_threads() {
    let token = CancellationToken::new();
    let remote = token.clone();
    std::thread::spawn(move || remote.cancel())
        .join()
        .expect("thread should finish");
    assert!(token.is_cancelled());
}

#[test]
fn builder_overrides_only_what_is_set() {
    let options = RenderOptions::new()
        .with_format(ImageFormat::Png)
        .with_seek_timeout(Duration::from_millis(250));

    assert_eq!(options.format, ImageFormat::Png);
    assert_eq!(options.seek_timeout, Duration::from_millis(250));
    assert_eq!((options.width, options.height), (320, 180));
    assert_eq!(options.quality, 0.8);
    assert_eq!(options.fit, FitMode::Letterbox);
    assert_eq!(options.batch_policy, BatchPolicy::BestEffort);
}

#[test]
fn request_carries_options() {
    let options = RenderOptions::compact()
        .with_quality(0.5)
        .with_clamp_timestamps(true);
    let request = options.request(12.0);

    assert_eq!(request.timestamp_seconds, 12.0);
    assert_eq!((request.target_width, request.target_height), (160, 90));
    assert_eq!(request.quality, 0.5);
    assert!(request.clamp_timestamp);
}

#[test]
fn debug_output_names_settings() {
    let debug = format!("{:?}", RenderOptions::new().with_cancellation(CancellationToken::new()));
    assert!(debug.contains("RenderOptions"));
    assert!(debug.contains("has_cancellation: true"));
}
