//! Session acquisition, disposal, and release guarantees.

mod common;

use std::panic::{AssertUnwindSafe, catch_unwind};

use common::SyntheticDecoder;
use stillshot::{FrameDecoder, RenderOptions, Session, StillshotError, with_decoder};

#[test]
fn render_after_dispose_is_session_closed() {
    let mut session = Session::from_decoder(Box::new(SyntheticDecoder::hd()));
    session.dispose();

    let result = session.render_frame(&RenderOptions::new().request(1.0));
    assert!(matches!(result, Err(StillshotError::SessionClosed)));
    assert!(matches!(
        session.render_one(1.0, &RenderOptions::new()),
        Err(StillshotError::SessionClosed)
    ));
    assert!(matches!(session.metadata(), Err(StillshotError::SessionClosed)));
    assert!(session.is_closed());
}

#[test]
fn double_dispose_is_a_no_op() {
    let decoder = SyntheticDecoder::hd();
    let probes = decoder.probes();
    let mut session = Session::from_decoder(Box::new(decoder));

    session.dispose();
    session.dispose();
    drop(session);

    assert_eq!(probes.releases(), 1);
}

#[test]
fn drop_releases_owned_decoder() {
    let decoder = SyntheticDecoder::hd();
    let probes = decoder.probes();
    {
        let mut session = Session::from_decoder(Box::new(decoder));
        session
            .render_one(1.0, &RenderOptions::new())
            .expect("render should succeed");
    }
    assert_eq!(probes.releases(), 1);
}

#[test]
fn batch_on_disposed_session_fails() {
    let mut session = Session::from_decoder(Box::new(SyntheticDecoder::hd()));
    session.dispose();
    let result = session.render_list(&[1.0, 2.0], &RenderOptions::new());
    assert!(matches!(result, Err(StillshotError::SessionClosed)));
}

#[test]
fn attached_decoder_is_not_released() {
    let mut decoder = SyntheticDecoder::hd();
    let probes = decoder.probes();
    {
        let mut session = Session::attach(&mut decoder);
        session
            .render_one(2.0, &RenderOptions::new())
            .expect("render should succeed");
        session.dispose();
        assert!(session.is_closed());
    }
    assert_eq!(probes.releases(), 0);

    // The caller's decoder is still usable after the session is gone.
    let frame = decoder
        .decode_at(3.0, std::time::Instant::now() + std::time::Duration::from_secs(1))
        .expect("decoder should still work");
    assert_eq!(frame.dimensions(), (1280, 720));
}

#[test]
fn scoped_session_releases_on_success() {
    let decoder = SyntheticDecoder::hd();
    let probes = decoder.probes();
    let thumbnails = with_decoder(Box::new(decoder), |session| {
        session.render_interval(60.0, 3, &RenderOptions::compact())
    })
    .expect("scoped batch should succeed");

    assert_eq!(thumbnails.len(), 3);
    assert_eq!(probes.releases(), 1);
}

#[test]
fn scoped_session_releases_on_error() {
    let decoder = SyntheticDecoder::hd();
    let probes = decoder.probes();
    let result: Result<(), StillshotError> = with_decoder(Box::new(decoder), |session| {
        session.render_one(1.0, &RenderOptions::new())?;
        Err(StillshotError::DecodeError("caller bailed out".to_string()))
    });

    assert!(result.is_err());
    assert_eq!(probes.releases(), 1);
}

#[test]
fn scoped_session_releases_on_panic() {
    let decoder = SyntheticDecoder::hd();
    let probes = decoder.probes();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let _: Result<(), StillshotError> = with_decoder(Box::new(decoder), |_session| {
            panic!("caller panicked mid-session");
        });
    }));

    assert!(outcome.is_err());
    assert_eq!(probes.releases(), 1);
}

#[test]
fn forced_decode_error_mid_batch_releases_once() {
    let decoder = SyntheticDecoder::hd().corrupt_at(20.0);
    let probes = decoder.probes();
    let thumbnails = with_decoder(Box::new(decoder), |session| {
        session.render_list(&[10.0, 20.0, 30.0], &RenderOptions::new())
    })
    .expect("best-effort batch should not fail");

    assert_eq!(thumbnails.len(), 2);
    assert_eq!(probes.decodes(), 3);
    assert_eq!(probes.releases(), 1);
}

#[test]
fn metadata_is_stable() {
    let session = Session::from_decoder(Box::new(SyntheticDecoder::new(640, 480, 12.0)));
    let first = session.metadata().expect("open session").clone();
    let second = session.metadata().expect("open session");
    assert_eq!(&first, second);
    assert_eq!((first.width, first.height), (640, 480));
    assert_eq!(first.duration_seconds(), 12.0);
}

#[test]
fn debug_reports_ownership() {
    let mut session = Session::from_decoder(Box::new(SyntheticDecoder::hd()));
    assert!(format!("{session:?}").contains("owned"));
    session.dispose();
    assert!(format!("{session:?}").contains("closed"));
}
