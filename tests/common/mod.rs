//! Shared test support: a deterministic in-process decoder.

#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::{Duration, Instant};

use image::{Rgb, RgbImage};
use stillshot::{FrameDecoder, StillshotError, VideoMetadata};

pub const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

/// Counters observed by tests after the decoder has moved into a session.
#[derive(Debug, Clone, Default)]
pub struct Probes {
    pub releases: Arc<AtomicUsize>,
    pub decodes: Arc<AtomicUsize>,
}

impl Probes {
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn decodes(&self) -> usize {
        self.decodes.load(Ordering::SeqCst)
    }
}

/// Produces frames whose pixels depend only on the timestamp.
///
/// Every pixel is `[red, x, y]` where `red` encodes the timestamp, so equal
/// timestamps give identical frames and different ones do not.
pub struct SyntheticDecoder {
    metadata: VideoMetadata,
    probes: Probes,
    corrupt_at: Vec<f64>,
    stall_at: Vec<f64>,
    released: bool,
}

impl SyntheticDecoder {
    pub fn new(width: u32, height: u32, duration_seconds: f64) -> Self {
        Self {
            metadata: VideoMetadata {
                width,
                height,
                duration: Duration::from_secs_f64(duration_seconds),
                frames_per_second: 25.0,
                codec: "synthetic".to_string(),
            },
            probes: Probes::default(),
            corrupt_at: Vec::new(),
            stall_at: Vec::new(),
            released: false,
        }
    }

    /// 1280×720, 60 seconds.
    pub fn hd() -> Self {
        Self::new(1280, 720, 60.0)
    }

    /// Fail with a decode error at `timestamp`.
    pub fn corrupt_at(mut self, timestamp: f64) -> Self {
        self.corrupt_at.push(timestamp);
        self
    }

    /// Never finish seeking to `timestamp`.
    pub fn stall_at(mut self, timestamp: f64) -> Self {
        self.stall_at.push(timestamp);
        self
    }

    pub fn probes(&self) -> Probes {
        self.probes.clone()
    }
}

impl FrameDecoder for SyntheticDecoder {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn decode_at(
        &mut self,
        timestamp_seconds: f64,
        deadline: Instant,
    ) -> Result<RgbImage, StillshotError> {
        if self.released {
            return Err(StillshotError::DecodeError("decoder released".to_string()));
        }
        self.probes.decodes.fetch_add(1, Ordering::SeqCst);

        if self.stall_at.contains(&timestamp_seconds) {
            let now = Instant::now();
            if deadline > now {
                std::thread::sleep(deadline - now);
            }
            return Err(StillshotError::SeekTimeout {
                timestamp: timestamp_seconds,
                timeout: Duration::ZERO,
            });
        }
        if self.corrupt_at.contains(&timestamp_seconds) {
            return Err(StillshotError::DecodeError(format!(
                "corrupt region at {timestamp_seconds}"
            )));
        }

        let red = ((timestamp_seconds * 4.0) as u32 % 200 + 50) as u8;
        Ok(RgbImage::from_fn(
            self.metadata.width,
            self.metadata.height,
            |x, y| Rgb([red, (x % 256) as u8, (y % 256) as u8]),
        ))
    }

    fn release(&mut self) {
        self.released = true;
        self.probes.releases.fetch_add(1, Ordering::SeqCst);
    }
}
