//! Seek-and-decode backends.
//!
//! [`FrameDecoder`] is the seam between a [`Session`](crate::Session) and
//! whatever produces native-resolution frames. [`FfmpegDecoder`] is the
//! production backend; callers may supply their own implementation (for
//! instance a decoder they already own) and attach it to a session.
//!
//! A decoder is never re-entered: the session holds it behind `&mut` and
//! issues one seek at a time.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::{
    configuration::DEFAULT_SEEK_TIMEOUT,
    conversion,
    error::StillshotError,
    metadata::VideoMetadata,
    source::{StagedSource, VideoSource},
};

/// A seekable source of decoded frames.
///
/// Implementations own (or wrap) one decoder handle. Calls are strictly
/// sequential; [`decode_at`](FrameDecoder::decode_at) may move the read
/// position arbitrarily and nothing restores it afterwards.
pub trait FrameDecoder {
    /// Intrinsic properties of the stream. Stable for the decoder's lifetime.
    fn metadata(&self) -> &VideoMetadata;

    /// Seek to `timestamp_seconds` and return the first frame presented at
    /// or after it, at native resolution.
    ///
    /// Implementations must give up with [`StillshotError::SeekTimeout`]
    /// once `deadline` has passed.
    ///
    /// # Errors
    ///
    /// [`StillshotError::SeekTimeout`] or [`StillshotError::DecodeError`].
    fn decode_at(
        &mut self,
        timestamp_seconds: f64,
        deadline: Instant,
    ) -> Result<RgbImage, StillshotError>;

    /// Release underlying resources. Called exactly once by an owning
    /// session; later `decode_at` calls should fail.
    fn release(&mut self) {}
}

/// Shared deadline read by FFmpeg's interrupt callback.
#[derive(Clone, Default)]
struct SeekDeadline(Arc<Mutex<Option<Instant>>>);

impl SeekDeadline {
    fn arm(&self, deadline: Instant) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = Some(deadline);
        }
    }

    fn disarm(&self) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = None;
        }
    }

    fn expired(&self) -> bool {
        self.0
            .lock()
            .map(|slot| slot.is_some_and(|deadline| Instant::now() >= deadline))
            .unwrap_or(false)
    }
}

/// Open demuxer state, dropped on release.
struct OpenStream {
    input: Input,
    decoder: VideoDecoder,
    stream_index: usize,
    time_base: Rational,
    staged: StagedSource,
}

/// FFmpeg-backed [`FrameDecoder`].
///
/// Opens the container once, keeps one video decoder for the lifetime of
/// the handle, and reuses it across seeks (flushing between them).
///
/// # Example
///
/// ```no_run
/// use stillshot::{FfmpegDecoder, FrameDecoder, StillshotError, VideoSource};
///
/// let decoder = FfmpegDecoder::open(&VideoSource::path("input.mp4"))?;
/// println!("{:?}", decoder.metadata());
/// # Ok::<(), StillshotError>(())
/// ```
pub struct FfmpegDecoder {
    stream: Option<OpenStream>,
    metadata: VideoMetadata,
    deadline: SeekDeadline,
    source_name: String,
}

impl Debug for FfmpegDecoder {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FfmpegDecoder")
            .field("source", &self.source_name)
            .field("metadata", &self.metadata)
            .field("released", &self.stream.is_none())
            .finish_non_exhaustive()
    }
}

impl FfmpegDecoder {
    /// Open and probe `source`, giving the probe [`DEFAULT_SEEK_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// [`StillshotError::SourceUnreadable`] if the container or codec cannot
    /// be probed in time, [`StillshotError::NoVideoStream`] if there is no
    /// video.
    pub fn open(source: &VideoSource) -> Result<Self, StillshotError> {
        Self::open_with_timeout(source, DEFAULT_SEEK_TIMEOUT)
    }

    /// Like [`open`](FfmpegDecoder::open) with an explicit upper bound on
    /// opening and probing the container.
    ///
    /// # Errors
    ///
    /// As [`open`](FfmpegDecoder::open).
    pub fn open_with_timeout(
        source: &VideoSource,
        probe_timeout: Duration,
    ) -> Result<Self, StillshotError> {
        crate::ffmpeg::initialize()?;

        let source_name = source.to_string();
        let unreadable = |reason: String| StillshotError::SourceUnreadable {
            source_name: source_name.clone(),
            reason,
        };

        log::debug!("Opening video source: {source_name}");

        let staged = source.stage()?;
        let deadline = SeekDeadline::default();
        let interrupt = deadline.clone();
        if let Some(probe_deadline) = Instant::now().checked_add(probe_timeout) {
            deadline.arm(probe_deadline);
        }
        let opened = ffmpeg_next::format::input_with_interrupt(&staged.location, move || {
            interrupt.expired()
        });
        let timed_out = deadline.expired();
        deadline.disarm();
        let input = opened.map_err(|error| {
            if timed_out {
                unreadable(format!("probe did not finish within {probe_timeout:?}"))
            } else {
                unreadable(error.to_string())
            }
        })?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or(StillshotError::NoVideoStream)?;
        let stream_index = stream.index();
        let time_base = stream.time_base();

        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| unreadable(format!("Failed to read codec parameters: {error}")))?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| unreadable(format!("Failed to create video decoder: {error}")))?;

        let frames_per_second = match conversion::rate_to_fps(stream.avg_frame_rate()) {
            fps if fps > 0.0 => fps,
            _ => conversion::rate_to_fps(stream.rate()),
        };

        let container_duration = input.duration();
        let duration = if container_duration > 0 {
            Duration::from_micros(container_duration as u64)
        } else if stream.duration() > 0 {
            Duration::from_secs_f64(conversion::pts_to_seconds(stream.duration(), time_base))
        } else {
            Duration::ZERO
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            duration,
            frames_per_second,
            codec,
        };

        if metadata.width == 0 || metadata.height == 0 {
            return Err(unreadable("video stream reports zero dimensions".to_string()));
        }

        log::info!(
            "Opened video source: {} ({}x{}, {:.2}s, {:.2} fps, codec={})",
            source_name,
            metadata.width,
            metadata.height,
            metadata.duration_seconds(),
            metadata.frames_per_second,
            metadata.codec,
        );

        Ok(Self {
            stream: Some(OpenStream {
                input,
                decoder,
                stream_index,
                time_base,
                staged,
            }),
            metadata,
            deadline,
            source_name,
        })
    }

    /// Half a frame interval, used to accept a frame whose PTS rounds to
    /// just before the target.
    fn tolerance(&self) -> f64 {
        if self.metadata.frames_per_second > 0.0 {
            0.5 / self.metadata.frames_per_second
        } else {
            0.001
        }
    }

    fn timeout_error(timestamp_seconds: f64, started: Instant, deadline: Instant) -> StillshotError {
        StillshotError::SeekTimeout {
            timestamp: timestamp_seconds,
            timeout: deadline.saturating_duration_since(started),
        }
    }

    fn seek_and_decode(
        &mut self,
        timestamp_seconds: f64,
        started: Instant,
        deadline: Instant,
    ) -> Result<RgbImage, StillshotError> {
        let tolerance = self.tolerance();
        let expired = self.deadline.clone();
        let stream = self.stream.as_mut().ok_or(StillshotError::SessionClosed)?;
        let OpenStream {
            input,
            decoder,
            stream_index,
            time_base,
            ..
        } = stream;

        let target = conversion::seconds_to_seek_timestamp(timestamp_seconds);
        if let Err(error) = input.seek(target, ..target) {
            if expired.expired() {
                return Err(Self::timeout_error(timestamp_seconds, started, deadline));
            }
            return Err(StillshotError::DecodeError(format!(
                "seek to {timestamp_seconds:.3}s failed: {error}"
            )));
        }
        decoder.flush();

        let mut scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ScalingFlags::BILINEAR,
        )?;

        let time_base = *time_base;
        let frame_seconds = |frame: &VideoFrame| {
            conversion::pts_to_seconds(frame.timestamp().or(frame.pts()).unwrap_or(0), time_base)
        };

        let mut decoded = VideoFrame::empty();
        // Frames before the target stay in decoder format; only the one
        // returned is converted.
        let mut last_seen: Option<VideoFrame> = None;

        loop {
            if expired.expired() {
                return Err(Self::timeout_error(timestamp_seconds, started, deadline));
            }

            let mut packet = Packet::empty();
            match packet.read(input) {
                Ok(()) => {
                    if packet.stream() != *stream_index {
                        continue;
                    }
                    // Corrupt packets are skipped; the decoder resyncs at the next one.
                    if let Err(error) = decoder.send_packet(&packet) {
                        log::debug!("Skipping undecodable packet: {error}");
                        continue;
                    }
                }
                Err(FfmpegError::Eof) => break,
                // The interrupt callback surfaces as a read error once the
                // deadline passes, so this must not retry.
                Err(error) => {
                    if expired.expired() {
                        return Err(Self::timeout_error(timestamp_seconds, started, deadline));
                    }
                    return Err(StillshotError::DecodeError(format!(
                        "reading packets towards {timestamp_seconds:.3}s failed: {error}"
                    )));
                }
            }

            while decoder.receive_frame(&mut decoded).is_ok() {
                let seconds = frame_seconds(&decoded);
                if seconds + tolerance >= timestamp_seconds {
                    log::debug!("Resolved {timestamp_seconds:.3}s to frame at {seconds:.3}s");
                    return scale_to_image(&mut scaler, &decoded);
                }
                last_seen = Some(std::mem::replace(&mut decoded, VideoFrame::empty()));
            }
        }

        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded).is_ok() {
            if frame_seconds(&decoded) + tolerance >= timestamp_seconds {
                return scale_to_image(&mut scaler, &decoded);
            }
            last_seen = Some(std::mem::replace(&mut decoded, VideoFrame::empty()));
        }

        // Timestamps at the very end of the stream resolve to the final frame.
        match last_seen {
            Some(frame) => scale_to_image(&mut scaler, &frame),
            None => Err(StillshotError::DecodeError(format!(
                "no frame could be decoded at or after {timestamp_seconds:.3}s"
            ))),
        }
    }
}

impl FrameDecoder for FfmpegDecoder {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn decode_at(
        &mut self,
        timestamp_seconds: f64,
        deadline: Instant,
    ) -> Result<RgbImage, StillshotError> {
        let started = Instant::now();
        self.deadline.arm(deadline);
        let result = self.seek_and_decode(timestamp_seconds, started, deadline);
        self.deadline.disarm();
        result
    }

    fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            let OpenStream {
                input,
                decoder,
                mut staged,
                ..
            } = stream;
            // The demuxer must close its file handle before the scratch file goes.
            drop(decoder);
            drop(input);
            staged.release();
            log::debug!("Released decoder for {}", self.source_name);
        }
    }
}

fn scale_to_image(
    scaler: &mut ScalingContext,
    frame: &VideoFrame,
) -> Result<RgbImage, StillshotError> {
    let mut rgb = VideoFrame::empty();
    scaler.run(frame, &mut rgb)?;
    let (width, height) = (rgb.width(), rgb.height());
    let buffer = conversion::frame_to_rgb_buffer(&rgb, width, height);
    RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        StillshotError::DecodeError(format!("decoded frame buffer does not match {width}x{height}"))
    })
}
