//! Single-frame capture.
//!
//! [`Session::render_frame`] seeks the session's decoder and composites the
//! decoded frame onto the session's [`RasterSurface`]: the surface is
//! cleared to opaque black, the frame is scaled with its aspect ratio
//! preserved and placed per [`FitLayout`]. The result is always exactly
//! `target_width × target_height`.

use std::time::Instant;

use image::{
    Rgb, RgbImage,
    imageops::{self, FilterType},
};

use crate::configuration::{RenderOptions, RenderRequest};
use crate::encode::encode;
use crate::error::StillshotError;
use crate::layout::FitLayout;
use crate::session::Session;
use crate::thumbnail::Thumbnail;

/// A rendered, not yet encoded, frame.
pub type PixelBuffer = RgbImage;

/// Padding colour. Opaque so encoded bytes are reproducible.
const PAD_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Off-screen canvas owned by a session and reused across renders.
#[derive(Debug, Default)]
pub(crate) struct RasterSurface {
    canvas: RgbImage,
}

impl RasterSurface {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Clear the canvas to [`PAD_COLOR`] and draw `frame` per `request`.
    pub(crate) fn composite(&mut self, frame: &RgbImage, request: &RenderRequest) -> PixelBuffer {
        let (target_width, target_height) = (request.target_width, request.target_height);
        if self.canvas.dimensions() != (target_width, target_height) {
            self.canvas = RgbImage::from_pixel(target_width, target_height, PAD_COLOR);
        } else {
            self.canvas.pixels_mut().for_each(|pixel| *pixel = PAD_COLOR);
        }

        let layout = FitLayout::compute(
            request.fit,
            frame.width(),
            frame.height(),
            target_width,
            target_height,
        );

        if frame.dimensions() == (layout.width, layout.height) {
            imageops::overlay(&mut self.canvas, frame, layout.x, layout.y);
        } else {
            let scaled = imageops::resize(frame, layout.width, layout.height, FilterType::Triangle);
            imageops::overlay(&mut self.canvas, &scaled, layout.x, layout.y);
        }

        self.canvas.clone()
    }
}

impl Session<'_> {
    /// Seek to `request.timestamp_seconds` and rasterize one frame.
    ///
    /// The returned buffer is exactly `target_width × target_height`; with
    /// the default letterbox fit any area not covered by the frame is
    /// opaque black. Rendering the same request twice gives identical
    /// pixels. The decoder is left wherever the seek put it.
    ///
    /// # Errors
    ///
    /// - [`StillshotError::SessionClosed`] after [`dispose`](Session::dispose).
    /// - [`StillshotError::InvalidRequest`] for bad dimensions/quality or a
    ///   timestamp past the end when clamping is off.
    /// - [`StillshotError::SeekTimeout`] if the seek outlives
    ///   `request.seek_timeout`.
    /// - [`StillshotError::DecodeError`] if no frame can be produced.
    pub fn render_frame(&mut self, request: &RenderRequest) -> Result<PixelBuffer, StillshotError> {
        let (decoder, surface) = self.parts()?;
        request.validate()?;

        let duration = decoder.metadata().duration_seconds();
        let mut timestamp = request.timestamp_seconds;
        if timestamp < 0.0 {
            log::debug!("Clamping {timestamp:.3}s to 0s");
            timestamp = 0.0;
        }
        // A zero duration means the container did not report one.
        if duration > 0.0 && timestamp > duration {
            if !request.clamp_timestamp {
                return Err(StillshotError::InvalidRequest(format!(
                    "timestamp {timestamp:.3}s is outside [0, {duration:.3}]"
                )));
            }
            log::debug!("Clamping {timestamp:.3}s to {duration:.3}s");
            timestamp = duration;
        }

        log::debug!(
            "Rendering frame at {timestamp:.3}s into {}x{}",
            request.target_width,
            request.target_height
        );

        let deadline = Instant::now() + request.seek_timeout;
        let frame = decoder.decode_at(timestamp, deadline)?;
        Ok(surface.composite(&frame, request))
    }

    /// Render and encode the frame at `timestamp_seconds`.
    ///
    /// This is the primitive every batch operation is built on. The
    /// thumbnail carries the timestamp that was requested.
    ///
    /// # Errors
    ///
    /// Anything [`render_frame`](Session::render_frame) or
    /// [`encode`] returns.
    pub fn render_one(
        &mut self,
        timestamp_seconds: f64,
        options: &RenderOptions,
    ) -> Result<Thumbnail, StillshotError> {
        let request = options.request(timestamp_seconds);
        let buffer = self.render_frame(&request)?;
        encode(&buffer, timestamp_seconds, request.format, request.quality)
    }
}
