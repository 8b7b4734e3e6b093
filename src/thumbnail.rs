//! The [`Thumbnail`] value returned by every render operation.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::DynamicImage;

use crate::configuration::ImageFormat;
use crate::error::StillshotError;

/// An encoded still frame.
///
/// The binary [`payload`](Thumbnail::payload) is authoritative; the
/// [`data_url`](Thumbnail::data_url) is a base64 rendition of exactly the
/// same bytes for inline transport.
///
/// # Example
///
/// ```no_run
/// use stillshot::{RenderOptions, Session, StillshotError, VideoSource};
///
/// let mut session = Session::open(VideoSource::path("input.mp4"))?;
/// let thumbnail = session.render_one(12.5, &RenderOptions::new())?;
/// thumbnail.save("thumb.jpg")?;
/// println!("{}", &thumbnail.data_url[..32]);
/// # Ok::<(), StillshotError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Thumbnail {
    /// Timestamp that was requested, in seconds.
    pub timestamp_seconds: f64,
    /// Encoded image bytes.
    pub payload: Vec<u8>,
    /// `data:<mime>;base64,<payload>`.
    pub data_url: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Encoding of [`payload`](Thumbnail::payload).
    pub format: ImageFormat,
}

impl Thumbnail {
    pub(crate) fn new(
        timestamp_seconds: f64,
        payload: Vec<u8>,
        width: u32,
        height: u32,
        format: ImageFormat,
    ) -> Self {
        let data_url = to_data_url(format, &payload);
        Self {
            timestamp_seconds,
            payload,
            data_url,
            width,
            height,
            format,
        }
    }

    /// Decode the payload back into pixels.
    ///
    /// # Errors
    ///
    /// [`StillshotError::Image`] if the payload cannot be decoded.
    pub fn decode(&self) -> Result<DynamicImage, StillshotError> {
        Ok(image::load_from_memory(&self.payload)?)
    }

    /// Write the payload to `path` unchanged.
    ///
    /// # Errors
    ///
    /// [`StillshotError::Io`] if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StillshotError> {
        std::fs::write(path, &self.payload)?;
        Ok(())
    }

    /// Decode the base64 part of [`data_url`](Thumbnail::data_url).
    ///
    /// # Errors
    ///
    /// [`StillshotError::EncodeError`] if the data URL is malformed.
    pub fn data_url_bytes(&self) -> Result<Vec<u8>, StillshotError> {
        let (_, encoded) = self
            .data_url
            .split_once(";base64,")
            .ok_or_else(|| StillshotError::EncodeError("data URL has no base64 marker".into()))?;
        STANDARD
            .decode(encoded)
            .map_err(|error| StillshotError::EncodeError(format!("invalid base64: {error}")))
    }
}

fn to_data_url(format: ImageFormat, payload: &[u8]) -> String {
    format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(payload))
}
