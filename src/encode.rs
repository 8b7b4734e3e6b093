//! Pixel buffer to image encoding.
//!
//! [`encode`] turns a rendered RGB buffer into a [`Thumbnail`]. JPEG and
//! PNG go through the `image` crate's codecs; WebP goes through `libwebp`
//! (via the `webp` crate) so the quality factor is honoured, since the
//! `image` crate only writes lossless WebP.

use image::{
    ExtendedColorType, ImageEncoder, RgbImage,
    codecs::{jpeg::JpegEncoder, png::PngEncoder},
};

use crate::configuration::ImageFormat;
use crate::error::StillshotError;
use crate::thumbnail::Thumbnail;

/// Encode `buffer` as `format`.
///
/// `quality` (`0.0` – `1.0`) is mapped to the codec's own scale for JPEG
/// and WebP and ignored for PNG. Encoding is deterministic: the same buffer
/// and settings always give the same bytes.
///
/// # Errors
///
/// [`StillshotError::EncodeError`] for zero-sized buffers, an out-of-range
/// quality, or codec failures.
///
/// # Example
///
/// ```
/// use image::RgbImage;
/// use stillshot::{ImageFormat, encode};
///
/// let buffer = RgbImage::new(16, 9);
/// let thumbnail = encode(&buffer, 0.0, ImageFormat::Png, 0.8)?;
/// assert_eq!((thumbnail.width, thumbnail.height), (16, 9));
/// assert!(thumbnail.data_url.starts_with("data:image/png;base64,"));
/// # Ok::<(), stillshot::StillshotError>(())
/// ```
pub fn encode(
    buffer: &RgbImage,
    timestamp_seconds: f64,
    format: ImageFormat,
    quality: f32,
) -> Result<Thumbnail, StillshotError> {
    let (width, height) = buffer.dimensions();
    if width == 0 || height == 0 {
        return Err(StillshotError::EncodeError(format!(
            "cannot encode a {width}x{height} buffer as {format}"
        )));
    }
    if !(0.0..=1.0).contains(&quality) {
        return Err(StillshotError::EncodeError(format!(
            "quality {quality} is outside [0, 1]"
        )));
    }

    let payload = match format {
        ImageFormat::Jpeg => encode_jpeg(buffer, quality)?,
        ImageFormat::Png => encode_png(buffer)?,
        ImageFormat::Webp => encode_webp(buffer, quality)?,
    };

    log::debug!(
        "Encoded {width}x{height} frame at {timestamp_seconds:.3}s as {format} ({} bytes)",
        payload.len()
    );

    Ok(Thumbnail::new(timestamp_seconds, payload, width, height, format))
}

/// JPEG quality on the codec's 1–100 scale.
fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

fn encode_jpeg(buffer: &RgbImage, quality: f32) -> Result<Vec<u8>, StillshotError> {
    let mut payload = Vec::new();
    JpegEncoder::new_with_quality(&mut payload, jpeg_quality(quality))
        .encode(
            buffer.as_raw(),
            buffer.width(),
            buffer.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|error| StillshotError::EncodeError(format!("JPEG: {error}")))?;
    Ok(payload)
}

fn encode_png(buffer: &RgbImage) -> Result<Vec<u8>, StillshotError> {
    let mut payload = Vec::new();
    PngEncoder::new(&mut payload)
        .write_image(
            buffer.as_raw(),
            buffer.width(),
            buffer.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|error| StillshotError::EncodeError(format!("PNG: {error}")))?;
    Ok(payload)
}

fn encode_webp(buffer: &RgbImage, quality: f32) -> Result<Vec<u8>, StillshotError> {
    // `Encoder::encode` unwraps; libwebp rejects sides over 16383 px.
    let memory = webp::Encoder::from_rgb(buffer.as_raw(), buffer.width(), buffer.height())
        .encode_simple(false, quality * 100.0)
        .map_err(|error| StillshotError::EncodeError(format!("WebP: {error:?}")))?;
    Ok(memory.to_vec())
}
