//! Session lifecycle.
//!
//! A [`Session`] binds one decoder handle to one raster surface. It either
//! **owns** its decoder (opened from a [`VideoSource`] or handed over as a
//! box) and releases it on disposal, or is **attached** to a decoder the
//! caller keeps ownership of, in which case disposal only drops the
//! session's own surface.
//!
//! Resources are released exactly once: by an explicit
//! [`dispose`](Session::dispose), or when the session is dropped, whichever
//! comes first. [`with_session`] scopes a session to a closure so release
//! happens on every exit path, including errors and panics.
//!
//! # Example
//!
//! ```no_run
//! use stillshot::{RenderOptions, StillshotError, VideoSource, with_session};
//!
//! let thumbnails = with_session(&VideoSource::path("input.mp4"), |session| {
//!     session.render_interval(600.0, 5, &RenderOptions::new())
//! })?;
//! # Ok::<(), StillshotError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::decoder::{FfmpegDecoder, FrameDecoder};
use crate::error::StillshotError;
use crate::metadata::VideoMetadata;
use crate::renderer::RasterSurface;
use crate::source::VideoSource;

/// Who is responsible for releasing the decoder.
enum DecoderHandle<'a> {
    Owned(Box<dyn FrameDecoder + 'a>),
    Attached(&'a mut dyn FrameDecoder),
}

impl DecoderHandle<'_> {
    fn get(&mut self) -> &mut dyn FrameDecoder {
        match self {
            DecoderHandle::Owned(decoder) => decoder.as_mut(),
            DecoderHandle::Attached(decoder) => &mut **decoder,
        }
    }

    fn get_ref(&self) -> &dyn FrameDecoder {
        match self {
            DecoderHandle::Owned(decoder) => decoder.as_ref(),
            DecoderHandle::Attached(decoder) => &**decoder,
        }
    }
}

/// Live resources of an open session.
struct SessionState<'a> {
    decoder: DecoderHandle<'a>,
    surface: RasterSurface,
}

/// One open video plus its rendering state.
///
/// Every render goes through `&mut self`, so at most one seek is ever in
/// flight per session. Distinct sessions share nothing and can run on
/// different threads.
pub struct Session<'a> {
    state: Option<SessionState<'a>>,
    label: String,
}

impl Debug for Session<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let ownership = self.state.as_ref().map(|state| match state.decoder {
            DecoderHandle::Owned(_) => "owned",
            DecoderHandle::Attached(_) => "attached",
        });
        f.debug_struct("Session")
            .field("source", &self.label)
            .field("decoder", &ownership.unwrap_or("closed"))
            .finish_non_exhaustive()
    }
}

impl Session<'static> {
    /// Open `source` with the FFmpeg backend and own the resulting decoder.
    ///
    /// # Errors
    ///
    /// [`StillshotError::SourceUnreadable`] if the source cannot be probed,
    /// [`StillshotError::NoVideoStream`] if it has no video.
    pub fn open(source: VideoSource) -> Result<Self, StillshotError> {
        let decoder = FfmpegDecoder::open(&source)?;
        Ok(Self::with_label(
            DecoderHandle::Owned(Box::new(decoder)),
            source.to_string(),
        ))
    }
}

impl<'a> Session<'a> {
    /// Take ownership of a caller-constructed decoder.
    ///
    /// The decoder's [`release`](FrameDecoder::release) runs when the
    /// session is disposed.
    pub fn from_decoder(decoder: Box<dyn FrameDecoder + 'a>) -> Self {
        Self::with_label(DecoderHandle::Owned(decoder), "<owned decoder>".to_string())
    }

    /// Borrow a decoder the caller keeps owning.
    ///
    /// Disposal drops the session's surface but never calls
    /// [`release`](FrameDecoder::release) on the borrowed decoder.
    pub fn attach(decoder: &'a mut dyn FrameDecoder) -> Self {
        Self::with_label(DecoderHandle::Attached(decoder), "<attached decoder>".to_string())
    }

    fn with_label(decoder: DecoderHandle<'a>, label: String) -> Self {
        log::info!("Session opened: {label}");
        Self {
            state: Some(SessionState {
                decoder,
                surface: RasterSurface::new(),
            }),
            label,
        }
    }

    /// Metadata of the underlying video.
    ///
    /// # Errors
    ///
    /// [`StillshotError::SessionClosed`] after disposal.
    pub fn metadata(&self) -> Result<&VideoMetadata, StillshotError> {
        self.state
            .as_ref()
            .map(|state| state.decoder.get_ref().metadata())
            .ok_or(StillshotError::SessionClosed)
    }

    /// Whether [`dispose`](Session::dispose) has run.
    pub fn is_closed(&self) -> bool {
        self.state.is_none()
    }

    /// Release the decoder (if owned) and the raster surface.
    ///
    /// Calling this again is a no-op. Render calls afterwards fail with
    /// [`StillshotError::SessionClosed`].
    pub fn dispose(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };
        let SessionState {
            mut decoder,
            surface,
        } = state;
        drop(surface);
        if let DecoderHandle::Owned(owned) = &mut decoder {
            owned.release();
        }
        log::info!("Session closed: {}", self.label);
    }

    pub(crate) fn parts(
        &mut self,
    ) -> Result<(&mut dyn FrameDecoder, &mut RasterSurface), StillshotError> {
        let state = self.state.as_mut().ok_or(StillshotError::SessionClosed)?;
        Ok((state.decoder.get(), &mut state.surface))
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Open `source`, run `operation` with the session, then release it.
///
/// Release happens exactly once whether `operation` returns `Ok`, returns
/// `Err`, or panics.
///
/// # Errors
///
/// Opening errors, or whatever `operation` returns.
pub fn with_session<T, F>(source: &VideoSource, operation: F) -> Result<T, StillshotError>
where
    F: FnOnce(&mut Session<'static>) -> Result<T, StillshotError>,
{
    let mut session = Session::open(source.clone())?;
    let result = operation(&mut session);
    session.dispose();
    result
}

/// Like [`with_session`], for a caller-constructed decoder.
///
/// # Errors
///
/// Whatever `operation` returns.
pub fn with_decoder<'a, T, F>(
    decoder: Box<dyn FrameDecoder + 'a>,
    operation: F,
) -> Result<T, StillshotError>
where
    F: FnOnce(&mut Session<'a>) -> Result<T, StillshotError>,
{
    let mut session = Session::from_decoder(decoder);
    let result = operation(&mut session);
    session.dispose();
    result
}
