//! Video source references.
//!
//! A [`VideoSource`] names what to open: a local path, a URL handed to
//! FFmpeg's protocol layer, or an in-memory byte buffer. Opening is the
//! [`Session`](crate::Session)'s job; this module only describes the input
//! and stages in-memory buffers onto disk so FFmpeg can read them.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::error::StillshotError;

/// A readable video resource supplied by the caller.
///
/// The crate does not fetch, cache, or validate reachability of URLs; they
/// are passed through to FFmpeg as-is.
#[derive(Debug, Clone)]
pub enum VideoSource {
    /// A local file path.
    Path(PathBuf),
    /// A URL understood by FFmpeg (e.g. `https://…`, `rtsp://…`).
    Url(String),
    /// An in-memory container (e.g. an uploaded MP4).
    Memory(Vec<u8>),
}

impl VideoSource {
    /// Create a source from a local path.
    pub fn path<P: AsRef<Path>>(path: P) -> Self {
        VideoSource::Path(path.as_ref().to_path_buf())
    }

    /// Create a source from a URL.
    pub fn url<S: Into<String>>(url: S) -> Self {
        VideoSource::Url(url.into())
    }

    /// Create a source from an in-memory buffer.
    pub fn memory<B: Into<Vec<u8>>>(bytes: B) -> Self {
        VideoSource::Memory(bytes.into())
    }

    /// Resolve this source into something FFmpeg can open.
    ///
    /// In-memory buffers are written to a private temporary file; the
    /// returned [`StagedSource`] keeps that file alive and deletes it when
    /// dropped.
    pub(crate) fn stage(&self) -> Result<StagedSource, StillshotError> {
        match self {
            VideoSource::Path(path) => Ok(StagedSource {
                location: path.to_string_lossy().into_owned(),
                scratch: None,
            }),
            VideoSource::Url(url) => Ok(StagedSource {
                location: url.clone(),
                scratch: None,
            }),
            VideoSource::Memory(bytes) => {
                if bytes.is_empty() {
                    return Err(StillshotError::SourceUnreadable {
                        source_name: self.to_string(),
                        reason: "buffer is empty".to_string(),
                    });
                }
                let mut scratch = NamedTempFile::new()?;
                scratch.write_all(bytes)?;
                scratch.flush()?;
                log::debug!(
                    "Staged {} in-memory bytes at {}",
                    bytes.len(),
                    scratch.path().display()
                );
                Ok(StagedSource {
                    location: scratch.path().to_string_lossy().into_owned(),
                    scratch: Some(scratch),
                })
            }
        }
    }
}

impl Display for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            VideoSource::Path(path) => write!(f, "{}", path.display()),
            VideoSource::Url(url) => write!(f, "{url}"),
            VideoSource::Memory(bytes) => write!(f, "<memory: {} bytes>", bytes.len()),
        }
    }
}

impl From<&str> for VideoSource {
    fn from(value: &str) -> Self {
        if value.contains("://") {
            VideoSource::Url(value.to_string())
        } else {
            VideoSource::Path(PathBuf::from(value))
        }
    }
}

impl From<PathBuf> for VideoSource {
    fn from(value: PathBuf) -> Self {
        VideoSource::Path(value)
    }
}

impl From<&Path> for VideoSource {
    fn from(value: &Path) -> Self {
        VideoSource::Path(value.to_path_buf())
    }
}

/// A source resolved to an FFmpeg-openable location.
#[derive(Debug)]
pub(crate) struct StagedSource {
    pub(crate) location: String,
    /// Temporary backing file for in-memory sources.
    scratch: Option<NamedTempFile>,
}

impl StagedSource {
    /// Delete any scratch file now instead of waiting for drop.
    pub(crate) fn release(&mut self) {
        if let Some(scratch) = self.scratch.take() {
            if let Err(error) = scratch.close() {
                log::warn!("Failed to remove staged source file: {error}");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn scratch_path(&self) -> Option<&Path> {
        self.scratch.as_ref().map(|file| file.path())
    }
}
