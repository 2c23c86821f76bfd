//! # Logo Loader
//!
//! Reads a user-chosen PNG or JPEG into something the QR preview can embed.
//! A loaded [`Logo`] keeps its `data:` URI for vector output and its decoded
//! pixels for raster compositing.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::RgbaImage;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// MIME types the file picker accepts.
pub const ACCEPTED_MIME_TYPES: &[&str] = &["image/png", "image/jpeg"];

/// Errors that can occur while loading a logo.
#[derive(Debug, Error)]
pub enum LogoError {
    #[error("Unsupported logo file '{0}': only PNG and JPEG are accepted")]
    Unsupported(PathBuf),

    #[error("Failed to read logo '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode logo: {0}")]
    Decode(String),
}

/// An uploaded logo image.
#[derive(Clone)]
pub struct Logo {
    mime: &'static str,
    bytes: Vec<u8>,
    data_uri: String,
    pixels: RgbaImage,
}

impl Logo {
    /// Decode raw file contents. `mime` is the type the picker reported.
    pub fn decode(mime: &'static str, bytes: Vec<u8>) -> Result<Self, LogoError> {
        let pixels = image::load_from_memory(&bytes)
            .map_err(|e| LogoError::Decode(e.to_string()))?
            .to_rgba8();
        let data_uri = format!("data:{};base64,{}", mime, STANDARD.encode(&bytes));

        Ok(Self {
            mime,
            bytes,
            data_uri,
            pixels,
        })
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    /// `data:<mime>;base64,...` source for embedding.
    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl PartialEq for Logo {
    fn eq(&self, other: &Self) -> bool {
        self.mime == other.mime && self.bytes == other.bytes
    }
}

impl fmt::Debug for Logo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logo")
            .field("mime", &self.mime)
            .field("bytes", &self.bytes.len())
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .finish()
    }
}

/// The picker filter: returns the MIME type if `path` may be chosen.
pub fn accepted_mime(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path)
        .iter_raw()
        .find(|mime| ACCEPTED_MIME_TYPES.contains(mime))
}

/// Load a logo file.
///
/// The read is asynchronous and decoding runs on the blocking pool. There is
/// no size cap.
pub async fn load(path: impl AsRef<Path>) -> Result<Logo, LogoError> {
    let path = path.as_ref();
    let mime = accepted_mime(path).ok_or_else(|| LogoError::Unsupported(path.to_path_buf()))?;

    let bytes = tokio::fs::read(path).await.map_err(|source| LogoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), mime, "logo read");

    tokio::task::spawn_blocking(move || Logo::decode(mime, bytes))
        .await
        .map_err(|e| LogoError::Decode(e.to_string()))?
}
