//! # Error Types
//!
//! Crate-level error plus the rendering error shared by the QR and barcode
//! bindings. Loader and export errors live next to the code that raises them.

use thiserror::Error;

use crate::app::UploadError;
use crate::barcode::Symbology;
use crate::color::ColorError;
use crate::export::ExportError;
use crate::logo::LogoError;

/// Errors raised by a rendering capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The text does not fit in the largest QR version at this error level
    #[error("Data too long for a QR code")]
    DataTooLong,

    /// QR encoding failed for another reason
    #[error("QR encoding failed: {0}")]
    Qr(String),

    /// The text is not encodable in the chosen symbology
    #[error("Invalid data for {symbology}: {reason}")]
    InvalidData {
        symbology: Symbology,
        reason: String,
    },

    /// The label font could not be loaded
    #[error("Font error: {0}")]
    Font(String),
}

/// Main error type for qrbar operations
#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Color error: {0}")]
    Color(#[from] ColorError),

    #[error("Logo error: {0}")]
    Logo(#[from] LogoError),

    #[error("Logo upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Malformed session script
    #[error("Script error: {0}")]
    Script(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
