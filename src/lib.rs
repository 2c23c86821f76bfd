//! # qrbar - QR Code and Barcode Generator
//!
//! qrbar renders a QR code and a 1D barcode from text, with custom colors
//! and an optional logo over the QR code, and exports either one as PNG or
//! SVG. It provides:
//!
//! - **Live QR preview**: re-rendered on every edit, error correction level H
//! - **Barcodes on demand**: Code 128, Code 39, MSI and Pharmacode
//! - **Responsive sizing**: preview dimensions follow the viewport width
//! - **Export**: `QRCode.<ext>` / `Barcode.<ext>` through pluggable capture and save
//!
//! ## Quick Start
//!
//! ```no_run
//! use qrbar::{
//!     app::{Controller, Edit},
//!     color::HexColor,
//!     config::StudioConfig,
//!     export::ExportFormat,
//! };
//!
//! # async fn example() -> Result<(), qrbar::StudioError> {
//! let mut controller = Controller::standard(&StudioConfig::default())?;
//!
//! controller.dispatch(Edit::QrText("https://example.com".into()))?;
//! controller.dispatch(Edit::QrForeground(HexColor::parse("#1a365d")?))?;
//! controller.upload_logo("logo.png").await?;
//! controller.export_qr(ExportFormat::Png).await?;
//!
//! controller.dispatch(Edit::BarcodeText("ABC-123".into()))?;
//! controller.generate_barcode()?;
//! controller.export_barcode(ExportFormat::Png).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`app`] | Form state, reducer and controller |
//! | [`qr`] | QR render binding |
//! | [`barcode`] | Barcode render binding |
//! | [`export`] | Capture and save |
//! | [`logo`] | Logo loading |
//! | [`viewport`] | Size classes and the resize observer |
//! | [`session`] | Scripted event loop |
//! | [`color`] | Hex colors |
//! | [`config`] | Defaults and runtime settings |
//! | [`error`] | Error types |

pub mod app;
pub mod barcode;
pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod logo;
pub mod qr;
pub mod session;
pub mod viewport;

// Re-exports for convenience
pub use app::Controller;
pub use config::StudioConfig;
pub use error::StudioError;
