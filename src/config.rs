//! # Configuration
//!
//! Defaults for a fresh form and the runtime settings the CLI hands to a
//! [`Controller`](crate::app::Controller).
//!
//! | Setting | Default |
//! |---------|---------|
//! | QR fallback text | `https://example.com` |
//! | Barcode placeholder | `0000000000000` |
//! | Foreground / background | `#000000` / `#ffffff` |
//! | Viewport width | 1024 |
//! | Download directory | current directory |

use std::path::PathBuf;

use crate::color::HexColor;

/// Value encoded by the QR code while its text field is empty.
pub const DEFAULT_QR_TEXT: &str = "https://example.com";

/// Value encoded by the barcode while its text field is empty.
pub const BARCODE_PLACEHOLDER: &str = "0000000000000";

pub const DEFAULT_FOREGROUND: HexColor = HexColor::BLACK;
pub const DEFAULT_BACKGROUND: HexColor = HexColor::WHITE;

/// Viewport width assumed when none is given (a laptop-sized window).
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1024;

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    /// Directory exported files are saved into
    pub download_dir: PathBuf,
    /// Viewport width at mount time, in pixels
    pub viewport_width: u32,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("."),
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
        }
    }
}
