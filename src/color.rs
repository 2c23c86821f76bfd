//! # Hex Colors
//!
//! Foreground and background colors travel through the app as `#rrggbb`
//! strings, the same form a hex color picker reports.

use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing a hex color.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("Invalid hex color '{0}': expected 6 hex digits (#rrggbb)")]
    InvalidFormat(String),

    #[error("Invalid {channel} channel in hex color '{input}'")]
    InvalidChannel { channel: &'static str, input: String },
}

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb` (any case, surrounding whitespace ignored).
    ///
    /// ```
    /// use qrbar::color::HexColor;
    ///
    /// let c = HexColor::parse("#FF8000").unwrap();
    /// assert_eq!(c, HexColor::new(255, 128, 0));
    /// assert_eq!(c.to_string(), "#ff8000");
    /// ```
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let trimmed = input.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);

        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ColorError::InvalidFormat(input.to_string()));
        }

        let channel = |range: std::ops::Range<usize>, name: &'static str| {
            let digits = &hex[range];
            let invalid = || ColorError::InvalidChannel {
                channel: name,
                input: input.to_string(),
            };
            // from_str_radix alone would take a leading '+'
            if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            u8::from_str_radix(digits, 16).map_err(|_| invalid())
        };

        Ok(Self::new(
            channel(0..2, "red")?,
            channel(2..4, "green")?,
            channel(4..6, "blue")?,
        ))
    }

    /// Fully opaque RGBA pixel for raster output.
    #[inline]
    pub fn rgba(&self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}
