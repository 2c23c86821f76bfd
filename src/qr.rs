//! # QR Render Binding
//!
//! Turns a [`QrRequest`] into a vector [`QrGraphic`] and composites the
//! optional logo into a [`QrPreview`].
//!
//! ## Geometry
//!
//! ```text
//! ┌──────────── S ────────────┐
//! │                           │
//! │        ┌─ 0.2·S ─┐        │
//! │        │  logo   │        │   centered on (S/2, S/2)
//! │        └─────────┘        │
//! │                           │
//! └───────────────────────────┘
//! ```
//!
//! Error correction is always level H (~30% recovery) so the code still
//! scans with the logo covering its center.

use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode};
use std::fmt::Write as _;
use std::sync::Arc;

use crate::color::HexColor;
use crate::config::{DEFAULT_BACKGROUND, DEFAULT_FOREGROUND, DEFAULT_QR_TEXT};
use crate::error::RenderError;
use crate::logo::Logo;
use crate::viewport::SizeClass;
use image::{RgbaImage, imageops};

/// Logo side length as a fraction of the QR side length.
pub const LOGO_SCALE: f64 = 0.2;

/// QR error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCorrection {
    /// ~7% recovery
    L,
    /// ~15% recovery
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl From<ErrorCorrection> for EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

/// QR form state.
#[derive(Debug, Clone, PartialEq)]
pub struct QrRequest {
    pub text: String,
    pub foreground: HexColor,
    pub background: HexColor,
    /// Side length in pixels
    pub size: u32,
    pub logo: Option<Arc<Logo>>,
}

impl QrRequest {
    pub fn new(size_class: SizeClass) -> Self {
        Self {
            text: String::new(),
            foreground: DEFAULT_FOREGROUND,
            background: DEFAULT_BACKGROUND,
            size: size_class.qr_size(),
            logo: None,
        }
    }

    /// Text to encode, falling back to the default URL when empty.
    pub fn effective_text(&self) -> &str {
        if self.text.is_empty() {
            DEFAULT_QR_TEXT
        } else {
            &self.text
        }
    }

    /// Rendering call for this request.
    pub fn spec(&self) -> QrSpec<'_> {
        QrSpec {
            data: self.effective_text(),
            size: self.size,
            foreground: self.foreground,
            background: self.background,
            error_correction: ErrorCorrection::H,
        }
    }
}

/// Inputs to a [`QrRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrSpec<'a> {
    pub data: &'a str,
    pub size: u32,
    pub foreground: HexColor,
    pub background: HexColor,
    pub error_correction: ErrorCorrection,
}

/// Vector QR rendering capability.
pub trait QrRenderer: Send + Sync {
    fn render(&self, spec: &QrSpec<'_>) -> Result<QrGraphic, RenderError>;
}

/// [`QrRenderer`] backed by the `qrcode` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModuleQrRenderer;

impl QrRenderer for ModuleQrRenderer {
    fn render(&self, spec: &QrSpec<'_>) -> Result<QrGraphic, RenderError> {
        let code = QrCode::with_error_correction_level(spec.data.as_bytes(), spec.error_correction.into())
            .map_err(|e| match e {
                QrError::DataTooLong => RenderError::DataTooLong,
                other => RenderError::Qr(other.to_string()),
            })?;

        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == Color::Dark)
            .collect();

        Ok(QrGraphic {
            modules_per_side: code.width(),
            modules,
            size: spec.size,
            foreground: spec.foreground,
            background: spec.background,
        })
    }
}

/// A rendered QR code: module matrix drawn at a pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrGraphic {
    modules_per_side: usize,
    /// Row-major, `true` = dark
    modules: Vec<bool>,
    size: u32,
    foreground: HexColor,
    background: HexColor,
}

impl QrGraphic {
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn modules_per_side(&self) -> usize {
        self.modules_per_side
    }

    pub fn foreground(&self) -> HexColor {
        self.foreground
    }

    pub fn background(&self) -> HexColor {
        self.background
    }

    #[inline]
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.modules_per_side + x]
    }

    /// Path data covering the dark modules, one subpath per horizontal run.
    fn module_path(&self) -> String {
        let n = self.modules_per_side;
        let mut d = String::new();
        for y in 0..n {
            let mut x = 0;
            while x < n {
                if !self.is_dark(x, y) {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < n && self.is_dark(x, y) {
                    x += 1;
                }
                let run = x - start;
                let _ = write!(d, "M{} {}h{}v1h-{}z", start, y, run, run);
            }
        }
        d
    }

    /// Standalone SVG document, `size` pixels square.
    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {n} {n}" shape-rendering="crispEdges">"#,
            size = self.size,
            n = self.modules_per_side,
        );
        self.write_body(&mut svg);
        svg.push_str("</svg>");
        svg
    }

    fn write_body(&self, svg: &mut String) {
        let n = self.modules_per_side;
        let _ = write!(
            svg,
            r#"<rect width="{n}" height="{n}" fill="{}"/><path fill="{}" d="{}"/>"#,
            self.background,
            self.foreground,
            self.module_path(),
        );
    }

    /// Rasterize at `size × size` pixels.
    pub fn rasterize(&self) -> RgbaImage {
        let n = self.modules_per_side;
        let size = self.size as usize;
        let fg = self.foreground.rgba();
        let bg = self.background.rgba();

        RgbaImage::from_fn(self.size, self.size, |px, py| {
            let mx = px as usize * n / size;
            let my = py as usize * n / size;
            if self.is_dark(mx, my) { fg } else { bg }
        })
    }
}

/// Where the logo sits over the code, in preview pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoPlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LogoPlacement {
    pub fn for_size(size: u32) -> Self {
        let side = size as f64 * LOGO_SCALE;
        let center = size as f64 / 2.0;
        Self {
            x: center - side / 2.0,
            y: center - side / 2.0,
            width: side,
            height: side,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// The QR preview region: code plus logo overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct QrPreview {
    graphic: QrGraphic,
    logo: Option<Arc<Logo>>,
}

impl QrPreview {
    pub fn new(graphic: QrGraphic, logo: Option<Arc<Logo>>) -> Self {
        Self { graphic, logo }
    }

    pub fn graphic(&self) -> &QrGraphic {
        &self.graphic
    }

    pub fn logo(&self) -> Option<&Logo> {
        self.logo.as_deref()
    }

    pub fn logo_placement(&self) -> Option<LogoPlacement> {
        self.logo
            .as_ref()
            .map(|_| LogoPlacement::for_size(self.graphic.size))
    }

    /// SVG of the composited region. The logo is embedded by data URI.
    pub fn to_svg(&self) -> String {
        let Some(logo) = &self.logo else {
            return self.graphic.to_svg();
        };
        let size = self.graphic.size;
        let n = self.graphic.modules_per_side;
        let place = LogoPlacement::for_size(size);

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{size}" height="{size}" viewBox="0 0 {size} {size}">"#,
        );
        let _ = write!(
            svg,
            r#"<svg width="{size}" height="{size}" viewBox="0 0 {n} {n}" shape-rendering="crispEdges">"#,
        );
        self.graphic.write_body(&mut svg);
        svg.push_str("</svg>");
        let _ = write!(
            svg,
            r#"<image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="none" xlink:href="{}"/>"#,
            place.x,
            place.y,
            place.width,
            place.height,
            logo.data_uri(),
        );
        svg.push_str("</svg>");
        svg
    }

    /// Raster of the composited region, `size × size` pixels.
    pub fn rasterize(&self) -> RgbaImage {
        let mut canvas = self.graphic.rasterize();
        if let Some(logo) = &self.logo {
            let place = LogoPlacement::for_size(self.graphic.size);
            let side = place.width.round().max(1.0) as u32;
            let scaled = imageops::resize(logo.pixels(), side, side, imageops::FilterType::Triangle);
            imageops::overlay(
                &mut canvas,
                &scaled,
                place.x.round() as i64,
                place.y.round() as i64,
            );
        }
        canvas
    }
}
