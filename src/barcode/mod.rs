//! # Barcode Render Binding
//!
//! Draws a 1D barcode with its value label into a raster [`BarcodeSurface`].
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────┐  ─┬─ margin
//! │   ▌▌ ▌ ▌▌▌ ▌  ▌▌ ▌▌ ▌ ▌▌  ▌ ▌▌   │   │ bar height
//! │   ▌▌ ▌ ▌▌▌ ▌  ▌▌ ▌▌ ▌ ▌▌  ▌ ▌▌   │  ─┴─
//! │                                  │   2px text margin
//! │          0000000000000           │   font size
//! └──────────────────────────────────┘  ─── margin
//! ```
//!
//! Unlike the QR preview, the barcode is only drawn when generation is
//! requested. Until then the surface is a blank 300×150 canvas.

mod label;
mod symbology;

pub use label::LabelFont;
pub use symbology::{Symbology, UnknownSymbology};

use image::{Rgba, RgbaImage};
use std::fmt::Write as _;

use crate::color::HexColor;
use crate::config::{BARCODE_PLACEHOLDER, DEFAULT_BACKGROUND, DEFAULT_FOREGROUND};
use crate::error::RenderError;
use crate::viewport::BarcodeScale;

/// Gap between the bars and the label, in pixels.
pub const TEXT_MARGIN: u32 = 2;

/// Dimensions of a drawing surface nothing has been drawn on.
pub const BLANK_WIDTH: u32 = 300;
pub const BLANK_HEIGHT: u32 = 150;

/// Barcode form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeRequest {
    pub text: String,
    pub symbology: Symbology,
    pub foreground: HexColor,
    pub background: HexColor,
}

impl BarcodeRequest {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            symbology: Symbology::default(),
            foreground: DEFAULT_FOREGROUND,
            background: DEFAULT_BACKGROUND,
        }
    }

    /// Text to encode, falling back to the numeric placeholder when empty.
    pub fn effective_text(&self) -> &str {
        if self.text.is_empty() {
            BARCODE_PLACEHOLDER
        } else {
            &self.text
        }
    }

    /// Rendering call for this request at a viewport width.
    pub fn spec(&self, viewport_width: u32) -> BarcodeSpec<'_> {
        BarcodeSpec {
            data: self.effective_text(),
            symbology: self.symbology,
            foreground: self.foreground,
            background: self.background,
            display_value: true,
            scale: BarcodeScale::for_width(viewport_width),
        }
    }
}

impl Default for BarcodeRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Inputs to a [`BarcodeRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarcodeSpec<'a> {
    pub data: &'a str,
    pub symbology: Symbology,
    pub foreground: HexColor,
    pub background: HexColor,
    /// Print the value under the bars
    pub display_value: bool,
    pub scale: BarcodeScale,
}

/// Raster barcode rendering capability.
pub trait BarcodeRenderer: Send + Sync {
    fn render(&self, spec: &BarcodeSpec<'_>) -> Result<BarcodeSurface, RenderError>;
}

/// [`BarcodeRenderer`] that encodes modules and paints them with the image crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct BarsRenderer;

impl BarcodeRenderer for BarsRenderer {
    fn render(&self, spec: &BarcodeSpec<'_>) -> Result<BarcodeSurface, RenderError> {
        let modules = spec.symbology.encode(spec.data)?;
        let label = spec
            .display_value
            .then(|| spec.symbology.normalize(spec.data));

        let drawing = BarcodeDrawing {
            modules,
            label,
            scale: spec.scale,
            foreground: spec.foreground,
            background: spec.background,
        };
        let image = drawing.paint()?;

        Ok(BarcodeSurface {
            image,
            drawing: Some(drawing),
        })
    }
}

/// What was drawn on a surface, kept for vector export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeDrawing {
    modules: Vec<bool>,
    label: Option<String>,
    scale: BarcodeScale,
    foreground: HexColor,
    background: HexColor,
}

impl BarcodeDrawing {
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn font(&self) -> LabelFont {
        LabelFont::for_size(self.scale.font_size)
    }

    fn bars_width(&self) -> u32 {
        self.modules.len() as u32 * self.scale.bar_width
    }

    fn label_width(&self) -> u32 {
        self.label
            .as_deref()
            .map_or(0, |text| self.font().text_width(text))
    }

    fn content_width(&self) -> u32 {
        self.bars_width().max(self.label_width())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        let s = self.scale;
        let width = s.margin * 2 + self.content_width();
        let label_height = if self.label.is_some() {
            TEXT_MARGIN + self.font().char_height
        } else {
            0
        };
        (width, s.margin * 2 + s.bar_height + label_height)
    }

    fn bars_x(&self) -> u32 {
        self.scale.margin + (self.content_width() - self.bars_width()) / 2
    }

    /// Visit each run of consecutive bars as (first module, run length).
    fn bar_runs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let mut i = 0;
        std::iter::from_fn(move || {
            while i < self.modules.len() && !self.modules[i] {
                i += 1;
            }
            if i >= self.modules.len() {
                return None;
            }
            let start = i;
            while i < self.modules.len() && self.modules[i] {
                i += 1;
            }
            Some((start, i - start))
        })
    }

    fn paint(&self) -> Result<RgbaImage, RenderError> {
        let (width, height) = self.dimensions();
        let s = self.scale;
        let mut img = RgbaImage::from_pixel(width, height, self.background.rgba());
        let fg = self.foreground.rgba();
        let bars_x = self.bars_x();

        for (start, run) in self.bar_runs() {
            let x0 = bars_x + start as u32 * s.bar_width;
            let x1 = x0 + run as u32 * s.bar_width;
            for y in s.margin..s.margin + s.bar_height {
                for x in x0..x1 {
                    img.put_pixel(x, y, fg);
                }
            }
        }

        if let Some(label) = &self.label {
            let font = self.font();
            let x = s.margin + (self.content_width() - font.text_width(label)) / 2;
            let y = s.margin + s.bar_height + TEXT_MARGIN;
            font.draw(&mut img, label, x, y, fg)?;
        }

        Ok(img)
    }

    /// SVG with one rect per bar run and the label as text.
    pub fn to_svg(&self) -> String {
        let (width, height) = self.dimensions();
        let s = self.scale;
        let bars_x = self.bars_x();

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#,
        );
        let _ = write!(
            svg,
            r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
            self.background
        );
        let _ = write!(svg, r#"<g fill="{}">"#, self.foreground);
        for (start, run) in self.bar_runs() {
            let _ = write!(
                svg,
                r#"<rect x="{}" y="{}" width="{}" height="{}"/>"#,
                bars_x + start as u32 * s.bar_width,
                s.margin,
                run as u32 * s.bar_width,
                s.bar_height,
            );
        }
        if let Some(label) = &self.label {
            let _ = write!(
                svg,
                r#"<text x="{}" y="{}" text-anchor="middle" font-family="monospace" font-size="{}">{}</text>"#,
                width / 2,
                s.margin + s.bar_height + TEXT_MARGIN + s.font_size,
                s.font_size,
                escape_xml(label),
            );
        }
        svg.push_str("</g></svg>");
        svg
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// The barcode drawing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeSurface {
    image: RgbaImage,
    drawing: Option<BarcodeDrawing>,
}

impl BarcodeSurface {
    /// A transparent canvas nothing has been drawn on yet.
    pub fn blank() -> Self {
        Self {
            image: RgbaImage::from_pixel(BLANK_WIDTH, BLANK_HEIGHT, Rgba([0, 0, 0, 0])),
            drawing: None,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn drawing(&self) -> Option<&BarcodeDrawing> {
        self.drawing.as_ref()
    }

    pub fn is_blank(&self) -> bool {
        self.drawing.is_none()
    }

    pub fn to_svg(&self) -> String {
        match &self.drawing {
            Some(drawing) => drawing.to_svg(),
            None => format!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{BLANK_WIDTH}" height="{BLANK_HEIGHT}"/>"#
            ),
        }
    }
}

impl Default for BarcodeSurface {
    fn default() -> Self {
        Self::blank()
    }
}
