//! Value label drawn under the bars, using the Spleen bitmap fonts.

use image::{Rgba, RgbaImage};
use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};

use crate::error::RenderError;

/// A Spleen font face sized for a label.
#[derive(Debug, Clone, Copy)]
pub struct LabelFont {
    data: &'static [u8],
    pub char_width: u32,
    pub char_height: u32,
}

impl LabelFont {
    /// Pick the face whose cell height matches `font_size`, or the next
    /// larger one.
    pub fn for_size(font_size: u32) -> Self {
        match font_size {
            0..=12 => Self {
                data: FONT_6X12,
                char_width: 6,
                char_height: 12,
            },
            13..=16 => Self {
                data: FONT_8X16,
                char_width: 8,
                char_height: 16,
            },
            _ => Self {
                data: FONT_12X24,
                char_width: 12,
                char_height: 24,
            },
        }
    }

    pub fn text_width(&self, text: &str) -> u32 {
        text.chars().count() as u32 * self.char_width
    }

    /// Draw `text` with its top-left corner at (`x`, `y`). Characters the font
    /// lacks are left blank.
    pub fn draw(
        &self,
        img: &mut RgbaImage,
        text: &str,
        x: u32,
        y: u32,
        color: Rgba<u8>,
    ) -> Result<(), RenderError> {
        let mut font = match PSF2Font::new(self.data) {
            Ok(font) => font,
            Err(_) => return Err(RenderError::Font("failed to load Spleen font".to_string())),
        };

        let (width, height) = img.dimensions();
        let mut buf = [0u8; 4];

        for (i, ch) in text.chars().enumerate() {
            let origin_x = x + i as u32 * self.char_width;
            let utf8 = ch.encode_utf8(&mut buf);
            let Some(glyph) = font.glyph_for_utf8(utf8.as_bytes()) else {
                continue;
            };

            for (row_y, row) in glyph.enumerate() {
                for (col_x, on) in row.enumerate() {
                    let px = origin_x + col_x as u32;
                    let py = y + row_y as u32;
                    if on && px < width && py < height {
                        img.put_pixel(px, py, color);
                    }
                }
            }
        }

        Ok(())
    }
}
