use std::fmt;
use std::path::Path;

use fontdue::{Font, FontSettings};

use crate::error::{CoreError, Result};

/// Coverage bitmap for one glyph at one pixel size.
///
/// `xmin` is the horizontal offset from the pen position and `ymin` the
/// offset from the baseline to the bottom edge of the bitmap (negative for
/// descenders), matching fontdue's metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphBitmap {
    pub width: usize,
    pub height: usize,
    pub xmin: i32,
    pub ymin: i32,
    pub advance: f32,
    /// Row-major, one byte of coverage per pixel.
    pub coverage: Vec<u8>,
}

/// Glyph metrics and rasterisation used by share-card layout and painting.
pub trait GlyphRasterizer: Send + Sync + fmt::Debug {
    fn advance(&self, ch: char, px: f32) -> f32;

    fn rasterize(&self, ch: char, px: f32) -> GlyphBitmap;

    /// Horizontal extent of `text` set at `px` with no kerning.
    fn measure(&self, text: &str, px: f32) -> f32 {
        text.chars().map(|ch| self.advance(ch, px)).sum()
    }
}

/// TrueType/OpenType glyphs through fontdue.
pub struct FontdueRasterizer {
    font: Font,
}

impl fmt::Debug for FontdueRasterizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontdueRasterizer")
            .field("name", &self.font.name())
            .field("glyph_count", &self.font.glyph_count())
            .finish()
    }
}

impl FontdueRasterizer {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| CoreError::Render(format!("Failed to parse font: {e}")))?;
        Ok(Self { font })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            CoreError::Render(format!(
                "Failed to read font {}: {e}",
                path.display()
            ))
        })?;
        Self::from_bytes(&bytes)
    }
}

impl GlyphRasterizer for FontdueRasterizer {
    fn advance(&self, ch: char, px: f32) -> f32 {
        self.font.metrics(ch, px).advance_width
    }

    fn rasterize(&self, ch: char, px: f32) -> GlyphBitmap {
        let (metrics, coverage) = self.font.rasterize(ch, px);
        GlyphBitmap {
            width: metrics.width,
            height: metrics.height,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            advance: metrics.advance_width,
            coverage,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fixed::FixedAdvanceGlyphs;

#[cfg(any(test, feature = "test-support"))]
mod fixed {
    use super::{GlyphBitmap, GlyphRasterizer};

    /// Monospace boxes: every glyph advances `px * 0.5` and paints a solid
    /// block, except whitespace which paints nothing.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct FixedAdvanceGlyphs;

    impl GlyphRasterizer for FixedAdvanceGlyphs {
        fn advance(&self, _ch: char, px: f32) -> f32 {
            px * 0.5
        }

        fn rasterize(&self, ch: char, px: f32) -> GlyphBitmap {
            let advance = self.advance(ch, px);
            if ch.is_whitespace() {
                return GlyphBitmap {
                    width: 0,
                    height: 0,
                    xmin: 0,
                    ymin: 0,
                    advance,
                    coverage: Vec::new(),
                };
            }

            let width = (advance as usize).saturating_sub(1).max(1);
            let height = ((px * 0.7) as usize).max(1);
            GlyphBitmap {
                width,
                height,
                xmin: 0,
                ymin: 0,
                advance,
                coverage: vec![255; width * height],
            }
        }
    }
}
