//! The drawing seam between the renderer and a concrete font backend.

use crate::metrics::FontMetrics;
use crate::width;

/// Style bits that change glyph outlines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GlyphStyle {
    pub bold: bool,
    pub italic: bool,
}

/// An 8-bit coverage mask for one glyph.
///
/// `left` is the horizontal offset from the run origin and `top` is the
/// distance from the baseline up to the first mask row, both in device
/// pixels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphMask {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
}

impl GlyphMask {
    pub fn coverage_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.coverage
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(0)
    }

    pub fn is_blank(&self) -> bool {
        self.coverage.iter().all(|&c| c == 0)
    }
}

/// Produces metrics and coverage masks for styled text runs.
pub trait Rasterizer: Send + Sync {
    /// Cell metrics in logical pixels.
    fn metrics(&self) -> &FontMetrics;

    /// Advance of `text` in logical pixels.
    fn text_width(&self, text: &str) -> f32;

    /// Rasterize `text` at `scale` device pixels per logical pixel.
    ///
    /// With `ligatures` false every character is shaped on its own.
    fn rasterize(&self, text: &str, style: GlyphStyle, ligatures: bool, scale: f32) -> Vec<GlyphMask>;

    /// Whether `text` occupies exactly one cell.
    fn is_normal_width(&self, text: &str) -> bool {
        width::is_normal_width(text, self.metrics().cell_width, |t| self.text_width(t))
    }
}
