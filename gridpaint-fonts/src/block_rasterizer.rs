//! Deterministic rasterizer that draws every grapheme as a filled box.
//!
//! Used when no font file is configured and in tests, where exact pixel
//! output must not depend on installed fonts.

use crate::metrics::FontMetrics;
use crate::rasterizer::{GlyphMask, GlyphStyle, Rasterizer};
use crate::width::is_cjk;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone)]
pub struct BlockRasterizer {
    metrics: FontMetrics,
}

impl BlockRasterizer {
    /// Metrics are derived from `size` the way a typical monospace face
    /// proportions its cells.
    pub fn new(size: f32, line_space: i32, letter_space: f32) -> Self {
        let size = size.max(2.0);
        let width = (size * 0.6).round();
        let ascent = (size * 0.8).round();
        let descent = (size * 0.25).round();
        Self {
            metrics: FontMetrics::new(width, ascent, descent, line_space, letter_space),
        }
    }

    fn columns(grapheme: &str) -> usize {
        if grapheme.chars().next().is_some_and(is_cjk) { 2 } else { 1 }
    }
}

impl Rasterizer for BlockRasterizer {
    fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    fn text_width(&self, text: &str) -> f32 {
        text.graphemes(true).map(Self::columns).sum::<usize>() as f32 * self.metrics.width
    }

    fn rasterize(&self, text: &str, style: GlyphStyle, _ligatures: bool, scale: f32) -> Vec<GlyphMask> {
        let advance = self.metrics.width * scale;
        let glyph_height = ((self.metrics.ascent * 0.7 * scale).round() as u32).max(1);
        let alpha = if style.bold { 255 } else { 200 };
        let slant = if style.italic { scale.round().max(1.0) as i32 } else { 0 };

        let mut masks = Vec::new();
        let mut pen = 0.0f32;
        for grapheme in text.graphemes(true) {
            let cols = Self::columns(grapheme);
            let glyph_advance = advance * cols as f32;
            if !grapheme.trim().is_empty() {
                let inset = scale.round().max(1.0);
                let width = ((glyph_advance - 2.0 * inset).round() as u32).max(1);
                masks.push(GlyphMask {
                    left: (pen + inset).round() as i32 + slant,
                    top: glyph_height as i32,
                    width,
                    height: glyph_height,
                    coverage: vec![alpha; (width * glyph_height) as usize],
                });
            }
            pen += glyph_advance;
        }
        masks
    }
}
