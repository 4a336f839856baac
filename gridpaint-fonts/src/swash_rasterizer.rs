//! Rasterizer backed by a real font file through swash and rustybuzz.

use crate::error::FontError;
use crate::font_data::FontData;
use crate::metrics::FontMetrics;
use crate::rasterizer::{GlyphMask, GlyphStyle, Rasterizer};
use crate::text_shaper::{ShapingOptions, TextShaper};
use parking_lot::Mutex;
use swash::scale::image::Content;
use swash::scale::{Render, ScaleContext, Source, StrikeWith};
use swash::zeno::{Angle, Format, Transform, Vector};

/// Character whose advance defines the cell width.
const REFERENCE_CHAR: char = 'M';

/// Horizontal skew applied to synthesized italics, in degrees.
const ITALIC_SKEW_DEGREES: f32 = 14.0;

const SOURCES: [Source; 2] = [Source::Outline, Source::Bitmap(StrikeWith::BestFit)];

pub struct SwashRasterizer {
    font: FontData,
    size: f32,
    metrics: FontMetrics,
    shaper: TextShaper,
    context: Mutex<ScaleContext>,
}

impl std::fmt::Debug for SwashRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwashRasterizer")
            .field("font", &self.font)
            .field("size", &self.size)
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl SwashRasterizer {
    /// Build a rasterizer for `font` at `size` logical pixels per em.
    pub fn new(font: FontData, size: f32, line_space: i32, letter_space: f32) -> Result<Self, FontError> {
        let size = size.max(1.0);
        let font_ref = font.font_ref();
        let vertical = font_ref.metrics(&[]).scale(size);

        let glyph_id = font_ref.charmap().map(REFERENCE_CHAR);
        if glyph_id == 0 {
            return Err(FontError::MissingReferenceGlyph(REFERENCE_CHAR.to_string()));
        }
        let width = font_ref.glyph_metrics(&[]).scale(size).advance_width(glyph_id);

        let metrics = FontMetrics::new(width, vertical.ascent, vertical.descent, line_space, letter_space);
        log::debug!(
            "Font metrics at {}px: cell {}x{}, ascent {:.2}, descent {:.2}",
            size,
            metrics.cell_width,
            metrics.line_height,
            metrics.ascent,
            metrics.descent
        );

        Ok(Self {
            font,
            size,
            metrics,
            shaper: TextShaper::new(),
            context: Mutex::new(ScaleContext::new()),
        })
    }

    pub fn font_size(&self) -> f32 {
        self.size
    }

    fn shaping(ligatures: bool) -> ShapingOptions {
        ShapingOptions {
            ligatures,
            kerning: ligatures,
        }
    }
}

impl Rasterizer for SwashRasterizer {
    fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    fn text_width(&self, text: &str) -> f32 {
        self.shaper
            .shape(text, &self.font, self.size, Self::shaping(true))
            .advance
    }

    fn rasterize(&self, text: &str, style: GlyphStyle, ligatures: bool, scale: f32) -> Vec<GlyphMask> {
        let px = self.size * scale.max(0.01);
        let run = self.shaper.shape(text, &self.font, px, Self::shaping(ligatures));

        let mut context = self.context.lock();
        let mut scaler = context.builder(self.font.font_ref()).size(px).hint(true).build();

        let mut masks = Vec::with_capacity(run.glyphs.len());
        let mut pen_x = 0.0f32;
        for glyph in &run.glyphs {
            let x = pen_x + glyph.x_offset;
            pen_x += glyph.x_advance;

            let mut render = Render::new(&SOURCES);
            render
                .format(Format::Alpha)
                .offset(Vector::new(x.fract(), 0.0));
            if style.bold {
                render.embolden((px / 24.0).max(0.5));
            }
            if style.italic {
                render.transform(Some(Transform::skew(
                    Angle::from_degrees(ITALIC_SKEW_DEGREES),
                    Angle::from_degrees(0.0),
                )));
            }

            let Some(image) = render.render(&mut scaler, glyph.glyph_id) else {
                continue;
            };
            if image.placement.width == 0 || image.placement.height == 0 {
                continue;
            }
            let coverage = match image.content {
                Content::Mask => image.data,
                // Color and subpixel content: keep the strongest channel.
                Content::Color | Content::SubpixelMask => {
                    let channels = if matches!(image.content, Content::Color) { 4 } else { 3 };
                    let stride = channels.max(
                        image.data.len() / (image.placement.width * image.placement.height) as usize,
                    );
                    image
                        .data
                        .chunks(stride)
                        .map(|p| p.iter().take(3).copied().max().unwrap_or(0))
                        .collect()
                }
            };

            masks.push(GlyphMask {
                left: x.floor() as i32 + image.placement.left,
                top: image.placement.top + glyph.y_offset.round() as i32,
                width: image.placement.width,
                height: image.placement.height,
                coverage,
            });
        }
        masks
    }
}
