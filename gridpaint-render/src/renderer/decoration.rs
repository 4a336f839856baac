use super::Renderer;
use crate::canvas::PixelCanvas;
use crate::geometry::RectF;
use crate::glyph_cache::{GlyphBitmap, GlyphKey};
use crate::grid::GridBuffer;
use crate::highlight::Highlight;
use gridpaint_config::{FillPattern, Rgba};
use gridpaint_fonts::FontMetrics;
use std::f32::consts::PI;
use std::sync::Arc;

/// One stroke of a decoration, relative to the top-left of its cell.
#[derive(Debug, Clone, PartialEq)]
pub enum DecorationStroke {
    Bar(RectF),
    Wave(Vec<(f32, f32)>),
}

/// Strokes for the decorations `hl` enables, for a cell of `metrics`.
pub fn decoration_strokes(hl: &Highlight, metrics: &FontMetrics) -> Vec<DecorationStroke> {
    let mut strokes = Vec::new();
    let cw = metrics.cell_width;
    let lh = metrics.line_height as f32;
    let ascent = metrics.ascent;
    let height = metrics.height as f32;
    let weight = metrics.decoration_weight() as f32;
    let line_space = metrics.line_space as f32;
    let bar_width = cw.ceil();

    let mut space = line_space / 3.0;
    if space.abs() > ascent / 3.0 {
        space = ascent / 3.0;
    }
    let space2 = if line_space < -1.0 { line_space / 2.0 } else { line_space };
    let descent = height - ascent;

    if hl.strikethrough {
        let y = (ascent * 0.65 + space2 / 2.0).trunc();
        strokes.push(DecorationStroke::Bar(RectF::new(0.0, y, bar_width, weight)));
    }
    if hl.underline {
        strokes.push(DecorationStroke::Bar(RectF::new(0.0, lh - weight, bar_width, weight)));
    }
    if hl.undercurl {
        let amplitude = (descent * 0.65 + space2).min(ascent / 8.0);
        let y = ascent + descent * 0.3 + space2 / 2.0 + space;
        let points = (0..=bar_width as i32)
            .map(|i| {
                let x = i as f32;
                (x, y + amplitude * (2.0 * PI * x / cw).sin())
            })
            .collect();
        strokes.push(DecorationStroke::Wave(points));
    }
    strokes
}

fn paint_strokes(canvas: &mut PixelCanvas, strokes: &[DecorationStroke], x: f32, y: f32, color: Rgba) {
    for stroke in strokes {
        match stroke {
            DecorationStroke::Bar(rect) => canvas.fill_rect(
                RectF::new(rect.x + x, rect.y + y, rect.width, rect.height),
                color,
                FillPattern::Solid,
            ),
            DecorationStroke::Wave(points) => {
                let shifted: Vec<(f32, f32)> = points.iter().map(|&(px, py)| (px + x, py + y)).collect();
                canvas.stroke_polyline(&shifted, color);
            }
        }
    }
}

impl Renderer<'_> {
    /// Draw underline, undercurl and strikethrough for columns
    /// `col..=col + cols` of `row`.
    pub(super) fn draw_decorations(
        &self,
        canvas: &mut PixelCanvas,
        grid: &GridBuffer,
        row: usize,
        col: usize,
        cols: usize,
    ) {
        let Some(line) = grid.line(row) else {
            return;
        };
        let metrics = *self.metrics();
        let y = (row as i32 * metrics.line_height + self.offset) as f32;
        let end = (col + cols + 1).min(line.len());

        for (x, cell) in line.iter().enumerate().take(end).skip(col) {
            let Some(cell) = cell else {
                continue;
            };
            let hl = &cell.highlight;
            if !hl.has_decoration() {
                continue;
            }
            let px = x as f32 * metrics.cell_width;
            let color = hl.decoration_color(&self.ctx.theme);

            if !self.ctx.config.editor.cached_drawing {
                paint_strokes(canvas, &decoration_strokes(hl, &metrics), px, y, color);
                continue;
            }

            let key = GlyphKey::Decoration {
                color,
                underline: hl.underline,
                undercurl: hl.undercurl,
                strikethrough: hl.strikethrough,
                dpr_bits: canvas.dpr().to_bits(),
            };
            let cached = self.cache.lock().get(&key).cloned();
            let bitmap = match cached {
                Some(bitmap) => bitmap,
                None => {
                    let Some(bitmap) = decoration_bitmap(hl, &metrics, color, canvas.dpr()) else {
                        continue;
                    };
                    let bitmap = Arc::new(bitmap);
                    self.cache.lock().insert(key, Arc::clone(&bitmap));
                    bitmap
                }
            };
            canvas.draw_bitmap(px, y, &bitmap);
        }
    }
}

/// A transparent one-cell bitmap holding the decoration strokes of `hl`.
fn decoration_bitmap(hl: &Highlight, metrics: &FontMetrics, color: Rgba, dpr: f32) -> Option<GlyphBitmap> {
    let mut surface = PixelCanvas::new(metrics.cell_width.ceil(), metrics.line_height as f32, dpr).ok()?;
    paint_strokes(&mut surface, &decoration_strokes(hl, metrics), 0.0, 0.0, color);
    Some(GlyphBitmap {
        image: surface.into_image(),
        dpr,
    })
}
