use super::Renderer;
use crate::canvas::PixelCanvas;
use crate::cell::Cell;
use crate::glyph_cache::{GlyphBitmap, GlyphKey};
use crate::grid::GridBuffer;
use crate::highlight::Highlight;
use gridpaint_fonts::GlyphStyle;
use gridpaint_fonts::width::grapheme_count;
use std::sync::Arc;

/// A run of same-highlight cells drawn with one shaping call.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub col: usize,
    pub text: String,
    pub highlight: Arc<Highlight>,
}

/// Group the normal-width glyph cells of `line` into words.
///
/// Cells of one highlight that are separated by exactly one other cell join
/// into a single word with a space in between, so ligature shaping sees
/// `a b` as one run. A wider gap starts a new word. Words come back ordered
/// by their first column.
pub fn group_words(line: &[Option<Cell>]) -> Vec<Word> {
    let mut groups: Vec<(u64, Vec<usize>)> = Vec::new();
    for (x, cell) in line.iter().enumerate() {
        let Some(cell) = cell else {
            continue;
        };
        if cell.is_textless() || !cell.normal_width {
            continue;
        }
        let id = cell.highlight.id;
        match groups.iter_mut().find(|(gid, _)| *gid == id) {
            Some((_, cols)) => cols.push(x),
            None => groups.push((id, vec![x])),
        }
    }

    let mut words = Vec::new();
    for (_, cols) in groups {
        let mut current: Option<(Word, usize)> = None;
        for x in cols {
            let Some(cell) = line[x].as_ref() else {
                continue;
            };
            if let Some((word, last)) = current.as_mut()
                && x <= *last + 2
            {
                if x == *last + 2 {
                    word.text.push(' ');
                }
                word.text.push_str(&cell.text);
                *last = x;
                continue;
            }
            let next = Word {
                col: x,
                text: cell.text.clone(),
                highlight: Arc::clone(&cell.highlight),
            };
            if let Some((done, _)) = current.replace((next, x)) {
                words.push(done);
            }
        }
        if let Some((done, _)) = current {
            words.push(done);
        }
    }
    words.sort_by_key(|w| w.col);
    words
}

impl Renderer<'_> {
    /// Draw every glyph of `row`. Wide glyphs are drawn one cell at a time
    /// after the grouped runs.
    pub(super) fn draw_text(&self, canvas: &mut PixelCanvas, grid: &GridBuffer, row: usize) {
        let Some(line) = grid.line(row) else {
            return;
        };
        let metrics = self.metrics();
        let cw = metrics.cell_width;
        let y = row as i32 * metrics.line_height + self.offset;

        if self.ctx.config.editor.cell_based_drawing() {
            for (x, cell) in line.iter().enumerate() {
                if let Some(cell) = cell
                    && cell.normal_width
                    && !cell.is_textless()
                {
                    self.draw_text_at(canvas, (x as f32 * cw).trunc(), y, &cell.text, &cell.highlight, false);
                }
            }
        } else {
            for word in group_words(line) {
                self.draw_text_at(canvas, (word.col as f32 * cw).trunc(), y, &word.text, &word.highlight, true);
            }
        }

        for (x, cell) in line.iter().enumerate() {
            if let Some(cell) = cell
                && !cell.normal_width
                && !cell.is_textless()
            {
                self.draw_text_at(canvas, (x as f32 * cw).trunc(), y, &cell.text, &cell.highlight, false);
            }
        }
    }

    /// Draw `text` with its row top-left at `(x, y)`.
    fn draw_text_at(&self, canvas: &mut PixelCanvas, x: f32, y: i32, text: &str, hl: &Highlight, normal: bool) {
        if text.is_empty() {
            return;
        }
        let fg = hl.fg(&self.ctx.theme);
        if !self.ctx.config.editor.cached_drawing {
            let style = GlyphStyle {
                bold: hl.bold,
                italic: hl.italic,
            };
            let baseline = (y + self.metrics().shift) as f32;
            for mask in self.font.rasterize(text, style, self.ligatures(), canvas.dpr()) {
                canvas.draw_mask(x, baseline, &mask, fg);
            }
            return;
        }

        let key = GlyphKey::Text {
            text: text.to_string(),
            fg,
            italic: hl.italic,
            bold: hl.bold,
            dpr_bits: canvas.dpr().to_bits(),
        };
        let cached = self.cache.lock().get(&key).cloned();
        let bitmap = match cached {
            Some(bitmap) => bitmap,
            None => {
                let Some(bitmap) = self.text_bitmap(text, hl, normal, canvas.dpr()) else {
                    return;
                };
                let bitmap = Arc::new(bitmap);
                self.cache.lock().insert(key, Arc::clone(&bitmap));
                bitmap
            }
        };
        canvas.draw_bitmap(x, y as f32, &bitmap);
    }

    fn ligatures(&self) -> bool {
        !self.ctx.config.editor.disable_ligatures
    }

    /// Rasterize `text` into a transparent bitmap one line high, with the
    /// glyphs vertically centred.
    fn text_bitmap(&self, text: &str, hl: &Highlight, normal: bool, dpr: f32) -> Option<GlyphBitmap> {
        let metrics = self.metrics();
        let width = if normal {
            grapheme_count(text) as f32 * metrics.italic_width
        } else {
            self.font.text_width(text).ceil()
        };
        let mut surface = match PixelCanvas::new(width, metrics.line_height as f32, dpr) {
            Ok(surface) => surface,
            Err(e) => {
                log::debug!("Skipping text bitmap for {:?}: {}", text, e);
                return None;
            }
        };
        let style = GlyphStyle {
            bold: hl.bold,
            italic: hl.italic,
        };
        let baseline = (metrics.line_height - metrics.height) as f32 / 2.0 + metrics.ascent;
        let fg = hl.fg(&self.ctx.theme);
        for mask in self.font.rasterize(text, style, self.ligatures(), dpr) {
            surface.draw_mask(0.0, baseline, &mask, fg);
        }
        log::trace!("Created text bitmap for {:?}", text);
        Some(GlyphBitmap {
            image: surface.into_image(),
            dpr,
        })
    }
}
