use super::Renderer;
use crate::canvas::PixelCanvas;
use crate::geometry::RectF;
use crate::grid::GridBuffer;
use crate::highlight::{DiffKind, Highlight};
use gridpaint_config::{FillPattern, Rgba};
use std::sync::Arc;

/// Opacity (0..=255) of a surface with `blend` percent transparency.
pub fn blend_alpha(blend: u8) -> u8 {
    (255.0 * (100.0 - blend.min(100) as f32) / 100.0) as u8
}

fn unit_alpha(t: f32) -> u8 {
    (t.clamp(0.0, 1.0) * 255.0) as u8
}

impl Renderer<'_> {
    /// Fill colour (with opacity) and pattern for a cell background.
    pub fn fill_style(&self, hl: &Highlight) -> (Rgba, FillPattern) {
        let config = &self.ctx.config;
        let mut color = hl.bg(&self.ctx.theme);
        let mut pattern = FillPattern::Solid;

        let mut alpha = 255;
        if self.surface.is_popup_menu {
            alpha = blend_alpha(self.ctx.pumblend);
        } else if self.surface.is_float {
            alpha = blend_alpha(self.surface.winblend);
        }
        if self.surface.is_msg_grid {
            let t = config.message.transparent;
            alpha = if t < 1.0 { unit_alpha(t) } else { 255 };
        }

        let diff_pattern = match hl.diff_kind() {
            Some(DiffKind::Change) => config.editor.diff_change_pattern,
            Some(DiffKind::Delete) => config.editor.diff_delete_pattern,
            Some(DiffKind::Add) => config.editor.diff_add_pattern,
            None => FillPattern::Solid,
        };
        if diff_pattern != FillPattern::Solid {
            pattern = diff_pattern;
            if diff_pattern.uses_editor_transparency() {
                alpha = unit_alpha(config.editor.transparent);
            }
            color = color.colorful();
        }

        (color.with_alpha(alpha), pattern)
    }

    /// Fill the backgrounds of `row`, merging neighbouring cells that share
    /// a background colour and fill style into one rectangle.
    pub(super) fn draw_background(
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
        let end = (col + cols + 1).min(line.len());
        let draw_default = self.surface.draws_default_bg(self.ctx);
        let theme = &self.ctx.theme;

        let mut run: Option<BackgroundRun> = None;
        for (x, cell) in line.iter().enumerate().take(end).skip(col) {
            let hl = match cell {
                Some(cell) => Arc::clone(&cell.highlight),
                None => self.highlights.default_highlight(),
            };
            let bg = hl.bg(theme);
            let style = self.fill_style(&hl);
            if let Some(current) = run.as_mut()
                && current.bg == bg
                && current.style == style
            {
                current.last = x;
                continue;
            }
            let next = BackgroundRun {
                start: x,
                last: x,
                bg,
                style,
            };
            if let Some(done) = run.replace(next) {
                self.fill_run(canvas, grid, row, &done, draw_default);
            }
        }
        if let Some(done) = run {
            self.fill_run(canvas, grid, row, &done, draw_default);
        }
    }

    fn fill_run(&self, canvas: &mut PixelCanvas, grid: &GridBuffer, row: usize, run: &BackgroundRun, draw_default: bool) {
        if !draw_default && run.bg.same_rgb(&grid.base_bg()) {
            return;
        }
        let metrics = self.metrics();
        let lh = metrics.line_height;
        let (color, pattern) = run.style;
        let rect = RectF::new(
            run.start as f32 * metrics.cell_width,
            (row as i32 * lh + self.offset) as f32,
            (run.last - run.start + 1) as f32 * metrics.cell_width,
            lh as f32,
        );
        canvas.fill_rect(rect, color, pattern);
    }
}

/// Consecutive cells `start..=last` sharing one background.
struct BackgroundRun {
    start: usize,
    last: usize,
    bg: Rgba,
    style: (Rgba, FillPattern),
}
