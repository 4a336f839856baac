//! Shared integration test helpers for gridpaint-render.
//!
//! Include with `mod common;` at the top of a test file. Every helper draws
//! with the block rasterizer so pixel expectations do not depend on fonts:
//! at size 10 a cell is 6x11 pixels and a glyph is a box covering
//! columns 1..5 and rows 2..8 of its cell.

#![allow(dead_code)]

use gridpaint_config::{RenderConfig, Rgba};
use gridpaint_fonts::{BlockRasterizer, Rasterizer};
use gridpaint_render::{
    CellRun, GridBuffer, Highlight, HighlightTable, PaintEnv, PixelRect, Presenter, RenderCache, RenderContext,
    UpdateEnv, Window, new_render_cache,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

pub const RED: Rgba = Rgba::rgb(200, 0, 0);
pub const GREEN: Rgba = Rgba::rgb(0, 200, 0);

pub const HL_PLAIN: u64 = 1;
pub const HL_RED_BG: u64 = 2;
pub const HL_UNDERLINE: u64 = 3;
pub const HL_LINE_NR: u64 = 4;
pub const HL_DIFF_CHANGE: u64 = 5;
pub const HL_GREEN_FG: u64 = 6;

pub fn highlight_table() -> HighlightTable {
    let mut table = HighlightTable::new();
    table.define(HL_PLAIN, Highlight::default());
    table.define(
        HL_RED_BG,
        Highlight {
            background: Some(RED),
            ..Default::default()
        },
    );
    table.define(
        HL_UNDERLINE,
        Highlight {
            underline: true,
            special: Some(GREEN),
            ..Default::default()
        },
    );
    table.define(
        HL_LINE_NR,
        Highlight {
            hi_name: "LineNr".into(),
            ..Default::default()
        },
    );
    table.define(
        HL_DIFF_CHANGE,
        Highlight {
            hi_name: "DiffChange".into(),
            background: Some(Rgba::rgb(40, 40, 120)),
            ..Default::default()
        },
    );
    table.define(
        HL_GREEN_FG,
        Highlight {
            foreground: Some(GREEN),
            ..Default::default()
        },
    );
    table
}

pub struct Fixture {
    pub table: HighlightTable,
    pub ctx: RenderContext,
    pub font: BlockRasterizer,
    pub cache: Mutex<RenderCache>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(RenderConfig::default())
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            table: highlight_table(),
            ctx: RenderContext::new(Arc::new(config)),
            font: BlockRasterizer::new(10.0, 0, 0.0),
            cache: Mutex::new(new_render_cache(64)),
        }
    }

    pub fn config_mut(&mut self) -> &mut RenderConfig {
        Arc::make_mut(&mut self.ctx.config)
    }

    pub fn background(&self) -> Rgba {
        self.ctx.theme.background
    }

    pub fn grid(&self, cols: usize, rows: usize) -> GridBuffer {
        GridBuffer::new(cols, rows, self.background())
    }

    pub fn window(&self, grid: u64, cols: usize, rows: usize) -> Window {
        Window::new(grid, cols, rows, self.background(), Duration::from_millis(220))
    }

    /// Run `f` with an update environment that measures with the test font.
    pub fn with_env<R>(&self, f: impl FnOnce(&UpdateEnv<'_>) -> R) -> R {
        let measure = |text: &str| self.font.is_normal_width(text);
        let env = UpdateEnv {
            highlights: &self.table,
            theme: &self.ctx.theme,
            is_normal_width: &measure,
        };
        f(&env)
    }

    pub fn write_grid(&self, grid: &mut GridBuffer, row: usize, col: i64, text: &str, hl: u64) {
        let runs = runs_of(text, hl);
        self.with_env(|env| grid.update_line(row, col, &runs, env));
        grid.note_max_len_content(row);
    }

    pub fn write_window(&self, window: &Window, row: usize, col: i64, text: &str, hl: u64) {
        let runs = runs_of(text, hl);
        self.with_env(|env| window.apply_line(row, col, &runs, env));
    }

    pub fn paint_env<'a>(&'a self, separators: &'a [gridpaint_render::WindowBounds]) -> PaintEnv<'a> {
        PaintEnv {
            ctx: &self.ctx,
            highlights: &self.table,
            font: &self.font,
            cache: &self.cache,
            separators,
            bottom_window_pos: 0,
            base_rows: 0,
        }
    }

    /// Flush `window` and paint every emitted rectangle.
    pub fn flush_and_paint(&self, window: &Window) -> Vec<PixelRect> {
        let presenter = RecordingPresenter::default();
        let rects = window.flush(&self.ctx, self.font.metrics(), &presenter);
        let env = self.paint_env(&[]);
        for rect in &rects {
            window.paint(*rect, &env);
        }
        rects
    }
}

/// One run per character, the first carrying `hl`.
pub fn runs_of(text: &str, hl: u64) -> Vec<CellRun> {
    text.chars()
        .enumerate()
        .map(|(i, c)| CellRun::new(c.to_string(), (i == 0).then_some(hl), None))
        .collect()
}

pub fn row_text(grid: &GridBuffer, row: usize) -> String {
    (0..grid.cols())
        .map(|c| grid.cell(row, c).map(|c| c.text.clone()).unwrap_or_else(|| ".".into()))
        .collect()
}

/// Collects every invalidated rectangle.
#[derive(Default)]
pub struct RecordingPresenter {
    pub rects: Mutex<Vec<(u64, PixelRect)>>,
}

impl Presenter for RecordingPresenter {
    fn invalidate(&self, grid: u64, rect: PixelRect) {
        self.rects.lock().push((grid, rect));
    }
}

/// Pixel of the window's last painted image.
pub fn pixel(window: &Window, x: u32, y: u32) -> Rgba {
    let image = window.image().expect("window was painted");
    let p = image.get_pixel(x, y).0;
    Rgba::new(p[0], p[1], p[2], p[3])
}
