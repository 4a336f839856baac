//! Per-row drawing of one window's grid content.
//!
//! A repaint draws, for every damaged row, the merged background fills,
//! then the text of the whole row, then decorations. Glyph runs and
//! decoration overlays go through the shared [`RenderCache`] when cached
//! drawing is enabled.

mod background;
mod decoration;
mod text;

pub use background::blend_alpha;
pub use decoration::{DecorationStroke, decoration_strokes};
pub use text::{Word, group_words};

use crate::canvas::PixelCanvas;
use crate::context::RenderContext;
use crate::glyph_cache::RenderCache;
use crate::grid::GridBuffer;
use crate::highlight::HighlightTable;
use gridpaint_fonts::{FontMetrics, Rasterizer};
use parking_lot::Mutex;

/// What kind of surface a window paints, which decides its transparency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceStyle {
    pub is_float: bool,
    pub is_popup_menu: bool,
    pub is_msg_grid: bool,
    /// Window blend in percent, taken from the highlights written to it.
    pub winblend: u8,
}

impl SurfaceStyle {
    /// Whether cells in the base background are painted too. Translucent
    /// floats and message grids have no opaque base fill underneath.
    pub fn draws_default_bg(&self, ctx: &RenderContext) -> bool {
        if !(self.is_float || self.is_msg_grid) {
            return false;
        }
        let config = &ctx.config;
        config.editor.transparent < 1.0
            || config.message.transparent < 1.0
            || (self.is_popup_menu && ctx.pumblend > 0)
            || (self.is_float && !self.is_popup_menu && self.winblend > 0)
    }

    /// Whether a paint starts by filling its region with the base background
    /// (otherwise it starts transparent).
    pub fn auto_fill(&self, ctx: &RenderContext) -> bool {
        let config = &ctx.config;
        !(config.editor.transparent < 1.0
            || (self.is_msg_grid && config.message.transparent < 1.0)
            || (self.is_popup_menu && ctx.pumblend > 0)
            || (self.is_float && !self.is_popup_menu && self.winblend > 0))
    }
}

/// Borrowed collaborators for painting one window.
pub struct Renderer<'a> {
    pub ctx: &'a RenderContext,
    pub highlights: &'a HighlightTable,
    pub font: &'a dyn Rasterizer,
    pub cache: &'a Mutex<RenderCache>,
    pub surface: SurfaceStyle,
    /// Vertical pixel offset of smooth scrolling.
    pub offset: i32,
}

impl Renderer<'_> {
    pub fn metrics(&self) -> &FontMetrics {
        self.font.metrics()
    }

    /// Draw background, text and decorations of `row` for columns
    /// `col..=col + cols`. Text always covers the whole row so ligatures
    /// crossing the damaged span stay intact.
    pub fn draw_row(&self, canvas: &mut PixelCanvas, grid: &GridBuffer, row: usize, col: usize, cols: usize) {
        if row >= grid.rows() {
            return;
        }
        self.draw_background(canvas, grid, row, col, cols);
        self.draw_text(canvas, grid, row);
        self.draw_decorations(canvas, grid, row, col, cols);
    }
}
