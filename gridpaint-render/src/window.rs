//! A window: one grid plus everything needed to turn it into pixels.
//!
//! Content, damage and painting are guarded separately. The transport side
//! takes the content write lock only for the duration of one mutation and
//! queues damage afterwards, so a paint never observes a half-applied row.
//! Painting holds the surface lock; a second paint arriving meanwhile is
//! reported as [`PaintOutcome::Deferred`] instead of re-entering.

use crate::canvas::PixelCanvas;
use crate::cell::CellRun;
use crate::context::RenderContext;
use crate::damage::{DamageTracker, FlushOptions};
use crate::geometry::PixelRect;
use crate::glyph_cache::RenderCache;
use crate::grid::{GridBuffer, LineUpdate, RefreshMode, ScrollRegion, UpdateEnv};
use crate::highlight::HighlightTable;
use crate::overlay::{self, SeparatorLayout, WindowBounds};
use crate::renderer::{Renderer, SurfaceStyle};
use crate::scroll_animator::{ScrollAnimator, ScrollFrame, TouchpadScroll, TouchpadStep};
use gridpaint_config::Rgba;
use gridpaint_fonts::{FontMetrics, Rasterizer};
use image::RgbaImage;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub type GridId = u64;

/// Id of the base grid every tiled window is laid out on.
pub const BASE_GRID: GridId = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowFlags {
    pub is_float: bool,
    /// Float shown in its own top-level surface.
    pub is_external: bool,
    pub is_msg_grid: bool,
    pub is_popup_menu: bool,
    pub is_shown: bool,
}

/// A per-window font override together with the glyph cache bound to it.
#[derive(Clone)]
pub struct WindowFont {
    pub rasterizer: Arc<dyn Rasterizer>,
    pub cache: Arc<Mutex<RenderCache>>,
}

impl std::fmt::Debug for WindowFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowFont")
            .field("metrics", self.rasterizer.metrics())
            .finish_non_exhaustive()
    }
}

/// Receives the pixel regions a window wants repainted.
pub trait Presenter: Send + Sync {
    fn invalidate(&self, grid: GridId, rect: PixelRect);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOutcome {
    Painted,
    /// Another paint of this window is in progress.
    Deferred,
}

/// Session-owned collaborators handed to every paint.
pub struct PaintEnv<'a> {
    pub ctx: &'a RenderContext,
    pub highlights: &'a HighlightTable,
    /// Session font, used unless the window overrides it.
    pub font: &'a dyn Rasterizer,
    /// Session glyph cache, paired with `font`.
    pub cache: &'a Mutex<RenderCache>,
    /// Tiled windows the base grid draws separators for.
    pub separators: &'a [WindowBounds],
    pub bottom_window_pos: i32,
    pub base_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Viewport {
    top: i64,
    bot: i64,
}

struct WindowState {
    col: usize,
    row: usize,
    flags: WindowFlags,
    winblend: u8,
    font: Option<WindowFont>,
    touchpad: TouchpadScroll,
    animator: ScrollAnimator,
    /// Pixel offset of the running scroll animation.
    scroll_pixels: i32,
    /// Lines the current animation scrolls by.
    scroll_cols: usize,
    viewport: Option<Viewport>,
}

#[derive(Default)]
struct WindowSurface {
    canvas: Option<PixelCanvas>,
    snapshot: Option<RgbaImage>,
}

pub struct Window {
    grid: GridId,
    content: RwLock<GridBuffer>,
    damage: Mutex<DamageTracker>,
    surface: Mutex<WindowSurface>,
    state: Mutex<WindowState>,
}

impl Window {
    pub fn new(grid: GridId, cols: usize, rows: usize, base_bg: Rgba, scroll_duration: Duration) -> Self {
        let mut damage = DamageTracker::new();
        damage.queue_redraw_all(cols, rows);
        Self {
            grid,
            content: RwLock::new(GridBuffer::new(cols, rows, base_bg)),
            damage: Mutex::new(damage),
            surface: Mutex::new(WindowSurface::default()),
            state: Mutex::new(WindowState {
                col: 0,
                row: 0,
                flags: WindowFlags {
                    is_shown: true,
                    ..WindowFlags::default()
                },
                winblend: 0,
                font: None,
                touchpad: TouchpadScroll::default(),
                animator: ScrollAnimator::new(scroll_duration),
                scroll_pixels: 0,
                scroll_cols: 0,
                viewport: None,
            }),
        }
    }

    pub fn grid(&self) -> GridId {
        self.grid
    }

    pub fn is_base_grid(&self) -> bool {
        self.grid == BASE_GRID
    }

    /// `(cols, rows)`.
    pub fn size(&self) -> (usize, usize) {
        let content = self.content.read();
        (content.cols(), content.rows())
    }

    /// `(col, row)` in base grid cells.
    pub fn position(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.col, state.row)
    }

    pub fn set_position(&self, col: usize, row: usize) {
        let mut state = self.state.lock();
        state.col = col;
        state.row = row;
    }

    pub fn flags(&self) -> WindowFlags {
        self.state.lock().flags
    }

    pub fn update_flags(&self, f: impl FnOnce(&mut WindowFlags)) {
        f(&mut self.state.lock().flags);
    }

    pub fn winblend(&self) -> u8 {
        self.state.lock().winblend
    }

    pub fn set_font(&self, font: Option<WindowFont>) {
        self.state.lock().font = font;
        let (cols, rows) = self.size();
        self.surface.lock().canvas = None;
        self.damage.lock().queue_redraw_all(cols, rows);
    }

    pub fn font(&self) -> Option<WindowFont> {
        self.state.lock().font.clone()
    }

    /// Tiled bounds in base grid cells.
    pub fn bounds(&self) -> WindowBounds {
        let (cols, rows) = self.size();
        let (col, row) = self.position();
        WindowBounds { col, row, cols, rows }
    }

    /// Run `f` with shared access to the grid content.
    pub fn read_content<R>(&self, f: impl FnOnce(&GridBuffer) -> R) -> R {
        f(&self.content.read())
    }

    pub fn scroll_pixels(&self) -> i32 {
        self.state.lock().scroll_pixels
    }

    pub fn is_animating(&self) -> bool {
        self.state.lock().animator.is_animating()
    }

    pub fn has_snapshot(&self) -> bool {
        self.surface.lock().snapshot.is_some()
    }

    /// A copy of the last painted pixels.
    pub fn image(&self) -> Option<RgbaImage> {
        self.surface.lock().canvas.as_ref().map(PixelCanvas::snapshot)
    }

    /// Apply one `grid_line` event and queue its damage.
    ///
    /// New content drops any vertical touchpad offset, which would otherwise
    /// paint the moved rows a second time.
    pub fn apply_line(&self, row: usize, col_start: i64, runs: &[CellRun], env: &UpdateEnv<'_>) -> Option<LineUpdate> {
        let update = {
            let mut content = self.content.write();
            let update = content.update_line(row, col_start, runs, env)?;
            let flags = self.flags();
            if !flags.is_msg_grid && !self.is_base_grid() {
                content.note_max_len_content(row);
            }
            update
        };

        {
            let mut state = self.state.lock();
            state.touchpad.clear_vertical();
            state.flags.is_shown = true;
            if update.popup_menu && state.flags.is_float {
                state.flags.is_popup_menu = true;
            }
            if let Some(blend) = update.blend {
                state.winblend = blend;
            }
        }

        self.damage.lock().queue_rect(update.damage());
        Some(update)
    }

    /// Apply one `grid_scroll` event and queue its damage.
    pub fn scroll(&self, region: ScrollRegion, count: i64) {
        let damage = self.content.write().scroll(region, count);
        self.state.lock().touchpad.clear_vertical();
        self.damage.lock().queue_rect(damage);
    }

    /// Reallocate the grid. Every grid except the base grid keeps the
    /// overlapping content.
    pub fn resize(&self, cols: usize, rows: usize) {
        {
            let mut content = self.content.write();
            if content.cols() == cols && content.rows() == rows {
                return;
            }
            content.resize(cols, rows, !self.is_base_grid());
        }
        self.surface.lock().canvas = None;
        self.damage.lock().queue_redraw_all(cols, rows);
        log::debug!("Resized grid {} to {}x{}", self.grid, cols, rows);
    }

    pub fn clear(&self) {
        let (cols, rows) = {
            let mut content = self.content.write();
            content.clear();
            (content.cols(), content.rows())
        };
        self.damage.lock().queue_redraw_all(cols, rows);
    }

    /// Mark the whole grid for repaint.
    pub fn refresh(&self, mode: RefreshMode) {
        let (cols, rows) = {
            let mut content = self.content.write();
            content.refresh_update_area(mode);
            (content.cols(), content.rows())
        };
        self.damage.lock().queue_redraw_all(cols, rows);
    }

    /// Queue the whole window without touching masks, so only content that
    /// is already there gets repainted.
    pub fn queue_redraw_all(&self) {
        let (cols, rows) = self.size();
        self.damage.lock().queue_redraw_all(cols, rows);
    }

    /// Drop the pixel offset of a running scroll animation.
    pub fn reset_scroll_offset(&self) {
        self.state.lock().scroll_pixels = 0;
    }

    /// Adopt `bg` as the base background. Returns whether it changed.
    pub fn sync_base_bg(&self, bg: Rgba) -> bool {
        {
            let mut content = self.content.write();
            if content.base_bg() == bg {
                return false;
            }
            content.set_base_bg(bg);
        }
        self.refresh(RefreshMode::Full);
        true
    }

    pub fn rebind_highlights(&self, highlights: &HighlightTable, ctx: &RenderContext) {
        self.content.write().rebind_highlights(highlights, &ctx.theme);
        let (cols, rows) = self.size();
        self.damage.lock().queue_redraw_all(cols, rows);
    }

    pub fn metrics_for(&self, session_font: &dyn Rasterizer) -> FontMetrics {
        match &self.state.lock().font {
            Some(font) => *font.rasterizer.metrics(),
            None => *session_font.metrics(),
        }
    }

    /// Pixel size of the whole window.
    pub fn full_rect(&self, metrics: &FontMetrics) -> PixelRect {
        let (cols, rows) = self.size();
        let (w, h) = metrics.grid_size(cols, rows);
        PixelRect::new(0, 0, w as i32, h as i32)
    }

    /// Turn queued damage into pixel rectangles and hand them to `presenter`.
    pub fn flush(&self, ctx: &RenderContext, metrics: &FontMetrics, presenter: &dyn Presenter) -> Vec<PixelRect> {
        let options = {
            let state = self.state.lock();
            FlushOptions {
                touchpad_active: state.touchpad.is_active(),
                indent_guide: ctx.config.editor.indent_guide,
                animating: ctx.config.editor.smooth_scroll && state.scroll_pixels != 0,
            }
        };

        let cells = {
            let mut content = self.content.write();
            self.damage.lock().flush(&mut content, options)
        };

        let rects: Vec<PixelRect> = cells.iter().map(|c| c.to_pixels(metrics)).collect();
        for rect in &rects {
            presenter.invalidate(self.grid, *rect);
        }
        rects
    }

    /// Record a `win_viewport` and start a smooth scroll for the line delta.
    ///
    /// Returns the animated delta. The first viewport of a grid only
    /// records the position.
    pub fn handle_viewport(&self, top: i64, bot: i64, ctx: &RenderContext, now: Instant) -> Option<i32> {
        let flags = self.flags();
        if flags.is_msg_grid || self.is_base_grid() {
            return None;
        }
        let rows = self.size().1 as i64;
        let next = Viewport { top, bot };
        let prev = self.state.lock().viewport.replace(next)?;

        let mut diff = next.top - prev.top;
        if diff == 0 {
            diff = next.bot - prev.bot;
        }
        if diff.abs() >= rows / 2 {
            let wrapped_next = rows - (next.bot - next.top - 1);
            let wrapped_prev = rows - (prev.bot - prev.top - 1);
            if diff < 0 {
                diff -= wrapped_next;
            } else if diff > 0 {
                diff += wrapped_prev;
            }
        }

        if diff == 0 || !ctx.config.editor.smooth_scroll || ctx.key_auto_repeating {
            return None;
        }
        let diff = diff as i32;

        {
            let mut surface = self.surface.lock();
            surface.snapshot = surface.canvas.as_ref().map(PixelCanvas::snapshot);
        }
        self.start_smooth_scroll(diff, now);
        Some(diff)
    }

    /// Start (or restart) the scroll animation for `diff` lines.
    pub fn start_smooth_scroll(&self, diff: i32, now: Instant) {
        let mut state = self.state.lock();
        state.scroll_cols = diff.unsigned_abs() as usize;
        state.animator.start(diff, now);
    }

    /// Advance the scroll animation.
    ///
    /// Every frame invalidates the whole window. The final frame erases the
    /// surface, repaints all content without offset and captures the
    /// snapshot the next animation overlays.
    pub fn tick(&self, now: Instant, env: &PaintEnv<'_>, presenter: &dyn Presenter) -> Option<ScrollFrame> {
        let metrics = self.metrics_for(env.font);
        let frame = {
            let mut state = self.state.lock();
            let frame = state.animator.tick(now, metrics.line_height)?;
            state.scroll_pixels = frame.offset;
            frame
        };
        let full = self.full_rect(&metrics);

        if frame.finished {
            {
                let bg = self.content.read().base_bg();
                if let Some(canvas) = self.surface.lock().canvas.as_mut() {
                    canvas.erase_all(bg);
                }
            }
            self.content.write().refresh_update_area(RefreshMode::Full);
            self.paint(full, env);
            let config = &env.ctx.config.editor;
            if config.smooth_scroll && !env.ctx.key_auto_repeating {
                let mut surface = self.surface.lock();
                surface.snapshot = surface.canvas.as_ref().map(PixelCanvas::snapshot);
            }
        }

        presenter.invalidate(self.grid, full);
        Some(frame)
    }

    /// Accumulate a touchpad pixel delta.
    pub fn touchpad_scroll(&self, vertical: i32, horizontal: i32, ctx: &RenderContext, metrics: &FontMetrics) -> TouchpadStep {
        let reversing = ctx.config.editor.reversing_scroll;
        self.state
            .lock()
            .touchpad
            .accumulate(vertical, horizontal, reversing, metrics.cell_width, metrics.line_height)
    }

    /// The touchpad gesture ended.
    pub fn touchpad_stop(&self) {
        self.state.lock().touchpad.stop();
    }

    /// Repaint `rect` (logical pixels) of the surface.
    pub fn paint(&self, rect: PixelRect, env: &PaintEnv<'_>) -> PaintOutcome {
        let Some(mut surface) = self.surface.try_lock() else {
            log::trace!("Deferring paint of grid {}", self.grid);
            return PaintOutcome::Deferred;
        };

        let (flags, winblend, override_font, scroll_pixels, touchpad_py, scroll_cols) = {
            let state = self.state.lock();
            (
                state.flags,
                state.winblend,
                state.font.clone(),
                state.scroll_pixels,
                state.touchpad.vertical_pixels(),
                state.scroll_cols,
            )
        };
        let (font, cache): (&dyn Rasterizer, &Mutex<RenderCache>) = match &override_font {
            Some(f) => (f.rasterizer.as_ref(), f.cache.as_ref()),
            None => (env.font, env.cache),
        };
        let ctx = env.ctx;
        let config = &ctx.config.editor;
        let metrics = *font.metrics();
        let lh = metrics.line_height;

        let mut offset = scroll_pixels;
        if config.line_to_scroll == 1 {
            offset += touchpad_py;
        }

        let style = SurfaceStyle {
            is_float: flags.is_float,
            is_popup_menu: flags.is_popup_menu,
            is_msg_grid: flags.is_msg_grid,
            winblend,
        };

        let marks = {
            let content = self.content.read();
            let (width, height) = metrics.grid_size(content.cols(), content.rows());
            let (width, height) = (width.max(1.0), height.max(1.0));
            let stale = surface
                .canvas
                .as_ref()
                .is_none_or(|c| !c.has_size(width, height, ctx.dpr));
            // A fresh surface has no pixels yet, so it is painted in full.
            let rect = if stale {
                match PixelCanvas::new(width, height, ctx.dpr) {
                    Ok(canvas) => surface.canvas = Some(canvas),
                    Err(e) => {
                        log::warn!("Cannot allocate surface for grid {}: {}", self.grid, e);
                        return PaintOutcome::Painted;
                    }
                }
                PixelRect::new(0, 0, width.ceil() as i32, height.ceil() as i32)
            } else {
                rect
            };
            let WindowSurface { canvas, snapshot } = &mut *surface;
            let Some(canvas) = canvas.as_mut() else {
                return PaintOutcome::Painted;
            };

            canvas.set_clip(Some(rect));
            let fill = if style.auto_fill(ctx) {
                content.base_bg()
            } else {
                Rgba::TRANSPARENT
            };
            canvas.erase(rect.to_f(), fill);

            let renderer = Renderer {
                ctx,
                highlights: env.highlights,
                font,
                cache,
                surface: style,
                offset,
            };
            let span = rect.cell_span(&metrics);
            let end = (span.row + span.rows).min(content.rows());
            for row in span.row..end {
                renderer.draw_row(canvas, &content, row, span.col, span.cols);
            }

            if config.smooth_scroll
                && !ctx.key_auto_repeating
                && scroll_pixels != 0
                && let Some(snapshot) = snapshot.as_ref()
            {
                let height = scroll_cols as i32 * lh;
                let pos = if scroll_pixels > 0 {
                    scroll_pixels - height
                } else {
                    height + scroll_pixels
                };
                canvas.draw_image(0.0, pos as f32, snapshot);
            }

            let mut marks = Vec::new();
            if config.indent_guide && !self.is_base_grid() && !flags.is_msg_grid && flags.is_shown {
                let cursor = (ctx.cursor.grid == self.grid).then_some((ctx.cursor.row, ctx.cursor.col));
                marks = overlay::analyze_indent_guides(&content, ctx.tabstop, cursor);
                overlay::draw_indent_guides(canvas, &marks, &metrics, &ctx.theme, offset);
            }

            if config.draw_border_for_float_window && flags.is_float && flags.is_external {
                overlay::draw_float_border(canvas, env.highlights, &ctx.theme);
            }

            if config.draw_window_separator && self.is_base_grid() {
                let layout = SeparatorLayout {
                    base_rows: env.base_rows,
                    screen_height: canvas.logical_size().1,
                    showtabline: ctx.showtabline,
                    tab_count: ctx.tab_count,
                    external_tabline: ctx.config.tabline.visible && ctx.config.tabline.ext_tabline,
                    bottom_window_pos: env.bottom_window_pos,
                    gradient: config.window_separator_gradient,
                };
                for bounds in env.separators {
                    let shapes = overlay::separator_shapes(bounds, &layout, &metrics);
                    overlay::draw_separators(canvas, &shapes, ctx.theme.window_separator);
                }
            }

            if flags.is_msg_grid {
                overlay::draw_msg_separator(canvas, env.highlights, &ctx.theme);
            }

            canvas.set_clip(None);
            marks
        };

        if !marks.is_empty() {
            let mut content = self.content.write();
            for mark in &marks {
                content.extend_content_to(mark.row, mark.col);
            }
        }

        self.state
            .lock()
            .touchpad
            .reset_after_paint(metrics.cell_width, lh);
        PaintOutcome::Painted
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("grid", &self.grid)
            .field("size", &self.size())
            .field("flags", &self.flags())
            .finish_non_exhaustive()
    }
}
