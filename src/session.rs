//! A rendering session: every window of one remote editor connection.
//!
//! The session owns the highlight table, the render context and the glyph
//! cache all windows share. Redraw events are applied from the transport
//! side; flushing, painting, animation ticks and composition happen on the
//! painting side.
//!
//! # Locking
//!
//! The window map is only held long enough to clone the `Arc<Window>`s out
//! of it; no window lock is ever taken while it is held. The highlight table
//! and render context are swapped wholesale, so a paint reads one consistent
//! version for its whole pass.

use crate::events::{FloatAnchor, OptionValue, RedrawEvent};
use arc_swap::ArcSwap;
use gridpaint_config::{RenderConfig, Rgba};
use gridpaint_fonts::{FontMetrics, Rasterizer};
use gridpaint_render::overlay::draw_float_shadow;
use gridpaint_render::{
    BASE_GRID, CellRun, CursorPos, GridId, HighlightTable, PaintEnv, PaintOutcome, PixelCanvas, PixelRect, Presenter,
    RectF, RenderCache, RenderContext, RenderError, ScrollRegion, Theme, TouchpadStep, UpdateEnv, Window, WindowBounds,
    WindowFont, new_render_cache,
};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// z-index the remote editor gives floats that do not set one.
const DEFAULT_FLOAT_ZINDEX: i64 = 50;

#[derive(Debug, Clone, Copy, Default)]
struct Layer {
    zindex: i64,
    /// Raise sequence; later raises stack higher within a z-index.
    raised: u64,
}

#[derive(Debug, Default)]
struct Layers {
    next: u64,
    by_grid: HashMap<GridId, Layer>,
    /// Grid of the most recent `grid_line`.
    last_grid_line: Option<GridId>,
}

impl Layers {
    fn raise(&mut self, grid: GridId) {
        self.next += 1;
        let next = self.next;
        self.by_grid.entry(grid).or_default().raised = next;
    }

    fn set_zindex(&mut self, grid: GridId, zindex: i64) {
        self.by_grid.entry(grid).or_default().zindex = zindex;
    }

    fn get(&self, grid: GridId) -> Layer {
        self.by_grid.get(&grid).copied().unwrap_or_default()
    }
}

pub struct Session {
    windows: RwLock<BTreeMap<GridId, Arc<Window>>>,
    layers: Mutex<Layers>,
    highlights: ArcSwap<HighlightTable>,
    context: ArcSwap<RenderContext>,
    font: Arc<dyn Rasterizer>,
    cache: Arc<Mutex<RenderCache>>,
    /// Highlights were redefined since cells were last rebound.
    rebind_pending: AtomicBool,
}

impl Session {
    pub fn new(config: Arc<RenderConfig>, font: Arc<dyn Rasterizer>, dpr: f32) -> Self {
        let cache = new_render_cache(config.editor.cache_size);
        Self {
            windows: RwLock::new(BTreeMap::new()),
            layers: Mutex::new(Layers::default()),
            highlights: ArcSwap::from_pointee(HighlightTable::new()),
            context: ArcSwap::from_pointee(RenderContext::new(config).with_dpr(dpr)),
            font,
            cache: Arc::new(Mutex::new(cache)),
            rebind_pending: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> Arc<RenderConfig> {
        Arc::clone(&self.context.load().config)
    }

    pub fn context(&self) -> Arc<RenderContext> {
        self.context.load_full()
    }

    pub fn highlights(&self) -> Arc<HighlightTable> {
        self.highlights.load_full()
    }

    pub fn theme(&self) -> Theme {
        self.context.load().theme
    }

    /// Metrics of the session font.
    pub fn metrics(&self) -> &FontMetrics {
        self.font.metrics()
    }

    pub fn cache(&self) -> &Arc<Mutex<RenderCache>> {
        &self.cache
    }

    pub fn window(&self, grid: GridId) -> Option<Arc<Window>> {
        self.windows.read().get(&grid).cloned()
    }

    pub fn grids(&self) -> Vec<GridId> {
        self.windows.read().keys().copied().collect()
    }

    fn all_windows(&self) -> Vec<Arc<Window>> {
        self.windows.read().values().cloned().collect()
    }

    fn lookup(&self, grid: GridId, event: &str) -> Option<Arc<Window>> {
        let win = self.window(grid);
        if win.is_none() {
            log::debug!("{} for unknown grid {}", event, grid);
        }
        win
    }

    fn update_context(&self, f: impl Fn(&mut RenderContext)) {
        self.context.rcu(|ctx| {
            let mut next = RenderContext::clone(ctx);
            f(&mut next);
            next
        });
    }

    fn update_highlights(&self, f: impl Fn(&mut HighlightTable)) {
        self.highlights.rcu(|table| {
            let mut next = HighlightTable::clone(table);
            f(&mut next);
            next
        });
    }

    pub fn set_key_auto_repeating(&self, repeating: bool) {
        self.update_context(|ctx| ctx.key_auto_repeating = repeating);
    }

    /// Apply a batch of events in order.
    pub fn apply_all(&self, events: &[RedrawEvent], now: Instant, presenter: &dyn Presenter) {
        for event in events {
            self.apply(event, now, presenter);
        }
    }

    /// Apply one redraw event. A `flush` event hands the damage of every
    /// window to `presenter`.
    pub fn apply(&self, event: &RedrawEvent, now: Instant, presenter: &dyn Presenter) {
        match event {
            RedrawEvent::GridLine {
                grid,
                row,
                col_start,
                cells,
            } => self.grid_line(*grid, *row, *col_start, cells),
            RedrawEvent::GridScroll {
                grid,
                top,
                bottom,
                left,
                right,
                rows,
            } => {
                let Some(win) = self.lookup(*grid, "grid_scroll") else {
                    return;
                };
                match ScrollRegion::from_exclusive(*top, *bottom, *left, *right) {
                    Some(region) => win.scroll(region, *rows),
                    None => log::debug!("Ignoring empty scroll region on grid {}", grid),
                }
            }
            RedrawEvent::GridResize { grid, cols, rows } => self.grid_resize(*grid, *cols, *rows),
            RedrawEvent::GridClear { grid } => {
                if let Some(win) = self.lookup(*grid, "grid_clear") {
                    win.clear();
                }
            }
            RedrawEvent::GridDestroy { grid } => self.grid_destroy(*grid),
            RedrawEvent::GridCursorGoto { grid, row, col } => self.cursor_goto(*grid, *row, *col),
            RedrawEvent::HlAttrDefine { id, attrs, info } => {
                let highlight = attrs.to_highlight(*id, info);
                self.update_highlights(|table| table.define(*id, highlight.clone()));
                self.rebind_pending.store(true, Ordering::Release);
            }
            RedrawEvent::DefaultColorsSet { fg, bg, sp } => self.default_colors_set(*fg, *bg, *sp),
            RedrawEvent::HlGroupSet { name, id } => {
                self.update_highlights(|table| table.set_group(name.clone(), *id));
            }
            RedrawEvent::WinPos { grid, row, col, .. } => {
                if let Some(win) = self.lookup(*grid, "win_pos") {
                    win.set_position(*col, *row);
                    win.update_flags(|f| f.is_shown = true);
                }
            }
            RedrawEvent::WinFloatPos {
                grid,
                anchor,
                anchor_grid,
                anchor_row,
                anchor_col,
                zindex,
            } => self.float_pos(*grid, *anchor, *anchor_grid, *anchor_row, *anchor_col, *zindex),
            RedrawEvent::WinExternalPos { grid } => {
                if let Some(win) = self.lookup(*grid, "win_external_pos")
                    && !win.is_base_grid()
                    && !win.flags().is_msg_grid
                {
                    win.update_flags(|f| f.is_external = true);
                }
            }
            RedrawEvent::WinHide { grid } => {
                if let Some(win) = self.lookup(*grid, "win_hide") {
                    win.update_flags(|f| f.is_shown = false);
                }
            }
            RedrawEvent::WinViewport { grid, topline, botline } => {
                if let Some(win) = self.lookup(*grid, "win_viewport") {
                    let ctx = self.context();
                    if let Some(diff) = win.handle_viewport(*topline, *botline, &ctx, now) {
                        log::trace!("Grid {} scrolls {} lines", grid, diff);
                    }
                }
            }
            RedrawEvent::MsgSetPos { grid, row, scrolled } => {
                let Some(win) = self.lookup(*grid, "msg_set_pos") else {
                    return;
                };
                win.update_flags(|f| {
                    f.is_msg_grid = true;
                    f.is_shown = true;
                });
                let (col, _) = win.position();
                win.set_position(col, *row);
                if *scrolled {
                    self.layers.lock().raise(*grid);
                }
            }
            RedrawEvent::OptionSet { name, value } => self.option_set(name, value),
            RedrawEvent::Flush => {
                self.flush(presenter);
            }
        }
    }

    fn grid_line(&self, grid: GridId, row: usize, col_start: i64, cells: &[CellRun]) {
        let Some(win) = self.lookup(grid, "grid_line") else {
            return;
        };
        let highlights = self.highlights();
        let ctx = self.context();
        let font = win.font();
        let rasterizer: &dyn Rasterizer = match &font {
            Some(f) => f.rasterizer.as_ref(),
            None => self.font.as_ref(),
        };
        let measure = |text: &str| rasterizer.is_normal_width(text);
        let env = UpdateEnv {
            highlights: &highlights,
            theme: &ctx.theme,
            is_normal_width: &measure,
        };
        if win.apply_line(row, col_start, cells, &env).is_none() {
            log::debug!("Dropped grid_line for grid {} row {}", grid, row);
            return;
        }

        // Floats stack in the order the editor writes to them.
        let flags = win.flags();
        let mut layers = self.layers.lock();
        if flags.is_float && !flags.is_msg_grid && layers.last_grid_line != Some(grid) {
            layers.raise(grid);
        }
        layers.last_grid_line = Some(grid);
    }

    fn grid_resize(&self, grid: GridId, cols: usize, rows: usize) {
        if let Some(win) = self.window(grid) {
            win.resize(cols, rows);
            win.update_flags(|f| f.is_shown = true);
            return;
        }

        let ctx = self.context();
        let duration = Duration::from_millis(ctx.config.editor.smooth_scroll_duration_ms);
        let win = Arc::new(Window::new(grid, cols, rows, ctx.theme.background, duration));
        self.windows.write().entry(grid).or_insert(win);
        self.layers.lock().raise(grid);
        log::debug!("Created grid {} ({}x{})", grid, cols, rows);
    }

    /// Remove a grid. Every other float is repainted in full, since a
    /// vanished window leaves shadow remnants behind.
    fn grid_destroy(&self, grid: GridId) {
        let removed = self.windows.write().remove(&grid);
        self.layers.lock().by_grid.remove(&grid);
        if removed.is_none() {
            return;
        }
        log::debug!("Destroyed grid {}", grid);

        for win in self.all_windows() {
            let flags = win.flags();
            if win.is_base_grid() || flags.is_msg_grid || !flags.is_shown {
                continue;
            }
            win.queue_redraw_all();
        }
    }

    fn cursor_goto(&self, grid: GridId, row: usize, col: usize) {
        let previous = self.context.load().cursor.grid;
        self.update_context(|ctx| ctx.cursor = CursorPos { grid, row, col });
        if previous == grid {
            return;
        }
        if let Some(win) = self.window(grid) {
            win.reset_scroll_offset();
            self.layers.lock().raise(grid);
        }
    }

    fn float_pos(
        &self,
        grid: GridId,
        anchor: FloatAnchor,
        anchor_grid: GridId,
        anchor_row: f64,
        anchor_col: f64,
        zindex: Option<i64>,
    ) {
        let Some(win) = self.lookup(grid, "win_float_pos") else {
            return;
        };
        win.update_flags(|f| {
            f.is_float = true;
            f.is_external = false;
        });
        let Some(anchor_win) = self.lookup(anchor_grid, "win_float_pos anchor") else {
            return;
        };

        let (ax, ay) = if anchor_win.flags().is_external {
            (0, 0)
        } else {
            let (col, row) = anchor_win.position();
            (col as i64, row as i64)
        };
        let (cols, rows) = win.size();
        let (cols, rows) = (cols as i64, rows as i64);
        let (ar, ac) = (anchor_row as i64, anchor_col as i64);
        let (x, y) = match anchor {
            FloatAnchor::NW => (ax + ac, ay + ar),
            FloatAnchor::NE => (ax + ac - cols, ay + ar),
            FloatAnchor::SW => (ax + ac, ay + ar - rows),
            FloatAnchor::SE => (ax + ac - cols, ay + ar - rows),
        };
        win.set_position(x.max(0) as usize, y.max(0) as usize);
        win.update_flags(|f| f.is_shown = true);
        {
            let mut layers = self.layers.lock();
            layers.set_zindex(grid, zindex.unwrap_or(DEFAULT_FLOAT_ZINDEX));
            layers.raise(grid);
        }
        anchor_win.queue_redraw_all();
    }

    fn option_set(&self, name: &str, value: &OptionValue) {
        match name {
            "showtabline" => {
                if let Some(v) = value.as_int() {
                    self.update_context(|ctx| ctx.showtabline = v as i32);
                }
            }
            "pumblend" => {
                if let Some(v) = value.as_int() {
                    self.update_context(|ctx| ctx.pumblend = v.clamp(0, 100) as u8);
                }
            }
            "tabstop" => match value.as_int() {
                Some(v) if v > 0 => self.update_context(|ctx| ctx.tabstop = v as usize),
                _ => log::debug!("Ignoring tabstop {:?}", value),
            },
            _ => log::trace!("Unhandled option {}", name),
        }
    }

    /// Update theme defaults. Every grid adopts the new background and is
    /// repainted.
    pub fn default_colors_set(&self, fg: Option<Rgba>, bg: Option<Rgba>, sp: Option<Rgba>) {
        self.update_context(|ctx| {
            if let Some(fg) = fg {
                ctx.theme.foreground = fg;
            }
            if let Some(bg) = bg {
                ctx.theme.background = bg;
            }
            if let Some(sp) = sp {
                ctx.theme.special = sp;
            }
        });
        let ctx = self.context();
        let highlights = self.highlights();
        for win in self.all_windows() {
            win.rebind_highlights(&highlights, &ctx);
            win.sync_base_bg(ctx.theme.background);
        }
    }

    /// Point every cell at the current definition of its highlight.
    pub fn rebind(&self) {
        self.rebind_pending.store(false, Ordering::Release);
        let ctx = self.context();
        let highlights = self.highlights();
        for win in self.all_windows() {
            if win.flags().is_shown {
                win.rebind_highlights(&highlights, &ctx);
            }
        }
    }

    /// Flush the damage of every window to `presenter`.
    pub fn flush(&self, presenter: &dyn Presenter) -> Vec<(GridId, PixelRect)> {
        if self.rebind_pending.load(Ordering::Acquire) {
            self.rebind();
        }
        let ctx = self.context();
        let mut out = Vec::new();
        for win in self.all_windows() {
            let metrics = win.metrics_for(self.font.as_ref());
            out.extend(win.flush(&ctx, &metrics, presenter).into_iter().map(|r| (win.grid(), r)));
        }
        out
    }

    /// Tiled windows the base grid draws separators around.
    pub fn separator_bounds(&self) -> Vec<WindowBounds> {
        self.all_windows()
            .iter()
            .filter(|w| {
                let flags = w.flags();
                !w.is_base_grid() && !flags.is_float && !flags.is_msg_grid && flags.is_shown
            })
            .map(|w| w.bounds())
            .collect()
    }

    /// Lowest bottom edge, in pixels, of any window other than the base and
    /// message grids.
    pub fn bottom_window_pos(&self) -> i32 {
        let lh = self.font.metrics().line_height;
        self.all_windows()
            .iter()
            .filter(|w| !w.is_base_grid() && !w.flags().is_msg_grid)
            .map(|w| {
                let (_, row) = w.position();
                let (_, rows) = w.size();
                let own_lh = w.metrics_for(self.font.as_ref()).line_height;
                row as i32 * lh + rows as i32 * own_lh - 1
            })
            .max()
            .unwrap_or(0)
            .max(0)
    }

    fn with_paint_env<R>(&self, f: impl FnOnce(&PaintEnv<'_>) -> R) -> R {
        let ctx = self.context();
        let highlights = self.highlights();
        let separators = self.separator_bounds();
        let base_rows = self.window(BASE_GRID).map_or(0, |w| w.size().1);
        let env = PaintEnv {
            ctx: &ctx,
            highlights: &highlights,
            font: self.font.as_ref(),
            cache: &self.cache,
            separators: &separators,
            bottom_window_pos: self.bottom_window_pos(),
            base_rows,
        };
        f(&env)
    }

    /// Repaint `rect` of `grid`.
    pub fn paint(&self, grid: GridId, rect: PixelRect) -> PaintOutcome {
        let Some(win) = self.window(grid) else {
            return PaintOutcome::Painted;
        };
        self.with_paint_env(|env| win.paint(rect, env))
    }

    /// Advance every running scroll animation. Returns whether any is still
    /// running, so the caller knows to schedule another tick.
    pub fn tick(&self, now: Instant, presenter: &dyn Presenter) -> bool {
        let animating: Vec<Arc<Window>> = self.all_windows().into_iter().filter(|w| w.is_animating()).collect();
        if animating.is_empty() {
            return false;
        }
        self.with_paint_env(|env| {
            animating.iter().fold(false, |running, win| {
                win.tick(now, env, presenter);
                running || win.is_animating()
            })
        })
    }

    pub fn touchpad_scroll(&self, grid: GridId, vertical: i32, horizontal: i32) -> Option<TouchpadStep> {
        let win = self.window(grid)?;
        let ctx = self.context();
        let metrics = win.metrics_for(self.font.as_ref());
        Some(win.touchpad_scroll(vertical, horizontal, &ctx, &metrics))
    }

    /// Give `grid` its own font, with a glyph cache of its own.
    pub fn set_grid_font(&self, grid: GridId, rasterizer: Option<Arc<dyn Rasterizer>>) {
        let Some(win) = self.lookup(grid, "grid font") else {
            return;
        };
        let cache_size = self.context.load().config.editor.cache_size;
        win.set_font(rasterizer.map(|rasterizer| WindowFont {
            rasterizer,
            cache: Arc::new(Mutex::new(new_render_cache(cache_size))),
        }));
    }

    /// Pixel origin of `win` on the composed surface.
    fn origin(&self, win: &Window, screen_height: i32) -> (f32, f32) {
        let metrics = self.font.metrics();
        let lh = metrics.line_height;
        let (col, row) = win.position();
        let mut y = row as i32 * lh;
        if win.flags().is_msg_grid {
            let (_, rows) = win.size();
            y += (screen_height - rows as i32 * lh).max(0);
        }
        (col as f32 * metrics.cell_width, y as f32)
    }

    /// Shown windows from bottom to top: the base grid, tiled windows,
    /// floats by z-index and raise order, then message grids.
    pub fn stacking_order(&self) -> Vec<Arc<Window>> {
        let windows: Vec<(Arc<Window>, u8)> = self
            .all_windows()
            .into_iter()
            .filter_map(|w| {
                let flags = w.flags();
                if !flags.is_shown {
                    return None;
                }
                let class = if w.is_base_grid() {
                    0
                } else if flags.is_msg_grid {
                    3
                } else if flags.is_float {
                    2
                } else {
                    1
                };
                Some((w, class))
            })
            .collect();

        let layers = self.layers.lock();
        let mut keyed: Vec<((u8, i64, u64), Arc<Window>)> = windows
            .into_iter()
            .map(|(w, class)| {
                let layer = layers.get(w.grid());
                ((class, layer.zindex, layer.raised), w)
            })
            .collect();
        drop(layers);
        keyed.sort_by_key(|(key, _)| *key);
        keyed.into_iter().map(|(_, w)| w).collect()
    }

    /// Composite every shown window onto one surface the size of the base
    /// grid. Floats cast a shadow when configured to.
    pub fn compose(&self) -> Result<PixelCanvas, RenderError> {
        let ctx = self.context();
        let metrics = *self.font.metrics();
        let (cols, rows) = self.window(BASE_GRID).map_or((0, 0), |w| w.size());
        let (width, height) = metrics.grid_size(cols, rows);

        let mut canvas = PixelCanvas::new(width, height, ctx.dpr)?;
        canvas.erase_all(ctx.theme.background);

        for win in self.stacking_order() {
            let Some(image) = win.image() else {
                continue;
            };
            let (x, y) = self.origin(&win, height as i32);
            if win.flags().is_float && ctx.config.editor.draw_shadow_for_float_window {
                let rect = RectF::new(
                    x,
                    y,
                    image.width() as f32 / ctx.dpr,
                    image.height() as f32 / ctx.dpr,
                );
                draw_float_shadow(&mut canvas, rect);
            }
            canvas.draw_image(x, y, &image);
        }
        Ok(canvas)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("grids", &self.grids())
            .field("highlights", &self.highlights.load().len())
            .finish_non_exhaustive()
    }
}
