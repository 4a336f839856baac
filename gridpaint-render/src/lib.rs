//! Software rendering core for remotely driven character grids.
//!
//! This crate provides:
//!
//! - `GridBuffer`: the per-window cell matrix with trailing-content lengths
//!   and a double-buffered dirty mask
//! - `DamageTracker`: bounding-box damage accumulation and per-row merging
//!   into repaint rectangles
//! - `GlyphCache`: a generic LRU cache with an eviction callback, used for
//!   rasterized text runs and decoration overlays
//! - `ScrollAnimator` and `TouchpadScroll`: animated and pixel-precise scroll
//!   offsets
//! - Overlay analyzers for indent guides, window separators and float borders
//! - `Window`: ties the above together behind the content, damage and paint
//!   locks and paints into a `PixelCanvas`

pub mod canvas;
pub mod cell;
pub mod context;
pub mod damage;
pub mod error;
pub mod geometry;
pub mod glyph_cache;
pub mod grid;
pub mod highlight;
pub mod overlay;
pub mod renderer;
pub mod scroll_animator;
pub mod window;

// Re-export main public types
pub use canvas::{GradientAxis, PixelCanvas};
pub use cell::{Cell, CellRun};
pub use context::{CursorPos, RenderContext, Theme};
pub use damage::{DamageTracker, FlushOptions};
pub use error::RenderError;
pub use geometry::{CellRect, PixelRect, RectF};
pub use glyph_cache::{GlyphBitmap, GlyphCache, GlyphKey, RenderCache, new_render_cache};
pub use grid::{GridBuffer, LineUpdate, RefreshMode, ScrollRegion, UpdateEnv};
pub use highlight::{DiffKind, Highlight, HighlightTable};
pub use scroll_animator::{ScrollAnimator, ScrollFrame, TouchpadScroll, TouchpadStep};
pub use overlay::{IndentMark, SeparatorLayout, WindowBounds};
pub use renderer::{Renderer, SurfaceStyle};
pub use window::{BASE_GRID, GridId, PaintEnv, PaintOutcome, Presenter, Window, WindowFlags, WindowFont};

// Re-export shared types from dependencies for convenience
pub use gridpaint_config::{FillPattern, Rgba};
pub use gridpaint_fonts::{FontMetrics, Rasterizer};
