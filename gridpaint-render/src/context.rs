//! The render context handed to every painting and analysis call.
//!
//! It replaces process-wide mutable theme and option state: the session
//! owns one, swaps it wholesale when options change, and painting reads a
//! consistent copy for the whole pass.

use gridpaint_config::{RenderConfig, Rgba};
use std::sync::Arc;

/// Theme defaults used when a highlight leaves a color unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub foreground: Rgba,
    pub background: Rgba,
    pub special: Rgba,
    pub indent_guide: Rgba,
    pub window_separator: Rgba,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

impl Theme {
    pub fn from_config(config: &RenderConfig) -> Self {
        let t = &config.theme;
        Self {
            foreground: t.foreground,
            background: t.background,
            special: t.special,
            indent_guide: t.indent_guide,
            window_separator: t.window_separator,
        }
    }
}

/// Cursor location, which feeds current-block detection of indent guides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorPos {
    pub grid: u64,
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone)]
pub struct RenderContext {
    pub theme: Theme,
    pub config: Arc<RenderConfig>,
    pub cursor: CursorPos,
    /// A key is held down and repeating; snapshots are skipped meanwhile.
    pub key_auto_repeating: bool,
    /// Popup menu blend in percent.
    pub pumblend: u8,
    pub showtabline: i32,
    pub tab_count: usize,
    /// Global `tabstop`, used when a window has none of its own.
    pub tabstop: usize,
    /// Device pixels per logical pixel.
    pub dpr: f32,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(Arc::new(RenderConfig::default()))
    }
}

impl RenderContext {
    pub fn new(config: Arc<RenderConfig>) -> Self {
        Self {
            theme: Theme::from_config(&config),
            tabstop: config.editor.tab_stop,
            config,
            cursor: CursorPos::default(),
            key_auto_repeating: false,
            pumblend: 0,
            showtabline: 1,
            tab_count: 1,
            dpr: 1.0,
        }
    }

    pub fn with_dpr(mut self, dpr: f32) -> Self {
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        self
    }
}
