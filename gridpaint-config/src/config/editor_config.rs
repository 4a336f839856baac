//! `EditorConfig`: settings for editor grid surfaces.

use crate::types::FillPattern;
use serde::{Deserialize, Serialize};

/// Settings controlling how editor grids are painted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Maximum number of rasterized glyph runs kept in a glyph cache
    #[serde(default = "crate::defaults::cache_size")]
    pub cache_size: usize,

    /// Tab width used for indent guides when a window has no own tabstop
    #[serde(default = "crate::defaults::tab_stop")]
    pub tab_stop: usize,

    /// Draw indent guides in editor windows
    #[serde(default = "crate::defaults::indent_guide")]
    pub indent_guide: bool,

    /// Draw cell by cell instead of shaping same-highlight words together
    #[serde(default = "crate::defaults::disable_ligatures")]
    pub disable_ligatures: bool,

    /// Extra horizontal space between cells in pixels
    #[serde(default = "crate::defaults::letter_space")]
    pub letter_space: f32,

    /// Rasterize text and decorations through the glyph cache
    #[serde(default = "crate::defaults::cached_drawing")]
    pub cached_drawing: bool,

    /// Invert the vertical direction of wheel scrolling
    #[serde(default = "crate::defaults::reversing_scroll")]
    pub reversing_scroll: bool,

    /// Animate scroll commands
    #[serde(default = "crate::defaults::smooth_scroll")]
    pub smooth_scroll: bool,

    /// Duration of a scroll animation in milliseconds
    #[serde(default = "crate::defaults::smooth_scroll_duration_ms")]
    pub smooth_scroll_duration_ms: u64,

    /// Lines scrolled per wheel step. With 1, touchpad pixel offsets are
    /// applied to the painted content while a step accumulates.
    #[serde(default = "crate::defaults::line_to_scroll")]
    pub line_to_scroll: usize,

    /// Editor-wide opacity, 0.0 (clear) to 1.0 (opaque)
    #[serde(default = "crate::defaults::transparent")]
    pub transparent: f32,

    #[serde(default = "crate::defaults::diff_pattern")]
    pub diff_add_pattern: FillPattern,

    #[serde(default = "crate::defaults::diff_pattern")]
    pub diff_change_pattern: FillPattern,

    #[serde(default = "crate::defaults::diff_pattern")]
    pub diff_delete_pattern: FillPattern,

    /// Draw separators between tiled windows on the base grid
    #[serde(default = "crate::defaults::draw_window_separator")]
    pub draw_window_separator: bool,

    /// Add a fading gradient next to window separators
    #[serde(default = "crate::defaults::window_separator_gradient")]
    pub window_separator_gradient: bool,

    /// Draw a one-pixel border around external float windows
    #[serde(default = "crate::defaults::draw_border_for_float_window")]
    pub draw_border_for_float_window: bool,

    /// Draw a drop shadow under float windows when composing
    #[serde(default = "crate::defaults::draw_shadow_for_float_window")]
    pub draw_shadow_for_float_window: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            cache_size: crate::defaults::cache_size(),
            tab_stop: crate::defaults::tab_stop(),
            indent_guide: crate::defaults::indent_guide(),
            disable_ligatures: crate::defaults::disable_ligatures(),
            letter_space: crate::defaults::letter_space(),
            cached_drawing: crate::defaults::cached_drawing(),
            reversing_scroll: crate::defaults::reversing_scroll(),
            smooth_scroll: crate::defaults::smooth_scroll(),
            smooth_scroll_duration_ms: crate::defaults::smooth_scroll_duration_ms(),
            line_to_scroll: crate::defaults::line_to_scroll(),
            transparent: crate::defaults::transparent(),
            diff_add_pattern: crate::defaults::diff_pattern(),
            diff_change_pattern: crate::defaults::diff_pattern(),
            diff_delete_pattern: crate::defaults::diff_pattern(),
            draw_window_separator: crate::defaults::draw_window_separator(),
            window_separator_gradient: crate::defaults::window_separator_gradient(),
            draw_border_for_float_window: crate::defaults::draw_border_for_float_window(),
            draw_shadow_for_float_window: crate::defaults::draw_shadow_for_float_window(),
        }
    }
}

impl EditorConfig {
    /// Text is drawn cell by cell when ligatures are off or letters are spaced.
    pub fn cell_based_drawing(&self) -> bool {
        self.disable_ligatures || self.letter_space > 0.0
    }
}
