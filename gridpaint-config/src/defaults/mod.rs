//! Default value functions for configuration.
//!
//! Each sub-module groups related free functions used as
//! `#[serde(default = "crate::defaults::...")]` attributes on config fields.

mod colors;
mod editor;

// ── Editor surface ─────────────────────────────────────────────────────────
pub use editor::{
    cache_size, cached_drawing, diff_pattern, disable_ligatures, draw_border_for_float_window,
    draw_shadow_for_float_window, draw_window_separator, ext_tabline, indent_guide,
    letter_space, line_to_scroll, message_transparent, reversing_scroll, smooth_scroll,
    smooth_scroll_duration_ms, tab_stop, tabline_visible, transparent,
    window_separator_gradient,
};

// ── Theme colors ───────────────────────────────────────────────────────────
pub use colors::{background, foreground, indent_guide_color, special, window_separator_color};
