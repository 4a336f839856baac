//! Default values for editor-surface rendering settings.

use crate::types::FillPattern;

pub fn cache_size() -> usize {
    400
}

pub fn tab_stop() -> usize {
    8
}

pub fn indent_guide() -> bool {
    false
}

pub fn disable_ligatures() -> bool {
    false
}

pub fn letter_space() -> f32 {
    0.0
}

pub fn cached_drawing() -> bool {
    true
}

pub fn reversing_scroll() -> bool {
    false
}

pub fn smooth_scroll() -> bool {
    false
}

pub fn smooth_scroll_duration_ms() -> u64 {
    220
}

pub fn line_to_scroll() -> usize {
    1
}

pub fn transparent() -> f32 {
    1.0 // Fully opaque
}

pub fn message_transparent() -> f32 {
    1.0
}

pub fn diff_pattern() -> FillPattern {
    FillPattern::Solid
}

pub fn draw_window_separator() -> bool {
    false
}

pub fn window_separator_gradient() -> bool {
    false
}

pub fn draw_border_for_float_window() -> bool {
    false
}

pub fn draw_shadow_for_float_window() -> bool {
    false
}

pub fn tabline_visible() -> bool {
    true
}

pub fn ext_tabline() -> bool {
    false
}
