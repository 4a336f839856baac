//! Auxiliary elements drawn on top of the grid content.
//!
//! Each overlay is split into a pure analysis step that reads grid or
//! layout state and a draw step that paints the result onto a canvas.

pub mod float_border;
pub mod indent_guide;
pub mod separator;

pub use float_border::{draw_float_border, draw_float_shadow, draw_msg_separator};
pub use indent_guide::{IndentMark, analyze_indent_guides, draw_indent_guides};
pub use separator::{SeparatorLayout, SeparatorShape, WindowBounds, draw_separators, separator_shapes};
