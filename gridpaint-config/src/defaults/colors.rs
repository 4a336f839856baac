//! Default theme colors, used until the remote side sends its own defaults.

use crate::types::Rgba;

pub fn foreground() -> Rgba {
    Rgba::rgb(0xB2, 0xB2, 0xB2)
}

pub fn background() -> Rgba {
    Rgba::rgb(0x0D, 0x11, 0x16)
}

pub fn special() -> Rgba {
    Rgba::rgb(0xFF, 0x5F, 0x5F)
}

pub fn indent_guide_color() -> Rgba {
    Rgba::rgb(0x40, 0x44, 0x4B)
}

pub fn window_separator_color() -> Rgba {
    Rgba::rgb(0x21, 0x25, 0x2B)
}
