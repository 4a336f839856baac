//! Message, tabline and theme sections of the render configuration.

use crate::types::Rgba;
use serde::{Deserialize, Serialize};

/// Settings for the message grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageConfig {
    /// Opacity of the message grid, 0.0 to 1.0
    #[serde(default = "crate::defaults::message_transparent")]
    pub transparent: f32,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            transparent: crate::defaults::message_transparent(),
        }
    }
}

/// Tabline state that shifts window separators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablineConfig {
    #[serde(default = "crate::defaults::tabline_visible")]
    pub visible: bool,

    /// The tabline is drawn externally instead of on the base grid
    #[serde(default = "crate::defaults::ext_tabline")]
    pub ext_tabline: bool,
}

impl Default for TablineConfig {
    fn default() -> Self {
        Self {
            visible: crate::defaults::tabline_visible(),
            ext_tabline: crate::defaults::ext_tabline(),
        }
    }
}

/// Initial theme colors. `default_colors_set` from the remote side replaces
/// foreground, background and special at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default = "crate::defaults::foreground")]
    pub foreground: Rgba,

    #[serde(default = "crate::defaults::background")]
    pub background: Rgba,

    #[serde(default = "crate::defaults::special")]
    pub special: Rgba,

    #[serde(default = "crate::defaults::indent_guide_color")]
    pub indent_guide: Rgba,

    #[serde(default = "crate::defaults::window_separator_color")]
    pub window_separator: Rgba,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            foreground: crate::defaults::foreground(),
            background: crate::defaults::background(),
            special: crate::defaults::special(),
            indent_guide: crate::defaults::indent_guide_color(),
            window_separator: crate::defaults::window_separator_color(),
        }
    }
}
