//! Render configuration consumed read-only by the rendering core.
//!
//! The struct is split into sections mirroring the YAML layout:
//!
//! ```yaml
//! editor:
//!   cache_size: 400
//!   indent_guide: true
//!   diff_change_pattern: forward_diagonal
//! message:
//!   transparent: 0.9
//! tabline:
//!   visible: true
//! theme:
//!   foreground: { r: 178, g: 178, b: 178 }
//! log_level: info
//! ```

mod editor_config;
mod persistence;
mod surfaces;
mod validation;

pub use editor_config::EditorConfig;
pub use surfaces::{MessageConfig, TablineConfig, ThemeConfig};

use crate::types::LogLevel;
use serde::{Deserialize, Serialize};

/// Top-level configuration for a rendering session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub editor: EditorConfig,

    #[serde(default)]
    pub message: MessageConfig,

    #[serde(default)]
    pub tabline: TablineConfig,

    #[serde(default)]
    pub theme: ThemeConfig,

    /// Log verbosity; `RUST_LOG` and `--log-level` take precedence
    #[serde(default)]
    pub log_level: LogLevel,
}
