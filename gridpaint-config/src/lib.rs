//! Configuration system for the gridpaint grid renderer.
//!
//! This crate provides configuration loading and default values for the
//! renderer. It includes:
//!
//! - The read-only `RenderConfig` consumed by the rendering core
//! - Theme colors and the `Rgba` color type shared by every crate
//! - Diff fill patterns and log levels
//! - YAML/TOML persistence with per-field serde defaults

pub mod config;
pub mod defaults;
pub mod error;
mod types;

// Re-export main types for convenience
pub use config::{EditorConfig, MessageConfig, RenderConfig, TablineConfig, ThemeConfig};
pub use error::ConfigError;
pub use types::{FillPattern, LogLevel, Rgba};
