//! Shared configuration value types.

mod color;
mod log_level;
mod pattern;

pub use color::Rgba;
pub use log_level::LogLevel;
pub use pattern::FillPattern;
