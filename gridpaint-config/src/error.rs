//! Typed error variants for the gridpaint-config crate.
//!
//! Provides structured error types for config I/O and parsing.
//! Loading still returns `anyhow::Result`; callers who care about the failure
//! mode can downcast to `ConfigError`.

use std::fmt;

/// Errors that can occur when loading configuration.
///
/// Out-of-range values are not errors: `RenderConfig::validate` clamps them
/// and reports warnings.
///
/// # Example
///
/// ```rust,no_run
/// use gridpaint_config::ConfigError;
///
/// fn check_load_err(e: &anyhow::Error) {
///     if let Some(cfg_err) = e.downcast_ref::<ConfigError>() {
///         match cfg_err {
///             ConfigError::Io(io) => eprintln!("I/O error: {io}"),
///             ConfigError::Parse(p) => eprintln!("Parse error: {p}"),
///             ConfigError::UnsupportedFormat(ext) => eprintln!("Unsupported: {ext}"),
///         }
///     }
/// }
/// ```
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the config file.
    Io(std::io::Error),

    /// The config file could not be parsed as YAML or TOML.
    ///
    /// The inner string carries the parser's message.
    Parse(String),

    /// The config file extension is neither YAML nor TOML.
    UnsupportedFormat(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error reading config: {e}"),
            ConfigError::Parse(msg) => write!(f, "Parse error in config: {msg}"),
            ConfigError::UnsupportedFormat(ext) => {
                write!(f, "Unsupported config format '{ext}' (expected yaml, yml or toml)")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(_) | ConfigError::UnsupportedFormat(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml_ng::Error> for ConfigError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}
