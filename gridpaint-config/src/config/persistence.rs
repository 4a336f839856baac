//! Config persistence and path resolution for `RenderConfig`.
//!
//! Covers:
//! - `load` / `load_from_path` (YAML or TOML chosen by file extension)
//! - XDG-style path helpers (`config_path`, `config_dir`)
//! - `to_yaml` for dumping the effective configuration

use super::RenderConfig;
use crate::error::ConfigError;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

impl RenderConfig {
    /// Load configuration from the default location, or fall back to defaults
    /// when no config file exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        log::info!("Config path: {:?}", config_path);

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            log::info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file.
    ///
    /// `.yaml`/`.yml` files are parsed as YAML, `.toml` files as TOML.
    /// Out-of-range values are clamped and reported as warnings.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        log::info!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path).map_err(ConfigError::from)?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut config = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&contents)?,
            "toml" => Self::from_toml_str(&contents)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string()).into()),
        };

        for warning in config.validate() {
            log::warn!("{warning}");
        }
        Ok(config)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(contents)?)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Serialize the effective configuration as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Get the configuration file path (using XDG convention)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Get the configuration directory path (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("gridpaint")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("gridpaint")
            } else {
                PathBuf::from(".")
            }
        }
    }
}
