//! Configuration management for Mundane applications.
//!
//! An application may ship an optional TOML file that overrides its
//! presentation defaults and the initial logging setup. Command-line flags
//! still win over anything set here.

use crate::error::{MundaneError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Help presentation settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Log manager settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Help presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Replaces the top-level description.
    pub description: Option<String>,

    /// Text shown after the top-level help.
    pub epilog: Option<String>,

    /// Help width in columns (overrides terminal detection).
    pub width: Option<usize>,
}

/// Log manager settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LogConfig {
    /// Initial level name, e.g. "INFO".
    pub level: Option<String>,

    /// Directory for log files.
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Returns the default configuration file path for `app`.
    pub fn default_path(app: &str) -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(app)
            .join("config.toml")
    }

    /// Loads configuration from `path`. A missing file yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| MundaneError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            MundaneError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}
