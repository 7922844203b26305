//! Bot configuration loaded from a JSON file

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Errors from loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No path was given
    #[error("config file not specified")]
    NotSpecified,

    /// The file could not be opened or read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for this schema
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level configuration
///
/// Read once at startup and immutable thereafter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotSection,

    #[serde(default)]
    pub log: LogSection,
}

/// Which adapters and plugins the bot runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotSection {
    /// Plugin names to register. Empty means every plugin found.
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Directories scanned for plugin modules, in order
    #[serde(default)]
    pub plugin_dirs: Vec<PathBuf>,

    /// Adapter names to instantiate from the adapter catalog, in order
    #[serde(default)]
    pub adapters: Vec<String>,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSection {
    /// One of `debug`, `info`, `warning`, `error`
    #[serde(default = "default_level")]
    pub level: String,

    /// Render errors with their full debug representation
    #[serde(default)]
    pub verbose_exception: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: default_level(),
            verbose_exception: false,
        }
    }
}

impl LogSection {
    /// Translate the configured level into a `tracing` filter directive.
    ///
    /// Unknown levels fall back to `info`.
    pub fn filter_directive(&self) -> &'static str {
        match self.level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "warn" | "warning" => "warn",
            "error" => "error",
            _ => "info",
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::NotSpecified);
        }

        tracing::info!(path = %path.display(), "Loading config file");

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Whether a plugin with this name should be registered
    pub fn plugin_selected(&self, name: &str) -> bool {
        self.bot.plugins.is_empty() || self.bot.plugins.iter().any(|p| p == name)
    }
}
