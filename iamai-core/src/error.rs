//! Error types for iamai-core

use thiserror::Error;

use iamai_plugin_api::AdapterError;

use crate::config::ConfigError;
use crate::plugins::LoaderError;

/// Top-level error type for iamai-core
#[derive(Error, Debug)]
pub enum BotError {
    /// No adapter or plugin with the requested name
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// `run()` was called on a bot that already ran
    #[error("Bot is already running or has stopped")]
    AlreadyRunning,

    /// Configuration names an adapter the catalog does not provide
    #[error("Unknown adapter '{name}'")]
    UnknownAdapter { name: String },

    /// An adapter constructor failed
    #[error("Failed to create adapter '{name}': {source}")]
    AdapterInit {
        name: String,
        #[source]
        source: AdapterError,
    },

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Plugin loading failed: {0}")]
    Loader(#[from] LoaderError),
}

impl BotError {
    pub(crate) fn adapter_not_found(name: &str) -> Self {
        Self::NotFound {
            kind: "adapter",
            name: name.to_string(),
        }
    }

    pub(crate) fn plugin_not_found(name: &str) -> Self {
        Self::NotFound {
            kind: "plugin",
            name: name.to_string(),
        }
    }
}
