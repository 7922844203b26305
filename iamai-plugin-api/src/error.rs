//! Error types for adapter and plugin authors

use thiserror::Error;

/// Errors that plugins can return from event handling
#[derive(Error, Debug)]
pub enum PluginError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The event could not be handled
    #[error("Failed to handle event '{event}': {reason}")]
    Handler { event: String, reason: String },

    /// Custom error with message
    #[error("{0}")]
    Custom(String),
}

impl PluginError {
    /// Create a custom error with a message
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a handler error for a named event
    pub fn handler(event: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Handler {
            event: event.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that adapters can return from their lifecycle methods
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Adapter failed to start
    #[error("Start failed: {0}")]
    Start(String),

    /// Adapter failed to stop cleanly
    #[error("Stop failed: {0}")]
    Stop(String),

    /// Connection to the external endpoint failed or dropped
    #[error("Connection error: {0}")]
    Connection(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Custom error with message
    #[error("{0}")]
    Custom(String),
}

impl AdapterError {
    /// Create a custom error with a message
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Create a start error
    pub fn start(message: impl Into<String>) -> Self {
        Self::Start(message.into())
    }

    /// Create a stop error
    pub fn stop(message: impl Into<String>) -> Self {
        Self::Stop(message.into())
    }
}
