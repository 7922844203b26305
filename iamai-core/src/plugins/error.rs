//! Module loader error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering or loading plugin modules
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Plugin directory not found
    #[error("Plugin directory not found: {path}")]
    PluginDirNotFound { path: PathBuf },

    /// Directory could not be read
    #[error("Failed to read plugin directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to load dynamic library
    #[error("Failed to load plugin library {path}: {source}")]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// Library does not export a required entry point
    #[error("Plugin library {path} does not export symbol '{symbol}'")]
    MissingSymbol { path: PathBuf, symbol: String },

    /// API version mismatch between host and plugin
    #[error("API version mismatch in {path}: host expects {expected}, plugin has {found}")]
    ApiVersionMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    /// Entry points exist but did not produce a usable plugin
    #[error("Unexpected plugin from module {path}: {reason}")]
    InvalidModule { path: PathBuf, reason: String },
}

impl LoaderError {
    /// Path of the directory or file that failed
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoaderError::PluginDirNotFound { path }
            | LoaderError::Io { path, .. }
            | LoaderError::LibraryLoad { path, .. }
            | LoaderError::MissingSymbol { path, .. }
            | LoaderError::ApiVersionMismatch { path, .. }
            | LoaderError::InvalidModule { path, .. } => path,
        }
    }
}
