//! ModuleLoader - discovers and loads plugin modules from a directory

use libloading::Library;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use iamai_plugin_api::{API_VERSION, API_VERSION_SYMBOL, CREATE_SYMBOL, Event, Plugin, PluginError};

use super::error::LoaderError;

/// Discovers plugin modules and turns them into plugin instances.
///
/// The bot only talks to this trait, so other loading strategies (a static
/// table of built-in plugins, a subprocess bridge) can replace
/// [`DylibLoader`] without touching the orchestrator.
pub trait ModuleLoader: Send + Sync {
    /// List candidate module files in `dir`, in load order.
    fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, LoaderError>;

    /// Load one module and return the plugin it exports.
    fn load(&self, path: &Path) -> Result<Arc<dyn Plugin>, LoaderError>;
}

/// Library file extensions recognised on this platform
pub fn library_extensions() -> &'static [&'static str] {
    if cfg!(target_os = "macos") {
        &["dylib", "so"]
    } else if cfg!(target_os = "windows") {
        &["dll"]
    } else {
        &["so"]
    }
}

/// A plugin instance together with the library that provides its code.
///
/// Field order matters: `instance` must drop before `_library` unloads.
struct LoadedPlugin {
    instance: Box<dyn Plugin>,
    _library: Library,
}

impl Plugin for LoadedPlugin {
    fn name(&self) -> &str {
        self.instance.name()
    }

    fn handle_event(&self, event: &Event) -> Result<(), PluginError> {
        self.instance.handle_event(event)
    }
}

/// Loads native plugin libraries built with `export_plugin!`
#[derive(Debug, Default, Clone, Copy)]
pub struct DylibLoader;

impl DylibLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleLoader for DylibLoader {
    fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, LoaderError> {
        if !dir.is_dir() {
            return Err(LoaderError::PluginDirNotFound {
                path: dir.to_path_buf(),
            });
        }

        let io_err = |source| LoaderError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let extensions = library_extensions();
        let mut found = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext));
            if matches && path.is_file() {
                found.push(path);
            }
        }

        found.sort();
        Ok(found)
    }

    fn load(&self, path: &Path) -> Result<Arc<dyn Plugin>, LoaderError> {
        // SAFETY: plugin directories are operator-configured; modules are
        // expected to be built against this API with `export_plugin!`.
        let library = unsafe { Library::new(path) }.map_err(|source| LoaderError::LibraryLoad {
            path: path.to_path_buf(),
            source,
        })?;

        let missing = |symbol: &[u8]| LoaderError::MissingSymbol {
            path: path.to_path_buf(),
            symbol: String::from_utf8_lossy(symbol).into_owned(),
        };

        // SAFETY: the symbol is generated by `export_plugin!` with this signature.
        let api_version_fn: libloading::Symbol<extern "C" fn() -> u32> =
            unsafe { library.get(API_VERSION_SYMBOL) }.map_err(|_| missing(API_VERSION_SYMBOL))?;

        let found = api_version_fn();
        if found != API_VERSION {
            return Err(LoaderError::ApiVersionMismatch {
                path: path.to_path_buf(),
                expected: API_VERSION,
                found,
            });
        }

        // SAFETY: as above; the version check guarantees the vtable layout
        // matches the host's `Plugin` trait.
        let create_fn: libloading::Symbol<extern "C" fn() -> *mut dyn Plugin> =
            unsafe { library.get(CREATE_SYMBOL) }.map_err(|_| missing(CREATE_SYMBOL))?;

        let raw = create_fn();
        if raw.is_null() {
            return Err(LoaderError::InvalidModule {
                path: path.to_path_buf(),
                reason: "create function returned null".to_string(),
            });
        }
        // SAFETY: non-null pointer produced by `Box::into_raw` in the module.
        let instance = unsafe { Box::from_raw(raw) };

        if instance.name().is_empty() {
            return Err(LoaderError::InvalidModule {
                path: path.to_path_buf(),
                reason: "plugin name is empty".to_string(),
            });
        }

        tracing::debug!(plugin = %instance.name(), path = %path.display(), "Plugin module loaded");

        Ok(Arc::new(LoadedPlugin {
            instance,
            _library: library,
        }))
    }
}
