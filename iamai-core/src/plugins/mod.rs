//! Plugin module loading
//!
//! - [`ModuleLoader`]: narrow trait for discovering and loading plugin modules
//! - [`DylibLoader`]: loads native dynamic libraries with `libloading`
//! - [`LoaderError`]: one variant per failure kind
//!
//! # Module Structure
//!
//! A plugin directory holds one library per plugin, `<name>.so` (or
//! `.dylib`/`.dll`), built with [`iamai_plugin_api::export_plugin!`]. The
//! loader checks `_iamai_plugin_api_version` against the host's
//! [`iamai_plugin_api::API_VERSION`] before calling `_iamai_plugin_create`.

mod error;
mod loader;

pub use error::LoaderError;
pub use loader::{DylibLoader, ModuleLoader, library_extensions};
