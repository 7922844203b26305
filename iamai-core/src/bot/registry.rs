//! Registry of active adapters and plugins

use std::sync::Arc;

use iamai_plugin_api::{Adapter, Plugin};

/// Adapters and plugins in registration order.
///
/// Names are not required to be unique; lookups return the first match.
/// The bot guards a single `Registry` with one mutex so every add, lookup
/// and dispatch sees a consistent view of both collections.
#[derive(Default)]
pub struct Registry {
    adapters: Vec<Arc<dyn Adapter>>,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_adapter(&mut self, adapter: Arc<dyn Adapter>) {
        self.adapters.push(adapter);
    }

    pub fn add_plugin(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// First adapter named `name`
    pub fn find_adapter(&self, name: &str) -> Option<Arc<dyn Adapter>> {
        self.adapters.iter().find(|a| a.name() == name).cloned()
    }

    /// First plugin named `name`
    pub fn find_plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.iter().find(|p| p.name() == name).cloned()
    }

    pub fn adapters(&self) -> &[Arc<dyn Adapter>] {
        &self.adapters
    }

    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    /// Drop every plugin, returning how many were removed
    pub fn clear_plugins(&mut self) -> usize {
        let removed = self.plugins.len();
        self.plugins.clear();
        removed
    }
}
