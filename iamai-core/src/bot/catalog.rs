//! Adapter catalog - named adapter constructors selected by configuration

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use iamai_plugin_api::{Adapter, AdapterError};

use super::ingress::EventSender;

/// What an adapter constructor gets from the bot
#[derive(Debug, Clone)]
pub struct AdapterContext {
    /// Enqueue events for dispatch to plugins
    pub events: EventSender,
    /// Cancelled when the bot begins shutting down
    pub shutdown: CancellationToken,
}

type Constructor =
    Box<dyn Fn(&AdapterContext) -> Result<Arc<dyn Adapter>, AdapterError> + Send + Sync>;

/// Adapters the host binary knows how to build, keyed by name.
///
/// `bot.adapters` in the configuration picks entries from the catalog.
#[derive(Default)]
pub struct AdapterCatalog {
    constructors: BTreeMap<String, Constructor>,
}

impl AdapterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor, replacing any earlier one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&AdapterContext) -> Result<Arc<dyn Adapter>, AdapterError> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Box::new(constructor));
    }

    /// Builder-style [`register`](Self::register)
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&AdapterContext) -> Result<Arc<dyn Adapter>, AdapterError> + Send + Sync + 'static,
    {
        self.register(name, constructor);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Build the adapter registered as `name`.
    ///
    /// Returns `None` when no constructor is registered under that name.
    pub fn build(
        &self,
        name: &str,
        ctx: &AdapterContext,
    ) -> Option<Result<Arc<dyn Adapter>, AdapterError>> {
        self.constructors.get(name).map(|constructor| constructor(ctx))
    }
}

impl fmt::Debug for AdapterCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterCatalog")
            .field("names", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}
