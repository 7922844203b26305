//! Adapters compiled into the `iamai` binary

mod console;

use std::sync::Arc;

use iamai_core::{Adapter, AdapterCatalog};

pub use console::ConsoleAdapter;

/// Catalog of built-in adapters selectable from `bot.adapters`
pub fn builtin_catalog() -> AdapterCatalog {
    AdapterCatalog::new().with(ConsoleAdapter::NAME, |ctx| {
        Ok(Arc::new(ConsoleAdapter::stdin(ctx)) as Arc<dyn Adapter>)
    })
}
