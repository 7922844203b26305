//! Echo Plugin - A simple example plugin for iamai
//!
//! This plugin demonstrates:
//! - Basic plugin structure with the `export_plugin!` macro
//! - Implementing the `Plugin` trait
//! - Keeping state across events with interior mutability
//! - Returning an error the host reports without stopping dispatch
//!
//! ## Building
//!
//! ```bash
//! cargo build --release
//! ```
//!
//! ## Installing
//!
//! ```bash
//! mkdir -p ./plugins
//! cp target/release/libecho_plugin.so ./plugins/echo.so
//! iamai plugins check ./plugins/echo.so
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use iamai_plugin_api::{Event, Plugin, PluginError, export_plugin};

/// Prints every event it sees and counts them.
#[derive(Default)]
pub struct EchoPlugin {
    seen: AtomicU64,
}

impl Plugin for EchoPlugin {
    fn name(&self) -> &str {
        "echo"
    }

    fn handle_event(&self, event: &Event) -> Result<(), PluginError> {
        let count = self.seen.fetch_add(1, Ordering::Relaxed) + 1;

        if event.name == "fail" {
            return Err(PluginError::handler(&event.name, "asked to fail"));
        }

        println!("[echo #{count}] {}", event.name);
        Ok(())
    }
}

export_plugin!(EchoPlugin);
