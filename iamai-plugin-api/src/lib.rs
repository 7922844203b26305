//! iamai-plugin-api - Plugin API for the iamai bot host
//!
//! This crate provides the traits and types needed to extend the bot.
//! There are two extension roles:
//!
//! - [`Adapter`]: a long-running connector (a chat network, a terminal, a
//!   socket) with an explicit start/stop lifecycle.
//! - [`Plugin`]: an event handler invoked for every [`Event`] the bot
//!   dispatches.
//!
//! Plugins are usually native Rust dynamic libraries loaded from a plugin
//! directory at startup. Use [`export_plugin!`] to generate the entry points
//! the host looks up.
//!
//! # Example
//!
//! ```ignore
//! use iamai_plugin_api::{Event, Plugin, PluginError, export_plugin};
//!
//! #[derive(Default)]
//! pub struct Greeter;
//!
//! impl Plugin for Greeter {
//!     fn name(&self) -> &str {
//!         "greeter"
//!     }
//!
//!     fn handle_event(&self, event: &Event) -> Result<(), PluginError> {
//!         if event.name == "hello" {
//!             println!("hello back");
//!         }
//!         Ok(())
//!     }
//! }
//!
//! export_plugin!(Greeter);
//! ```

pub mod adapter;
pub mod error;
pub mod event;

pub use adapter::Adapter;
pub use error::{AdapterError, PluginError};
pub use event::Event;

/// Current plugin API version. Plugins must match this exactly.
/// This is checked when loading plugins to ensure compatibility.
pub const API_VERSION: u32 = 1;

/// Exported symbol returning the plugin's API version.
pub const API_VERSION_SYMBOL: &[u8] = b"_iamai_plugin_api_version";

/// Exported symbol constructing a boxed plugin instance.
pub const CREATE_SYMBOL: &[u8] = b"_iamai_plugin_create";

/// The core plugin trait - implement this to handle bot events.
///
/// The host calls plugins from whichever thread dispatches the event, so
/// implementations must be `Send + Sync` and use interior mutability for
/// any state they keep.
pub trait Plugin: Send + Sync {
    /// Stable name used as a lookup key. Must not change between calls.
    fn name(&self) -> &str;

    /// Handle a single dispatched event.
    ///
    /// Errors are reported by the host and never stop dispatch to other
    /// plugins.
    fn handle_event(&self, event: &Event) -> Result<(), PluginError>;
}

/// Export a plugin type for dynamic loading.
///
/// This macro generates the C ABI entry points that the host uses to load
/// plugins dynamically. The plugin type must implement [`Default`]. The
/// host takes ownership of the returned box and drops it when the plugin is
/// removed, before the library is unloaded.
///
/// # Usage
///
/// ```ignore
/// iamai_plugin_api::export_plugin!(MyPlugin);
/// ```
///
/// # Generated Functions
///
/// - `_iamai_plugin_create()`: Creates a new plugin instance
/// - `_iamai_plugin_api_version()`: Returns the API version
#[macro_export]
macro_rules! export_plugin {
    ($plugin_type:ty) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn _iamai_plugin_create() -> *mut dyn $crate::Plugin {
            let plugin: Box<dyn $crate::Plugin> = Box::new(<$plugin_type>::default());
            Box::into_raw(plugin)
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _iamai_plugin_api_version() -> u32 {
            $crate::API_VERSION
        }
    };
}
