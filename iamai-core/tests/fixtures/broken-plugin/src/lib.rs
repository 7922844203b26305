//! Plugin modules for loader tests
//!
//! Each feature builds a library that breaks the loading contract in one
//! specific way; with no features it is a well-formed plugin.

#![allow(improper_ctypes_definitions)]

use iamai_plugin_api::{Event, Plugin, PluginError};

#[derive(Default)]
pub struct Broken;

impl Plugin for Broken {
    fn name(&self) -> &str {
        if cfg!(feature = "empty-name") { "" } else { "broken" }
    }

    fn handle_event(&self, _event: &Event) -> Result<(), PluginError> {
        Ok(())
    }
}

#[cfg(not(feature = "no-exports"))]
#[unsafe(no_mangle)]
pub extern "C" fn _iamai_plugin_api_version() -> u32 {
    if cfg!(feature = "wrong-version") {
        iamai_plugin_api::API_VERSION + 998
    } else {
        iamai_plugin_api::API_VERSION
    }
}

#[cfg(not(any(feature = "no-exports", feature = "no-create")))]
#[unsafe(no_mangle)]
pub extern "C" fn _iamai_plugin_create() -> *mut dyn Plugin {
    if cfg!(feature = "null-create") {
        return std::ptr::null_mut::<Broken>() as *mut dyn Plugin;
    }
    let plugin: Box<dyn Plugin> = Box::new(Broken);
    Box::into_raw(plugin)
}
