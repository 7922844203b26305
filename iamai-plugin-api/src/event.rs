//! Events routed from adapters to plugins.

use serde::{Deserialize, Serialize};

/// An internal occurrence dispatched to every registered plugin.
///
/// Events are created per occurrence and discarded once dispatch completes.
/// The host never inspects `handled`; it exists so plugins that clone an
/// event can record that they consumed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event name, e.g. `"message"` or `"ping"`.
    pub name: String,

    /// Set by consumers that fully handled the event.
    #[serde(default)]
    pub handled: bool,
}

impl Event {
    /// Create an unhandled event with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handled: false,
        }
    }

    /// Mark this event as handled.
    pub fn mark_handled(&mut self) {
        self.handled = true;
    }

    #[must_use]
    pub fn is_handled(&self) -> bool {
        self.handled
    }
}
