//! iamai-core: Core library for the iamai bot host
//!
//! This crate provides the orchestration layer of the bot:
//!
//! - **Orchestrator** - [`Bot`] owns the adapter and plugin registry, starts
//!   adapters concurrently, dispatches events and drives graceful shutdown
//! - **Module loading** - [`plugins::ModuleLoader`] and the `libloading`-based
//!   [`plugins::DylibLoader`] register plugins from a directory
//! - **Adapter catalog** - [`AdapterCatalog`] builds the adapters named in
//!   the configuration
//! - **Configuration** - [`Config`] read from a JSON file
//! - **Status reporting** - [`status::StatusSink`] decouples the bot from
//!   how messages are rendered
//!
//! # Architecture
//!
//! ```text
//!   plugin dirs ──► ModuleLoader ──► add_plugin ─┐
//!   config.adapters ──► AdapterCatalog ──► add_adapter ─┤
//!                                                   ▼
//!                                 ┌───────────── Bot ─────────────┐
//!   adapters ──EventSender──►     │ Mutex<Registry>               │
//!                                 │   handle_event ──► plugins    │
//!   SIGINT/SIGTERM ──► cancel ──► │ run: start all … stop all     │
//!                                 └───────────────────────────────┘
//! ```

pub mod bot;
pub mod config;
pub mod error;
pub mod plugins;
pub mod status;

// Re-export key types for convenience
pub use bot::{
    AdapterCatalog, AdapterContext, Bot, BotOptions, BotState, DispatchReport, EventSendError,
    EventSender, Registry,
};
pub use config::{Config, ConfigError};
pub use error::BotError;
pub use plugins::{DylibLoader, LoaderError, ModuleLoader};
pub use status::{MemorySink, Severity, StatusRecord, StatusSink, TracingSink};

pub use iamai_plugin_api::{Adapter, AdapterError, Event, Plugin, PluginError};
