//! Bot - the orchestrator that owns adapters and plugins
//!
//! The bot keeps a [`Registry`] of adapters and plugins behind a single
//! mutex, starts every adapter on its own task, dispatches events to every
//! plugin in registration order, and stops every adapter once the shutdown
//! token is cancelled (by SIGINT/SIGTERM or [`Bot::shutdown`]).
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use iamai_core::{Bot, Config};
//!
//! # async fn example() -> Result<(), iamai_core::BotError> {
//! let config = Config::load(Path::new("config.json"))?;
//! let bot = Arc::new(Bot::new(config));
//! bot.load_configured_plugins()?;
//! bot.run().await?;
//! # Ok(())
//! # }
//! ```

mod catalog;
mod ingress;
mod registry;
mod signal;
mod state;

pub use catalog::{AdapterCatalog, AdapterContext};
pub use ingress::{DEFAULT_EVENT_QUEUE, EventSender, EventSendError};
pub use registry::Registry;
pub use state::BotState;

use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use iamai_plugin_api::{Adapter, Event, Plugin};

use crate::config::Config;
use crate::error::BotError;
use crate::plugins::{DylibLoader, ModuleLoader};
use crate::status::{Severity, StatusRecord, StatusSink, TracingSink};

/// Runtime knobs that are not part of the configuration file
#[derive(Debug, Clone)]
pub struct BotOptions {
    /// Install the SIGINT/SIGTERM listener in `run()`
    pub listen_for_signals: bool,
    /// Give up on an adapter's `stop()` after this long. `None` waits forever.
    pub stop_timeout: Option<Duration>,
    /// How long start tasks may keep running after every adapter was stopped
    pub drain_timeout: Duration,
    /// Render errors with `{:?}` instead of `{}`
    pub verbose_errors: bool,
    /// Capacity of the event queue behind [`EventSender`]
    pub event_queue: usize,
}

impl Default for BotOptions {
    fn default() -> Self {
        Self {
            listen_for_signals: true,
            stop_timeout: None,
            drain_timeout: Duration::from_secs(5),
            verbose_errors: false,
            event_queue: DEFAULT_EVENT_QUEUE,
        }
    }
}

/// Outcome of dispatching one event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Plugins the event was handed to
    pub attempted: usize,
    /// Names of plugins that returned an error or panicked
    pub failed: Vec<String>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The orchestrator
pub struct Bot {
    config: Config,
    options: BotOptions,
    registry: Mutex<Registry>,
    state: watch::Sender<BotState>,
    shutdown: CancellationToken,
    loader: Arc<dyn ModuleLoader>,
    sink: Arc<dyn StatusSink>,
    events: EventSender,
    events_rx: Mutex<Option<mpsc::Receiver<Event>>>,
}

impl Bot {
    /// Create a bot that loads native plugin libraries and logs via `tracing`
    pub fn new(config: Config) -> Self {
        let options = BotOptions {
            verbose_errors: config.log.verbose_exception,
            ..BotOptions::default()
        };
        Self::with_options(config, options)
    }

    pub fn with_options(config: Config, options: BotOptions) -> Self {
        let (events, events_rx) = EventSender::channel(options.event_queue);
        let (state, _) = watch::channel(BotState::Initialized);
        Self {
            config,
            options,
            registry: Mutex::new(Registry::new()),
            state,
            shutdown: CancellationToken::new(),
            loader: Arc::new(DylibLoader::new()),
            sink: Arc::new(TracingSink),
            events,
            events_rx: Mutex::new(Some(events_rx)),
        }
    }

    /// Replace the module loader
    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Replace the status sink
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn options(&self) -> &BotOptions {
        &self.options
    }

    // ─── Registry ─────────────────────────────────────────────────────

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // Plugin panics are caught inside the critical section, so a
        // poisoned lock still guards a consistent registry.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_adapter(&self, adapter: Arc<dyn Adapter>) {
        self.registry().add_adapter(adapter);
    }

    pub fn add_plugin(&self, plugin: Arc<dyn Plugin>) {
        self.registry().add_plugin(plugin);
    }

    /// First adapter registered under `name`
    pub fn get_adapter(&self, name: &str) -> Result<Arc<dyn Adapter>, BotError> {
        self.registry()
            .find_adapter(name)
            .ok_or_else(|| BotError::adapter_not_found(name))
    }

    /// First plugin registered under `name`
    pub fn get_plugin(&self, name: &str) -> Result<Arc<dyn Plugin>, BotError> {
        self.registry()
            .find_plugin(name)
            .ok_or_else(|| BotError::plugin_not_found(name))
    }

    pub fn adapter_count(&self) -> usize {
        self.registry().adapters().len()
    }

    pub fn plugin_count(&self) -> usize {
        self.registry().plugins().len()
    }

    pub fn adapter_names(&self) -> Vec<String> {
        self.registry()
            .adapters()
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    pub fn plugin_names(&self) -> Vec<String> {
        self.registry()
            .plugins()
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    // ─── Dispatch ─────────────────────────────────────────────────────

    /// Dispatch an event to every plugin in registration order.
    ///
    /// The registry lock is held for the whole dispatch, so a plugin that
    /// blocks also blocks `add_plugin`/`add_adapter` and lookups. Plugin
    /// errors and panics are reported and dispatch moves on to the next
    /// plugin; nothing is propagated to the caller.
    pub fn handle_event(&self, event: Event) -> DispatchReport {
        let registry = self.registry();
        let mut report = DispatchReport::default();

        for plugin in registry.plugins() {
            report.attempted += 1;

            let result =
                std::panic::catch_unwind(AssertUnwindSafe(|| plugin.handle_event(&event)));

            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.emit(
                        StatusRecord::new(Severity::Error, "Error handling event with plugin")
                            .with_field("plugin", plugin.name())
                            .with_field("event", &event.name)
                            .with_field("error", describe_error(&e, self.options.verbose_errors)),
                    );
                    report.failed.push(plugin.name().to_string());
                }
                Err(_) => {
                    self.emit(
                        StatusRecord::new(Severity::Error, "Plugin panicked while handling event")
                            .with_field("plugin", plugin.name())
                            .with_field("event", &event.name),
                    );
                    report.failed.push(plugin.name().to_string());
                }
            }
        }

        report
    }

    /// Handle for enqueueing events; the run loop dispatches them.
    pub fn event_sender(&self) -> EventSender {
        self.events.clone()
    }

    // ─── Loading ──────────────────────────────────────────────────────

    /// Load every plugin module in `dir` and register it.
    ///
    /// Stops at the first module that fails. Plugins registered before the
    /// failure stay registered. When `bot.plugins` is non-empty, modules
    /// whose name is not listed are skipped.
    pub fn load_plugins_from_dir(&self, dir: &Path) -> Result<usize, BotError> {
        let mut registered = 0;

        for path in self.loader.discover(dir)? {
            let plugin = self.loader.load(&path)?;
            let name = plugin.name().to_string();

            if !self.config.plugin_selected(&name) {
                tracing::debug!(
                    plugin = %name,
                    path = %path.display(),
                    "Plugin not selected, skipping"
                );
                continue;
            }

            self.emit(
                StatusRecord::new(Severity::Info, "Plugin loaded")
                    .with_field("plugin", &name)
                    .with_field("path", path.display()),
            );
            self.add_plugin(plugin);
            registered += 1;
        }

        Ok(registered)
    }

    /// Load plugins from every directory in `bot.plugin_dirs`, in order.
    pub fn load_configured_plugins(&self) -> Result<usize, BotError> {
        let mut registered = 0;
        for dir in &self.config.bot.plugin_dirs {
            registered += self.load_plugins_from_dir(dir)?;
        }
        Ok(registered)
    }

    /// Drop every plugin and load them again from the configured directories.
    ///
    /// Events dispatched between the clear and the reload see no plugins.
    pub fn reload_plugins(&self) -> Result<usize, BotError> {
        let removed = self.registry().clear_plugins();
        tracing::debug!(removed, "Plugin registry cleared");

        let registered = self.load_configured_plugins()?;
        self.emit(
            StatusRecord::new(Severity::Info, "Plugins reloaded")
                .with_field("removed", removed)
                .with_field("loaded", registered),
        );
        Ok(registered)
    }

    /// Build and register every adapter named in `bot.adapters`.
    pub fn install_adapters(&self, catalog: &AdapterCatalog) -> Result<usize, BotError> {
        let ctx = AdapterContext {
            events: self.event_sender(),
            shutdown: self.shutdown.clone(),
        };

        for name in &self.config.bot.adapters {
            let adapter = catalog
                .build(name, &ctx)
                .ok_or_else(|| BotError::UnknownAdapter { name: name.clone() })?
                .map_err(|source| BotError::AdapterInit {
                    name: name.clone(),
                    source,
                })?;
            self.add_adapter(adapter);
        }

        Ok(self.config.bot.adapters.len())
    }

    // ─── Lifecycle ────────────────────────────────────────────────────

    pub fn state(&self) -> BotState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions
    pub fn subscribe_state(&self) -> watch::Receiver<BotState> {
        self.state.subscribe()
    }

    /// Token cancelled when shutdown begins
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Begin graceful shutdown. Safe to call any number of times.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Run until the shutdown token is cancelled, then stop every adapter.
    ///
    /// Can only be called once; later calls return [`BotError::AlreadyRunning`].
    pub async fn run(&self) -> Result<(), BotError> {
        let mut entered = false;
        self.state.send_if_modified(|state| {
            if *state == BotState::Initialized {
                *state = BotState::Running;
                entered = true;
            }
            entered
        });
        let events_rx = self
            .events_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let (true, Some(mut events_rx)) = (entered, events_rx) else {
            return Err(BotError::AlreadyRunning);
        };

        let listener = self
            .options
            .listen_for_signals
            .then(|| signal::spawn_listener(self.shutdown.clone(), self.sink.clone()));

        self.show_state();

        let adapters: Vec<Arc<dyn Adapter>> = self.registry().adapters().to_vec();
        let starts: Vec<(String, JoinHandle<()>)> = adapters
            .iter()
            .map(|adapter| (adapter.name().to_string(), self.spawn_start(adapter.clone())))
            .collect();

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                Some(event) = events_rx.recv() => {
                    self.handle_event(event);
                }
            }
        }

        self.state.send_replace(BotState::ShuttingDown);
        self.emit(StatusRecord::new(Severity::Warning, "Exiting..."));
        events_rx.close();

        for adapter in &adapters {
            self.stop_adapter(adapter.as_ref()).await;
        }

        self.drain_starts(starts).await;

        if let Some(listener) = listener {
            listener.abort();
        }

        self.state.send_replace(BotState::Stopped);
        self.emit(StatusRecord::new(Severity::Info, "Bot stopped"));
        Ok(())
    }

    fn show_state(&self) {
        let (adapters, plugins) = {
            let registry = self.registry();
            (registry.adapters().len(), registry.plugins().len())
        };
        self.emit(
            StatusRecord::new(Severity::Info, "Bot is running")
                .with_field("log_level", &self.config.log.level)
                .with_field("adapters", adapters)
                .with_field("plugins", plugins),
        );
    }

    fn spawn_start(&self, adapter: Arc<dyn Adapter>) -> JoinHandle<()> {
        let sink = self.sink.clone();
        let verbose = self.options.verbose_errors;
        tokio::spawn(async move {
            if let Err(e) = adapter.start().await {
                sink.emit(
                    &StatusRecord::new(Severity::Error, "Error starting adapter")
                        .with_field("adapter", adapter.name())
                        .with_field("error", describe_error(&e, verbose)),
                );
            }
        })
    }

    async fn stop_adapter(&self, adapter: &dyn Adapter) {
        let verbose = self.options.verbose_errors;
        let result = match self.options.stop_timeout {
            Some(limit) => match tokio::time::timeout(limit, adapter.stop()).await {
                Ok(result) => result.map_err(|e| describe_error(&e, verbose)),
                Err(_) => Err(format!("stop timed out after {limit:?}")),
            },
            None => adapter.stop().await.map_err(|e| describe_error(&e, verbose)),
        };

        match result {
            Ok(()) => tracing::debug!(adapter = %adapter.name(), "Adapter stopped"),
            Err(error) => self.emit(
                StatusRecord::new(Severity::Error, "Error stopping adapter")
                    .with_field("adapter", adapter.name())
                    .with_field("error", error),
            ),
        }
    }

    /// Wait for start tasks to return, then abort the stragglers.
    async fn drain_starts(&self, starts: Vec<(String, JoinHandle<()>)>) {
        let deadline = tokio::time::Instant::now() + self.options.drain_timeout;

        for (name, mut handle) in starts {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.is_panic() => self.emit(
                    StatusRecord::new(Severity::Error, "Adapter panicked while starting")
                        .with_field("adapter", &name),
                ),
                Ok(Err(_)) => {}
                Err(_) => {
                    self.emit(
                        StatusRecord::new(
                            Severity::Warning,
                            "Adapter still running after stop, aborting",
                        )
                        .with_field("adapter", &name),
                    );
                    handle.abort();
                }
            }
        }
    }

    fn emit(&self, record: StatusRecord) {
        self.sink.emit(&record);
    }
}

fn describe_error<E: std::error::Error>(error: &E, verbose: bool) -> String {
    if verbose {
        format!("{error:?}")
    } else {
        error.to_string()
    }
}
