//! Adapter trait for long-running connectors.

use async_trait::async_trait;

use crate::error::AdapterError;

/// A long-running connector with an explicit start/stop lifecycle.
///
/// The host calls [`start`](Adapter::start) exactly once, on its own task,
/// and [`stop`](Adapter::stop) exactly once during shutdown. `start` may
/// run for the lifetime of the connection; it should return once `stop` has
/// been called. The host imposes no timeout on either call unless one is
/// configured, so a hung `stop` delays shutdown of every later adapter.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Stable name used as a lookup key.
    fn name(&self) -> &str;

    /// Connect and run.
    async fn start(&self) -> Result<(), AdapterError>;

    /// Disconnect and release resources.
    async fn stop(&self) -> Result<(), AdapterError>;
}
