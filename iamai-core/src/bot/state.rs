//! Bot lifecycle state

use std::fmt;

/// Lifecycle of a [`Bot`](super::Bot)
///
/// Transitions only move forward:
/// `Initialized -> Running -> ShuttingDown -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotState {
    /// Registries populated, no adapters running
    Initialized,
    /// Adapters started, waiting for the shutdown broadcast
    Running,
    /// Stopping adapters
    ShuttingDown,
    /// `run()` has returned
    Stopped,
}

impl fmt::Display for BotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BotState::Initialized => "initialized",
            BotState::Running => "running",
            BotState::ShuttingDown => "shutting down",
            BotState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}
