//! Status reporting seam
//!
//! The bot never renders anything itself. Every user-visible status or error
//! message is handed to a [`StatusSink`] as a severity, a message and a list
//! of structured fields. [`TracingSink`] forwards to `tracing`; embedders can
//! substitute their own sink (a colored console, a GUI log pane) and tests
//! use [`MemorySink`].

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Severity of a status record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

/// A single status message with structured fields
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRecord {
    pub severity: Severity,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl StatusRecord {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Attach a structured field
    #[must_use]
    pub fn with_field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }

    /// Look up a field value by key
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Receives status records from the bot
pub trait StatusSink: Send + Sync {
    fn emit(&self, record: &StatusRecord);
}

/// Renders as `message key=value ...`; a record without fields renders as
/// its bare message.
impl fmt::Display for StatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        for (key, value) in &self.fields {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

/// Target used for every event emitted by [`TracingSink`]
pub const TRACING_TARGET: &str = "iamai";

/// Forwards status records to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn emit(&self, record: &StatusRecord) {
        match record.severity {
            Severity::Debug => tracing::debug!(target: TRACING_TARGET, "{record}"),
            Severity::Info => tracing::info!(target: TRACING_TARGET, "{record}"),
            Severity::Warning => tracing::warn!(target: TRACING_TARGET, "{record}"),
            Severity::Error => tracing::error!(target: TRACING_TARGET, "{record}"),
        }
    }
}

/// Keeps every record in memory, in emission order
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<StatusRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records emitted so far
    pub fn records(&self) -> Vec<StatusRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records whose message equals `message`
    pub fn matching(&self, message: &str) -> Vec<StatusRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.message == message)
            .collect()
    }
}

impl StatusSink for MemorySink {
    fn emit(&self, record: &StatusRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}
