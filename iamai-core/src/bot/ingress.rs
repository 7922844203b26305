//! Event ingress - how adapters hand events to the bot

use thiserror::Error;
use tokio::sync::mpsc;

use iamai_plugin_api::Event;

/// Default capacity of the event queue
pub const DEFAULT_EVENT_QUEUE: usize = 256;

/// Errors from enqueueing an event
#[derive(Error, Debug)]
pub enum EventSendError {
    /// The bot has stopped and no longer drains the queue
    #[error("bot is not accepting events (dropped '{0}')")]
    Closed(String),

    /// The queue is at capacity
    #[error("event queue is full (dropped '{0}')")]
    Full(String),
}

/// Cloneable handle for enqueueing events.
///
/// Events are dispatched by the bot's run loop in the order they were
/// enqueued.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<Event>,
}

impl EventSender {
    pub(crate) fn channel(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Enqueue an event, waiting for queue space.
    pub async fn send(&self, event: Event) -> Result<(), EventSendError> {
        self.tx
            .send(event)
            .await
            .map_err(|e| EventSendError::Closed(e.0.name))
    }

    /// Enqueue an event without waiting.
    pub fn try_send(&self, event: Event) -> Result<(), EventSendError> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(event) => EventSendError::Full(event.name),
            mpsc::error::TrySendError::Closed(event) => EventSendError::Closed(event.name),
        })
    }

    /// Whether the receiving side is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
