//! Console adapter - turns lines on stdin into events

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use iamai_core::{Adapter, AdapterContext, AdapterError, Event, EventSender};

type LineSource = Box<dyn AsyncBufRead + Send + Unpin>;

/// Reads lines and enqueues each non-empty one as an event named after
/// the trimmed line.
pub struct ConsoleAdapter {
    input: Mutex<LineSource>,
    events: EventSender,
    /// Cancelled by `stop()` or bot shutdown
    stopped: CancellationToken,
}

impl ConsoleAdapter {
    pub const NAME: &'static str = "console";

    /// Read from the process's stdin
    pub fn stdin(ctx: &AdapterContext) -> Self {
        Self::with_reader(ctx, BufReader::new(tokio::io::stdin()))
    }

    pub fn with_reader<R>(ctx: &AdapterContext, reader: R) -> Self
    where
        R: AsyncBufRead + Send + Unpin + 'static,
    {
        Self {
            input: Mutex::new(Box::new(reader)),
            events: ctx.events.clone(),
            stopped: ctx.shutdown.child_token(),
        }
    }
}

#[async_trait]
impl Adapter for ConsoleAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn start(&self) -> Result<(), AdapterError> {
        let mut input = self.input.lock().await;
        let mut lines = (&mut *input).lines();

        loop {
            let line = tokio::select! {
                _ = self.stopped.cancelled() => return Ok(()),
                line = lines.next_line() => line?,
            };

            let Some(line) = line else {
                tracing::debug!("Console input closed");
                return Ok(());
            };

            let name = line.trim();
            if name.is_empty() {
                continue;
            }

            self.events
                .send(Event::new(name))
                .await
                .map_err(|e| AdapterError::Connection(e.to_string()))?;
        }
    }

    async fn stop(&self) -> Result<(), AdapterError> {
        self.stopped.cancel();
        Ok(())
    }
}
