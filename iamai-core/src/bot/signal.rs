//! Termination signal listener

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::status::{Severity, StatusRecord, StatusSink};

/// Cancel `shutdown` when SIGINT or SIGTERM arrives.
///
/// The signal handlers are installed before this returns, so a signal sent
/// right after `run()` reports the bot as running is not lost. The task also
/// exits quietly if `shutdown` is cancelled some other way.
pub(crate) fn spawn_listener(
    shutdown: CancellationToken,
    sink: Arc<dyn StatusSink>,
) -> JoinHandle<()> {
    let termination = Termination::install();
    tokio::spawn(async move {
        tokio::select! {
            signal = termination.wait() => {
                sink.emit(
                    &StatusRecord::new(Severity::Warning, "Received termination signal")
                        .with_field("signal", signal),
                );
                shutdown.cancel();
            }
            _ = shutdown.cancelled() => {}
        }
    })
}

#[cfg(unix)]
struct Termination {
    interrupt: Option<tokio::signal::unix::Signal>,
    terminate: Option<tokio::signal::unix::Signal>,
}

#[cfg(unix)]
impl Termination {
    fn install() -> Self {
        use tokio::signal::unix::SignalKind;
        Self {
            interrupt: listen(SignalKind::interrupt(), "SIGINT"),
            terminate: listen(SignalKind::terminate(), "SIGTERM"),
        }
    }

    async fn wait(mut self) -> &'static str {
        tokio::select! {
            name = next(self.interrupt.as_mut(), "SIGINT") => name,
            name = next(self.terminate.as_mut(), "SIGTERM") => name,
        }
    }
}

#[cfg(unix)]
fn listen(
    kind: tokio::signal::unix::SignalKind,
    name: &'static str,
) -> Option<tokio::signal::unix::Signal> {
    tokio::signal::unix::signal(kind)
        .inspect_err(|e| tracing::error!(signal = name, error = %e, "Failed to listen for signal"))
        .ok()
}

/// Resolve with `name` once `stream` delivers; never resolve without a stream.
#[cfg(unix)]
async fn next(
    stream: Option<&mut tokio::signal::unix::Signal>,
    name: &'static str,
) -> &'static str {
    if let Some(stream) = stream {
        if stream.recv().await.is_some() {
            return name;
        }
    }
    std::future::pending().await
}

#[cfg(not(unix))]
struct Termination;

#[cfg(not(unix))]
impl Termination {
    fn install() -> Self {
        Self
    }

    async fn wait(self) -> &'static str {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for interrupt signal");
                std::future::pending().await
            }
        }
    }
}
