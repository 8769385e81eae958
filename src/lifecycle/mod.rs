//! Process lifecycle: OS shutdown signals and the session event log
//!
//! Both run on a dedicated `lifecycle` thread with its own current-thread
//! tokio runtime, leaving the main thread to the window event loop.

mod shutdown;

use std::thread::{self, JoinHandle};

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::events::SessionEvent;

pub use shutdown::ShutdownSignal;

/// Spawn the lifecycle thread.
///
/// `on_shutdown` runs once when SIGINT/SIGTERM arrives. The thread ends when
/// that happens or when every session event sender is dropped.
pub fn spawn<F>(
    on_shutdown: F,
    events: broadcast::Receiver<SessionEvent>,
) -> std::io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name("lifecycle".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!(?e, "failed to build lifecycle runtime");
                    return;
                }
            };

            runtime.block_on(async move {
                let shutdown = ShutdownSignal::new();
                let signals = async {
                    match shutdown.wait().await {
                        Ok(()) => {
                            info!("shutdown signal received");
                            on_shutdown();
                        }
                        Err(e) => {
                            warn!(?e, "signal handlers unavailable, relying on exit key");
                            std::future::pending::<()>().await;
                        }
                    }
                };

                tokio::select! {
                    // Wait for shutdown signal
                    _ = signals => {}

                    // Log session events as they happen
                    _ = log_events(events) => {
                        debug!("session event log closed");
                    }
                }
            });
        })
}

/// Log each session event until the channel closes
async fn log_events(mut rx: broadcast::Receiver<SessionEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => info!(%event, %json, "session event"),
                Err(e) => warn!(?e, %event, "failed to encode session event"),
            },
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "session event receiver lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                break;
            }
        }
    }
}
