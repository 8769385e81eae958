//! Global hotkey listener
//!
//! Captures system-wide keyboard input on a dedicated thread and forwards
//! matched hotkeys to a `HotkeySink`. Startup blocks until the capture hook
//! reports it is installed (or fails), so a missing permission surfaces as
//! an error from `start` instead of a silently dead listener.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::capture;
use super::keys::{Chord, HotkeyEvent, KeyInput, KeyMatcher};

/// How long `start` waits for a capture backend that cannot confirm success
const STARTUP_GRACE: Duration = Duration::from_millis(250);

/// Destination for hotkey events
pub trait HotkeySink: Send + 'static {
    /// Deliver an event; returns false once the receiver is gone
    fn deliver(&self, event: HotkeyEvent) -> bool;
}

impl HotkeySink for std_mpsc::Sender<HotkeyEvent> {
    fn deliver(&self, event: HotkeyEvent) -> bool {
        self.send(event).is_ok()
    }
}

/// Errors that can occur in the hotkey listener
#[derive(Debug, Clone, thiserror::Error)]
pub enum HotkeyError {
    #[error("hotkey listener is already running")]
    AlreadyRunning,

    #[error("failed to install global keyboard hook: {0}")]
    Capture(String),

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),

    #[error("hotkey listener exited during startup")]
    ListenerExited,
}

/// Global hotkey listener for the trigger chord and exit key
pub struct HotkeyListener<S> {
    sink: S,
    trigger: Chord,
    exit: Chord,
    running: Arc<AtomicBool>,
}

impl<S: HotkeySink + Clone> HotkeyListener<S> {
    /// Create a new hotkey listener
    pub fn new(sink: S, trigger: Chord, exit: Chord) -> Self {
        Self {
            sink,
            trigger,
            exit,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the hotkey listener
    ///
    /// Spawns the `hotkey-listener` thread and waits for the capture backend
    /// to come up. Runs until `stop()` is called or the program exits.
    pub fn start(&self) -> Result<(), HotkeyError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(HotkeyError::AlreadyRunning);
        }

        let sink = self.sink.clone();
        let running = Arc::clone(&self.running);
        let matcher = KeyMatcher::new(self.trigger, self.exit);
        let (ready_tx, ready_rx) = std_mpsc::channel();

        let spawned = thread::Builder::new()
            .name("hotkey-listener".to_string())
            .spawn(move || {
                info!("hotkey listener thread started");

                let (input_tx, input_rx) = std_mpsc::channel::<KeyInput>();
                let dispatch_running = Arc::clone(&running);
                let dispatch_sink = sink.clone();
                let dispatcher = thread::Builder::new()
                    .name("hotkey-dispatch".to_string())
                    .spawn(move || dispatch(input_rx, matcher, dispatch_sink, dispatch_running));

                if let Err(e) = dispatcher {
                    let _ = ready_tx.send(Err(HotkeyError::ThreadSpawn(e.to_string())));
                    running.store(false, Ordering::SeqCst);
                    return;
                }

                let result = capture::run(input_tx, Arc::clone(&running), ready_tx.clone());
                let was_running = running.swap(false, Ordering::SeqCst);

                // `start` drops its receiver once it returns; after that a
                // capture failure is reported to the sink instead
                match result {
                    Err(e) => {
                        error!(?e, "hotkey listener error");
                        if ready_tx.send(Err(e.clone())).is_err() && was_running {
                            sink.deliver(HotkeyEvent::Lost(e.to_string()));
                        }
                    }
                    Ok(()) if was_running => {
                        sink.deliver(HotkeyEvent::Lost("keyboard capture ended".to_string()));
                    }
                    Ok(()) => {}
                }

                info!("hotkey listener thread stopped");
            });

        if let Err(e) = spawned {
            self.running.store(false, Ordering::SeqCst);
            return Err(HotkeyError::ThreadSpawn(e.to_string()));
        }

        match ready_rx.recv_timeout(STARTUP_GRACE) {
            Ok(Ok(())) => {
                info!(trigger = %self.trigger, exit = %self.exit, "hotkeys registered");
                Ok(())
            }
            Err(std_mpsc::RecvTimeoutError::Timeout) => {
                debug!("capture backend gave no confirmation, assuming hook is live");
                info!(trigger = %self.trigger, exit = %self.exit, "hotkeys registered");
                Ok(())
            }
            Ok(Err(e)) => {
                self.running.store(false, Ordering::SeqCst);
                Err(e)
            }
            Err(std_mpsc::RecvTimeoutError::Disconnected) => {
                self.running.store(false, Ordering::SeqCst);
                Err(HotkeyError::ListenerExited)
            }
        }
    }

    /// Stop the hotkey listener
    ///
    /// Events captured after this point are dropped. Backends that block
    /// inside the OS hook keep their thread until the process exits.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the listener is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Match normalized inputs and forward hotkey events until the input side
/// hangs up or the sink goes away
fn dispatch<S: HotkeySink>(
    input_rx: std_mpsc::Receiver<KeyInput>,
    mut matcher: KeyMatcher,
    sink: S,
    running: Arc<AtomicBool>,
) {
    while let Ok(input) = input_rx.recv() {
        if !running.load(Ordering::SeqCst) {
            continue;
        }

        if let Some(event) = matcher.feed(input) {
            debug!(?event, modifiers = ?matcher.modifiers(), "hotkey matched");
            if !sink.deliver(event) {
                warn!("failed to send hotkey event - receiver closed?");
                break;
            }
        }
    }
}
