//! Core state machine implementation
//!
//! Handles transitions between Idle and Running based on the trigger
//! chord, window close requests and exit requests.

use std::time::Instant;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::events::SessionEvent;

/// Whether an overlay session is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No overlay, waiting for the trigger chord
    #[default]
    Idle,
    /// Overlay open and animating
    Running,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Running => write!(f, "Running"),
        }
    }
}

/// Inputs that drive the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Trigger chord pressed
    Trigger,
    /// Overlay window asked to close
    CloseRequested,
    /// Exit key pressed
    ExitKey,
    /// OS shutdown signal
    Shutdown,
}

/// What the caller must do in response to an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Open the overlay and start drawing frames
    StartSession,
    /// Close the overlay and stop drawing
    EndSession,
    /// Leave the event loop and end the process
    Terminate,
    /// Nothing to do
    Ignore,
}

/// The state machine that manages overlay sessions
pub struct SessionMachine {
    phase: Phase,
    /// Sessions started so far
    sessions: u64,
    /// Frames drawn in the current session
    frames: u64,
    /// Time when the current session was started
    started_at: Option<Instant>,
    terminated: bool,
    /// Channel for emitting session events
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionMachine {
    /// Create a new state machine
    pub fn new(event_tx: broadcast::Sender<SessionEvent>) -> Self {
        Self {
            phase: Phase::Idle,
            sessions: 0,
            frames: 0,
            started_at: None,
            terminated: false,
            event_tx,
        }
    }

    /// Get the current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of sessions started so far
    pub fn sessions(&self) -> u64 {
        self.sessions
    }

    /// Count a frame drawn in the current session
    pub fn record_frame(&mut self) {
        if self.phase == Phase::Running {
            self.frames += 1;
        }
    }

    /// Apply an input and return the action the caller must take
    pub fn handle(&mut self, input: Input) -> Action {
        if self.terminated {
            return Action::Ignore;
        }

        let action = match (self.phase, input) {
            (_, Input::ExitKey | Input::Shutdown) => Action::Terminate,
            (Phase::Idle, Input::Trigger) => Action::StartSession,
            (Phase::Running, Input::CloseRequested) => Action::EndSession,
            (Phase::Running, Input::Trigger) | (Phase::Idle, Input::CloseRequested) => {
                Action::Ignore
            }
        };

        match action {
            Action::StartSession => self.start_session(),
            Action::EndSession => self.end_session(),
            Action::Terminate => self.terminate(input),
            Action::Ignore => debug!(phase = %self.phase, ?input, "input ignored"),
        }

        action
    }

    fn start_session(&mut self) {
        self.sessions += 1;
        self.frames = 0;
        self.started_at = Some(Instant::now());
        self.transition_to(Phase::Running);
        self.emit(SessionEvent::SessionStarted {
            session: self.sessions,
        });
    }

    fn end_session(&mut self) {
        let duration_ms = self
            .started_at
            .take()
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        self.transition_to(Phase::Idle);
        self.emit(SessionEvent::SessionEnded {
            session: self.sessions,
            frames: self.frames,
            duration_ms,
        });
    }

    fn terminate(&mut self, input: Input) {
        let during_session = self.phase == Phase::Running;
        if during_session {
            self.end_session();
        }
        self.terminated = true;
        info!(?input, during_session, "exit requested");
        self.emit(SessionEvent::ExitRequested { during_session });
    }

    /// Perform a phase transition
    fn transition_to(&mut self, new_phase: Phase) {
        info!(
            from = %self.phase,
            to = %new_phase,
            session = self.sessions,
            frames = self.frames,
            "state transition"
        );
        self.phase = new_phase;
    }

    fn emit(&self, event: SessionEvent) {
        debug!(?event, "emitting session event");
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_state_machine() -> (SessionMachine, broadcast::Receiver<SessionEvent>) {
        let (tx, rx) = broadcast::channel(16);
        (SessionMachine::new(tx), rx)
    }

    #[test]
    fn test_initial_state() {
        let (sm, _) = create_state_machine();
        assert_eq!(sm.phase(), Phase::Idle);
        assert_eq!(sm.sessions(), 0);
    }

    #[test]
    fn test_idle_to_running() {
        let (mut sm, mut rx) = create_state_machine();

        assert_eq!(sm.handle(Input::Trigger), Action::StartSession);
        assert_eq!(sm.phase(), Phase::Running);
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::SessionStarted { session: 1 }
        );
    }

    #[test]
    fn test_trigger_ignored_while_running() {
        let (mut sm, _) = create_state_machine();
        sm.handle(Input::Trigger);

        assert_eq!(sm.handle(Input::Trigger), Action::Ignore);
        assert_eq!(sm.phase(), Phase::Running);
        assert_eq!(sm.sessions(), 1);
    }

    #[test]
    fn test_close_returns_to_idle() {
        let (mut sm, mut rx) = create_state_machine();
        sm.handle(Input::Trigger);
        sm.record_frame();
        sm.record_frame();

        assert_eq!(sm.handle(Input::CloseRequested), Action::EndSession);
        assert_eq!(sm.phase(), Phase::Idle);

        let _ = rx.try_recv();
        match rx.try_recv().unwrap() {
            SessionEvent::SessionEnded {
                session, frames, ..
            } => {
                assert_eq!(session, 1);
                assert_eq!(frames, 2);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_close_ignored_while_idle() {
        let (mut sm, _) = create_state_machine();
        assert_eq!(sm.handle(Input::CloseRequested), Action::Ignore);
        assert_eq!(sm.phase(), Phase::Idle);
    }

    #[test]
    fn test_reentry_starts_new_session() {
        let (mut sm, _) = create_state_machine();
        sm.handle(Input::Trigger);
        sm.record_frame();
        sm.handle(Input::CloseRequested);

        assert_eq!(sm.handle(Input::Trigger), Action::StartSession);
        assert_eq!(sm.phase(), Phase::Running);
        assert_eq!(sm.sessions(), 2);
    }

    #[test]
    fn test_exit_key_while_idle() {
        let (mut sm, mut rx) = create_state_machine();

        assert_eq!(sm.handle(Input::ExitKey), Action::Terminate);
        assert_eq!(sm.handle(Input::Trigger), Action::Ignore);
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::ExitRequested {
                during_session: false
            }
        );
    }

    #[test]
    fn test_exit_key_interrupts_session() {
        let (mut sm, mut rx) = create_state_machine();
        sm.handle(Input::Trigger);

        assert_eq!(sm.handle(Input::ExitKey), Action::Terminate);
        assert_eq!(sm.phase(), Phase::Idle);

        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[1], SessionEvent::SessionEnded { .. }));
        assert_eq!(
            events[2],
            SessionEvent::ExitRequested {
                during_session: true
            }
        );
    }

    #[test]
    fn test_shutdown_terminates() {
        let (mut sm, _) = create_state_machine();
        assert_eq!(sm.handle(Input::Shutdown), Action::Terminate);
    }

    #[test]
    fn test_inputs_ignored_after_terminate() {
        let (mut sm, _) = create_state_machine();
        sm.handle(Input::ExitKey);

        assert_eq!(sm.handle(Input::Trigger), Action::Ignore);
        assert_eq!(sm.handle(Input::ExitKey), Action::Ignore);
        assert_eq!(sm.phase(), Phase::Idle);
    }

    #[test]
    fn test_frames_only_counted_while_running() {
        let (mut sm, mut rx) = create_state_machine();
        sm.record_frame();
        sm.handle(Input::Trigger);
        sm.record_frame();
        sm.handle(Input::CloseRequested);

        let _ = rx.try_recv();
        assert!(matches!(
            rx.try_recv().unwrap(),
            SessionEvent::SessionEnded { frames: 1, .. }
        ));
    }
}
