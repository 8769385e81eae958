//! Events module for session transitions
//!
//! Structured records of session start, end and exit requests, emitted by
//! the state machine and logged by the lifecycle thread.

use serde::{Deserialize, Serialize};

/// Events emitted by the state machine during transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Trigger chord opened the overlay
    SessionStarted {
        /// 1-based session counter for this process
        session: u64,
    },

    /// Overlay window was closed
    SessionEnded {
        session: u64,
        /// Frames drawn during the session
        frames: u64,
        /// Duration in milliseconds that the session was running
        duration_ms: u64,
    },

    /// Exit key or shutdown signal received
    ExitRequested {
        /// Whether a session was running at the time
        during_session: bool,
    },
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::SessionStarted { session } => {
                write!(f, "SESSION_STARTED (#{})", session)
            }
            SessionEvent::SessionEnded {
                session,
                frames,
                duration_ms,
            } => write!(
                f,
                "SESSION_ENDED (#{}, {} frames, {}ms)",
                session, frames, duration_ms
            ),
            SessionEvent::ExitRequested { during_session } => {
                write!(f, "EXIT_REQUESTED (during_session={})", during_session)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = SessionEvent::SessionEnded {
            session: 2,
            frames: 45,
            duration_ms: 1500,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("session_ended"));
        assert!(json.contains("1500"));
        assert!(json.contains("\"frames\":45"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"exit_requested","during_session":true}"#;
        let event: SessionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            SessionEvent::ExitRequested {
                during_session: true
            }
        );
    }

    #[test]
    fn test_display() {
        let event = SessionEvent::SessionStarted { session: 3 };
        assert_eq!(event.to_string(), "SESSION_STARTED (#3)");
    }
}
