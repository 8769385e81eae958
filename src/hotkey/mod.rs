//! Hotkey module for global keyboard event listening
//!
//! Captures the session trigger chord and the exit key system-wide,
//! regardless of which window has focus.

mod capture;
mod keys;
mod listener;

pub use keys::{Chord, HotkeyEvent, ParseChordError};
pub use listener::{HotkeyListener, HotkeySink};
