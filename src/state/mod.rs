//! State machine module for overlay sessions
//!
//! Provides an explicit state machine with two phases:
//! - Idle: no overlay, waiting for the trigger chord
//! - Running: overlay open, frames drawn until the window closes
//!
//! The exit key terminates from either phase.

mod machine;

pub use machine::{Action, Input, Phase, SessionMachine};
