//! Platform-neutral key definitions, chord parsing and matching
//!
//! Capture backends translate raw OS events into `KeyInput`s; the
//! `KeyMatcher` turns that stream into trigger and exit events.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Keys the overlay cares about; everything else collapses into `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Control,
    Shift,
    Alt,
    Meta,
    Escape,
    /// Letter key, stored uppercase
    Letter(char),
    Other,
}

impl Key {
    fn is_modifier(self) -> bool {
        matches!(self, Key::Control | Key::Shift | Key::Alt | Key::Meta)
    }
}

/// Tracks which modifier keys are currently pressed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState {
    pub control: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl ModifierState {
    /// Update from a single modifier key press or release
    pub fn apply(&mut self, key: Key, pressed: bool) {
        match key {
            Key::Control => self.control = pressed,
            Key::Shift => self.shift = pressed,
            Key::Alt => self.alt = pressed,
            Key::Meta => self.meta = pressed,
            _ => {}
        }
    }
}

/// One normalized input from a capture backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Pressed(Key),
    Released(Key),
    /// Full modifier snapshot, for backends that report flags rather than
    /// individual modifier keys
    Modifiers(ModifierState),
}

/// Events sent from the hotkey listener to the event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyEvent {
    /// Session trigger chord was pressed
    Trigger,
    /// Exit key was pressed
    Exit,
    /// Capture stopped after startup; no further events will arrive
    Lost(String),
}

/// A set of modifiers plus one key, e.g. `ctrl+shift+c`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chord {
    pub modifiers: ModifierState,
    pub key: Key,
}

/// Errors from parsing a chord string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseChordError {
    #[error("chord is empty")]
    Empty,

    #[error("unknown key {0:?}")]
    UnknownKey(String),

    #[error("chord has no non-modifier key")]
    MissingKey,

    #[error("chord has more than one non-modifier key")]
    MultipleKeys,
}

impl FromStr for Chord {
    type Err = ParseChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ParseChordError::Empty);
        }

        let mut modifiers = ModifierState::default();
        let mut key = None;

        for part in s.split('+') {
            let part = part.trim().to_ascii_lowercase();
            let parsed = match part.as_str() {
                "ctrl" | "control" => Key::Control,
                "shift" => Key::Shift,
                "alt" | "option" => Key::Alt,
                "cmd" | "command" | "meta" | "super" => Key::Meta,
                "esc" | "escape" => Key::Escape,
                p if p.len() == 1 && p.chars().all(|c| c.is_ascii_alphabetic()) => {
                    Key::Letter(p.to_ascii_uppercase().chars().next().unwrap_or('?'))
                }
                "" => return Err(ParseChordError::MissingKey),
                other => return Err(ParseChordError::UnknownKey(other.to_string())),
            };

            if parsed.is_modifier() {
                modifiers.apply(parsed, true);
            } else if key.replace(parsed).is_some() {
                return Err(ParseChordError::MultipleKeys);
            }
        }

        let key = key.ok_or(ParseChordError::MissingKey)?;
        Ok(Self { modifiers, key })
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.modifiers;
        for (held, name) in [
            (m.control, "ctrl"),
            (m.shift, "shift"),
            (m.alt, "alt"),
            (m.meta, "meta"),
        ] {
            if held {
                write!(f, "{}+", name)?;
            }
        }
        match self.key {
            Key::Escape => write!(f, "esc"),
            Key::Letter(c) => write!(f, "{}", c.to_ascii_lowercase()),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Turns a stream of key inputs into hotkey events.
///
/// The trigger fires on the press of its key while exactly its modifiers are
/// held, once per physical press (auto-repeat is ignored). The exit key fires
/// on press regardless of modifiers.
#[derive(Debug, Clone)]
pub struct KeyMatcher {
    trigger: Chord,
    exit: Key,
    modifiers: ModifierState,
    trigger_held: bool,
}

impl KeyMatcher {
    pub fn new(trigger: Chord, exit: Chord) -> Self {
        Self {
            trigger,
            exit: exit.key,
            modifiers: ModifierState::default(),
            trigger_held: false,
        }
    }

    pub fn modifiers(&self) -> ModifierState {
        self.modifiers
    }

    /// Feed one input, returning the event it completes, if any
    pub fn feed(&mut self, input: KeyInput) -> Option<HotkeyEvent> {
        match input {
            KeyInput::Modifiers(state) => {
                self.modifiers = state;
                None
            }
            KeyInput::Pressed(key) if key.is_modifier() => {
                self.modifiers.apply(key, true);
                None
            }
            KeyInput::Released(key) if key.is_modifier() => {
                self.modifiers.apply(key, false);
                None
            }
            KeyInput::Pressed(key) if key == self.exit => Some(HotkeyEvent::Exit),
            KeyInput::Pressed(key) if key == self.trigger.key => {
                let fire = !self.trigger_held && self.modifiers == self.trigger.modifiers;
                self.trigger_held = true;
                fire.then_some(HotkeyEvent::Trigger)
            }
            KeyInput::Released(key) if key == self.trigger.key => {
                self.trigger_held = false;
                None
            }
            _ => None,
        }
    }
}
