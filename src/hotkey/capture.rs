//! Platform keyboard capture backends
//!
//! Each backend blocks the calling thread, translating OS keyboard events
//! into `KeyInput`s until capture fails or `running` is cleared.
//!
//! - macOS: listen-only CGEventTap on a private CFRunLoop (needs the
//!   Accessibility permission)
//! - elsewhere: `rdev` global hook

use std::sync::atomic::AtomicBool;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use super::keys::KeyInput;
use super::listener::HotkeyError;

pub use imp::run;

/// Signals `HotkeyListener::start` that the hook is installed
pub type ReadySender = Sender<Result<(), HotkeyError>>;

#[cfg(target_os = "macos")]
mod imp {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use core_foundation::runloop::{kCFRunLoopCommonModes, kCFRunLoopDefaultMode, CFRunLoop};
    use core_graphics::event::{
        CGEvent, CGEventFlags, CGEventTap, CGEventTapLocation, CGEventTapOptions,
        CGEventTapPlacement, CGEventTapProxy, CGEventType, EventField,
    };
    use tracing::{info, warn};

    use super::*;
    use crate::hotkey::keys::{Key, ModifierState};

    const KEYCODE_ESCAPE: i64 = 0x35;

    /// ANSI virtual keycodes for letters
    const LETTER_KEYCODES: [(i64, char); 26] = [
        (0x00, 'A'), (0x0B, 'B'), (0x08, 'C'), (0x02, 'D'), (0x0E, 'E'),
        (0x03, 'F'), (0x05, 'G'), (0x04, 'H'), (0x22, 'I'), (0x26, 'J'),
        (0x28, 'K'), (0x25, 'L'), (0x2E, 'M'), (0x2D, 'N'), (0x1F, 'O'),
        (0x23, 'P'), (0x0C, 'Q'), (0x0F, 'R'), (0x01, 'S'), (0x11, 'T'),
        (0x20, 'U'), (0x09, 'V'), (0x0D, 'W'), (0x07, 'X'), (0x10, 'Y'),
        (0x06, 'Z'),
    ];

    pub(super) fn key_from_keycode(keycode: i64) -> Key {
        if keycode == KEYCODE_ESCAPE {
            return Key::Escape;
        }
        LETTER_KEYCODES
            .iter()
            .find(|(code, _)| *code == keycode)
            .map(|(_, c)| Key::Letter(*c))
            .unwrap_or(Key::Other)
    }

    pub(super) fn modifiers_from_flags(flags: CGEventFlags) -> ModifierState {
        ModifierState {
            control: flags.contains(CGEventFlags::CGEventFlagControl),
            shift: flags.contains(CGEventFlags::CGEventFlagShift),
            alt: flags.contains(CGEventFlags::CGEventFlagAlternate),
            meta: flags.contains(CGEventFlags::CGEventFlagCommand),
        }
    }

    /// Run the CFRunLoop with the event tap
    pub fn run(
        input_tx: Sender<KeyInput>,
        running: Arc<AtomicBool>,
        ready: ReadySender,
    ) -> Result<(), HotkeyError> {
        // CGEventTap callback - must be fast and non-blocking
        let callback = move |_proxy: CGEventTapProxy,
                             event_type: CGEventType,
                             event: &CGEvent|
                             -> Option<CGEvent> {
            match event_type {
                CGEventType::FlagsChanged => {
                    let _ = input_tx.send(KeyInput::Modifiers(modifiers_from_flags(event.get_flags())));
                }
                CGEventType::KeyDown | CGEventType::KeyUp => {
                    let keycode = event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE);
                    let key = key_from_keycode(keycode);
                    let _ = input_tx.send(KeyInput::Modifiers(modifiers_from_flags(event.get_flags())));
                    let input = if matches!(event_type, CGEventType::KeyDown) {
                        KeyInput::Pressed(key)
                    } else {
                        KeyInput::Released(key)
                    };
                    let _ = input_tx.send(input);
                }
                CGEventType::TapDisabledByTimeout | CGEventType::TapDisabledByUserInput => {
                    warn!("event tap disabled, will re-enable");
                }
                _ => {}
            }
            Some(event.clone())
        };

        let tap = CGEventTap::new(
            CGEventTapLocation::Session,
            CGEventTapPlacement::HeadInsertEventTap,
            CGEventTapOptions::ListenOnly,
            vec![
                CGEventType::KeyDown,
                CGEventType::KeyUp,
                CGEventType::FlagsChanged,
            ],
            callback,
        )
        .map_err(|_| {
            HotkeyError::Capture(
                "failed to create event tap - is Accessibility permission granted?".to_string(),
            )
        })?;

        let run_loop_source = tap
            .mach_port
            .create_runloop_source(0)
            .map_err(|_| HotkeyError::Capture("failed to create run loop source".to_string()))?;
        let run_loop = CFRunLoop::get_current();

        unsafe {
            run_loop.add_source(&run_loop_source, kCFRunLoopCommonModes);
        }

        tap.enable();
        info!("event tap created and enabled");
        let _ = ready.send(Ok(()));

        while running.load(Ordering::SeqCst) {
            unsafe {
                CFRunLoop::run_in_mode(kCFRunLoopDefaultMode, Duration::from_millis(100), true);
            }
        }

        Ok(())
    }
}

#[cfg(not(target_os = "macos"))]
mod imp {
    use rdev::{EventType, Key as RawKey};

    use super::*;
    use crate::hotkey::keys::Key;

    pub(super) fn map_key(key: RawKey) -> Key {
        match key {
            RawKey::ControlLeft | RawKey::ControlRight => Key::Control,
            RawKey::ShiftLeft | RawKey::ShiftRight => Key::Shift,
            RawKey::Alt | RawKey::AltGr => Key::Alt,
            RawKey::MetaLeft | RawKey::MetaRight => Key::Meta,
            RawKey::Escape => Key::Escape,
            RawKey::KeyA => Key::Letter('A'),
            RawKey::KeyB => Key::Letter('B'),
            RawKey::KeyC => Key::Letter('C'),
            RawKey::KeyD => Key::Letter('D'),
            RawKey::KeyE => Key::Letter('E'),
            RawKey::KeyF => Key::Letter('F'),
            RawKey::KeyG => Key::Letter('G'),
            RawKey::KeyH => Key::Letter('H'),
            RawKey::KeyI => Key::Letter('I'),
            RawKey::KeyJ => Key::Letter('J'),
            RawKey::KeyK => Key::Letter('K'),
            RawKey::KeyL => Key::Letter('L'),
            RawKey::KeyM => Key::Letter('M'),
            RawKey::KeyN => Key::Letter('N'),
            RawKey::KeyO => Key::Letter('O'),
            RawKey::KeyP => Key::Letter('P'),
            RawKey::KeyQ => Key::Letter('Q'),
            RawKey::KeyR => Key::Letter('R'),
            RawKey::KeyS => Key::Letter('S'),
            RawKey::KeyT => Key::Letter('T'),
            RawKey::KeyU => Key::Letter('U'),
            RawKey::KeyV => Key::Letter('V'),
            RawKey::KeyW => Key::Letter('W'),
            RawKey::KeyX => Key::Letter('X'),
            RawKey::KeyY => Key::Letter('Y'),
            RawKey::KeyZ => Key::Letter('Z'),
            _ => Key::Other,
        }
    }

    /// Block inside `rdev::listen`.
    ///
    /// rdev only returns on failure and has no success callback, so `ready`
    /// is left to the listener's startup grace period. `running` is checked
    /// by the dispatcher instead; the hook itself cannot be removed.
    pub fn run(
        input_tx: Sender<KeyInput>,
        _running: Arc<AtomicBool>,
        _ready: ReadySender,
    ) -> Result<(), HotkeyError> {
        rdev::listen(move |event| {
            let input = match event.event_type {
                EventType::KeyPress(key) => KeyInput::Pressed(map_key(key)),
                EventType::KeyRelease(key) => KeyInput::Released(map_key(key)),
                _ => return,
            };
            let _ = input_tx.send(input);
        })
        .map_err(|e| HotkeyError::Capture(format!("{:?}", e)))
    }
}
