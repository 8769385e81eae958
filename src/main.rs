//! confetti-overlay: falling confetti over the desktop on a global hotkey
//!
//! Runs in the background and provides:
//! - Global hotkey detection (CGEventTap on macOS, rdev elsewhere)
//! - Explicit Idle/Running state machine for overlay sessions
//! - A transparent, borderless, click-through overlay animated at 30 fps
//!
//! `ctrl+shift+c` opens the overlay, closing the window returns to waiting,
//! and `esc` exits.

mod app;
mod config;
mod confetti;
mod events;
mod hotkey;
mod lifecycle;
mod render;
mod state;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;
use winit::event_loop::EventLoopBuilder;

use crate::app::{App, AppEvent};
use crate::config::Config;
use crate::confetti::Animation;
use crate::events::SessionEvent;
use crate::hotkey::HotkeyListener;
use crate::state::SessionMachine;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "confetti-overlay starting"
    );

    // Load configuration
    let config = Config::load().context("invalid built-in configuration")?;
    info!(
        width = config.width,
        height = config.height,
        particles = config.particle_count,
        fps = config.frame_rate,
        "configuration loaded"
    );

    let event_loop = EventLoopBuilder::<AppEvent>::with_user_event()
        .build()
        .context("failed to initialize windowing system")?;

    // State machine -> lifecycle thread (session event log)
    let (event_tx, event_rx) = broadcast::channel::<SessionEvent>(64);
    let machine = SessionMachine::new(event_tx);

    // Particles live for the whole process, across sessions
    let animation = Animation::from_config(&config);

    // Start the hotkey listener (runs on dedicated thread)
    let hotkey_listener = HotkeyListener::new(
        event_loop.create_proxy(),
        config.trigger_chord()?,
        config.exit_chord()?,
    );
    hotkey_listener
        .start()
        .context("failed to register global hotkeys - check input monitoring permissions")?;
    info!(running = hotkey_listener.is_running(), "hotkey listener started");

    let shutdown_proxy = event_loop.create_proxy();
    lifecycle::spawn(
        move || {
            let _ = shutdown_proxy.send_event(AppEvent::Shutdown);
        },
        event_rx,
    )
    .context("failed to spawn lifecycle thread")?;

    info!(trigger = %config.trigger, exit = %config.exit_key, "waiting for hotkey");

    let result = App::new(config, machine, animation).run(event_loop);

    // Cleanup
    hotkey_listener.stop();
    info!("confetti-overlay stopped");

    result
}
