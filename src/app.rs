//! Window event loop glue
//!
//! Owns the session state machine, the particle animation and the overlay
//! window, and drives them from winit events. Hotkey and shutdown events
//! arrive from other threads as user events through an `EventLoopProxy`.

use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use thiserror::Error;
use tracing::{debug, error, info};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopProxy, EventLoopWindowTarget};
use winit::window::WindowId;

use crate::config::Config;
use crate::confetti::Animation;
use crate::hotkey::{HotkeyEvent, HotkeySink};
use crate::render::{OverlaySurface, RenderError};
use crate::state::{Action, Input, Phase, SessionMachine};

/// Line printed each time the trigger chord opens the overlay
const ACTIVATED_NOTICE: &str = "Hotkey activated!";

/// Events injected into the window event loop from other threads
#[derive(Debug, Clone)]
pub enum AppEvent {
    Hotkey(HotkeyEvent),
    /// OS asked the process to stop
    Shutdown,
}

impl HotkeySink for EventLoopProxy<AppEvent> {
    fn deliver(&self, event: HotkeyEvent) -> bool {
        self.send_event(AppEvent::Hotkey(event)).is_ok()
    }
}

/// Fatal errors that stop the event loop
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("hotkey listener stopped: {0}")]
    HotkeyLost(String),
}

pub struct App {
    config: Config,
    machine: SessionMachine,
    animation: Animation,
    overlay: Option<OverlaySurface>,
    fatal: Option<AppError>,
}

impl App {
    pub fn new(config: Config, machine: SessionMachine, animation: Animation) -> Self {
        Self {
            config,
            machine,
            animation,
            overlay: None,
            fatal: None,
        }
    }

    /// Run the event loop on the current thread until exit or a fatal error
    pub fn run(mut self, event_loop: EventLoop<AppEvent>) -> Result<()> {
        event_loop.set_control_flow(ControlFlow::Wait);
        event_loop
            .run(|event, target| self.handle_event(event, target))
            .context("window event loop failed")?;

        info!(
            sessions = self.machine.sessions(),
            frames = self.animation.frames(),
            "event loop exited"
        );

        match self.fatal.take() {
            Some(e) => Err(anyhow!("overlay stopped: {}", e)),
            None => Ok(()),
        }
    }

    fn handle_event(&mut self, event: Event<AppEvent>, target: &EventLoopWindowTarget<AppEvent>) {
        match event {
            Event::UserEvent(AppEvent::Hotkey(HotkeyEvent::Trigger)) => {
                self.apply(Input::Trigger, target);
            }
            Event::UserEvent(AppEvent::Hotkey(HotkeyEvent::Exit)) => {
                self.apply(Input::ExitKey, target);
            }
            Event::UserEvent(AppEvent::Hotkey(HotkeyEvent::Lost(reason))) => {
                self.fail(AppError::HotkeyLost(reason), target);
            }
            Event::UserEvent(AppEvent::Shutdown) => {
                self.apply(Input::Shutdown, target);
            }
            Event::WindowEvent { window_id, event } if self.is_overlay(window_id) => match event {
                WindowEvent::CloseRequested => self.apply(Input::CloseRequested, target),
                WindowEvent::RedrawRequested => self.draw(target),
                _ => {}
            },
            Event::AboutToWait => self.schedule(target),
            _ => {}
        }
    }

    fn is_overlay(&self, window_id: WindowId) -> bool {
        self.overlay.as_ref().is_some_and(|o| o.id() == window_id)
    }

    /// Feed the state machine and carry out its action
    fn apply(&mut self, input: Input, target: &EventLoopWindowTarget<AppEvent>) {
        match self.machine.handle(input) {
            Action::StartSession => {
                println!("{}", ACTIVATED_NOTICE);
                match OverlaySurface::open(target, &self.config) {
                    Ok(overlay) => {
                        self.animation.begin_session();
                        overlay.request_redraw();
                        self.overlay = Some(overlay);
                    }
                    Err(e) => self.fail(e.into(), target),
                }
            }
            Action::EndSession => {
                self.overlay = None;
            }
            Action::Terminate => {
                self.overlay = None;
                target.exit();
            }
            Action::Ignore => {}
        }
    }

    /// Advance one frame if due and present it
    fn draw(&mut self, target: &EventLoopWindowTarget<AppEvent>) {
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };

        let now = Instant::now();
        // Redraws the OS asks for between ticks re-present the current frame
        if self.animation.is_due(now) {
            self.animation.advance(now);
            self.machine.record_frame();
        }

        if let Err(e) = overlay.present(self.animation.particles().particles()) {
            self.fail(e.into(), target);
        }
    }

    /// Pick how long to sleep before the next loop iteration
    fn schedule(&self, target: &EventLoopWindowTarget<AppEvent>) {
        match &self.overlay {
            Some(overlay) if self.machine.phase() == Phase::Running => {
                let now = Instant::now();
                if self.animation.is_due(now) {
                    overlay.request_redraw();
                }
                target.set_control_flow(ControlFlow::WaitUntil(self.animation.next_deadline(now)));
            }
            _ => target.set_control_flow(ControlFlow::Wait),
        }
    }

    fn fail(&mut self, e: AppError, target: &EventLoopWindowTarget<AppEvent>) {
        error!(error = %e, "fatal error, stopping");
        if self.fatal.is_none() {
            self.fatal = Some(e);
        } else {
            debug!("fatal error already recorded");
        }
        self.overlay = None;
        target.exit();
    }
}
