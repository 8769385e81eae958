//! Confetti model: particles, the fixed-size set, and frame pacing
//!
//! Pure simulation state; nothing here touches the window.

mod animation;
mod clock;
mod particle;
mod set;

pub use animation::Animation;
pub use particle::{Particle, Rgb};
