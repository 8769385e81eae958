//! A single confetti piece and the spawn rule shared by startup and wrap

use std::ops::{Range, RangeInclusive};

use rand::Rng;

use crate::config::Config;

/// Opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack as an opaque pixel laid out in memory as `R, G, B, A`
    pub fn to_pixel(self) -> u32 {
        u32::from_ne_bytes([self.r, self.g, self.b, 0xFF])
    }
}

/// One confetti piece
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Left edge in pixels
    pub x: f32,
    /// Top edge in pixels, grows by `speed` every frame
    pub y: f32,
    pub color: Rgb,
    /// Side length of the square in pixels
    pub size: u32,
    /// Pixels fallen per frame
    pub speed: f32,
}

/// Ranges a freshly spawned particle is drawn from
#[derive(Debug, Clone)]
pub struct SpawnParams {
    pub width: f32,
    pub height: f32,
    pub palette: Vec<Rgb>,
    pub size: RangeInclusive<u32>,
    pub speed: Range<f32>,
}

impl SpawnParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            width: config.width as f32,
            height: config.height as f32,
            palette: config.palette.clone(),
            size: config.size.clone(),
            speed: config.speed.clone(),
        }
    }
}

/// Draw a new particle at the top of the canvas.
///
/// `params` must come from a validated `Config`: an empty palette or range
/// panics inside `gen_range`.
pub fn spawn_particle<R: Rng + ?Sized>(params: &SpawnParams, rng: &mut R) -> Particle {
    Particle {
        x: rng.gen_range(0.0..params.width),
        y: 0.0,
        color: params.palette[rng.gen_range(0..params.palette.len())],
        size: rng.gen_range(params.size.clone()),
        speed: rng.gen_range(params.speed.clone()),
    }
}
