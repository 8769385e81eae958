//! Rendering of confetti frames
//!
//! Frames are rasterized on the CPU into an RGBA `Canvas`, uploaded as a
//! texture and composited onto the window through wgpu with per-pixel
//! alpha.

mod canvas;
mod surface;

use thiserror::Error;

use crate::confetti::Particle;

pub use canvas::{Canvas, TRANSPARENT};
pub use surface::OverlaySurface;

/// Errors from creating or presenting the overlay
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create overlay window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create overlay surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no graphics adapter can present to the overlay")]
    NoAdapter,

    #[error("failed to open graphics device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("overlay surface reports no texture formats")]
    NoSurfaceFormat,

    #[error("overlay surface failed: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Clear to transparent and draw every particle as a filled square
pub fn draw_frame(canvas: &mut Canvas<'_>, particles: &[Particle]) {
    canvas.clear(TRANSPARENT);
    for p in particles {
        canvas.fill_rect(
            p.x.floor() as i64,
            p.y.floor() as i64,
            p.size,
            p.size,
            p.color.to_pixel(),
        );
    }
}
