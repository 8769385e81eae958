//! Overlay window and its GPU surface

use std::sync::Arc;

use futures::executor::block_on;
use tracing::{debug, info, warn};
use winit::dpi::PhysicalSize;
use winit::event_loop::EventLoopWindowTarget;
use winit::window::{Window, WindowBuilder, WindowId, WindowLevel};

use super::canvas::{Canvas, TRANSPARENT};
use super::{draw_frame, RenderError};
use crate::config::Config;
use crate::confetti::Particle;

/// Texture format of the rasterized frame, matching `Canvas` byte order
const FRAME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A borderless, transparent, always-on-top window that passes clicks
/// through.
///
/// Frames are drawn into a CPU pixel buffer, uploaded to a texture and
/// copied onto a surface composited with per-pixel alpha. Dropping it
/// closes the window.
pub struct OverlaySurface {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    frame: FrameTexture,
    pixels: Vec<u32>,
}

/// Texture the pixel buffer is uploaded into, sized to the surface
struct FrameTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

impl OverlaySurface {
    /// Create the overlay window
    pub fn open<T: 'static>(
        target: &EventLoopWindowTarget<T>,
        config: &Config,
    ) -> Result<Self, RenderError> {
        let window = WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .with_resizable(false)
            .with_decorations(false)
            .with_transparent(true)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .build(target)?;
        let window = Arc::new(window);

        if let Err(e) = window.set_cursor_hittest(false) {
            warn!(?e, "click-through not supported, overlay will capture the mouse");
        }

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(Arc::clone(&window))?;

        let adapter = block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        }))
        .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("overlay-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
            },
            None,
        ))?;

        let caps = surface.get_capabilities(&adapter);
        let format = pick_format(&caps.formats).ok_or(RenderError::NoSurfaceFormat)?;
        let alpha_mode = match pick_alpha_mode(&caps.alpha_modes) {
            Some(mode) => mode,
            None => {
                warn!(
                    modes = ?caps.alpha_modes,
                    "surface cannot blend with the desktop, overlay will be opaque"
                );
                caps.alpha_modes
                    .first()
                    .copied()
                    .unwrap_or(wgpu::CompositeAlphaMode::Auto)
            }
        };

        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &surface_config);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("overlay-frame-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }],
        });
        let pipeline = create_pipeline(&device, &bind_group_layout, format);
        let frame = FrameTexture::new(&device, &bind_group_layout, &surface_config);

        info!(
            window = ?window.id(),
            adapter = %adapter.get_info().name,
            ?format,
            ?alpha_mode,
            width = surface_config.width,
            height = surface_config.height,
            "overlay window opened"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            pixels: vec![TRANSPARENT; pixel_count(&surface_config)],
            config: surface_config,
            pipeline,
            bind_group_layout,
            frame,
        })
    }

    pub fn id(&self) -> WindowId {
        self.window.id()
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    /// Draw the particles, upload the frame and present it
    pub fn present(&mut self, particles: &[Particle]) -> Result<(), RenderError> {
        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            debug!(?size, "window has no area, skipping frame");
            return Ok(());
        }
        if (size.width, size.height) != (self.config.width, self.config.height) {
            self.resize(size);
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("timed out waiting for a surface texture, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let (width, height) = (self.config.width, self.config.height);
        let mut canvas = Canvas::new(&mut self.pixels, width as usize, height as usize);
        draw_frame(&mut canvas, particles);
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.frame.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            canvas.as_rgba_bytes(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            frame_extent(&self.config),
        );

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("overlay-frame"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("overlay-frame"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.frame.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        debug!(?size, "resizing overlay surface");
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.frame = FrameTexture::new(&self.device, &self.bind_group_layout, &self.config);
        self.pixels.resize(pixel_count(&self.config), TRANSPARENT);
    }
}

impl Drop for OverlaySurface {
    fn drop(&mut self) {
        debug!(window = ?self.window.id(), "overlay window closed");
    }
}

impl FrameTexture {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        config: &wgpu::SurfaceConfiguration,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("overlay-frame"),
            size: frame_extent(config),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FRAME_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("overlay-frame"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            }],
        });

        Self {
            texture,
            bind_group,
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("overlay-frame"),
        source: wgpu::ShaderSource::Wgsl(include_str!("frame.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("overlay-frame"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("overlay-frame"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                // The texture already holds the final pixels, alpha included
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

/// Prefer a linear format so palette bytes reach the screen unchanged
fn pick_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

/// First alpha mode that lets transparent pixels show the desktop.
///
/// Confetti pixels are either fully opaque or fully transparent, so
/// premultiplied and straight alpha composite identically.
fn pick_alpha_mode(modes: &[wgpu::CompositeAlphaMode]) -> Option<wgpu::CompositeAlphaMode> {
    [
        wgpu::CompositeAlphaMode::PreMultiplied,
        wgpu::CompositeAlphaMode::PostMultiplied,
    ]
    .into_iter()
    .find(|mode| modes.contains(mode))
}

fn frame_extent(config: &wgpu::SurfaceConfiguration) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: config.width,
        height: config.height,
        depth_or_array_layers: 1,
    }
}

fn pixel_count(config: &wgpu::SurfaceConfiguration) -> usize {
    config.width as usize * config.height as usize
}
