//! wgpu surface, device and the per-frame draw of the solar system.
//!
//! Everything created from the device lives in [`DeviceContext`] so it can be
//! dropped and rebuilt as a unit when the device is lost. The window, instance
//! and surface outlive any single device.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use wgpu::{Device, Queue, TextureFormat};
use winit::window::Window;

use crate::{
    error::OrreryError,
    gfx::{
        resources::{
            global_bindings::GlobalBindings,
            texture_resource::{DepthTexture, TextureResource},
        },
        scene::{object::BodyBindingLayouts, scene::SolarScene},
    },
    render_loop::RenderBackend,
    ui::{manager::UiManager, overlay::Overlay},
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

const PLANET_SHADER: &str = "planet";
const PLANET_PIPELINE: &str = "Planets";

/// Translates a failed `get_current_texture`.
///
/// `None` means the frame should be skipped and nothing else done.
pub fn map_surface_error(err: wgpu::SurfaceError) -> Option<OrreryError> {
    match err {
        wgpu::SurfaceError::Timeout => {
            log::warn!("Surface timed out; skipping frame");
            None
        }
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Some(OrreryError::DeviceLost),
        other => Some(OrreryError::Presentation(other.to_string())),
    }
}

/// First sRGB format the surface supports, else whatever it prefers.
pub fn pick_surface_format(formats: &[TextureFormat]) -> Option<TextureFormat> {
    formats
        .iter()
        .copied()
        .find(TextureFormat::is_srgb)
        .or_else(|| formats.first().copied())
}

pub fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

/// Device and everything allocated from it.
struct DeviceContext {
    device: Arc<Device>,
    queue: Queue,
    config: wgpu::SurfaceConfiguration,
    depth_texture: DepthTexture,
    pipeline_manager: PipelineManager,
    global_bindings: GlobalBindings,
    body_layouts: BodyBindingLayouts,
    ui: UiManager,
    device_lost: Arc<AtomicBool>,
}

impl DeviceContext {
    async fn create(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'static>,
        window: &Window,
        vsync: bool,
    ) -> Result<Self, OrreryError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| OrreryError::resource("adapter", e))?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Orrery Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| OrreryError::resource("device", e))?;

        let device_lost = Arc::new(AtomicBool::new(false));
        let flag = device_lost.clone();
        device.set_device_lost_callback(move |reason, message| {
            if matches!(reason, wgpu::DeviceLostReason::Destroyed) {
                return;
            }
            log::error!("Device lost: {message}");
            flag.store(true, Ordering::SeqCst);
        });
        let device = Arc::new(device);

        let capabilities = surface.get_capabilities(&adapter);
        let format = pick_surface_format(&capabilities.formats)
            .ok_or_else(|| OrreryError::resource("surface", "adapter cannot present to window"))?;
        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode: capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::debug!("Surface configured: {:?} {}x{}", format, config.width, config.height);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "Depth Texture");
        let global_bindings = GlobalBindings::new(&device);
        let body_layouts = BodyBindingLayouts::new(&device);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        pipeline_manager.load_shader(PLANET_SHADER, include_str!("planet.wgsl"));
        pipeline_manager.register_pipeline(
            PLANET_PIPELINE,
            PipelineConfig::default()
                .with_label(PLANET_PIPELINE)
                .with_shader(PLANET_SHADER)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    body_layouts.uniforms.layout.clone(),
                    body_layouts.texture.layout.clone(),
                ])
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_color_format(format),
        );
        pipeline_manager.create_all_pipelines()?;

        let ui = UiManager::new(&device, &queue, format, window);

        Ok(Self {
            device,
            queue,
            config,
            depth_texture,
            pipeline_manager,
            global_bindings,
            body_layouts,
            ui,
            device_lost,
        })
    }

    fn reconfigure(&mut self, surface: &wgpu::Surface<'static>) {
        surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "Depth Texture");
    }
}

/// Owns the window surface and the current device context.
pub struct RenderEngine {
    window: Arc<Window>,
    instance: wgpu::Instance,
    surface: wgpu::Surface<'static>,
    vsync: bool,
    ctx: Option<DeviceContext>,
}

impl RenderEngine {
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self, OrreryError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| OrreryError::resource("surface", e))?;

        let ctx = DeviceContext::create(&instance, &surface, &window, vsync).await?;

        Ok(Self {
            window,
            instance,
            surface,
            vsync,
            ctx: Some(ctx),
        })
    }

    fn context(&self) -> Result<&DeviceContext, OrreryError> {
        self.ctx.as_ref().ok_or(OrreryError::DeviceLost)
    }

    /// Creates the scene's textures, uniforms and mesh buffers on the current device.
    pub fn init_scene(&self, scene: &mut SolarScene) -> Result<(), OrreryError> {
        let ctx = self.context()?;
        scene.init_gpu_resources(&ctx.device, &ctx.queue, &ctx.body_layouts)
    }

    /// Reconfigures the surface and depth buffer. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some(ctx) = self.ctx.as_mut() {
            ctx.config.width = width;
            ctx.config.height = height;
            ctx.reconfigure(&self.surface);
        }
    }

    /// Forwards a window event to the overlay's input handling.
    pub fn handle_ui_input<T>(&mut self, event: &winit::event::Event<T>) -> bool {
        match self.ctx.as_mut() {
            Some(ctx) => ctx.ui.handle_input(&self.window, event),
            None => false,
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl RenderBackend for RenderEngine {
    fn render_frame(
        &mut self,
        scene: &mut SolarScene,
        overlay: &Overlay,
    ) -> Result<bool, OrreryError> {
        let ctx = self.ctx.as_mut().ok_or(OrreryError::DeviceLost)?;
        if ctx.device_lost.load(Ordering::SeqCst) {
            return Err(OrreryError::DeviceLost);
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                return match map_surface_error(err) {
                    Some(err) => Err(err),
                    None => Ok(false),
                }
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        scene.prepare(&ctx.queue);
        ctx.global_bindings.update_light(&ctx.queue, scene.light());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let pipeline = ctx
                .pipeline_manager
                .get_pipeline(PLANET_PIPELINE)
                .ok_or_else(|| OrreryError::resource("pipeline", "planet pipeline not built"))?;

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Planet Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, ctx.global_bindings.bind_group(), &[]);
            let draw_calls = scene.draw(&mut render_pass);
            log::trace!("Issued {draw_calls} body draws");
        }

        ctx.ui.draw(
            &ctx.device,
            &ctx.queue,
            &mut encoder,
            &self.window,
            &view,
            |ui| overlay.render(ui),
        )?;

        ctx.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        frame.present();
        Ok(true)
    }

    fn rebuild_device_resources(&mut self, scene: &mut SolarScene) -> Result<(), OrreryError> {
        let device_lost = self
            .ctx
            .as_ref()
            .map_or(true, |ctx| ctx.device_lost.load(Ordering::SeqCst));

        if !device_lost {
            if let Some(ctx) = self.ctx.as_mut() {
                log::info!("Reconfiguring surface");
                ctx.reconfigure(&self.surface);
            }
            return Ok(());
        }

        // The old device must be gone before its replacement is requested.
        self.ctx = None;
        let ctx = pollster::block_on(DeviceContext::create(
            &self.instance,
            &self.surface,
            &self.window,
            self.vsync,
        ))?;
        scene.init_gpu_resources(&ctx.device, &ctx.queue, &ctx.body_layouts)?;
        self.ctx = Some(ctx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_skips_the_frame() {
        assert!(map_surface_error(wgpu::SurfaceError::Timeout).is_none());
    }

    #[test]
    fn lost_and_outdated_surfaces_trigger_recovery() {
        for err in [wgpu::SurfaceError::Lost, wgpu::SurfaceError::Outdated] {
            assert!(matches!(map_surface_error(err), Some(OrreryError::DeviceLost)));
        }
    }

    #[test]
    fn out_of_memory_is_fatal() {
        let err = map_surface_error(wgpu::SurfaceError::OutOfMemory).unwrap();
        assert!(matches!(err, OrreryError::Presentation(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn prefers_srgb_surface_formats() {
        let formats = [TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb];
        assert_eq!(pick_surface_format(&formats), Some(TextureFormat::Bgra8UnormSrgb));
        assert_eq!(
            pick_surface_format(&[TextureFormat::Rgba16Float]),
            Some(TextureFormat::Rgba16Float)
        );
        assert_eq!(pick_surface_format(&[]), None);
    }

    #[test]
    fn vsync_selects_fifo() {
        assert_eq!(present_mode(true), wgpu::PresentMode::Fifo);
        assert_eq!(present_mode(false), wgpu::PresentMode::AutoNoVsync);
    }
}
