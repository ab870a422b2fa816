//! winit application: window lifecycle, input routing and the redraw loop.

use std::{sync::Arc, time::Instant};

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, ElementState, Event, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    celestial::Catalog,
    config::OrreryConfig,
    error::OrreryError,
    gfx::{rendering::render_engine::RenderEngine, scene::scene::SolarScene},
    render_loop::{FrameOutcome, RenderLoop},
};

pub struct OrreryApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    config: OrreryConfig,
    render_engine: Option<RenderEngine>,
    scene: SolarScene,
    render_loop: RenderLoop,
    last_frame: Instant,
    error: Option<OrreryError>,
}

impl OrreryApp {
    /// Builds the scene. The window and device are created once the event
    /// loop resumes.
    pub fn new(config: OrreryConfig, catalog: &Catalog) -> Result<Self, OrreryError> {
        let event_loop =
            EventLoop::new().map_err(|e| OrreryError::resource("event loop", e))?;

        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        let scene = SolarScene::new(&config, catalog, aspect)?;

        Ok(Self {
            event_loop,
            app_state: AppState {
                config,
                render_engine: None,
                scene,
                render_loop: RenderLoop::new(),
                last_frame: Instant::now(),
                error: None,
            },
        })
    }

    /// Runs until the window closes. Returns the error that stopped the
    /// frame loop, if any.
    pub fn run(self) -> Result<(), OrreryError> {
        let OrreryApp {
            event_loop,
            mut app_state,
        } = self;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut app_state)
            .map_err(|e| OrreryError::resource("event loop", e))?;

        log::info!(
            "Presented {} frames, {} device recoveries",
            app_state.render_loop.frames_presented(),
            app_state.render_loop.recoveries()
        );
        match app_state.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: OrreryError) {
        log::error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn create_renderer(&mut self, window: Arc<Window>) -> Result<RenderEngine, OrreryError> {
        let engine =
            pollster::block_on(RenderEngine::new(window.clone(), self.config.window.vsync))?;
        engine.init_scene(&mut self.scene)?;

        let PhysicalSize { width, height } = window.inner_size();
        self.scene.camera_manager.resize(width, height);
        Ok(engine)
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        match key_code {
            KeyCode::Escape => self.render_loop.request_exit(),
            KeyCode::Space => {
                self.scene.toggle_animation();
            }
            KeyCode::Tab => {
                self.scene.camera_manager.cycle_view_mode();
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.render_engine.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, OrreryError::resource("window", e)),
        };

        match self.create_renderer(window) {
            Ok(engine) => {
                self.render_engine = Some(engine);
                self.last_frame = Instant::now();
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };

        let ui_event: Event<()> = Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        let ui_captured = render_engine.handle_ui_input(&ui_event);
        if ui_captured
            && matches!(
                event,
                WindowEvent::KeyboardInput { .. } | WindowEvent::MouseInput { .. }
            )
        {
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                if let PhysicalKey::Code(key_code) = key_event.physical_key {
                    if key_event.state == ElementState::Pressed && !key_event.repeat {
                        self.handle_key(key_code);
                    }
                }
                self.scene
                    .camera_manager
                    .process_keyboard_event(&key_event);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.scene
                    .camera_manager
                    .process_mouse_button(button, state);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scene.camera_manager.resize(width, height);
                render_engine.resize(width, height);
            }
            WindowEvent::Focused(false) => {
                self.scene.camera_manager.focus_lost();
            }
            WindowEvent::CloseRequested => {
                self.render_loop.request_exit();
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let elapsed = now - self.last_frame;
                self.last_frame = now;

                match self
                    .render_loop
                    .frame(render_engine, &mut self.scene, elapsed)
                {
                    Ok(FrameOutcome::ExitRequested) => event_loop.exit(),
                    Ok(
                        FrameOutcome::Presented
                        | FrameOutcome::Skipped
                        | FrameOutcome::Recovered,
                    ) => {}
                    Err(err) => self.fail(event_loop, err),
                }
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if self.render_engine.is_none() {
            return;
        }
        self.scene.camera_manager.process_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(render_engine) = self.render_engine.as_ref() {
            render_engine.window().request_redraw();
        }
    }
}
