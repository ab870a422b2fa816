use cgmath::Matrix4;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton};

use super::{camera_controller::CameraController, first_person_camera::FirstPersonCamera};
use crate::config::{CameraConfig, ViewMode};

/// Maps OpenGL clip depth `[-1, 1]` to wgpu's `[0, 1]`. Arguments are
/// column-major: `z' = 0.5 z + 0.5 w`.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

/// The scene camera, its input controller and the active preset.
pub struct CameraManager {
    pub camera: FirstPersonCamera,
    pub controller: CameraController,
    view_mode: ViewMode,
}

impl CameraManager {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            camera: FirstPersonCamera::new(config.view_mode.preset(), config, aspect),
            controller: CameraController::new(config.move_speed, config.rotate_speed),
            view_mode: config.view_mode,
        }
    }

    pub fn process_event(&mut self, event: &DeviceEvent) {
        self.controller.process_events(event);
    }

    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        self.controller.process_mouse_button(button, state);
    }

    pub fn process_keyboard_event(&mut self, event: &KeyEvent) -> bool {
        self.controller.process_keyed_events(event)
    }

    /// Drops held movement keys and any mouse drag.
    pub fn focus_lost(&mut self) {
        self.controller.reset();
        log::debug!("Window lost focus; camera input released");
    }

    pub fn update(&mut self, elapsed_seconds: f32) {
        self.controller.update_camera(&mut self.camera, elapsed_seconds);
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Switches to the next preset and moves the camera there.
    pub fn cycle_view_mode(&mut self) -> ViewMode {
        self.set_view_mode(self.view_mode.next());
        self.view_mode
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
        self.camera.apply_preset(view_mode.preset());
        log::info!("Camera preset: {:?}", view_mode);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize_projection(width, height);
    }

    pub fn get_view_proj_matrix(&self) -> Matrix4<f32> {
        self.camera.build_view_projection_matrix()
    }
}
