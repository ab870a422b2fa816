//! Free-flying camera with yaw/pitch orientation.

use cgmath::{perspective, Deg, EuclideanSpace, Matrix3, Matrix4, Point3, Vector3};

use super::camera_utils::{Camera, OPENGL_TO_WGPU_MATRIX};
use crate::config::{CameraConfig, CameraPreset};

#[derive(Debug, Clone, Copy)]
pub struct FirstPersonCamera {
    pub position: Point3<f32>,
    /// Degrees; positive turns right.
    pub yaw: f32,
    /// Degrees; positive looks up. Clamped to `[-90, 90]`.
    pub pitch: f32,
    pub aspect: f32,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera for FirstPersonCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl FirstPersonCamera {
    pub fn new(preset: CameraPreset, config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            position: Point3::origin(),
            yaw: 0.0,
            pitch: 0.0,
            aspect,
            fovy: Deg(config.fov_degrees),
            znear: config.znear,
            zfar: config.zfar,
        };
        camera.apply_preset(preset);
        camera
    }

    pub fn apply_preset(&mut self, preset: CameraPreset) {
        self.position = Point3::from(preset.position);
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.rotate(preset.yaw_degrees, preset.pitch_degrees);
    }

    fn orientation(&self) -> Matrix3<f32> {
        Matrix3::from_angle_y(Deg(-self.yaw)) * Matrix3::from_angle_x(Deg(self.pitch))
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.orientation() * -Vector3::unit_z()
    }

    pub fn up(&self) -> Vector3<f32> {
        self.orientation() * Vector3::unit_y()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.orientation() * Vector3::unit_x()
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.position + self.forward(), self.up())
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw = (self.yaw + yaw_delta).rem_euclid(360.0);
        self.pitch = (self.pitch + pitch_delta).clamp(-90.0, 90.0);
    }

    /// Moves along the camera's own right, up and forward axes.
    pub fn move_local(&mut self, right: f32, up: f32, forward: f32) {
        let offset = self.right() * right + self.up() * up + self.forward() * forward;
        self.position += offset;
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}
