pub mod camera_controller;
pub mod camera_utils;
pub mod first_person_camera;

pub use camera_controller::CameraController;
pub use camera_utils::{Camera, CameraManager};
pub use first_person_camera::FirstPersonCamera;
