//! # Graphics
//!
//! - **Camera** ([`camera`]) - first-person camera with view presets
//! - **Geometry** ([`geometry`]) - UV sphere generation
//! - **Rendering** ([`rendering`]) - surface, device, pipelines and frame drawing
//! - **Resources** ([`resources`]) - light uniform and textures
//! - **Scene** ([`scene`]) - bodies, shared mesh and per-body GPU state

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::first_person_camera::FirstPersonCamera;
pub use rendering::render_engine::RenderEngine;
pub use scene::SolarScene;
