//! # Scene
//!
//! The bodies of the solar system, the sphere mesh they share and the
//! per-body GPU resources.
//!
//! - [`SolarScene`] owns the bodies in catalog order and the camera
//! - [`Mesh`] holds the sphere geometry, generated or loaded from OBJ
//! - [`DrawBody`] issues one body's draw on a render pass
//! - [`Vertex3D`] is the vertex layout of the planet pipeline

pub mod object;
pub mod scene;
pub mod vertex;

pub use object::{BodyBindingLayouts, BodyGpuResources, DrawBody, Mesh};
pub use scene::SolarScene;
pub use vertex::Vertex3D;
