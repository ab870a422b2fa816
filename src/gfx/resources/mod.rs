//! GPU resources shared across the scene.

pub mod global_bindings;
pub mod texture_resource;

pub use global_bindings::{GlobalBindings, LightUniform};
pub use texture_resource::TextureResource;
