//! The bodies of the solar system: parameters, lighting and animation.

pub mod body;
pub mod catalog;
pub mod light;

pub use body::{BodyHandle, CelestialBody};
pub use catalog::{Catalog, CelestialBodyId, CelestialBodyParams};
pub use light::{LightSlot, PointLight};
