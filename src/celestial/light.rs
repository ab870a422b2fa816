//! The star's point light and how bodies hold it.

use std::sync::Arc;

use cgmath::Point3;

/// CPU-side point light descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    /// World-space position.
    pub position: Point3<f32>,
    /// Linear RGB colour.
    pub color: [f32; 3],
    /// Distance at which the light's contribution reaches zero.
    pub radius: f32,
}

impl PointLight {
    pub fn new(position: Point3<f32>, color: [f32; 3], radius: f32) -> Self {
        Self {
            position,
            color,
            radius,
        }
    }
}

/// How a body relates to the scene light.
///
/// Exactly one body owns the light; every other body holds a read-only
/// handle to the same value.
#[derive(Debug, Clone, Default)]
pub enum LightSlot {
    #[default]
    None,
    Owned(Arc<PointLight>),
    Shared(Arc<PointLight>),
}

impl LightSlot {
    /// The light used for shading, regardless of ownership.
    pub fn get(&self) -> Option<&Arc<PointLight>> {
        match self {
            LightSlot::None => None,
            LightSlot::Owned(light) | LightSlot::Shared(light) => Some(light),
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, LightSlot::Owned(_))
    }
}
