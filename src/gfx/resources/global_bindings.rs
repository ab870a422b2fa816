//! Scene-wide light uniform, bound to group 0 of the planet pipeline.

use crate::{
    celestial::PointLight,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Must match `LightUniform` in `planet.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub radius: f32,
}

impl From<&PointLight> for LightUniform {
    fn from(light: &PointLight) -> Self {
        Self {
            position: light.position.into(),
            radius: light.radius,
        }
    }
}

pub type LightUBO = UniformBuffer<LightUniform>;

/// Owns the light uniform buffer and its bind group.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    ubo: LightUBO,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(device, "Light Bind Group Layout");

        let ubo = LightUBO::new_with_data(device, &LightUniform::default());
        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Light Bind Group");

        Self {
            bind_group_layout,
            ubo,
            bind_group,
        }
    }

    pub fn update_light(&mut self, queue: &wgpu::Queue, light: &PointLight) {
        self.ubo.update_content(queue, LightUniform::from(light));
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    #[test]
    fn light_uniform_is_one_vec4() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 16);
    }

    #[test]
    fn light_uniform_copies_position_and_radius() {
        let light = PointLight::new(Point3::new(1.0, 2.0, 3.0), [1.0; 3], 15_000.0);
        let uniform = LightUniform::from(&light);
        assert_eq!(uniform.position, [1.0, 2.0, 3.0]);
        assert_eq!(uniform.radius, 15_000.0);
    }
}
