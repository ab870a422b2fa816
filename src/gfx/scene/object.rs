//! The shared body mesh and the per-body GPU state drawn with it.

use std::path::Path;

use cgmath::{InnerSpace, Matrix4, Vector3};
use wgpu::util::DeviceExt;

use crate::{
    celestial::PointLight,
    error::OrreryError,
    gfx::{geometry::GeometryData, resources::texture_resource::TextureResource},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

use super::vertex::Vertex3D;

/// Indexed triangle mesh. CPU data is kept so buffers can be re-uploaded
/// after the device is recreated.
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
        }
    }

    pub fn from_geometry(geometry: &GeometryData) -> Self {
        let (vertices, indices) = geometry.to_scene_format();
        Self::new(vertices, indices)
    }

    /// Loads every model of an OBJ file into one mesh.
    pub fn from_obj(path: &Path) -> Result<Self, OrreryError> {
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|e| OrreryError::resource(format!("mesh {}", path.display()), e))?;

        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for model in &models {
            let mesh = &model.mesh;
            let base = vertices.len() as u32;
            let vertex_count = mesh.positions.len() / 3;

            let normals = if mesh.normals.len() == mesh.positions.len() {
                mesh.normals.clone()
            } else {
                log::warn!("{}: no normals in '{}', computing them", path.display(), model.name);
                Self::calculate_face_normals(&mesh.positions, &mesh.indices)
            };

            for i in 0..vertex_count {
                // OBJ puts v = 0 at the bottom of the image.
                let tex_coords = if mesh.texcoords.len() >= (i + 1) * 2 {
                    [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
                } else {
                    [0.0, 0.0]
                };
                vertices.push(Vertex3D {
                    position: [
                        mesh.positions[i * 3],
                        mesh.positions[i * 3 + 1],
                        mesh.positions[i * 3 + 2],
                    ],
                    normal: [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]],
                    tex_coords,
                });
            }
            indices.extend(mesh.indices.iter().map(|index| base + index));
        }

        if indices.is_empty() {
            return Err(OrreryError::resource(
                format!("mesh {}", path.display()),
                "file contains no triangles",
            ));
        }

        log::info!(
            "Loaded mesh {} ({} vertices, {} triangles)",
            path.display(),
            vertices.len(),
            indices.len() / 3
        );
        Ok(Self::new(vertices, indices))
    }

    /// Area-weighted vertex normals for meshes that ship without them.
    pub fn calculate_face_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
        let position = |i: u32| {
            let i = i as usize * 3;
            Vector3::new(positions[i], positions[i + 1], positions[i + 2])
        };

        let mut accumulated = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len() / 3];
        for triangle in indices.chunks_exact(3) {
            let (a, b, c) = (position(triangle[0]), position(triangle[1]), position(triangle[2]));
            let face_normal = (b - a).cross(c - a);
            for &index in triangle {
                accumulated[index as usize] += face_normal;
            }
        }

        accumulated
            .into_iter()
            .flat_map(|n| {
                let n = if n.magnitude2() > 0.0 { n.normalize() } else { n };
                [n.x, n.y, n.z]
            })
            .collect()
    }

    /// Creates (or recreates) the vertex and index buffers.
    pub fn upload(&mut self, device: &wgpu::Device) {
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Body Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Body Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Per-body vertex-stage transforms. Must match `ObjectUniform` in `planet.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub world_view_projection: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
}

impl ObjectUniform {
    pub fn new(world: Matrix4<f32>, view_proj: Matrix4<f32>) -> Self {
        Self {
            world_view_projection: (view_proj * world).into(),
            world: world.into(),
        }
    }
}

/// Per-body fragment-stage shading inputs. Must match `SurfaceUniform` in
/// `planet.wgsl`; the `w` components are padding.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceUniform {
    pub ambient_color: [f32; 4],
    pub light_position: [f32; 4],
    pub light_color: [f32; 4],
}

impl SurfaceUniform {
    /// Grey ambient of `ambient_intensity`; an unlit surface when `light` is `None`.
    pub fn new(ambient_intensity: f32, light: Option<&PointLight>) -> Self {
        let (light_position, light_color) = match light {
            Some(light) => (
                [light.position.x, light.position.y, light.position.z, 1.0],
                [light.color[0], light.color[1], light.color[2], 1.0],
            ),
            None => ([0.0, 0.0, 0.0, 1.0], [0.0; 4]),
        };
        Self {
            ambient_color: [ambient_intensity, ambient_intensity, ambient_intensity, 1.0],
            light_position,
            light_color,
        }
    }
}

/// Layouts of bind groups 1 (uniforms) and 2 (colour map).
pub struct BodyBindingLayouts {
    pub uniforms: BindGroupLayoutWithDesc,
    pub texture: BindGroupLayoutWithDesc,
}

impl BodyBindingLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniforms = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .next_binding_fragment(binding_types::uniform())
            .create(device, "Body Uniforms Layout");

        let texture = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Body Texture Layout");

        Self { uniforms, texture }
    }
}

/// Uniform buffers, colour map and bind groups of one body.
pub struct BodyGpuResources {
    object_ubo: UniformBuffer<ObjectUniform>,
    _surface_ubo: UniformBuffer<SurfaceUniform>,
    _texture: TextureResource,
    uniforms_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
}

impl BodyGpuResources {
    pub fn new(
        device: &wgpu::Device,
        layouts: &BodyBindingLayouts,
        texture: TextureResource,
        surface: SurfaceUniform,
        label: &str,
    ) -> Self {
        let object_ubo = UniformBuffer::new(device);
        let surface_ubo = UniformBuffer::new_with_data(device, &surface);

        let uniforms_bind_group = BindGroupBuilder::new(&layouts.uniforms)
            .resource(object_ubo.binding_resource())
            .resource(surface_ubo.binding_resource())
            .create(device, &format!("{label} Uniforms"));

        let texture_bind_group = BindGroupBuilder::new(&layouts.texture)
            .texture(&texture.view)
            .sampler(&texture.sampler)
            .create(device, &format!("{label} Texture"));

        Self {
            object_ubo,
            _surface_ubo: surface_ubo,
            _texture: texture,
            uniforms_bind_group,
            texture_bind_group,
        }
    }

    pub fn write_transforms(
        &mut self,
        queue: &wgpu::Queue,
        world: Matrix4<f32>,
        view_proj: Matrix4<f32>,
    ) {
        self.object_ubo
            .update_content(queue, ObjectUniform::new(world, view_proj));
    }
}

/// Draw helpers on a render pass.
pub trait DrawBody {
    /// Binds the mesh buffers; returns `false` if the mesh is not uploaded.
    fn set_mesh(&mut self, mesh: &Mesh) -> bool;

    /// Draws one body with the currently bound mesh.
    fn draw_body(&mut self, mesh: &Mesh, body: &BodyGpuResources);
}

impl DrawBody for wgpu::RenderPass<'_> {
    fn set_mesh(&mut self, mesh: &Mesh) -> bool {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return false;
        };
        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        true
    }

    fn draw_body(&mut self, mesh: &Mesh, body: &BodyGpuResources) {
        self.set_bind_group(1, &body.uniforms_bind_group, &[]);
        self.set_bind_group(2, &body.texture_bind_group, &[]);
        self.draw_indexed(0..mesh.index_count(), 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_sphere;
    use cgmath::{Point3, SquareMatrix};
    use std::io::Write;

    #[test]
    fn uniform_sizes_match_shader() {
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 128);
        assert_eq!(std::mem::size_of::<SurfaceUniform>(), 48);
    }

    #[test]
    fn object_uniform_premultiplies_view_projection() {
        let world = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let view_proj = Matrix4::from_scale(2.0);
        let uniform = ObjectUniform::new(world, view_proj);
        let expected: [[f32; 4]; 4] = world.into();
        assert_eq!(uniform.world, expected);
        assert_eq!(uniform.world_view_projection[3], [2.0, 4.0, 6.0, 1.0]);

        let identity = ObjectUniform::new(Matrix4::identity(), Matrix4::identity());
        assert_eq!(identity.world, identity.world_view_projection);
    }

    #[test]
    fn surface_uniform_uses_light_and_ambient() {
        let light = PointLight::new(Point3::new(0.0, 1.0, 0.0), [1.0, 0.5, 0.25], 10.0);
        let lit = SurfaceUniform::new(1.0, Some(&light));
        assert_eq!(lit.ambient_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(lit.light_position, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(lit.light_color, [1.0, 0.5, 0.25, 1.0]);

        let unlit = SurfaceUniform::new(0.0, None);
        assert_eq!(unlit.light_color, [0.0; 4]);
    }

    #[test]
    fn mesh_from_geometry_keeps_counts() {
        let sphere = generate_sphere(8, 4);
        let mesh = Mesh::from_geometry(&sphere);
        assert_eq!(mesh.vertex_count(), sphere.vertex_count());
        assert_eq!(mesh.index_count() as usize, sphere.indices.len());
    }

    #[test]
    fn face_normals_follow_winding() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let normals = Mesh::calculate_face_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn obj_mesh_loads_and_flips_v() {
        let mut file = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
        writeln!(
            file,
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nvn 0 0 1\nf 1/1/1 2/2/1 3/3/1"
        )
        .unwrap();

        let mesh = Mesh::from_obj(file.path()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.index_count(), 3);
        assert!(mesh.vertices.iter().any(|v| v.tex_coords == [0.0, 0.0]));
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn missing_obj_is_resource_error() {
        let err = Mesh::from_obj(Path::new("/nonexistent/sphere.obj")).err().unwrap();
        assert!(matches!(err, OrreryError::ResourceCreation { .. }));
    }
}
