//! The solar system scene: bodies, shared mesh and camera.

use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    celestial::{BodyHandle, Catalog, CelestialBody, CelestialBodyId, PointLight},
    config::OrreryConfig,
    error::OrreryError,
    gfx::{
        camera::camera_utils::CameraManager,
        geometry::generate_sphere,
        scene::object::{BodyBindingLayouts, DrawBody, Mesh},
    },
};

/// All bodies of the system plus the camera that views them.
///
/// Bodies are stored in catalog order, star first; that order is also the
/// update and draw order.
pub struct SolarScene {
    pub camera_manager: CameraManager,
    bodies: Vec<CelestialBody>,
    mesh: Mesh,
    light: Arc<PointLight>,
    texture_dir: PathBuf,
}

impl SolarScene {
    /// Builds and initializes every body from `catalog`. No GPU work happens
    /// here; see [`init_gpu_resources`](Self::init_gpu_resources).
    pub fn new(config: &OrreryConfig, catalog: &Catalog, aspect: f32) -> Result<Self, OrreryError> {
        let mut bodies = Vec::with_capacity(CelestialBodyId::ALL.len());
        for id in CelestialBodyId::ALL {
            let mut body = CelestialBody::new(id, config.simulation);
            body.initialize(catalog)?;
            bodies.push(body);
        }

        let star_index = bodies
            .iter()
            .position(|body| body.id().is_star())
            .ok_or(OrreryError::CatalogLookup(CelestialBodyId::Sun))?;
        let light = bodies[star_index].light()?.clone();
        for body in bodies.iter_mut().filter(|body| !body.id().is_star()) {
            body.set_light(light.clone());
        }

        let mesh = match &config.assets.sphere_mesh {
            Some(path) => Mesh::from_obj(path)?,
            None => {
                let segments = config.assets.sphere_segments;
                Mesh::from_geometry(&generate_sphere(segments, segments / 2))
            }
        };

        let mut scene = Self {
            camera_manager: CameraManager::new(&config.camera, aspect),
            bodies,
            mesh,
            light,
            texture_dir: config.assets.texture_dir.clone(),
        };

        let earth = scene.handle(CelestialBodyId::Earth)?;
        scene.body_mut(CelestialBodyId::Moon)?.set_parent_object(earth);

        // Place every body before the first frame, even when starting paused.
        scene.update_bodies(0.0);
        if config.start_paused {
            scene.set_animation_enabled(false);
        }

        log::info!(
            "Scene ready: {} bodies, {} mesh vertices",
            scene.bodies.len(),
            scene.mesh.vertex_count()
        );
        Ok(scene)
    }

    /// Advances the camera and then every body by `elapsed_seconds`.
    pub fn update(&mut self, elapsed_seconds: f32) {
        self.camera_manager.update(elapsed_seconds);
        self.update_bodies(elapsed_seconds);
    }

    fn update_bodies(&mut self, elapsed_seconds: f32) {
        for index in 0..self.bodies.len() {
            let parent_position = self.bodies[index]
                .parent_handle()
                .and_then(|parent| self.bodies.get(parent.index()))
                .map(CelestialBody::orbit_position);
            self.bodies[index].update(elapsed_seconds, parent_position);
        }
    }

    /// Pauses or resumes every body together.
    pub fn toggle_animation(&mut self) -> bool {
        let enabled = !self.animation_enabled();
        self.set_animation_enabled(enabled);
        log::info!("Animation {}", if enabled { "resumed" } else { "paused" });
        enabled
    }

    pub fn set_animation_enabled(&mut self, enabled: bool) {
        for body in &mut self.bodies {
            body.set_animation_enabled(enabled);
        }
    }

    /// Whether the bodies are animating; they always share one state.
    pub fn animation_enabled(&self) -> bool {
        self.bodies.iter().all(CelestialBody::animation_enabled)
    }

    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn handle(&self, id: CelestialBodyId) -> Result<BodyHandle, OrreryError> {
        self.bodies
            .iter()
            .position(|body| body.id() == id)
            .map(BodyHandle)
            .ok_or(OrreryError::CatalogLookup(id))
    }

    pub fn body(&self, id: CelestialBodyId) -> Result<&CelestialBody, OrreryError> {
        let handle = self.handle(id)?;
        Ok(&self.bodies[handle.index()])
    }

    pub fn body_mut(&mut self, id: CelestialBodyId) -> Result<&mut CelestialBody, OrreryError> {
        let handle = self.handle(id)?;
        Ok(&mut self.bodies[handle.index()])
    }

    pub fn light(&self) -> &PointLight {
        &self.light
    }

    /// Uploads the mesh and creates every body's textures and uniforms.
    /// Called at startup and again after the device is recreated.
    pub fn init_gpu_resources(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &BodyBindingLayouts,
    ) -> Result<(), OrreryError> {
        self.mesh.upload(device);
        for body in &mut self.bodies {
            body.init_gpu_resources(device, queue, layouts, &self.texture_dir)?;
        }
        log::info!("Scene GPU resources created from {}", self.texture_dir.display());
        Ok(())
    }

    /// Writes this frame's per-body transforms.
    pub fn prepare(&mut self, queue: &wgpu::Queue) {
        let view_proj = self.camera_manager.get_view_proj_matrix();
        for body in &mut self.bodies {
            body.prepare(queue, view_proj);
        }
    }

    /// Draws every body, star first. The pipeline and group 0 must be bound.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) -> u32 {
        if !render_pass.set_mesh(&self.mesh) {
            log::warn!("Body mesh not uploaded; skipping draw");
            return 0;
        }

        let mut draw_calls = 0;
        for body in &self.bodies {
            if let Some(gpu) = body.gpu_resources() {
                render_pass.draw_body(&self.mesh, gpu);
                draw_calls += 1;
            }
        }
        draw_calls
    }
}
