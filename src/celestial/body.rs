//! A single animated body: spin, axial tilt, orbit and parent-relative motion.

use std::path::Path;
use std::sync::Arc;

use cgmath::{Deg, Matrix4, Point3, SquareMatrix, Vector3, Zero};

use crate::{
    config::SimulationConfig,
    error::OrreryError,
    gfx::{
        resources::texture_resource::TextureResource,
        scene::object::{BodyBindingLayouts, BodyGpuResources, SurfaceUniform},
    },
};

use super::{
    catalog::{Catalog, CelestialBodyId, CelestialBodyParams},
    light::{LightSlot, PointLight},
};

/// Index of a body inside the scene's body list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) usize);

impl BodyHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Wraps an angle in degrees into `[0, 360)`.
fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// One renderable, animatable body of the solar system.
pub struct CelestialBody {
    id: CelestialBodyId,
    params: Option<CelestialBodyParams>,
    simulation: SimulationConfig,

    /// Spin about the body's own vertical axis, degrees.
    rotation_degrees: f32,
    /// Sweep around the orbit centre, degrees.
    revolution_degrees: f32,
    /// Degrees of spin per real second.
    rotation_rate: f32,
    /// Degrees of orbit per real second.
    revolution_rate: f32,

    animation_enabled: bool,
    world: Matrix4<f32>,

    light: LightSlot,
    parent: Option<BodyHandle>,

    gpu_resources: Option<BodyGpuResources>,
}

impl CelestialBody {
    /// Creates an uninitialized body. The star also creates the scene light,
    /// placed at the origin.
    pub fn new(id: CelestialBodyId, simulation: SimulationConfig) -> Self {
        let light = if id.is_star() {
            let range = simulation.light_range_au * simulation.world_units_per_au;
            LightSlot::Owned(Arc::new(PointLight::new(
                Point3::new(0.0, 0.0, 0.0),
                simulation.light_color,
                range,
            )))
        } else {
            LightSlot::None
        };

        Self {
            id,
            params: None,
            simulation,
            rotation_degrees: 0.0,
            revolution_degrees: 0.0,
            rotation_rate: 0.0,
            revolution_rate: 0.0,
            animation_enabled: true,
            world: Matrix4::identity(),
            light,
            parent: None,
            gpu_resources: None,
        }
    }

    /// Looks up this body's parameters and derives its angular rates.
    pub fn initialize(&mut self, catalog: &Catalog) -> Result<(), OrreryError> {
        let params = catalog.get(self.id)?.clone();

        // Degrees per Earth day, then per real second.
        self.rotation_rate = 360.0 / params.rotation_days / self.simulation.seconds_per_day;

        if !self.id.is_star() && params.revolution_days > 0.0 {
            self.revolution_rate =
                360.0 / params.revolution_days / self.simulation.seconds_per_day;
        }

        log::debug!(
            "{:?}: rotation {:.4} deg/s, revolution {:.4} deg/s",
            self.id,
            self.rotation_rate,
            self.revolution_rate
        );

        self.params = Some(params);
        Ok(())
    }

    /// Advances the animation and recomputes the world transform.
    ///
    /// `parent_position` is the parent's current orbit position; it becomes
    /// the centre of this body's orbit. Does nothing while paused or before
    /// [`initialize`](Self::initialize).
    pub fn update(&mut self, elapsed_seconds: f32, parent_position: Option<Vector3<f32>>) {
        if !self.animation_enabled {
            return;
        }
        let Some(params) = self.params.as_ref() else {
            return;
        };

        self.rotation_degrees =
            wrap_degrees(self.rotation_degrees + self.rotation_rate * elapsed_seconds);
        self.revolution_degrees =
            wrap_degrees(self.revolution_degrees + self.revolution_rate * elapsed_seconds);

        let distance = params.orbital_distance * self.simulation.world_units_per_au;
        let local = Matrix4::from_angle_y(Deg(self.revolution_degrees))
            * Matrix4::from_translation(Vector3::new(distance, 0.0, 0.0))
            * Matrix4::from_angle_z(Deg(params.axial_tilt))
            * Matrix4::from_angle_y(Deg(self.rotation_degrees))
            * Matrix4::from_scale(params.scale);

        // Only the parent's position is inherited, never its tilt or spin.
        self.world = match parent_position {
            Some(offset) => Matrix4::from_translation(offset) * local,
            None => local,
        };
    }

    /// Where this body sits on its orbit, ignoring any parent.
    pub fn orbit_position(&self) -> Vector3<f32> {
        let Some(params) = self.params.as_ref() else {
            return Vector3::zero();
        };
        let distance = params.orbital_distance * self.simulation.world_units_per_au;
        let orbit = Matrix4::from_angle_y(Deg(self.revolution_degrees))
            * Matrix4::from_translation(Vector3::new(distance, 0.0, 0.0));
        orbit.w.truncate()
    }

    pub fn id(&self) -> CelestialBodyId {
        self.id
    }

    /// Catalog entry captured by [`initialize`](Self::initialize).
    pub fn params(&self) -> Result<&CelestialBodyParams, OrreryError> {
        self.params
            .as_ref()
            .ok_or(OrreryError::CatalogLookup(self.id))
    }

    pub fn world_transform(&self) -> Matrix4<f32> {
        self.world
    }

    /// World-space centre of the body.
    pub fn world_position(&self) -> Vector3<f32> {
        self.world.w.truncate()
    }

    pub fn rotation_degrees(&self) -> f32 {
        self.rotation_degrees
    }

    pub fn revolution_degrees(&self) -> f32 {
        self.revolution_degrees
    }

    pub fn rotation_rate(&self) -> f32 {
        self.rotation_rate
    }

    pub fn revolution_rate(&self) -> f32 {
        self.revolution_rate
    }

    pub fn animation_enabled(&self) -> bool {
        self.animation_enabled
    }

    pub fn set_animation_enabled(&mut self, enabled: bool) {
        self.animation_enabled = enabled;
    }

    pub fn toggle_animation(&mut self) {
        self.animation_enabled = !self.animation_enabled;
    }

    /// The light this body owns. Only the star owns one.
    pub fn light(&self) -> Result<&Arc<PointLight>, OrreryError> {
        match &self.light {
            LightSlot::Owned(light) => Ok(light),
            _ => Err(OrreryError::MissingLight(self.id)),
        }
    }

    /// Attaches a read-only handle to a light owned elsewhere.
    pub fn set_light(&mut self, light: Arc<PointLight>) {
        if self.light.is_owned() {
            log::warn!("{:?} owns its light; ignoring shared light", self.id);
            return;
        }
        self.light = LightSlot::Shared(light);
    }

    /// The light that shades this body, owned or shared.
    pub fn shading_light(&self) -> Option<&Arc<PointLight>> {
        self.light.get()
    }

    pub fn set_parent_object(&mut self, parent: BodyHandle) {
        self.parent = Some(parent);
    }

    pub fn parent_object(&self) -> Result<BodyHandle, OrreryError> {
        self.parent.ok_or(OrreryError::MissingParent(self.id))
    }

    pub(crate) fn parent_handle(&self) -> Option<BodyHandle> {
        self.parent
    }

    /// Loads the colour map and creates the per-body uniform buffers.
    ///
    /// Replaces any previous resources, which is how device recovery
    /// rebuilds them.
    pub fn init_gpu_resources(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &BodyBindingLayouts,
        texture_dir: &Path,
    ) -> Result<(), OrreryError> {
        let params = self.params()?;
        let texture_path = texture_dir.join(params.texture);
        let texture =
            TextureResource::from_image_file(device, queue, &texture_path, self.id.name())?;

        let surface = SurfaceUniform::new(
            params.ambient_intensity,
            self.shading_light().map(|light| light.as_ref()),
        );
        self.gpu_resources = Some(BodyGpuResources::new(
            device,
            layouts,
            texture,
            surface,
            self.id.name(),
        ));
        Ok(())
    }

    /// Uploads this frame's world and world-view-projection matrices.
    pub fn prepare(&mut self, queue: &wgpu::Queue, view_proj: Matrix4<f32>) {
        if let Some(gpu) = self.gpu_resources.as_mut() {
            gpu.write_transforms(queue, self.world, view_proj);
        }
    }

    pub fn gpu_resources(&self) -> Option<&BodyGpuResources> {
        self.gpu_resources.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initialized(id: CelestialBodyId) -> CelestialBody {
        let mut body = CelestialBody::new(id, SimulationConfig::default());
        body.initialize(&Catalog::builtin()).unwrap();
        body
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn rates_derive_from_periods_and_day_scale() {
        let catalog = Catalog::builtin();
        let day_scale = SimulationConfig::default().seconds_per_day;
        for id in CelestialBodyId::ALL.into_iter().filter(|id| !id.is_star()) {
            let body = initialized(id);
            let params = catalog.get(id).unwrap();
            assert_eq!(body.rotation_rate(), 360.0 / params.rotation_days / day_scale);
            assert_eq!(body.revolution_rate(), 360.0 / params.revolution_days / day_scale);
        }
    }

    #[test]
    fn star_spins_but_does_not_revolve() {
        let mut sun = initialized(CelestialBodyId::Sun);
        assert_close(sun.rotation_rate(), 28.374);
        assert_eq!(sun.revolution_rate(), 0.0);

        sun.update(0.5, None);
        assert_close(sun.rotation_degrees(), 14.187);
        assert_eq!(sun.revolution_degrees(), 0.0);
        assert_eq!(sun.world_position(), Vector3::zero());
    }

    #[test]
    fn rotation_wraps_past_full_turn() {
        let mut body = initialized(CelestialBodyId::Earth);
        body.rotation_degrees = 359.0;
        body.rotation_rate = 10.0;
        body.revolution_rate = 0.0;

        body.update(1.0, None);
        assert_close(body.rotation_degrees(), 9.0);
    }

    #[test]
    fn angles_stay_in_range_for_large_steps() {
        let mut body = initialized(CelestialBodyId::Jupiter);
        for elapsed in [0.0, 0.016, 1.0, 37.5, 1000.0, 123_456.0] {
            body.update(elapsed, None);
            assert!((0.0..360.0).contains(&body.rotation_degrees()));
            assert!((0.0..360.0).contains(&body.revolution_degrees()));
        }
    }

    #[test]
    fn multi_wrap_lands_on_remainder() {
        let mut body = initialized(CelestialBodyId::Mars);
        body.rotation_rate = 1000.0;
        body.revolution_rate = 0.0;

        body.update(1.0, None);
        assert_close(body.rotation_degrees(), 280.0);
    }

    #[test]
    fn paused_body_does_not_move() {
        let mut body = initialized(CelestialBodyId::Venus);
        body.update(3.0, None);
        let (rotation, revolution, world) =
            (body.rotation_degrees(), body.revolution_degrees(), body.world_transform());

        body.set_animation_enabled(false);
        for _ in 0..10 {
            body.update(5.0, Some(Vector3::new(1.0, 2.0, 3.0)));
        }
        assert_eq!(body.rotation_degrees(), rotation);
        assert_eq!(body.revolution_degrees(), revolution);
        assert_eq!(body.world_transform(), world);

        body.toggle_animation();
        assert!(body.animation_enabled());
        body.update(1.0, None);
        assert_ne!(body.rotation_degrees(), rotation);
    }

    #[test]
    fn animation_starts_enabled_and_toggles() {
        let mut body = CelestialBody::new(CelestialBodyId::Moon, SimulationConfig::default());
        assert!(body.animation_enabled());
        body.toggle_animation();
        assert!(!body.animation_enabled());
        body.toggle_animation();
        assert!(body.animation_enabled());
    }

    #[test]
    fn world_transform_places_body_on_orbit() {
        let mut earth = initialized(CelestialBodyId::Earth);
        earth.rotation_rate = 0.0;
        earth.revolution_rate = 0.0;
        earth.update(1.0, None);

        let position = earth.world_position();
        assert_close(position.x, 300.0);
        assert_close(position.y, 0.0);
        assert_close(position.z, 0.0);
    }

    #[test]
    fn world_transform_applies_scale_before_tilt() {
        let mut saturn = initialized(CelestialBodyId::Saturn);
        saturn.rotation_rate = 0.0;
        saturn.revolution_rate = 0.0;
        saturn.update(0.0, None);

        // The local +Y pole is tilted about Z and scaled, but not translated.
        let pole = saturn.world_transform() * cgmath::Vector4::new(0.0, 1.0, 0.0, 0.0);
        let tilt = 26.73_f32.to_radians();
        assert_close(pole.x, -tilt.sin() * 9.26);
        assert_close(pole.y, tilt.cos() * 9.26);
    }

    #[test]
    fn child_orbit_centre_follows_parent_position_only() {
        let mut earth = initialized(CelestialBodyId::Earth);
        earth.revolution_degrees = 90.0;
        earth.rotation_degrees = 123.0;
        let earth_distance = 1.0 * SimulationConfig::default().world_units_per_au;

        let expected = (Matrix4::from_angle_y(Deg(90.0))
            * Matrix4::from_translation(Vector3::new(earth_distance, 0.0, 0.0)))
        .w
        .truncate();
        let anchor = earth.orbit_position();
        assert_close(anchor.x, expected.x);
        assert_close(anchor.y, expected.y);
        assert_close(anchor.z, expected.z);

        let mut moon = initialized(CelestialBodyId::Moon);
        moon.rotation_rate = 0.0;
        moon.revolution_rate = 0.0;
        moon.update(0.0, Some(anchor));

        let offset = moon.world_position() - moon.orbit_position();
        assert_close(offset.x, expected.x);
        assert_close(offset.y, expected.y);
        assert_close(offset.z, expected.z);

        // Changing the parent's spin leaves the anchor untouched.
        earth.rotation_degrees = 300.0;
        assert_eq!(earth.orbit_position(), anchor);
    }

    #[test]
    fn only_star_owns_a_light() {
        let sun = initialized(CelestialBodyId::Sun);
        let light = sun.light().unwrap().clone();
        assert_eq!(light.radius, 50.0 * 300.0);
        assert_eq!(light.position, Point3::new(0.0, 0.0, 0.0));

        let mut earth = initialized(CelestialBodyId::Earth);
        assert!(matches!(
            earth.light(),
            Err(OrreryError::MissingLight(CelestialBodyId::Earth))
        ));

        earth.set_light(light.clone());
        assert!(earth.light().is_err());
        assert!(Arc::ptr_eq(earth.shading_light().unwrap(), &light));
    }

    #[test]
    fn star_keeps_its_own_light() {
        let mut sun = initialized(CelestialBodyId::Sun);
        let own = sun.light().unwrap().clone();
        let other = Arc::new(PointLight::new(Point3::new(1.0, 1.0, 1.0), [0.5; 3], 1.0));
        sun.set_light(other);
        assert!(Arc::ptr_eq(sun.light().unwrap(), &own));
    }

    #[test]
    fn parent_lookup_fails_until_set() {
        let mut moon = initialized(CelestialBodyId::Moon);
        assert!(matches!(
            moon.parent_object(),
            Err(OrreryError::MissingParent(CelestialBodyId::Moon))
        ));
        moon.set_parent_object(BodyHandle(3));
        assert_eq!(moon.parent_object().unwrap(), BodyHandle(3));
    }

    #[test]
    fn initialize_fails_without_catalog_entry() {
        let mut body = CelestialBody::new(CelestialBodyId::Neptune, SimulationConfig::default());
        let catalog = Catalog::from_entries(std::iter::empty());
        assert!(matches!(
            body.initialize(&catalog),
            Err(OrreryError::CatalogLookup(CelestialBodyId::Neptune))
        ));
        assert!(body.params().is_err());
    }

    #[test]
    fn uninitialized_body_ignores_updates() {
        let mut body = CelestialBody::new(CelestialBodyId::Pluto, SimulationConfig::default());
        body.update(10.0, None);
        assert_eq!(body.rotation_degrees(), 0.0);
        assert_eq!(body.world_transform(), Matrix4::identity());
    }
}
