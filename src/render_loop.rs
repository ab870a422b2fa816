//! Per-frame driver: advance the scene, render, recover from device loss.

use std::time::Duration;

use crate::{
    error::OrreryError,
    gfx::scene::scene::SolarScene,
    performance::PerformanceMonitor,
    ui::Overlay,
};

/// What the renderer must provide to the frame loop.
pub trait RenderBackend {
    /// Clears, draws every body, draws `overlay` and presents. Returns
    /// `false` if no surface texture was available and the frame was skipped.
    fn render_frame(
        &mut self,
        scene: &mut SolarScene,
        overlay: &Overlay,
    ) -> Result<bool, OrreryError>;

    /// Recreates the device and every device-dependent resource, including
    /// the scene's.
    fn rebuild_device_resources(&mut self, scene: &mut SolarScene) -> Result<(), OrreryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    /// The surface had no texture ready; nothing was shown.
    Skipped,
    /// The device was lost and has been rebuilt; nothing was shown.
    Recovered,
    ExitRequested,
}

#[derive(Default)]
pub struct RenderLoop {
    monitor: PerformanceMonitor,
    exit_requested: bool,
    frames_presented: u64,
    recoveries: u32,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latches an exit request; it takes effect at the next frame boundary.
    pub fn request_exit(&mut self) {
        if !self.exit_requested {
            log::info!("Exit requested");
        }
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn recoveries(&self) -> u32 {
        self.recoveries
    }

    /// Runs one frame. Only [`OrreryError::DeviceLost`] is handled here;
    /// every other error is returned and should end the run.
    pub fn frame<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        scene: &mut SolarScene,
        elapsed: Duration,
    ) -> Result<FrameOutcome, OrreryError> {
        if self.exit_requested {
            return Ok(FrameOutcome::ExitRequested);
        }

        self.monitor.record_frame(elapsed);
        scene.update(elapsed.as_secs_f32());

        let overlay = Overlay::new(
            self.monitor.get_metrics(),
            scene.camera_manager.view_mode(),
            scene.animation_enabled(),
        );

        match backend.render_frame(scene, &overlay) {
            Ok(true) => {
                self.frames_presented += 1;
                Ok(FrameOutcome::Presented)
            }
            Ok(false) => Ok(FrameOutcome::Skipped),
            Err(err) if err.is_recoverable() => {
                log::warn!("Rendering device lost; rebuilding device resources");
                backend.rebuild_device_resources(scene)?;
                self.recoveries += 1;
                log::info!("Device resources rebuilt (recovery #{})", self.recoveries);
                Ok(FrameOutcome::Recovered)
            }
            Err(err) => {
                log::error!("Fatal rendering error: {}", err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        celestial::{Catalog, CelestialBodyId},
        config::OrreryConfig,
        ui::overlay::TOGGLE_ANIMATION_HELP,
    };
    use std::collections::VecDeque;

    #[derive(Default)]
    struct MockBackend {
        results: VecDeque<Result<bool, OrreryError>>,
        rebuild_result: Option<OrreryError>,
        frames: u32,
        rebuilds: u32,
        last_overlay: Option<Overlay>,
    }

    impl MockBackend {
        fn scripted(results: impl IntoIterator<Item = Result<bool, OrreryError>>) -> Self {
            Self {
                results: results.into_iter().collect(),
                ..Default::default()
            }
        }
    }

    impl RenderBackend for MockBackend {
        fn render_frame(
            &mut self,
            _scene: &mut SolarScene,
            overlay: &Overlay,
        ) -> Result<bool, OrreryError> {
            self.frames += 1;
            self.last_overlay = Some(overlay.clone());
            self.results.pop_front().unwrap_or(Ok(true))
        }

        fn rebuild_device_resources(
            &mut self,
            _scene: &mut SolarScene,
        ) -> Result<(), OrreryError> {
            self.rebuilds += 1;
            match self.rebuild_result.take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    fn scene() -> SolarScene {
        SolarScene::new(&OrreryConfig::default(), &Catalog::builtin(), 1.0).unwrap()
    }

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn presents_and_advances_scene() {
        let mut scene = scene();
        let mut backend = MockBackend::default();
        let mut render_loop = RenderLoop::new();

        let before = scene.body(CelestialBodyId::Earth).unwrap().world_transform();
        let outcome = render_loop.frame(&mut backend, &mut scene, FRAME).unwrap();

        assert_eq!(outcome, FrameOutcome::Presented);
        assert_eq!(render_loop.frames_presented(), 1);
        assert_ne!(scene.body(CelestialBodyId::Earth).unwrap().world_transform(), before);
    }

    #[test]
    fn device_loss_rebuilds_and_keeps_running() {
        let mut scene = scene();
        let mut backend =
            MockBackend::scripted([Ok(true), Err(OrreryError::DeviceLost), Ok(true), Ok(true)]);
        let mut render_loop = RenderLoop::new();

        let outcomes: Vec<_> = (0..4)
            .map(|_| render_loop.frame(&mut backend, &mut scene, FRAME).unwrap())
            .collect();

        assert_eq!(
            outcomes,
            vec![
                FrameOutcome::Presented,
                FrameOutcome::Recovered,
                FrameOutcome::Presented,
                FrameOutcome::Presented
            ]
        );
        assert_eq!(backend.rebuilds, 1);
        assert_eq!(render_loop.recoveries(), 1);
        assert_eq!(render_loop.frames_presented(), 3);
    }

    #[test]
    fn skipped_frames_are_not_counted_as_presented() {
        let mut scene = scene();
        let mut backend = MockBackend::scripted([Ok(false), Ok(true)]);
        let mut render_loop = RenderLoop::new();

        let first = render_loop.frame(&mut backend, &mut scene, FRAME).unwrap();
        let second = render_loop.frame(&mut backend, &mut scene, FRAME).unwrap();

        assert_eq!(first, FrameOutcome::Skipped);
        assert_eq!(second, FrameOutcome::Presented);
        assert_eq!(render_loop.frames_presented(), 1);
        assert_eq!(backend.rebuilds, 0);
    }

    #[test]
    fn other_presentation_failures_are_fatal() {
        let mut scene = scene();
        let mut backend =
            MockBackend::scripted([Err(OrreryError::Presentation("out of memory".into()))]);
        let mut render_loop = RenderLoop::new();

        let err = render_loop.frame(&mut backend, &mut scene, FRAME).unwrap_err();
        assert!(matches!(err, OrreryError::Presentation(_)));
        assert_eq!(backend.rebuilds, 0);
    }

    #[test]
    fn failed_rebuild_is_fatal() {
        let mut scene = scene();
        let mut backend = MockBackend::scripted([Err(OrreryError::DeviceLost)]);
        backend.rebuild_result = Some(OrreryError::resource("adapter", "none available"));
        let mut render_loop = RenderLoop::new();

        let err = render_loop.frame(&mut backend, &mut scene, FRAME).unwrap_err();
        assert!(matches!(err, OrreryError::ResourceCreation { .. }));
    }

    #[test]
    fn exit_is_honoured_at_next_frame() {
        let mut scene = scene();
        let mut backend = MockBackend::default();
        let mut render_loop = RenderLoop::new();

        render_loop.frame(&mut backend, &mut scene, FRAME).unwrap();
        render_loop.request_exit();
        render_loop.request_exit();
        assert!(render_loop.exit_requested());

        let earth = scene.body(CelestialBodyId::Earth).unwrap().world_transform();
        let outcome = render_loop.frame(&mut backend, &mut scene, FRAME).unwrap();
        assert_eq!(outcome, FrameOutcome::ExitRequested);
        assert_eq!(backend.frames, 1);
        assert_eq!(scene.body(CelestialBodyId::Earth).unwrap().world_transform(), earth);
    }

    #[test]
    fn overlay_carries_fps_and_help_text() {
        let mut scene = scene();
        let mut backend = MockBackend::default();
        let mut render_loop = RenderLoop::new();

        render_loop.frame(&mut backend, &mut scene, FRAME).unwrap();
        let overlay = backend.last_overlay.take().unwrap();
        assert!(overlay.lines[0].starts_with("FPS: "));
        assert!(overlay.lines.iter().any(|line| line == TOGGLE_ANIMATION_HELP));

        scene.toggle_animation();
        render_loop.frame(&mut backend, &mut scene, FRAME).unwrap();
        let overlay = backend.last_overlay.take().unwrap();
        assert_eq!(overlay.lines.last().map(String::as_str), Some("Paused"));
    }
}
