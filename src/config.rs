//! Startup configuration with defaults and RON persistence.
//!
//! The configuration is read once before the window opens and is never
//! mutated while the orrery runs. CLI flags are layered on top of the file.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrreryConfig {
    /// Window settings.
    pub window: WindowConfig,
    /// Time and distance scaling of the simulation.
    pub simulation: SimulationConfig,
    /// Camera preset and controls.
    pub camera: CameraConfig,
    /// Texture and mesh locations.
    pub assets: AssetConfig,
    /// Start with every body paused.
    pub start_paused: bool,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Window title.
    pub title: String,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Solar System".to_string(),
            vsync: true,
        }
    }
}

impl WindowConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window.width/height",
                reason: format!("must be non-zero, got {}x{}", self.width, self.height),
            });
        }
        Ok(())
    }
}

/// Scaling between simulated and real units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Real seconds that elapse for one simulated Earth day.
    pub seconds_per_day: f32,
    /// World-space distance of one astronomical unit.
    pub world_units_per_au: f32,
    /// Reach of the star's light, in astronomical units.
    pub light_range_au: f32,
    /// Linear RGB colour of the star's light.
    pub light_color: [f32; 3],
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seconds_per_day: 0.5,
            world_units_per_au: 300.0,
            light_range_au: 50.0,
            light_color: [1.0, 1.0, 1.0],
        }
    }
}

impl SimulationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.seconds_per_day > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "simulation.seconds_per_day",
                reason: format!("must be positive, got {}", self.seconds_per_day),
            });
        }
        if !(self.world_units_per_au > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "simulation.world_units_per_au",
                reason: format!("must be positive, got {}", self.world_units_per_au),
            });
        }
        Ok(())
    }
}

/// Named camera presets.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum ViewMode {
    /// Looks across the orbital plane from above and to the side.
    #[default]
    Oblique,
    /// Looks straight down onto the orbital plane.
    TopDown,
}

impl ViewMode {
    pub fn next(self) -> Self {
        match self {
            ViewMode::Oblique => ViewMode::TopDown,
            ViewMode::TopDown => ViewMode::Oblique,
        }
    }

    /// Starting camera position and orientation for this preset.
    pub fn preset(self) -> CameraPreset {
        match self {
            ViewMode::Oblique => CameraPreset {
                position: [-1200.0, 100.0, 1200.0],
                yaw_degrees: 50.0,
                pitch_degrees: 0.0,
            },
            ViewMode::TopDown => CameraPreset {
                position: [0.0, 2400.0, 0.0],
                yaw_degrees: 0.0,
                pitch_degrees: -90.0,
            },
        }
    }
}

/// A camera placement: world position plus yaw/pitch in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPreset {
    pub position: [f32; 3],
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial preset.
    pub view_mode: ViewMode,
    /// Movement speed in world units per second.
    pub move_speed: f32,
    /// Mouse-look sensitivity in degrees per pixel.
    pub rotate_speed: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::default(),
            move_speed: 400.0,
            rotate_speed: 0.15,
            fov_degrees: 45.0,
            znear: 1.0,
            zfar: 50_000.0,
        }
    }
}

impl CameraConfig {
    /// Rejects projections the perspective matrix cannot be built from.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.znear > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "camera.znear",
                reason: format!("must be positive, got {}", self.znear),
            });
        }
        if !(self.zfar > self.znear) {
            return Err(ConfigError::InvalidValue {
                field: "camera.zfar",
                reason: format!("must exceed znear ({}), got {}", self.znear, self.zfar),
            });
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::InvalidValue {
                field: "camera.fov_degrees",
                reason: format!("must be within (0, 180), got {}", self.fov_degrees),
            });
        }
        Ok(())
    }
}

/// Asset locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding the per-body colour maps.
    pub texture_dir: PathBuf,
    /// Optional OBJ sphere; a UV sphere is generated when absent.
    pub sphere_mesh: Option<PathBuf>,
    /// Longitude segments of the generated sphere (latitude uses half).
    pub sphere_segments: u32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            texture_dir: PathBuf::from("assets/textures"),
            sphere_mesh: None,
            sphere_segments: 64,
        }
    }
}

impl OrreryConfig {
    /// Load configuration from a RON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Self = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window.validate()?;
        self.simulation.validate()?;
        self.camera.validate()
    }

    /// Save configuration to a RON file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(ConfigError::WriteError)?;
            }
        }
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(ConfigError::SerializeError)?;
        std::fs::write(path, contents).map_err(ConfigError::WriteError)
    }

    /// Resolve the final configuration from command-line arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::load(path)?
            }
            None => Self::default(),
        };
        cli.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }
}

/// Command-line arguments.
#[derive(Debug, Default, Parser)]
#[command(name = "orrery", about = "Real-time 3D solar system")]
pub struct Cli {
    /// Path to a RON config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Camera preset to start with.
    #[arg(long, value_enum)]
    pub view_mode: Option<ViewMode>,

    /// Start with animation paused.
    #[arg(long)]
    pub paused: bool,

    /// Directory holding the body textures.
    #[arg(long)]
    pub texture_dir: Option<PathBuf>,

    /// Write the default configuration to this path and exit.
    #[arg(long)]
    pub write_default_config: Option<PathBuf>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut OrreryConfig) {
        if let Some(view_mode) = self.view_mode {
            config.camera.view_mode = view_mode;
        }
        if self.paused {
            config.start_paused = true;
        }
        if let Some(dir) = &self.texture_dir {
            config.assets.texture_dir = dir.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = OrreryConfig::default();
        assert_eq!(config.simulation.seconds_per_day, 0.5);
        assert_eq!(config.simulation.world_units_per_au, 300.0);
        assert_eq!(config.simulation.light_range_au, 50.0);
        assert_eq!(config.camera.view_mode, ViewMode::Oblique);
        assert!(!config.start_paused);
    }

    #[test]
    fn presets_match_view_modes() {
        let oblique = ViewMode::Oblique.preset();
        assert_eq!(oblique.position, [-1200.0, 100.0, 1200.0]);
        assert_eq!(oblique.yaw_degrees, 50.0);

        let top_down = ViewMode::TopDown.preset();
        assert_eq!(top_down.position, [0.0, 2400.0, 0.0]);
        assert_eq!(top_down.pitch_degrees, -90.0);

        assert_eq!(ViewMode::Oblique.next(), ViewMode::TopDown);
        assert_eq!(ViewMode::TopDown.next(), ViewMode::Oblique);
    }

    #[test]
    fn save_then_load_preserves_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("orrery.ron");

        let mut config = OrreryConfig::default();
        config.camera.view_mode = ViewMode::TopDown;
        config.simulation.seconds_per_day = 2.0;
        config.assets.sphere_mesh = Some(PathBuf::from("models/sphere.obj"));
        config.save(&path).unwrap();

        let loaded = OrreryConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.ron");
        std::fs::write(&path, "(camera: (view_mode: TopDown))").unwrap();

        let loaded = OrreryConfig::load(&path).unwrap();
        assert_eq!(loaded.camera.view_mode, ViewMode::TopDown);
        assert_eq!(loaded.simulation, SimulationConfig::default());
    }

    #[test]
    fn rejects_non_positive_day_scale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ron");
        std::fs::write(&path, "(simulation: (seconds_per_day: 0.0))").unwrap();

        let err = OrreryConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn rejects_projections_that_cannot_be_built() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            ("(camera: (znear: 0.0))", "camera.znear"),
            ("(camera: (znear: 10.0, zfar: 5.0))", "camera.zfar"),
            ("(camera: (fov_degrees: 0.0))", "camera.fov_degrees"),
            ("(camera: (fov_degrees: 180.0))", "camera.fov_degrees"),
            ("(window: (width: 0))", "window.width/height"),
        ];

        for (index, (contents, expected_field)) in cases.into_iter().enumerate() {
            let path = dir.path().join(format!("bad_{index}.ron"));
            std::fs::write(&path, contents).unwrap();
            match OrreryConfig::load(&path) {
                Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("{contents}: expected InvalidValue, got {other:?}"),
            }
        }
    }

    #[test]
    fn cli_config_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("near.ron");
        std::fs::write(&path, "(camera: (znear: -1.0))").unwrap();

        let cli = Cli {
            config: Some(path),
            ..Default::default()
        };
        let err = OrreryConfig::from_cli(&cli).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "camera.znear", .. }));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = OrreryConfig::load(Path::new("/nonexistent/orrery.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }

    #[test]
    fn cli_overrides_file_values() {
        let cli = Cli::parse_from([
            "orrery",
            "--view-mode",
            "top-down",
            "--paused",
            "--texture-dir",
            "textures",
        ]);
        let config = OrreryConfig::from_cli(&cli).unwrap();
        assert_eq!(config.camera.view_mode, ViewMode::TopDown);
        assert!(config.start_paused);
        assert_eq!(config.assets.texture_dir, PathBuf::from("textures"));
    }
}
