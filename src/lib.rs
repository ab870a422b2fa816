//! Orrery
//!
//! A real-time 3D solar system built on wgpu and winit: the Sun, eight
//! planets, Pluto and the Moon, textured, lit by the Sun and animated at a
//! configurable time scale.

pub mod app;
pub mod celestial;
pub mod config;
pub mod error;
pub mod gfx;
pub mod performance;
pub mod render_loop;
pub mod ui;
pub mod wgpu_utils;

pub use app::OrreryApp;
pub use config::OrreryConfig;
pub use error::OrreryError;
