//! Text overlay drawn over the scene every frame.

use crate::{config::ViewMode, performance::PerformanceMetrics};

pub const TOGGLE_ANIMATION_HELP: &str = "Toggle Animation (Space)";

/// Lines of text shown in the top-left corner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub lines: Vec<String>,
}

impl Overlay {
    pub fn new(metrics: &PerformanceMetrics, view_mode: ViewMode, animating: bool) -> Self {
        let mut lines = vec![
            format!("FPS: {:.0}", metrics.fps),
            TOGGLE_ANIMATION_HELP.to_string(),
            format!("Camera: {:?} (Tab)", view_mode),
        ];
        if !animating {
            lines.push("Paused".to_string());
        }
        Self { lines }
    }

    pub fn render(&self, ui: &imgui::Ui) {
        ui.window("Overlay")
            .position([10.0, 10.0], imgui::Condition::Always)
            .always_auto_resize(true)
            .no_decoration()
            .no_inputs()
            .bg_alpha(0.3)
            .build(|| {
                for line in &self.lines {
                    ui.text(line);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shows_fps_and_help() {
        let metrics = PerformanceMetrics {
            fps: 59.6,
            ..Default::default()
        };
        let overlay = Overlay::new(&metrics, ViewMode::Oblique, true);
        assert_eq!(overlay.lines[0], "FPS: 60");
        assert_eq!(overlay.lines[1], TOGGLE_ANIMATION_HELP);
        assert_eq!(overlay.lines[2], "Camera: Oblique (Tab)");
        assert_eq!(overlay.lines.len(), 3);
    }

    #[test]
    fn paused_state_is_reported() {
        let overlay = Overlay::new(&PerformanceMetrics::default(), ViewMode::TopDown, false);
        assert_eq!(overlay.lines.last().map(String::as_str), Some("Paused"));
    }
}
