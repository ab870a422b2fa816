use winit::{
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton},
    keyboard::{KeyCode, PhysicalKey},
};

use super::first_person_camera::FirstPersonCamera;

/// Keyboard movement and drag-to-look for a [`FirstPersonCamera`].
///
/// Input only records intent; [`update_camera`](Self::update_camera) applies
/// it once per frame so motion speed is independent of event rate.
#[derive(Debug, Default)]
pub struct CameraController {
    pub move_speed: f32,
    pub rotate_speed: f32,
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    is_mouse_pressed: bool,
    pending_rotation: (f32, f32),
}

impl CameraController {
    pub fn new(move_speed: f32, rotate_speed: f32) -> Self {
        Self {
            move_speed,
            rotate_speed,
            ..Default::default()
        }
    }

    pub fn process_events(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.is_mouse_pressed {
                self.pending_rotation.0 += delta.0 as f32 * self.rotate_speed;
                self.pending_rotation.1 -= delta.1 as f32 * self.rotate_speed;
            }
        }
    }

    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.is_mouse_pressed = state == ElementState::Pressed;
        }
    }

    /// Returns `true` if the key moves the camera.
    pub fn process_keyed_events(&mut self, event: &KeyEvent) -> bool {
        let PhysicalKey::Code(code) = event.physical_key else {
            return false;
        };
        self.process_key(code, event.state)
    }

    pub(crate) fn process_key(&mut self, code: KeyCode, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;
        let flag = match code {
            KeyCode::KeyW | KeyCode::ArrowUp => &mut self.forward,
            KeyCode::KeyS | KeyCode::ArrowDown => &mut self.backward,
            KeyCode::KeyA | KeyCode::ArrowLeft => &mut self.left,
            KeyCode::KeyD | KeyCode::ArrowRight => &mut self.right,
            KeyCode::KeyE => &mut self.up,
            KeyCode::KeyQ => &mut self.down,
            _ => return false,
        };
        *flag = pressed;
        true
    }

    /// Clears held keys and the drag latch; releases that happen while the
    /// window is unfocused are never delivered.
    pub fn reset(&mut self) {
        let (move_speed, rotate_speed) = (self.move_speed, self.rotate_speed);
        *self = Self::new(move_speed, rotate_speed);
    }

    pub fn update_camera(&mut self, camera: &mut FirstPersonCamera, elapsed_seconds: f32) {
        let axis = |positive: bool, negative: bool| positive as i32 as f32 - negative as i32 as f32;
        let step = self.move_speed * elapsed_seconds;

        camera.move_local(
            axis(self.right, self.left) * step,
            axis(self.up, self.down) * step,
            axis(self.forward, self.backward) * step,
        );

        let (yaw, pitch) = std::mem::take(&mut self.pending_rotation);
        if yaw != 0.0 || pitch != 0.0 {
            camera.rotate(yaw, pitch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CameraConfig, ViewMode};
    use cgmath::Point3;

    fn top_down() -> FirstPersonCamera {
        FirstPersonCamera::new(ViewMode::TopDown.preset(), &CameraConfig::default(), 1.0)
    }

    #[test]
    fn held_key_moves_by_speed_times_time() {
        let mut controller = CameraController::new(100.0, 0.1);
        let mut camera = top_down();
        assert!(controller.process_key(KeyCode::KeyW, ElementState::Pressed));

        controller.update_camera(&mut camera, 0.5);
        assert!((camera.position.y - 2350.0).abs() < 1e-3);

        controller.process_key(KeyCode::KeyW, ElementState::Released);
        controller.update_camera(&mut camera, 0.5);
        assert!((camera.position.y - 2350.0).abs() < 1e-3);
    }

    #[test]
    fn unrelated_keys_are_not_consumed() {
        let mut controller = CameraController::new(100.0, 0.1);
        assert!(!controller.process_key(KeyCode::Space, ElementState::Pressed));
        assert!(!controller.process_key(KeyCode::Tab, ElementState::Pressed));
    }

    #[test]
    fn mouse_motion_rotates_only_while_dragging() {
        let mut controller = CameraController::new(100.0, 0.5);
        let mut camera = top_down();
        let yaw = camera.yaw;

        controller.process_events(&DeviceEvent::MouseMotion { delta: (10.0, 0.0) });
        controller.update_camera(&mut camera, 0.0);
        assert_eq!(camera.yaw, yaw);

        controller.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        controller.process_events(&DeviceEvent::MouseMotion { delta: (10.0, 0.0) });
        controller.update_camera(&mut camera, 0.0);
        assert_eq!(camera.yaw, yaw + 5.0);
        assert_eq!(camera.position, Point3::new(0.0, 2400.0, 0.0));
    }

    #[test]
    fn reset_releases_keys() {
        let mut controller = CameraController::new(100.0, 0.1);
        let mut camera = top_down();
        controller.process_key(KeyCode::KeyE, ElementState::Pressed);
        controller.reset();
        controller.update_camera(&mut camera, 1.0);
        assert_eq!(camera.position, Point3::new(0.0, 2400.0, 0.0));
        assert_eq!(controller.move_speed, 100.0);
    }
}
