use std::f32::consts::PI;

use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::orbit_camera::OrbitCamera;

/// Pixels per wheel "line" when a trackpad reports pixel deltas
const PIXELS_PER_LINE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    None,
    Rotate,
    Pan,
}

/// Orbit-style mouse controls: left drag rotates, right (or shift + left) drag
/// pans and the wheel dollies.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    drag: DragMode,
    is_shift_held: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32, pan_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed,
            drag: DragMode::None,
            is_shift_held: false,
            last_cursor: None,
        }
    }

    /// Radius multiplier for one wheel step towards the target
    pub fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    pub fn process_events(
        &mut self,
        event: &WindowEvent,
        viewport_height: f32,
        camera: &mut OrbitCamera,
    ) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                self.drag = match (pressed, button) {
                    (false, _) => DragMode::None,
                    (true, MouseButton::Left) if self.is_shift_held => DragMode::Pan,
                    (true, MouseButton::Left) => DragMode::Rotate,
                    (true, MouseButton::Right) => DragMode::Pan,
                    (true, _) => self.drag,
                };
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let previous = self.last_cursor.replace(*position);
                let Some(previous) = previous else {
                    return false;
                };
                let dx = (position.x - previous.x) as f32;
                let dy = (position.y - previous.y) as f32;
                self.apply_drag(dx, dy, viewport_height, camera)
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
                };
                if steps != 0.0 {
                    // Scrolling up moves towards the target
                    camera.dolly(self.zoom_scale().powf(steps));
                }
                true
            }
            _ => false,
        }
    }

    /// Applies a cursor movement in pixels according to the current drag mode
    pub fn apply_drag(
        &mut self,
        dx: f32,
        dy: f32,
        viewport_height: f32,
        camera: &mut OrbitCamera,
    ) -> bool {
        if viewport_height <= 0.0 {
            return false;
        }
        match self.drag {
            DragMode::None => false,
            DragMode::Rotate => {
                camera.rotate_left(2.0 * PI * dx / viewport_height * self.rotate_speed);
                camera.rotate_up(2.0 * PI * dy / viewport_height * self.rotate_speed);
                true
            }
            DragMode::Pan => {
                camera.pan(dx * self.pan_speed, dy * self.pan_speed, viewport_height);
                true
            }
        }
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent, camera: &mut OrbitCamera) {
        match event {
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight),
                state,
                ..
            } => {
                self.is_shift_held = *state == ElementState::Pressed;
            }
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::KeyC),
                state: ElementState::Pressed,
                ..
            } => {
                if self.is_shift_held {
                    log::info!("Resetting camera to its start position");
                    camera.reset_to_default();
                }
            }
            _ => (),
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.drag == DragMode::Rotate
    }

    pub fn is_panning(&self) -> bool {
        self.drag == DragMode::Pan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    #[test]
    fn full_viewport_drag_is_one_turn() {
        let mut camera = OrbitCamera::from_config(&CameraConfig::default(), 1.5);
        camera.enable_damping = false;
        let start = camera.spherical().theta;

        let mut controller = CameraController::new(1.0, 1.0, 1.0);
        controller.drag = DragMode::Rotate;
        // A quarter of the viewport height is a quarter turn
        assert!(controller.apply_drag(200.0, 0.0, 800.0, &mut camera));
        camera.update();
        let turned = start - camera.spherical().theta;
        assert!((turned - PI / 2.0).abs() < 1e-4, "turned {turned}");
    }

    #[test]
    fn no_drag_means_no_input() {
        let mut camera = OrbitCamera::from_config(&CameraConfig::default(), 1.5);
        let mut controller = CameraController::new(1.0, 1.0, 1.0);
        assert!(!controller.apply_drag(50.0, 50.0, 800.0, &mut camera));
        assert!(!controller.is_rotating() && !controller.is_panning());
    }

    #[test]
    fn zoom_scale_follows_speed() {
        assert!((CameraController::new(1.0, 1.0, 1.0).zoom_scale() - 0.95).abs() < 1e-6);
        assert!((CameraController::new(1.0, 2.0, 1.0).zoom_scale() - 0.9025).abs() < 1e-6);
    }
}
