use std::f32::consts::PI;

use cgmath::*;

use super::camera_utils::{Camera, CameraUniform, OPENGL_TO_WGPU_MATRIX};
use crate::config::CameraConfig;

/// Keeps the camera off the poles, where the view basis degenerates
const POLAR_EPSILON: f32 = 0.000001;

/// Perspective camera orbiting a target, with damped rotation and panning.
///
/// Input is accumulated as spherical and pan deltas; [`OrbitCamera::update`]
/// applies a `damping_factor` share of what is pending each frame and lets the
/// rest decay, so the camera keeps gliding briefly after the mouse stops.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub bounds: OrbitCameraBounds,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub uniform: CameraUniform,
    home: (Point3<f32>, Point3<f32>),
    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vector3<f32>,
}

/// Polar angle `phi` is measured from +Y, azimuth `theta` from +Z towards +X
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl OrbitCamera {
    pub fn new(eye: Point3<f32>, target: Point3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            eye,
            target,
            up: Vector3::unit_y(),
            aspect,
            fovy: Deg(75.0).into(),
            znear: 0.1,
            zfar: 100.0,
            bounds: OrbitCameraBounds::default(),
            enable_damping: true,
            damping_factor: 0.05,
            uniform: CameraUniform::default(),
            home: (eye, target),
            spherical_delta: Spherical::default(),
            scale: 1.0,
            pan_offset: Vector3::zero(),
        };
        camera.update_view_proj();
        camera
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let [ex, ey, ez] = config.position;
        let [tx, ty, tz] = config.target;
        let mut camera = Self::new(Point3::new(ex, ey, ez), Point3::new(tx, ty, tz), aspect);
        camera.fovy = Deg(config.fov).into();
        camera.znear = config.near;
        camera.zfar = config.far;
        camera.damping_factor = config.damping_factor;
        camera.update_view_proj();
        camera
    }

    /// Returns to the position and target the camera was created with
    pub fn reset_to_default(&mut self) {
        (self.eye, self.target) = self.home;
        self.spherical_delta = Spherical::default();
        self.scale = 1.0;
        self.pan_offset = Vector3::zero();
    }

    pub fn spherical(&self) -> Spherical {
        Spherical::from_offset(self.eye - self.target)
    }

    /// Positive angles orbit the camera to the right around the target
    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    /// Positive angles move the camera towards the top pole
    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Multiplies the orbit radius by `factor` on the next update
    pub fn dolly(&mut self, factor: f32) {
        self.scale *= factor;
    }

    /// Screen-space pan by a pixel delta, scaled so the target plane follows the cursor
    pub fn pan(&mut self, delta_x: f32, delta_y: f32, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let view = self.view_matrix();
        // Rows of the view rotation are the camera's right and up axes in world space
        let right = Vector3::new(view.x.x, view.y.x, view.z.x);
        let up = Vector3::new(view.x.y, view.y.y, view.z.y);

        let target_distance = (self.eye - self.target).magnitude() * (self.fovy.0 / 2.0).tan();
        let left = 2.0 * delta_x * target_distance / viewport_height;
        let upward = 2.0 * delta_y * target_distance / viewport_height;
        self.pan_offset += right * -left + up * upward;
    }

    /// Applies pending input. Returns true while the camera is still moving.
    pub fn update(&mut self) -> bool {
        let mut spherical = self.spherical();
        let damping = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        spherical.theta += self.spherical_delta.theta * damping;
        spherical.phi += self.spherical_delta.phi * damping;
        spherical.phi = spherical
            .phi
            .clamp(self.bounds.min_polar_angle, self.bounds.max_polar_angle)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        spherical.radius = (spherical.radius * self.scale)
            .clamp(self.bounds.min_distance, self.bounds.max_distance);

        let pan = self.pan_offset * damping;
        self.target += pan;
        let old_eye = self.eye;
        self.eye = self.target + spherical.to_offset();

        if self.enable_damping {
            self.spherical_delta.theta *= 1.0 - self.damping_factor;
            self.spherical_delta.phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;

        (self.eye - old_eye).magnitude2() > 1e-8 || pan.magnitude2() > 1e-8
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = self.build_view_projection_matrix().into();
        self.uniform.view = self.view_matrix().into();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::from_config(&CameraConfig::default(), 1.5)
    }

    #[test]
    fn starts_at_the_configured_eye() {
        let camera = camera();
        assert_eq!(camera.eye, Point3::new(4.0, 2.0, 5.0));
        assert_eq!(camera.uniform.view_position, [4.0, 2.0, 5.0, 1.0]);
        let view_dir = camera.view_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        // The origin sits straight ahead on -Z in view space
        assert!(view_dir.x.abs() < 1e-5 && view_dir.y.abs() < 1e-5 && view_dir.z < 0.0);
    }

    #[test]
    fn spherical_round_trips_the_offset() {
        let offset = Vector3::new(4.0, 2.0, 5.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).magnitude() < 1e-5);
    }

    #[test]
    fn damping_spreads_a_rotation_over_many_frames() {
        let mut camera = camera();
        let start = camera.spherical().theta;
        camera.rotate_left(0.5);
        camera.update();
        let first_step = start - camera.spherical().theta;
        assert!((first_step - 0.5 * 0.05).abs() < 1e-4);

        for _ in 0..400 {
            camera.update();
        }
        // The geometric series of damped steps converges on the full angle
        let total = start - camera.spherical().theta;
        assert!((total - 0.5).abs() < 1e-3, "total {total}");
        assert!(!camera.update());
    }

    #[test]
    fn without_damping_input_is_applied_at_once() {
        let mut camera = camera();
        camera.enable_damping = false;
        let start = camera.spherical().phi;
        camera.rotate_up(0.2);
        assert!(camera.update());
        assert!((start - camera.spherical().phi - 0.2).abs() < 1e-4);
        assert!(!camera.update());
    }

    #[test]
    fn polar_angle_never_reaches_the_pole() {
        let mut camera = camera();
        camera.enable_damping = false;
        camera.rotate_up(10.0);
        camera.update();
        assert!(camera.spherical().phi < 0.01);
        assert!(camera.eye.y > camera.target.y);
        assert!(camera.view_matrix().x.x.is_finite());
    }

    #[test]
    fn dolly_scales_distance_within_bounds() {
        let mut camera = camera();
        let radius = camera.spherical().radius;
        camera.dolly(0.95);
        camera.update();
        assert!((camera.spherical().radius - radius * 0.95).abs() < 1e-4);

        camera.bounds.max_distance = 8.0;
        camera.dolly(10.0);
        camera.update();
        assert!((camera.spherical().radius - 8.0).abs() < 1e-4);
    }

    #[test]
    fn pan_moves_eye_and_target_together() {
        let mut camera = camera();
        camera.enable_damping = false;
        let offset = camera.eye - camera.target;
        camera.pan(100.0, 0.0, 800.0);
        camera.update();
        assert!(camera.target != Point3::new(0.0, 0.0, 0.0));
        assert!(((camera.eye - camera.target) - offset).magnitude() < 1e-4);
        // Dragging right moves the scene right, so the camera slides left
        let right = camera.view_matrix().x.x * camera.target.x
            + camera.view_matrix().y.x * camera.target.y
            + camera.view_matrix().z.x * camera.target.z;
        assert!(right < 0.0);
    }

    #[test]
    fn reset_restores_home() {
        let mut camera = camera();
        camera.enable_damping = false;
        camera.rotate_left(1.0);
        camera.pan(10.0, 10.0, 800.0);
        camera.update();
        camera.reset_to_default();
        assert_eq!(camera.eye, Point3::new(4.0, 2.0, 5.0));
        assert_eq!(camera.target, Point3::new(0.0, 0.0, 0.0));
    }
}
