//! Ambient, directional and point lights plus their shadow cameras

use cgmath::{Matrix4, Point3, Rad, Vector3};

use crate::{
    config::ShadowConfig,
    gfx::{camera::camera_utils::OPENGL_TO_WGPU_MATRIX, color::Color},
};

/// Shadow map faces rendered for one point light, in +X, -X, +Y, -Y, +Z, -Z order
pub const CUBE_FACES: usize = 6;

#[derive(Debug, Clone, Copy)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl AmbientLight {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self { color, intensity }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub cast_shadow: bool,
}

impl DirectionalLight {
    pub fn new(color: Color, intensity: f32, position: Point3<f32>) -> Self {
        Self {
            color,
            intensity,
            position,
            target: Point3::new(0.0, 0.0, 0.0),
            cast_shadow: false,
        }
    }

    /// Unit vector from the surface towards the light
    pub fn direction(&self) -> Vector3<f32> {
        use cgmath::InnerSpace;
        (self.position - self.target).normalize()
    }

    /// Orthographic view-projection of the shadow camera, mapped to wgpu's 0..1 depth
    pub fn shadow_view_proj(&self, shadows: &ShadowConfig) -> Matrix4<f32> {
        let e = shadows.directional_extent;
        let view = Matrix4::look_at_rh(self.position, self.target, Vector3::unit_y());
        let proj = cgmath::ortho(-e, e, -e, e, shadows.directional_near, shadows.directional_far);
        OPENGL_TO_WGPU_MATRIX * proj * view
    }
}

/// Physically based point light: `intensity / d^decay`, no distance cutoff
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    pub decay: f32,
    pub cast_shadow: bool,
}

impl PointLight {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            decay: 2.0,
            cast_shadow: false,
        }
    }

    pub fn with_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    /// Light reaching a surface `distance` away
    pub fn attenuation(&self, distance: f32) -> f32 {
        1.0 / distance.powf(self.decay).max(0.01)
    }

    /// View-projections of the six 90 degree cameras around `position`
    pub fn cube_view_projs(
        position: Point3<f32>,
        shadows: &ShadowConfig,
    ) -> [Matrix4<f32>; CUBE_FACES] {
        let proj = OPENGL_TO_WGPU_MATRIX
            * cgmath::perspective(
                Rad(std::f32::consts::FRAC_PI_2),
                1.0,
                shadows.point_near,
                shadows.point_far,
            );
        let faces = [
            (Vector3::unit_x(), -Vector3::unit_y()),
            (-Vector3::unit_x(), -Vector3::unit_y()),
            (Vector3::unit_y(), Vector3::unit_z()),
            (-Vector3::unit_y(), -Vector3::unit_z()),
            (Vector3::unit_z(), -Vector3::unit_y()),
            (-Vector3::unit_z(), -Vector3::unit_y()),
        ];
        faces.map(|(forward, up)| proj * Matrix4::look_to_rh(position, forward, up))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector4, InnerSpace};

    fn project(m: Matrix4<f32>, p: Point3<f32>) -> Vector3<f32> {
        let clip = m * Vector4::new(p.x, p.y, p.z, 1.0);
        clip.truncate() / clip.w
    }

    /// Index of the cube face whose camera sees `direction` (light to fragment)
    fn cube_face_for(direction: Vector3<f32>) -> usize {
        let abs = Vector3::new(direction.x.abs(), direction.y.abs(), direction.z.abs());
        if abs.x >= abs.y && abs.x >= abs.z {
            if direction.x >= 0.0 { 0 } else { 1 }
        } else if abs.y >= abs.z {
            if direction.y >= 0.0 { 2 } else { 3 }
        } else if direction.z >= 0.0 {
            4
        } else {
            5
        }
    }

    #[test]
    fn directional_shadow_box_contains_the_yard() {
        let light = DirectionalLight::new(Color::WHITE, 1.0, Point3::new(3.0, 2.0, -8.0));
        let m = light.shadow_view_proj(&ShadowConfig::default());
        let origin = project(m, Point3::new(0.0, 0.0, 0.0));
        assert!(origin.x.abs() < 1e-4 && origin.y.abs() < 1e-4);
        assert!(origin.z > 0.0 && origin.z < 1.0);
        // Outside the +-8 box
        let far_corner = project(m, Point3::new(30.0, 0.0, 30.0));
        assert!(far_corner.x.abs() > 1.0 || far_corner.y.abs() > 1.0);
        assert!((light.direction().magnitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn each_cube_face_sees_its_own_axis() {
        let light_pos = Point3::new(1.0, 0.5, -2.0);
        let mats = PointLight::cube_view_projs(light_pos, &ShadowConfig::default());
        let dirs = [
            Vector3::unit_x(),
            -Vector3::unit_x(),
            Vector3::unit_y(),
            -Vector3::unit_y(),
            Vector3::unit_z(),
            -Vector3::unit_z(),
        ];
        for (face, dir) in dirs.iter().enumerate() {
            assert_eq!(cube_face_for(*dir), face);
            let p = project(mats[face], light_pos + dir * 3.0);
            assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4, "face {face}: {p:?}");
            assert!(p.z > 0.0 && p.z < 1.0);
        }
    }

    #[test]
    fn point_light_decays_with_inverse_square() {
        let light = PointLight::new(Color::WHITE, 6.0);
        assert!((light.attenuation(2.0) - 0.25).abs() < 1e-6);
        assert!(!light.cast_shadow);
        assert!(light.with_shadow().cast_shadow);
    }
}
