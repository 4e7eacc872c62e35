//! Point-light ghosts circling the house

use cgmath::Vector3;

use crate::{
    config::GhostConfig,
    gfx::{
        lights::PointLight,
        scene::{NodeId, Scene},
    },
};

/// Position on a ghost's orbit at `angle` radians.
///
/// The height is a product of three sines with unrelated frequencies, so the
/// bobbing never visibly repeats.
pub fn orbit_position(angle: f32, radius: f32) -> Vector3<f32> {
    let y = angle.sin() * (angle * 2.34).sin() * (angle * 3.45).sin();
    Vector3::new(angle.cos() * radius, y, angle.sin() * radius)
}

/// A shadow-casting point light node that follows [`orbit_position`]
#[derive(Debug, Clone, Copy)]
pub struct Ghost {
    pub node: NodeId,
    pub angular_speed: f32,
    pub radius: f32,
}

impl Ghost {
    pub fn spawn(scene: &mut Scene, name: &str, config: &GhostConfig) -> Self {
        let light = PointLight::new(config.color, config.intensity).with_shadow();
        let node = scene.add_point_light(name, orbit_position(0.0, config.radius), light, None);
        Self {
            node,
            angular_speed: config.angular_speed,
            radius: config.radius,
        }
    }

    pub fn position_at(&self, elapsed: f32) -> Vector3<f32> {
        orbit_position(elapsed * self.angular_speed, self.radius)
    }

    /// Moves the ghost's node to where it is `elapsed` seconds after start
    pub fn update(&self, scene: &mut Scene, elapsed: f32) {
        scene.set_position(self.node, self.position_at(elapsed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    fn ghost(angular_speed: f32, radius: f32) -> Ghost {
        Ghost {
            node: NodeId(0),
            angular_speed,
            radius,
        }
    }

    #[test]
    fn starts_on_the_positive_x_axis() {
        let p = orbit_position(0.0, 4.0);
        assert!((p - Vector3::new(4.0, 0.0, 0.0)).magnitude() < 1e-6);
    }

    #[test]
    fn horizontal_distance_equals_radius() {
        let g = ghost(-0.38, 5.0);
        for t in [0.0, 0.7, 3.1, 12.5, 100.0] {
            let p = g.position_at(t);
            assert!((p.x.hypot(p.z) - 5.0).abs() < 1e-4);
            assert!(p.y.abs() <= 1.0);
        }
    }

    #[test]
    fn follows_the_bobbing_curve() {
        let g = ghost(0.5, 4.0);
        let t = 2.0_f32;
        let a = t * 0.5;
        let p = g.position_at(t);
        assert!((p.x - a.cos() * 4.0).abs() < 1e-6);
        assert!((p.z - a.sin() * 4.0).abs() < 1e-6);
        assert!((p.y - a.sin() * (a * 2.34).sin() * (a * 3.45).sin()).abs() < 1e-6);
    }

    #[test]
    fn negative_speed_orbits_the_other_way() {
        let forward = ghost(0.5, 4.0).position_at(1.0);
        let backward = ghost(-0.5, 4.0).position_at(1.0);
        assert!((forward.x - backward.x).abs() < 1e-6);
        assert!((forward.z + backward.z).abs() < 1e-6);
    }
}
