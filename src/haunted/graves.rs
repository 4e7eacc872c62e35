//! Random ring of tilted graves around the house

use std::f32::consts::TAU;

use cgmath::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{config::GraveConfig, gfx::scene::Transform};

/// Position and tilt of one grave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravePlacement {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
}

impl GravePlacement {
    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: self.rotation,
            ..Default::default()
        }
    }

    /// Distance from the vertical axis through the house
    pub fn radius(&self) -> f32 {
        self.position.x.hypot(self.position.z)
    }
}

/// Rng for the layout: seeded when the config fixes a seed, otherwise from the OS
pub fn grave_rng(config: &GraveConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Scatters `config.count` graves on the ring between `min_radius` and
/// `min_radius + radius_spread`, standing on the ground
pub fn scatter_graves<R: Rng>(config: &GraveConfig, rng: &mut R) -> Vec<GravePlacement> {
    let tilt = |rng: &mut R| (rng.random::<f32>() - 0.5) * config.max_tilt;

    (0..config.count)
        .map(|_| {
            let angle = rng.random::<f32>() * TAU;
            let radius = config.min_radius + rng.random::<f32>() * config.radius_spread;
            let position = Vector3::new(angle.sin() * radius, 0.0, angle.cos() * radius);
            let rotation = Vector3::new(tilt(rng), tilt(rng), tilt(rng));
            GravePlacement { position, rotation }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> GraveConfig {
        GraveConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn graves_stay_on_the_ring() {
        let config = seeded(42);
        let graves = scatter_graves(&config, &mut grave_rng(&config));
        assert_eq!(graves.len(), 31);

        for grave in &graves {
            let r = grave.radius();
            assert!((3.0 - 1e-4..=7.0 + 1e-4).contains(&r), "radius {r}");
            assert_eq!(grave.position.y, 0.0);
            for angle in [grave.rotation.x, grave.rotation.y, grave.rotation.z] {
                assert!(angle.abs() <= 0.2 + 1e-6, "tilt {angle}");
            }
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let config = seeded(7);
        let a = scatter_graves(&config, &mut grave_rng(&config));
        let b = scatter_graves(&config, &mut grave_rng(&config));
        assert_eq!(a, b);

        let other = seeded(8);
        let c = scatter_graves(&other, &mut grave_rng(&other));
        assert_ne!(a, c);
    }

    #[test]
    fn count_is_configurable() {
        let config = GraveConfig {
            count: 5,
            ..seeded(1)
        };
        assert_eq!(scatter_graves(&config, &mut grave_rng(&config)).len(), 5);

        let none = GraveConfig { count: 0, ..seeded(1) };
        assert!(scatter_graves(&none, &mut grave_rng(&none)).is_empty());
    }

    #[test]
    fn transform_keeps_unit_scale() {
        let grave = GravePlacement {
            position: Vector3::new(1.0, 0.0, 4.0),
            rotation: Vector3::new(0.1, -0.1, 0.05),
        };
        let transform = grave.transform();
        assert_eq!(transform.scale, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(transform.rotation, grave.rotation);
    }
}
