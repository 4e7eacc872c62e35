//! Sky dome and fog

use cgmath::{Matrix4, Vector3};

use crate::{
    config::{FogConfig, SkyConfig},
    gfx::color::Color,
};

/// Exponential squared fog evaluated on view space depth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub density: f32,
}

impl Fog {
    pub fn new(color: Color, density: f32) -> Self {
        Self { color, density }
    }

    pub fn from_config(config: &FogConfig) -> Self {
        Self::new(config.color, config.density)
    }

    /// Share of the fog colour in the final pixel at `depth`
    pub fn factor(&self, depth: f32) -> f32 {
        let d = self.density * depth;
        (1.0 - (-d * d).exp()).clamp(0.0, 1.0)
    }
}

/// Parameters of the Preetham-style atmospheric scattering dome
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sky {
    pub scale: f32,
    pub turbidity: f32,
    pub rayleigh: f32,
    pub mie_coefficient: f32,
    pub mie_directional_g: f32,
    pub sun_position: Vector3<f32>,
    pub up: Vector3<f32>,
}

impl Sky {
    pub fn from_config(config: &SkyConfig) -> Self {
        let [x, y, z] = config.sun_position;
        Self {
            scale: config.scale,
            turbidity: config.turbidity,
            rayleigh: config.rayleigh,
            mie_coefficient: config.mie_coefficient,
            mie_directional_g: config.mie_directional_g,
            sun_position: Vector3::new(x, y, z),
            up: Vector3::unit_y(),
        }
    }

    pub fn uniform(&self, view_proj: [[f32; 4]; 4], camera_position: [f32; 4]) -> SkyUniform {
        SkyUniform {
            view_proj,
            model: Matrix4::from_scale(self.scale).into(),
            camera_position,
            sun_position: self.sun_position.extend(0.0).into(),
            up: self.up.extend(0.0).into(),
            params: [
                self.turbidity,
                self.rayleigh,
                self.mie_coefficient,
                self.mie_directional_g,
            ],
        }
    }
}

/// MUST match `SkyUniform` in sky.wgsl
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyUniform {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub sun_position: [f32; 4],
    pub up: [f32; 4],
    /// turbidity, rayleigh, mie coefficient, mie directional g
    pub params: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fog_grows_with_depth() {
        let fog = Fog::from_config(&FogConfig::default());
        assert_eq!(fog.factor(0.0), 0.0);
        // density 0.1 at depth 10: 1 - e^-1
        assert!((fog.factor(10.0) - (1.0 - (-1.0f32).exp())).abs() < 1e-6);
        assert!(fog.factor(5.0) < fog.factor(6.0));
        assert!(fog.factor(100.0) > 0.999);
    }

    #[test]
    fn sky_uniform_carries_scattering_parameters() {
        let sky = Sky::from_config(&SkyConfig::default());
        let uniform = sky.uniform([[0.0; 4]; 4], [4.0, 2.0, 5.0, 1.0]);
        assert_eq!(uniform.params, [10.0, 3.0, 0.1, 0.95]);
        assert_eq!(uniform.model[0][0], 100.0);
        assert_eq!(uniform.model[3][3], 1.0);
        assert_eq!(uniform.sun_position, [0.3, -0.038, -0.95, 0.0]);
        assert_eq!(std::mem::size_of::<SkyUniform>(), 64 * 2 + 16 * 4);
    }
}
