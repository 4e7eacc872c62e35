//! Scene configuration
//!
//! Every numeric parameter of the scene lives here. The defaults reproduce the
//! haunted house exactly; a TOML file can override any subset of them:
//!
//! ```toml
//! [graves]
//! count = 50
//! seed = 7
//!
//! [fog]
//! density = 0.08
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    error::{Error, Result},
    gfx::color::Color,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub assets: AssetsConfig,
    pub house: HouseMeasurements,
    pub materials: MaterialsConfig,
    pub graves: GraveConfig,
    pub ghosts: Vec<GhostConfig>,
    pub lights: LightsConfig,
    pub fog: FogConfig,
    pub sky: SkyConfig,
    pub shadows: ShadowConfig,
    pub camera: CameraConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets: AssetsConfig::default(),
            house: HouseMeasurements::default(),
            materials: MaterialsConfig::default(),
            graves: GraveConfig::default(),
            ghosts: GhostConfig::defaults(),
            lights: LightsConfig::default(),
            fog: FogConfig::default(),
            sky: SkyConfig::default(),
            shadows: ShadowConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Loads a config from a TOML file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        log::info!("Loaded scene config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the GPU would refuse later
    pub fn validate(&self) -> Result<()> {
        if self.shadows.map_size == 0 {
            return Err(Error::InvalidConfig(
                "shadows.map_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Upper bound on the device pixel ratio used for the render surface
    pub max_pixel_ratio: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Haunted House".to_string(),
            width: 1200,
            height: 800,
            max_pixel_ratio: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory the texture paths are resolved against
    pub root: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("static"),
        }
    }
}

/// Dimensions and tessellation of every primitive in the scene
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HouseMeasurements {
    pub floor_width: f32,
    pub floor_height: f32,
    pub floor_width_segments: u32,
    pub floor_height_segments: u32,
    pub walls_width: f32,
    pub walls_height: f32,
    pub walls_depth: f32,
    pub roof_radius: f32,
    pub roof_height: f32,
    pub roof_segments: u32,
    pub door_width: f32,
    pub door_height: f32,
    pub door_width_segments: u32,
    pub door_height_segments: u32,
    pub bush_radius: f32,
    pub bush_width_segments: u32,
    pub bush_height_segments: u32,
    pub grave_width: f32,
    pub grave_height: f32,
    pub grave_depth: f32,
}

impl Default for HouseMeasurements {
    fn default() -> Self {
        Self {
            floor_width: 20.0,
            floor_height: 20.0,
            floor_width_segments: 100,
            floor_height_segments: 100,
            walls_width: 4.0,
            walls_height: 2.5,
            walls_depth: 4.0,
            roof_radius: 3.5,
            roof_height: 1.5,
            roof_segments: 4,
            door_width: 2.2,
            door_height: 2.2,
            door_width_segments: 100,
            door_height_segments: 100,
            bush_radius: 1.0,
            bush_width_segments: 16,
            bush_height_segments: 16,
            grave_width: 0.6,
            grave_height: 0.8,
            grave_depth: 0.2,
        }
    }
}

/// Material parameters that are not baked into textures
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MaterialsConfig {
    pub floor_displacement_scale: f32,
    pub floor_displacement_bias: f32,
    pub door_displacement_scale: f32,
    pub door_displacement_bias: f32,
    pub bush_color: Color,
}

impl Default for MaterialsConfig {
    fn default() -> Self {
        Self {
            floor_displacement_scale: 0.3,
            floor_displacement_bias: -0.2,
            door_displacement_scale: 0.15,
            door_displacement_bias: -0.04,
            bush_color: Color::from_css("ccffcc"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraveConfig {
    pub count: usize,
    /// Graves start this far from the centre so none land inside the house
    pub min_radius: f32,
    pub radius_spread: f32,
    /// Full range of the random tilt on each axis, centred on zero
    pub max_tilt: f32,
    /// Fixed seed for a reproducible layout; random when absent
    pub seed: Option<u64>,
}

impl Default for GraveConfig {
    fn default() -> Self {
        Self {
            count: 31,
            min_radius: 3.0,
            radius_spread: 4.0,
            max_tilt: 0.4,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GhostConfig {
    pub color: Color,
    pub intensity: f32,
    /// Radians per second; negative values orbit clockwise
    pub angular_speed: f32,
    pub radius: f32,
}

impl GhostConfig {
    pub fn defaults() -> Vec<GhostConfig> {
        vec![
            GhostConfig {
                color: Color::from_css("#8800ff"),
                intensity: 6.0,
                angular_speed: 0.5,
                radius: 4.0,
            },
            GhostConfig {
                color: Color::from_css("#ff0088"),
                intensity: 6.0,
                angular_speed: -0.38,
                radius: 5.0,
            },
            GhostConfig {
                color: Color::from_css("#ff0000"),
                intensity: 6.0,
                angular_speed: 0.23,
                radius: 6.0,
            },
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LightsConfig {
    pub ambient_color: Color,
    pub ambient_intensity: f32,
    pub directional_color: Color,
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
    pub door_color: Color,
    pub door_intensity: f32,
    pub door_position: [f32; 3],
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            ambient_color: Color::from_css("#86cdff"),
            ambient_intensity: 0.275,
            directional_color: Color::from_css("#86cdff"),
            directional_intensity: 1.0,
            directional_position: [3.0, 2.0, -8.0],
            door_color: Color::from_css("#ff7d46"),
            door_intensity: 5.0,
            door_position: [0.0, 2.2, 2.5],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    pub color: Color,
    pub density: f32,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            color: Color::from_css("#02343f"),
            density: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SkyConfig {
    pub scale: f32,
    pub turbidity: f32,
    pub rayleigh: f32,
    pub mie_coefficient: f32,
    pub mie_directional_g: f32,
    pub sun_position: [f32; 3],
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            scale: 100.0,
            turbidity: 10.0,
            rayleigh: 3.0,
            mie_coefficient: 0.1,
            mie_directional_g: 0.95,
            sun_position: [0.3, -0.038, -0.95],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    pub map_size: u32,
    /// Half extent of the directional light's orthographic shadow box
    pub directional_extent: f32,
    pub directional_near: f32,
    pub directional_far: f32,
    pub point_near: f32,
    pub point_far: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 256,
            directional_extent: 8.0,
            directional_near: 1.0,
            directional_far: 20.0,
            point_near: 0.5,
            point_far: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 100.0,
            position: [4.0, 2.0, 5.0],
            target: [0.0, 0.0, 0.0],
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_haunted_house() {
        let config = SceneConfig::default();
        assert_eq!(config.graves.count, 31);
        assert_eq!(config.ghosts.len(), 3);
        assert_eq!(config.ghosts[1].angular_speed, -0.38);
        assert_eq!(config.house.roof_segments, 4);
        assert_eq!(config.shadows.map_size, 256);
        assert_eq!(config.camera.position, [4.0, 2.0, 5.0]);
        assert_eq!(config.materials.bush_color, Color::WHITE);
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = SceneConfig::from_toml(
            r##"
            [graves]
            count = 12
            seed = 42

            [fog]
            color = "#000000"

            [house]
            walls_height = 3.0
            "##,
        )
        .unwrap();

        assert_eq!(config.graves.count, 12);
        assert_eq!(config.graves.seed, Some(42));
        assert_eq!(config.graves.min_radius, 3.0);
        assert_eq!(config.fog.color, Color::BLACK);
        assert_eq!(config.fog.density, 0.1);
        assert_eq!(config.house.walls_height, 3.0);
        assert_eq!(config.house.walls_width, 4.0);
        assert_eq!(config.ghosts.len(), 3);
    }

    #[test]
    fn ghosts_can_be_replaced() {
        let config = SceneConfig::from_toml(
            r##"
            [[ghosts]]
            color = "#00ff00"
            intensity = 2.0
            angular_speed = 1.0
            radius = 3.0
            "##,
        )
        .unwrap();
        assert_eq!(config.ghosts.len(), 1);
        assert_eq!(config.ghosts[0].radius, 3.0);
    }

    #[test]
    fn empty_shadow_maps_are_rejected() {
        let result = SceneConfig::from_toml("[shadows]\nmap_size = 0");
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        assert!(SceneConfig::from_toml("[shadows]\nmap_size = 512").is_ok());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            SceneConfig::from_toml("[graves]\ncount = \"many\""),
            Err(Error::Config(_))
        ));
    }
}
