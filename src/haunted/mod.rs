//! # Haunted House
//!
//! Builds the whole scene on the CPU from a [`SceneConfig`]: the textured
//! floor and house, a ring of graves, the lights, fog and sky, and three
//! ghosts that circle the house. [`HauntedHouse::animate`] advances the
//! ghosts; everything else stays where it was put.

pub mod assets;
pub mod ghosts;
pub mod graves;
pub mod house;

use cgmath::Point3;

use crate::{
    config::SceneConfig,
    gfx::{
        camera::{CameraController, CameraManager, OrbitCamera},
        environment::{Fog, Sky},
        lights::{AmbientLight, DirectionalLight},
        resources::{
            global_bindings::{unlit_point_lights, MAX_POINT_LIGHTS},
            material::StandardMaterial,
            texture_library::TextureLibrary,
        },
        scene::{NodeId, Scene},
    },
};

pub use assets::HouseTextures;
pub use ghosts::{orbit_position, Ghost};
pub use graves::{grave_rng, scatter_graves, GravePlacement};
pub use house::{build_graves, build_house, HouseMaterials, HouseNodes};

const GHOST_NAMES: [&str; 3] = ["ghost one", "ghost two", "ghost three"];

pub struct HauntedHouse {
    pub scene: Scene,
    pub house: HouseNodes,
    pub materials: HouseMaterials,
    pub graves: NodeId,
    pub ghosts: Vec<Ghost>,
}

impl HauntedHouse {
    /// Assembles the scene for a surface with the given aspect ratio
    pub fn build(config: &SceneConfig, aspect: f32) -> Self {
        let camera = OrbitCamera::from_config(&config.camera, aspect);
        let controller = CameraController::new(
            config.camera.rotate_speed,
            config.camera.zoom_speed,
            config.camera.pan_speed,
        );
        let mut textures = TextureLibrary::new(&config.assets.root);
        let house_textures = HouseTextures::register(&mut textures);
        let mut scene = Scene::new(CameraManager::new(camera, controller), textures);

        let materials = HouseMaterials::register(&mut scene, &house_textures, &config.materials);
        let house = build_house(&mut scene, &config.house, &config.lights, &materials);

        let placements = scatter_graves(&config.graves, &mut grave_rng(&config.graves));
        let graves = build_graves(&mut scene, &config.house, &materials.grave, &placements);

        let lights = &config.lights;
        scene.ambient_light = AmbientLight::new(lights.ambient_color, lights.ambient_intensity);
        let [x, y, z] = lights.directional_position;
        scene.directional_light = DirectionalLight {
            cast_shadow: true,
            ..DirectionalLight::new(
                lights.directional_color,
                lights.directional_intensity,
                Point3::new(x, y, z),
            )
        };

        let ghosts = config
            .ghosts
            .iter()
            .enumerate()
            .map(|(i, ghost)| {
                let name = GHOST_NAMES
                    .get(i)
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| format!("ghost {}", i + 1));
                Ghost::spawn(&mut scene, &name, ghost)
            })
            .collect();

        scene.add_axes_helper(1.0, None);
        scene.fog = Fog::from_config(&config.fog);
        scene.sky = Some(Sky::from_config(&config.sky));
        scene.update_world_matrices();

        let point_lights = scene.point_lights().len();
        if unlit_point_lights(point_lights) > 0 {
            log::warn!(
                "{point_lights} point lights in the scene, only the first {MAX_POINT_LIGHTS} are lit"
            );
        }

        log::info!(
            "Built haunted house: {} graves, {} ghosts, {} textures",
            placements.len(),
            config.ghosts.len(),
            scene.textures.len()
        );

        Self {
            scene,
            house,
            materials,
            graves,
            ghosts,
        }
    }

    /// Places the ghosts for `elapsed` seconds and updates camera and transforms
    pub fn animate(&mut self, elapsed: f32) {
        for ghost in &self.ghosts {
            ghost.update(&mut self.scene, elapsed);
        }
        self.scene.update();
    }

    pub fn floor_material_mut(&mut self) -> Option<&mut StandardMaterial> {
        self.scene
            .material_manager
            .get_material_mut(&self.materials.floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraveConfig;
    use crate::gfx::resources::MapSlot;
    use crate::config::{GhostConfig, ShadowConfig};
    use crate::gfx::camera::camera_utils::CameraUniform;
    use crate::gfx::resources::global_bindings::{build_global_uniform, FrameLights, ShadowViews};
    use cgmath::{InnerSpace, Vector3};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts warnings about unlit point lights
    struct LightWarnings(AtomicUsize);

    impl log::Log for LightWarnings {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Warn
        }

        fn log(&self, record: &log::Record) {
            if record.level() == log::Level::Warn
                && record.args().to_string().contains("point lights in the scene")
            {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn flush(&self) {}
    }

    static LIGHT_WARNINGS: LightWarnings = LightWarnings(AtomicUsize::new(0));

    fn seeded_config() -> SceneConfig {
        SceneConfig {
            graves: GraveConfig {
                seed: Some(3),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn scene_has_every_part() {
        let world = HauntedHouse::build(&seeded_config(), 1.5);
        let stats = world.scene.get_statistics();

        // floor, house group, walls, roof, door, 4 bushes, door light,
        // graves group, 31 graves, 3 ghosts, axes helper
        assert_eq!(stats.node_count, 46);
        assert_eq!(stats.mesh_count, 6);
        assert_eq!(stats.mesh_node_count, 1 + 3 + 4 + 31);
        assert_eq!(stats.point_light_count, 4);
        assert_eq!(world.scene.node(world.graves).children().len(), 31);
        assert_eq!(world.scene.node(world.house.house).children().len(), 8);
        assert!(world.scene.sky.is_some());
    }

    #[test]
    fn house_parts_sit_where_expected() {
        let world = HauntedHouse::build(&seeded_config(), 1.5);
        let scene = &world.scene;

        let walls = scene.node(world.house.walls).world_position();
        assert!((walls - Vector3::new(0.0, 1.25, 0.0)).magnitude() < 1e-6);
        let roof = scene.node(world.house.roof);
        assert!((roof.world_position().y - 3.25).abs() < 1e-6);
        assert!((roof.transform.rotation.y - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        let door = scene.node(world.house.door).world_position();
        assert!((door - Vector3::new(0.0, 1.0, 2.01)).magnitude() < 1e-6);
        let light = scene.node(world.house.door_light).world_position();
        assert!((light - Vector3::new(0.0, 2.2, 2.5)).magnitude() < 1e-6);
    }

    #[test]
    fn shadow_flags_follow_the_scene_setup() {
        let world = HauntedHouse::build(&seeded_config(), 1.5);
        let scene = &world.scene;
        let flags = |id| {
            let mesh = scene.node(id).as_mesh().expect("mesh node");
            (mesh.cast_shadow, mesh.receive_shadow)
        };

        assert_eq!(flags(world.house.walls), (true, true));
        assert_eq!(flags(world.house.roof), (true, false));
        assert_eq!(flags(world.house.floor), (false, true));
        assert_eq!(flags(world.house.door), (false, false));
        assert_eq!(flags(scene.node(world.graves).children()[0]), (true, true));

        assert!(scene.directional_light.cast_shadow);
        let lights = scene.point_lights();
        assert!(!lights[0].1.cast_shadow, "door light");
        assert!(lights[1..].iter().all(|(_, light)| light.cast_shadow));
    }

    #[test]
    fn floor_and_door_are_transparent_and_displaced() {
        let mut world = HauntedHouse::build(&seeded_config(), 1.5);
        let door = world.materials.door.clone();
        let door = world
            .scene
            .material_manager
            .get_material(&door)
            .expect("door material");
        assert!(door.transparent);
        assert!(door.map(MapSlot::Displacement).is_some());
        assert_eq!(door.displacement_scale, 0.15);

        let floor = world.floor_material_mut().expect("floor material");
        assert!(floor.transparent);
        assert_eq!(floor.displacement_bias, -0.2);
        assert!(floor.map(MapSlot::Alpha).is_some());
    }

    #[test]
    fn extra_ghosts_warn_once() {
        log::set_logger(&LIGHT_WARNINGS).expect("no other logger in tests");
        log::set_max_level(log::LevelFilter::Warn);

        let mut config = seeded_config();
        let extra = GhostConfig {
            radius: 7.0,
            ..config.ghosts[0].clone()
        };
        config.ghosts.push(extra);
        let mut world = HauntedHouse::build(&config, 1.5);
        let shadows = ShadowConfig::default();
        for frame in 0..60 {
            world.animate(frame as f32 / 60.0);
            let point_lights = world.scene.point_lights();
            let lights = FrameLights {
                ambient: &world.scene.ambient_light,
                directional: &world.scene.directional_light,
                point_lights: &point_lights,
                fog: &world.scene.fog,
            };
            let views = ShadowViews::collect(&lights, &shadows);
            build_global_uniform(&CameraUniform::default(), &lights, &views, &shadows);
        }

        assert_eq!(world.scene.point_lights().len(), 5);
        assert_eq!(LIGHT_WARNINGS.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn animate_moves_the_ghosts() {
        let mut world = HauntedHouse::build(&seeded_config(), 1.5);
        world.animate(2.0);

        let ghost = world.ghosts[0];
        let expected = orbit_position(1.0, 4.0);
        let actual = world.scene.node(ghost.node).world_position();
        assert!((actual - expected).magnitude() < 1e-5);
    }
}
