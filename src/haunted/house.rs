//! Floor, house group and grave group

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use cgmath::Vector3;

use crate::{
    config::{HouseMeasurements, LightsConfig, MaterialsConfig},
    gfx::{
        geometry::{generate_box, generate_cone, generate_plane, generate_sphere},
        lights::PointLight,
        resources::material::{MapSlot, MaterialId, StandardMaterial},
        scene::{Mesh, MeshId, MeshNode, NodeId, Scene, Transform},
    },
};

use super::{
    assets::{HouseTextures, SurfaceTextures},
    graves::GravePlacement,
};

/// Bush scale and position in front of the door
const BUSHES: [(f32, [f32; 3]); 4] = [
    (0.5, [0.8, 0.2, 2.2]),
    (0.25, [1.4, 0.1, 2.1]),
    (0.4, [-0.8, 0.1, 2.2]),
    (0.15, [-1.0, 0.05, 2.6]),
];

/// Tips the bushes forward so the sphere poles face away from the camera
const BUSH_TILT: f32 = -0.75;

/// Pushes the door just in front of the front wall
const DOOR_OFFSET: f32 = 0.01;

/// Ids of the nodes the house is made of
#[derive(Debug, Clone, Copy)]
pub struct HouseNodes {
    pub floor: NodeId,
    pub house: NodeId,
    pub walls: NodeId,
    pub roof: NodeId,
    pub door: NodeId,
    pub bushes: [NodeId; 4],
    pub door_light: NodeId,
}

/// Material ids of the scene
#[derive(Debug, Clone)]
pub struct HouseMaterials {
    pub floor: MaterialId,
    pub walls: MaterialId,
    pub roof: MaterialId,
    pub door: MaterialId,
    pub bush: MaterialId,
    pub grave: MaterialId,
}

impl HouseMaterials {
    pub fn register(scene: &mut Scene, t: &HouseTextures, config: &MaterialsConfig) -> Self {
        let floor = StandardMaterial::new("floor")
            .with_map(MapSlot::Color, t.floor.surface.color)
            .with_map(MapSlot::Alpha, t.floor.alpha)
            .with_arm_map(t.floor.surface.arm)
            .with_map(MapSlot::Normal, t.floor.surface.normal)
            .with_displacement(
                t.floor.displacement,
                config.floor_displacement_scale,
                config.floor_displacement_bias,
            )
            .with_transparent(true);

        let walls = StandardMaterial::new("walls")
            .with_map(MapSlot::Color, t.walls.color)
            .with_map(MapSlot::AmbientOcclusion, t.walls.ambient_occlusion)
            .with_map(MapSlot::Roughness, t.walls.color)
            .with_map(MapSlot::Metalness, t.walls.color)
            .with_map(MapSlot::Normal, t.walls.normal);

        let door = StandardMaterial::new("door")
            .with_map(MapSlot::Color, t.door.color)
            .with_map(MapSlot::Alpha, t.door.alpha)
            .with_map(MapSlot::AmbientOcclusion, t.door.ambient_occlusion)
            .with_displacement(
                t.door.height,
                config.door_displacement_scale,
                config.door_displacement_bias,
            )
            .with_map(MapSlot::Normal, t.door.normal)
            .with_map(MapSlot::Metalness, t.door.metalness)
            .with_map(MapSlot::Roughness, t.door.roughness)
            .with_transparent(true);

        let surface = |name: &str, set: &SurfaceTextures| {
            StandardMaterial::new(name)
                .with_map(MapSlot::Color, set.color)
                .with_arm_map(set.arm)
                .with_map(MapSlot::Normal, set.normal)
        };
        let roof = surface("roof", &t.roof);
        let bush = surface("bush", &t.bush).with_color(config.bush_color);
        let grave = surface("grave", &t.grave);

        Self {
            floor: scene.add_material(floor),
            walls: scene.add_material(walls),
            roof: scene.add_material(roof),
            door: scene.add_material(door),
            bush: scene.add_material(bush),
            grave: scene.add_material(grave),
        }
    }
}

fn mesh_node(
    mesh: MeshId,
    material: &MaterialId,
    cast_shadow: bool,
    receive_shadow: bool,
) -> MeshNode {
    MeshNode {
        mesh,
        material: material.clone(),
        cast_shadow,
        receive_shadow,
    }
}

/// Adds the floor and the house group (walls, roof, door, bushes, door light)
pub fn build_house(
    scene: &mut Scene,
    m: &HouseMeasurements,
    lights: &LightsConfig,
    materials: &HouseMaterials,
) -> HouseNodes {
    let floor_mesh = scene.add_mesh(Mesh::from_geometry(
        "floor",
        &generate_plane(
            m.floor_width,
            m.floor_height,
            m.floor_width_segments,
            m.floor_height_segments,
        ),
    ));
    let floor = scene.add_mesh_node(
        "floor",
        Transform::default().with_rotation(-FRAC_PI_2, 0.0, 0.0),
        mesh_node(floor_mesh, &materials.floor, false, true),
        None,
    );

    let house = scene.add_group("house", Transform::default(), None);

    let walls_mesh = scene.add_mesh(Mesh::from_geometry(
        "walls",
        &generate_box(m.walls_width, m.walls_height, m.walls_depth, 1, 1, 1),
    ));
    let walls = scene.add_mesh_node(
        "walls",
        Transform::from_position(0.0, m.walls_height / 2.0, 0.0),
        mesh_node(walls_mesh, &materials.walls, true, true),
        Some(house),
    );

    // the cone's origin is at its centre
    let roof_mesh = scene.add_mesh(Mesh::from_geometry(
        "roof",
        &generate_cone(m.roof_radius, m.roof_height, m.roof_segments),
    ));
    let roof = scene.add_mesh_node(
        "roof",
        Transform::from_position(0.0, m.walls_height + m.roof_height / 2.0, 0.0)
            .with_rotation(0.0, FRAC_PI_4, 0.0),
        mesh_node(roof_mesh, &materials.roof, true, false),
        Some(house),
    );

    let door_mesh = scene.add_mesh(Mesh::from_geometry(
        "door",
        &generate_plane(
            m.door_width,
            m.door_height,
            m.door_width_segments,
            m.door_height_segments,
        ),
    ));
    let door = scene.add_mesh_node(
        "door",
        Transform::from_position(0.0, 1.0, m.walls_depth / 2.0 + DOOR_OFFSET),
        mesh_node(door_mesh, &materials.door, false, false),
        Some(house),
    );

    let bush_mesh = scene.add_mesh(Mesh::from_geometry(
        "bush",
        &generate_sphere(m.bush_radius, m.bush_width_segments, m.bush_height_segments),
    ));
    let bushes = BUSHES.map(|(scale, [x, y, z])| {
        scene.add_mesh_node(
            "bush",
            Transform::from_position(x, y, z)
                .with_rotation(BUSH_TILT, 0.0, 0.0)
                .with_uniform_scale(scale),
            mesh_node(bush_mesh, &materials.bush, false, false),
            Some(house),
        )
    });

    let [x, y, z] = lights.door_position;
    let door_light = scene.add_point_light(
        "door light",
        Vector3::new(x, y, z),
        PointLight::new(lights.door_color, lights.door_intensity),
        Some(house),
    );

    HouseNodes {
        floor,
        house,
        walls,
        roof,
        door,
        bushes,
        door_light,
    }
}

/// Adds the graves group with one shared box mesh per placement
pub fn build_graves(
    scene: &mut Scene,
    m: &HouseMeasurements,
    material: &MaterialId,
    placements: &[GravePlacement],
) -> NodeId {
    let graves = scene.add_group("graves", Transform::default(), None);
    let grave_mesh = scene.add_mesh(Mesh::from_geometry(
        "grave",
        &generate_box(m.grave_width, m.grave_height, m.grave_depth, 1, 1, 1),
    ));
    for (i, placement) in placements.iter().enumerate() {
        scene.add_mesh_node(
            &format!("grave {i}"),
            placement.transform(),
            mesh_node(grave_mesh, material, true, true),
            Some(graves),
        );
    }
    graves
}
