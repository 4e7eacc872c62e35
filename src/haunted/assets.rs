//! Texture table of the haunted house
//!
//! Paths are relative to the asset root (`static/` by default).

use crate::gfx::resources::{
    texture_library::{TextureId, TextureLibrary},
    texture_resource::{TextureDesc, Wrap},
};

/// Colour, packed ARM and normal maps of one surface
#[derive(Debug, Clone, Copy)]
pub struct SurfaceTextures {
    pub color: TextureId,
    pub arm: TextureId,
    pub normal: TextureId,
}

#[derive(Debug, Clone, Copy)]
pub struct FloorTextures {
    pub alpha: TextureId,
    pub surface: SurfaceTextures,
    pub displacement: TextureId,
}

/// The walls use two different images for their colour/roughness/metalness
/// and ambient occlusion maps, both sampled as linear data
#[derive(Debug, Clone, Copy)]
pub struct WallTextures {
    pub color: TextureId,
    pub ambient_occlusion: TextureId,
    pub normal: TextureId,
}

#[derive(Debug, Clone, Copy)]
pub struct DoorTextures {
    pub color: TextureId,
    pub alpha: TextureId,
    pub ambient_occlusion: TextureId,
    pub height: TextureId,
    pub normal: TextureId,
    pub metalness: TextureId,
    pub roughness: TextureId,
}

/// Every texture the scene samples, registered in a [`TextureLibrary`]
#[derive(Debug, Clone, Copy)]
pub struct HouseTextures {
    pub floor: FloorTextures,
    pub walls: WallTextures,
    pub roof: SurfaceTextures,
    pub bush: SurfaceTextures,
    pub grave: SurfaceTextures,
    pub door: DoorTextures,
}

const FLOOR_SET: &str = "floor/coast_sand_rocks_02_1k/coast_sand_rocks_02";
const WALL_SET: &str = "wall/castle_brick_broken_06_1k/castle_brick_broken_06";
const ROOF_SET: &str = "roof/roof_slates_02_1k/roof_slates_02";
const BUSH_SET: &str = "bush/leaves_forest_ground_1k/leaves_forest_ground";
const GRAVE_SET: &str = "grave/plastered_stone_wall_1k/plastered_stone_wall";

fn set_file(set: &str, kind: &str) -> String {
    format!("{set}_{kind}_1k.webp")
}

fn floor_tiled(desc: TextureDesc) -> TextureDesc {
    desc.with_repeat(8.0, 8.0).with_wrap(Wrap::Repeat, Wrap::Repeat)
}

fn roof_tiled(desc: TextureDesc) -> TextureDesc {
    desc.with_repeat(3.0, 1.0).with_wrap(Wrap::Repeat, Wrap::Clamp)
}

fn grave_tiled(desc: TextureDesc) -> TextureDesc {
    desc.with_repeat(0.3, 0.4)
}

impl HouseTextures {
    pub fn register(library: &mut TextureLibrary) -> Self {
        let floor = FloorTextures {
            alpha: library.add(TextureDesc::linear("floor/alpha.webp")),
            surface: SurfaceTextures {
                color: library.add(floor_tiled(TextureDesc::srgb(set_file(FLOOR_SET, "diff")))),
                arm: library.add(floor_tiled(TextureDesc::linear(set_file(FLOOR_SET, "arm")))),
                normal: library.add(floor_tiled(TextureDesc::linear(set_file(FLOOR_SET, "nor_gl")))),
            },
            displacement: library.add(floor_tiled(TextureDesc::linear(set_file(FLOOR_SET, "disp")))),
        };

        let walls = WallTextures {
            color: library.add(TextureDesc::linear(set_file(WALL_SET, "diff"))),
            ambient_occlusion: library.add(TextureDesc::linear(set_file(WALL_SET, "arm"))),
            normal: library.add(TextureDesc::linear(set_file(WALL_SET, "nor_gl"))),
        };

        let roof = SurfaceTextures {
            color: library.add(roof_tiled(TextureDesc::srgb(set_file(ROOF_SET, "diff")))),
            arm: library.add(roof_tiled(TextureDesc::linear(set_file(ROOF_SET, "arm")))),
            normal: library.add(roof_tiled(TextureDesc::linear(set_file(ROOF_SET, "nor_gl")))),
        };

        let bush = SurfaceTextures {
            color: library.add(TextureDesc::srgb(set_file(BUSH_SET, "diff"))),
            arm: library.add(TextureDesc::linear(set_file(BUSH_SET, "arm"))),
            normal: library.add(TextureDesc::linear(set_file(BUSH_SET, "nor_gl"))),
        };

        let grave = SurfaceTextures {
            color: library.add(grave_tiled(TextureDesc::srgb(set_file(GRAVE_SET, "diff")))),
            arm: library.add(grave_tiled(TextureDesc::linear(set_file(GRAVE_SET, "arm")))),
            normal: library.add(grave_tiled(TextureDesc::linear(set_file(GRAVE_SET, "nor_gl")))),
        };

        let door = DoorTextures {
            color: library.add(TextureDesc::srgb("door/color.webp")),
            alpha: library.add(TextureDesc::linear("door/alpha.webp")),
            ambient_occlusion: library.add(TextureDesc::linear("door/ambientOcclusion.webp")),
            height: library.add(TextureDesc::linear("door/height.webp")),
            normal: library.add(TextureDesc::linear("door/normal.webp")),
            metalness: library.add(TextureDesc::linear("door/metalness.webp")),
            roughness: library.add(TextureDesc::linear("door/roughness.webp")),
        };

        log::debug!("Registered {} house textures", library.len());

        Self {
            floor,
            walls,
            roof,
            bush,
            grave,
            door,
        }
    }
}
