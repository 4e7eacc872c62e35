//! Material system for PBR rendering
//!
//! Provides material definitions and centralized management with GPU resource handling.
//! Materials are stored in MaterialManager and scene nodes reference them by ID.

use std::collections::HashMap;
use wgpu::Device;

use crate::{
    gfx::color::Color,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

use super::texture_library::{TextureId, TextureLibrary};

/// Material ID for referencing materials
pub type MaterialId = String;

/// Texture slots of a [`StandardMaterial`], in binding order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapSlot {
    Color = 0,
    /// Opacity read from the green channel
    Alpha,
    /// Read from the red channel
    AmbientOcclusion,
    /// Read from the green channel
    Roughness,
    /// Read from the blue channel
    Metalness,
    Normal,
    /// Height along the vertex normal, read from the red channel
    Displacement,
}

impl MapSlot {
    pub const COUNT: usize = 7;

    pub const ALL: [MapSlot; Self::COUNT] = [
        MapSlot::Color,
        MapSlot::Alpha,
        MapSlot::AmbientOcclusion,
        MapSlot::Roughness,
        MapSlot::Metalness,
        MapSlot::Normal,
        MapSlot::Displacement,
    ];

    pub fn bit(self) -> u32 {
        1 << self as u32
    }
}

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
    pub displacement_scale: f32,
    pub displacement_bias: f32,
    pub normal_scale: [f32; 2],
    pub ao_intensity: f32,
    /// One bit per [`MapSlot`] that has a texture
    pub map_flags: u32,
    /// xy: UV repeat per [`MapSlot`]
    pub map_repeat: [[f32; 4]; MapSlot::COUNT],
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Layout shared by every material: the uniform, then a texture and sampler per slot.
///
/// The displacement pair is also visible to the vertex stage.
pub fn create_material_bind_group_layout(device: &Device) -> BindGroupLayoutWithDesc {
    let mut builder = BindGroupLayoutBuilder::new().next_binding_rendering(binding_types::uniform());
    for slot in MapSlot::ALL {
        let visibility = if slot == MapSlot::Displacement {
            wgpu::ShaderStages::VERTEX_FRAGMENT
        } else {
            wgpu::ShaderStages::FRAGMENT
        };
        builder = builder
            .next_binding(visibility, binding_types::texture_2d())
            .next_binding(
                visibility,
                binding_types::sampler(wgpu::SamplerBindingType::Filtering),
            );
    }
    builder.create(device, "Material Bind Group Layout")
}

/// Metallic-roughness material with optional texture maps
pub struct StandardMaterial {
    pub name: String,
    pub color: Color,
    pub opacity: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub normal_scale: [f32; 2],
    pub ao_intensity: f32,
    pub displacement_scale: f32,
    pub displacement_bias: f32,
    /// Drawn after opaque objects with alpha blending
    pub transparent: bool,
    maps: [Option<TextureId>; MapSlot::COUNT],

    // GPU resources - shared by all nodes using this material
    material_ubo: Option<MaterialUBO>,
    bind_group: Option<wgpu::BindGroup>,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            color: Color::WHITE,
            opacity: 1.0,
            roughness: 1.0,
            metalness: 0.0,
            normal_scale: [1.0, 1.0],
            ao_intensity: 1.0,
            displacement_scale: 1.0,
            displacement_bias: 0.0,
            transparent: false,
            maps: [None; MapSlot::COUNT],
            material_ubo: None,
            bind_group: None,
        }
    }
}

impl StandardMaterial {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_map(mut self, slot: MapSlot, texture: TextureId) -> Self {
        self.maps[slot as usize] = Some(texture);
        self
    }

    /// Uses one packed texture for ambient occlusion (R), roughness (G) and metalness (B)
    pub fn with_arm_map(self, texture: TextureId) -> Self {
        self.with_map(MapSlot::AmbientOcclusion, texture)
            .with_map(MapSlot::Roughness, texture)
            .with_map(MapSlot::Metalness, texture)
    }

    pub fn with_displacement(mut self, texture: TextureId, scale: f32, bias: f32) -> Self {
        self.displacement_scale = scale;
        self.displacement_bias = bias;
        self.with_map(MapSlot::Displacement, texture)
    }

    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn map(&self, slot: MapSlot) -> Option<TextureId> {
        self.maps[slot as usize]
    }

    pub fn map_flags(&self) -> u32 {
        MapSlot::ALL
            .iter()
            .filter(|slot| self.map(**slot).is_some())
            .fold(0, |flags, slot| flags | slot.bit())
    }

    pub fn uniform(&self, textures: &TextureLibrary) -> MaterialUniform {
        let mut map_repeat = [[1.0, 1.0, 0.0, 0.0]; MapSlot::COUNT];
        for slot in MapSlot::ALL {
            if let Some(id) = self.map(slot) {
                let [u, v] = textures.desc(id).repeat;
                map_repeat[slot as usize] = [u, v, 0.0, 0.0];
            }
        }
        MaterialUniform {
            color: [self.color.r, self.color.g, self.color.b, self.opacity],
            roughness: self.roughness,
            metalness: self.metalness,
            displacement_scale: self.displacement_scale,
            displacement_bias: self.displacement_bias,
            normal_scale: self.normal_scale,
            ao_intensity: self.ao_intensity,
            map_flags: self.map_flags(),
            map_repeat,
        }
    }

    /// Creates the uniform and bind group on first use, then syncs uniform changes.
    ///
    /// Textures must already be uploaded; slots without a texture are bound to the
    /// library's neutral texture.
    pub fn update_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        textures: &TextureLibrary,
        layout: &BindGroupLayoutWithDesc,
    ) {
        let uniform = self.uniform(textures);
        if let Some(ubo) = &mut self.material_ubo {
            ubo.update_content(queue, uniform);
        } else {
            self.material_ubo = Some(MaterialUBO::new_with_data(device, &uniform));
        }

        if self.bind_group.is_some() {
            return;
        }
        let (Some(ubo), Some(neutral)) = (&self.material_ubo, textures.neutral()) else {
            log::warn!(
                "Material '{}' has no texture fallback yet; upload textures first",
                self.name
            );
            return;
        };

        let mut builder = BindGroupBuilder::new(layout).resource(ubo.binding_resource());
        for slot in MapSlot::ALL {
            let texture = self
                .map(slot)
                .and_then(|id| textures.get(id))
                .unwrap_or(neutral);
            builder = builder.texture(&texture.view).sampler(&texture.sampler);
        }
        self.bind_group = Some(builder.create(device, &format!("{} Material Bind Group", self.name)));
        log::debug!("Created GPU resources for material '{}'", self.name);
    }

    pub fn get_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

/// Manages all materials in the engine
///
/// Centralized storage for all materials. Nodes reference materials by ID
/// rather than storing material data directly, enabling efficient sharing
/// of GPU resources between nodes.
pub struct MaterialManager {
    materials: HashMap<MaterialId, StandardMaterial>,
    default_material_id: MaterialId,
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialManager {
    /// Creates a new material manager with a default material
    pub fn new() -> Self {
        let default_material_id = "default".to_string();
        let mut materials = HashMap::new();
        materials.insert(
            default_material_id.clone(),
            StandardMaterial::new(&default_material_id),
        );
        Self {
            materials,
            default_material_id,
        }
    }

    /// Adds a material, replacing any material with the same name. Returns its id.
    pub fn add_material(&mut self, material: StandardMaterial) -> MaterialId {
        let id = material.name.clone();
        self.materials.insert(id.clone(), material);
        id
    }

    pub fn get_material(&self, id: &str) -> Option<&StandardMaterial> {
        self.materials.get(id)
    }

    pub fn get_material_mut(&mut self, id: &str) -> Option<&mut StandardMaterial> {
        self.materials.get_mut(id)
    }

    pub fn default_material_id(&self) -> &MaterialId {
        &self.default_material_id
    }

    /// Gets the material with `id` or falls back to the default material
    pub fn get_material_or_default(&self, id: &str) -> Option<&StandardMaterial> {
        self.materials
            .get(id)
            .or_else(|| self.materials.get(&self.default_material_id))
    }

    pub fn list_materials(&self) -> Vec<&MaterialId> {
        self.materials.keys().collect()
    }

    pub fn update_all_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        textures: &TextureLibrary,
        layout: &BindGroupLayoutWithDesc,
    ) {
        for material in self.materials.values_mut() {
            material.update_gpu_resources(device, queue, textures, layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::texture_resource::TextureDesc;

    #[test]
    fn uniform_matches_shader_layout() {
        // color, 4 scalars, normal_scale + ao + flags, 7 repeat vectors
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 16 + 16 + 16 + 7 * 16);
    }

    #[test]
    fn arm_map_fills_three_slots() {
        let mut textures = TextureLibrary::new("static");
        let arm = textures.add(TextureDesc::linear("grave/arm.webp").with_repeat(0.3, 0.4));
        let material = StandardMaterial::new("grave").with_arm_map(arm);

        let flags = material.map_flags();
        assert_eq!(
            flags,
            MapSlot::AmbientOcclusion.bit() | MapSlot::Roughness.bit() | MapSlot::Metalness.bit()
        );
        let uniform = material.uniform(&textures);
        assert_eq!(uniform.map_repeat[MapSlot::Roughness as usize][..2], [0.3, 0.4]);
        assert_eq!(uniform.map_repeat[MapSlot::Color as usize][..2], [1.0, 1.0]);
        assert_eq!(uniform.roughness, 1.0);
        assert_eq!(uniform.metalness, 0.0);
    }

    #[test]
    fn displacement_sets_scale_and_bias() {
        let mut textures = TextureLibrary::new("static");
        let height = textures.add(TextureDesc::linear("door/height.webp"));
        let material = StandardMaterial::new("door")
            .with_displacement(height, 0.15, -0.04)
            .with_transparent(true);
        let uniform = material.uniform(&textures);
        assert_eq!(uniform.displacement_scale, 0.15);
        assert_eq!(uniform.displacement_bias, -0.04);
        assert_eq!(uniform.map_flags, MapSlot::Displacement.bit());
        assert!(material.transparent);
    }

    #[test]
    fn unknown_material_falls_back_to_default() {
        let mut manager = MaterialManager::new();
        manager.add_material(StandardMaterial::new("walls"));
        assert_eq!(manager.get_material_or_default("walls").map(|m| m.name.as_str()), Some("walls"));
        assert_eq!(
            manager.get_material_or_default("missing").map(|m| m.name.as_str()),
            Some("default")
        );
        assert_eq!(manager.list_materials().len(), 2);
    }
}
