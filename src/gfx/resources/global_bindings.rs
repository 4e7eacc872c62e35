//! Global uniform bindings for camera, lights, fog and shadow maps
//!
//! Manages the GPU uniform buffer and bind group for the per-frame state
//! shared by every draw in the scene. Bound to slot 0 in the lit pipelines.

use cgmath::{Matrix4, Point3, SquareMatrix};

use crate::{
    config::ShadowConfig,
    gfx::{
        camera::camera_utils::CameraUniform,
        environment::Fog,
        lights::{AmbientLight, DirectionalLight, PointLight, CUBE_FACES},
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

use super::texture_resource::TextureResource;

pub const MAX_POINT_LIGHTS: usize = 4;
pub const MAX_POINT_SHADOWS: usize = 3;
pub const POINT_SHADOW_LAYERS: usize = MAX_POINT_SHADOWS * CUBE_FACES;

/// Depth offset applied before the shadow comparison
const SHADOW_BIAS: f32 = 0.002;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    /// xyz: world position, w: decay exponent
    pub position: [f32; 4],
    /// rgb: colour times intensity, a: shadow slot (layers `6 * slot..6 * slot + 6`), or -1
    pub color: [f32; 4],
}

/// Global uniform buffer content.
///
/// MUST match the `Globals` struct in the WGSL shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub ambient: [f32; 4],
    /// xyz: unit vector towards the light, w: 1 when it casts shadows
    pub directional_direction: [f32; 4],
    pub directional_color: [f32; 4],
    pub directional_view_proj: [[f32; 4]; 4],
    /// rgb: fog colour, a: exponential squared density
    pub fog: [f32; 4],
    pub point_lights: [PointLightUniform; MAX_POINT_LIGHTS],
    pub point_shadow_view_proj: [[[f32; 4]; 4]; POINT_SHADOW_LAYERS],
    /// x: point light count, y: shadow map size in texels, z: depth bias
    pub params: [f32; 4],
}

/// Lights and environment gathered from the scene for one frame
pub struct FrameLights<'a> {
    pub ambient: &'a AmbientLight,
    pub directional: &'a DirectionalLight,
    /// World positions, in draw order; the first shadow casters get the shadow layers
    pub point_lights: &'a [(Point3<f32>, PointLight)],
    pub fog: &'a Fog,
}

/// Shadow cameras for one frame: the directional map, then six faces per shadowed point light
#[derive(Debug, Clone)]
pub struct ShadowViews {
    pub directional: Option<Matrix4<f32>>,
    pub point_faces: Vec<Matrix4<f32>>,
}

impl ShadowViews {
    pub fn collect(lights: &FrameLights, shadows: &ShadowConfig) -> Self {
        let directional = lights
            .directional
            .cast_shadow
            .then(|| lights.directional.shadow_view_proj(shadows));
        let point_faces = lights
            .point_lights
            .iter()
            .filter(|(_, light)| light.cast_shadow)
            .take(MAX_POINT_SHADOWS)
            .flat_map(|(position, _)| PointLight::cube_view_projs(*position, shadows))
            .collect();
        Self {
            directional,
            point_faces,
        }
    }
}

/// Number of point lights past [`MAX_POINT_LIGHTS`] that the lit passes ignore
pub fn unlit_point_lights(count: usize) -> usize {
    count.saturating_sub(MAX_POINT_LIGHTS)
}

pub fn build_global_uniform(
    camera: &CameraUniform,
    lights: &FrameLights,
    shadow_views: &ShadowViews,
    shadows: &ShadowConfig,
) -> GlobalUniform {
    let ambient = lights.ambient.color.scaled(lights.ambient.intensity);
    let directional = lights.directional;
    let direction = directional.direction();
    let directional_color = directional.color.scaled(directional.intensity);
    let fog = lights.fog.color;

    let mut point_lights = [PointLightUniform::default(); MAX_POINT_LIGHTS];
    let mut shadow_slot = 0;
    let mut count = 0;
    for (uniform, (position, light)) in point_lights.iter_mut().zip(lights.point_lights) {
        let shadow_index = if light.cast_shadow && shadow_slot < MAX_POINT_SHADOWS {
            shadow_slot += 1;
            (shadow_slot - 1) as f32
        } else {
            -1.0
        };
        let [r, g, b] = light.color.scaled(light.intensity);
        *uniform = PointLightUniform {
            position: [position.x, position.y, position.z, light.decay],
            color: [r, g, b, shadow_index],
        };
        count += 1;
    }

    let identity: [[f32; 4]; 4] = Matrix4::<f32>::identity().into();
    let mut point_shadow_view_proj = [identity; POINT_SHADOW_LAYERS];
    for (slot, face) in point_shadow_view_proj
        .iter_mut()
        .zip(&shadow_views.point_faces)
    {
        *slot = (*face).into();
    }

    GlobalUniform {
        view_proj: camera.view_proj,
        view: camera.view,
        camera_position: camera.view_position,
        ambient: [ambient[0], ambient[1], ambient[2], 1.0],
        directional_direction: [
            direction.x,
            direction.y,
            direction.z,
            shadow_views.directional.is_some() as u32 as f32,
        ],
        directional_color: [
            directional_color[0],
            directional_color[1],
            directional_color[2],
            1.0,
        ],
        directional_view_proj: shadow_views
            .directional
            .unwrap_or_else(Matrix4::identity)
            .into(),
        fog: [fog.r, fog.g, fog.b, lights.fog.density],
        point_lights,
        point_shadow_view_proj,
        params: [count as f32, shadows.map_size as f32, SHADOW_BIAS, 0.0],
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUniform>;

/// Manages the bind group layout and bind group for global uniforms
///
/// Binding 0 is the uniform, 1 the single-layer directional shadow map, 2 the
/// point light shadow array and 3 the shared comparison sampler.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .next_binding_fragment(binding_types::depth_texture_2d_array())
            .next_binding_fragment(binding_types::depth_texture_2d_array())
            .next_binding_fragment(binding_types::sampler(
                wgpu::SamplerBindingType::Comparison,
            ))
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    pub fn create_bind_group(
        &mut self,
        device: &wgpu::Device,
        ubo: &GlobalUBO,
        directional_shadow: &TextureResource,
        point_shadows: &TextureResource,
    ) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .texture(&directional_shadow.view)
                .texture(&point_shadows.view)
                .sampler(&directional_shadow.sampler)
                .create(device, "Global Bind Group"),
        );
    }

    pub fn bind_group_layouts(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_groups(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::color::Color;

    fn lights() -> (AmbientLight, DirectionalLight, Vec<(Point3<f32>, PointLight)>, Fog) {
        let ambient = AmbientLight::new(Color::WHITE, 0.5);
        let mut directional = DirectionalLight::new(Color::WHITE, 1.0, Point3::new(3.0, 2.0, -8.0));
        directional.cast_shadow = true;
        let points = vec![
            (Point3::new(0.0, 2.2, 2.5), PointLight::new(Color::WHITE, 5.0)),
            (Point3::new(4.0, 0.0, 0.0), PointLight::new(Color::WHITE, 6.0).with_shadow()),
            (Point3::new(5.0, 0.0, 0.0), PointLight::new(Color::WHITE, 6.0).with_shadow()),
            (Point3::new(6.0, 0.0, 0.0), PointLight::new(Color::WHITE, 6.0).with_shadow()),
        ];
        let fog = Fog::new(Color::BLACK, 0.1);
        (ambient, directional, points, fog)
    }

    #[test]
    fn uniform_size_is_a_multiple_of_16() {
        let size = std::mem::size_of::<GlobalUniform>();
        assert_eq!(size % 16, 0);
        assert_eq!(size, 64 * 2 + 16 * 4 + 64 + 16 + 32 * 4 + 64 * 18 + 16);
    }

    #[test]
    fn shadow_layers_skip_lights_without_shadows() {
        let (ambient, directional, points, fog) = lights();
        let frame = FrameLights {
            ambient: &ambient,
            directional: &directional,
            point_lights: &points,
            fog: &fog,
        };
        let shadows = ShadowConfig::default();
        let views = ShadowViews::collect(&frame, &shadows);
        assert!(views.directional.is_some());
        assert_eq!(views.point_faces.len(), POINT_SHADOW_LAYERS);

        let uniform = build_global_uniform(&CameraUniform::default(), &frame, &views, &shadows);
        let shadow_indices: Vec<f32> = uniform.point_lights.iter().map(|l| l.color[3]).collect();
        assert_eq!(shadow_indices, vec![-1.0, 0.0, 1.0, 2.0]);
        assert_eq!(uniform.point_lights[0].color[0], 5.0);
        assert_eq!(uniform.point_lights[1].position[3], 2.0);
        assert_eq!(uniform.params[0], 4.0);
        assert_eq!(uniform.params[1], 256.0);
        assert_eq!(uniform.directional_direction[3], 1.0);
        assert_eq!(uniform.fog[3], 0.1);
        assert_eq!(uniform.ambient[0], 0.5);
    }

    #[test]
    fn extra_point_lights_are_dropped() {
        let (ambient, directional, mut points, fog) = lights();
        points.push((Point3::new(0.0, 0.0, 0.0), PointLight::new(Color::WHITE, 1.0)));
        let frame = FrameLights {
            ambient: &ambient,
            directional: &directional,
            point_lights: &points,
            fog: &fog,
        };
        let shadows = ShadowConfig::default();
        let views = ShadowViews::collect(&frame, &shadows);
        let uniform = build_global_uniform(&CameraUniform::default(), &frame, &views, &shadows);
        assert_eq!(uniform.params[0], MAX_POINT_LIGHTS as f32);
        assert_eq!(unlit_point_lights(points.len()), 1);
        assert_eq!(unlit_point_lights(MAX_POINT_LIGHTS), 0);
    }
}
