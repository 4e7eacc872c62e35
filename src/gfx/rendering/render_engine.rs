//! WGPU-based rendering engine for the haunted house
//!
//! Owns the surface, device and every pipeline. A frame is a set of depth-only
//! shadow passes followed by one main pass (opaque, sky, lines, transparent)
//! and an optional UI overlay.

use std::sync::Arc;

use cgmath::{Matrix4, Vector4};
use wgpu::{Device, TextureFormat};

use crate::{
    config::ShadowConfig,
    error::Result,
    gfx::{
        environment::SkyUniform,
        geometry::generate_box,
        resources::{
            global_bindings::{
                build_global_uniform, FrameLights, GlobalBindings, GlobalUBO, ShadowViews,
                POINT_SHADOW_LAYERS,
            },
            material::create_material_bind_group_layout,
            texture_resource::TextureResource,
        },
        scene::{DrawMesh, Mesh, Node, NodeId, NodeKind, Scene},
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

use super::pipeline_manager::{DepthConfig, PipelineConfig, PipelineManager, VertexLayout};

const SHADOW_PIPELINE: &str = "Shadow";
const SKY_PIPELINE: &str = "Sky";
const PBR_PIPELINE: &str = "PBR";
const TRANSPARENT_PIPELINE: &str = "PBR Transparent";
const LINES_PIPELINE: &str = "Lines";

/// MUST match `ShadowCamera` in shadow.wgsl
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct ShadowCameraUniform {
    view_proj: [[f32; 4]; 4],
}

/// One layer of a shadow map together with the camera that renders into it
struct ShadowTarget {
    view: wgpu::TextureView,
    ubo: UniformBuffer<ShadowCameraUniform>,
    bind_group: wgpu::BindGroup,
}

impl ShadowTarget {
    fn new(
        device: &Device,
        map: &TextureResource,
        layer: u32,
        layout: &BindGroupLayoutWithDesc,
    ) -> Self {
        let ubo = UniformBuffer::new(device);
        let bind_group = BindGroupBuilder::new(layout)
            .resource(ubo.binding_resource())
            .create(device, "Shadow Camera Bind Group");
        Self {
            view: map.layer_view(layer),
            ubo,
            bind_group,
        }
    }
}

struct SkyResources {
    mesh: Mesh,
    ubo: UniformBuffer<SkyUniform>,
    bind_group: wgpu::BindGroup,
}

/// Core rendering engine managing GPU resources and draw calls
///
/// The RenderEngine handles all low-level graphics operations including:
/// - Surface and device management
/// - Pipeline creation and management
/// - Depth buffer and shadow map handling
/// - Global uniform updates
/// - UI overlay rendering
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    object_layout: BindGroupLayoutWithDesc,
    material_layout: BindGroupLayoutWithDesc,

    // Shadow mapping resources
    shadows: ShadowConfig,
    _directional_shadow: TextureResource,
    _point_shadows: TextureResource,
    /// Directional target first, then six per shadowed point light
    shadow_targets: Vec<ShadowTarget>,
    directional_shadow_active: bool,
    point_shadow_layers: usize,

    sky: SkyResources,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Initializes wgpu, creates depth and shadow buffers and registers every
    /// pipeline the scene is drawn with.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        shadows: ShadowConfig,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let directional_shadow =
            TextureResource::create_shadow_map(&device, shadows.map_size, 1, "Directional Shadow");
        let point_shadows = TextureResource::create_shadow_map(
            &device,
            shadows.map_size,
            POINT_SHADOW_LAYERS as u32,
            "Point Shadows",
        );

        // Bind group layouts
        let object_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(&device, "Object Bind Group Layout");
        let material_layout = create_material_bind_group_layout(&device);
        let shadow_camera_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(&device, "Shadow Camera Bind Group Layout");
        let sky_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(&device, "Sky Bind Group Layout");

        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo, &directional_shadow, &point_shadows);

        let mut shadow_targets = vec![ShadowTarget::new(
            &device,
            &directional_shadow,
            0,
            &shadow_camera_layout,
        )];
        shadow_targets.extend((0..POINT_SHADOW_LAYERS as u32).map(|layer| {
            ShadowTarget::new(&device, &point_shadows, layer, &shadow_camera_layout)
        }));

        let mut sky_mesh = Mesh::from_geometry("Sky", &generate_box(1.0, 1.0, 1.0, 1, 1, 1));
        sky_mesh.init_gpu_resources(&device);
        let sky_ubo = UniformBuffer::new(&device);
        let sky_bind_group = BindGroupBuilder::new(&sky_layout)
            .resource(sky_ubo.binding_resource())
            .create(&device, "Sky Bind Group");

        // Wrap device and queue in Arc for pipeline manager
        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.register_bind_group_layout("globals", global_bindings.bind_group_layouts().clone());
        pipeline_manager.register_bind_group_layout("object", object_layout.layout.clone());
        pipeline_manager.register_bind_group_layout("material", material_layout.layout.clone());
        pipeline_manager.register_bind_group_layout("shadow_camera", shadow_camera_layout.layout.clone());
        pipeline_manager.register_bind_group_layout("sky", sky_layout.layout.clone());

        pipeline_manager.load_shader("pbr", include_str!("pbr.wgsl"));
        pipeline_manager.load_shader("shadow", include_str!("shadow.wgsl"));
        pipeline_manager.load_shader("sky", include_str!("sky.wgsl"));
        pipeline_manager.load_shader("lines", include_str!("lines.wgsl"));

        if let Err(e) = Self::register_pipelines(&mut pipeline_manager, format) {
            log::error!("{}", e);
        }
        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{}", error);
            }
        }
        if pipeline_manager.pipeline(SHADOW_PIPELINE).is_none() {
            log::warn!("Shadow pipeline not available; shadow passes are skipped");
        }
        let stats = pipeline_manager.get_stats();
        log::info!(
            "Render engine ready: {} pipelines, {} shaders, {}x{} {:?}",
            stats.total_pipelines,
            stats.loaded_shaders,
            config.width,
            config.height,
            format
        );

        Ok(RenderEngine {
            device: device_handle,
            config,
            format,
            surface,
            queue: queue_handle,
            depth_texture,
            pipeline_manager,
            global_bindings,
            global_ubo,
            object_layout,
            material_layout,
            shadows,
            _directional_shadow: directional_shadow,
            _point_shadows: point_shadows,
            shadow_targets,
            directional_shadow_active: false,
            point_shadow_layers: 0,
            sky: SkyResources {
                mesh: sky_mesh,
                ubo: sky_ubo,
                bind_group: sky_bind_group,
            },
        })
    }

    fn register_pipelines(
        pipeline_manager: &mut PipelineManager,
        format: TextureFormat,
    ) -> std::result::Result<(), String> {
        let depth = DepthConfig::new(TextureResource::DEPTH_FORMAT);

        // No culling so thin casters still write depth
        pipeline_manager.register_pipeline(
            SHADOW_PIPELINE,
            PipelineConfig::default_with_shader("shadow")
                .with_label("SHADOW")
                .with_vertex_only()
                .with_cull_mode(None)
                .with_depth_stencil(depth.clone().with_bias(2, 2.0))
                .with_bind_group_layouts(pipeline_manager.layouts(&["shadow_camera", "object"])?),
        );

        // The camera sits inside the box
        pipeline_manager.register_pipeline(
            SKY_PIPELINE,
            PipelineConfig::default_with_shader("sky")
                .with_label("SKY")
                .with_cull_mode(Some(wgpu::Face::Front))
                .with_depth_stencil(depth.clone().read_only())
                .with_color_target(format, wgpu::BlendState::REPLACE)
                .with_bind_group_layouts(pipeline_manager.layouts(&["sky"])?),
        );

        let lit_layouts = pipeline_manager.layouts(&["globals", "object", "material"])?;
        pipeline_manager.register_pipeline(
            PBR_PIPELINE,
            PipelineConfig::default_with_shader("pbr")
                .with_label("PBR")
                .with_depth_stencil(depth.clone())
                .with_color_target(format, wgpu::BlendState::REPLACE)
                .with_bind_group_layouts(lit_layouts.clone()),
        );
        pipeline_manager.register_pipeline(
            TRANSPARENT_PIPELINE,
            PipelineConfig::default_with_shader("pbr")
                .with_label("PBR TRANSPARENT")
                .with_depth_stencil(depth.clone())
                .with_color_target(format, wgpu::BlendState::ALPHA_BLENDING)
                .with_bind_group_layouts(lit_layouts),
        );

        pipeline_manager.register_pipeline(
            LINES_PIPELINE,
            PipelineConfig::default_with_shader("lines")
                .with_label("LINES")
                .with_vertex_layout(VertexLayout::Lines)
                .with_primitive_topology(wgpu::PrimitiveTopology::LineList)
                .with_cull_mode(None)
                .with_depth_stencil(depth)
                .with_color_target(format, wgpu::BlendState::REPLACE)
                .with_bind_group_layouts(pipeline_manager.layouts(&["globals", "object"])?),
        );
        Ok(())
    }

    /// Uploads the scene's meshes, textures, materials and node uniforms
    pub fn init_scene(&self, scene: &mut Scene) {
        scene.init_gpu_resources(
            &self.device,
            &self.queue,
            &self.object_layout,
            &self.material_layout,
        );
    }

    /// Writes the frame's global state: camera, lights, fog, shadow cameras and sky.
    ///
    /// Call after [`Scene::update`] so world matrices are current.
    pub fn update(&mut self, scene: &mut Scene) {
        scene.update_gpu(&self.device, &self.queue, &self.material_layout);

        let point_lights = scene.point_lights();
        let frame = FrameLights {
            ambient: &scene.ambient_light,
            directional: &scene.directional_light,
            point_lights: &point_lights,
            fog: &scene.fog,
        };
        let views = ShadowViews::collect(&frame, &self.shadows);
        let camera = scene.camera_manager.camera.uniform;
        self.global_ubo.update_content(
            &self.queue,
            build_global_uniform(&camera, &frame, &views, &self.shadows),
        );

        if let Some(view_proj) = views.directional {
            self.shadow_targets[0].ubo.update_content(
                &self.queue,
                ShadowCameraUniform {
                    view_proj: view_proj.into(),
                },
            );
        }
        for (target, face) in self.shadow_targets[1..].iter_mut().zip(&views.point_faces) {
            target.ubo.update_content(
                &self.queue,
                ShadowCameraUniform {
                    view_proj: (*face).into(),
                },
            );
        }
        self.directional_shadow_active = views.directional.is_some();
        self.point_shadow_layers = views.point_faces.len().min(POINT_SHADOW_LAYERS);

        if let Some(sky) = &scene.sky {
            self.sky
                .ubo
                .update_content(&self.queue, sky.uniform(camera.view_proj, camera.view_position));
        }
    }

    /// Renders a frame with an optional UI overlay
    ///
    /// Surface errors are returned so the caller can reconfigure or skip the frame.
    pub fn render_frame<F>(
        &mut self,
        scene: &Scene,
        ui_callback: Option<F>,
    ) -> std::result::Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // PASS 1: shadow maps
        let active_targets = self
            .shadow_targets
            .iter()
            .enumerate()
            .filter(|(i, _)| {
                if *i == 0 {
                    self.directional_shadow_active
                } else {
                    *i <= self.point_shadow_layers
                }
            })
            .map(|(_, target)| target);
        if let Some(shadow_pipeline) = self.pipeline_manager.pipeline(SHADOW_PIPELINE) {
            for target in active_targets {
                let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Shadow Depth Pass"),
                    color_attachments: &[],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &target.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });
                shadow_pass.set_pipeline(shadow_pipeline);
                shadow_pass.set_bind_group(0, &target.bind_group, &[]);

                for (_, node, mesh_node) in scene.mesh_nodes().filter(|(_, _, m)| m.cast_shadow) {
                    if let Some(bind_group) = node.bind_group() {
                        shadow_pass.set_bind_group(1, bind_group, &[]);
                        shadow_pass.draw_mesh(scene.mesh(mesh_node.mesh));
                    }
                }
            }
        }

        // PASS 2: main rendering with shadows
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let (opaque, transparent) = draw_lists(scene);

            if let Some(pipeline) = self.pipeline_manager.pipeline(PBR_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.global_bindings.bind_groups(), &[]);
                for id in opaque {
                    draw_node(&mut render_pass, scene, scene.node(id));
                }
            }

            if let (Some(pipeline), Some(_)) =
                (self.pipeline_manager.pipeline(SKY_PIPELINE), &scene.sky)
            {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.sky.bind_group, &[]);
                render_pass.draw_mesh(&self.sky.mesh);
            }

            if let Some(pipeline) = self.pipeline_manager.pipeline(LINES_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.global_bindings.bind_groups(), &[]);
                for (_, node) in scene.nodes().filter(|(_, n)| n.is_world_visible()) {
                    if let (NodeKind::AxesHelper(lines), Some(bind_group)) =
                        (&node.kind, node.bind_group())
                    {
                        render_pass.set_bind_group(1, bind_group, &[]);
                        render_pass.draw_lines(lines);
                    }
                }
            }

            if let Some(pipeline) = self.pipeline_manager.pipeline(TRANSPARENT_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.global_bindings.bind_groups(), &[]);
                let view = scene.camera_manager.camera.view_matrix();
                for id in back_to_front(scene, transparent, view) {
                    draw_node(&mut render_pass, scene, scene.node(id));
                }
            }
        }

        // PASS 3: UI overlay (if provided)
        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Resizes the render engine surface and recreates depth buffer
    ///
    /// Zero-sized requests (minimised windows) are ignored. Shadow maps keep
    /// their fixed resolution.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
    }

    /// Reconfigures the surface at its current size, used after it was lost
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the surface texture format
    ///
    /// Used for creating compatible render targets and UI systems.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

fn draw_node<'a>(render_pass: &mut wgpu::RenderPass<'a>, scene: &'a Scene, node: &'a Node) {
    let Some(mesh_node) = node.as_mesh() else {
        return;
    };
    let material = scene
        .material_manager
        .get_material_or_default(&mesh_node.material);
    let (Some(object), Some(material)) = (
        node.bind_group(),
        material.and_then(|m| m.get_bind_group()),
    ) else {
        log::debug!("Skipping '{}' - no GPU resources", node.name);
        return;
    };
    render_pass.set_bind_group(1, object, &[]);
    render_pass.set_bind_group(2, material, &[]);
    render_pass.draw_mesh(scene.mesh(mesh_node.mesh));
}

/// Visible mesh nodes split into opaque and transparent, in scene order
fn draw_lists(scene: &Scene) -> (Vec<NodeId>, Vec<NodeId>) {
    scene.mesh_nodes().map(|(id, _, mesh_node)| {
        let transparent = scene
            .material_manager
            .get_material_or_default(&mesh_node.material)
            .is_some_and(|m| m.transparent);
        (id, transparent)
    })
    .fold((Vec::new(), Vec::new()), |(mut opaque, mut transparent), (id, is_transparent)| {
        if is_transparent {
            transparent.push(id);
        } else {
            opaque.push(id);
        }
        (opaque, transparent)
    })
}

/// Farthest first by view-space depth of each node's origin; ties keep scene order
fn back_to_front(scene: &Scene, mut ids: Vec<NodeId>, view: Matrix4<f32>) -> Vec<NodeId> {
    let depth = |id: NodeId| {
        let p = scene.node(id).world_position();
        (view * Vector4::new(p.x, p.y, p.z, 1.0)).z
    };
    ids.sort_by(|a, b| depth(*a).total_cmp(&depth(*b)));
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::CameraConfig,
        gfx::{
            camera::{CameraController, CameraManager, OrbitCamera},
            geometry::generate_plane,
            resources::{material::StandardMaterial, texture_library::TextureLibrary},
            scene::{MeshNode, Transform},
        },
    };

    fn scene_with_planes() -> (Scene, NodeId, NodeId, NodeId) {
        let camera = OrbitCamera::from_config(&CameraConfig::default(), 1.5);
        let mut scene = Scene::new(
            CameraManager::new(camera, CameraController::new(1.0, 1.0, 1.0)),
            TextureLibrary::new("static"),
        );
        let glass = scene.add_material(StandardMaterial::new("glass").with_transparent(true));
        let mesh = scene.add_mesh(Mesh::from_geometry("plane", &generate_plane(1.0, 1.0, 1, 1)));
        let node = |material: &str| MeshNode {
            mesh,
            material: material.to_string(),
            cast_shadow: false,
            receive_shadow: false,
        };
        let near = scene.add_mesh_node("near", Transform::from_position(3.0, 1.5, 4.0), node(&glass), None);
        let solid = scene.add_mesh_node("solid", Transform::default(), node("default"), None);
        let far = scene.add_mesh_node("far", Transform::from_position(-3.0, 0.0, -4.0), node(&glass), None);
        scene.update_world_matrices();
        (scene, near, solid, far)
    }

    #[test]
    fn transparent_nodes_are_drawn_separately() {
        let (scene, near, solid, far) = scene_with_planes();
        let (opaque, transparent) = draw_lists(&scene);
        assert_eq!(opaque, vec![solid]);
        assert_eq!(transparent, vec![near, far]);
    }

    #[test]
    fn transparent_nodes_sort_farthest_first() {
        let (scene, near, _, far) = scene_with_planes();
        let view = scene.camera_manager.camera.view_matrix();
        assert_eq!(back_to_front(&scene, vec![near, far], view), vec![far, near]);
    }

    #[test]
    fn shadow_camera_uniform_is_one_matrix() {
        assert_eq!(std::mem::size_of::<ShadowCameraUniform>(), 64);
    }
}
