use cgmath::{EuclideanSpace, Matrix4, Point3, SquareMatrix, Vector3};
use wgpu::Device;

use crate::{
    gfx::{
        camera::camera_utils::CameraManager,
        color::Color,
        environment::{Fog, Sky},
        lights::{AmbientLight, DirectionalLight, PointLight},
        resources::{
            material::{MaterialId, MaterialManager, StandardMaterial},
            texture_library::TextureLibrary,
        },
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutWithDesc},
        uniform_buffer::UniformBuffer,
    },
};

use super::{
    node::{MeshNode, Node, NodeGpuResources, NodeId, NodeKind, ObjectUniform, Transform},
    object::{LineMesh, Mesh, MeshId},
};

/// Retained scene graph: an arena of nodes plus the shared meshes, materials,
/// textures, lights and environment they are drawn with
pub struct Scene {
    pub camera_manager: CameraManager,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    meshes: Vec<Mesh>,
    pub material_manager: MaterialManager,
    pub textures: TextureLibrary,
    pub ambient_light: AmbientLight,
    pub directional_light: DirectionalLight,
    pub fog: Fog,
    pub sky: Option<Sky>,
}

impl Scene {
    pub fn new(camera_manager: CameraManager, textures: TextureLibrary) -> Self {
        Self {
            camera_manager,
            nodes: Vec::new(),
            roots: Vec::new(),
            meshes: Vec::new(),
            material_manager: MaterialManager::new(),
            textures,
            ambient_light: AmbientLight::new(Color::WHITE, 0.0),
            directional_light: DirectionalLight::new(
                Color::WHITE,
                0.0,
                Point3::new(0.0, 1.0, 0.0),
            ),
            fog: Fog::new(Color::BLACK, 0.0),
            sky: None,
        }
    }

    /// Inserts `node` under `parent`, or at the top level when `parent` is None
    pub fn add_node(&mut self, mut node: Node, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = parent;
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        self.nodes.push(node);
        id
    }

    pub fn add_group(&mut self, name: &str, transform: Transform, parent: Option<NodeId>) -> NodeId {
        self.add_node(Node::new(name, NodeKind::Group).with_transform(transform), parent)
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    /// Adds a material and returns the id nodes use to reference it
    pub fn add_material(&mut self, material: StandardMaterial) -> MaterialId {
        self.material_manager.add_material(material)
    }

    pub fn add_mesh_node(
        &mut self,
        name: &str,
        transform: Transform,
        mesh: MeshNode,
        parent: Option<NodeId>,
    ) -> NodeId {
        self.add_node(
            Node::new(name, NodeKind::Mesh(mesh)).with_transform(transform),
            parent,
        )
    }

    pub fn add_point_light(
        &mut self,
        name: &str,
        position: Vector3<f32>,
        light: PointLight,
        parent: Option<NodeId>,
    ) -> NodeId {
        let transform = Transform::from_position(position.x, position.y, position.z);
        self.add_node(
            Node::new(name, NodeKind::PointLight(light)).with_transform(transform),
            parent,
        )
    }

    pub fn add_axes_helper(&mut self, size: f32, parent: Option<NodeId>) -> NodeId {
        self.add_node(
            Node::new("Axes Helper", NodeKind::AxesHelper(LineMesh::axes(size))),
            parent,
        )
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn mesh(&self, id: MeshId) -> &Mesh {
        &self.meshes[id.0]
    }

    pub fn set_position(&mut self, id: NodeId, position: Vector3<f32>) {
        self.nodes[id.0].transform.position = position;
    }

    /// Recomputes every world matrix as parent world times local, top down
    pub fn update_world_matrices(&mut self) {
        let mut stack: Vec<(NodeId, Matrix4<f32>, bool)> = self
            .roots
            .iter()
            .rev()
            .map(|&id| (id, Matrix4::identity(), true))
            .collect();

        while let Some((id, parent_world, parent_visible)) = stack.pop() {
            let node = &mut self.nodes[id.0];
            node.world = parent_world * node.transform.matrix();
            node.world_visible = parent_visible && node.visible;
            let (world, visible) = (node.world, node.world_visible);
            stack.extend(node.children.iter().rev().map(|&child| (child, world, visible)));
        }
    }

    /// Visible point lights with their world positions, in insertion order
    pub fn point_lights(&self) -> Vec<(Point3<f32>, PointLight)> {
        self.nodes
            .iter()
            .filter(|node| node.world_visible)
            .filter_map(|node| {
                node.as_point_light()
                    .map(|light| (Point3::from_vec(node.world_position()), *light))
            })
            .collect()
    }

    /// Visible mesh nodes
    pub fn mesh_nodes(&self) -> impl Iterator<Item = (NodeId, &Node, &MeshNode)> {
        self.nodes().filter_map(|(id, node)| {
            let mesh = node.as_mesh()?;
            node.world_visible.then_some((id, node, mesh))
        })
    }

    /// Updates the camera and all world matrices
    pub fn update(&mut self) {
        self.camera_manager.update();
        self.update_world_matrices();
    }

    /// Uploads textures, meshes, per-node uniforms and materials.
    ///
    /// Must be called after the GPU context is available and before rendering.
    pub fn init_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        object_layout: &BindGroupLayoutWithDesc,
        material_layout: &BindGroupLayoutWithDesc,
    ) {
        self.update_world_matrices();
        self.textures.upload_all(device, queue);

        for mesh in &mut self.meshes {
            mesh.init_gpu_resources(device);
        }

        for node in &mut self.nodes {
            if let NodeKind::AxesHelper(lines) = &mut node.kind {
                lines.init_gpu_resources(device);
            }
            if !node.is_drawable() || node.gpu_resources.is_some() {
                continue;
            }
            let receive_shadow = node.as_mesh().is_some_and(|m| m.receive_shadow);
            let object_ubo = UniformBuffer::new_with_data(
                device,
                &ObjectUniform::new(node.world, receive_shadow),
            );
            let bind_group = BindGroupBuilder::new(object_layout)
                .resource(object_ubo.binding_resource())
                .create(device, &format!("{} Object Bind Group", node.name));
            node.gpu_resources = Some(NodeGpuResources {
                object_ubo,
                bind_group,
            });
        }

        self.material_manager
            .update_all_gpu_resources(device, queue, &self.textures, material_layout);

        let stats = self.get_statistics();
        log::info!(
            "Scene GPU resources ready: {} nodes, {} meshes, {} materials, {} triangles drawn",
            stats.node_count,
            stats.mesh_count,
            stats.material_count,
            stats.total_triangles
        );
    }

    /// Syncs node transforms and material parameters to the GPU
    pub fn update_gpu(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        material_layout: &BindGroupLayoutWithDesc,
    ) {
        for node in &mut self.nodes {
            let receive_shadow = node.as_mesh().is_some_and(|m| m.receive_shadow);
            if let Some(resources) = &mut node.gpu_resources {
                resources
                    .object_ubo
                    .update_content(queue, ObjectUniform::new(node.world, receive_shadow));
            }
        }
        self.material_manager
            .update_all_gpu_resources(device, queue, &self.textures, material_layout);
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        let (mut mesh_nodes, mut total_triangles, mut total_vertices) = (0, 0, 0);
        for (_, _, mesh_node) in self.mesh_nodes() {
            let mesh = self.mesh(mesh_node.mesh);
            mesh_nodes += 1;
            total_triangles += mesh.index_count() / 3;
            total_vertices += mesh.vertex_count();
        }
        SceneStatistics {
            node_count: self.nodes.len(),
            mesh_node_count: mesh_nodes,
            mesh_count: self.meshes.len(),
            material_count: self.material_manager.list_materials().len(),
            point_light_count: self.point_lights().len(),
            total_triangles,
            total_vertices,
        }
    }
}

/// Scene statistics for debugging and UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub node_count: usize,
    pub mesh_node_count: usize,
    pub mesh_count: usize,
    pub material_count: usize,
    pub point_light_count: usize,
    pub total_triangles: u32,
    pub total_vertices: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::CameraConfig,
        gfx::{
            camera::{CameraController, OrbitCamera},
            geometry::generate_box,
        },
    };
    use cgmath::InnerSpace;

    fn scene() -> Scene {
        let camera = OrbitCamera::from_config(&CameraConfig::default(), 1.5);
        Scene::new(
            CameraManager::new(camera, CameraController::new(1.0, 1.0, 1.0)),
            TextureLibrary::new("static"),
        )
    }

    fn mesh_node(mesh: MeshId) -> MeshNode {
        MeshNode {
            mesh,
            material: "default".to_string(),
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    #[test]
    fn children_inherit_parent_transforms() {
        let mut scene = scene();
        let group = scene.add_group(
            "house",
            Transform::from_position(10.0, 0.0, 0.0).with_uniform_scale(2.0),
            None,
        );
        let mesh = scene.add_mesh(Mesh::from_geometry("box", &generate_box(1.0, 1.0, 1.0, 1, 1, 1)));
        let child = scene.add_mesh_node(
            "walls",
            Transform::from_position(0.0, 1.25, 0.0),
            mesh_node(mesh),
            Some(group),
        );
        scene.update_world_matrices();

        let p = scene.node(child).world_position();
        assert!((p - Vector3::new(10.0, 2.5, 0.0)).magnitude() < 1e-6);
        assert_eq!(scene.node(child).parent(), Some(group));
        assert_eq!(scene.node(group).children(), &[child]);
        assert_eq!(scene.roots(), &[group]);
    }

    #[test]
    fn point_lights_report_world_positions() {
        let mut scene = scene();
        let group = scene.add_group("house", Transform::from_position(0.0, 1.0, 0.0), None);
        scene.add_point_light(
            "door light",
            Vector3::new(0.0, 2.2, 2.5),
            PointLight::new(Color::WHITE, 5.0),
            Some(group),
        );
        let ghost = scene.add_point_light(
            "ghost",
            Vector3::new(0.0, 0.0, 0.0),
            PointLight::new(Color::WHITE, 6.0).with_shadow(),
            None,
        );
        scene.set_position(ghost, Vector3::new(4.0, 0.5, 0.0));
        scene.update_world_matrices();

        let lights = scene.point_lights();
        assert_eq!(lights.len(), 2);
        assert!((lights[0].0.y - 3.2).abs() < 1e-6);
        assert_eq!(lights[1].0, Point3::new(4.0, 0.5, 0.0));
        assert!(lights[1].1.cast_shadow);
    }

    #[test]
    fn hidden_groups_hide_their_children() {
        let mut scene = scene();
        let mesh = scene.add_mesh(Mesh::from_geometry("box", &generate_box(1.0, 1.0, 1.0, 1, 1, 1)));
        let group = scene.add_group("graves", Transform::default(), None);
        for i in 0..3 {
            scene.add_mesh_node(
                &format!("grave {i}"),
                Transform::default(),
                mesh_node(mesh),
                Some(group),
            );
        }
        scene.update_world_matrices();
        assert_eq!(scene.mesh_nodes().count(), 3);

        scene.node_mut(group).visible = false;
        scene.update_world_matrices();
        assert_eq!(scene.mesh_nodes().count(), 0);
        assert!(!scene.node(NodeId(2)).is_world_visible());
    }

    #[test]
    fn shared_meshes_count_once_per_node() {
        let mut scene = scene();
        let mesh = scene.add_mesh(Mesh::from_geometry("box", &generate_box(1.0, 1.0, 1.0, 1, 1, 1)));
        scene.add_mesh_node("a", Transform::default(), mesh_node(mesh), None);
        scene.add_mesh_node("b", Transform::default(), mesh_node(mesh), None);
        scene.add_axes_helper(1.0, None);
        scene.update_world_matrices();

        let stats = scene.get_statistics();
        assert_eq!(stats.mesh_count, 1);
        assert_eq!(stats.mesh_node_count, 2);
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.total_triangles, 24);
        assert_eq!(stats.total_vertices, 48);
        assert_eq!(scene.find("b"), Some(NodeId(1)));
    }
}
