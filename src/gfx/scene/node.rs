//! Scene graph nodes and their local transforms

use cgmath::{Matrix4, Rad, SquareMatrix, Vector3, Zero};

use crate::{
    gfx::{lights::PointLight, resources::material::MaterialId},
    wgpu_utils::uniform_buffer::UniformBuffer,
};

use super::object::{LineMesh, MeshId};

/// Index of a node inside its [`Scene`](super::Scene)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Position, Euler rotation (applied X then Y then Z in the local frame) and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn from_position(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Vector3::new(x, y, z);
        self
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vector3::new(scale, scale, scale);
        self
    }

    /// Local matrix, T * Rx * Ry * Rz * S
    pub fn matrix(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.position);
        let r = Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z));
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        t * r * s
    }
}

/// A drawable instance of a shared mesh
#[derive(Debug, Clone)]
pub struct MeshNode {
    pub mesh: MeshId,
    pub material: MaterialId,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

pub enum NodeKind {
    Group,
    Mesh(MeshNode),
    PointLight(PointLight),
    /// Red, green and blue lines along +X, +Y and +Z
    AxesHelper(LineMesh),
}

/// Per-object uniform: model matrix plus the matrix used to transform normals
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    /// x: receives shadows (0 or 1)
    pub flags: [f32; 4],
}

impl ObjectUniform {
    pub fn new(world: Matrix4<f32>, receive_shadow: bool) -> Self {
        let normal = world
            .invert()
            .map(|inverse| {
                let mut m = inverse;
                m.transpose_self();
                m
            })
            .unwrap_or_else(Matrix4::identity);
        Self {
            model: world.into(),
            normal: normal.into(),
            flags: [receive_shadow as u32 as f32, 0.0, 0.0, 0.0],
        }
    }
}

pub(crate) struct NodeGpuResources {
    pub object_ubo: UniformBuffer<ObjectUniform>,
    pub bind_group: wgpu::BindGroup,
}

pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) world: Matrix4<f32>,
    /// False when this node or any ancestor is hidden
    pub(crate) world_visible: bool,
    pub(crate) gpu_resources: Option<NodeGpuResources>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            visible: true,
            kind,
            parent: None,
            children: Vec::new(),
            world: Matrix4::identity(),
            world_visible: true,
            gpu_resources: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// World matrix as of the last [`Scene::update_world_matrices`](super::Scene::update_world_matrices)
    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.world
    }

    pub fn world_position(&self) -> Vector3<f32> {
        self.world.w.truncate()
    }

    pub fn is_world_visible(&self) -> bool {
        self.world_visible
    }

    pub fn as_mesh(&self) -> Option<&MeshNode> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_point_light(&self) -> Option<&PointLight> {
        match &self.kind {
            NodeKind::PointLight(light) => Some(light),
            _ => None,
        }
    }

    /// Nodes that are drawn carry a per-object uniform
    pub fn is_drawable(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_) | NodeKind::AxesHelper(_))
    }

    pub(crate) fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources.as_ref().map(|res| &res.bind_group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector4};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn rotation_about_x_lays_a_plane_flat() {
        // A plane facing +Z rotated -90 degrees about X faces +Y
        let transform = Transform::default().with_rotation(-FRAC_PI_2, 0.0, 0.0);
        let normal = transform.matrix() * Vector4::new(0.0, 0.0, 1.0, 0.0);
        assert!((normal.truncate() - Vector3::unit_y()).magnitude() < 1e-6);
    }

    #[test]
    fn euler_order_is_rx_ry_rz() {
        let (x, y, z) = (0.3, -0.7, 1.1);
        let transform = Transform::default().with_rotation(x, y, z);
        let expected = Matrix4::from_angle_x(Rad(x))
            * Matrix4::from_angle_y(Rad(y))
            * Matrix4::from_angle_z(Rad(z));
        let actual = transform.matrix();
        for column in 0..4 {
            assert!((actual[column] - expected[column]).magnitude() < 1e-6);
        }

        // +X turns to +Y about Z, stays put about Y, then lands on +Z about X
        let quarter = Transform::default().with_rotation(FRAC_PI_2, FRAC_PI_2, FRAC_PI_2);
        let p = quarter.matrix() * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert!((p.truncate() - Vector3::unit_z()).magnitude() < 1e-6);
    }

    #[test]
    fn scale_is_applied_before_rotation_and_translation() {
        let transform = Transform::from_position(1.0, 2.0, 3.0)
            .with_rotation(0.0, FRAC_PI_2, 0.0)
            .with_uniform_scale(0.5);
        let p = transform.matrix() * Vector4::new(2.0, 0.0, 0.0, 1.0);
        // (2,0,0) -> scaled (1,0,0) -> rotated about Y to (0,0,-1) -> translated
        assert!((p.truncate() - Vector3::new(1.0, 2.0, 2.0)).magnitude() < 1e-6);
    }

    #[test]
    fn normal_matrix_keeps_normals_perpendicular_under_nonuniform_scale() {
        let mut transform = Transform::default();
        transform.scale = Vector3::new(4.0, 1.0, 1.0);
        let uniform = ObjectUniform::new(transform.matrix(), true);
        let normal: Matrix4<f32> = uniform.normal.into();
        // Surface x = y has normal (1,-1,0); scaling x by 4 turns it into x = 4y
        let n = (normal * Vector4::new(1.0, -1.0, 0.0, 0.0)).truncate();
        let tangent = Vector3::new(4.0, 1.0, 0.0);
        assert!(n.dot(tangent).abs() < 1e-6);
        assert_eq!(uniform.flags[0], 1.0);
    }
}
