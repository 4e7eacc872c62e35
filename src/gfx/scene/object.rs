use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::gfx::geometry::GeometryData;

use super::vertex::{LineVertex, Vertex3D};

/// Index of a mesh inside its [`Scene`](super::Scene)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub(crate) usize);

/// Triangle geometry shared by any number of mesh nodes
pub struct Mesh {
    pub name: String,
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
}

impl Mesh {
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        let index_count = indices.len() as u32;
        Self {
            name: name.into(),
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
            index_count,
        }
    }

    pub fn from_geometry(name: impl Into<String>, geometry: &GeometryData) -> Self {
        Self::new(name, geometry.to_vertices(), geometry.indices.clone())
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some()
    }

    pub fn init_gpu_resources(&mut self, device: &wgpu::Device) {
        if self.is_uploaded() {
            return;
        }
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
        log::debug!(
            "Uploaded mesh '{}': {} vertices, {} triangles",
            self.name,
            self.vertices.len(),
            self.index_count / 3
        );
    }
}

/// Unindexed line list, used for the axes helper
pub struct LineMesh {
    vertices: Vec<LineVertex>,
    vertex_buffer: Option<wgpu::Buffer>,
}

impl LineMesh {
    /// Three unit-coloured segments from the origin along +X, +Y and +Z
    pub fn axes(size: f32) -> Self {
        let red = [1.0, 0.0, 0.0];
        let green = [0.0, 1.0, 0.0];
        let blue = [0.0, 0.0, 1.0];
        let line = |end: [f32; 3], color: [f32; 3]| {
            [
                LineVertex {
                    position: [0.0, 0.0, 0.0],
                    color,
                },
                LineVertex {
                    position: end,
                    color,
                },
            ]
        };
        let vertices = [
            line([size, 0.0, 0.0], red),
            line([0.0, size, 0.0], green),
            line([0.0, 0.0, size], blue),
        ]
        .concat();
        Self {
            vertices,
            vertex_buffer: None,
        }
    }

    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    pub fn init_gpu_resources(&mut self, device: &wgpu::Device) {
        if self.vertex_buffer.is_some() {
            return;
        }
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Line Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
    }
}

pub trait DrawMesh<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
    fn draw_lines(&mut self, lines: &'a LineMesh);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return;
        };
        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, instances);
    }

    fn draw_lines(&mut self, lines: &'b LineMesh) {
        let Some(vertex_buffer) = &lines.vertex_buffer else {
            return;
        };
        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.draw(0..lines.vertices.len() as u32, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_box;

    #[test]
    fn mesh_from_geometry_keeps_counts() {
        let mesh = Mesh::from_geometry("walls", &generate_box(4.0, 2.5, 4.0, 1, 1, 1));
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        assert!(!mesh.is_uploaded());
    }

    #[test]
    fn axes_are_colored_by_axis() {
        let axes = LineMesh::axes(1.0);
        assert_eq!(axes.vertices().len(), 6);
        assert_eq!(axes.vertices()[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(axes.vertices()[3].color, [0.0, 1.0, 0.0]);
        assert_eq!(axes.vertices()[5].position, [0.0, 0.0, 1.0]);
    }
}
