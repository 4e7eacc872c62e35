//! # Procedural Geometry Generation
//!
//! Generators for the primitive shapes the scene is built from. Vertex order,
//! UV layout and winding follow the conventions of the common web geometry
//! classes, so textures authored for those shapes map the same way here.
//!
//! ## Supported Primitives
//!
//! - **Plane**: XY plane facing +Z with configurable subdivisions
//! - **Box**: six subdivided faces, each with its own UV square
//! - **Cylinder / Cone**: radial body plus caps
//! - **Sphere**: UV sphere with configurable resolution
//!
//! ## Usage
//!
//! ```rust
//! use haunted_house::gfx::geometry::{generate_box, generate_cone, generate_plane};
//!
//! let floor = generate_plane(20.0, 20.0, 100, 100);
//! let walls = generate_box(4.0, 2.5, 4.0, 1, 1, 1);
//! let roof = generate_cone(3.5, 1.5, 4);
//! assert_eq!(roof.vertex_count(), 19);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) {
        self.vertices.push(position);
        self.normals.push(normal);
        self.tex_coords.push(uv);
    }

    /// Interleaves the attribute streams into the renderer's vertex format
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, &position)| Vertex3D {
                position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                uv: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect()
    }
}
