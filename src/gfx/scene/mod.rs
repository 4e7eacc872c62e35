//! # Scene Management Module
//!
//! A retained scene graph: [`Node`]s form a parent/child hierarchy stored in
//! an arena owned by [`Scene`]. Meshes are shared by id, so the thirty-odd
//! graves all draw one box.
//!
//! ## Key Components
//!
//! - [`Scene`] - nodes, meshes, materials, textures, lights and environment
//! - [`Node`] - a named transform in the hierarchy, optionally drawable
//! - [`Mesh`] - indexed triangle geometry uploaded once
//! - [`Vertex3D`] - position, normal and texture coordinates
//!
//! ## Usage
//!
//! ```no_run
//! use haunted_house::gfx::scene::{MeshNode, Transform};
//!
//! // let house = scene.add_group("house", Transform::default(), None);
//! // scene.add_mesh_node("walls", Transform::from_position(0.0, 1.25, 0.0), walls, Some(house));
//! ```

pub mod node;
pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use node::{MeshNode, Node, NodeId, NodeKind, ObjectUniform, Transform};
pub use object::{DrawMesh, LineMesh, Mesh, MeshId};
pub use scene::{Scene, SceneStatistics};
pub use vertex::{LineVertex, Vertex3D};
