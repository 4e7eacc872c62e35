// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures, materials, and the global bind group for rendering.

pub mod global_bindings;
pub mod material;
pub mod texture_library;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{GlobalBindings, GlobalUBO, GlobalUniform};
pub use material::{MapSlot, MaterialManager, StandardMaterial};
pub use texture_library::{TextureId, TextureLibrary};
pub use texture_resource::{ColorSpace, TextureDesc, TextureResource, Wrap};
