//! # Graphics Module
//!
//! Everything needed to draw the scene: camera, geometry generators, scene
//! graph, materials and textures, lights, sky and fog, and the render engine.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - damped orbit camera
//! - **Scene Management** ([`scene`]) - node hierarchy with shared meshes
//! - **Resource Management** ([`resources`]) - materials, textures and global bindings
//! - **Rendering Pipeline** ([`rendering`]) - shadow, PBR, sky and line passes
//!
//! ## Usage
//!
//! ```no_run
//! use haunted_house::{gfx::RenderEngine, haunted::HauntedHouse, SceneConfig};
//!
//! let world = HauntedHouse::build(&SceneConfig::default(), 1.5);
//! // the engine needs a window:
//! // let engine = RenderEngine::new(window, width, height, config.shadows).await?;
//! // engine.init_scene(&mut world.scene);
//! # let _ = world;
//! ```

pub mod camera;
pub mod color;
pub mod environment;
pub mod geometry;
pub mod lights;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use color::Color;
pub use rendering::render_engine::RenderEngine;
