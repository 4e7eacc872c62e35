// src/lib.rs
//! Haunted House
//!
//! A wgpu scene of a haunted house at night: textured house and graves,
//! point-light ghosts, a scattering sky and exponential fog, viewed through a
//! damped orbit camera.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod haunted;
pub mod timer;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::HauntedHouseApp;
pub use config::SceneConfig;
pub use error::{Error, Result};
