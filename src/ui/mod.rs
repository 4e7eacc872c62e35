//! # User Interface Module
//!
//! A Dear ImGui overlay drawn on top of the scene.
//!
//! ## Key Components
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu
//! - [`DebugPanel`] - the "Debug" window with the floor displacement sliders
//!
//! ## Input Handling
//!
//! Events go to the UI first. When ImGui wants the mouse or keyboard, the
//! camera never sees the event.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::DebugPanel;
