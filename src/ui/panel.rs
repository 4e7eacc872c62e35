//! Debug panel for live material tweaks

use crate::{config::MaterialsConfig, gfx::resources::material::StandardMaterial};

pub const DEBUG_WINDOW: &str = "Debug";

/// Values edited by the "Debug" window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugPanel {
    pub floor_displacement_scale: f32,
    pub floor_displacement_bias: f32,
}

impl DebugPanel {
    pub fn from_config(materials: &MaterialsConfig) -> Self {
        Self {
            floor_displacement_scale: materials.floor_displacement_scale,
            floor_displacement_bias: materials.floor_displacement_bias,
        }
    }

    /// Builds the window; returns true when a slider moved this frame
    pub fn draw(&mut self, ui: &imgui::Ui) -> bool {
        let mut changed = false;
        ui.window(DEBUG_WINDOW)
            .size([340.0, 90.0], imgui::Condition::FirstUseEver)
            .position([20.0, 20.0], imgui::Condition::FirstUseEver)
            .collapsible(true)
            .build(|| {
                changed |= ui
                    .slider_config("Floor Displacement Scale", 0.0, 1.0)
                    .display_format("%.3f")
                    .build(&mut self.floor_displacement_scale);
                changed |= ui
                    .slider_config("Floor Displacement Bias", -1.0, 1.0)
                    .display_format("%.3f")
                    .build(&mut self.floor_displacement_bias);
            });
        changed
    }

    /// Copies the slider values onto the floor material
    pub fn apply(&self, floor: &mut StandardMaterial) {
        floor.displacement_scale = self.floor_displacement_scale;
        floor.displacement_bias = self.floor_displacement_bias;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_configured_floor_displacement() {
        let panel = DebugPanel::from_config(&MaterialsConfig::default());
        assert_eq!(panel.floor_displacement_scale, 0.3);
        assert_eq!(panel.floor_displacement_bias, -0.2);
    }

    #[test]
    fn apply_writes_both_values() {
        let mut floor = StandardMaterial::new("floor");
        let panel = DebugPanel {
            floor_displacement_scale: 0.8,
            floor_displacement_bias: -0.5,
        };
        panel.apply(&mut floor);
        assert_eq!(floor.displacement_scale, 0.8);
        assert_eq!(floor.displacement_bias, -0.5);
    }
}
