//! Render tuning
//!
//! Everything the raycaster needs to know about the target surface.
//! Serialized alongside level files so embedders can ship presets.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_FOV, DEFAULT_MAX_DEPTH, RAY_STEP};

/// Raycaster configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Number of screen columns (one ray per column)
    pub columns: usize,
    /// Vertical resolution of the target surface, in whatever unit the
    /// embedder's `draw_column` expects
    pub screen_height: f32,
    /// Horizontal field of view (radians)
    pub fov: f32,
    /// Rays give up past this depth (cells)
    pub max_depth: f32,
    /// Fixed march increment (cells); kept constant for predictable wall
    /// thickness and O(columns × max_depth / step) worst case
    pub ray_step: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            columns: 400,
            screen_height: 500.0,
            fov: DEFAULT_FOV,
            max_depth: DEFAULT_MAX_DEPTH,
            ray_step: RAY_STEP,
        }
    }
}

impl RenderConfig {
    /// Half the field of view; rays span `heading ± half_fov()`
    #[inline]
    pub fn half_fov(&self) -> f32 {
        self.fov / 2.0
    }

    /// Angular width of a single column
    #[inline]
    pub fn column_angle(&self) -> f32 {
        self.fov / self.columns.max(1) as f32
    }
}
