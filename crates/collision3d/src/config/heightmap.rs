//! Terrain grid settings

use serde::{Deserialize, Serialize};

use super::Config;

/// Settings used to allocate a [`HeightMap`](crate::physics::collision::HeightMap)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightMapConfig {
    /// Samples per side, `2^k + 1`
    pub resolution: usize,
    /// World distance between neighbouring samples
    pub horizontal_scale: f32,
    /// World height of one height unit
    pub vertical_scale: f32,
    /// Steepest slope a query cylinder may stand on
    pub max_walkable_slope_degrees: f32,
}

impl Default for HeightMapConfig {
    fn default() -> Self {
        Self {
            resolution: 65,
            horizontal_scale: 1.0,
            vertical_scale: 1.0,
            max_walkable_slope_degrees: 45.0,
        }
    }
}

impl Config for HeightMapConfig {}
