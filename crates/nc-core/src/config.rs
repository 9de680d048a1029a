//! Editor tuning knobs.

use crate::geometry::Color;
use serde::{Deserialize, Serialize};

/// Configuration for the interaction controller.
///
/// Deserializes from camelCase JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Color written to points inside a region. Default: **#FFFF00**.
    pub highlight_color: Color,

    /// Pick radius of resize handles, in scene units. Default: **0.1**.
    pub handle_radius: f64,

    /// Marquees whose width or height is at or below this many pixels
    /// are dropped on release. Default: **0** (only zero-area marquees).
    pub min_marquee_extent: f64,

    /// Height of the plane device markers are dragged along. Default: **0**.
    pub ground_plane_z: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            highlight_color: Color::rgb(1.0, 1.0, 0.0),
            handle_radius: 0.1,
            min_marquee_extent: 0.0,
            ground_plane_z: 0.0,
        }
    }
}
