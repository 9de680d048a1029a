use crate::geometry::DVec3;
use crate::id::DeviceId;
use serde::{Deserialize, Serialize};

/// A draggable device marker (stimulator or recorder) placed in the scene.
///
/// Hit-tested as a sphere of `radius` around `anchor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceMarker {
    pub id: DeviceId,
    #[serde(with = "crate::geometry::xyz")]
    pub anchor: DVec3,
    pub radius: f64,
}

impl DeviceMarker {
    pub fn new(id: DeviceId, anchor: DVec3, radius: f64) -> Self {
        Self { id, anchor, radius }
    }
}
