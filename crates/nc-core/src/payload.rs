//! Wire types consumed by the backend: one `SelectionPayload` per committed
//! region, and `DeviceProjection`s linking devices to connected regions.

use crate::geometry::DVec3;
use crate::id::DeviceId;
use crate::region::MaskShape;
use serde::{Deserialize, Serialize};

/// Dropdown-sourced metadata attached to every serialized selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionMetadata {
    pub neuron_type: String,
    pub syn_model: String,
}

/// Selection corners in the layer's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionBounds {
    #[serde(with = "crate::geometry::xyz")]
    pub ll: DVec3,
    #[serde(with = "crate::geometry::xyz")]
    pub ur: DVec3,
}

/// `{ name, selection: { ll, ur }, neuronType, synModel, maskShape }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPayload {
    /// Layer name.
    pub name: String,
    pub selection: SelectionBounds,
    pub neuron_type: String,
    pub syn_model: String,
    pub mask_shape: MaskShape,
}

impl SelectionPayload {
    /// JSON body for a single submission.
    pub fn to_json(&self) -> String {
        // Plain data with string keys: serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// A device and every region connected to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProjection {
    pub device: DeviceId,
    pub connectees: Vec<SelectionPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn payload_wire_shape() {
        let payload = SelectionPayload {
            name: "L4".to_string(),
            selection: SelectionBounds {
                ll: DVec3::new(-1.0, -2.0, 0.0),
                ur: DVec3::new(1.0, 0.5, 0.0),
            },
            neuron_type: "excitatory".to_string(),
            syn_model: "AMPA".to_string(),
            mask_shape: MaskShape::Ellipse,
        };
        let value: serde_json::Value = serde_json::from_str(&payload.to_json()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "L4",
                "selection": {
                    "ll": {"x": -1.0, "y": -2.0, "z": 0.0},
                    "ur": {"x": 1.0, "y": 0.5, "z": 0.0}
                },
                "neuronType": "excitatory",
                "synModel": "AMPA",
                "maskShape": "Ellipse"
            })
        );
    }
}
