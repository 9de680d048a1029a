//! Recorded editor session: scene setup plus the input events to replay.
//!
//! ```json
//! {
//!   "viewport": { "width": 800, "height": 600 },
//!   "pixelsPerUnit": 50,
//!   "config": { "highlightColor": "#FFFF00" },
//!   "network": { "layers": [ ... ] },
//!   "devices": [ { "id": "dc_generator", "anchor": { "x": 5, "y": 0, "z": 0 }, "radius": 0.2 } ],
//!   "shape": "Rectangle",
//!   "metadata": { "neuronType": "excitatory", "synModel": "static_synapse" },
//!   "events": [
//!     { "type": "pointerDown", "x": 100, "y": 100 },
//!     { "type": "key", "key": "Delete" }
//!   ]
//! }
//! ```

use nc_core::bridge::Viewport;
use nc_core::config::EditorConfig;
use nc_core::device::DeviceMarker;
use nc_core::error::SpecError;
use nc_core::payload::SelectionMetadata;
use nc_core::points::PointField;
use nc_core::region::MaskShape;
use nc_editor::InteractionController;
use nc_editor::input::{InputEvent, Modifiers};
use nc_render::OrthoCamera;
use serde::Deserialize;

fn default_viewport() -> Viewport {
    Viewport {
        width: 800.0,
        height: 600.0,
    }
}

fn default_scale() -> f64 {
    50.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    #[serde(default = "default_scale")]
    pub pixels_per_unit: f64,
    #[serde(default)]
    pub config: EditorConfig,
    /// Network specification document the point field is built from.
    pub network: serde_json::Value,
    #[serde(default)]
    pub devices: Vec<DeviceMarker>,
    #[serde(default)]
    pub shape: MaskShape,
    #[serde(default)]
    pub metadata: SelectionMetadata,
    #[serde(default)]
    pub events: Vec<RecordedEvent>,
}

/// One recorded input event, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RecordedEvent {
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        meta: bool,
    },
    Resize {
        width: f64,
        height: f64,
    },
    /// Switch the shape used for the next marquee.
    Shape {
        shape: MaskShape,
    },
}

/// A replay step: either an input event or a form-panel change.
pub enum Step {
    Input(InputEvent),
    Shape(MaskShape),
}

impl RecordedEvent {
    pub fn to_step(&self) -> Step {
        match self {
            Self::PointerDown { x, y, shift } => Step::Input(InputEvent::PointerDown {
                x: *x,
                y: *y,
                modifiers: Modifiers {
                    shift: *shift,
                    ..Modifiers::NONE
                },
            }),
            Self::PointerMove { x, y } => Step::Input(InputEvent::pointer_move(*x, *y)),
            Self::PointerUp { x, y } => Step::Input(InputEvent::pointer_up(*x, *y)),
            Self::Key { key, ctrl, meta } => Step::Input(InputEvent::Key {
                key: key.clone(),
                modifiers: Modifiers {
                    ctrl: *ctrl,
                    meta: *meta,
                    ..Modifiers::NONE
                },
            }),
            Self::Resize { width, height } => Step::Input(InputEvent::Resize {
                width: *width,
                height: *height,
            }),
            Self::Shape { shape } => Step::Shape(*shape),
        }
    }
}

impl Session {
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the controller this session starts from.
    pub fn controller(&self) -> Result<InteractionController<OrthoCamera>, SpecError> {
        let field = PointField::from_network_spec(&self.network.to_string())?;
        let camera = OrthoCamera::new(self.viewport, self.pixels_per_unit);
        let mut controller = InteractionController::new(camera, field, self.config.clone());
        controller.set_shape(self.shape);
        controller.set_metadata(self.metadata.clone());
        for device in &self.devices {
            controller.add_device(*device);
        }
        Ok(controller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_minimal_session() {
        let session = Session::from_json(r#"{ "network": { "layers": [] } }"#).unwrap();
        assert_eq!(session.viewport, default_viewport());
        assert_eq!(session.pixels_per_unit, 50.0);
        assert_eq!(session.shape, MaskShape::Rectangle);
        assert!(session.events.is_empty());
    }

    #[test]
    fn parse_tagged_events() {
        let session = Session::from_json(
            r#"{
                "network": { "layers": [] },
                "events": [
                    { "type": "pointerDown", "x": 1, "y": 2, "shift": true },
                    { "type": "key", "key": "Delete" },
                    { "type": "shape", "shape": "Ellipse" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(
            session.events,
            vec![
                RecordedEvent::PointerDown {
                    x: 1.0,
                    y: 2.0,
                    shift: true
                },
                RecordedEvent::Key {
                    key: "Delete".into(),
                    ctrl: false,
                    meta: false
                },
                RecordedEvent::Shape {
                    shape: MaskShape::Ellipse
                },
            ]
        );
        match session.events[0].to_step() {
            Step::Input(InputEvent::PointerDown { modifiers, .. }) => assert!(modifiers.shift),
            _ => panic!("expected a pointer-down"),
        }
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let err = Session::from_json(r#"{ "network": {}, "events": [{ "type": "wheel" }] }"#);
        assert!(matches!(err, Err(SpecError::Json(_))));
    }

    #[test]
    fn demo_session_builds_a_controller() {
        let session = Session::from_json(include_str!("../sessions/demo.json")).unwrap();
        let controller = session.controller().unwrap();
        assert_eq!(controller.field().layers().len(), 2);
        assert_eq!(controller.state().devices().len(), 2);
    }
}
