pub mod bridge;
pub mod config;
pub mod connector;
pub mod device;
pub mod error;
pub mod geometry;
pub mod id;
pub mod payload;
pub mod points;
pub mod region;

pub use bridge::{CoordinateBridge, Ray, Viewport};
pub use config::EditorConfig;
pub use connector::{CURVE_SEGMENTS, ConnectorCurve};
pub use device::DeviceMarker;
pub use error::SpecError;
pub use geometry::{Color, DVec3};
pub use id::{DeviceId, RegionId};
pub use payload::{DeviceProjection, SelectionBounds, SelectionMetadata, SelectionPayload};
pub use points::{PointField, PointLayer};
pub use region::{Handle, HandleKind, MaskShape, RegionFill, SelectionRegion};

// Re-export kurbo so downstream crates share the same screen-space types
pub use kurbo::Point;
