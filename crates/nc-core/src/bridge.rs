//! Coordinate contract with the rendering collaborator.
//!
//! The editor never does projection math itself. It asks a
//! `CoordinateBridge` to move between:
//!
//! - **screen space**: pointer pixels, origin top-left, y-down;
//! - **scene space**: renderer world units, origin at the viewport center, y-up.
//!
//! The vertical flip between the two lives entirely inside the bridge.
//! Every method is a pure function of the current camera; only
//! `set_viewport` mutates it.

use crate::geometry::DVec3;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn aspect(&self) -> f64 {
        if self.height == 0.0 {
            1.0
        } else {
            self.width / self.height
        }
    }
}

/// A pick ray in scene space. `direction` is unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the first intersection with a sphere.
    /// Returns `None` if the sphere is missed or lies behind the origin.
    pub fn intersect_sphere(&self, center: DVec3, radius: f64) -> Option<f64> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sqrt_disc = disc.sqrt();
        let t_near = -b - sqrt_disc;
        let t_far = -b + sqrt_disc;
        if t_far < 0.0 {
            return None;
        }
        Some(if t_near >= 0.0 { t_near } else { t_far })
    }

    /// Intersection with the horizontal plane `z = height` (normal +z).
    pub fn intersect_plane_z(&self, height: f64) -> Option<DVec3> {
        if self.direction.z.abs() < f64::EPSILON {
            return None;
        }
        let t = (height - self.origin.z) / self.direction.z;
        if t < 0.0 {
            return None;
        }
        Some(self.at(t))
    }
}

/// Screen ↔ scene conversion and ray generation supplied by the renderer.
pub trait CoordinateBridge {
    /// Current viewport size.
    fn viewport(&self) -> Viewport;

    /// Recompute projection for a new viewport. Pass-through to the renderer.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Project a scene position to screen pixels.
    fn scene_to_screen(&self, scene: DVec3) -> Point;

    /// Unproject a screen position onto the scene's `z = 0` plane.
    fn screen_to_scene(&self, screen: Point) -> DVec3;

    /// Pick ray through a screen position.
    fn ray(&self, screen: Point) -> Ray;

    /// Screen → normalized device coordinates (x, y in [-1, 1], y-up).
    fn to_ndc(&self, screen: Point) -> Point {
        let vp = self.viewport();
        Point::new(
            screen.x / vp.width * 2.0 - 1.0,
            -(screen.y / vp.height) * 2.0 + 1.0,
        )
    }

    /// Mirror a screen position vertically (y-down ↔ y-up pixels).
    fn flip_y(&self, screen: Point) -> Point {
        Point::new(screen.x, self.viewport().height - screen.y)
    }
}
