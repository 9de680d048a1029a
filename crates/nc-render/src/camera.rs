//! Orthographic camera looking down the scene's -z axis.
//!
//! The scene origin maps to the viewport center and one scene unit spans
//! `pixels_per_unit` pixels on both axes. Used by the replay tool and
//! tests; an embedding renderer supplies its own `CoordinateBridge`.

use kurbo::Point;
use nc_core::bridge::{CoordinateBridge, Ray, Viewport};
use nc_core::geometry::DVec3;

/// Height the pick rays start from.
const EYE_Z: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoCamera {
    viewport: Viewport,
    pixels_per_unit: f64,
}

impl OrthoCamera {
    pub fn new(viewport: Viewport, pixels_per_unit: f64) -> Self {
        debug_assert!(pixels_per_unit > 0.0, "camera scale must be positive");
        Self {
            viewport,
            pixels_per_unit,
        }
    }

    pub fn pixels_per_unit(&self) -> f64 {
        self.pixels_per_unit
    }
}

impl CoordinateBridge for OrthoCamera {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        log::debug!(
            "camera viewport {}x{} (aspect {:.3})",
            viewport.width,
            viewport.height,
            viewport.aspect()
        );
        self.viewport = viewport;
    }

    fn scene_to_screen(&self, scene: DVec3) -> Point {
        let y_up = Point::new(
            self.viewport.width / 2.0 + scene.x * self.pixels_per_unit,
            self.viewport.height / 2.0 + scene.y * self.pixels_per_unit,
        );
        self.flip_y(y_up)
    }

    fn screen_to_scene(&self, screen: Point) -> DVec3 {
        let y_up = self.flip_y(screen);
        DVec3::new(
            (y_up.x - self.viewport.width / 2.0) / self.pixels_per_unit,
            (y_up.y - self.viewport.height / 2.0) / self.pixels_per_unit,
            0.0,
        )
    }

    /// Parallel projection: every ray points straight down, starting above
    /// the NDC position scaled out to the half-extent of the view volume.
    fn ray(&self, screen: Point) -> Ray {
        let ndc = self.to_ndc(screen);
        let half_w = self.viewport.width / (2.0 * self.pixels_per_unit);
        let half_h = self.viewport.height / (2.0 * self.pixels_per_unit);
        Ray::new(DVec3::new(ndc.x * half_w, ndc.y * half_h, EYE_Z), DVec3::NEG_Z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn camera() -> OrthoCamera {
        OrthoCamera::new(
            Viewport {
                width: 800.0,
                height: 600.0,
            },
            50.0,
        )
    }

    #[test]
    fn origin_maps_to_viewport_center() {
        assert_eq!(camera().scene_to_screen(DVec3::ZERO), Point::new(400.0, 300.0));
    }

    #[test]
    fn screen_y_grows_downward() {
        let cam = camera();
        let screen = cam.scene_to_screen(DVec3::new(5.0, 2.0, 0.0));
        assert_eq!(screen, Point::new(650.0, 200.0));
        let scene = cam.screen_to_scene(Point::new(100.0, 100.0));
        assert_eq!(scene, DVec3::new(-6.0, 4.0, 0.0));
    }

    #[test]
    fn ray_lands_on_unprojected_point() {
        let cam = camera();
        let screen = Point::new(123.0, 456.0);
        let hit = cam.ray(screen).intersect_plane_z(0.0).unwrap();
        let expected = cam.screen_to_scene(screen);
        assert!((hit.x - expected.x).abs() < 1e-12 && (hit.y - expected.y).abs() < 1e-12);
    }

    #[test]
    fn ray_through_viewport_center_hits_origin() {
        let ray = camera().ray(Point::new(400.0, 300.0));
        assert_eq!(ray.origin, DVec3::new(0.0, 0.0, EYE_Z));
        assert_eq!(ray.direction, DVec3::NEG_Z);
        // Top-left corner is the far corner of the view volume
        let corner = camera().ray(Point::new(0.0, 0.0));
        assert_eq!(corner.origin, DVec3::new(-8.0, 6.0, EYE_Z));
    }

    #[test]
    fn ndc_corners() {
        let cam = camera();
        assert_eq!(cam.to_ndc(Point::new(0.0, 0.0)), Point::new(-1.0, 1.0));
        assert_eq!(cam.to_ndc(Point::new(800.0, 600.0)), Point::new(1.0, -1.0));
    }

    #[test]
    fn resize_moves_the_center() {
        let mut cam = camera();
        cam.set_viewport(Viewport {
            width: 1000.0,
            height: 1000.0,
        });
        assert_eq!(cam.scene_to_screen(DVec3::ZERO), Point::new(500.0, 500.0));
    }
}
