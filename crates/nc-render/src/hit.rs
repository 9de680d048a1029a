//! Hit testing: pick ray → handle / device lookup.
//!
//! Everything pickable is a sphere in scene space. The nearest
//! intersection along the ray wins; equal distances keep the earlier item.

use nc_core::bridge::Ray;
use nc_core::device::DeviceMarker;
use nc_core::geometry::DVec3;
use nc_core::id::DeviceId;
use nc_core::region::{Handle, HandleKind};

/// Nearest item whose sphere the ray crosses.
fn nearest_hit<'a, T>(
    ray: &Ray,
    items: &'a [T],
    sphere: impl Fn(&T) -> (DVec3, f64),
) -> Option<&'a T> {
    let mut best: Option<(f64, &T)> = None;
    for item in items {
        let (center, radius) = sphere(item);
        if let Some(t) = ray.intersect_sphere(center, radius)
            && best.is_none_or(|(best_t, _)| t < best_t)
        {
            best = Some((t, item));
        }
    }
    best.map(|(_, item)| item)
}

/// Find the resize handle under the ray. All handles share `radius`.
pub fn pick_handle(ray: &Ray, handles: &[Handle], radius: f64) -> Option<HandleKind> {
    nearest_hit(ray, handles, |h| (h.scene, radius)).map(|h| h.kind)
}

/// Find the device marker under the ray.
pub fn pick_device(ray: &Ray, devices: &[DeviceMarker]) -> Option<DeviceId> {
    let hit = nearest_hit(ray, devices, |d| (d.anchor, d.radius)).map(|d| d.id);
    if let Some(id) = hit {
        log::trace!("ray hit device {id}");
    }
    hit
}
