//! Connector curves: region → device links.
//!
//! A connector is a centripetal Catmull-Rom spline through four control
//! points, sampled into a polyline of `CURVE_SEGMENTS` segments. The first
//! two control points sit at the source region's edge, the last two at
//! either the live pointer or the target device's surface. Any control
//! point change resamples the whole polyline.

use crate::geometry::DVec3;
use crate::id::DeviceId;

/// Number of polyline segments per connector.
pub const CURVE_SEGMENTS: usize = 100;

/// Horizontal spacing between the paired control points at each end.
/// Keeps the end tangents horizontal without a visible kink.
pub const CONNECTOR_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorCurve {
    control_points: [DVec3; 4],
    /// Attached device, `None` while the curve is being drawn.
    target: Option<DeviceId>,
    polyline: Vec<DVec3>,
}

impl ConnectorCurve {
    /// Start a curve at `source` with its free end at `end`.
    pub fn new(source: DVec3, end: DVec3) -> Self {
        let mut curve = Self {
            control_points: [source; 4],
            target: None,
            polyline: Vec::with_capacity(CURVE_SEGMENTS + 1),
        };
        curve.pin_source(source);
        curve.pin_end(end);
        curve
    }

    pub fn control_points(&self) -> &[DVec3; 4] {
        &self.control_points
    }

    pub fn target(&self) -> Option<DeviceId> {
        self.target
    }

    pub fn is_attached(&self) -> bool {
        self.target.is_some()
    }

    /// Sampled curve, `CURVE_SEGMENTS + 1` points from source to end.
    pub fn polyline(&self) -> &[DVec3] {
        &self.polyline
    }

    /// Move the free end while the curve is being drawn.
    pub fn track_pointer(&mut self, scene: DVec3) {
        debug_assert!(self.target.is_none(), "attached connector tracks its device");
        self.pin_end(scene);
    }

    /// Attach to a device whose marker is centered at `anchor`.
    pub fn attach(&mut self, device: DeviceId, anchor: DVec3, radius: f64) {
        self.target = Some(device);
        self.track_device(anchor, radius);
    }

    /// Re-aim the end at a (possibly moved) device marker. The curve
    /// stops at the marker's surface, `radius` short of its center along x.
    pub fn track_device(&mut self, anchor: DVec3, radius: f64) {
        self.pin_end(anchor - DVec3::new(radius, 0.0, 0.0));
    }

    /// Move the source pair, e.g. after the owning region was resized.
    pub fn set_source(&mut self, source: DVec3) {
        self.pin_source(source);
    }

    fn pin_source(&mut self, source: DVec3) {
        self.control_points[0] = source;
        self.control_points[1] = source + DVec3::new(CONNECTOR_EPSILON, 0.0, 0.0);
        self.resample();
    }

    fn pin_end(&mut self, end: DVec3) {
        self.control_points[2] = end - DVec3::new(CONNECTOR_EPSILON, 0.0, 0.0);
        self.control_points[3] = end;
        self.resample();
    }

    fn resample(&mut self) {
        self.polyline.clear();
        for i in 0..=CURVE_SEGMENTS {
            let t = i as f64 / CURVE_SEGMENTS as f64;
            self.polyline.push(catmull_rom_point(&self.control_points, t));
        }
    }
}

// ─── Spline evaluation ───────────────────────────────────────────────────

/// Cubic `c0 + c1·t + c2·t² + c3·t³` for one axis of one span.
struct CubicPoly {
    c0: f64,
    c1: f64,
    c2: f64,
    c3: f64,
}

impl CubicPoly {
    /// Hermite form from endpoint values and tangents.
    fn hermite(x0: f64, x1: f64, t0: f64, t1: f64) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    /// Non-uniform Catmull-Rom span from `x1` to `x2` with knot intervals `dt0..dt2`.
    fn nonuniform(x0: f64, x1: f64, x2: f64, x3: f64, dt0: f64, dt1: f64, dt2: f64) -> Self {
        let mut t1 = (x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1;
        let mut t2 = (x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2;
        t1 *= dt1;
        t2 *= dt1;
        Self::hermite(x1, x2, t1, t2)
    }

    fn eval(&self, t: f64) -> f64 {
        let t2 = t * t;
        self.c0 + self.c1 * t + self.c2 * t2 + self.c3 * t2 * t
    }
}

/// Evaluate an open centripetal Catmull-Rom spline through `points` at
/// `t ∈ [0, 1]`. The missing outer neighbors are mirrored end points.
pub fn catmull_rom_point(points: &[DVec3], t: f64) -> DVec3 {
    let n = points.len();
    match n {
        0 => return DVec3::ZERO,
        1 => return points[0],
        _ => {}
    }

    let p = (n - 1) as f64 * t.clamp(0.0, 1.0);
    let mut seg = p.floor() as usize;
    let mut weight = p - seg as f64;
    if seg >= n - 1 {
        seg = n - 2;
        weight = 1.0;
    }

    let p1 = points[seg];
    let p2 = points[seg + 1];
    let p0 = if seg > 0 {
        points[seg - 1]
    } else {
        p1 * 2.0 - p2
    };
    let p3 = if seg + 2 < n {
        points[seg + 2]
    } else {
        p2 * 2.0 - p1
    };

    // Centripetal: knot interval = sqrt(distance) = distance²^0.25
    let mut dt0 = p0.distance_squared(p1).powf(0.25);
    let mut dt1 = p1.distance_squared(p2).powf(0.25);
    let mut dt2 = p2.distance_squared(p3).powf(0.25);
    if dt1 < 1e-4 {
        dt1 = 1.0;
    }
    if dt0 < 1e-4 {
        dt0 = dt1;
    }
    if dt2 < 1e-4 {
        dt2 = dt1;
    }

    let px = CubicPoly::nonuniform(p0.x, p1.x, p2.x, p3.x, dt0, dt1, dt2);
    let py = CubicPoly::nonuniform(p0.y, p1.y, p2.y, p3.y, dt0, dt1, dt2);
    let pz = CubicPoly::nonuniform(p0.z, p1.z, p2.z, p3.z, dt0, dt1, dt2);
    DVec3::new(px.eval(weight), py.eval(weight), pz.eval(weight))
}
