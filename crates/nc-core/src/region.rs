//! Selection regions: rectangles or ellipses drawn over a point layer.
//!
//! A region owns everything drawn for it (fill shape, resize handles and
//! connector curves) and keeps its `selected_point_ids` equal to the set of
//! layer points whose projected screen position lies inside its bounds.
//!
//! Corners `ll` / `ur` are screen-space and may be inverted while a handle
//! drag is in flight; `normalize` restores `ll ≤ ur` on both axes.

use crate::bridge::CoordinateBridge;
use crate::connector::ConnectorCurve;
use crate::geometry::{Color, DVec3};
use crate::id::{DeviceId, RegionId};
use crate::payload::{SelectionBounds, SelectionMetadata, SelectionPayload};
use crate::points::{PointField, PointLayer};
use kurbo::{Ellipse, Point, Rect};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashSet;

// ─── Shape ───────────────────────────────────────────────────────────────

/// Mask shape, fixed when the region is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaskShape {
    #[default]
    Rectangle,
    Ellipse,
}

/// Fill primitive handed to the renderer, in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionFill {
    Rectangle(Rect),
    Ellipse(Ellipse),
}

// ─── Handles ─────────────────────────────────────────────────────────────

/// The 8 resize anchors. Names refer to the `ll` / `ur` corners, so
/// `LowerLeft` always sits at `ll` whatever the screen orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    LowerLeft,
    LowerRight,
    UpperLeft,
    UpperRight,
    LowerMiddle,
    UpperMiddle,
    LeftMiddle,
    RightMiddle,
}

impl HandleKind {
    pub const ALL: [HandleKind; 8] = [
        HandleKind::LowerLeft,
        HandleKind::LowerRight,
        HandleKind::UpperLeft,
        HandleKind::UpperRight,
        HandleKind::LowerMiddle,
        HandleKind::UpperMiddle,
        HandleKind::LeftMiddle,
        HandleKind::RightMiddle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HandleKind::LowerLeft => "lowerLeft",
            HandleKind::LowerRight => "lowerRight",
            HandleKind::UpperLeft => "upperLeft",
            HandleKind::UpperRight => "upperRight",
            HandleKind::LowerMiddle => "lowerMiddle",
            HandleKind::UpperMiddle => "upperMiddle",
            HandleKind::LeftMiddle => "leftMiddle",
            HandleKind::RightMiddle => "rightMiddle",
        }
    }
}

/// A materialized resize handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    pub screen: Point,
    /// Scene position used for ray picking.
    pub scene: DVec3,
}

// ─── Region ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SelectionRegion {
    id: RegionId,
    ll: Point,
    ur: Point,
    shape: MaskShape,
    layer_name: String,
    selected_point_ids: Vec<usize>,
    fill: Option<RegionFill>,
    handles: SmallVec<[Handle; 8]>,
    connectors: Vec<ConnectorCurve>,
}

impl SelectionRegion {
    pub fn new(id: RegionId, ll: Point, ur: Point, shape: MaskShape) -> Self {
        Self {
            id,
            ll,
            ur,
            shape,
            layer_name: String::new(),
            selected_point_ids: Vec::new(),
            fill: None,
            handles: SmallVec::new(),
            connectors: Vec::new(),
        }
    }

    /// Build from a signed marquee drag, normalizing the corners.
    pub fn from_drag(id: RegionId, anchor: Point, release: Point, shape: MaskShape) -> Self {
        let rect = Rect::from_points(anchor, release);
        Self::new(id, Point::new(rect.x0, rect.y0), Point::new(rect.x1, rect.y1), shape)
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn ll(&self) -> Point {
        self.ll
    }

    pub fn ur(&self) -> Point {
        self.ur
    }

    pub fn shape(&self) -> MaskShape {
        self.shape
    }

    pub fn layer_name(&self) -> &str {
        &self.layer_name
    }

    pub fn selected_point_ids(&self) -> &[usize] {
        &self.selected_point_ids
    }

    pub fn fill(&self) -> Option<&RegionFill> {
        self.fill.as_ref()
    }

    pub fn handles(&self) -> &[Handle] {
        &self.handles
    }

    /// A region is in focus exactly while its handles are materialized.
    pub fn has_focus(&self) -> bool {
        !self.handles.is_empty()
    }

    pub fn connectors(&self) -> &[ConnectorCurve] {
        &self.connectors
    }

    /// Normalized bounds, valid even mid-resize.
    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.ll, self.ur)
    }

    // ─── Hit testing ─────────────────────────────────────────────────────

    /// Inclusive containment test in screen space.
    pub fn within_bounds(&self, p: Point) -> bool {
        let b = self.bounds();
        match self.shape {
            MaskShape::Rectangle => p.x >= b.x0 && p.x <= b.x1 && p.y >= b.y0 && p.y <= b.y1,
            MaskShape::Ellipse => {
                let c = b.center();
                let rx = b.width() / 2.0;
                let ry = b.height() / 2.0;
                if rx == 0.0 || ry == 0.0 {
                    return false;
                }
                let nx = (p.x - c.x) / rx;
                let ny = (p.y - c.y) / ry;
                nx * nx + ny * ny <= 1.0
            }
        }
    }

    // ─── Geometry ────────────────────────────────────────────────────────

    /// Rebuild the fill primitive from the current bounds.
    pub fn make_box(&mut self) {
        let b = self.bounds();
        self.fill = Some(match self.shape {
            MaskShape::Rectangle => RegionFill::Rectangle(b),
            MaskShape::Ellipse => RegionFill::Ellipse(Ellipse::from_rect(b)),
        });
    }

    /// Drop the fill primitive (region is being deleted).
    pub fn remove_box(&mut self) {
        self.fill = None;
    }

    /// Screen position of a handle for the current corners.
    pub fn handle_position(&self, kind: HandleKind) -> Point {
        let (ll, ur) = (self.ll, self.ur);
        let mid = ll.midpoint(ur);
        match kind {
            HandleKind::LowerLeft => ll,
            HandleKind::LowerRight => Point::new(ur.x, ll.y),
            HandleKind::UpperLeft => Point::new(ll.x, ur.y),
            HandleKind::UpperRight => ur,
            HandleKind::LowerMiddle => Point::new(mid.x, ll.y),
            HandleKind::UpperMiddle => Point::new(mid.x, ur.y),
            HandleKind::LeftMiddle => Point::new(ll.x, mid.y),
            HandleKind::RightMiddle => Point::new(ur.x, mid.y),
        }
    }

    /// (Re)materialize all 8 handles at the current corners.
    pub fn make_handles(&mut self, bridge: &dyn CoordinateBridge) {
        self.handles.clear();
        for kind in HandleKind::ALL {
            let screen = self.handle_position(kind);
            self.handles.push(Handle {
                kind,
                screen,
                scene: bridge.screen_to_scene(screen),
            });
        }
    }

    pub fn remove_handles(&mut self) {
        self.handles.clear();
    }

    /// Drag one handle to `p`. Corners move two coordinates, edge
    /// midpoints one. Corners may end up inverted until `normalize`.
    pub fn resize(&mut self, handle: HandleKind, p: Point) {
        match handle {
            HandleKind::LowerLeft => self.ll = p,
            HandleKind::LowerRight => {
                self.ur.x = p.x;
                self.ll.y = p.y;
            }
            HandleKind::UpperLeft => {
                self.ll.x = p.x;
                self.ur.y = p.y;
            }
            HandleKind::UpperRight => self.ur = p,
            HandleKind::LowerMiddle => self.ll.y = p.y,
            HandleKind::UpperMiddle => self.ur.y = p.y,
            HandleKind::LeftMiddle => self.ll.x = p.x,
            HandleKind::RightMiddle => self.ur.x = p.x,
        }
    }

    /// Swap coordinates so that `ll ≤ ur` on both axes.
    pub fn normalize(&mut self) {
        if self.ll.x > self.ur.x {
            std::mem::swap(&mut self.ll.x, &mut self.ur.x);
        }
        if self.ll.y > self.ur.y {
            std::mem::swap(&mut self.ll.y, &mut self.ur.y);
        }
    }

    // ─── Point membership ────────────────────────────────────────────────

    /// Pick the first layer (in field order) with at least one point
    /// inside the region. Returns `false` and leaves `layer_name` empty
    /// if the region overlaps no layer.
    pub fn resolve_layer(&mut self, field: &PointField, bridge: &dyn CoordinateBridge) -> bool {
        let hit = field.layers().iter().find(|layer| {
            layer
                .iter_positions()
                .any(|(_, pos)| self.within_bounds(bridge.scene_to_screen(pos)))
        });
        match hit {
            Some(layer) => {
                self.layer_name = layer.name.clone();
                true
            }
            None => {
                self.layer_name.clear();
                false
            }
        }
    }

    /// Full rescan of the owning layer. Highlights matching points,
    /// restores the base color on points that left, and returns the net
    /// change in selected-point count.
    pub fn update_points(
        &mut self,
        field: &mut PointField,
        bridge: &dyn CoordinateBridge,
        highlight: Color,
    ) -> isize {
        let previous = self.selected_point_ids.len() as isize;
        let Some(layer) = field.layer_mut(&self.layer_name) else {
            self.selected_point_ids.clear();
            return -previous;
        };

        let matched: Vec<usize> = layer
            .iter_positions()
            .filter(|(_, pos)| self.within_bounds(bridge.scene_to_screen(*pos)))
            .map(|(i, _)| i)
            .collect();

        let keep: HashSet<usize> = matched.iter().copied().collect();
        for &i in &self.selected_point_ids {
            if !keep.contains(&i) {
                layer.set_color(i, layer.base_color);
            }
        }
        for &i in &matched {
            layer.set_color(i, highlight);
        }

        log::trace!(
            "{} on {}: {} -> {} points",
            self.id,
            self.layer_name,
            previous,
            matched.len()
        );
        self.selected_point_ids = matched;
        self.selected_point_ids.len() as isize - previous
    }

    /// Restore the base color of every selected point and clear the
    /// selection. Returns the (non-positive) count delta.
    pub fn release_points(&mut self, field: &mut PointField) -> isize {
        let previous = self.selected_point_ids.len() as isize;
        if let Some(layer) = field.layer_mut(&self.layer_name) {
            restore_base(layer, &self.selected_point_ids);
        }
        self.selected_point_ids.clear();
        -previous
    }

    // ─── Connectors ──────────────────────────────────────────────────────

    /// Scene position connectors leave from: midpoint of the right edge.
    pub fn edge_anchor(&self, bridge: &dyn CoordinateBridge) -> DVec3 {
        let b = self.bounds();
        bridge.screen_to_scene(Point::new(b.x1, b.center().y))
    }

    /// Start drawing a new connector whose free end is at `end`.
    pub fn start_connector(&mut self, bridge: &dyn CoordinateBridge, end: DVec3) {
        let source = self.edge_anchor(bridge);
        self.connectors.push(ConnectorCurve::new(source, end));
    }

    /// The connector currently being drawn (no target yet).
    pub fn pending_connector_mut(&mut self) -> Option<&mut ConnectorCurve> {
        self.connectors.iter_mut().find(|c| !c.is_attached())
    }

    /// Remove the connector being drawn. Returns whether one existed.
    pub fn discard_pending_connector(&mut self) -> bool {
        let before = self.connectors.len();
        self.connectors.retain(|c| c.is_attached());
        self.connectors.len() != before
    }

    /// Connectors attached to `device`.
    pub fn connectors_to_mut(
        &mut self,
        device: DeviceId,
    ) -> impl Iterator<Item = &mut ConnectorCurve> {
        self.connectors
            .iter_mut()
            .filter(move |c| c.target() == Some(device))
    }

    /// Drop every connector, returning the devices they were attached to.
    pub fn remove_connectors(&mut self) -> Vec<DeviceId> {
        self.connectors.drain(..).filter_map(|c| c.target()).collect()
    }

    /// Move every connector's source pair to the current edge midpoint.
    pub fn reanchor_connectors(&mut self, bridge: &dyn CoordinateBridge) {
        let source = self.edge_anchor(bridge);
        for c in &mut self.connectors {
            c.set_source(source);
        }
    }

    // ─── Serialization ───────────────────────────────────────────────────

    /// Selection payload in the layer's local frame (scene corner minus
    /// layer offset, the frame neurons are loaded in). `ll` / `ur` are the
    /// component-wise min / max, so `ll ≤ ur` in that y-up frame whatever
    /// the screen orientation. `None` if the layer is gone.
    pub fn selection_info(
        &self,
        field: &PointField,
        bridge: &dyn CoordinateBridge,
        metadata: &SelectionMetadata,
    ) -> Option<SelectionPayload> {
        let layer = field.layer(&self.layer_name)?;
        let b = self.bounds();
        let a = bridge.screen_to_scene(Point::new(b.x0, b.y0)) - layer.offset;
        let c = bridge.screen_to_scene(Point::new(b.x1, b.y1)) - layer.offset;

        Some(SelectionPayload {
            name: self.layer_name.clone(),
            selection: SelectionBounds {
                ll: a.min(c),
                ur: a.max(c),
            },
            neuron_type: metadata.neuron_type.clone(),
            syn_model: metadata.syn_model.clone(),
            mask_shape: self.shape,
        })
    }
}

fn restore_base(layer: &mut PointLayer, ids: &[usize]) {
    let base = layer.base_color;
    for &i in ids {
        layer.set_color(i, base);
    }
}
