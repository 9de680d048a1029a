//! Interaction controller: pointer / keyboard events → region edits.
//!
//! The controller owns the `EditorState`, the point field and the
//! coordinate bridge, and runs one gesture at a time:
//!
//! | Gesture | Started by | Released |
//! |---------|------------|----------|
//! | Resizing | press on a focused region's handle | normalize, rebuild handles, move connectors |
//! | DraggingObject | Shift + press on a device marker | drop the device |
//! | Connecting | press inside an unconnected region | attach to the device hit, or discard |
//! | Drawing | press on empty space | commit a region and queue its payload |
//!
//! Rules are tried in that order on pointer-down. Every pointer-up ends in
//! `Idle`. Each `handle_*` method returns whether anything visible changed,
//! so the host knows when to redraw.

use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::state::{EditorState, Interaction};
use kurbo::{Point, Rect};
use nc_core::bridge::{CoordinateBridge, Viewport};
use nc_core::config::EditorConfig;
use nc_core::device::DeviceMarker;
use nc_core::id::RegionId;
use nc_core::payload::{DeviceProjection, SelectionMetadata, SelectionPayload};
use nc_core::points::PointField;
use nc_core::region::{HandleKind, MaskShape, SelectionRegion};
use nc_render::hit::{pick_device, pick_handle};

// ─── Marquee ─────────────────────────────────────────────────────────────

/// The rubber-band visual shown while drawing, in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marquee {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Drawn with fully rounded corners when the active shape is an ellipse.
    pub rounded: bool,
}

impl Marquee {
    /// Span between the anchor and the live pointer, whichever way the
    /// drag goes.
    pub fn between(anchor: Point, current: Point, rounded: bool) -> Self {
        let dx = current.x - anchor.x;
        let dy = current.y - anchor.y;
        let (left, top, width, height) = match (dx >= 0.0, dy >= 0.0) {
            (true, true) => (anchor.x, anchor.y, dx, dy),
            (false, true) => (current.x, anchor.y, -dx, dy),
            (true, false) => (anchor.x, current.y, dx, -dy),
            (false, false) => (current.x, current.y, -dx, -dy),
        };
        Self {
            left,
            top,
            width,
            height,
            rounded,
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.left + self.width, self.top + self.height)
    }
}

// ─── Controller ──────────────────────────────────────────────────────────

pub struct InteractionController<B: CoordinateBridge> {
    bridge: B,
    field: PointField,
    state: EditorState,
    config: EditorConfig,
    /// Shape used for the next marquee (from the form panel).
    shape: MaskShape,
    /// Dropdown metadata attached to serialized selections.
    metadata: SelectionMetadata,
    marquee: Option<Marquee>,
    /// Payloads waiting for the network collaborator.
    outbox: Vec<SelectionPayload>,
}

impl<B: CoordinateBridge> InteractionController<B> {
    pub fn new(bridge: B, field: PointField, config: EditorConfig) -> Self {
        Self {
            bridge,
            field,
            state: EditorState::new(),
            config,
            shape: MaskShape::default(),
            metadata: SelectionMetadata::default(),
            marquee: None,
            outbox: Vec::new(),
        }
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn field(&self) -> &PointField {
        &self.field
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Marquee visual while drawing.
    pub fn marquee(&self) -> Option<Marquee> {
        self.marquee
    }

    pub fn shape(&self) -> MaskShape {
        self.shape
    }

    /// Select the shape for regions drawn from now on. Existing regions
    /// keep theirs.
    pub fn set_shape(&mut self, shape: MaskShape) {
        self.shape = shape;
    }

    pub fn metadata(&self) -> &SelectionMetadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: SelectionMetadata) {
        self.metadata = metadata;
    }

    pub fn add_device(&mut self, marker: DeviceMarker) {
        self.state.add_device(marker);
    }

    /// Hand queued payloads to the network collaborator. Transport
    /// failures are the caller's concern; local state is already committed.
    pub fn take_submissions(&mut self) -> Vec<SelectionPayload> {
        std::mem::take(&mut self.outbox)
    }

    /// Text for the status display.
    pub fn status_text(&self) -> String {
        format!("{} selected", self.state.selected_count())
    }

    pub fn selection_infos(&self) -> Vec<SelectionPayload> {
        self.state.selection_infos(&self.field, &self.bridge, &self.metadata)
    }

    pub fn device_projections(&self) -> Vec<DeviceProjection> {
        self.state.device_projections(&self.field, &self.bridge, &self.metadata)
    }

    /// Device projections as the JSON array sent to the backend.
    pub fn device_projections_json(&self) -> String {
        serde_json::to_string(&self.device_projections()).unwrap_or_else(|_| "[]".to_string())
    }

    // ─── Event dispatch ──────────────────────────────────────────────────

    /// Route any input event. Returns `true` if a redraw is needed.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.handle_pointer_down(Point::new(*x, *y), *modifiers)
            }
            InputEvent::PointerMove { x, y, .. } => self.handle_pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp { x, y, .. } => self.handle_pointer_up(Point::new(*x, *y)),
            InputEvent::Key { key, modifiers } => self.handle_key(key, *modifiers),
            InputEvent::Resize { width, height } => self.resize_viewport(*width, *height),
        }
    }

    pub fn handle_pointer_down(&mut self, p: Point, modifiers: Modifiers) -> bool {
        self.abandon_gesture();
        let ray = self.bridge.ray(p);

        // Handles of the focused region take precedence over everything.
        if let Some(focused) = self.state.focused() {
            let handle = self
                .state
                .region(focused)
                .and_then(|r| pick_handle(&ray, r.handles(), self.config.handle_radius));
            if let Some(handle) = handle {
                log::debug!("resize {focused} via {}", handle.name());
                self.state
                    .set_interaction(Interaction::Resizing { region: focused, handle });
                return true;
            }
            self.unfocus();
        }

        if modifiers.shift
            && let Some(device) = pick_device(&ray, self.state.devices())
        {
            log::debug!("drag device {device}");
            self.state
                .set_interaction(Interaction::DraggingObject { device });
            return true;
        }

        if let Some(id) = self.state.region_at(p) {
            let bridge: &dyn CoordinateBridge = &self.bridge;
            let scene = bridge.screen_to_scene(p);
            let Some(region) = self.state.region_mut(id) else {
                return false;
            };
            let connecting = region.connectors().is_empty();
            if connecting {
                region.start_connector(bridge, scene);
            }
            region.make_handles(bridge);
            self.state.set_focused(Some(id));
            if connecting {
                log::debug!("connect from {id}");
                self.state
                    .set_interaction(Interaction::Connecting { region: id });
            }
            return true;
        }

        self.state.set_interaction(Interaction::Drawing { anchor: p });
        self.marquee = Some(Marquee::between(p, p, self.shape == MaskShape::Ellipse));
        true
    }

    pub fn handle_pointer_move(&mut self, p: Point) -> bool {
        match self.state.interaction() {
            Interaction::Idle => false,
            Interaction::Drawing { anchor } => {
                self.marquee = Some(Marquee::between(anchor, p, self.shape == MaskShape::Ellipse));
                true
            }
            Interaction::Resizing { region, handle } => self.drag_handle(region, handle, p),
            Interaction::Connecting { region } => {
                let scene = self.bridge.screen_to_scene(p);
                match self
                    .state
                    .region_mut(region)
                    .and_then(SelectionRegion::pending_connector_mut)
                {
                    Some(connector) => {
                        connector.track_pointer(scene);
                        true
                    }
                    None => false,
                }
            }
            Interaction::DraggingObject { device } => {
                let ray = self.bridge.ray(p);
                let Some(anchor) = ray.intersect_plane_z(self.config.ground_plane_z) else {
                    return false;
                };
                let Some(marker) = self.state.device_mut(device) else {
                    return false;
                };
                marker.anchor = anchor;
                let radius = marker.radius;

                for id in self.state.connections(device).to_vec() {
                    if let Some(region) = self.state.region_mut(id) {
                        for connector in region.connectors_to_mut(device) {
                            connector.track_device(anchor, radius);
                        }
                    }
                }
                true
            }
        }
    }

    pub fn handle_pointer_up(&mut self, p: Point) -> bool {
        let interaction = self.state.interaction();
        self.state.set_interaction(Interaction::Idle);

        match interaction {
            Interaction::Idle => false,
            Interaction::Drawing { anchor } => {
                self.marquee = None;
                self.commit_marquee(anchor, p);
                true
            }
            Interaction::Resizing { region, handle } => {
                self.drag_handle(region, handle, p);
                self.settle_region(region);
                true
            }
            Interaction::Connecting { region } => {
                self.finish_connector(region, p);
                true
            }
            Interaction::DraggingObject { device } => {
                log::debug!("released device {device}");
                true
            }
        }
    }

    /// Handle a key press. Only Delete / Backspace and Escape are bound.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> bool {
        match ShortcutMap::resolve(key, modifiers) {
            Some(ShortcutAction::DeleteRegion) => self.delete_focused(),
            Some(ShortcutAction::Deselect) => self.deselect(),
            None => false,
        }
    }

    /// Forward a canvas resize to the renderer. Handle pick positions are
    /// rebuilt because their scene coordinates depend on the projection.
    pub fn resize_viewport(&mut self, width: f64, height: f64) -> bool {
        self.bridge.set_viewport(Viewport { width, height });
        let bridge: &dyn CoordinateBridge = &self.bridge;
        if let Some(region) = self.state.focused_region_mut() {
            region.make_handles(bridge);
        }
        true
    }

    // ─── Region operations ───────────────────────────────────────────────

    /// Delete the focused region together with its handles, fill,
    /// connectors and every device connection. No-op without focus.
    pub fn delete_focused(&mut self) -> bool {
        let Some(id) = self.state.focused() else {
            return false;
        };
        let Some(mut region) = self.state.remove_region(id) else {
            return false;
        };

        region.remove_handles();
        region.remove_box();
        let detached = region.remove_connectors();
        let delta = region.release_points(&mut self.field);
        self.state.apply_count_delta(delta);
        self.state
            .rehighlight(region.layer_name(), &mut self.field, self.config.highlight_color);

        let open_gesture = match self.state.interaction() {
            Interaction::Resizing { region, .. } => Some(region),
            Interaction::Connecting { region } => Some(region),
            _ => None,
        };
        if open_gesture == Some(id) {
            self.state.set_interaction(Interaction::Idle);
        }

        log::info!("deleted {id} ({} connectors detached)", detached.len());
        true
    }

    /// Drop focus without deleting anything.
    pub fn deselect(&mut self) -> bool {
        let had_focus = self.state.focused().is_some();
        self.unfocus();
        had_focus
    }

    fn unfocus(&mut self) {
        if let Some(region) = self.state.focused_region_mut() {
            region.remove_handles();
        }
        self.state.set_focused(None);
    }

    fn drag_handle(&mut self, id: RegionId, handle: HandleKind, p: Point) -> bool {
        let bridge: &dyn CoordinateBridge = &self.bridge;
        let Some(region) = self.state.region_mut(id) else {
            debug_assert!(false, "resizing a region that no longer exists");
            return false;
        };
        region.resize(handle, p);
        region.make_box();
        let delta = region.update_points(&mut self.field, bridge, self.config.highlight_color);
        let layer = region.layer_name().to_owned();
        self.state.apply_count_delta(delta);
        self.state
            .rehighlight(&layer, &mut self.field, self.config.highlight_color);
        true
    }

    /// Finish a resize: order the corners and rebuild everything derived
    /// from them.
    fn settle_region(&mut self, id: RegionId) {
        let bridge: &dyn CoordinateBridge = &self.bridge;
        let Some(region) = self.state.region_mut(id) else {
            return;
        };
        region.normalize();
        region.make_box();
        region.make_handles(bridge);
        region.reanchor_connectors(bridge);
        let delta = region.update_points(&mut self.field, bridge, self.config.highlight_color);
        log::debug!(
            "resized {id} to {:?}-{:?}, {} points",
            region.ll(),
            region.ur(),
            region.selected_point_ids().len()
        );
        let layer = region.layer_name().to_owned();
        self.state.apply_count_delta(delta);
        self.state
            .rehighlight(&layer, &mut self.field, self.config.highlight_color);
    }

    fn commit_marquee(&mut self, anchor: Point, release: Point) {
        let extent = Rect::from_points(anchor, release);
        let min = self.config.min_marquee_extent;
        if extent.width() <= min || extent.height() <= min {
            log::trace!("dropping degenerate marquee {extent:?}");
            return;
        }

        let bridge: &dyn CoordinateBridge = &self.bridge;
        let id = self.state.next_region_id();
        let mut region = SelectionRegion::from_drag(id, anchor, release, self.shape);
        if !region.resolve_layer(&self.field, bridge) {
            log::debug!("marquee {extent:?} overlaps no layer");
            return;
        }

        let delta = region.update_points(&mut self.field, bridge, self.config.highlight_color);
        region.make_box();
        region.make_handles(bridge);

        if let Some(payload) = region.selection_info(&self.field, bridge, &self.metadata) {
            log::info!("new {:?} selection on {}", payload.mask_shape, payload.name);
            self.outbox.push(payload);
        }

        self.state.push_region(region);
        self.state.apply_count_delta(delta);
        self.state.set_focused(Some(id));
    }

    fn finish_connector(&mut self, id: RegionId, release: Point) {
        let ray = self.bridge.ray(release);
        let target = pick_device(&ray, self.state.devices())
            .and_then(|device| self.state.device(device).copied());
        let Some(region) = self.state.region_mut(id) else {
            return;
        };

        match target {
            Some(marker) => {
                let Some(connector) = region.pending_connector_mut() else {
                    return;
                };
                connector.attach(marker.id, marker.anchor, marker.radius);
                self.state.connect(marker.id, id);
                log::info!("connected {id} to {}", marker.id);
            }
            None => {
                region.discard_pending_connector();
                log::debug!("connector from {id} discarded");
            }
        }
    }

    /// A pointer-down while another gesture is still open means its
    /// pointer-up was lost. Close it out the way a release would, without
    /// committing a marquee or attaching a connector.
    fn abandon_gesture(&mut self) {
        let interaction = self.state.interaction();
        match interaction {
            Interaction::Idle => return,
            Interaction::Drawing { .. } => self.marquee = None,
            Interaction::Resizing { region, .. } => self.settle_region(region),
            Interaction::Connecting { region } => {
                if let Some(r) = self.state.region_mut(region) {
                    r.discard_pending_connector();
                }
            }
            Interaction::DraggingObject { .. } => {}
        }
        log::debug!("abandoned unfinished {interaction:?}");
        self.state.set_interaction(Interaction::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nc_core::geometry::{Color, DVec3};
    use nc_core::id::DeviceId;
    use nc_core::points::PointLayer;
    use nc_render::camera::OrthoCamera;

    fn controller() -> InteractionController<OrthoCamera> {
        let camera = OrthoCamera::new(
            Viewport {
                width: 800.0,
                height: 600.0,
            },
            50.0,
        );
        // Points at scene x ∈ {-6..-2}, y ∈ {1..4} → screen x 100..300, y 100..250
        let mut positions = Vec::new();
        for y in 1..=4 {
            for x in -6..=-2 {
                positions.extend([x as f32, y as f32, 0.0]);
            }
        }
        let mut field = PointField::new();
        field.add_layer(PointLayer::new(
            "L23",
            positions,
            DVec3::ZERO,
            Color::rgb(0.5, 0.5, 0.5),
        ));
        InteractionController::new(camera, field, EditorConfig::default())
    }

    fn drag(c: &mut InteractionController<OrthoCamera>, from: (f64, f64), to: (f64, f64)) {
        c.handle(&InputEvent::pointer_down(from.0, from.1));
        c.handle(&InputEvent::pointer_move(to.0, to.1));
        c.handle(&InputEvent::pointer_up(to.0, to.1));
    }

    #[test]
    fn marquee_spans_all_four_drag_directions() {
        let a = Point::new(100.0, 100.0);
        let span = |x: f64, y: f64| {
            let m = Marquee::between(a, Point::new(x, y), false);
            (m.left, m.top, m.width, m.height)
        };
        assert_eq!(span(150.0, 130.0), (100.0, 100.0, 50.0, 30.0));
        assert_eq!(span(50.0, 130.0), (50.0, 100.0, 50.0, 30.0));
        assert_eq!(span(150.0, 70.0), (100.0, 70.0, 50.0, 30.0));
        assert_eq!(span(50.0, 70.0), (50.0, 70.0, 50.0, 30.0));
    }

    #[test]
    fn drawing_shows_marquee_until_release() {
        let mut c = controller();
        c.set_shape(MaskShape::Ellipse);
        c.handle(&InputEvent::pointer_down(300.0, 250.0));
        assert!(matches!(c.state().interaction(), Interaction::Drawing { .. }));
        c.handle(&InputEvent::pointer_move(100.0, 100.0));
        let m = c.marquee().unwrap();
        assert!(m.rounded);
        assert_eq!(m.to_rect(), Rect::new(100.0, 100.0, 300.0, 250.0));

        c.handle(&InputEvent::pointer_up(100.0, 100.0));
        assert!(c.marquee().is_none());
        assert_eq!(c.state().interaction(), Interaction::Idle);
        assert_eq!(c.state().regions().len(), 1);
        assert_eq!(c.state().regions()[0].shape(), MaskShape::Ellipse);
    }

    #[test]
    fn zero_area_marquee_is_dropped() {
        let mut c = controller();
        drag(&mut c, (150.0, 150.0), (150.0, 200.0));
        assert!(c.state().regions().is_empty());
        assert!(c.take_submissions().is_empty());
    }

    #[test]
    fn marquee_over_empty_space_is_dropped() {
        let mut c = controller();
        drag(&mut c, (600.0, 400.0), (700.0, 500.0));
        assert!(c.state().regions().is_empty());
        assert!(c.take_submissions().is_empty());
        assert_eq!(c.state().selected_count(), 0);
    }

    #[test]
    fn committed_region_is_focused() {
        let mut c = controller();
        drag(&mut c, (90.0, 90.0), (310.0, 260.0));
        let id = c.state().regions()[0].id();
        assert_eq!(c.state().focused(), Some(id));
        assert!(c.state().regions()[0].has_focus());
        assert_eq!(c.state().selected_count(), 20);
        assert_eq!(c.status_text(), "20 selected");
    }

    #[test]
    fn pressing_off_handles_drops_focus() {
        let mut c = controller();
        drag(&mut c, (90.0, 90.0), (310.0, 260.0));
        // Empty space: unfocus, then start a marquee
        c.handle(&InputEvent::pointer_down(700.0, 500.0));
        assert_eq!(c.state().focused(), None);
        assert!(!c.state().regions()[0].has_focus());
        assert!(matches!(c.state().interaction(), Interaction::Drawing { .. }));
    }

    #[test]
    fn pressing_a_handle_starts_resize() {
        let mut c = controller();
        drag(&mut c, (100.0, 100.0), (300.0, 250.0));
        c.handle(&InputEvent::pointer_down(300.0, 175.0));
        assert_eq!(c.state().active_handle(), Some(HandleKind::RightMiddle));
    }

    #[test]
    fn shift_press_on_device_starts_drag() {
        let mut c = controller();
        let id = DeviceId::intern("ac_generator");
        c.add_device(DeviceMarker::new(id, DVec3::new(5.0, 0.0, 0.0), 0.2));
        c.handle(&InputEvent::PointerDown {
            x: 650.0,
            y: 300.0,
            modifiers: Modifiers::SHIFT,
        });
        assert_eq!(c.state().dragged_device(), Some(id));
        c.handle(&InputEvent::pointer_move(700.0, 250.0));
        let anchor = c.state().device(id).unwrap().anchor;
        assert!(anchor.abs_diff_eq(DVec3::new(6.0, 1.0, 0.0), 1e-9), "{anchor:?}");
        c.handle(&InputEvent::pointer_up(700.0, 250.0));
        assert_eq!(c.state().dragged_device(), None);
    }

    #[test]
    fn shift_press_missing_devices_falls_through_to_drawing() {
        let mut c = controller();
        c.handle(&InputEvent::PointerDown {
            x: 600.0,
            y: 500.0,
            modifiers: Modifiers::SHIFT,
        });
        assert!(matches!(c.state().interaction(), Interaction::Drawing { .. }));
    }

    #[test]
    fn stale_connector_is_discarded_by_next_press() {
        let mut c = controller();
        drag(&mut c, (100.0, 100.0), (300.0, 250.0));
        c.deselect();
        c.handle(&InputEvent::pointer_down(200.0, 175.0));
        assert!(matches!(c.state().interaction(), Interaction::Connecting { .. }));
        // Pointer-up lost; next press starts fresh
        c.handle(&InputEvent::pointer_down(700.0, 500.0));
        assert!(c.state().regions()[0].connectors().is_empty());
        assert!(matches!(c.state().interaction(), Interaction::Drawing { .. }));
    }

    #[test]
    fn escape_and_unbound_keys() {
        let mut c = controller();
        drag(&mut c, (100.0, 100.0), (300.0, 250.0));
        assert!(!c.handle(&InputEvent::key("q")));
        assert!(c.state().focused().is_some());
        assert!(c.handle(&InputEvent::key("Escape")));
        assert!(c.state().focused().is_none());
        assert_eq!(c.state().regions().len(), 1);
    }

    #[test]
    fn viewport_resize_rebuilds_handle_positions() {
        let mut c = controller();
        drag(&mut c, (100.0, 100.0), (300.0, 250.0));
        let before = c.state().regions()[0].handles()[0].scene;
        assert!(c.handle(&InputEvent::Resize {
            width: 1000.0,
            height: 600.0,
        }));
        let after = c.state().regions()[0].handles()[0].scene;
        assert_ne!(before, after);
        assert_eq!(c.bridge().viewport().width, 1000.0);
    }
}
