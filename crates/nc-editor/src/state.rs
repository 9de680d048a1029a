//! Editor state: everything the interaction controller mutates.
//!
//! One `EditorState` per editor replaces ambient globals. The active
//! gesture lives in a single `Interaction` value, so a new pointer-down
//! always overwrites whatever a previous gesture left behind.

use kurbo::Point;
use nc_core::bridge::CoordinateBridge;
use nc_core::device::DeviceMarker;
use nc_core::geometry::Color;
use nc_core::id::{DeviceId, RegionId};
use nc_core::payload::{DeviceProjection, SelectionMetadata, SelectionPayload};
use nc_core::points::PointField;
use nc_core::region::{HandleKind, SelectionRegion};
use std::collections::HashMap;

/// The active gesture and its payload.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Rubber-band marquee anchored at the pointer-down position.
    Drawing { anchor: Point },
    /// Dragging one resize handle of the focused region.
    Resizing { region: RegionId, handle: HandleKind },
    /// Dragging the free end of a new connector.
    Connecting { region: RegionId },
    /// Shift-dragging a device marker.
    DraggingObject { device: DeviceId },
}

#[derive(Debug, Default)]
pub struct EditorState {
    /// Live regions in creation order.
    regions: Vec<SelectionRegion>,
    /// Device → regions with a connector attached to it.
    connections: HashMap<DeviceId, Vec<RegionId>>,
    devices: Vec<DeviceMarker>,
    focused: Option<RegionId>,
    interaction: Interaction,
    /// Selected points over all layers, mirrored to the status display.
    selected_count: usize,
    next_region: u64,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Regions ─────────────────────────────────────────────────────────

    pub fn regions(&self) -> &[SelectionRegion] {
        &self.regions
    }

    pub fn region(&self, id: RegionId) -> Option<&SelectionRegion> {
        self.regions.iter().find(|r| r.id() == id)
    }

    pub fn region_mut(&mut self, id: RegionId) -> Option<&mut SelectionRegion> {
        self.regions.iter_mut().find(|r| r.id() == id)
    }

    /// Allocate an id for a region about to be created.
    pub fn next_region_id(&mut self) -> RegionId {
        self.next_region += 1;
        RegionId(self.next_region)
    }

    pub fn push_region(&mut self, region: SelectionRegion) {
        debug_assert!(
            !region.layer_name().is_empty(),
            "regions without a layer must not be retained"
        );
        self.regions.push(region);
    }

    /// Region under a screen point. Overlaps resolve to the most recently
    /// created region, which is drawn on top.
    pub fn region_at(&self, p: Point) -> Option<RegionId> {
        self.regions
            .iter()
            .rev()
            .find(|r| r.within_bounds(p))
            .map(SelectionRegion::id)
    }

    /// Remove a region and every connection that references it.
    /// Clears focus if it pointed at the region.
    pub fn remove_region(&mut self, id: RegionId) -> Option<SelectionRegion> {
        let pos = self.regions.iter().position(|r| r.id() == id)?;
        let region = self.regions.remove(pos);

        for regions in self.connections.values_mut() {
            regions.retain(|r| *r != id);
        }
        self.connections.retain(|_, regions| !regions.is_empty());

        if self.focused == Some(id) {
            self.focused = None;
        }
        Some(region)
    }

    /// Paint `color` on every point selected by a region on `layer`.
    /// A rescan or release restores base colors without knowing which
    /// points other regions still hold, so overlaps are repainted after.
    pub fn rehighlight(&self, layer: &str, field: &mut PointField, color: Color) {
        let Some(points) = field.layer_mut(layer) else {
            return;
        };
        for region in self.regions.iter().filter(|r| r.layer_name() == layer) {
            for &i in region.selected_point_ids() {
                points.set_color(i, color);
            }
        }
    }

    // ─── Focus & gesture ─────────────────────────────────────────────────

    pub fn focused(&self) -> Option<RegionId> {
        debug_assert!(
            self.focused.is_none_or(|id| self.region(id).is_some()),
            "focused region was deleted"
        );
        self.focused
    }

    pub fn set_focused(&mut self, id: Option<RegionId>) {
        self.focused = id;
    }

    pub fn focused_region_mut(&mut self) -> Option<&mut SelectionRegion> {
        let id = self.focused()?;
        self.region_mut(id)
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn set_interaction(&mut self, interaction: Interaction) {
        self.interaction = interaction;
    }

    /// Handle being dragged, if resizing.
    pub fn active_handle(&self) -> Option<HandleKind> {
        match self.interaction {
            Interaction::Resizing { handle, .. } => Some(handle),
            _ => None,
        }
    }

    /// Device being dragged, if any.
    pub fn dragged_device(&self) -> Option<DeviceId> {
        match self.interaction {
            Interaction::DraggingObject { device } => Some(device),
            _ => None,
        }
    }

    // ─── Devices ─────────────────────────────────────────────────────────

    pub fn devices(&self) -> &[DeviceMarker] {
        &self.devices
    }

    /// Register a device marker. A marker with the same id is replaced.
    pub fn add_device(&mut self, marker: DeviceMarker) {
        if let Some(existing) = self.devices.iter_mut().find(|d| d.id == marker.id) {
            *existing = marker;
        } else {
            self.devices.push(marker);
        }
    }

    pub fn device(&self, id: DeviceId) -> Option<&DeviceMarker> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn device_mut(&mut self, id: DeviceId) -> Option<&mut DeviceMarker> {
        self.devices.iter_mut().find(|d| d.id == id)
    }

    /// Record that `region` has a connector attached to `device`.
    pub fn connect(&mut self, device: DeviceId, region: RegionId) {
        let regions = self.connections.entry(device).or_default();
        if !regions.contains(&region) {
            regions.push(region);
        }
    }

    /// Regions connected to `device`, in attach order.
    pub fn connections(&self, device: DeviceId) -> &[RegionId] {
        self.connections.get(&device).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of devices with at least one connection.
    pub fn connected_device_count(&self) -> usize {
        self.connections.len()
    }

    // ─── Counter ─────────────────────────────────────────────────────────

    pub fn selected_count(&self) -> usize {
        self.selected_count
    }

    pub fn apply_count_delta(&mut self, delta: isize) {
        self.selected_count = self.selected_count.saturating_add_signed(delta);
    }

    // ─── Serialization ───────────────────────────────────────────────────

    /// Payloads for all live regions, in creation order.
    pub fn selection_infos(
        &self,
        field: &PointField,
        bridge: &dyn CoordinateBridge,
        metadata: &SelectionMetadata,
    ) -> Vec<SelectionPayload> {
        self.regions
            .iter()
            .filter_map(|r| r.selection_info(field, bridge, metadata))
            .collect()
    }

    /// Every connected device with the payloads of its regions, ordered by
    /// device name.
    pub fn device_projections(
        &self,
        field: &PointField,
        bridge: &dyn CoordinateBridge,
        metadata: &SelectionMetadata,
    ) -> Vec<DeviceProjection> {
        let mut projections: Vec<DeviceProjection> = self
            .connections
            .iter()
            .map(|(device, regions)| DeviceProjection {
                device: *device,
                connectees: regions
                    .iter()
                    .filter_map(|id| self.region(*id))
                    .filter_map(|r| r.selection_info(field, bridge, metadata))
                    .collect(),
            })
            .collect();
        projections.sort_by(|a, b| a.device.as_str().cmp(b.device.as_str()));
        projections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nc_core::geometry::DVec3;
    use nc_core::region::MaskShape;

    fn region(state: &mut EditorState, ll: (f64, f64), ur: (f64, f64)) -> RegionId {
        let id = state.next_region_id();
        let mut r = SelectionRegion::new(id, ll.into(), ur.into(), MaskShape::Rectangle);
        // Bypass point lookup; these tests only exercise bookkeeping.
        r.make_box();
        state.regions.push(r);
        id
    }

    #[test]
    fn region_ids_are_sequential() {
        let mut state = EditorState::new();
        assert_eq!(state.next_region_id(), RegionId(1));
        assert_eq!(state.next_region_id(), RegionId(2));
    }

    #[test]
    fn overlapping_regions_prefer_newest() {
        let mut state = EditorState::new();
        let old = region(&mut state, (0.0, 0.0), (100.0, 100.0));
        let new = region(&mut state, (50.0, 50.0), (150.0, 150.0));
        assert_eq!(state.region_at(Point::new(75.0, 75.0)), Some(new));
        assert_eq!(state.region_at(Point::new(10.0, 10.0)), Some(old));
        assert_eq!(state.region_at(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn remove_region_cleans_every_connection() {
        let mut state = EditorState::new();
        let a = region(&mut state, (0.0, 0.0), (10.0, 10.0));
        let b = region(&mut state, (20.0, 0.0), (30.0, 10.0));
        let generator = DeviceId::intern("poisson_generator");
        let rec = DeviceId::intern("spike_detector");
        state.connect(generator, a);
        state.connect(generator, b);
        state.connect(rec, a);
        state.set_focused(Some(a));

        let removed = state.remove_region(a).unwrap();
        assert_eq!(removed.id(), a);
        assert_eq!(state.connections(generator), &[b]);
        assert!(state.connections(rec).is_empty());
        assert_eq!(state.connected_device_count(), 1);
        assert_eq!(state.focused(), None);
        assert!(state.remove_region(a).is_none());
    }

    #[test]
    fn connect_is_idempotent() {
        let mut state = EditorState::new();
        let a = region(&mut state, (0.0, 0.0), (10.0, 10.0));
        let dev = DeviceId::intern("voltmeter");
        state.connect(dev, a);
        state.connect(dev, a);
        assert_eq!(state.connections(dev), &[a]);
    }

    #[test]
    fn devices_replace_by_id() {
        let mut state = EditorState::new();
        let id = DeviceId::intern("dc_generator");
        state.add_device(DeviceMarker::new(id, DVec3::ZERO, 0.2));
        state.add_device(DeviceMarker::new(id, DVec3::new(1.0, 0.0, 0.0), 0.3));
        assert_eq!(state.devices().len(), 1);
        assert_eq!(state.device(id).unwrap().radius, 0.3);
    }

    #[test]
    fn counter_never_underflows() {
        let mut state = EditorState::new();
        state.apply_count_delta(5);
        state.apply_count_delta(-2);
        assert_eq!(state.selected_count(), 3);
        state.apply_count_delta(-10);
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn interaction_accessors() {
        let mut state = EditorState::new();
        assert_eq!(state.interaction(), Interaction::Idle);
        state.set_interaction(Interaction::Resizing {
            region: RegionId(1),
            handle: HandleKind::UpperMiddle,
        });
        assert_eq!(state.active_handle(), Some(HandleKind::UpperMiddle));
        assert_eq!(state.dragged_device(), None);
    }
}
