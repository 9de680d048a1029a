//! Point field: the renderable neuron positions, one buffer pair per layer.
//!
//! Each layer exposes a flat position buffer (stride 3: x, y, z, scene
//! space) and a parallel flat color buffer (stride 3: r, g, b). The editor
//! reads positions and the layer offset, and writes colors to mark
//! selection membership.

use crate::error::SpecError;
use crate::geometry::{Color, DVec3};
use serde::Deserialize;

/// Base colors assigned to layers loaded from a network spec, in order.
pub const LAYER_PALETTE: [Color; 6] = [
    Color::rgb(0.6, 0.6, 0.6),
    Color::rgb(0.35, 0.55, 0.85),
    Color::rgb(0.85, 0.55, 0.35),
    Color::rgb(0.45, 0.75, 0.45),
    Color::rgb(0.75, 0.45, 0.75),
    Color::rgb(0.75, 0.75, 0.4),
];

// ─── Layer ───────────────────────────────────────────────────────────────

/// A named collection of points sharing a coordinate offset.
#[derive(Debug, Clone)]
pub struct PointLayer {
    pub name: String,
    /// Flat `[x0, y0, z0, x1, ...]` in scene space.
    pub positions: Vec<f32>,
    /// Flat `[r0, g0, b0, r1, ...]`, same length as `positions`.
    pub colors: Vec<f32>,
    /// Layer origin in scene space; selections are reported relative to it.
    pub offset: DVec3,
    /// Color restored on points that leave a selection.
    pub base_color: Color,
}

impl PointLayer {
    /// Build a layer with every point painted in `base_color`.
    /// A trailing partial triple in `positions` is dropped.
    pub fn new(
        name: impl Into<String>,
        mut positions: Vec<f32>,
        offset: DVec3,
        base_color: Color,
    ) -> Self {
        positions.truncate(positions.len() - positions.len() % 3);
        let rgb = [base_color.r, base_color.g, base_color.b];
        let colors = std::iter::repeat_n(rgb, positions.len() / 3).flatten().collect();
        Self {
            name: name.into(),
            positions,
            colors,
            offset,
            base_color,
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Scene position of point `i`.
    pub fn position(&self, i: usize) -> DVec3 {
        let p = &self.positions[i * 3..i * 3 + 3];
        DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64)
    }

    pub fn color(&self, i: usize) -> Color {
        let c = &self.colors[i * 3..i * 3 + 3];
        Color::rgb(c[0], c[1], c[2])
    }

    pub fn set_color(&mut self, i: usize, color: Color) {
        self.colors[i * 3..i * 3 + 3].copy_from_slice(&[color.r, color.g, color.b]);
    }

    /// Iterate `(index, scene position)` pairs in buffer order.
    pub fn iter_positions(&self) -> impl Iterator<Item = (usize, DVec3)> + '_ {
        (0..self.len()).map(|i| (i, self.position(i)))
    }
}

// ─── Field ───────────────────────────────────────────────────────────────

/// All point layers in the scene, in load order.
#[derive(Debug, Clone, Default)]
pub struct PointField {
    layers: Vec<PointLayer>,
}

impl PointField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer. A layer with the same name is replaced in place.
    pub fn add_layer(&mut self, layer: PointLayer) {
        if let Some(existing) = self.layers.iter_mut().find(|l| l.name == layer.name) {
            *existing = layer;
        } else {
            self.layers.push(layer);
        }
    }

    pub fn layers(&self) -> &[PointLayer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&PointLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut PointLayer> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    /// Total point count over all layers.
    pub fn point_count(&self) -> usize {
        self.layers.iter().map(PointLayer::len).sum()
    }

    /// Build a field from a network specification document:
    ///
    /// ```json
    /// { "layers": [ { "name": "L23", "neurons": [{"x": 0.1, "y": -0.2, "z": 0}],
    ///                 "center": [0, 0, 0] } ] }
    /// ```
    ///
    /// Coordinates may be numbers or numeric strings. `z` and the third
    /// center component default to 0 for planar layers. Neuron positions
    /// are relative to the layer center, which becomes the layer offset.
    ///
    /// # Errors
    /// Returns `SpecError::Json` for invalid JSON and
    /// `SpecError::MalformedLayer` for a nameless layer, a non-numeric
    /// coordinate, or a center with fewer than two components.
    pub fn from_network_spec(json: &str) -> Result<Self, SpecError> {
        let spec: NetworkSpec = serde_json::from_str(json)?;
        let mut field = PointField::new();

        for (i, layer) in spec.layers.into_iter().enumerate() {
            if layer.name.is_empty() {
                return Err(SpecError::MalformedLayer {
                    name: format!("#{i}"),
                    reason: "missing name".to_string(),
                });
            }
            let offset = parse_center(&layer.name, &layer.center)?;

            let mut positions = Vec::with_capacity(layer.neurons.len() * 3);
            for neuron in &layer.neurons {
                let local = DVec3::new(
                    parse_number(&layer.name, &neuron.x)?,
                    parse_number(&layer.name, &neuron.y)?,
                    match &neuron.z {
                        Some(z) => parse_number(&layer.name, z)?,
                        None => 0.0,
                    },
                );
                let scene = local + offset;
                positions.extend([scene.x as f32, scene.y as f32, scene.z as f32]);
            }

            let color = LAYER_PALETTE[i % LAYER_PALETTE.len()];
            log::debug!("loaded layer {} with {} points", layer.name, positions.len() / 3);
            field.add_layer(PointLayer::new(layer.name, positions, offset, color));
        }

        Ok(field)
    }
}

// ─── Network spec (serde) ────────────────────────────────────────────────

#[derive(Deserialize)]
struct NetworkSpec {
    #[serde(default)]
    layers: Vec<LayerSpec>,
}

#[derive(Deserialize)]
struct LayerSpec {
    #[serde(default)]
    name: String,
    #[serde(default)]
    neurons: Vec<NeuronSpec>,
    #[serde(default)]
    center: Vec<Number>,
}

#[derive(Deserialize)]
struct NeuronSpec {
    x: Number,
    y: Number,
    #[serde(default)]
    z: Option<Number>,
}

/// JSON emitted by the backend mixes numbers and numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Number {
    Float(f64),
    Text(String),
}

fn parse_number(layer: &str, n: &Number) -> Result<f64, SpecError> {
    match n {
        Number::Float(v) => Ok(*v),
        Number::Text(s) => s.trim().parse().map_err(|_| SpecError::MalformedLayer {
            name: layer.to_string(),
            reason: format!("'{s}' is not a number"),
        }),
    }
}

fn parse_center(layer: &str, center: &[Number]) -> Result<DVec3, SpecError> {
    match center {
        [] => Ok(DVec3::ZERO),
        [x, y] => Ok(DVec3::new(parse_number(layer, x)?, parse_number(layer, y)?, 0.0)),
        [x, y, z, ..] => Ok(DVec3::new(
            parse_number(layer, x)?,
            parse_number(layer, y)?,
            parse_number(layer, z)?,
        )),
        [_] => Err(SpecError::MalformedLayer {
            name: layer.to_string(),
            reason: "center needs at least two components".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_starts_in_base_color() {
        let base = Color::rgb(0.2, 0.3, 0.4);
        let positions = vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 9.0];
        let layer = PointLayer::new("L1", positions, DVec3::ZERO, base);
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.colors.len(), 6);
        assert_eq!(layer.color(1), base);
    }

    #[test]
    fn set_color_touches_one_triple() {
        let mut layer = PointLayer::new("L1", vec![0.0; 9], DVec3::ZERO, Color::rgb(0.0, 0.0, 0.0));
        layer.set_color(1, Color::rgb(1.0, 0.5, 0.25));
        assert_eq!(layer.colors, vec![0.0, 0.0, 0.0, 1.0, 0.5, 0.25, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn network_spec_with_string_numbers() {
        let json = r#"{
            "layers": [
                {"name": "L23pyr", "neurons": [{"x": "0.5", "y": 1, "z": "2"}],
                 "center": ["1", 1, 0]},
                {"name": "L4", "neurons": [{"x": -1, "y": -1}], "center": [0, 0]}
            ]
        }"#;
        let field = PointField::from_network_spec(json).unwrap();
        assert_eq!(field.layers().len(), 2);

        let l23 = field.layer("L23pyr").unwrap();
        assert_eq!(l23.offset, DVec3::new(1.0, 1.0, 0.0));
        assert_eq!(l23.position(0), DVec3::new(1.5, 2.0, 2.0));
        assert_eq!(l23.base_color, LAYER_PALETTE[0]);

        let l4 = field.layer("L4").unwrap();
        assert_eq!(l4.position(0), DVec3::new(-1.0, -1.0, 0.0));
        assert_eq!(l4.base_color, LAYER_PALETTE[1]);
        assert_eq!(field.point_count(), 2);
    }

    #[test]
    fn network_spec_rejects_bad_coordinate() {
        let json = r#"{"layers": [{"name": "L5", "neurons": [{"x": "abc", "y": 0}]}]}"#;
        let err = PointField::from_network_spec(json).unwrap_err();
        assert!(matches!(err, SpecError::MalformedLayer { ref name, .. } if name == "L5"));
    }

    #[test]
    fn network_spec_rejects_invalid_json() {
        assert!(matches!(
            PointField::from_network_spec("{layers"),
            Err(SpecError::Json(_))
        ));
    }

    #[test]
    fn add_layer_replaces_same_name() {
        let mut field = PointField::new();
        field.add_layer(PointLayer::new("L1", vec![0.0; 3], DVec3::ZERO, LAYER_PALETTE[0]));
        field.add_layer(PointLayer::new("L1", vec![0.0; 6], DVec3::ZERO, LAYER_PALETTE[0]));
        assert_eq!(field.layers().len(), 1);
        assert_eq!(field.layer("L1").unwrap().len(), 2);
    }
}
