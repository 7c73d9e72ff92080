//! Edge attachment points and curves.

use crate::layout::Layout;
use crate::measure::Metrics;
use crate::model::{Edge, GraphModel};
use serde::{Deserialize, Serialize};

/// Horizontal control-point offset as a share of the endpoint distance.
pub const CURVE_FACTOR: f64 = 0.55;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Cubic Bézier from a source anchor to a target anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicCurve {
    pub start: Point,
    pub c1: Point,
    pub c2: Point,
    pub end: Point,
}

impl CubicCurve {
    /// S-curve that leaves `start` and enters `end` horizontally.
    pub fn between(start: Point, end: Point) -> Self {
        let offset = (end.x - start.x).abs() * CURVE_FACTOR;
        Self {
            start,
            c1: Point::new(start.x + offset, start.y),
            c2: Point::new(end.x - offset, end.y),
            end,
        }
    }

    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        Point::new(
            a * self.start.x + b * self.c1.x + c * self.c2.x + d * self.end.x,
            a * self.start.y + b * self.c1.y + c * self.c2.y + d * self.end.y,
        )
    }

    pub fn to_svg_path(&self) -> String {
        format!(
            "M{},{} C{},{} {},{} {},{}",
            round2(self.start.x),
            round2(self.start.y),
            round2(self.c1.x),
            round2(self.c1.y),
            round2(self.c2.x),
            round2(self.c2.y),
            round2(self.end.x),
            round2(self.end.y)
        )
    }
}

/// Round to two decimals for compact output.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Read-only view over a model and its current node positions.
pub struct Geometry<'a> {
    model: &'a GraphModel,
    layout: &'a Layout,
    metrics: &'a Metrics,
}

impl<'a> Geometry<'a> {
    pub fn new(model: &'a GraphModel, layout: &'a Layout, metrics: &'a Metrics) -> Self {
        Self {
            model,
            layout,
            metrics,
        }
    }

    /// Attachment point of a column row on a node's left or right edge.
    ///
    /// An unknown column falls back to the first row; an unknown node has no
    /// anchor at all.
    pub fn anchor(&self, node_id: &str, column: &str, side: Side) -> Option<Point> {
        let index = self.model.index_of(node_id)?;
        let placed = self.layout.node(index)?;
        let row = self.model.nodes[index].row_of(column).unwrap_or(0);

        let y = placed.y
            + self.metrics.header_height
            + row as f64 * self.metrics.row_height
            + self.metrics.row_height / 2.0;
        let x = match side {
            Side::Left => placed.x,
            Side::Right => placed.right(),
        };

        Some(Point::new(x, y))
    }

    /// Curve from the source column's right anchor to the target column's left anchor.
    pub fn edge_path(&self, edge: &Edge) -> Option<CubicCurve> {
        let start = self.anchor(&edge.source.node, &edge.source.column, Side::Right)?;
        let end = self.anchor(&edge.target.node, &edge.target.column, Side::Left)?;
        Some(CubicCurve::between(start, end))
    }
}

/// Current curve per edge, index-aligned with `GraphModel::edges`.
///
/// `None` marks an edge whose endpoint node does not exist; such edges are
/// not drawn.
#[derive(Debug, Clone, Default)]
pub struct EdgePaths {
    paths: Vec<Option<CubicCurve>>,
}

impl EdgePaths {
    pub fn compute(geometry: &Geometry<'_>) -> Self {
        let paths = geometry
            .model
            .edges
            .iter()
            .map(|e| geometry.edge_path(e))
            .collect();
        Self { paths }
    }

    /// Recompute every edge attached to `node_id`. Returns the touched indices.
    pub fn recompute_for_node(&mut self, geometry: &Geometry<'_>, node_id: &str) -> Vec<usize> {
        let affected: Vec<usize> = geometry.model.edges_touching(node_id).collect();
        for &index in &affected {
            self.paths[index] = geometry.edge_path(&geometry.model.edges[index]);
        }
        affected
    }

    pub fn get(&self, index: usize) -> Option<&CubicCurve> {
        self.paths.get(index).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
