//! Layout engine core implementation.

use crate::measure::Metrics;
use crate::model::GraphModel;

use super::layering::{assign_layers, Adjacency};
use super::placement::{group_nodes_by_layer, place_nodes};
use super::types::Layout;

/// Layered left-to-right layout: sources in layer 0, consumers to the right.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    pub(crate) metrics: Metrics,
}

impl LayoutEngine {
    pub fn new(metrics: Metrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Compute layout for the given graph.
    pub fn layout(&self, model: &GraphModel) -> Layout {
        if model.is_empty() {
            return Layout::default();
        }

        // Phase 1: node-level adjacency and layers
        let adjacency = Adjacency::from_model(model);
        let layers = assign_layers(&adjacency);

        // Phase 2: grouping with type tie-break
        let groups = group_nodes_by_layer(model, &layers);

        // Phase 3: stacking
        let placement = place_nodes(model, &groups, &self.metrics);

        tracing::debug!(
            nodes = model.nodes.len(),
            adjacency = adjacency.len(),
            layers = groups.len(),
            "layout computed"
        );

        Layout {
            nodes: placement.layout_nodes,
            layers: groups,
            width: placement.max_width,
            height: placement.total_height,
        }
    }
}
