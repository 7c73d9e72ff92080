//! Node grouping and placement.

use crate::measure::Metrics;
use crate::model::GraphModel;

use super::types::LayoutNode;

/// Group node indices by layer, ordered by object type then input order.
pub fn group_nodes_by_layer(model: &GraphModel, layers: &[usize]) -> Vec<Vec<usize>> {
    let depth = layers.iter().max().map_or(0, |max| max + 1);
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); depth];

    for (index, &layer) in layers.iter().enumerate() {
        groups[layer].push(index);
    }

    // Stable sort keeps input order among equal kinds
    for group in &mut groups {
        group.sort_by_key(|&i| model.nodes[i].kind.precedence());
    }

    groups
}

/// Result of node placement.
pub struct NodePlacement {
    /// Index-aligned with the model's nodes.
    pub layout_nodes: Vec<LayoutNode>,
    pub max_width: f64,
    pub total_height: f64,
}

/// Stack each layer's nodes top to bottom in its column.
pub fn place_nodes(model: &GraphModel, groups: &[Vec<usize>], metrics: &Metrics) -> NodePlacement {
    let mut slots: Vec<Option<LayoutNode>> = vec![None; model.nodes.len()];
    let mut max_width: f64 = 0.0;
    let mut total_height: f64 = 0.0;

    for (layer, group) in groups.iter().enumerate() {
        let x = layer as f64 * metrics.layer_gap + metrics.margin;
        let mut y = metrics.margin;

        for &index in group {
            let node = &model.nodes[index];
            let height = metrics.node_height(node.columns.len());
            slots[index] = Some(LayoutNode {
                id: node.id.clone(),
                layer,
                x,
                y,
                width: metrics.node_width,
                height,
            });

            total_height = total_height.max(y + height + metrics.margin);
            y += height + metrics.node_gap_y;
        }

        if !group.is_empty() {
            max_width = max_width.max(x + metrics.node_width + metrics.margin);
        }
    }

    NodePlacement {
        layout_nodes: slots.into_iter().flatten().collect(),
        max_width,
        total_height,
    }
}
