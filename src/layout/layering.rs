//! Layer assignment: longest path from a source over node-level adjacency.

use crate::model::GraphModel;
use std::collections::{BTreeSet, VecDeque};

/// Deduplicated node-to-node adjacency derived from column edges.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    successors: Vec<BTreeSet<usize>>,
}

impl Adjacency {
    /// Collapse column edges into at most one entry per ordered node pair.
    /// Edges naming an unknown node are ignored.
    pub fn from_model(model: &GraphModel) -> Self {
        let mut successors = vec![BTreeSet::new(); model.nodes.len()];

        for edge in &model.edges {
            let from = model.index_of(&edge.source.node);
            let to = model.index_of(&edge.target.node);
            if let (Some(from), Some(to)) = (from, to) {
                successors[from].insert(to);
            }
        }

        Self { successors }
    }

    pub fn successors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.successors[node].iter().copied()
    }

    /// Number of (from, to) entries, self-loops included.
    pub fn len(&self) -> usize {
        self.successors.iter().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// In-degree per node, not counting self-loops.
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut in_degree = vec![0; self.successors.len()];
        for (from, succ) in self.successors.iter().enumerate() {
            for &to in succ {
                if to != from {
                    in_degree[to] += 1;
                }
            }
        }
        in_degree
    }
}

/// Assign a layer to every node with Kahn's algorithm.
///
/// A node's layer is the maximum over its processed predecessors of
/// `predecessor + 1`. Nodes no predecessor ever reaches (isolated, or stuck
/// behind a cycle) stay at layer 0.
pub fn assign_layers(adjacency: &Adjacency) -> Vec<usize> {
    let count = adjacency.successors.len();
    let mut remaining = adjacency.in_degrees();
    let mut layers: Vec<Option<usize>> = vec![None; count];
    let mut queue: VecDeque<usize> = VecDeque::new();

    for node in 0..count {
        if remaining[node] == 0 {
            layers[node] = Some(0);
            queue.push_back(node);
        }
    }

    while let Some(node) = queue.pop_front() {
        let layer = layers[node].unwrap_or(0);
        for next in adjacency.successors(node) {
            // Self-loop: never pushes a node past itself
            if next == node {
                continue;
            }
            let candidate = layer + 1;
            layers[next] = Some(layers[next].map_or(candidate, |l| l.max(candidate)));

            remaining[next] -= 1;
            if remaining[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    layers.into_iter().map(|l| l.unwrap_or(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;
    use serde_json::json;

    fn model(nodes: &[&str], edges: &[(&str, &str)]) -> GraphModel {
        let nodes: Vec<_> = nodes
            .iter()
            .map(|id| json!({ "id": id, "type": "table", "columns": [{ "name": "c" }] }))
            .collect();
        let edges: Vec<_> = edges
            .iter()
            .map(|(from, to)| {
                json!({ "source_node": from, "source_column": "c",
                        "target_node": to, "target_column": "c" })
            })
            .collect();
        let snapshot: Snapshot =
            serde_json::from_value(json!({ "nodes": nodes, "edges": edges })).unwrap();
        GraphModel::from_snapshot(&snapshot).unwrap()
    }

    fn layers(nodes: &[&str], edges: &[(&str, &str)]) -> Vec<usize> {
        assign_layers(&Adjacency::from_model(&model(nodes, edges)))
    }

    #[test]
    fn test_chain() {
        assert_eq!(layers(&["a", "b", "c"], &[("a", "b"), ("b", "c")]), vec![0, 1, 2]);
    }

    #[test]
    fn test_longest_path_wins() {
        // a -> b -> c and a -> c: c sits after b, not next to a
        assert_eq!(
            layers(&["a", "b", "c"], &[("a", "c"), ("a", "b"), ("b", "c")]),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_parallel_edges_deduplicated() {
        let m = model(&["a", "b"], &[("a", "b"), ("a", "b"), ("a", "b")]);
        let adjacency = Adjacency::from_model(&m);
        assert_eq!(m.edges.len(), 3);
        assert_eq!(adjacency.len(), 1);
        assert_eq!(adjacency.in_degrees(), vec![0, 1]);
        assert_eq!(assign_layers(&adjacency), vec![0, 1]);
    }

    #[test]
    fn test_unknown_nodes_ignored() {
        let m = model(&["a", "b"], &[("a", "ghost"), ("ghost", "b")]);
        let adjacency = Adjacency::from_model(&m);
        assert!(adjacency.is_empty());
        assert_eq!(assign_layers(&adjacency), vec![0, 0]);
    }

    #[test]
    fn test_self_loop_stays_put() {
        assert_eq!(layers(&["a", "b"], &[("a", "a"), ("a", "b")]), vec![0, 1]);
        assert_eq!(layers(&["a"], &[("a", "a")]), vec![0]);
    }

    #[test]
    fn test_cycle_does_not_block() {
        // root -> x, x <-> y: y is never freed, x gets relaxed from root
        let result = layers(&["root", "x", "y", "z"], &[("root", "x"), ("x", "y"), ("y", "x")]);
        assert_eq!(result[0], 0);
        assert_eq!(result[1], 1);
        assert_eq!(result[2], 0);
        assert_eq!(result[3], 0);
    }

    #[test]
    fn test_pure_cycle_defaults_to_zero() {
        assert_eq!(layers(&["a", "b"], &[("a", "b"), ("b", "a")]), vec![0, 0]);
    }

    #[test]
    fn test_monotone_on_dag() {
        let edges = [
            ("regions", "countries"),
            ("countries", "locations"),
            ("locations", "departments"),
            ("departments", "v_dept"),
            ("regions", "v_dept"),
            ("v_dept", "sp_report"),
            ("countries", "sp_report"),
        ];
        let names = ["sp_report", "v_dept", "regions", "countries", "locations", "departments"];
        let m = model(&names, &edges);
        let result = assign_layers(&Adjacency::from_model(&m));
        for (from, to) in edges {
            let f = m.index_of(from).unwrap();
            let t = m.index_of(to).unwrap();
            assert!(result[t] >= result[f] + 1, "{} -> {}", from, to);
        }
    }

    #[test]
    fn test_empty() {
        assert!(layers(&[], &[]).is_empty());
    }
}
