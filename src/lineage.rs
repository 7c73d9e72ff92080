//! Column lineage tracing.
//!
//! Given a selected column, walks column-level edges breadth-first in both
//! directions to find everything that feeds it (upstream) and everything it
//! feeds (downstream). The result drives highlight/dim rendering and the
//! info panel.

use crate::model::{ColumnKey, EdgeKind, GraphModel, ObjectKind};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Upper bound on BFS hops per direction.
pub const MAX_HOPS: usize = 64;

/// Where a connected column sits relative to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Origin,
    Upstream,
    Downstream,
    /// Reached in both directions (only possible through a cycle).
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Upstream,
    Downstream,
}

/// Hop distance from the selection in each direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reach {
    pub upstream: Option<usize>,
    pub downstream: Option<usize>,
}

impl Reach {
    fn relation(&self) -> Relation {
        match (self.upstream, self.downstream) {
            (Some(_), Some(_)) => Relation::Both,
            (Some(_), None) => Relation::Upstream,
            _ => Relation::Downstream,
        }
    }
}

/// A one-hop neighbour of the selected column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Neighbor {
    pub node_id: String,
    pub col_name: String,
    /// Owning object type; `None` when the edge names an unknown node.
    pub object_type: Option<ObjectKind>,
    pub edge_type: EdgeKind,
    pub edge_id: String,
}

/// Everything connected to one selected column.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    pub origin: ColumnKey,
    /// Indices into `GraphModel::edges`.
    pub edges: BTreeSet<usize>,
    /// Connected columns other than the origin.
    pub columns: BTreeMap<ColumnKey, Reach>,
    pub sources: Vec<Neighbor>,
    pub targets: Vec<Neighbor>,
}

impl SelectionResult {
    pub fn relation(&self, key: &ColumnKey) -> Option<Relation> {
        if *key == self.origin {
            return Some(Relation::Origin);
        }
        self.columns.get(key).map(Reach::relation)
    }

    pub fn reach(&self, key: &ColumnKey) -> Option<Reach> {
        self.columns.get(key).copied()
    }

    pub fn contains_edge(&self, index: usize) -> bool {
        self.edges.contains(&index)
    }

    /// Connected columns including the origin.
    pub fn connected_columns(&self) -> impl Iterator<Item = &ColumnKey> {
        std::iter::once(&self.origin).chain(self.columns.keys())
    }

    pub fn connected_column_count(&self) -> usize {
        self.columns.len() + 1
    }

    pub fn upstream(&self) -> impl Iterator<Item = (&ColumnKey, usize)> {
        self.columns
            .iter()
            .filter_map(|(k, r)| r.upstream.map(|hops| (k, hops)))
    }

    pub fn downstream(&self) -> impl Iterator<Item = (&ColumnKey, usize)> {
        self.columns
            .iter()
            .filter_map(|(k, r)| r.downstream.map(|hops| (k, hops)))
    }

    pub fn edge_ids<'a>(&'a self, model: &'a GraphModel) -> impl Iterator<Item = &'a str> {
        self.edges.iter().map(|&i| model.edges[i].id.as_str())
    }

    /// Payload for the info panel.
    pub fn summary(&self, model: &GraphModel) -> SelectionSummary {
        let node = model.node(&self.origin.node);
        SelectionSummary {
            node_id: self.origin.node.clone(),
            col_name: self.origin.column.clone(),
            data_type: model.column(&self.origin).map(|c| c.data_type.clone()),
            object_type: node.map(|n| n.kind),
            sources: self.sources.clone(),
            targets: self.targets.clone(),
            total_connected: self.columns.len(),
            connected_edges: self.edges.len(),
        }
    }
}

/// Serializable summary of a selection, as shown by an info bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSummary {
    pub node_id: String,
    pub col_name: String,
    pub data_type: Option<String>,
    pub object_type: Option<ObjectKind>,
    pub sources: Vec<Neighbor>,
    pub targets: Vec<Neighbor>,
    /// Connected columns, not counting the selection itself.
    pub total_connected: usize,
    pub connected_edges: usize,
}

/// Column-level edge index for one loaded graph.
#[derive(Debug, Clone, Default)]
pub struct LineageIndex {
    by_source: HashMap<ColumnKey, Vec<usize>>,
    by_target: HashMap<ColumnKey, Vec<usize>>,
}

impl LineageIndex {
    pub fn new(model: &GraphModel) -> Self {
        let mut by_source: HashMap<ColumnKey, Vec<usize>> = HashMap::new();
        let mut by_target: HashMap<ColumnKey, Vec<usize>> = HashMap::new();

        for (index, edge) in model.edges.iter().enumerate() {
            by_source.entry(edge.source.clone()).or_default().push(index);
            by_target.entry(edge.target.clone()).or_default().push(index);
        }

        Self {
            by_source,
            by_target,
        }
    }

    /// Trace the full lineage of one column.
    pub fn trace(&self, model: &GraphModel, origin: ColumnKey) -> SelectionResult {
        let (upstream, up_edges) = self.walk(model, &origin, Direction::Upstream);
        let (downstream, down_edges) = self.walk(model, &origin, Direction::Downstream);

        let mut columns: BTreeMap<ColumnKey, Reach> = BTreeMap::new();
        for (key, hops) in upstream {
            columns.entry(key).or_default().upstream = Some(hops);
        }
        for (key, hops) in downstream {
            columns.entry(key).or_default().downstream = Some(hops);
        }

        let edges: BTreeSet<usize> = up_edges.union(&down_edges).copied().collect();
        let sources = self.neighbors(model, &origin, Direction::Upstream);
        let targets = self.neighbors(model, &origin, Direction::Downstream);

        tracing::debug!(
            origin = %origin,
            columns = columns.len(),
            edges = edges.len(),
            "lineage traced"
        );

        SelectionResult {
            origin,
            edges,
            columns,
            sources,
            targets,
        }
    }

    fn step(&self, key: &ColumnKey, direction: Direction) -> &[usize] {
        let index = match direction {
            Direction::Upstream => &self.by_target,
            Direction::Downstream => &self.by_source,
        };
        index.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn far_end<'m>(model: &'m GraphModel, edge: usize, direction: Direction) -> &'m ColumnKey {
        let edge = &model.edges[edge];
        match direction {
            Direction::Upstream => &edge.source,
            Direction::Downstream => &edge.target,
        }
    }

    /// Level-by-level BFS; returns reached columns with hop distance and the
    /// edges crossed.
    fn walk(
        &self,
        model: &GraphModel,
        origin: &ColumnKey,
        direction: Direction,
    ) -> (BTreeMap<ColumnKey, usize>, BTreeSet<usize>) {
        let mut visited: HashSet<&ColumnKey> = HashSet::new();
        let mut reached: BTreeMap<ColumnKey, usize> = BTreeMap::new();
        let mut edges: BTreeSet<usize> = BTreeSet::new();
        let mut frontier: Vec<&ColumnKey> = vec![origin];
        visited.insert(origin);

        for hop in 1..=MAX_HOPS {
            if frontier.is_empty() {
                break;
            }

            let mut next = Vec::new();
            for key in frontier {
                for &edge in self.step(key, direction) {
                    edges.insert(edge);
                    let other = Self::far_end(model, edge, direction);
                    if visited.insert(other) {
                        reached.insert(other.clone(), hop);
                        next.push(other);
                    }
                }
            }
            frontier = next;
        }

        if !frontier.is_empty() {
            tracing::warn!(origin = %origin, "lineage walk stopped at {} hops", MAX_HOPS);
        }

        (reached, edges)
    }

    /// Direct neighbours, one entry per (column, edge type).
    fn neighbors(&self, model: &GraphModel, origin: &ColumnKey, direction: Direction) -> Vec<Neighbor> {
        let mut seen: HashSet<(&ColumnKey, EdgeKind)> = HashSet::new();
        let mut out = Vec::new();

        for &index in self.step(origin, direction) {
            let edge = &model.edges[index];
            let other = Self::far_end(model, index, direction);
            if !seen.insert((other, edge.kind)) {
                continue;
            }
            out.push(Neighbor {
                node_id: other.node.clone(),
                col_name: other.column.clone(),
                object_type: model.node(&other.node).map(|n| n.kind),
                edge_type: edge.kind,
                edge_id: edge.id.clone(),
            });
        }

        out
    }
}
