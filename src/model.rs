use crate::snapshot::{Snapshot, SnapshotError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Kind of database object a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Table,
    View,
    Procedure,
}

impl ObjectKind {
    /// Tie-break order inside a layer: tables first, procedures last.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Table => 0,
            Self::View => 1,
            Self::Procedure => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::View => "view",
            Self::Procedure => "procedure",
        }
    }

    /// Header fill used by renderers.
    pub fn color(self) -> &'static str {
        match self {
            Self::Table => "#1D4ED8",
            Self::View => "#15803D",
            Self::Procedure => "#C2410C",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transformation applied along a column-level edge.
///
/// Presentation only: never consulted by layout or traversal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Direct,
    Computed,
    Aggregate,
    Concat,
    Case,
}

/// Stroke style for an edge kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeStyle {
    pub color: &'static str,
    /// SVG dash array; `None` draws a solid stroke.
    pub dash: Option<&'static str>,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 5] = [
        Self::Direct,
        Self::Computed,
        Self::Aggregate,
        Self::Concat,
        Self::Case,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Computed => "computed",
            Self::Aggregate => "aggregate",
            Self::Concat => "concat",
            Self::Case => "case",
        }
    }

    pub fn style(self) -> EdgeStyle {
        match self {
            Self::Direct => EdgeStyle { color: "#64748B", dash: None },
            Self::Computed => EdgeStyle { color: "#7C3AED", dash: Some("6 3") },
            Self::Aggregate => EdgeStyle { color: "#DC2626", dash: Some("2 3") },
            Self::Concat => EdgeStyle { color: "#0891B2", dash: Some("8 3 2 3") },
            Self::Case => EdgeStyle { color: "#D97706", dash: Some("4 4") },
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of one column row: owning node id plus column name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColumnKey {
    pub node: String,
    pub column: String,
}

impl ColumnKey {
    pub fn new(node: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.node, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub is_pk: bool,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub kind: ObjectKind,
    pub columns: Vec<Column>,
    rows: HashMap<String, usize>,
}

impl Node {
    /// Row index of a column, if this node has it.
    pub fn row_of(&self, column: &str) -> Option<usize> {
        self.rows.get(column).copied()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.row_of(name).map(|row| &self.columns[row])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: ColumnKey,
    pub target: ColumnKey,
    pub kind: EdgeKind,
}

/// Immutable graph of one loaded diagram.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    node_index: HashMap<String, usize>,
}

impl GraphModel {
    /// Validate a snapshot and build the model from it.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, SnapshotError> {
        snapshot.validate()?;

        let nodes: Vec<Node> = snapshot
            .nodes
            .iter()
            .map(|n| {
                let columns: Vec<Column> = n
                    .columns
                    .iter()
                    .map(|c| Column {
                        name: c.name.clone(),
                        data_type: c.data_type.clone(),
                        is_pk: c.is_pk,
                    })
                    .collect();
                let rows = columns
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (c.name.clone(), i))
                    .collect();

                Node {
                    id: n.id.clone(),
                    label: n.label.clone().unwrap_or_else(|| n.id.clone()),
                    kind: n.kind,
                    columns,
                    rows,
                }
            })
            .collect();

        let edges: Vec<Edge> = snapshot
            .edges
            .iter()
            .zip(snapshot.edge_ids())
            .map(|(e, id)| Edge {
                id,
                source: ColumnKey::new(&e.source_node, &e.source_column),
                target: ColumnKey::new(&e.target_node, &e.target_column),
                kind: e.edge_type,
            })
            .collect();

        let node_index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        Ok(Self {
            nodes,
            edges,
            node_index,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, node_id: &str) -> Option<usize> {
        self.node_index.get(node_id).copied()
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.index_of(node_id).map(|i| &self.nodes[i])
    }

    pub fn column(&self, key: &ColumnKey) -> Option<&Column> {
        self.node(&key.node).and_then(|n| n.column(&key.column))
    }

    /// Indices of edges with either endpoint on the given node.
    pub fn edges_touching<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.edges
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.source.node == node_id || e.target.node == node_id)
            .map(|(i, _)| i)
    }

    /// Edge count per transformation kind, for legend grouping.
    pub fn edge_kind_counts(&self) -> BTreeMap<EdgeKind, usize> {
        let mut counts = BTreeMap::new();
        for edge in &self.edges {
            *counts.entry(edge.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Number of edge endpoints naming a node or column that does not exist.
    pub fn dangling_endpoints(&self) -> usize {
        self.edges
            .iter()
            .flat_map(|e| [&e.source, &e.target])
            .filter(|key| self.column(key).is_none())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model(value: serde_json::Value) -> GraphModel {
        let snapshot: Snapshot = serde_json::from_value(value).unwrap();
        GraphModel::from_snapshot(&snapshot).unwrap()
    }

    #[test]
    fn test_model_lookup() {
        let m = model(json!({
            "nodes": [
                { "id": "employees", "type": "table",
                  "columns": [{ "name": "employee_id", "is_pk": true }, { "name": "salary" }] },
                { "id": "v_emp", "label": "Employee Details", "type": "view",
                  "columns": [{ "name": "salary" }] }
            ],
            "edges": [
                { "source_node": "employees", "source_column": "salary",
                  "target_node": "v_emp", "target_column": "salary" }
            ]
        }));

        assert_eq!(m.index_of("v_emp"), Some(1));
        assert_eq!(m.node("employees").unwrap().label, "employees");
        assert_eq!(m.node("v_emp").unwrap().label, "Employee Details");
        assert_eq!(m.node("employees").unwrap().row_of("salary"), Some(1));
        assert!(m.column(&ColumnKey::new("employees", "employee_id")).unwrap().is_pk);
        assert_eq!(m.edges[0].id, "e0");
        assert_eq!(m.edges_touching("v_emp").collect::<Vec<_>>(), vec![0]);
        assert_eq!(m.dangling_endpoints(), 0);
    }

    #[test]
    fn test_dangling_endpoints() {
        let m = model(json!({
            "nodes": [{ "id": "t", "type": "table", "columns": [{ "name": "a" }] }],
            "edges": [
                { "source_node": "t", "source_column": "renamed",
                  "target_node": "gone", "target_column": "a" }
            ]
        }));
        assert_eq!(m.dangling_endpoints(), 2);
    }

    #[test]
    fn test_mixed_explicit_and_generated_edge_ids() {
        let m = model(json!({
            "nodes": [],
            "edges": [
                { "id": "e1", "source_node": "a", "source_column": "x",
                  "target_node": "b", "target_column": "x" },
                { "source_node": "a", "source_column": "y",
                  "target_node": "b", "target_column": "y" }
            ]
        }));
        let ids: Vec<&str> = m.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
    }

    #[test]
    fn test_edge_kind_counts() {
        let m = model(json!({
            "nodes": [],
            "edges": [
                { "source_node": "a", "source_column": "x", "target_node": "b",
                  "target_column": "y", "edge_type": "case" },
                { "source_node": "a", "source_column": "x", "target_node": "b",
                  "target_column": "z", "edge_type": "case" },
                { "source_node": "a", "source_column": "w", "target_node": "b",
                  "target_column": "w" }
            ]
        }));
        let counts = m.edge_kind_counts();
        assert_eq!(counts.get(&EdgeKind::Case), Some(&2));
        assert_eq!(counts.get(&EdgeKind::Direct), Some(&1));
        assert_eq!(counts.get(&EdgeKind::Aggregate), None);
    }

    #[test]
    fn test_column_key_display() {
        assert_eq!(ColumnKey::new("employees", "salary").to_string(), "employees::salary");
    }

    #[test]
    fn test_type_precedence() {
        assert!(ObjectKind::Table.precedence() < ObjectKind::View.precedence());
        assert!(ObjectKind::View.precedence() < ObjectKind::Procedure.precedence());
    }

    #[test]
    fn test_edge_styles_distinct() {
        let colors: std::collections::HashSet<_> =
            EdgeKind::ALL.iter().map(|k| k.style().color).collect();
        assert_eq!(colors.len(), EdgeKind::ALL.len());
        assert_eq!(EdgeKind::Direct.style().dash, None);
    }
}
