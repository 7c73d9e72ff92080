//! Graph snapshot exchange types.
//!
//! A snapshot is what a metadata reader or lineage parser hands to the
//! engine. It is deserialized as-is and checked for the identity fields the
//! engine relies on; reference integrity between edges and nodes is *not*
//! checked here (dangling edges degrade gracefully later on).

use crate::model::{EdgeKind, ObjectKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing required field `{field}` on {entity}")]
    MissingField { entity: String, field: &'static str },
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),
    #[error("Duplicate column {column} on node {node}")]
    DuplicateColumn { node: String, column: String },
    #[error("Duplicate edge id: {0}")]
    DuplicateEdge(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<EdgeSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    /// Display name; the id is shown when absent.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(default = "default_data_type")]
    pub data_type: String,
    #[serde(default)]
    pub is_pk: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    /// Generated when the producer did not assign one, see [`Snapshot::edge_ids`].
    #[serde(default)]
    pub id: Option<String>,
    pub source_node: String,
    pub source_column: String,
    pub target_node: String,
    pub target_column: String,
    #[serde(default)]
    pub edge_type: EdgeKind,
}

fn default_data_type() -> String {
    "ANY".to_string()
}

impl Snapshot {
    /// Parse and validate a snapshot from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(text)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Check identity fields: non-empty and unique where the model keys on them.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut node_ids = HashSet::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if node.id.trim().is_empty() {
                return Err(SnapshotError::MissingField {
                    entity: format!("node #{}", i),
                    field: "id",
                });
            }
            if !node_ids.insert(node.id.as_str()) {
                return Err(SnapshotError::DuplicateNode(node.id.clone()));
            }

            let mut names = HashSet::new();
            for column in &node.columns {
                if column.name.trim().is_empty() {
                    return Err(SnapshotError::MissingField {
                        entity: format!("column of node {}", node.id),
                        field: "name",
                    });
                }
                if !names.insert(column.name.as_str()) {
                    return Err(SnapshotError::DuplicateColumn {
                        node: node.id.clone(),
                        column: column.name.clone(),
                    });
                }
            }
        }

        let mut edge_ids = HashSet::new();
        for (i, edge) in self.edges.iter().enumerate() {
            let entity = || format!("edge #{}", i);
            let required = [
                ("source_node", &edge.source_node),
                ("source_column", &edge.source_column),
                ("target_node", &edge.target_node),
                ("target_column", &edge.target_column),
            ];
            for (field, value) in required {
                if value.trim().is_empty() {
                    return Err(SnapshotError::MissingField {
                        entity: entity(),
                        field,
                    });
                }
            }

            if let Some(id) = edge.id.as_deref() {
                if id.trim().is_empty() {
                    return Err(SnapshotError::MissingField {
                        entity: entity(),
                        field: "id",
                    });
                }
                if !edge_ids.insert(id) {
                    return Err(SnapshotError::DuplicateEdge(id.to_string()));
                }
            }
        }

        Ok(())
    }

    /// Edge ids in edge order. Explicit ids are kept; an edge without one gets
    /// `e{index}`, or the next `e{n}` that no other edge already uses.
    pub fn edge_ids(&self) -> Vec<String> {
        let mut taken: HashSet<String> = self
            .edges
            .iter()
            .filter_map(|e| e.id.clone())
            .collect();

        self.edges
            .iter()
            .enumerate()
            .map(|(i, edge)| match &edge.id {
                Some(id) => id.clone(),
                None => {
                    let mut n = i;
                    while taken.contains(&format!("e{}", n)) {
                        n += 1;
                    }
                    let id = format!("e{}", n);
                    taken.insert(id.clone());
                    id
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_minimal() {
        let text = json!({
            "nodes": [
                { "id": "employees", "label": "employees", "type": "table",
                  "columns": [{ "name": "salary", "data_type": "REAL", "is_pk": false }] }
            ],
            "edges": []
        })
        .to_string();
        let snapshot = Snapshot::from_json(&text).unwrap();
        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(snapshot.nodes[0].kind, ObjectKind::Table);
        assert_eq!(snapshot.nodes[0].columns[0].data_type, "REAL");
    }

    #[test]
    fn test_defaults() {
        let text = json!({
            "nodes": [{ "id": "v", "type": "view", "columns": [{ "name": "a" }] }],
            "edges": [{ "source_node": "t", "source_column": "a",
                        "target_node": "v", "target_column": "a" }]
        })
        .to_string();
        let snapshot = Snapshot::from_json(&text).unwrap();
        assert_eq!(snapshot.nodes[0].label, None);
        assert_eq!(snapshot.nodes[0].columns[0].data_type, "ANY");
        assert!(!snapshot.nodes[0].columns[0].is_pk);
        assert_eq!(snapshot.edges[0].edge_type, EdgeKind::Direct);
        assert_eq!(snapshot.edges[0].id, None);
        assert_eq!(snapshot.edge_ids(), vec!["e0"]);
    }

    #[test]
    fn test_missing_columns_is_malformed() {
        let text = r#"{ "nodes": [{ "id": "t", "type": "table" }], "edges": [] }"#;
        let err = Snapshot::from_json(text).unwrap_err();
        assert!(matches!(err, SnapshotError::Json(_)));
    }

    #[test]
    fn test_unknown_object_type_is_malformed() {
        let text = r#"{ "nodes": [{ "id": "t", "type": "synonym", "columns": [] }], "edges": [] }"#;
        assert!(Snapshot::from_json(text).is_err());
    }

    #[test]
    fn test_empty_node_id() {
        let text = r#"{ "nodes": [{ "id": " ", "type": "table", "columns": [] }], "edges": [] }"#;
        let err = Snapshot::from_json(text).unwrap_err();
        assert!(matches!(err, SnapshotError::MissingField { field: "id", .. }));
    }

    #[test]
    fn test_empty_edge_endpoint() {
        let text = json!({
            "nodes": [],
            "edges": [{ "source_node": "t", "source_column": "",
                        "target_node": "v", "target_column": "a" }]
        })
        .to_string();
        let err = Snapshot::from_json(&text).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::MissingField { field: "source_column", .. }
        ));
    }

    #[test]
    fn test_duplicates() {
        let nodes = json!({
            "nodes": [
                { "id": "t", "type": "table", "columns": [] },
                { "id": "t", "type": "view", "columns": [] }
            ],
            "edges": []
        })
        .to_string();
        assert!(matches!(
            Snapshot::from_json(&nodes).unwrap_err(),
            SnapshotError::DuplicateNode(id) if id == "t"
        ));

        let columns = json!({
            "nodes": [{ "id": "t", "type": "table",
                        "columns": [{ "name": "a" }, { "name": "a" }] }],
            "edges": []
        })
        .to_string();
        assert!(matches!(
            Snapshot::from_json(&columns).unwrap_err(),
            SnapshotError::DuplicateColumn { .. }
        ));

        let edges = json!({
            "nodes": [],
            "edges": [
                { "id": "x", "source_node": "a", "source_column": "c",
                  "target_node": "b", "target_column": "c" },
                { "id": "x", "source_node": "a", "source_column": "c",
                  "target_node": "b", "target_column": "d" }
            ]
        })
        .to_string();
        assert!(matches!(
            Snapshot::from_json(&edges).unwrap_err(),
            SnapshotError::DuplicateEdge(_)
        ));
    }

    #[test]
    fn test_empty_snapshot_is_valid() {
        let snapshot = Snapshot::from_json(r#"{ "nodes": [], "edges": [] }"#).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_generated_edge_ids_skip_explicit_ones() {
        let text = json!({
            "nodes": [],
            "edges": [
                { "id": "e1", "source_node": "a", "source_column": "c",
                  "target_node": "b", "target_column": "c" },
                { "source_node": "a", "source_column": "c",
                  "target_node": "b", "target_column": "d" },
                { "source_node": "a", "source_column": "d",
                  "target_node": "b", "target_column": "d" },
                { "id": "e2", "source_node": "b", "source_column": "d",
                  "target_node": "c", "target_column": "d" }
            ]
        })
        .to_string();
        let snapshot = Snapshot::from_json(&text).unwrap();
        assert_eq!(snapshot.edge_ids(), vec!["e1", "e3", "e4", "e2"]);
    }
}
