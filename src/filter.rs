//! Search filtering. Presentation only: hidden nodes keep their layout.

use crate::model::GraphModel;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Visibility {
    hidden_nodes: Vec<bool>,
    hidden_edges: Vec<bool>,
}

impl Visibility {
    /// Everything visible.
    pub fn all(model: &GraphModel) -> Self {
        Self {
            hidden_nodes: vec![false; model.nodes.len()],
            hidden_edges: vec![false; model.edges.len()],
        }
    }

    /// Hide nodes whose id and column names all miss `term`
    /// (case-insensitive substring), and edges touching a hidden node.
    /// Only an empty term shows everything; whitespace is matched literally.
    pub fn from_search(model: &GraphModel, term: &str) -> Self {
        let needle = term.to_lowercase();
        if needle.is_empty() {
            return Self::all(model);
        }

        let hidden_nodes: Vec<bool> = model
            .nodes
            .iter()
            .map(|n| {
                let hit = n.id.to_lowercase().contains(&needle)
                    || n.columns
                        .iter()
                        .any(|c| c.name.to_lowercase().contains(&needle));
                !hit
            })
            .collect();

        let is_hidden = |node_id: &str| {
            model
                .index_of(node_id)
                .is_some_and(|i| hidden_nodes[i])
        };
        let hidden_edges = model
            .edges
            .iter()
            .map(|e| is_hidden(&e.source.node) || is_hidden(&e.target.node))
            .collect();

        Self {
            hidden_nodes,
            hidden_edges,
        }
    }

    pub fn node_hidden(&self, index: usize) -> bool {
        self.hidden_nodes.get(index).copied().unwrap_or(false)
    }

    pub fn edge_hidden(&self, index: usize) -> bool {
        self.hidden_edges.get(index).copied().unwrap_or(false)
    }

    pub fn hidden_node_count(&self) -> usize {
        self.hidden_nodes.iter().filter(|h| **h).count()
    }

    pub fn is_filtered(&self) -> bool {
        self.hidden_nodes.iter().any(|h| *h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;
    use serde_json::json;

    fn model() -> GraphModel {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "nodes": [
                { "id": "employees", "type": "table", "columns": [{ "name": "salary" }, { "name": "email" }] },
                { "id": "departments", "type": "table", "columns": [{ "name": "department_name" }] },
                { "id": "v_Salary_Grades", "type": "view", "columns": [{ "name": "grade" }] }
            ],
            "edges": [
                { "source_node": "employees", "source_column": "salary",
                  "target_node": "v_Salary_Grades", "target_column": "grade" },
                { "source_node": "departments", "source_column": "department_name",
                  "target_node": "v_Salary_Grades", "target_column": "grade" },
                { "source_node": "ghost", "source_column": "x",
                  "target_node": "employees", "target_column": "email" }
            ]
        }))
        .unwrap();
        GraphModel::from_snapshot(&snapshot).unwrap()
    }

    #[test]
    fn test_match_by_id_or_column() {
        let m = model();
        let v = Visibility::from_search(&m, "SALARY");
        // employees has a salary column, the view matches by id
        assert!(!v.node_hidden(0));
        assert!(v.node_hidden(1));
        assert!(!v.node_hidden(2));
        assert_eq!(v.hidden_node_count(), 1);
    }

    #[test]
    fn test_edges_follow_nodes() {
        let m = model();
        let v = Visibility::from_search(&m, "salary");
        assert!(!v.edge_hidden(0));
        assert!(v.edge_hidden(1));
        // unknown endpoint does not hide the edge by itself
        assert!(!v.edge_hidden(2));
    }

    #[test]
    fn test_empty_term_clears() {
        let m = model();
        assert!(Visibility::from_search(&m, "dept").is_filtered());
        let v = Visibility::from_search(&m, "");
        assert!(!v.is_filtered());
        assert_eq!(v, Visibility::all(&m));
    }

    #[test]
    fn test_whitespace_term_is_a_substring() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "nodes": [
                { "id": "customers", "type": "table", "columns": [{ "name": "first name" }] },
                { "id": "orders", "type": "table", "columns": [{ "name": "order_id" }] }
            ],
            "edges": []
        }))
        .unwrap();
        let m = GraphModel::from_snapshot(&snapshot).unwrap();

        let v = Visibility::from_search(&m, " ");
        assert!(!v.node_hidden(0));
        assert!(v.node_hidden(1));
        assert_eq!(v.hidden_node_count(), 1);

        // leading space is part of the needle
        let v = Visibility::from_search(&m, " name");
        assert_eq!(v.hidden_node_count(), 1);
        assert_eq!(Visibility::from_search(&m, " order").hidden_node_count(), 2);
    }

    #[test]
    fn test_no_match_hides_everything() {
        let m = model();
        let v = Visibility::from_search(&m, "zzz");
        assert_eq!(v.hidden_node_count(), 3);
        assert!(v.edge_hidden(0) && v.edge_hidden(1) && v.edge_hidden(2));
    }
}
