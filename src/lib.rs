pub mod coordinator;
pub mod filter;
pub mod geometry;
pub mod layout;
pub mod lineage;
pub mod measure;
pub mod model;
pub mod render;
pub mod snapshot;
pub mod svg;
pub mod viewport;

#[cfg(target_arch = "wasm32")]
pub mod web;

use wasm_bindgen::prelude::*;

use coordinator::{Coordinator, DiagramConfig};
use snapshot::{Snapshot, SnapshotError};
use svg::SvgSurface;
use viewport::Size;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("Invalid column reference `{0}` (expected node.column)")]
    InvalidColumnRef(String),
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}

/// One-shot rendering options.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub size: Size,
    /// Column to select, as `node.column`.
    pub select: Option<String>,
    pub search: Option<String>,
    pub config: DiagramConfig,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: Size::new(1600.0, 1000.0),
            select: None,
            search: None,
            config: DiagramConfig::default(),
        }
    }
}

/// Split `node.column` at the last dot, so node ids may contain dots.
pub fn parse_column_ref(reference: &str) -> Option<(&str, &str)> {
    let (node, column) = reference.rsplit_once('.')?;
    if node.is_empty() || column.is_empty() {
        return None;
    }
    Some((node, column))
}

/// Lay out a snapshot, apply selection/search and return the SVG document.
pub fn render_svg(snapshot: &Snapshot, options: &RenderOptions) -> Result<String, RenderError> {
    let mut coordinator = Coordinator::new(SvgSurface::new(options.size), options.config.clone());
    coordinator.initialize(snapshot)?;

    if let Some(reference) = options.select.as_deref() {
        let (node, column) = parse_column_ref(reference)
            .ok_or_else(|| RenderError::InvalidColumnRef(reference.to_string()))?;
        coordinator.select_column(node, column);
        if coordinator.selection().is_none() {
            return Err(RenderError::UnknownColumn(reference.to_string()));
        }
    }
    if let Some(term) = options.search.as_deref() {
        coordinator.filter(term);
    }

    Ok(coordinator.surface().svg())
}

/// Install the panic hook and console logging in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }
}

/// Render a lineage snapshot (JSON) to SVG
#[wasm_bindgen(js_name = "lineageToSvg")]
pub fn render_lineage_svg(
    snapshot_json: &str,
    width: f64,
    height: f64,
    select: Option<String>,
    search: Option<String>,
) -> Result<String, String> {
    let snapshot = Snapshot::from_json(snapshot_json).map_err(|e| e.to_string())?;
    let options = RenderOptions {
        size: Size::new(width, height),
        select,
        search,
        ..RenderOptions::default()
    };
    render_svg(&snapshot, &options).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot_json() -> String {
        json!({
            "nodes": [
                { "id": "hr.employees", "type": "table", "columns": [{ "name": "salary" }] },
                { "id": "v_pay", "type": "view", "columns": [{ "name": "salary" }] }
            ],
            "edges": [
                { "source_node": "hr.employees", "source_column": "salary",
                  "target_node": "v_pay", "target_column": "salary" }
            ]
        })
        .to_string()
    }

    #[test]
    fn test_parse_column_ref() {
        assert_eq!(parse_column_ref("employees.salary"), Some(("employees", "salary")));
        assert_eq!(parse_column_ref("hr.employees.salary"), Some(("hr.employees", "salary")));
        assert_eq!(parse_column_ref("salary"), None);
        assert_eq!(parse_column_ref(".salary"), None);
        assert_eq!(parse_column_ref("employees."), None);
    }

    #[test]
    fn test_render_lineage_svg() {
        let svg = render_lineage_svg(
            &snapshot_json(),
            800.0,
            600.0,
            Some("hr.employees.salary".to_string()),
            None,
        )
        .unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("row current"));
        assert!(svg.contains(r#"data-edge-id="e0""#));
    }

    #[test]
    fn test_render_errors() {
        let err = render_lineage_svg("{", 800.0, 600.0, None, None).unwrap_err();
        assert!(err.starts_with("Invalid snapshot JSON"));

        let err = render_lineage_svg(&snapshot_json(), 800.0, 600.0, Some("nope".into()), None)
            .unwrap_err();
        assert!(err.contains("Invalid column reference"));

        let err = render_lineage_svg(
            &snapshot_json(),
            800.0,
            600.0,
            Some("v_pay.bonus".into()),
            None,
        )
        .unwrap_err();
        assert_eq!(err, "Unknown column: v_pay.bonus");
    }

    #[test]
    fn test_render_with_search() {
        let snapshot = Snapshot::from_json(&snapshot_json()).unwrap();
        let options = RenderOptions {
            search: Some("v_pay".to_string()),
            ..RenderOptions::default()
        };
        let svg = render_svg(&snapshot, &options).unwrap();
        assert!(svg.contains(r#"data-node-id="v_pay""#));
        assert!(!svg.contains(r#"data-node-id="hr.employees""#));
    }
}
