//! Render-ready frame and the surface it is drawn on.

use crate::filter::Visibility;
use crate::geometry::EdgePaths;
use crate::layout::Layout;
use crate::lineage::{Relation, SelectionResult};
use crate::measure::Metrics;
use crate::model::{ColumnKey, GraphModel};
use crate::viewport::{Size, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Default,
    /// The selected column.
    Current,
    Highlighted,
    Dimmed,
}

impl RowState {
    pub fn as_class(self) -> &'static str {
        match self {
            Self::Default => "row",
            Self::Current => "row current",
            Self::Highlighted => "row highlighted",
            Self::Dimmed => "row dimmed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeState {
    Default,
    Emphasized,
    Dimmed,
}

impl EdgeState {
    pub fn opacity(self) -> f64 {
        match self {
            Self::Default => 0.75,
            Self::Emphasized => 1.0,
            Self::Dimmed => 0.06,
        }
    }

    pub fn stroke_width(self) -> f64 {
        match self {
            Self::Default | Self::Dimmed => 1.5,
            Self::Emphasized => 2.5,
        }
    }
}

/// Highlight/dim state of every row and edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualState {
    rows: Vec<Vec<RowState>>,
    edges: Vec<EdgeState>,
}

impl VisualState {
    /// Nothing selected: every row and edge in its default state.
    pub fn idle(model: &GraphModel) -> Self {
        Self {
            rows: model
                .nodes
                .iter()
                .map(|n| vec![RowState::Default; n.columns.len()])
                .collect(),
            edges: vec![EdgeState::Default; model.edges.len()],
        }
    }

    pub fn from_selection(model: &GraphModel, selection: Option<&SelectionResult>) -> Self {
        let Some(selection) = selection else {
            return Self::idle(model);
        };

        let rows = model
            .nodes
            .iter()
            .map(|n| {
                n.columns
                    .iter()
                    .map(|c| {
                        let key = ColumnKey::new(&n.id, &c.name);
                        match selection.relation(&key) {
                            Some(Relation::Origin) => RowState::Current,
                            Some(_) => RowState::Highlighted,
                            None => RowState::Dimmed,
                        }
                    })
                    .collect()
            })
            .collect();

        let edges = (0..model.edges.len())
            .map(|i| {
                if selection.contains_edge(i) {
                    EdgeState::Emphasized
                } else {
                    EdgeState::Dimmed
                }
            })
            .collect();

        Self { rows, edges }
    }

    pub fn row(&self, node: usize, row: usize) -> RowState {
        self.rows
            .get(node)
            .and_then(|r| r.get(row))
            .copied()
            .unwrap_or(RowState::Default)
    }

    pub fn edge(&self, index: usize) -> EdgeState {
        self.edges.get(index).copied().unwrap_or(EdgeState::Default)
    }

    pub fn is_idle(&self) -> bool {
        self.rows.iter().flatten().all(|r| *r == RowState::Default)
            && self.edges.iter().all(|e| *e == EdgeState::Default)
    }
}

/// Everything a surface needs to draw the current diagram.
pub struct Frame<'a> {
    pub model: &'a GraphModel,
    pub layout: &'a Layout,
    pub paths: &'a EdgePaths,
    pub visuals: &'a VisualState,
    pub visibility: &'a Visibility,
    pub metrics: &'a Metrics,
    pub transform: Transform,
}

/// The external drawing collaborator.
///
/// Only the coordinator talks to a surface. Partial updates default to a
/// full redraw, which is always correct.
pub trait RenderSurface {
    /// Size of the area the diagram is shown in, in screen pixels.
    fn viewport_size(&self) -> Size;

    /// Draw the whole frame, replacing whatever was there.
    fn draw(&mut self, frame: &Frame<'_>);

    /// Row/edge visual states or visibility changed; geometry did not.
    fn restyle(&mut self, frame: &Frame<'_>) {
        self.draw(frame);
    }

    /// A node moved; `edges` lists the edges whose paths were recomputed.
    fn update_edges(&mut self, frame: &Frame<'_>, moved_node: usize, edges: &[usize]) {
        let _ = (moved_node, edges);
        self.draw(frame);
    }

    fn set_transform(&mut self, transform: Transform);

    /// Remove everything (diagram discarded).
    fn clear(&mut self);
}
