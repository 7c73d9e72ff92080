//! Render coordinator.
//!
//! Owns everything derived from one loaded snapshot (model, positions, edge
//! paths, lineage index, selection, visibility) and is the only component
//! that talks to the render surface. All interaction goes through
//! [`Coordinator::dispatch`] or the equivalent direct methods and is applied
//! synchronously in arrival order.

use crate::filter::Visibility;
use crate::geometry::{EdgePaths, Geometry, Point};
use crate::layout::{Layout, LayoutEngine};
use crate::lineage::{LineageIndex, SelectionResult, SelectionSummary};
use crate::measure::Metrics;
use crate::model::{ColumnKey, GraphModel};
use crate::render::{Frame, RenderSurface, VisualState};
use crate::snapshot::{Snapshot, SnapshotError};
use crate::viewport::{Transform, Viewport, ViewportLimits};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// All tunable sizes and limits of a diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub metrics: Metrics,
    pub viewport: ViewportLimits,
}

/// Discrete user interactions. Pointers are in screen space.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    ColumnClicked { node_id: String, column: String },
    BackgroundClicked,
    NodeDragStart { node_id: String, pointer: Point },
    NodeDragMove { node_id: String, pointer: Point },
    EscapePressed,
    SearchChanged { term: String },
    FitRequested,
    ZoomRequested { factor: f64, pivot: Option<Point> },
}

/// What an operation pushed to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    None,
    Full,
    Styles,
    Edges,
    Transform,
}

/// Emitted to subscribers when the selection changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    SelectionChanged(SelectionSummary),
    SelectionCleared,
}

type Listener = Box<dyn FnMut(&Notification)>;

#[derive(Debug, Clone, Copy)]
struct Drag {
    node: usize,
    /// Pointer position relative to the node's top-left corner, layout space.
    grab: Point,
}

struct Diagram {
    model: GraphModel,
    layout: Layout,
    paths: EdgePaths,
    lineage: LineageIndex,
    selection: Option<SelectionResult>,
    visuals: VisualState,
    visibility: Visibility,
    drag: Option<Drag>,
}

fn frame<'a>(diagram: &'a Diagram, metrics: &'a Metrics, transform: Transform) -> Frame<'a> {
    Frame {
        model: &diagram.model,
        layout: &diagram.layout,
        paths: &diagram.paths,
        visuals: &diagram.visuals,
        visibility: &diagram.visibility,
        metrics,
        transform,
    }
}

pub struct Coordinator<S: RenderSurface> {
    surface: S,
    engine: LayoutEngine,
    viewport: Viewport,
    diagram: Option<Diagram>,
    listeners: Vec<Listener>,
}

impl<S: RenderSurface> Coordinator<S> {
    pub fn new(surface: S, config: DiagramConfig) -> Self {
        let viewport = Viewport::new(surface.viewport_size(), config.viewport);
        Self {
            surface,
            engine: LayoutEngine::new(config.metrics),
            viewport,
            diagram: None,
            listeners: Vec::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn is_loaded(&self) -> bool {
        self.diagram.is_some()
    }

    pub fn model(&self) -> Option<&GraphModel> {
        self.diagram.as_ref().map(|d| &d.model)
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.diagram.as_ref().map(|d| &d.layout)
    }

    pub fn paths(&self) -> Option<&EdgePaths> {
        self.diagram.as_ref().map(|d| &d.paths)
    }

    pub fn selection(&self) -> Option<&SelectionResult> {
        self.diagram.as_ref().and_then(|d| d.selection.as_ref())
    }

    pub fn visibility(&self) -> Option<&Visibility> {
        self.diagram.as_ref().map(|d| &d.visibility)
    }

    pub fn transform(&self) -> Transform {
        self.viewport.transform()
    }

    /// Register a selection listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&Notification) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, notification: Notification) {
        for listener in &mut self.listeners {
            listener(&notification);
        }
    }

    /// Replace the current diagram with `snapshot`, draw it and fit it.
    ///
    /// A malformed snapshot is rejected before anything is discarded.
    pub fn initialize(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let model = GraphModel::from_snapshot(snapshot)?;

        let dangling = model.dangling_endpoints();
        if dangling > 0 {
            tracing::warn!(dangling, "edges reference unknown nodes or columns");
        }

        let layout = self.engine.layout(&model);
        let paths = EdgePaths::compute(&Geometry::new(&model, &layout, self.engine.metrics()));
        let had_selection = self.selection().is_some();

        tracing::info!(
            nodes = model.nodes.len(),
            edges = model.edges.len(),
            layers = layout.layers.len(),
            "diagram initialized"
        );

        self.surface.clear();
        let diagram = self.diagram.insert(Diagram {
            lineage: LineageIndex::new(&model),
            visuals: VisualState::idle(&model),
            visibility: Visibility::all(&model),
            selection: None,
            drag: None,
            model,
            layout,
            paths,
        });

        self.viewport.set_size(self.surface.viewport_size());
        self.viewport.fit(&diagram.layout.nodes);
        self.surface
            .draw(&frame(diagram, self.engine.metrics(), self.viewport.transform()));

        if had_selection {
            self.notify(Notification::SelectionCleared);
        }
        Ok(())
    }

    /// Draw the current frame again from scratch.
    pub fn redraw(&mut self) -> Redraw {
        let Some(diagram) = self.diagram.as_ref() else {
            return Redraw::None;
        };
        self.surface
            .draw(&frame(diagram, self.engine.metrics(), self.viewport.transform()));
        Redraw::Full
    }

    /// Pick up a new surface size and redraw; the transform is kept.
    pub fn resize(&mut self) -> Redraw {
        let size = self.surface.viewport_size();
        if size != self.viewport.size() {
            tracing::debug!(width = size.width, height = size.height, "viewport resized");
            self.viewport.set_size(size);
        }
        self.redraw()
    }

    /// Select a column, or clear the selection when it is already selected.
    ///
    /// Columns that are not rows of a loaded node cannot be selected.
    pub fn select_column(&mut self, node_id: &str, column: &str) -> Redraw {
        let Some(diagram) = self.diagram.as_mut() else {
            return Redraw::None;
        };

        let key = ColumnKey::new(node_id, column);
        if diagram.model.column(&key).is_none() {
            tracing::debug!(%key, "ignoring selection of unknown column");
            return Redraw::None;
        }
        if diagram.selection.as_ref().is_some_and(|s| s.origin == key) {
            return self.clear_selection();
        }

        let result = diagram.lineage.trace(&diagram.model, key);
        let summary = result.summary(&diagram.model);
        diagram.visuals = VisualState::from_selection(&diagram.model, Some(&result));
        diagram.selection = Some(result);

        self.surface
            .restyle(&frame(diagram, self.engine.metrics(), self.viewport.transform()));
        self.notify(Notification::SelectionChanged(summary));
        Redraw::Styles
    }

    /// Reset all rows and edges to their default state. No-op without a selection.
    pub fn clear_selection(&mut self) -> Redraw {
        let Some(diagram) = self.diagram.as_mut() else {
            return Redraw::None;
        };
        if diagram.selection.take().is_none() {
            return Redraw::None;
        }

        diagram.visuals = VisualState::idle(&diagram.model);
        self.surface
            .restyle(&frame(diagram, self.engine.metrics(), self.viewport.transform()));
        self.notify(Notification::SelectionCleared);
        Redraw::Styles
    }

    pub fn filter(&mut self, term: &str) -> Redraw {
        let Some(diagram) = self.diagram.as_mut() else {
            return Redraw::None;
        };

        let visibility = Visibility::from_search(&diagram.model, term);
        if visibility == diagram.visibility {
            return Redraw::None;
        }
        tracing::debug!(term, hidden = visibility.hidden_node_count(), "filter applied");
        diagram.visibility = visibility;

        self.surface
            .restyle(&frame(diagram, self.engine.metrics(), self.viewport.transform()));
        Redraw::Styles
    }

    /// Fit the whole graph into the viewport.
    pub fn reset_view(&mut self) -> Redraw {
        let Some(diagram) = self.diagram.as_ref() else {
            return Redraw::None;
        };

        self.viewport.set_size(self.surface.viewport_size());
        if !self.viewport.fit(&diagram.layout.nodes) {
            return Redraw::None;
        }
        self.surface.set_transform(self.viewport.transform());
        Redraw::Transform
    }

    /// Fit the viewport to the nodes owning connected columns of the selection.
    pub fn focus_selection(&mut self) -> Redraw {
        let Some(diagram) = self.diagram.as_ref() else {
            return Redraw::None;
        };
        let Some(selection) = diagram.selection.as_ref() else {
            return Redraw::None;
        };

        let owners: BTreeSet<usize> = selection
            .connected_columns()
            .filter_map(|key| diagram.model.index_of(&key.node))
            .collect();

        self.viewport.set_size(self.surface.viewport_size());
        let fitted = self
            .viewport
            .fit(owners.iter().filter_map(|&i| diagram.layout.node(i)));
        if !fitted {
            return Redraw::None;
        }
        self.surface.set_transform(self.viewport.transform());
        Redraw::Transform
    }

    pub fn zoom_by(&mut self, factor: f64, pivot: Option<Point>) -> Redraw {
        if !self.viewport.zoom_by(factor, pivot) {
            return Redraw::None;
        }
        self.surface.set_transform(self.viewport.transform());
        Redraw::Transform
    }

    /// Start dragging a node; `pointer` is in screen space.
    pub fn begin_drag(&mut self, node_id: &str, pointer: Point) -> Redraw {
        let transform = self.viewport.transform();
        let Some(diagram) = self.diagram.as_mut() else {
            return Redraw::None;
        };
        let Some(node) = diagram.model.index_of(node_id) else {
            return Redraw::None;
        };

        let Some(placed) = diagram.layout.node(node) else {
            return Redraw::None;
        };
        let at = transform.to_layout(pointer);
        diagram.drag = Some(Drag {
            node,
            grab: Point::new(at.x - placed.x, at.y - placed.y),
        });
        Redraw::None
    }

    /// Move the dragged node under `pointer` and redraw its edges.
    ///
    /// The position is absolute, so repeating a move changes nothing.
    pub fn drag_to(&mut self, node_id: &str, pointer: Point) -> Redraw {
        let transform = self.viewport.transform();
        let Some(diagram) = self.diagram.as_mut() else {
            return Redraw::None;
        };
        let Some(drag) = diagram.drag else {
            return Redraw::None;
        };
        if diagram.model.index_of(node_id) != Some(drag.node) {
            return Redraw::None;
        }

        let at = transform.to_layout(pointer);
        let (x, y) = (at.x - drag.grab.x, at.y - drag.grab.y);
        let unchanged = diagram
            .layout
            .node(drag.node)
            .is_none_or(|placed| placed.x == x && placed.y == y);
        if unchanged || !diagram.layout.move_node(drag.node, x, y) {
            return Redraw::None;
        }

        let geometry = Geometry::new(&diagram.model, &diagram.layout, self.engine.metrics());
        let touched = diagram
            .paths
            .recompute_for_node(&geometry, &diagram.model.nodes[drag.node].id);

        self.surface.update_edges(
            &frame(diagram, self.engine.metrics(), transform),
            drag.node,
            &touched,
        );
        Redraw::Edges
    }

    /// Apply one interaction event.
    pub fn dispatch(&mut self, event: InteractionEvent) -> Redraw {
        match event {
            InteractionEvent::ColumnClicked { node_id, column } => {
                self.select_column(&node_id, &column)
            }
            InteractionEvent::BackgroundClicked | InteractionEvent::EscapePressed => {
                if let Some(diagram) = self.diagram.as_mut() {
                    diagram.drag = None;
                }
                self.clear_selection()
            }
            InteractionEvent::NodeDragStart { node_id, pointer } => {
                self.begin_drag(&node_id, pointer)
            }
            InteractionEvent::NodeDragMove { node_id, pointer } => self.drag_to(&node_id, pointer),
            InteractionEvent::SearchChanged { term } => self.filter(&term),
            InteractionEvent::FitRequested => self.reset_view(),
            InteractionEvent::ZoomRequested { factor, pivot } => self.zoom_by(factor, pivot),
        }
    }
}
