//! Browser bridge.
//!
//! Mounts a diagram into a DOM element as inline SVG and reports selection
//! changes as CustomEvents on that element (`lineage-selected` with the
//! selection summary as `detail`, and `lineage-cleared`).

use crate::coordinator::{Coordinator, DiagramConfig, InteractionEvent, Notification, Redraw};
use crate::geometry::Point;
use crate::render::{Frame, RenderSurface};
use crate::snapshot::Snapshot;
use crate::svg::{attr_selector, SvgRenderer, SvgSurface};
use crate::viewport::{Size, Transform};
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, CustomEventInit, Element};

struct ElementSurface {
    element: Element,
    svg: SvgSurface,
}

impl ElementSurface {
    fn new(element: Element) -> Self {
        let size = element_size(&element);
        Self {
            element,
            svg: SvgSurface::new(size),
        }
    }

    fn flush(&self) {
        self.element.set_inner_html(&self.svg.svg());
    }

    fn find(&self, selector: &str) -> Option<Element> {
        self.element.query_selector(selector).ok().flatten()
    }

    /// Replace the moved node's group and the `d` of its edges in place.
    /// Returns false when the DOM does not hold what the patch expects.
    fn patch_drag(&self, frame: &Frame<'_>, moved_node: usize, edges: &[usize]) -> bool {
        let Some(patch) = SvgRenderer.node_patch(frame, moved_node, edges) else {
            return false;
        };
        let Some(group) = self.find(&attr_selector("data-node-id", &patch.node_id)) else {
            return false;
        };
        group.set_outer_html(&patch.markup);

        patch.edges.iter().all(|(id, d)| {
            self.find(&attr_selector("data-edge-id", id))
                .is_some_and(|path| path.set_attribute("d", d).is_ok())
        })
    }
}

fn element_size(element: &Element) -> Size {
    Size::new(element.client_width() as f64, element.client_height() as f64)
}

impl RenderSurface for ElementSurface {
    fn viewport_size(&self) -> Size {
        element_size(&self.element)
    }

    fn draw(&mut self, frame: &Frame<'_>) {
        self.svg.resize(element_size(&self.element));
        self.svg.draw(frame);
        self.flush();
    }

    fn update_edges(&mut self, frame: &Frame<'_>, moved_node: usize, edges: &[usize]) {
        self.svg.update_edges(frame, moved_node, edges);
        if !self.patch_drag(frame, moved_node, edges) {
            self.flush();
        }
    }

    fn set_transform(&mut self, transform: Transform) {
        self.svg.set_transform(transform);
        let patched = self
            .find("g.viewport")
            .is_some_and(|group| group.set_attribute("transform", &transform.to_svg()).is_ok());
        if !patched {
            self.flush();
        }
    }

    fn clear(&mut self) {
        self.svg.clear();
        self.element.set_inner_html("");
    }
}

fn emit(target: &Element, notification: &Notification) {
    let (name, detail) = match notification {
        Notification::SelectionChanged(summary) => (
            "lineage-selected",
            serde_wasm_bindgen::to_value(summary).unwrap_or(JsValue::NULL),
        ),
        Notification::SelectionCleared => ("lineage-cleared", JsValue::NULL),
    };

    let init = CustomEventInit::new();
    init.set_bubbles(true);
    init.set_detail(&detail);
    if let Ok(event) = CustomEvent::new_with_event_init_dict(name, &init) {
        let _ = target.dispatch_event(&event);
    }
}

fn changed(redraw: Redraw) -> bool {
    redraw != Redraw::None
}

/// Interactive lineage diagram bound to one container element.
#[wasm_bindgen(js_name = "DiagramEngine")]
pub struct DiagramEngine {
    coordinator: Coordinator<ElementSurface>,
}

#[wasm_bindgen(js_class = "DiagramEngine")]
impl DiagramEngine {
    /// `config` is an optional object overriding `DiagramConfig` fields.
    #[wasm_bindgen(constructor)]
    pub fn new(container: Element, config: JsValue) -> Result<DiagramEngine, String> {
        let config: DiagramConfig = if config.is_undefined() || config.is_null() {
            DiagramConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| e.to_string())?
        };

        let target = container.clone();
        let mut coordinator = Coordinator::new(ElementSurface::new(container), config);
        coordinator.subscribe(move |notification| emit(&target, notification));
        Ok(DiagramEngine { coordinator })
    }

    /// Load a snapshot (JSON text or a plain object), replacing the current diagram.
    pub fn initialize(&mut self, snapshot: JsValue) -> Result<(), String> {
        let text = match snapshot.as_string() {
            Some(text) => text,
            None => js_sys::JSON::stringify(&snapshot)
                .map(String::from)
                .map_err(|_| "Snapshot is not serializable to JSON".to_string())?,
        };
        let snapshot = Snapshot::from_json(&text).map_err(|e| e.to_string())?;
        self.coordinator
            .initialize(&snapshot)
            .map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "selectColumn")]
    pub fn select_column(&mut self, node_id: &str, column: &str) -> bool {
        changed(self.coordinator.select_column(node_id, column))
    }

    #[wasm_bindgen(js_name = "clearSelection")]
    pub fn clear_selection(&mut self) -> bool {
        changed(self.coordinator.clear_selection())
    }

    /// Current selection summary, or `null`.
    pub fn selection(&self) -> JsValue {
        match (self.coordinator.selection(), self.coordinator.model()) {
            (Some(selection), Some(model)) => {
                serde_wasm_bindgen::to_value(&selection.summary(model)).unwrap_or(JsValue::NULL)
            }
            _ => JsValue::NULL,
        }
    }

    pub fn filter(&mut self, term: &str) -> bool {
        changed(self.coordinator.filter(term))
    }

    #[wasm_bindgen(js_name = "resetView")]
    pub fn reset_view(&mut self) -> bool {
        changed(self.coordinator.reset_view())
    }

    #[wasm_bindgen(js_name = "focusSelection")]
    pub fn focus_selection(&mut self) -> bool {
        changed(self.coordinator.focus_selection())
    }

    /// Zoom around the container centre.
    #[wasm_bindgen(js_name = "zoomBy")]
    pub fn zoom_by(&mut self, factor: f64) -> bool {
        changed(self.coordinator.zoom_by(factor, None))
    }

    /// Zoom around a point given in container pixels (wheel zoom).
    #[wasm_bindgen(js_name = "zoomAt")]
    pub fn zoom_at(&mut self, factor: f64, x: f64, y: f64) -> bool {
        changed(self.coordinator.zoom_by(factor, Some(Point::new(x, y))))
    }

    #[wasm_bindgen(js_name = "backgroundClick")]
    pub fn background_click(&mut self) -> bool {
        changed(self.coordinator.dispatch(InteractionEvent::BackgroundClicked))
    }

    /// Keyboard handler; only `Escape` does anything.
    #[wasm_bindgen(js_name = "keyDown")]
    pub fn key_down(&mut self, key: &str) -> bool {
        key == "Escape" && changed(self.coordinator.dispatch(InteractionEvent::EscapePressed))
    }

    #[wasm_bindgen(js_name = "dragStart")]
    pub fn drag_start(&mut self, node_id: &str, x: f64, y: f64) {
        self.coordinator.dispatch(InteractionEvent::NodeDragStart {
            node_id: node_id.to_string(),
            pointer: Point::new(x, y),
        });
    }

    #[wasm_bindgen(js_name = "dragMove")]
    pub fn drag_move(&mut self, node_id: &str, x: f64, y: f64) -> bool {
        changed(self.coordinator.dispatch(InteractionEvent::NodeDragMove {
            node_id: node_id.to_string(),
            pointer: Point::new(x, y),
        }))
    }

    /// Redraw after the container was resized.
    pub fn resize(&mut self) -> bool {
        changed(self.coordinator.resize())
    }
}
