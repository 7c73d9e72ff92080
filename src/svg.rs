use crate::geometry::round2;
use crate::layout::LayoutNode;
use crate::model::{Edge, Node};
use crate::render::{EdgeState, Frame, RenderSurface};
use crate::viewport::{Size, Transform};
use std::fmt::{self, Write};

const STYLE: &str = r#"<style>
  .canvas { fill: #F8FAFC; }
  .node-bg { fill: #fff; }
  .node-border { fill: none; stroke: #CBD5E1; stroke-width: 1; }
  .node-label { font-family: monospace; font-size: 13px; font-weight: bold; fill: #fff; }
  .row text { font-family: monospace; font-size: 12px; fill: #0F172A; }
  .row .data-type { fill: #64748B; }
  .row .pk { font-weight: bold; }
  .row rect { fill: transparent; }
  .row.current rect { fill: #FEF3C7; }
  .row.highlighted rect { fill: #DBEAFE; }
  .row.dimmed { opacity: 0.35; }
  .edge { fill: none; }
</style>"#;

/// Markup for moving one node inside an already drawn document.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePatch {
    pub node_id: String,
    /// Replacement for the node's `<g>` element.
    pub markup: String,
    /// `(edge id, d)` for every listed edge that is drawn.
    pub edges: Vec<(String, String)>,
}

/// Writes a frame as a standalone SVG document.
#[derive(Debug, Clone, Default)]
pub struct SvgRenderer;

impl SvgRenderer {
    /// Wrap already rendered content in the document and transform group.
    pub fn document(&self, size: Size, transform: Transform, content: &str) -> String {
        let (w, h) = (round2(size.width), round2(size.height));
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n\
             {STYLE}\n\
             <rect class=\"canvas\" width=\"{w}\" height=\"{h}\" />\n\
             <g class=\"viewport\" transform=\"{}\">\n{content}</g>\n</svg>\n",
            transform.to_svg()
        )
    }

    /// Edges, then nodes on top. Hidden items are left out.
    pub fn write_content(&self, svg: &mut impl Write, frame: &Frame<'_>) -> fmt::Result {
        for (index, edge) in frame.model.edges.iter().enumerate() {
            if frame.visibility.edge_hidden(index) {
                continue;
            }
            if let Some(curve) = frame.paths.get(index) {
                self.write_edge(svg, edge, &curve.to_svg_path(), frame.visuals.edge(index))?;
            }
        }

        for (index, node) in frame.model.nodes.iter().enumerate() {
            if frame.visibility.node_hidden(index) {
                continue;
            }
            if let Some(placed) = frame.layout.node(index) {
                self.write_node(svg, frame, index, node, placed)?;
            }
        }
        Ok(())
    }

    /// `None` when the node is not drawn, so there is nothing to patch.
    pub fn node_patch(&self, frame: &Frame<'_>, index: usize, edges: &[usize]) -> Option<NodePatch> {
        if frame.visibility.node_hidden(index) {
            return None;
        }
        let node = frame.model.nodes.get(index)?;
        let placed = frame.layout.node(index)?;

        let mut markup = String::new();
        self.write_node(&mut markup, frame, index, node, placed).ok()?;

        let edges = edges
            .iter()
            .filter(|&&i| !frame.visibility.edge_hidden(i))
            .filter_map(|&i| {
                let edge = frame.model.edges.get(i)?;
                let curve = frame.paths.get(i)?;
                Some((edge.id.clone(), curve.to_svg_path()))
            })
            .collect();

        Some(NodePatch {
            node_id: node.id.clone(),
            markup,
            edges,
        })
    }

    fn write_edge(&self, svg: &mut impl Write, edge: &Edge, d: &str, state: EdgeState) -> fmt::Result {
        let style = edge.kind.style();
        write!(
            svg,
            r#"<path class="edge {}" data-edge-id="{}" d="{}" stroke="{}" stroke-width="{}" opacity="{}""#,
            edge.kind,
            escape_xml(&edge.id),
            d,
            style.color,
            state.stroke_width(),
            state.opacity()
        )?;
        if let Some(dash) = style.dash {
            write!(svg, r#" stroke-dasharray="{}""#, dash)?;
        }
        writeln!(svg, " />")
    }

    fn write_node(
        &self,
        svg: &mut impl Write,
        frame: &Frame<'_>,
        index: usize,
        node: &Node,
        placed: &LayoutNode,
    ) -> fmt::Result {
        let m = frame.metrics;
        let (x, y, w) = (round2(placed.x), round2(placed.y), placed.width);

        writeln!(
            svg,
            r#"<g class="node {}" data-node-id="{}">"#,
            node.kind,
            escape_xml(&node.id)
        )?;
        writeln!(
            svg,
            r#"<rect class="node-bg" x="{}" y="{}" width="{}" height="{}" rx="6" />"#,
            x, y, w, placed.height
        )?;

        // Header with square bottom corners
        writeln!(
            svg,
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="6" fill="{}" />"#,
            x,
            y,
            w,
            m.header_height,
            node.kind.color()
        )?;
        writeln!(
            svg,
            r#"<rect x="{}" y="{}" width="{}" height="6" fill="{}" />"#,
            x,
            round2(y + m.header_height - 6.0),
            w,
            node.kind.color()
        )?;
        writeln!(
            svg,
            r#"<text class="node-label" x="{}" y="{}">{}</text>"#,
            round2(x + m.padding_x),
            round2(y + m.header_height / 2.0 + 5.0),
            escape_xml(&m.fit_text(&node.label, w - 2.0 * m.padding_x))
        )?;

        for (row, column) in node.columns.iter().enumerate() {
            let top = y + m.header_height + row as f64 * m.row_height;
            let baseline = round2(top + m.row_height * 0.7);
            let state = frame.visuals.row(index, row);
            let type_width = m.text_width(&column.data_type);
            let prefix = if column.is_pk { "◆ " } else { "" };
            let name = m.fit_text(
                &format!("{}{}", prefix, column.name),
                w - 3.0 * m.padding_x - type_width,
            );

            writeln!(
                svg,
                r#"<g class="{}" data-column="{}">"#,
                state.as_class(),
                escape_xml(&column.name)
            )?;
            writeln!(
                svg,
                r#"<rect x="{}" y="{}" width="{}" height="{}" />"#,
                x,
                round2(top),
                w,
                m.row_height
            )?;
            writeln!(
                svg,
                r#"<text{} x="{}" y="{}">{}</text>"#,
                if column.is_pk { r#" class="pk""# } else { "" },
                round2(x + m.padding_x),
                baseline,
                escape_xml(&name)
            )?;
            writeln!(
                svg,
                r#"<text class="data-type" x="{}" y="{}" text-anchor="end">{}</text>"#,
                round2(x + w - m.padding_x),
                baseline,
                escape_xml(&column.data_type)
            )?;
            writeln!(svg, "</g>")?;
        }

        writeln!(
            svg,
            r#"<rect class="node-border" x="{}" y="{}" width="{}" height="{}" rx="6" />"#,
            x, y, w, placed.height
        )?;
        writeln!(svg, "</g>")
    }
}

/// Render surface that keeps the diagram as an SVG string.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    size: Size,
    renderer: SvgRenderer,
    transform: Transform,
    content: String,
}

impl SvgSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            renderer: SvgRenderer,
            transform: Transform::default(),
            content: String::new(),
        }
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    /// The current document.
    pub fn svg(&self) -> String {
        self.renderer
            .document(self.size, self.transform, &self.content)
    }
}

impl RenderSurface for SvgSurface {
    fn viewport_size(&self) -> Size {
        self.size
    }

    fn draw(&mut self, frame: &Frame<'_>) {
        let mut content = String::new();
        if self.renderer.write_content(&mut content, frame).is_ok() {
            self.content = content;
            self.transform = frame.transform;
        }
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn clear(&mut self) {
        self.content.clear();
        self.transform = Transform::default();
    }
}

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// CSS selector matching `attr` exactly, e.g. `[data-edge-id="e1"]`.
pub fn attr_selector(attr: &str, value: &str) -> String {
    let value = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("[{}=\"{}\"]", attr, value)
}
