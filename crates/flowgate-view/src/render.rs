//! SVG rendering of flow diagrams.
//!
//! [`DiagramRenderer::render`] derives the graph, lays it out, colors links
//! by category, and draws a complete SVG document. Every call replaces the
//! previous drawing. An empty record set produces [`RenderOutcome::NoData`]
//! rather than an empty canvas.
//!
//! Links are drawn at 0.5 opacity and raised to 0.8 on hover; nodes carry a
//! `data-node` attribute for hosts that dispatch clicks from the document.
//! In process, [`DiagramRenderer::click`] and [`DiagramRenderer::click_at`]
//! invoke the registered node-click callback.

use std::fmt::Write as _;

use flowgate_core::FlowRecord;

use crate::error::ViewError;
use crate::graph::FlowGraph;
use crate::layout::{layout, Layout, LayoutOptions, PositionedNode};
use crate::palette::{node_color, CategoryPalette};

/// Message shown in place of a diagram when there is nothing to draw.
pub const NO_DATA_MESSAGE: &str = "No data available. Please adjust your filters.";

/// Canvas geometry. The layout extent is the canvas minus margins; the
/// side margins leave room for node labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub node_width: f64,
    pub node_padding: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            width: 1200.0,
            height: 600.0,
            margin_top: 20.0,
            margin_right: 150.0,
            margin_bottom: 20.0,
            margin_left: 150.0,
            node_width: 15.0,
            node_padding: 10.0,
        }
    }
}

impl RenderOptions {
    fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            width: (self.width - self.margin_left - self.margin_right).max(self.node_width),
            height: (self.height - self.margin_top - self.margin_bottom).max(0.0),
            node_width: self.node_width,
            node_padding: self.node_padding,
        }
    }
}

/// A drawn diagram: geometry plus the SVG document.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    pub layout: Layout,
    pub svg: String,
    origin: (f64, f64),
}

impl Diagram {
    /// Label of the node under canvas point `(x, y)`.
    pub fn node_at(&self, x: f64, y: f64) -> Option<&str> {
        let (lx, ly) = (x - self.origin.0, y - self.origin.1);
        self.layout
            .nodes
            .iter()
            .find(|node| node.contains(lx, ly))
            .map(|node| node.label.as_str())
    }

    pub fn has_node(&self, label: &str) -> bool {
        self.layout.nodes.iter().any(|node| node.label == label)
    }
}

/// Result of a render call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    NoData,
    Drawn(Diagram),
}

type NodeClickHandler = Box<dyn FnMut(&str) + Send>;

/// Stateful renderer holding the current drawing, the category palette and
/// the node-click callback.
pub struct DiagramRenderer {
    options: RenderOptions,
    palette: CategoryPalette,
    current: Option<RenderOutcome>,
    on_node_click: Option<NodeClickHandler>,
}

impl Default for DiagramRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl DiagramRenderer {
    pub fn new(options: RenderOptions) -> Self {
        DiagramRenderer {
            options,
            palette: CategoryPalette::new(),
            current: None,
            on_node_click: None,
        }
    }

    /// Registers the callback invoked with a node's label when it is clicked.
    pub fn on_node_click<F>(&mut self, handler: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_node_click = Some(Box::new(handler));
    }

    /// Clears the previous drawing and draws `records`.
    ///
    /// On error the renderer is left cleared.
    pub fn render(&mut self, records: &[FlowRecord]) -> Result<&RenderOutcome, ViewError> {
        self.current = None;

        if records.is_empty() {
            let outcome: &RenderOutcome = self.current.insert(RenderOutcome::NoData);
            return Ok(outcome);
        }

        let graph = FlowGraph::from_records(records);
        let layout = layout(&graph, &self.options.layout_options())?;
        let svg = draw_svg(&layout, &self.options, &mut self.palette);
        let diagram = Diagram {
            layout,
            svg,
            origin: (self.options.margin_left, self.options.margin_top),
        };
        let outcome: &RenderOutcome = self.current.insert(RenderOutcome::Drawn(diagram));
        Ok(outcome)
    }

    /// The current drawing, if any render has succeeded since the last error.
    pub fn current(&self) -> Option<&RenderOutcome> {
        self.current.as_ref()
    }

    pub fn palette(&self) -> &CategoryPalette {
        &self.palette
    }

    /// Dispatches a click on the node labeled `label`.
    ///
    /// Returns `false` (and does not invoke the callback) when no such node
    /// is drawn.
    pub fn click(&mut self, label: &str) -> bool {
        let drawn = matches!(&self.current, Some(RenderOutcome::Drawn(d)) if d.has_node(label));
        if !drawn {
            return false;
        }
        if let Some(handler) = self.on_node_click.as_mut() {
            handler(label);
        }
        true
    }

    /// Hit-tests canvas point `(x, y)` and dispatches a click on the node
    /// found there. Returns the clicked label.
    pub fn click_at(&mut self, x: f64, y: f64) -> Option<String> {
        let label = match &self.current {
            Some(RenderOutcome::Drawn(diagram)) => diagram.node_at(x, y)?.to_string(),
            _ => return None,
        };
        self.click(&label);
        Some(label)
    }
}

const STYLE: &str = ".link{fill:none;opacity:0.5}.link:hover{opacity:0.8}\
.node rect{cursor:pointer;stroke:#000}.node text{font-size:12px;fill:#333}";

fn draw_svg(layout: &Layout, options: &RenderOptions, palette: &mut CategoryPalette) -> String {
    let inner_width = options.layout_options().width;
    let mut svg = String::new();

    // Writing into a String cannot fail.
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = fmt_num(options.width),
        h = fmt_num(options.height),
    );
    let _ = write!(svg, "<style>{STYLE}</style>");
    let _ = write!(
        svg,
        r#"<g transform="translate({},{})">"#,
        fmt_num(options.margin_left),
        fmt_num(options.margin_top)
    );

    svg.push_str(r#"<g class="links">"#);
    for link in &layout.links {
        let source = &layout.nodes[link.source];
        let target = &layout.nodes[link.target];
        let (x0, x1) = (source.x1, target.x0);
        let xm = (x0 + x1) / 2.0;
        let _ = write!(
            svg,
            r#"<path class="link" d="M{x0},{y0}C{xm},{y0},{xm},{y1},{x1},{y1}" stroke="{color}" stroke-width="{sw}" data-category="{cat}"><title>{src} → {dst}&#10;Value: {value}</title></path>"#,
            x0 = fmt_num(x0),
            y0 = fmt_num(link.y0),
            xm = fmt_num(xm),
            y1 = fmt_num(link.y1),
            x1 = fmt_num(x1),
            color = palette.color(&link.category),
            sw = fmt_num(link.width.max(1.0)),
            cat = escape(&link.category),
            src = escape(&source.label),
            dst = escape(&target.label),
            value = fmt_num(link.value),
        );
    }
    svg.push_str("</g>");

    svg.push_str(r#"<g class="nodes">"#);
    for node in &layout.nodes {
        draw_node(&mut svg, node, inner_width);
    }
    svg.push_str("</g></g></svg>");
    svg
}

fn draw_node(svg: &mut String, node: &PositionedNode, inner_width: f64) {
    let label = escape(&node.label);
    let left_half = node.x0 < inner_width / 2.0;
    let (text_x, anchor) = if left_half {
        (node.x1 + 6.0, "start")
    } else {
        (node.x0 - 6.0, "end")
    };
    let _ = write!(
        svg,
        r#"<g class="node" data-node="{label}"><rect x="{x}" y="{y}" width="{w}" height="{h}" fill="{fill}"/><text x="{tx}" y="{ty}" dy="0.35em" text-anchor="{anchor}">{label}</text><title>{label}&#10;Value: {value}</title></g>"#,
        x = fmt_num(node.x0),
        y = fmt_num(node.y0),
        w = fmt_num(node.x1 - node.x0),
        h = fmt_num(node.y1 - node.y0),
        fill = node_color(node.index),
        tx = fmt_num(text_x),
        ty = fmt_num((node.y0 + node.y1) / 2.0),
        value = fmt_num(node.value),
    );
}

/// Formats with at most two decimals and no trailing zeros.
fn fmt_num(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn records() -> Vec<FlowRecord> {
        vec![
            FlowRecord::new("A", "B", 5.0).with_category("opex"),
            FlowRecord::new("B", "C", 3.0),
        ]
    }

    fn drawn(outcome: &RenderOutcome) -> &Diagram {
        match outcome {
            RenderOutcome::Drawn(diagram) => diagram,
            RenderOutcome::NoData => panic!("expected a drawn diagram"),
        }
    }

    #[test]
    fn empty_records_yield_no_data_state() {
        let mut renderer = DiagramRenderer::default();
        assert_eq!(renderer.render(&[]).unwrap(), &RenderOutcome::NoData);
    }

    #[test]
    fn draws_one_rect_per_node_and_one_path_per_link() {
        let mut renderer = DiagramRenderer::default();
        let outcome = renderer.render(&records()).unwrap();
        let svg = &drawn(outcome).svg;
        assert_eq!(svg.matches("<rect").count(), 3);
        assert_eq!(svg.matches(r#"<path class="link""#).count(), 2);
        assert!(svg.contains(r#"data-node="A""#));
        assert!(svg.contains(".link:hover{opacity:0.8}"));
        assert!(svg.contains("A → B&#10;Value: 5"));
    }

    #[test]
    fn rerender_replaces_previous_geometry() {
        let mut renderer = DiagramRenderer::default();
        renderer.render(&records()).unwrap();
        let outcome = renderer
            .render(&[FlowRecord::new("X", "Y", 1.0)])
            .unwrap();
        let diagram = drawn(outcome);
        assert_eq!(diagram.layout.nodes.len(), 2);
        assert!(!diagram.svg.contains(r#"data-node="A""#));

        assert_eq!(renderer.render(&[]).unwrap(), &RenderOutcome::NoData);
    }

    #[test]
    fn link_colors_are_stable_across_renders() {
        let mut renderer = DiagramRenderer::default();
        renderer.render(&records()).unwrap();
        let opex = renderer.palette().get("opex").unwrap();

        renderer
            .render(&[
                FlowRecord::new("Q", "R", 1.0).with_category("capex"),
                FlowRecord::new("Q", "S", 1.0).with_category("opex"),
            ])
            .unwrap();
        assert_eq!(renderer.palette().get("opex"), Some(opex));
        assert_ne!(renderer.palette().get("capex"), Some(opex));
    }

    #[test]
    fn labels_are_escaped() {
        let mut renderer = DiagramRenderer::default();
        let outcome = renderer
            .render(&[FlowRecord::new("<b>&", "\"q\"", 1.0)])
            .unwrap();
        let svg = &drawn(outcome).svg;
        assert!(svg.contains("&lt;b&gt;&amp;"));
        assert!(svg.contains("&quot;q&quot;"));
        assert!(!svg.contains("<b>"));
    }

    #[test]
    fn failed_render_clears_state() {
        let mut renderer = DiagramRenderer::default();
        renderer.render(&records()).unwrap();
        assert!(renderer.render(&[FlowRecord::new("A", "B", -1.0)]).is_err());
        assert!(renderer.current().is_none());
    }

    #[test]
    fn clicking_a_node_invokes_callback_with_label() {
        let clicked = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&clicked);

        let mut renderer = DiagramRenderer::default();
        renderer.on_node_click(move |label| sink.lock().unwrap().push(label.to_string()));
        renderer.render(&records()).unwrap();

        assert!(renderer.click("A"));
        assert!(!renderer.click("missing"));
        assert_eq!(*clicked.lock().unwrap(), vec!["A".to_string()]);
    }

    #[test]
    fn click_at_hit_tests_node_rectangles() {
        let clicked = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&clicked);

        let mut renderer = DiagramRenderer::default();
        renderer.on_node_click(move |label| *sink.lock().unwrap() = Some(label.to_string()));
        renderer.render(&records()).unwrap();

        let (cx, cy) = match renderer.current().unwrap() {
            RenderOutcome::Drawn(d) => {
                let a = &d.layout.nodes[0];
                (150.0 + (a.x0 + a.x1) / 2.0, 20.0 + (a.y0 + a.y1) / 2.0)
            }
            RenderOutcome::NoData => unreachable!(),
        };

        assert_eq!(renderer.click_at(cx, cy).as_deref(), Some("A"));
        assert_eq!(clicked.lock().unwrap().as_deref(), Some("A"));
        assert_eq!(renderer.click_at(1.0, 1.0), None);
    }

    #[test]
    fn fmt_num_trims() {
        assert_eq!(fmt_num(5.0), "5");
        assert_eq!(fmt_num(2.5), "2.5");
        assert_eq!(fmt_num(1.0 / 3.0), "0.33");
        assert_eq!(fmt_num(-0.001), "0");
    }
}
