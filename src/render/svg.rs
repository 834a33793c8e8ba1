use std::fmt::Write as _;

use super::layout::{BBox, ClusterBox, DiagramLayout};
use crate::graph::{Edge, Orientation, RootGraph};
use crate::sanitize::escape_xml;

/// Serializes a laid-out graph as a standalone SVG document.
pub fn render_svg(graph: &RootGraph, layout: &DiagramLayout) -> String {
    let attrs = &graph.attributes;
    let padding = 20.0;
    let width = (layout.bbox.right() + padding).max(100.0);
    let height = (layout.bbox.bottom() + padding).max(50.0);

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width:.2} {height:.2}" width="{width:.2}" height="{height:.2}"><rect width="100%" height="100%" fill="{}" />"#,
        escape_xml(&attrs.fill_color)
    );
    let _ = write!(svg, r#"<g id="{}" class="graph">"#, escape_xml(&graph.name));

    let label = attrs.label.trim();
    if !label.is_empty() {
        let _ = write!(svg, "<title>{}</title>", escape_xml(label));
    }

    for cluster in &layout.clusters {
        svg.push_str(&render_cluster(graph, cluster));
    }

    // Edges sit behind nodes.
    for edge in graph.edges() {
        let from = layout.nodes.get(&edge.from);
        let to = layout.nodes.get(&edge.to);
        if let (Some(from), Some(to)) = (from, to) {
            svg.push_str(&render_edge(graph, edge, from, to, layout.orientation));
        }
    }

    for node in graph.nodes() {
        let Some(pos) = layout.nodes.get(&node.id) else {
            continue;
        };
        let fill = node.fill_color.as_deref().unwrap_or(&attrs.node.fill_color);
        let _ = write!(
            svg,
            r#"<g id="{}" class="node"><rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="{}" stroke-width="{:.1}" /><text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.1}" fill="{}" text-anchor="middle">{}</text></g>"#,
            escape_xml(&node.id),
            pos.x,
            pos.y,
            pos.width,
            pos.height,
            escape_xml(fill),
            escape_xml(&attrs.node.color),
            attrs.node.pen_width,
            pos.center_x(),
            pos.center_y() + attrs.font_size / 3.0,
            font_stack(&attrs.font_name),
            attrs.font_size,
            escape_xml(&attrs.node.font_color),
            escape_xml(&node.label),
        );
    }

    svg.push_str("</g></svg>");
    svg
}

/// Themed family with a generic fallback for hosts that lack it.
fn font_stack(family: &str) -> String {
    format!("{}, sans-serif", escape_xml(family))
}

fn render_cluster(graph: &RootGraph, placed: &ClusterBox) -> String {
    let attrs = &graph.attributes;
    let Some(cluster) = graph.cluster(&placed.id) else {
        return String::new();
    };
    let stroke = cluster.color.as_deref().unwrap_or(&attrs.color);
    let BBox {
        x,
        y,
        width,
        height,
    } = placed.bbox;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<g id="{}" class="cluster"><rect x="{x:.2}" y="{y:.2}" width="{width:.2}" height="{height:.2}" fill="{}" stroke="{}" stroke-width="{:.1}" />"#,
        escape_xml(&cluster.id),
        escape_xml(&attrs.fill_color),
        escape_xml(stroke),
        attrs.pen_width,
    );
    if !cluster.label.is_empty() {
        let _ = write!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.1}" fill="{}" font-weight="bold" text-anchor="middle">{}</text>"#,
            placed.title_x,
            placed.title_y,
            font_stack(&attrs.font_name),
            attrs.font_size,
            escape_xml(stroke),
            escape_xml(&cluster.label),
        );
    }
    svg.push_str("</g>");
    svg
}

fn render_edge(
    graph: &RootGraph,
    edge: &Edge,
    from: &BBox,
    to: &BBox,
    orientation: Orientation,
) -> String {
    let attrs = &graph.attributes;
    let stroke = edge.color.as_deref().unwrap_or(&attrs.edge.color);
    let is_vertical = orientation == Orientation::TopToBottom;

    // Connection points. Endpoints stacked in the same column (or row)
    // leave from the same side and bow outwards.
    let (x1, y1, x2, y2, bow) = if is_vertical {
        let (from_cx, to_cx) = (from.center_x(), to.center_x());
        if to.y >= from.bottom() {
            (from_cx, from.bottom(), to_cx, to.y, 0.0)
        } else if to.bottom() <= from.y {
            (from_cx, from.y, to_cx, to.bottom(), 0.0)
        } else {
            (from_cx, from.bottom(), to_cx, to.bottom(), 40.0)
        }
    } else {
        let (from_cy, to_cy) = (from.center_y(), to.center_y());
        if to.x >= from.right() {
            (from.right(), from_cy, to.x, to_cy, 0.0)
        } else if to.right() <= from.x {
            (from.x, from_cy, to.right(), to_cy, 0.0)
        } else {
            (from.right(), from_cy, to.right(), to_cy, 40.0)
        }
    };

    let mx = (x1 + x2) / 2.0;
    let my = (y1 + y2) / 2.0;
    let (cx1, cy1, cx2, cy2) = match (is_vertical, bow > 0.0) {
        (true, false) => (x1, my, x2, my),
        (false, false) => (mx, y1, mx, y2),
        (true, true) => (x1, y1 + bow, x2, y2 + bow),
        (false, true) => (x1 + bow, y1, x2 + bow, y2),
    };

    let mut svg = String::new();
    let _ = write!(svg, r#"<g id="{}" class="edge""#, escape_xml(&edge.name));
    if let Some(weight) = edge.weight {
        let _ = write!(svg, r#" data-weight="{weight}""#);
    }
    svg.push('>');

    if bow == 0.0 && ((x1 - x2).abs() < 1.0 || (y1 - y2).abs() < 1.0) {
        let _ = write!(
            svg,
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{}" stroke-width="{:.1}" />"#,
            escape_xml(stroke),
            attrs.edge.pen_width,
        );
    } else {
        let _ = write!(
            svg,
            r#"<path d="M {x1:.2} {y1:.2} C {cx1:.2} {cy1:.2}, {cx2:.2} {cy2:.2}, {x2:.2} {y2:.2}" fill="none" stroke="{}" stroke-width="{:.1}" />"#,
            escape_xml(stroke),
            attrs.edge.pen_width,
        );
    }

    if let Some(label) = edge.label.as_deref() {
        // Midpoint of the cubic curve.
        let label_x = 0.125 * x1 + 0.375 * cx1 + 0.375 * cx2 + 0.125 * x2;
        let label_y = 0.125 * y1 + 0.375 * cy1 + 0.375 * cy2 + 0.125 * y2;
        let font_size = attrs.font_size * 0.85;
        let label_width = label.chars().count() as f32 * font_size * 0.6 + 8.0;
        let label_height = font_size + 6.0;

        let _ = write!(
            svg,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="2" fill="{}" />"#,
            label_x - label_width / 2.0,
            label_y - label_height / 2.0,
            label_width,
            label_height,
            escape_xml(&attrs.fill_color),
        );
        let _ = write!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.1}" fill="{}" text-anchor="middle">{}</text>"#,
            label_x,
            label_y + font_size / 3.0,
            font_stack(&attrs.font_name),
            font_size,
            escape_xml(stroke),
            escape_xml(label),
        );
    }

    svg.push_str("</g>");
    svg
}
