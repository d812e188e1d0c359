//! Static SVG snapshot of a rendered scene.
//!
//! One frame only: the interactive loop lives in the engine, this just dumps
//! what the rendering surface would draw.

use grantmap_graph::{MarkerKind, Scene, Vec2};
use std::fmt::Write as _;

pub fn render(scene: &Scene, viewport: Vec2) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}">"#,
        viewport.x, viewport.y, viewport.x, viewport.y
    );
    let _ = writeln!(
        out,
        r##"  <defs>
    <marker id="arrow" viewBox="0 0 10 10" refX="9" refY="5" markerWidth="7" markerHeight="7" orient="auto-start-reverse">
      <path d="M0,0 L10,5 L0,10 z" fill="context-stroke"/>
    </marker>
    <marker id="arrow-dim" viewBox="0 0 10 10" refX="9" refY="5" markerWidth="5" markerHeight="5" orient="auto-start-reverse">
      <path d="M0,0 L10,5 L0,10 z" fill="context-stroke" opacity="0.4"/>
    </marker>
  </defs>"##
    );

    let t = scene.transform;
    let _ = writeln!(
        out,
        r#"  <g transform="translate({:.2} {:.2}) scale({:.3})">"#,
        t.translate.x, t.translate.y, t.scale
    );

    for edge in &scene.edges {
        let marker = match edge.style.marker {
            MarkerKind::Arrow => "arrow",
            MarkerKind::DimmedArrow => "arrow-dim",
        };
        let dash = if edge.style.dashed {
            r#" stroke-dasharray="6 4""#
        } else {
            ""
        };
        let _ = writeln!(
            out,
            r#"    <path d="{}" fill="none" stroke="{}" stroke-width="{:.1}" opacity="{:.2}"{} marker-end="url(#{})"/>"#,
            edge.path.svg_data(),
            edge.style.color.to_hex(),
            edge.style.width,
            edge.style.opacity,
            dash,
            marker,
        );
    }

    for node in &scene.nodes {
        let min = node.pos - node.half_extent;
        let _ = writeln!(
            out,
            r#"    <rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="6" fill="{}" stroke="{}"/>"#,
            min.x,
            min.y,
            node.half_extent.x * 2.0,
            node.half_extent.y * 2.0,
            node.colors.fill.to_hex(),
            node.colors.border.to_hex(),
        );
        let _ = writeln!(
            out,
            r#"    <text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="middle" fill="{}" font-family="sans-serif" font-size="14">{}</text>"#,
            node.pos.x,
            node.pos.y,
            node.colors.text.to_hex(),
            escape(&node.label),
        );
    }

    out.push_str("  </g>\n</svg>\n");
    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantmap_core::{AccessKind, EdgeData, GraphData, NodeData, NodeId, NodeKind};
    use grantmap_graph::{DiagramController, LayoutOptions};

    fn scene_fixture() -> (Scene, Vec2) {
        let data = GraphData {
            nodes: vec![
                NodeData {
                    id: NodeId::from("a"),
                    name: "Read & Write".to_string(),
                    kind: NodeKind::PERMISSION_SET,
                    group: 0,
                    enabled: None,
                },
                NodeData {
                    id: NodeId::from("b"),
                    name: "Vault".to_string(),
                    kind: NodeKind::CONTROL,
                    group: 1,
                    enabled: None,
                },
            ],
            edges: vec![EdgeData {
                source: NodeId::from("a"),
                target: NodeId::from("b"),
                access: AccessKind::DENY,
            }],
        };
        let controller =
            DiagramController::new(&data, Some(640.0), Some(480.0), LayoutOptions::default());
        (controller.scene(), controller.viewport())
    }

    #[test]
    fn svg_contains_edges_nodes_and_transform() {
        let (scene, viewport) = scene_fixture();
        let svg = render(&scene, viewport);

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="640""#));
        assert!(svg.contains("<g transform=\"translate("));
        assert!(svg.contains("stroke-dasharray"), "DENY edge should be dashed");
        assert!(svg.contains("marker-end=\"url(#arrow)\""));
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn labels_are_escaped() {
        let (scene, viewport) = scene_fixture();
        let svg = render(&scene, viewport);
        assert!(svg.contains("Read &amp; Write"));
    }
}
