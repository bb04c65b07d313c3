//! Label placement: runs last, once node positions and edge routes are
//! final. Node labels center inside their node, port labels sit just
//! outside the port on its side, edge labels anchor at the route midpoint
//! with a small perpendicular clearance.

use crate::geometry::{Point, polyline_midpoint};
use crate::graph::{Graph, Node};
use crate::options::PortSide;

/// Clearance between an edge path and its label box.
const EDGE_LABEL_CLEARANCE: f32 = 4.0;
/// Gap between a port and its label.
const PORT_LABEL_GAP: f32 = 2.0;

pub(crate) fn place_labels(graph: &mut Graph) {
    for node in &mut graph.children {
        place_node_labels(node);
    }
    for edge in &mut graph.edges {
        let Some(section) = edge.sections.first() else {
            continue;
        };
        let mut path = Vec::with_capacity(section.bend_points.len() + 2);
        path.push(section.start);
        path.extend(section.bend_points.iter().copied());
        path.push(section.end);
        let Some(mid) = polyline_midpoint(&path) else {
            continue;
        };
        for label in &mut edge.labels {
            label.x = mid.x - label.width / 2.0;
            label.y = mid.y - label.height - EDGE_LABEL_CLEARANCE;
        }
    }
}

fn place_node_labels(node: &mut Node) {
    let width = node.width;
    let height = node.height;
    for label in &mut node.labels {
        label.x = (width - label.width) / 2.0;
        label.y = (height - label.height) / 2.0;
    }
    for port in &mut node.ports {
        let anchor = Point::new(port.x, port.y);
        for label in &mut port.labels {
            let (x, y) = match port.side {
                PortSide::North => (anchor.x - label.width / 2.0, anchor.y - label.height - PORT_LABEL_GAP),
                PortSide::South => (anchor.x - label.width / 2.0, anchor.y + PORT_LABEL_GAP),
                PortSide::East => (anchor.x + PORT_LABEL_GAP, anchor.y - label.height / 2.0),
                PortSide::West | PortSide::Undefined => {
                    (anchor.x - label.width - PORT_LABEL_GAP, anchor.y - label.height / 2.0)
                }
            };
            label.x = x;
            label.y = y;
        }
    }
    for child in &mut node.children {
        place_node_labels(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, EdgeSection, Label, Port};

    #[test]
    fn node_label_centers_in_node() {
        let mut graph = Graph::new();
        let mut node = Node::new("n", 100.0, 60.0).at(0.0, 0.0);
        node.labels.push(Label::new("title", 40.0, 10.0));
        graph.children.push(node);
        place_labels(&mut graph);
        let label = &graph.children[0].labels[0];
        assert_eq!(label.x, 30.0);
        assert_eq!(label.y, 25.0);
    }

    #[test]
    fn edge_label_sits_at_route_midpoint() {
        let mut graph = Graph::new();
        let mut edge = Edge::new("e", "a", "b");
        edge.labels.push(Label::new("flow", 20.0, 10.0));
        edge.sections.push(EdgeSection {
            id: "e_s0".to_string(),
            start: Point::new(0.0, 0.0),
            end: Point::new(100.0, 0.0),
            bend_points: Vec::new(),
        });
        graph.edges.push(edge);
        place_labels(&mut graph);
        let label = &graph.edges[0].labels[0];
        assert_eq!(label.x, 40.0);
        assert_eq!(label.y, -14.0);
    }

    #[test]
    fn east_port_label_sits_outside() {
        let mut graph = Graph::new();
        let mut node = Node::new("n", 50.0, 50.0).at(0.0, 0.0);
        let mut port = Port::new("n.p");
        port.side = crate::options::PortSide::East;
        port.x = 50.0;
        port.y = 25.0;
        port.labels.push(Label::new("out", 16.0, 8.0));
        node.ports.push(port);
        graph.children.push(node);
        place_labels(&mut graph);
        let label = &graph.children[0].ports[0].labels[0];
        assert_eq!(label.x, 52.0);
        assert_eq!(label.y, 21.0);
    }
}
