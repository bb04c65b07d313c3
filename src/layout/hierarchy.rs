//! Recursive layout of nested node subtrees.
//!
//! Children are laid out post-order: each hierarchical node's subtree is
//! moved into an ephemeral child graph (no copies), run through the full
//! pipeline, and moved back; then the parent level gets its own flat
//! placement. Padding is applied bottom-up so every parent encloses its
//! children.

use std::collections::HashSet;

use crate::graph::{Edge, Graph, Node};

use super::constraints::ConstraintState;
use super::{GraphView, PlacementStrategy, run_pipeline};

pub(crate) fn layout_hierarchical(
    graph: &mut Graph,
    strategy: &dyn PlacementStrategy,
    state: &mut ConstraintState,
) {
    let edges = std::mem::take(&mut graph.edges);
    for child in &mut graph.children {
        layout_subtree(child, &edges, strategy, state);
    }
    graph.edges = edges;

    // The parent's own flat placement step, over direct children only.
    let mut view = GraphView {
        nodes: &mut graph.children,
        edges: &graph.edges,
        options: &graph.options,
    };
    strategy.place(&mut view, state);
}

fn layout_subtree(
    node: &mut Node,
    all_edges: &[Edge],
    strategy: &dyn PlacementStrategy,
    state: &mut ConstraintState,
) {
    if node.children.is_empty() {
        return;
    }
    let edges = internal_edges(node, all_edges);
    let mut sub = Graph {
        children: std::mem::take(&mut node.children),
        edges,
        width: None,
        height: None,
        options: node.options.clone(),
    };
    // Recursion depth equals hierarchy depth here.
    run_pipeline(&mut sub, strategy, state);
    node.children = sub.children;
    apply_padding(node, state);
}

/// Edges whose both routed endpoints live inside this subtree. They are
/// cloned into the ephemeral child graph so a placement strategy can see
/// them; their routed geometry is discarded with the view (the root pass
/// re-routes every real edge in final coordinates).
fn internal_edges(node: &Node, all_edges: &[Edge]) -> Vec<Edge> {
    let mut ids: HashSet<&str> = HashSet::new();
    collect_ids(&node.children, &mut ids);
    all_edges
        .iter()
        .filter(|edge| {
            matches!(
                (edge.source_id(), edge.target_id()),
                (Some(source), Some(target)) if ids.contains(source) && ids.contains(target)
            )
        })
        .cloned()
        .collect()
}

fn collect_ids<'a>(nodes: &'a [Node], out: &mut HashSet<&'a str>) {
    for node in nodes {
        out.insert(node.id.as_str());
        for port in &node.ports {
            out.insert(port.id.as_str());
        }
        collect_ids(&node.children, out);
    }
}

/// Shift movable children so none has a negative coordinate, then grow the
/// parent to enclose every child plus its padding. Pinned children are never
/// shifted: their snapshot position wins over the padding origin, and the
/// parent is sized around wherever they sit.
fn apply_padding(node: &mut Node, state: &ConstraintState) {
    if node.children.is_empty() {
        return;
    }
    let padding = node.options.padding().unwrap_or_default();

    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    for child in &node.children {
        if state.is_fixed(&child.id) {
            continue;
        }
        let pos = child.pos();
        min_x = min_x.min(pos.x);
        min_y = min_y.min(pos.y);
    }
    let (dx, dy) = if min_x == f32::MAX {
        // Every child is pinned.
        (0.0, 0.0)
    } else {
        (padding.left - min_x, padding.top - min_y)
    };
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for child in &mut node.children {
        if !state.is_fixed(&child.id) {
            let pos = child.pos();
            child.set_pos(pos.x + dx, pos.y + dy);
        }
        let pos = child.pos();
        max_x = max_x.max(pos.x + child.width);
        max_y = max_y.max(pos.y + child.height);
    }
    node.width = node.width.max(max_x + padding.right);
    node.height = node.height.max(max_y + padding.bottom);
}

/// Conservative correction for edges whose endpoints live at different
/// hierarchy depths: insert one extra bend at the straight-line midpoint.
/// This is not true clipping at ancestor boundaries.
pub(crate) fn patch_cross_level_edges(graph: &mut Graph) {
    let mut edges = std::mem::take(&mut graph.edges);
    for edge in &mut edges {
        let (Some(source_id), Some(target_id)) = (edge.source_id(), edge.target_id()) else {
            continue;
        };
        let (Some(source_depth), Some(target_depth)) =
            (graph.node_depth(source_id), graph.node_depth(target_id))
        else {
            continue;
        };
        if source_depth == target_depth {
            continue;
        }
        if let Some(section) = edge.sections.first_mut() {
            let mid = section.start.midpoint(section.end);
            let at = section.bend_points.len() / 2;
            section.bend_points.insert(at, mid);
        }
    }
    graph.edges = edges;
}

#[cfg(test)]
mod tests {
    use super::super::strategies::GridPlacement;
    use super::*;

    fn nested_graph() -> Graph {
        let mut parent = Node::new("outer", 0.0, 0.0);
        parent.children.push(Node::new("a", 30.0, 20.0));
        parent.children.push(Node::new("b", 30.0, 20.0));
        let mut graph = Graph::new();
        graph.children.push(parent);
        graph.children.push(Node::new("flat", 40.0, 40.0));
        graph
    }

    #[test]
    fn parent_encloses_children_with_default_padding() {
        let mut graph = nested_graph();
        let strategy = GridPlacement;
        let mut state = ConstraintState::new();
        layout_hierarchical(&mut graph, &strategy, &mut state);

        let outer = graph.find_node("outer").unwrap();
        let mut max_x = 0.0f32;
        let mut max_y = 0.0f32;
        for child in &outer.children {
            let pos = child.pos();
            assert!(pos.x >= 12.0 && pos.y >= 12.0, "child inside padding");
            max_x = max_x.max(pos.x + child.width);
            max_y = max_y.max(pos.y + child.height);
        }
        assert_eq!(outer.width, max_x + 12.0);
        assert_eq!(outer.height, max_y + 12.0);
    }

    #[test]
    fn per_side_padding_map_is_honored() {
        let mut graph = nested_graph();
        graph.children[0]
            .options
            .set("elk.padding", serde_json::json!({"top": 30.0, "left": 4.0}));
        let strategy = GridPlacement;
        let mut state = ConstraintState::new();
        layout_hierarchical(&mut graph, &strategy, &mut state);

        let outer = graph.find_node("outer").unwrap();
        let min_x = outer
            .children
            .iter()
            .map(|c| c.pos().x)
            .fold(f32::MAX, f32::min);
        let min_y = outer
            .children
            .iter()
            .map(|c| c.pos().y)
            .fold(f32::MAX, f32::min);
        assert_eq!(min_x, 4.0);
        assert_eq!(min_y, 30.0);
    }

    #[test]
    fn pinned_nested_child_is_not_shifted_by_padding() {
        let mut outer = Node::new("outer", 0.0, 0.0);
        let mut pin = Node::new("pin", 30.0, 20.0).at(100.0, 20.0);
        pin.constraints = Some(crate::graph::NodeConstraints::fixed());
        outer.children.push(pin);
        outer.children.push(Node::new("a", 30.0, 20.0));
        let mut graph = Graph::new();
        graph.children.push(outer);

        let mut state = ConstraintState::new();
        super::super::constraints::pre_layout(&graph.children, &mut state);
        layout_hierarchical(&mut graph, &GridPlacement, &mut state);

        let outer = graph.find_node("outer").unwrap();
        let pin = outer.children.iter().find(|c| c.id == "pin").unwrap();
        assert_eq!(pin.pos(), crate::geometry::Point::new(100.0, 20.0));
        // Parent is sized around the pinned child, not the padding origin.
        assert_eq!(outer.width, 100.0 + 30.0 + 12.0);
    }

    #[test]
    fn cross_level_edge_gets_midpoint_bend() {
        let mut graph = nested_graph();
        let mut edge = Edge::new("cross", "a", "flat");
        edge.sections.push(crate::graph::EdgeSection {
            id: "cross_s0".to_string(),
            start: crate::geometry::Point::new(0.0, 0.0),
            end: crate::geometry::Point::new(100.0, 100.0),
            bend_points: Vec::new(),
        });
        graph.edges.push(edge);
        patch_cross_level_edges(&mut graph);
        let section = &graph.edges[0].sections[0];
        assert_eq!(
            section.bend_points,
            vec![crate::geometry::Point::new(50.0, 50.0)]
        );
    }

    #[test]
    fn same_level_edge_is_untouched() {
        let mut graph = nested_graph();
        let mut edge = Edge::new("flat_edge", "outer", "flat");
        edge.sections.push(crate::graph::EdgeSection {
            id: "s".to_string(),
            start: crate::geometry::Point::new(0.0, 0.0),
            end: crate::geometry::Point::new(10.0, 0.0),
            bend_points: Vec::new(),
        });
        graph.edges.push(edge);
        patch_cross_level_edges(&mut graph);
        assert!(graph.edges[0].sections[0].bend_points.is_empty());
    }
}
