//! The layout orchestration pipeline.
//!
//! [`layout`] is the single entry point: it resolves a placement strategy,
//! then runs the fixed phase sequence around it — port arranging,
//! constraint pre-pass, (hierarchical) placement, constraint enforcement
//! and validation, edge routing, label placing. No phase may be skipped;
//! the only fast path is the constraint passes when the tree carries no
//! constraints at all.

pub(crate) mod avoid;
mod constraints;
mod hierarchy;
mod labels;
mod ports;
mod routing;
mod strategies;

pub use avoid::{AvoidOptions, Obstacle, build_obstacles, route_avoiding};
pub use constraints::ConstraintState;
pub use strategies::{FixedPlacement, GridPlacement};

use crate::error::LayoutError;
use crate::graph::{Edge, Graph, Node};
use crate::options::LayoutOptions;

/// A mutable window over one level of the node tree, handed to placement
/// strategies. Edges are the ones fully internal to this level's subtree.
pub struct GraphView<'a> {
    pub nodes: &'a mut [Node],
    pub edges: &'a [Edge],
    pub options: &'a LayoutOptions,
}

/// The contract every placement strategy satisfies: assign a finite
/// position to every node in the view, leave nodes marked fixed in the
/// [`ConstraintState`] alone, and optionally record assigned layers there.
pub trait PlacementStrategy {
    fn name(&self) -> &'static str;
    fn place(&self, view: &mut GraphView<'_>, state: &mut ConstraintState);
}

fn resolve_strategy(name: &str) -> Option<Box<dyn PlacementStrategy>> {
    match name {
        "grid" => Some(Box::new(GridPlacement)),
        "fixed" => Some(Box::new(FixedPlacement)),
        _ => None,
    }
}

/// Lay out the graph with the strategy named by its `algorithm` option
/// (default `"grid"`). Mutates in place; the graph handle itself is the
/// result.
pub fn layout(graph: &mut Graph) -> Result<(), LayoutError> {
    let name = graph.options.get_str("algorithm").unwrap_or("grid").to_string();
    let strategy =
        resolve_strategy(&name).ok_or_else(|| LayoutError::UnknownStrategy(name.clone()))?;
    layout_with(graph, strategy.as_ref())
}

/// Lay out the graph with a caller-supplied placement strategy.
///
/// Fatal configuration problems (a relative-position reference cycle) are
/// rejected here, before any mutation; every later problem degrades
/// gracefully per edge or per node.
pub fn layout_with(
    graph: &mut Graph,
    strategy: &dyn PlacementStrategy,
) -> Result<(), LayoutError> {
    if let Some(id) = constraints::find_relative_cycle(&graph.children) {
        return Err(LayoutError::RelativeCycle(id));
    }
    let mut state = ConstraintState::new();
    run_pipeline(graph, strategy, &mut state);
    Ok(())
}

pub(crate) fn run_pipeline(
    graph: &mut Graph,
    strategy: &dyn PlacementStrategy,
    state: &mut ConstraintState,
) {
    // 1. Ports, over every direct child.
    for node in &mut graph.children {
        ports::arrange_ports(node);
    }

    // 2. Constraint pre-pass.
    let constrained = constraints::tree_has_constraints(&graph.children);
    if constrained {
        constraints::pre_layout(&graph.children, state);
    }

    // 3. Placement, recursing through the hierarchy when needed.
    let hierarchical =
        graph.is_hierarchical() || graph.options.get_bool("hierarchical").unwrap_or(false);
    if hierarchical {
        hierarchy::layout_hierarchical(graph, strategy, state);
    } else {
        let mut view = GraphView {
            nodes: &mut graph.children,
            edges: &graph.edges,
            options: &graph.options,
        };
        strategy.place(&mut view, state);
    }

    // 4. Constraint enforcement: fixed restore first, then the
    //    position-dependent constraints, then validation.
    if constrained {
        constraints::restore_fixed(&mut graph.children, state);
        constraints::apply_relative(&mut graph.children);
        constraints::apply_alignment(&mut graph.children);
        for violation in constraints::validate(&graph.children, state) {
            log::warn!("constraint violation: {violation}");
        }
    }

    // 5. Edge routing.
    routing::route_edges(graph);
    if hierarchical {
        hierarchy::patch_cross_level_edges(graph);
    }

    // 6. Labels.
    if !graph
        .options
        .get_bool("label_placement_disabled")
        .unwrap_or(false)
    {
        labels::place_labels(graph);
    }

    update_graph_size(graph);
}

fn update_graph_size(graph: &mut Graph) {
    let mut max_x = 0.0f32;
    let mut max_y = 0.0f32;
    for node in &graph.children {
        let pos = node.pos();
        max_x = max_x.max(pos.x + node.width);
        max_y = max_y.max(pos.y + node.height);
    }
    graph.width = Some(max_x);
    graph.height = Some(max_y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeConstraints;

    #[test]
    fn layout_places_every_node() {
        let mut graph = Graph::new();
        graph.children.push(Node::new("a", 50.0, 50.0));
        graph.children.push(Node::new("b", 50.0, 50.0));
        graph.edges.push(Edge::new("e", "a", "b"));
        layout(&mut graph).unwrap();
        for node in &graph.children {
            assert!(node.x.is_some() && node.y.is_some());
        }
        assert_eq!(graph.edges[0].sections.len(), 1);
        assert!(graph.width.unwrap() > 0.0);
    }

    #[test]
    fn unknown_strategy_is_fatal_before_mutation() {
        let mut graph = Graph::new();
        graph.children.push(Node::new("a", 50.0, 50.0));
        graph.options.set("algorithm", "sugiyama-deluxe");
        let err = layout(&mut graph).unwrap_err();
        assert_eq!(
            err,
            LayoutError::UnknownStrategy("sugiyama-deluxe".to_string())
        );
        // Nothing moved.
        assert!(graph.children[0].x.is_none());
    }

    #[test]
    fn relative_cycle_is_fatal_before_mutation() {
        let mut graph = Graph::new();
        let mut a = Node::new("a", 10.0, 10.0);
        a.constraints = Some(NodeConstraints::relative("b", 1.0, 0.0));
        let mut b = Node::new("b", 10.0, 10.0);
        b.constraints = Some(NodeConstraints::relative("a", 1.0, 0.0));
        graph.children.push(a);
        graph.children.push(b);
        let err = layout(&mut graph).unwrap_err();
        assert!(matches!(err, LayoutError::RelativeCycle(_)));
        assert!(graph.children[0].x.is_none());
    }

    #[test]
    fn empty_graph_is_a_no_op() {
        let mut graph = Graph::new();
        layout(&mut graph).unwrap();
        assert_eq!(graph.width, Some(0.0));
        assert_eq!(graph.height, Some(0.0));
    }

    #[test]
    fn single_zero_size_node_degenerates_cleanly() {
        let mut graph = Graph::new();
        graph.children.push(Node::new("dot", 0.0, 0.0));
        layout(&mut graph).unwrap();
        assert_eq!(graph.children[0].x, Some(0.0));
    }

    #[test]
    fn hierarchical_option_forces_recursion_path() {
        let mut graph = Graph::new();
        graph.children.push(Node::new("a", 20.0, 20.0));
        graph.options.set("hierarchical", true);
        layout(&mut graph).unwrap();
        assert!(graph.children[0].x.is_some());
    }

    #[test]
    fn label_placement_can_be_disabled() {
        let mut graph = Graph::new();
        let mut node = Node::new("a", 100.0, 50.0);
        node.labels.push(crate::graph::Label::new("t", 10.0, 10.0));
        graph.children.push(node);
        graph.options.set("label.placement.disabled", true);
        layout(&mut graph).unwrap();
        // Label stays at its default origin.
        assert_eq!(graph.children[0].labels[0].x, 0.0);
    }
}
