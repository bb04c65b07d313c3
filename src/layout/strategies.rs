//! Built-in placement strategies. These are deliberately simple: the
//! aesthetic placement heuristics are external collaborators, and the
//! library only needs enough to be usable standalone. Callers plug richer
//! strategies in through [`super::layout_with`].

use crate::options::DEFAULT_NODE_SPACING;

use super::{ConstraintState, GraphView, PlacementStrategy};

/// Row-major grid over the direct children, skipping fixed nodes.
pub struct GridPlacement;

impl PlacementStrategy for GridPlacement {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn place(&self, view: &mut GraphView<'_>, state: &mut ConstraintState) {
        let spacing = view
            .options
            .get_f32("spacing_node_node")
            .unwrap_or(DEFAULT_NODE_SPACING);
        let movable = view
            .nodes
            .iter()
            .filter(|node| !state.is_fixed(&node.id))
            .count();
        if movable == 0 {
            return;
        }
        let columns = (movable as f32).sqrt().ceil().max(1.0) as usize;

        let mut x = 0.0f32;
        let mut y = 0.0f32;
        let mut row_height = 0.0f32;
        let mut column = 0usize;
        for node in view.nodes.iter_mut() {
            if state.is_fixed(&node.id) {
                continue;
            }
            node.set_pos(x, y);
            row_height = row_height.max(node.height);
            column += 1;
            if column >= columns {
                column = 0;
                x = 0.0;
                y += row_height + spacing;
                row_height = 0.0;
            } else {
                x += node.width + spacing;
            }
        }
    }
}

/// Trusts caller-supplied coordinates and only zero-fills missing ones.
pub struct FixedPlacement;

impl PlacementStrategy for FixedPlacement {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn place(&self, view: &mut GraphView<'_>, _state: &mut ConstraintState) {
        for node in view.nodes.iter_mut() {
            if node.x.is_none() || node.y.is_none() {
                let pos = node.pos();
                node.set_pos(pos.x, pos.y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;
    use crate::options::LayoutOptions;

    #[test]
    fn grid_assigns_every_movable_node() {
        let mut nodes = vec![
            Node::new("a", 50.0, 50.0),
            Node::new("b", 50.0, 50.0),
            Node::new("c", 50.0, 50.0),
            Node::new("d", 50.0, 50.0),
        ];
        let options = LayoutOptions::new();
        let edges = Vec::new();
        let mut view = GraphView {
            nodes: &mut nodes,
            edges: &edges,
            options: &options,
        };
        let mut state = ConstraintState::new();
        GridPlacement.place(&mut view, &mut state);
        for node in &nodes {
            assert!(node.x.is_some() && node.y.is_some());
        }
        // Four nodes form a 2x2 grid.
        assert_eq!(nodes[0].pos().x, 0.0);
        assert_eq!(nodes[1].pos().x, 90.0);
        assert_eq!(nodes[2].pos().y, 90.0);
    }

    #[test]
    fn grid_respects_spacing_option() {
        let mut nodes = vec![Node::new("a", 10.0, 10.0), Node::new("b", 10.0, 10.0)];
        let options = LayoutOptions::new().with("elk.spacing.nodeNode", 5.0);
        let edges = Vec::new();
        let mut view = GraphView {
            nodes: &mut nodes,
            edges: &edges,
            options: &options,
        };
        let mut state = ConstraintState::new();
        GridPlacement.place(&mut view, &mut state);
        assert_eq!(nodes[1].pos().x, 15.0);
    }

    #[test]
    fn fixed_strategy_zero_fills_only_missing() {
        let mut nodes = vec![
            Node::new("placed", 10.0, 10.0).at(7.0, 8.0),
            Node::new("unplaced", 10.0, 10.0),
        ];
        let options = LayoutOptions::new();
        let edges = Vec::new();
        let mut view = GraphView {
            nodes: &mut nodes,
            edges: &edges,
            options: &options,
        };
        let mut state = ConstraintState::new();
        FixedPlacement.place(&mut view, &mut state);
        assert_eq!(nodes[0].pos().x, 7.0);
        assert_eq!(nodes[1].x, Some(0.0));
    }
}
