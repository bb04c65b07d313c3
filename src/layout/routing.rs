//! Edge routing: per-edge dispatch between the self-loop router and the
//! configured style router (orthogonal, polyline, splines, or the
//! obstacle-avoiding A* router).

use std::collections::HashMap;

use crate::geometry::{Point, spline_controls, spline_controls_axis};
use crate::graph::{Edge, EdgeSection, Endpoint, Graph};
use crate::options::{DEFAULT_SPLINE_CURVATURE, EdgeRouting, PortSide};

use super::avoid::{AvoidOptions, Obstacle, build_obstacles, route_avoiding};

// ── Self-loop geometry ──────────────────────────────────────────────
/// Gap between the two boundary anchors of a self-loop.
const SELF_LOOP_ANCHOR_GAP: f32 = 10.0;
/// Offset step between nested self-loops on one node: loop n gets
/// `20 * (n + 1)`, so loops nest outward without overlapping.
const SELF_LOOP_OFFSET_STEP: f32 = 20.0;

pub(crate) fn route_edges(graph: &mut Graph) {
    // Self-loops on one node are indexed by their position within the
    // ordered edge list, which keeps nesting stable across calls.
    let mut loop_counters: HashMap<String, usize> = HashMap::new();
    let mut avoid_ctx: Option<(Vec<Obstacle>, AvoidOptions)> = None;

    let mut edges = std::mem::take(&mut graph.edges);
    for edge in &mut edges {
        route_edge(graph, edge, &mut loop_counters, &mut avoid_ctx);
    }
    graph.edges = edges;
}

fn resolve_style(edge: &Edge, graph: &Graph) -> EdgeRouting {
    edge.options
        .edge_routing()
        .or_else(|| graph.options.edge_routing())
        .unwrap_or_default()
}

fn route_edge(
    graph: &Graph,
    edge: &mut Edge,
    loop_counters: &mut HashMap<String, usize>,
    avoid_ctx: &mut Option<(Vec<Obstacle>, AvoidOptions)>,
) {
    let (Some(source_id), Some(target_id)) = (edge.source_id(), edge.target_id()) else {
        log::warn!("edge '{}' is missing an endpoint id; skipping", edge.id);
        return;
    };
    let Some(source) = graph.resolve_endpoint(source_id) else {
        log::warn!(
            "edge '{}' references unknown endpoint '{}'; skipping",
            edge.id,
            source_id
        );
        return;
    };
    let Some(target) = graph.resolve_endpoint(target_id) else {
        log::warn!(
            "edge '{}' references unknown endpoint '{}'; skipping",
            edge.id,
            target_id
        );
        return;
    };

    let style = resolve_style(edge, graph);

    if source.node.id == target.node.id {
        let count = loop_counters.entry(source.node.id.clone()).or_insert(0);
        let offset = SELF_LOOP_OFFSET_STEP * (*count + 1) as f32;
        *count += 1;
        let (start, end, bends) = self_loop_geometry(graph, edge, source, target, style, offset);
        set_section(edge, start, end, bends);
        return;
    }

    let start = source.anchor();
    let end = target.anchor();
    let bends = match style {
        EdgeRouting::Orthogonal => orthogonal_bends(&source, &target, start, end),
        EdgeRouting::Polyline => Vec::new(),
        EdgeRouting::Splines => {
            let curvature = edge
                .options
                .get_f32("spline_curvature")
                .or_else(|| graph.options.get_f32("spline_curvature"))
                .unwrap_or(DEFAULT_SPLINE_CURVATURE);
            let direction = edge
                .options
                .direction()
                .or_else(|| graph.options.direction());
            let (c1, c2) = match direction {
                Some(dir) => spline_controls_axis(start, end, dir.is_horizontal(), curvature),
                None => spline_controls(start, end, curvature),
            };
            vec![c1, c2]
        }
        EdgeRouting::Libavoid => {
            let (obstacles, options) = avoid_ctx.get_or_insert_with(|| {
                let options = AvoidOptions {
                    padding: graph
                        .options
                        .get_f32("routing_padding")
                        .unwrap_or_else(|| AvoidOptions::default().padding),
                    segment_penalty: graph
                        .options
                        .get_f32("segment_penalty")
                        .unwrap_or_else(|| AvoidOptions::default().segment_penalty),
                    bend_penalty: graph
                        .options
                        .get_f32("bend_penalty")
                        .unwrap_or_else(|| AvoidOptions::default().bend_penalty),
                    max_steps: AvoidOptions::default().max_steps,
                };
                (build_obstacles(&graph.children, options.padding), options)
            });
            let path = route_avoiding(start, end, obstacles, options);
            path[1..path.len().saturating_sub(1)].to_vec()
        }
    };
    set_section(edge, start, end, bends);
}

fn set_section(edge: &mut Edge, start: Point, end: Point, bend_points: Vec<Point>) {
    edge.sections = vec![EdgeSection {
        id: format!("{}_s0", edge.id),
        start,
        end,
        bend_points,
    }];
}

/// Bend points for the default orthogonal style. Port-to-port edges use a
/// fixed table keyed on the pair of port sides; everything else gets the
/// generic two-bend jog through the horizontal midpoint.
fn orthogonal_bends(source: &Endpoint, target: &Endpoint, start: Point, end: Point) -> Vec<Point> {
    if let (Some(sp), Some(tp)) = (source.port, target.port)
        && sp.side != PortSide::Undefined
        && tp.side != PortSide::Undefined
    {
        if sp.side.is_horizontal_axis() == tp.side.is_horizontal_axis() {
            // Same-axis pair: one midpoint bend.
            return vec![start.midpoint(end)];
        }
        // Perpendicular pair: one L-bend at target x / source y.
        return vec![Point::new(end.x, start.y)];
    }
    let mid_x = (start.x + end.x) / 2.0;
    compress(start, vec![Point::new(mid_x, start.y), Point::new(mid_x, end.y)], end)
}

/// Drop duplicate and collinear jog vertices (a horizontal edge needs no
/// bend at all).
fn compress(start: Point, bends: Vec<Point>, end: Point) -> Vec<Point> {
    let mut chain = Vec::with_capacity(bends.len() + 2);
    chain.push(start);
    chain.extend(bends);
    chain.push(end);

    let mut out: Vec<Point> = Vec::new();
    for idx in 1..chain.len() - 1 {
        let prev = *out.last().unwrap_or(&chain[0]);
        let curr = chain[idx];
        let next = chain[idx + 1];
        if curr.approx_eq(prev) {
            continue;
        }
        let collinear = ((curr.x - prev.x).abs() <= 1e-4 && (next.x - curr.x).abs() <= 1e-4)
            || ((curr.y - prev.y).abs() <= 1e-4 && (next.y - curr.y).abs() <= 1e-4);
        if collinear {
            continue;
        }
        out.push(curr);
    }
    out
}

fn self_loop_geometry(
    graph: &Graph,
    edge: &Edge,
    source: Endpoint<'_>,
    target: Endpoint<'_>,
    style: EdgeRouting,
    offset: f32,
) -> (Point, Point, Vec<Point>) {
    // Port-anchored loops key off the two ports' sides instead of the
    // whole-node boundary.
    if let (Some(sp), Some(tp)) = (source.port, target.port) {
        let start = source.anchor();
        let end = target.anchor();
        let s_side = defined_or_east(sp.side);
        let t_side = defined_or_east(tp.side);
        let (sox, soy) = s_side.outward();
        let (tox, toy) = t_side.outward();
        let s_out = start.offset(sox * offset, soy * offset);
        let t_out = end.offset(tox * offset, toy * offset);
        if s_side == t_side {
            // Same side: one extension distance out and back.
            return (start, end, vec![s_out, t_out]);
        }
        // Different sides: an L-path through the implied corner.
        let corner = if s_side.is_horizontal_axis() {
            Point::new(s_out.x, t_out.y)
        } else {
            Point::new(t_out.x, s_out.y)
        };
        return (start, end, vec![s_out, corner, t_out]);
    }

    let node = source.node;
    let side = edge
        .options
        .self_loop_side()
        .or_else(|| node.options.self_loop_side())
        .or_else(|| graph.options.self_loop_side())
        .unwrap_or(PortSide::East);

    let rect = node.rect();
    let center = rect.center();
    let side_center = match side {
        PortSide::North => Point::new(center.x, rect.y),
        PortSide::South => Point::new(center.x, rect.y + rect.height),
        PortSide::East | PortSide::Undefined => Point::new(rect.x + rect.width, center.y),
        PortSide::West => Point::new(rect.x, center.y),
    };
    let (ax, ay) = side.along();
    let (ox, oy) = side.outward();
    let gap = SELF_LOOP_ANCHOR_GAP / 2.0;
    let start = side_center.offset(-ax * gap, -ay * gap);
    let end = side_center.offset(ax * gap, ay * gap);

    match style {
        EdgeRouting::Splines => {
            // Two control points on a circular arc of radius
            // (width + height) / 4 + offset.
            let radius = (node.width + node.height) / 4.0 + offset;
            let c1 = start.offset(ox * radius, oy * radius);
            let c2 = end.offset(ox * radius, oy * radius);
            (start, end, vec![c1, c2])
        }
        _ => {
            // Four bends: the corners of a rectangle extending `offset`
            // beyond the anchors on both axes.
            let b1 = start.offset(-ax * offset, -ay * offset);
            let b2 = b1.offset(ox * offset, oy * offset);
            let span = SELF_LOOP_ANCHOR_GAP + 2.0 * offset;
            let b3 = b2.offset(ax * span, ay * span);
            let b4 = b3.offset(-ox * offset, -oy * offset);
            (start, end, vec![b1, b2, b3, b4])
        }
    }
}

fn defined_or_east(side: PortSide) -> PortSide {
    if side == PortSide::Undefined {
        PortSide::East
    } else {
        side
    }
}
