//! Port side inference, per-side ordering and distribution.
//!
//! Explicit port coordinates are an ordering hint only: once a side is
//! resolved, ports are respaced at equal intervals along it and their
//! coordinates overwritten.

use std::cmp::Ordering;

use crate::graph::Node;
use crate::options::PortSide;

// Side inference candidates in tie-break order: left, right, top, bottom.
const SIDE_ORDER: [PortSide; 4] = [
    PortSide::West,
    PortSide::East,
    PortSide::North,
    PortSide::South,
];

pub(crate) fn arrange_ports(node: &mut Node) {
    if node.ports.is_empty() || node.width <= 0.0 || node.height <= 0.0 {
        return;
    }

    // 1. Infer missing sides from the nearest node edge.
    let width = node.width;
    let height = node.height;
    for port in &mut node.ports {
        if port.side == PortSide::Undefined {
            port.side = nearest_side(port.x, port.y, width, height);
        }
    }

    // 2. Order ports per side: explicit indices first (by index), then the
    //    rest by their coordinate along the side. Ports without an index
    //    get one matching their sorted position.
    for side in SIDE_ORDER {
        let mut members: Vec<usize> = node
            .ports
            .iter()
            .enumerate()
            .filter(|(_, port)| port.side == side)
            .map(|(idx, _)| idx)
            .collect();
        if members.is_empty() {
            continue;
        }
        members.sort_by(|&a, &b| {
            let pa = &node.ports[a];
            let pb = &node.ports[b];
            port_order(pa.index, side_coord(pa.x, pa.y, side))
                .partial_cmp(&port_order(pb.index, side_coord(pb.x, pb.y, side)))
                .unwrap_or(Ordering::Equal)
        });

        // 3. Backfill indices and redistribute at equal spacing
        //    `dimension / (count + 1)` along the side.
        let count = members.len();
        let extent = if side.is_horizontal_axis() {
            height
        } else {
            width
        };
        let spacing = extent / (count as f32 + 1.0);
        for (slot, &port_idx) in members.iter().enumerate() {
            let port = &mut node.ports[port_idx];
            if port.index < 0 {
                port.index = slot as i32;
            }
            let along = spacing * (slot as f32 + 1.0);
            let (x, y) = match side {
                PortSide::North => (along, 0.0),
                PortSide::South => (along, height),
                PortSide::West => (0.0, along),
                PortSide::East => (width, along),
                PortSide::Undefined => unreachable!("sides resolved above"),
            };
            port.x = x;
            port.y = y;
        }
    }
}

fn nearest_side(x: f32, y: f32, width: f32, height: f32) -> PortSide {
    let distances = [x, width - x, y, height - y];
    let mut best = SIDE_ORDER[0];
    let mut best_distance = distances[0];
    for (side, distance) in SIDE_ORDER.iter().zip(distances).skip(1) {
        if distance < best_distance {
            best = *side;
            best_distance = distance;
        }
    }
    best
}

fn side_coord(x: f32, y: f32, side: PortSide) -> f32 {
    if side.is_horizontal_axis() { y } else { x }
}

// Sort key: indexed ports lead, ordered by index; unindexed ports follow,
// ordered by position along the side.
fn port_order(index: i32, coord: f32) -> (u8, f32) {
    if index >= 0 {
        (0, index as f32)
    } else {
        (1, coord)
    }
}
