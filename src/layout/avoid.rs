//! Obstacle-avoiding edge routing: A* over the implicit 4-connected grid
//! spanned by the padded node bounding boxes, followed by a greedy
//! bend-minimization pass.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::geometry::{Point, Rect};
use crate::graph::Node;

// ── A* tuning ───────────────────────────────────────────────────────
/// Default obstacle padding and grid step.
const DEFAULT_ROUTING_PADDING: f32 = 10.0;
/// Fixed cost added per step taken.
const DEFAULT_SEGMENT_PENALTY: f32 = 1.0;
/// Extra cost when a step changes direction.
const DEFAULT_BEND_PENALTY: f32 = 2.0;
/// Hard cap on expanded states before falling back to a direct path.
const DEFAULT_MAX_STEPS: usize = 50_000;
/// Integer scale so costs fit in u32 ordering.
const COST_SCALE: f32 = 100.0;
/// Extra grid margin around the obstacle extent, in steps.
const GRID_MARGIN_STEPS: f32 = 4.0;

/// A padded node bounding box the router must not cross.
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy)]
pub struct AvoidOptions {
    pub padding: f32,
    pub segment_penalty: f32,
    pub bend_penalty: f32,
    pub max_steps: usize,
}

impl Default for AvoidOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_ROUTING_PADDING,
            segment_penalty: DEFAULT_SEGMENT_PENALTY,
            bend_penalty: DEFAULT_BEND_PENALTY,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Expand every top-level node into a padded obstacle box.
pub fn build_obstacles(nodes: &[Node], padding: f32) -> Vec<Obstacle> {
    nodes
        .iter()
        .filter(|node| node.width > 0.0 && node.height > 0.0)
        .map(|node| Obstacle {
            id: node.id.clone(),
            rect: node.rect().expand(padding),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GridState {
    x: i32,
    y: i32,
    /// Incoming direction index, 4 at the start.
    dir: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GridEntry {
    est: u32,
    cost: u32,
    state: GridState,
}

// Reverse ordering so the BinaryHeap pops the cheapest estimate, with
// deterministic tie-breaking.
impl Ord for GridEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .est
            .cmp(&self.est)
            .then_with(|| other.cost.cmp(&self.cost))
            .then_with(|| self.state.y.cmp(&other.state.y))
            .then_with(|| self.state.x.cmp(&other.state.x))
            .then_with(|| self.state.dir.cmp(&other.state.dir))
    }
}

impl PartialOrd for GridEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Route from `start` to `end` around `obstacles`. The returned chain
/// always begins at `start` and ends at `end`; when the search exhausts
/// without reaching the goal it degrades to the direct two-point path.
pub fn route_avoiding(
    start: Point,
    end: Point,
    obstacles: &[Obstacle],
    options: &AvoidOptions,
) -> Vec<Point> {
    let step = options.padding.max(1.0);

    // Obstacles containing an endpoint (typically the endpoint's own node
    // box) cannot be avoided and are excluded from blocking tests.
    let active: Vec<&Obstacle> = obstacles
        .iter()
        .filter(|obs| !obs.rect.contains(start) && !obs.rect.contains(end))
        .collect();
    if active.is_empty() {
        return vec![start, end];
    }

    let goal = (
        ((end.x - start.x) / step).round() as i32,
        ((end.y - start.y) / step).round() as i32,
    );
    if goal == (0, 0) {
        return vec![start, end];
    }

    // Search bounds: the obstacle extent plus a margin, so detours can
    // leave the populated area but the search stays finite.
    let mut min_x = start.x.min(end.x);
    let mut min_y = start.y.min(end.y);
    let mut max_x = start.x.max(end.x);
    let mut max_y = start.y.max(end.y);
    for obs in &active {
        min_x = min_x.min(obs.rect.x);
        min_y = min_y.min(obs.rect.y);
        max_x = max_x.max(obs.rect.x + obs.rect.width);
        max_y = max_y.max(obs.rect.y + obs.rect.height);
    }
    let margin = step * GRID_MARGIN_STEPS;
    min_x -= margin;
    min_y -= margin;
    max_x += margin;
    max_y += margin;

    let point_of = |ix: i32, iy: i32| -> Point {
        Point::new(start.x + ix as f32 * step, start.y + iy as f32 * step)
    };
    let blocked = |from: Point, to: Point| -> bool {
        active.iter().any(|obs| obs.rect.intersects_segment(from, to))
    };

    let dirs: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
    let step_cost = ((step + options.segment_penalty) * COST_SCALE).round() as u32;
    let bend_cost = (options.bend_penalty * COST_SCALE).round() as u32;

    let mut best: HashMap<GridState, u32> = HashMap::new();
    let mut came_from: HashMap<GridState, GridState> = HashMap::new();
    let mut heap = BinaryHeap::new();

    let start_state = GridState { x: 0, y: 0, dir: 4 };
    best.insert(start_state, 0);
    heap.push(GridEntry {
        est: 0,
        cost: 0,
        state: start_state,
    });

    let mut reached: Option<GridState> = None;
    let mut expanded = 0usize;

    while let Some(entry) = heap.pop() {
        expanded += 1;
        if expanded > options.max_steps {
            break;
        }
        let GridEntry { cost, state, .. } = entry;
        if best.get(&state).copied().unwrap_or(u32::MAX) != cost {
            continue;
        }
        if (state.x, state.y) == goal {
            reached = Some(state);
            break;
        }
        let here = point_of(state.x, state.y);
        for (dir_idx, (dx, dy)) in dirs.iter().enumerate() {
            let nx = state.x + dx;
            let ny = state.y + dy;
            let next_point = point_of(nx, ny);
            if next_point.x < min_x
                || next_point.y < min_y
                || next_point.x > max_x
                || next_point.y > max_y
            {
                continue;
            }
            if blocked(here, next_point) {
                continue;
            }
            let mut next_cost = cost.saturating_add(step_cost);
            if state.dir != 4 && state.dir != dir_idx as u8 {
                next_cost = next_cost.saturating_add(bend_cost);
            }
            let next_state = GridState {
                x: nx,
                y: ny,
                dir: dir_idx as u8,
            };
            if next_cost >= best.get(&next_state).copied().unwrap_or(u32::MAX) {
                continue;
            }
            best.insert(next_state, next_cost);
            came_from.insert(next_state, state);
            let manhattan = ((nx - goal.0).unsigned_abs() + (ny - goal.1).unsigned_abs())
                .saturating_mul((step * COST_SCALE).round() as u32);
            heap.push(GridEntry {
                est: next_cost.saturating_add(manhattan),
                cost: next_cost,
                state: next_state,
            });
        }
    }

    let Some(goal_state) = reached else {
        log::debug!("obstacle router found no path, falling back to direct segment");
        return vec![start, end];
    };

    let mut chain: Vec<Point> = Vec::new();
    let mut cursor = goal_state;
    loop {
        chain.push(point_of(cursor.x, cursor.y));
        match came_from.get(&cursor) {
            Some(prev) => cursor = *prev,
            None => break,
        }
    }
    chain.reverse();
    // Snap the endpoints to the exact coordinates.
    if let Some(first) = chain.first_mut() {
        *first = start;
    }
    if let Some(last) = chain.last_mut() {
        *last = end;
    } else {
        chain.push(end);
    }
    if chain.len() == 1 {
        chain.push(end);
    }

    minimize_bends(&chain, &active)
}

/// Greedy furthest-visible-point simplification: from each kept point,
/// scan backward from the path's end for the farthest point reachable in
/// a straight unobstructed line, keep it, repeat.
fn minimize_bends(points: &[Point], active: &[&Obstacle]) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let clear = |from: Point, to: Point| -> bool {
        !active.iter().any(|obs| obs.rect.intersects_segment(from, to))
    };
    let mut out = vec![points[0]];
    let mut i = 0usize;
    while i < points.len() - 1 {
        let mut j = points.len() - 1;
        while j > i + 1 && !clear(points[i], points[j]) {
            j -= 1;
        }
        out.push(points[j]);
        i = j;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obstacle(id: &str, x: f32, y: f32, w: f32, h: f32) -> Obstacle {
        Obstacle {
            id: id.to_string(),
            rect: Rect::new(x, y, w, h),
        }
    }

    fn path_avoids(points: &[Point], rect: &Rect) -> bool {
        points
            .windows(2)
            .all(|w| !rect.contains_strict(w[0].midpoint(w[1])))
    }

    #[test]
    fn clear_field_routes_directly() {
        let obstacles = vec![obstacle("far", 500.0, 500.0, 50.0, 50.0)];
        let path = route_avoiding(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            &obstacles,
            &AvoidOptions::default(),
        );
        assert_eq!(path.first().copied(), Some(Point::new(0.0, 0.0)));
        assert_eq!(path.last().copied(), Some(Point::new(100.0, 0.0)));
        // Straight shot: the simplification collapses it to two points.
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn detours_around_blocking_obstacle() {
        let block = obstacle("wall", 40.0, -30.0, 20.0, 60.0);
        let rect = block.rect;
        let path = route_avoiding(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            &[block],
            &AvoidOptions::default(),
        );
        assert!(path.len() > 2, "expected a detour, got {path:?}");
        assert!(path_avoids(&path, &rect), "path crosses obstacle: {path:?}");
    }

    #[test]
    fn endpoint_obstacles_do_not_block() {
        // Both endpoints sit inside their own node's padded box.
        let obstacles = vec![
            obstacle("a", -10.0, -10.0, 20.0, 20.0),
            obstacle("b", 90.0, -10.0, 20.0, 20.0),
        ];
        let path = route_avoiding(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            &obstacles,
            &AvoidOptions::default(),
        );
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn deterministic_across_runs() {
        let obstacles = vec![obstacle("wall", 40.0, -30.0, 20.0, 60.0)];
        let a = route_avoiding(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            &obstacles,
            &AvoidOptions::default(),
        );
        let b = route_avoiding(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            &obstacles,
            &AvoidOptions::default(),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn impossible_route_falls_back_to_direct() {
        // Goal is fully walled in.
        let obstacles = vec![
            obstacle("n", 60.0, -80.0, 80.0, 20.0),
            obstacle("s", 60.0, 60.0, 80.0, 20.0),
            obstacle("w", 60.0, -80.0, 20.0, 160.0),
            obstacle("e", 120.0, -80.0, 20.0, 160.0),
        ];
        let path = route_avoiding(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            &obstacles,
            &AvoidOptions::default(),
        );
        assert_eq!(path, vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
    }

    #[test]
    fn bend_minimization_collapses_collinear_runs() {
        let active: Vec<&Obstacle> = Vec::new();
        let staircase = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(30.0, 0.0),
        ];
        let out = minimize_bends(&staircase, &active);
        assert_eq!(out, vec![Point::new(0.0, 0.0), Point::new(30.0, 0.0)]);
    }
}
