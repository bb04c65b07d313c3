//! Two-pass constraint processing. The pre-pass records what placement
//! strategies need to see (fixed snapshots, layer intent) before they run;
//! the post-pass enforces what can only be computed once positions exist
//! (fixed restore, relative positioning, alignment) and then validates.
//!
//! All bookkeeping lives in [`ConstraintState`], a side-table keyed by node
//! id that is owned by one layout call. Nothing is written to the domain
//! nodes beyond their coordinates.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::geometry::{EPSILON, Point};
use crate::graph::{AlignDirection, Node};

/// Constraint bookkeeping for one layout call.
#[derive(Debug, Clone, Default)]
pub struct ConstraintState {
    fixed: BTreeMap<String, Point>,
    layers: BTreeMap<String, i32>,
    assigned_layers: BTreeMap<String, i32>,
}

impl ConstraintState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the pre-pass marked this node as immovable. Placement
    /// strategies must not reposition such nodes.
    pub fn is_fixed(&self, id: &str) -> bool {
        self.fixed.contains_key(id)
    }

    pub fn fixed_position(&self, id: &str) -> Option<Point> {
        self.fixed.get(id).copied()
    }

    /// Layer intent stamped by the pre-pass. Enforcing it is the placement
    /// strategy's job.
    pub fn layer(&self, id: &str) -> Option<i32> {
        self.layers.get(id).copied()
    }

    /// Called by a layer-aware strategy to record which layer it actually
    /// put a node in. Layer validation only fires for recorded nodes.
    pub fn record_assigned_layer(&mut self, id: &str, layer: i32) {
        self.assigned_layers.insert(id.to_string(), layer);
    }

    pub fn assigned_layer(&self, id: &str) -> Option<i32> {
        self.assigned_layers.get(id).copied()
    }
}

pub(crate) fn tree_has_constraints(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| {
        node.constraints
            .as_ref()
            .is_some_and(|c| !c.is_empty())
            || tree_has_constraints(&node.children)
    })
}

/// Snapshot fixed positions and stamp layer intent, recursively.
pub(crate) fn pre_layout(nodes: &[Node], state: &mut ConstraintState) {
    for node in nodes {
        if let Some(constraints) = &node.constraints {
            if constraints.fixed_position {
                state.fixed.insert(node.id.clone(), node.pos());
            }
            if let Some(layer) = constraints.layer {
                state.layers.insert(node.id.clone(), layer);
            }
        }
        pre_layout(&node.children, state);
    }
}

/// Rewrite fixed nodes back to their snapshot. Runs right after the
/// placement strategy, before any other post-pass constraint.
pub(crate) fn restore_fixed(nodes: &mut [Node], state: &ConstraintState) {
    for node in nodes {
        if let Some(snapshot) = state.fixed_position(&node.id) {
            node.set_pos(snapshot.x, snapshot.y);
        }
        restore_fixed(&mut node.children, state);
    }
}

/// Detect a `relative_to` reference cycle. Returns an id on the cycle.
/// Purely structural, so it can run before any mutation.
pub(crate) fn find_relative_cycle(nodes: &[Node]) -> Option<String> {
    let mut references: HashMap<&str, &str> = HashMap::new();
    collect_references(nodes, &mut references);
    for start in references.keys() {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = *start;
        while let Some(next) = references.get(current) {
            if !visited.insert(current) {
                return Some(current.to_string());
            }
            current = next;
        }
    }
    None
}

fn collect_references<'a>(nodes: &'a [Node], out: &mut HashMap<&'a str, &'a str>) {
    for node in nodes {
        if let Some(constraints) = &node.constraints
            && let Some(reference) = &constraints.relative_to
        {
            out.insert(node.id.as_str(), reference.as_str());
        }
        collect_references(&node.children, out);
    }
}

struct RelativeEntry {
    id: String,
    reference: String,
    offset: Point,
    priority: i32,
    seq: usize,
}

/// Position every node carrying `relative_to` + `relative_offset` at
/// `reference + offset`, in descending priority order (ties keep input
/// order). A chain only resolves correctly when priorities reflect its
/// depth; that ordering is the caller's responsibility. Missing references
/// are skipped with a warning.
pub(crate) fn apply_relative(nodes: &mut [Node]) {
    let mut entries: Vec<RelativeEntry> = Vec::new();
    let mut positions: HashMap<String, Point> = HashMap::new();
    collect_relative(nodes, &mut entries, &mut positions);
    if entries.is_empty() {
        return;
    }
    entries.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));

    let mut assignments: HashMap<String, Point> = HashMap::new();
    for entry in &entries {
        let Some(reference) = positions.get(&entry.reference).copied() else {
            log::warn!(
                "relative-position reference '{}' of node '{}' does not exist; skipping",
                entry.reference,
                entry.id
            );
            continue;
        };
        let placed = Point::new(reference.x + entry.offset.x, reference.y + entry.offset.y);
        positions.insert(entry.id.clone(), placed);
        assignments.insert(entry.id.clone(), placed);
    }
    apply_positions(nodes, &assignments);
}

fn collect_relative(
    nodes: &[Node],
    entries: &mut Vec<RelativeEntry>,
    positions: &mut HashMap<String, Point>,
) {
    for node in nodes {
        positions.insert(node.id.clone(), node.pos());
        if let Some(constraints) = &node.constraints
            && let (Some(reference), Some(offset)) =
                (&constraints.relative_to, constraints.relative_offset)
        {
            entries.push(RelativeEntry {
                id: node.id.clone(),
                reference: reference.clone(),
                offset,
                priority: constraints.position_priority,
                seq: entries.len(),
            });
        }
        collect_relative(&node.children, entries, positions);
    }
}

fn apply_positions(nodes: &mut [Node], assignments: &HashMap<String, Point>) {
    for node in nodes {
        if let Some(pos) = assignments.get(&node.id) {
            node.set_pos(pos.x, pos.y);
        }
        apply_positions(&mut node.children, assignments);
    }
}

/// Snap every alignment group to one shared coordinate: the arithmetic mean
/// of member `y` for horizontal groups, of member `x` for vertical ones.
/// Single-member groups are left alone.
pub(crate) fn apply_alignment(nodes: &mut [Node]) {
    let mut groups: BTreeMap<(String, AlignDirection), Vec<f32>> = BTreeMap::new();
    collect_alignment(nodes, &mut groups);

    let mut targets: HashMap<(String, AlignDirection), f32> = HashMap::new();
    for (key, coords) in &groups {
        if coords.len() < 2 {
            continue;
        }
        let mean = coords.iter().sum::<f32>() / coords.len() as f32;
        targets.insert(key.clone(), mean);
    }
    if !targets.is_empty() {
        snap_alignment(nodes, &targets);
    }
}

fn collect_alignment(nodes: &[Node], out: &mut BTreeMap<(String, AlignDirection), Vec<f32>>) {
    for node in nodes {
        if let Some(constraints) = &node.constraints
            && let Some(group) = &constraints.align_group
        {
            let coord = match constraints.align_direction {
                AlignDirection::Horizontal => node.pos().y,
                AlignDirection::Vertical => node.pos().x,
            };
            out.entry((group.clone(), constraints.align_direction))
                .or_default()
                .push(coord);
        }
        collect_alignment(&node.children, out);
    }
}

fn snap_alignment(nodes: &mut [Node], targets: &HashMap<(String, AlignDirection), f32>) {
    for node in nodes {
        if let Some(constraints) = node.constraints.clone()
            && let Some(group) = &constraints.align_group
            && let Some(target) = targets.get(&(group.clone(), constraints.align_direction))
        {
            let pos = node.pos();
            match constraints.align_direction {
                AlignDirection::Horizontal => node.set_pos(pos.x, *target),
                AlignDirection::Vertical => node.set_pos(*target, pos.y),
            }
        }
        snap_alignment(&mut node.children, targets);
    }
}

/// Check every constraint against the final coordinates. Returns
/// human-readable violation strings; never raises.
pub(crate) fn validate(nodes: &[Node], state: &ConstraintState) -> Vec<String> {
    let mut violations = Vec::new();
    let mut positions: HashMap<String, Point> = HashMap::new();
    index_positions(nodes, &mut positions);

    validate_nodes(nodes, state, &positions, &mut violations);

    // Alignment groups must have converged to a single coordinate.
    let mut groups: BTreeMap<(String, AlignDirection), Vec<f32>> = BTreeMap::new();
    collect_alignment(nodes, &mut groups);
    for ((group, direction), coords) in &groups {
        if coords.len() < 2 {
            continue;
        }
        let first = coords[0];
        if coords.iter().any(|c| (c - first).abs() > EPSILON) {
            let axis = match direction {
                AlignDirection::Horizontal => "y",
                AlignDirection::Vertical => "x",
            };
            violations.push(format!(
                "alignment group '{group}' is split: {axis} coordinates {coords:?}"
            ));
        }
    }
    violations
}

fn index_positions(nodes: &[Node], out: &mut HashMap<String, Point>) {
    for node in nodes {
        out.insert(node.id.clone(), node.pos());
        index_positions(&node.children, out);
    }
}

fn validate_nodes(
    nodes: &[Node],
    state: &ConstraintState,
    positions: &HashMap<String, Point>,
    violations: &mut Vec<String>,
) {
    for node in nodes {
        if let Some(snapshot) = state.fixed_position(&node.id) {
            let pos = node.pos();
            if !pos.approx_eq(snapshot) {
                violations.push(format!(
                    "fixed node '{}' moved from ({}, {}) to ({}, {})",
                    node.id, snapshot.x, snapshot.y, pos.x, pos.y
                ));
            }
        }
        if let Some(constraints) = &node.constraints {
            if let (Some(reference), Some(offset)) =
                (&constraints.relative_to, constraints.relative_offset)
            {
                match positions.get(reference) {
                    Some(anchor) => {
                        let expected =
                            Point::new(anchor.x + offset.x, anchor.y + offset.y);
                        if !node.pos().approx_eq(expected) {
                            violations.push(format!(
                                "node '{}' is not at its relative position ({}, {}) from '{}'",
                                node.id, offset.x, offset.y, reference
                            ));
                        }
                    }
                    None => violations.push(format!(
                        "node '{}' references missing node '{}'",
                        node.id, reference
                    )),
                }
            }
            if let (Some(wanted), Some(actual)) =
                (constraints.layer, state.assigned_layer(&node.id))
                && wanted != actual
            {
                violations.push(format!(
                    "node '{}' requested layer {wanted} but was assigned layer {actual}",
                    node.id
                ));
            }
        }
        validate_nodes(&node.children, state, positions, violations);
    }
}
