use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::geometry::{Point, Rect};
use crate::options::{LayoutOptions, PortSide};

/// Root container of one diagram: an ordered tree of nodes plus the edges
/// connecting them. `width`/`height` are filled in by the layout call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Graph {
    pub children: Vec<Node>,
    pub edges: Vec<Edge>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub options: LayoutOptions,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when any node in the tree has children of its own. Hierarchy is
    /// structural, not a flag.
    pub fn is_hierarchical(&self) -> bool {
        self.children.iter().any(|node| !node.children.is_empty())
    }

    pub fn find_node(&self, id: &str) -> Option<&Node> {
        find_in(&self.children, id)
    }

    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        find_in_mut(&mut self.children, id)
    }

    /// Resolve an edge endpoint id to the node it attaches to, plus the port
    /// when the id names a port rather than a node.
    pub fn resolve_endpoint(&self, id: &str) -> Option<Endpoint<'_>> {
        resolve_in(&self.children, id)
    }

    /// Hierarchy depth of a node id; direct children are depth 0.
    pub fn node_depth(&self, id: &str) -> Option<usize> {
        depth_in(&self.children, id, 0)
    }
}

/// An endpoint resolved against the node tree. The port, when present, is
/// owned by `node`.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint<'a> {
    pub node: &'a Node,
    pub port: Option<&'a Port>,
}

impl Endpoint<'_> {
    /// Attachment point in the node's coordinate frame: the port anchor when
    /// the endpoint names a port, the node center otherwise.
    pub fn anchor(&self) -> Point {
        let base = self.node.pos();
        match self.port {
            Some(port) => Point::new(base.x + port.x, base.y + port.y),
            None => self.node.center(),
        }
    }
}

fn find_in<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Node> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut<'a>(nodes: &'a mut [Node], id: &str) -> Option<&'a mut Node> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn resolve_in<'a>(nodes: &'a [Node], id: &str) -> Option<Endpoint<'a>> {
    for node in nodes {
        if node.id == id {
            return Some(Endpoint { node, port: None });
        }
        if let Some(port) = node.ports.iter().find(|port| port.id == id) {
            return Some(Endpoint {
                node,
                port: Some(port),
            });
        }
        if let Some(found) = resolve_in(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn depth_in(nodes: &[Node], id: &str, depth: usize) -> Option<usize> {
    for node in nodes {
        if node.id == id || node.ports.iter().any(|port| port.id == id) {
            return Some(depth);
        }
        if let Some(found) = depth_in(&node.children, id, depth + 1) {
            return Some(found);
        }
    }
    None
}

/// A box in the diagram. `x`/`y` stay `None` until a placement strategy or
/// constraint assigns them; child coordinates are relative to the parent.
///
/// The tree must not be self-referential (a node listed as its own
/// descendant); recursion depth equals hierarchy depth and is not guarded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    pub id: String,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: f32,
    pub height: f32,
    pub children: Vec<Node>,
    pub ports: Vec<Port>,
    pub labels: Vec<Label>,
    pub constraints: Option<NodeConstraints>,
    pub options: LayoutOptions,
    /// Caller-owned free-form bag; the pipeline never writes to it.
    pub properties: BTreeMap<String, Value>,
}

impl Node {
    pub fn new(id: &str, width: f32, height: f32) -> Self {
        Self {
            id: id.to_string(),
            width,
            height,
            ..Self::default()
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn pos(&self) -> Point {
        Point::new(self.x.unwrap_or(0.0), self.y.unwrap_or(0.0))
    }

    pub fn set_pos(&mut self, x: f32, y: f32) {
        self.x = Some(x);
        self.y = Some(y);
    }

    pub fn center(&self) -> Point {
        let pos = self.pos();
        Point::new(pos.x + self.width / 2.0, pos.y + self.height / 2.0)
    }

    pub fn rect(&self) -> Rect {
        let pos = self.pos();
        Rect::new(pos.x, pos.y, self.width, self.height)
    }

    pub fn is_hierarchical(&self) -> bool {
        !self.children.is_empty()
    }
}

/// A connection point on a node's boundary. `x`/`y` are relative to the
/// owning node and are treated as an ordering hint only: the port arranger
/// rewrites them when it distributes ports along a side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Port {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub side: PortSide,
    /// Explicit ordering on the side; -1 means unset.
    pub index: i32,
    pub labels: Vec<Label>,
}

// Manual impl so a port omitted from input deserializes as unindexed,
// not as explicitly indexed 0.
impl Default for Port {
    fn default() -> Self {
        Self {
            id: String::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            side: PortSide::Undefined,
            index: -1,
            labels: Vec::new(),
        }
    }
}

impl Port {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Label {
    pub fn new(text: &str, width: f32, height: f32) -> Self {
        Self {
            text: text.to_string(),
            width,
            height,
            ..Self::default()
        }
    }
}

/// A connector. `sources`/`targets` hold node or port ids; routing only
/// looks at the first of each.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Edge {
    pub id: String,
    pub sources: Vec<String>,
    pub targets: Vec<String>,
    pub labels: Vec<Label>,
    pub sections: Vec<EdgeSection>,
    pub options: LayoutOptions,
}

impl Edge {
    pub fn new(id: &str, source: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            sources: vec![source.to_string()],
            targets: vec![target.to_string()],
            ..Self::default()
        }
    }

    pub fn source_id(&self) -> Option<&str> {
        self.sources.first().map(String::as_str)
    }

    pub fn target_id(&self) -> Option<&str> {
        self.targets.first().map(String::as_str)
    }
}

/// The routed geometry of one edge. For orthogonal and polyline routing the
/// bend points are literal path vertices; for splines they are exactly two
/// cubic Bezier control points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeSection {
    pub id: String,
    pub start: Point,
    pub end: Point,
    pub bend_points: Vec<Point>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AlignDirection {
    #[default]
    Horizontal,
    Vertical,
}

/// Positional constraints a caller can attach to a node without touching
/// the placement strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConstraints {
    pub fixed_position: bool,
    pub align_group: Option<String>,
    pub align_direction: AlignDirection,
    pub layer: Option<i32>,
    pub relative_to: Option<String>,
    pub relative_offset: Option<Point>,
    /// Higher priority resolves first among relative-position constraints.
    pub position_priority: i32,
}

impl NodeConstraints {
    pub fn fixed() -> Self {
        Self {
            fixed_position: true,
            ..Self::default()
        }
    }

    pub fn aligned(group: &str, direction: AlignDirection) -> Self {
        Self {
            align_group: Some(group.to_string()),
            align_direction: direction,
            ..Self::default()
        }
    }

    pub fn relative(to: &str, dx: f32, dy: f32) -> Self {
        Self {
            relative_to: Some(to.to_string()),
            relative_offset: Some(Point::new(dx, dy)),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.fixed_position
            && self.align_group.is_none()
            && self.layer.is_none()
            && self.relative_to.is_none()
    }
}
