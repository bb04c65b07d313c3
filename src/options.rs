use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default padding applied around the children of a hierarchical node.
pub const DEFAULT_PADDING: f32 = 12.0;
/// Default gap between sibling nodes for the built-in grid placement.
pub const DEFAULT_NODE_SPACING: f32 = 40.0;
/// Default curvature for spline control-point synthesis.
pub const DEFAULT_SPLINE_CURVATURE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "UP" => Some(Self::Up),
            "DOWN" => Some(Self::Down),
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EdgeRouting {
    #[default]
    Orthogonal,
    Polyline,
    Splines,
    /// Obstacle-avoiding orthogonal routing (libavoid-style A*).
    Libavoid,
}

impl EdgeRouting {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "ORTHOGONAL" => Some(Self::Orthogonal),
            "POLYLINE" => Some(Self::Polyline),
            "SPLINES" => Some(Self::Splines),
            "LIBAVOID" => Some(Self::Libavoid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortSide {
    North,
    South,
    East,
    West,
    #[default]
    Undefined,
}

impl PortSide {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "NORTH" => Some(Self::North),
            "SOUTH" => Some(Self::South),
            "EAST" => Some(Self::East),
            "WEST" => Some(Self::West),
            "UNDEFINED" => Some(Self::Undefined),
            _ => None,
        }
    }

    /// Outward unit vector away from the node for this side.
    pub fn outward(self) -> (f32, f32) {
        match self {
            Self::North => (0.0, -1.0),
            Self::South => (0.0, 1.0),
            Self::East => (1.0, 0.0),
            Self::West => (-1.0, 0.0),
            Self::Undefined => (0.0, 0.0),
        }
    }

    /// Unit vector running along the side (the axis ports are spread on).
    pub fn along(self) -> (f32, f32) {
        match self {
            Self::North | Self::South => (1.0, 0.0),
            Self::East | Self::West => (0.0, 1.0),
            Self::Undefined => (0.0, 0.0),
        }
    }

    pub fn is_horizontal_axis(self) -> bool {
        matches!(self, Self::East | Self::West)
    }
}

// Canonical option names and the literal keys accepted for each, in
// priority order. Callers may use either the `elk.`-prefixed spelling or
// the short one.
static OPTION_ALIASES: Lazy<BTreeMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut table: BTreeMap<&'static str, &'static [&'static str]> = BTreeMap::new();
    table.insert("algorithm", &["algorithm"]);
    table.insert("direction", &["elk.direction", "direction"]);
    table.insert(
        "spacing_node_node",
        &["elk.spacing.nodeNode", "spacing_node_node"],
    );
    table.insert("padding", &["elk.padding", "padding"]);
    table.insert("edge_routing", &["elk.edgeRouting", "edgeRouting"]);
    table.insert(
        "spline_curvature",
        &["elk.spline.curvature", "spline.curvature"],
    );
    table.insert("self_loop_side", &["elk.selfLoopSide", "selfLoopSide"]);
    table.insert(
        "routing_padding",
        &["libavoid.routingPadding", "routingPadding"],
    );
    table.insert(
        "segment_penalty",
        &["libavoid.segmentPenalty", "segmentPenalty"],
    );
    table.insert("bend_penalty", &["libavoid.bendPenalty", "bendPenalty"]);
    table.insert("hierarchical", &["hierarchical"]);
    table.insert(
        "label_placement_disabled",
        &["label.placement.disabled"],
    );
    table
});

/// Free-form layout option bag. Keys are stored verbatim; lookups go
/// through the alias table so `elk.direction` and `direction` resolve to
/// the same option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutOptions(BTreeMap<String, Value>);

impl LayoutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        if let Some(aliases) = OPTION_ALIASES.get(key) {
            for alias in aliases.iter() {
                if let Some(value) = self.0.get(*alias) {
                    return Some(value);
                }
            }
        }
        self.0.get(key)
    }

    pub fn get_f32(&self, key: &str) -> Option<f32> {
        match self.get(key)? {
            Value::Number(n) => n.as_f64().map(|v| v as f32),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn get_i32(&self, key: &str) -> Option<i32> {
        match self.get(key)? {
            Value::Number(n) => n.as_i64().map(|v| v as i32),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        self.get_str("direction").and_then(Direction::from_token)
    }

    pub fn edge_routing(&self) -> Option<EdgeRouting> {
        self.get_str("edge_routing").and_then(EdgeRouting::from_token)
    }

    pub fn self_loop_side(&self) -> Option<PortSide> {
        self.get_str("self_loop_side").and_then(PortSide::from_token)
    }

    pub fn padding(&self) -> Option<Padding> {
        self.get("padding").and_then(Padding::from_value)
    }
}

/// Per-side padding. Parsed from either a bare number (uniform) or a map
/// with any of `top`/`right`/`bottom`/`left`; unspecified sides keep the
/// default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Padding {
    fn default() -> Self {
        Self::uniform(DEFAULT_PADDING)
    }
}

impl Padding {
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(|v| Self::uniform(v as f32)),
            Value::Object(map) => {
                let side = |key: &str| -> f32 {
                    map.get(key)
                        .and_then(Value::as_f64)
                        .map(|v| v as f32)
                        .unwrap_or(DEFAULT_PADDING)
                };
                Some(Self {
                    top: side("top"),
                    right: side("right"),
                    bottom: side("bottom"),
                    left: side("left"),
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn elk_alias_resolves() {
        let opts = LayoutOptions::new().with("elk.direction", "RIGHT");
        assert_eq!(opts.direction(), Some(Direction::Right));
        let opts = LayoutOptions::new().with("direction", "LEFT");
        assert_eq!(opts.direction(), Some(Direction::Left));
    }

    #[test]
    fn prefixed_key_wins_over_short_key() {
        let opts = LayoutOptions::new()
            .with("elk.edgeRouting", "SPLINES")
            .with("edgeRouting", "POLYLINE");
        assert_eq!(opts.edge_routing(), Some(EdgeRouting::Splines));
    }

    #[test]
    fn padding_from_number_and_map() {
        let opts = LayoutOptions::new().with("padding", 20.0);
        assert_eq!(opts.padding(), Some(Padding::uniform(20.0)));

        let opts = LayoutOptions::new().with("elk.padding", json!({"top": 5.0, "left": 3.0}));
        let padding = opts.padding().unwrap();
        assert_eq!(padding.top, 5.0);
        assert_eq!(padding.left, 3.0);
        assert_eq!(padding.right, DEFAULT_PADDING);
        assert_eq!(padding.bottom, DEFAULT_PADDING);
    }

    #[test]
    fn numeric_options_parse_from_strings() {
        let opts = LayoutOptions::new().with("libavoid.bendPenalty", "3.5");
        assert_eq!(opts.get_f32("bend_penalty"), Some(3.5));
    }

    #[test]
    fn unknown_key_falls_back_to_direct_lookup() {
        let opts = LayoutOptions::new().with("custom.key", 7.0);
        assert_eq!(opts.get_f32("custom.key"), Some(7.0));
    }
}
