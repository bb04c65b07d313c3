//! The single deserialization boundary: untyped JSON in, one canonical
//! typed [`Graph`] out. Everything past this point works on typed data
//! only.

use std::collections::HashSet;

use anyhow::{Result, bail};
use serde_json::Value;

use crate::graph::{Graph, Node};

/// Parse a graph from JSON text and validate its structure.
pub fn graph_from_json(input: &str) -> Result<Graph> {
    let graph: Graph = serde_json::from_str(input)?;
    validate(&graph)?;
    Ok(graph)
}

/// Same boundary for callers that already hold a parsed JSON value.
pub fn graph_from_value(value: Value) -> Result<Graph> {
    let graph: Graph = serde_json::from_value(value)?;
    validate(&graph)?;
    Ok(graph)
}

fn validate(graph: &Graph) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    check_ids(&graph.children, &mut seen)?;
    for edge in &graph.edges {
        if edge.sources.is_empty() {
            bail!("edge '{}' has no sources", edge.id);
        }
        if edge.targets.is_empty() {
            bail!("edge '{}' has no targets", edge.id);
        }
    }
    Ok(())
}

fn check_ids<'a>(nodes: &'a [Node], seen: &mut HashSet<&'a str>) -> Result<()> {
    for node in nodes {
        if node.id.is_empty() {
            bail!("node with empty id");
        }
        if !seen.insert(node.id.as_str()) {
            bail!("duplicate node id '{}'", node.id);
        }
        for port in &node.ports {
            if !port.id.is_empty() && !seen.insert(port.id.as_str()) {
                bail!("duplicate port id '{}'", port.id);
            }
        }
        check_ids(&node.children, seen)?;
    }
    Ok(())
}
