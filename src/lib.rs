//! Automatic layout for node-link diagrams.
//!
//! Build a [`Graph`] (directly or with [`graph_from_json`]), tune it
//! through [`options::LayoutOptions`], and call [`layout`]. The pipeline
//! arranges ports, honors positional constraints, places nodes (recursing
//! through nested hierarchy), routes edges, and places labels, all in
//! place on the graph.

pub mod builder;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod layout;
pub mod options;

pub use builder::{graph_from_json, graph_from_value};
pub use error::LayoutError;
pub use graph::{
    AlignDirection, Edge, EdgeSection, Graph, Label, Node, NodeConstraints, Port,
};
pub use layout::{
    ConstraintState, FixedPlacement, GraphView, GridPlacement, PlacementStrategy, layout,
    layout_with,
};
pub use options::{Direction, EdgeRouting, LayoutOptions, PortSide};
