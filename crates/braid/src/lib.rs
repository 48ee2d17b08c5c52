#![forbid(unsafe_code)]

//! Layered view-graph synthesis and node ordering for Sankey flow diagrams.
//!
//! A [`ViewDefinition`] names process groups and waypoints, the bundles of flow between them,
//! and a skeleton [`Ordering`] of ranks and bands. [`view_graph`] expands every bundle that
//! spans several ranks into a chain of synthesized waypoints and places each one with a
//! median heuristic; [`augment`] adds stubs for flows to and from the outside of the diagram;
//! [`results_graph`] aggregates flow records onto the result.
//!
//! [`sankey_view`] runs the whole pipeline.

pub mod augment;
pub mod error;
pub mod heuristic;
pub mod model;
pub mod options;
pub mod ordering;
pub mod partition;
pub mod pipeline;
pub mod results;
pub mod view_graph;

pub use braid_graphlib as graphlib;

pub use augment::{augment, elsewhere_bundles};
pub use error::{Error, Result};
pub use heuristic::Side;
pub use model::{
    Bundle, BundleKey, Direction, ElsewhereFlow, Endpoint, Node, ProcessGroup, ViewDefinition,
    Waypoint,
};
pub use options::SankeyOptions;
pub use ordering::{Ordering, RankEdge};
pub use partition::{Group, Partition};
pub use pipeline::sankey_view;
pub use results::{
    BundleFlows, FlowRecord, GroupRecord, NodeKind, ResultEdge, ResultNode, ResultsGraph,
    results_graph,
};
pub use view_graph::{
    ImplicitWaypoint, ImplicitWaypoints, ViewEdge, ViewGraph, ViewGraphLabel, ViewNode,
    view_graph,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
