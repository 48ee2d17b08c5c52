//! Graph container APIs used by `braid`.
//!
//! A directed graph keyed by string node ids. Edges are identified by `v`, `w` and an optional
//! `name` (multigraphs only). Node and edge iteration follow insertion order, which the layout
//! code relies on for deterministic output.

mod graph;

pub use graph::{EdgeKey, Graph, GraphOptions};
