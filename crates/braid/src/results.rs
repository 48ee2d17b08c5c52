//! Aggregation of flow records onto a built view graph.
//!
//! Every view node is split into one sub-node per partition label (`"{node}^{label}"`), and the
//! flows routed along every view edge are summed per `(source sub-node, target sub-node, flow
//! label, time label)`.

use crate::error::{Error, Result};
use crate::model::{BundleKey, Direction, Node};
use crate::ordering::Ordering;
use crate::partition::{ALL_LABEL, NodeSide, OTHER_LABEL, Partition, group_label};
use crate::view_graph::ViewGraph;
use braid_graphlib::{Graph, GraphOptions};
use indexmap::IndexMap;
use rustc_hash::FxHashSet as HashSet;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use tracing::debug;

/// One flow between two underlying entities.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowRecord {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    pub value: f64,
}

impl FlowRecord {
    pub fn new(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            attributes: BTreeMap::new(),
            value,
        }
    }

    pub fn with_attribute(mut self, dim: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(dim.into(), value.into());
        self
    }

    /// Value of dimension `dim`: the endpoints for `source` and `target`, an attribute otherwise.
    pub fn field(&self, dim: &str) -> Option<&str> {
        match dim {
            "source" => Some(&self.source),
            "target" => Some(&self.target),
            _ => self.attributes.get(dim).map(String::as_str),
        }
    }
}

/// Flow records selected for each bundle, as supplied by the dataset loader.
pub trait BundleFlows {
    fn flows(&self, bundle: &BundleKey) -> Option<&[FlowRecord]>;
}

impl<S: BuildHasher> BundleFlows for HashMap<BundleKey, Vec<FlowRecord>, S> {
    fn flows(&self, bundle: &BundleKey) -> Option<&[FlowRecord]> {
        self.get(bundle).map(Vec::as_slice)
    }
}

impl BundleFlows for BTreeMap<BundleKey, Vec<FlowRecord>> {
    fn flows(&self, bundle: &BundleKey) -> Option<&[FlowRecord]> {
        self.get(bundle).map(Vec::as_slice)
    }
}

impl<S: BuildHasher> BundleFlows for IndexMap<BundleKey, Vec<FlowRecord>, S> {
    fn flows(&self, bundle: &BundleKey) -> Option<&[FlowRecord]> {
        self.get(bundle).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Process,
    #[default]
    Group,
}

impl NodeKind {
    fn of(node: &Node) -> Self {
        if node.is_process() {
            NodeKind::Process
        } else {
            NodeKind::Group
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub direction: Direction,
    pub title: String,
    pub bundle: Option<BundleKey>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultEdge {
    pub flow_label: String,
    pub time_label: String,
    pub value: f64,
    pub bundles: Vec<BundleKey>,
}

/// Aggregated multigraph plus the ordering of its sub-nodes.
///
/// Parallel edges are named `"{flow_label}|{time_label}"`.
#[derive(Debug, Clone, Default)]
pub struct ResultsGraph {
    pub graph: Graph<ResultNode, ResultEdge, ()>,
    pub ordering: Ordering,
}

impl Serialize for ResultsGraph {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct NodeEntry<'a> {
            id: &'a str,
            #[serde(flatten)]
            node: &'a ResultNode,
        }

        #[derive(Serialize)]
        struct LinkEntry<'a> {
            source: &'a str,
            target: &'a str,
            #[serde(flatten)]
            edge: &'a ResultEdge,
        }

        let nodes: Vec<NodeEntry<'_>> = self
            .graph
            .nodes()
            .filter_map(|id| self.graph.node(id).map(|node| NodeEntry { id, node }))
            .collect();
        let links: Vec<LinkEntry<'_>> = self
            .graph
            .edges()
            .filter_map(|key| {
                self.graph.edge_by_key(key).map(|edge| LinkEntry {
                    source: &key.v,
                    target: &key.w,
                    edge,
                })
            })
            .collect();

        let mut state = serializer.serialize_struct("ResultsGraph", 3)?;
        state.serialize_field("nodes", &nodes)?;
        state.serialize_field("links", &links)?;
        state.serialize_field("ordering", &self.ordering)?;
        state.end()
    }
}

/// One view node and the sub-nodes it was split into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub title: String,
    pub bundle: Option<BundleKey>,
    pub nodes: Vec<String>,
}

fn sub_node_id(node: &str, label: &str) -> String {
    format!("{node}^{label}")
}

/// `(label, title)` of every sub-node `id` is split into.
fn sub_nodes(id: &str, node: &Node) -> Vec<(String, String)> {
    match node.partition() {
        None => vec![(
            ALL_LABEL.to_string(),
            node.title().unwrap_or(id).to_string(),
        )],
        Some(partition) => partition
            .labels()
            .chain([OTHER_LABEL])
            .map(|label| (label.to_string(), label.to_string()))
            .collect(),
    }
}

type AggregateKey = (String, String, String, String);

/// Splits the nodes of `view_graph` by their partitions and sums `flows` along its edges.
///
/// An edge's own flow partition takes precedence over `flow_partition`. Sub-nodes that end up
/// without edges are dropped, along with ranks and groups left empty.
pub fn results_graph<F>(
    view_graph: &ViewGraph,
    flows: &F,
    flow_partition: Option<&Partition>,
    time_partition: Option<&Partition>,
) -> Result<(ResultsGraph, Vec<GroupRecord>)>
where
    F: BundleFlows + ?Sized,
{
    let mut g: Graph<ResultNode, ResultEdge, ()> = Graph::new(GraphOptions { multigraph: true });
    let mut groups = Vec::new();
    let mut ranks = Vec::with_capacity(view_graph.graph().ordering.len());

    for bands in view_graph.graph().ordering.ranks() {
        let mut out_bands = Vec::with_capacity(bands.len());
        for band in bands {
            let mut out = Vec::new();
            for u in band {
                let view_node = view_graph.node(u).ok_or_else(|| Error::NotFound {
                    node: u.clone(),
                })?;
                let node = &view_node.node;
                let kind = NodeKind::of(node);
                let mut members = Vec::new();
                for (label, title) in sub_nodes(u, node) {
                    let id = sub_node_id(u, &label);
                    g.set_node(
                        id.as_str(),
                        ResultNode {
                            kind,
                            direction: node.direction(),
                            title,
                            bundle: view_node.bundle.clone(),
                        },
                    );
                    out.push(id.clone());
                    members.push(id);
                }
                groups.push(GroupRecord {
                    id: u.clone(),
                    kind,
                    title: node.title().unwrap_or_default().to_string(),
                    bundle: view_node.bundle.clone(),
                    nodes: members,
                });
            }
            out_bands.push(out);
        }
        ranks.push(out_bands);
    }

    for key in view_graph.edges() {
        let Some(edge) = view_graph.edge_by_key(key) else {
            continue;
        };
        let source_partition = view_graph.node(&key.v).and_then(|n| n.node.partition());
        let target_partition = view_graph.node(&key.w).and_then(|n| n.node.partition());
        let edge_partition = edge.flow_partition.as_ref().or(flow_partition);

        let mut totals: BTreeMap<AggregateKey, f64> = BTreeMap::new();
        let records = edge
            .bundles
            .iter()
            .filter_map(|bundle| flows.flows(bundle))
            .flatten();
        for record in records {
            let k1 = sub_node_id(
                &key.v,
                &group_label(source_partition, record, Some(NodeSide::Source))?,
            );
            let k2 = sub_node_id(
                &key.w,
                &group_label(target_partition, record, Some(NodeSide::Target))?,
            );
            let k3 = group_label(edge_partition, record, None)?;
            let k4 = group_label(time_partition, record, None)?;
            *totals.entry((k1, k2, k3, k4)).or_insert(0.0) += record.value;
        }

        for ((k1, k2, k3, k4), value) in totals {
            let name = format!("{k3}|{k4}");
            g.set_edge_named(
                k1,
                k2,
                Some(name),
                Some(ResultEdge {
                    flow_label: k3,
                    time_label: k4,
                    value,
                    bundles: edge.bundles.clone(),
                }),
            );
        }
    }

    let unused: HashSet<String> = g
        .nodes()
        .filter(|id| g.degree(id) == 0)
        .map(str::to_string)
        .collect();
    for id in &unused {
        g.remove_node(id);
    }

    let mut ordering = Ordering::new(ranks);
    ordering.retain(|id| !unused.contains(id));
    ordering.drop_empty_ranks();

    for group in &mut groups {
        group.nodes.retain(|id| !unused.contains(id));
    }
    groups.retain(|group| !group.nodes.is_empty());

    debug!(
        nodes = g.node_count(),
        edges = g.edge_count(),
        pruned = unused.len(),
        "aggregated results graph"
    );
    Ok((ResultsGraph { graph: g, ordering }, groups))
}
