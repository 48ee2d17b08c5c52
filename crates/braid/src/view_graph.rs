//! Builds the view graph: every declared node plus the waypoint chains that carry bundles
//! across intermediate ranks.
//!
//! Bundles are processed in a canonical order (see [`bundle_order`]) so the resulting
//! [`Ordering`] only depends on the bundle contents, not on the order or keys they were
//! declared with.

use crate::error::{Error, Result};
use crate::heuristic::{Side, new_node_indices};
use crate::model::{Bundle, BundleKey, Direction, Endpoint, Node, ViewDefinition, Waypoint};
use crate::ordering::Ordering;
use crate::partition::Partition;
use braid_graphlib::{Graph, GraphOptions};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewNode {
    pub node: Node,
    /// Bundle that synthesized this node; `None` for declared nodes.
    pub bundle: Option<BundleKey>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewEdge {
    /// Bundles routed along this edge, in processing order.
    pub bundles: Vec<BundleKey>,
    pub flow_partition: Option<Partition>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewGraphLabel {
    pub ordering: Ordering,
}

pub type ViewGraph = Graph<ViewNode, ViewEdge, ViewGraphLabel>;

/// Side-table entry for a waypoint the builder synthesized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImplicitWaypoint {
    pub bundle: BundleKey,
    /// Index of the chain segment (`source, waypoints.., target`) the waypoint belongs to.
    pub index: usize,
    /// Final `(rank, band, position)`.
    pub position: (usize, usize, usize),
}

pub type ImplicitWaypoints = BTreeMap<String, ImplicitWaypoint>;

#[derive(Debug, Clone)]
struct Synthesized {
    bundle: BundleKey,
    index: usize,
}

/// Waypoints synthesized so far: by name, and by the `(v, w, rank)` segment they route.
#[derive(Debug, Default)]
struct SynthesizedTable {
    by_name: BTreeMap<String, Synthesized>,
    by_segment: BTreeMap<(String, String, usize), String>,
}

impl SynthesizedTable {
    fn get(&self, v: &str, w: &str, r: usize) -> Option<&String> {
        self.by_segment.get(&(v.to_string(), w.to_string(), r))
    }

    fn insert(&mut self, v: &str, w: &str, r: usize, id: String, entry: Synthesized) {
        self.by_segment
            .insert((v.to_string(), w.to_string(), r), id.clone());
        self.by_name.insert(id, entry);
    }
}

/// Name for the waypoint of segment `v -> w` at rank `r`.
///
/// `__{v}_{w}_{r}`, or `__{v}_{w}_{r}~{n}` with the smallest `n >= 2` that is free when the
/// plain name is already a node of `g` (a declared node, or a waypoint of another segment whose
/// keys contain `_`).
fn waypoint_name(g: &ViewGraph, v: &str, w: &str, r: usize) -> String {
    let base = format!("__{v}_{w}_{r}");
    if !g.has_node(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let id = format!("{base}~{n}");
        if !g.has_node(&id) {
            return id;
        }
        n += 1;
    }
}

/// Builds the view graph for `definition`.
///
/// The definition is validated first and never modified. Returns the graph, whose label holds
/// the final [`Ordering`], and the table of synthesized waypoints.
pub fn view_graph(definition: &ViewDefinition) -> Result<(ViewGraph, ImplicitWaypoints)> {
    definition.validate()?;

    let mut g = ViewGraph::new(GraphOptions::default());
    for (key, node) in definition.nodes() {
        g.set_node(key, ViewNode { node, bundle: None });
    }
    g.graph_mut().ordering = definition.ordering.clone();

    let order = bundle_order(definition)?;
    debug!(
        bundles = order.len(),
        ranks = definition.ordering.len(),
        "building view graph"
    );

    let mut synthesized = SynthesizedTable::default();
    for key in order {
        let Some(bundle) = definition.bundles.get(key) else {
            return Err(Error::Internal {
                message: format!("bundle {key} disappeared while ordering bundles"),
            });
        };
        let chain = bundle.chain();
        for (index, pair) in chain.windows(2).enumerate() {
            let (Some(v), Some(w)) = (pair[0].node(), pair[1].node()) else {
                continue;
            };
            add_segment(
                &mut g,
                &mut synthesized,
                &definition.bundles,
                key,
                bundle,
                v,
                w,
                index,
            )?;
        }
    }

    let ordering = &g.graph().ordering;
    let implicit = synthesized
        .by_name
        .into_iter()
        .map(|(id, s)| {
            let position = ordering.indices(&id)?;
            Ok((
                id,
                ImplicitWaypoint {
                    bundle: s.bundle,
                    index: s.index,
                    position,
                },
            ))
        })
        .collect::<Result<ImplicitWaypoints>>()?;

    debug!(
        nodes = g.node_count(),
        edges = g.edge_count(),
        waypoints = implicit.len(),
        "view graph built"
    );
    Ok((g, implicit))
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct BundleRank<'a> {
    class: u8,
    length: isize,
    source: &'a Endpoint,
    target: &'a Endpoint,
    waypoints: &'a [String],
    key: &'a BundleKey,
}

/// Bundle keys in processing order.
///
/// Adjacent bundles come first, then forward bundles from shortest to longest, then return
/// loops from longest to shortest, then bundles to or from elsewhere. Ties are broken by
/// endpoints, then waypoints, then key.
pub fn bundle_order(definition: &ViewDefinition) -> Result<Vec<&BundleKey>> {
    let mut ranked = Vec::with_capacity(definition.bundles.len());
    for (key, bundle) in &definition.bundles {
        let (class, length) = match (bundle.source.node(), bundle.target.node()) {
            (Some(source), Some(target)) => {
                let dummies = dummy_count(definition, bundle)? as isize;
                let (rs, _, _) = definition.ordering.indices(source)?;
                let (rt, _, _) = definition.ordering.indices(target)?;
                if dummies == 0 {
                    (0, 0)
                } else if rt >= rs {
                    (1, dummies)
                } else {
                    (2, -dummies)
                }
            }
            _ => (3, 0),
        };
        ranked.push(BundleRank {
            class,
            length,
            source: &bundle.source,
            target: &bundle.target,
            waypoints: &bundle.waypoints,
            key,
        });
    }
    ranked.sort();
    Ok(ranked.into_iter().map(|r| r.key).collect())
}

fn dummy_count(definition: &ViewDefinition, bundle: &Bundle) -> Result<usize> {
    let mut count = 0;
    for pair in bundle.chain().windows(2) {
        let (Some(v), Some(w)) = (pair[0].node(), pair[1].node()) else {
            continue;
        };
        let (rv, _, _) = definition.ordering.indices(v)?;
        let (rw, _, _) = definition.ordering.indices(w)?;
        let (ranks, _) = waypoint_ranks(
            rv,
            direction_of(definition, v)?,
            rw,
            direction_of(definition, w)?,
        );
        count += ranks.len();
    }
    Ok(count)
}

fn direction_of(definition: &ViewDefinition, key: &str) -> Result<Direction> {
    definition.direction(key).ok_or_else(|| Error::NotFound {
        node: key.to_string(),
    })
}

/// Ranks needing a synthesized waypoint between `v` at `rv` and `w` at `rw`, in chain order,
/// and the direction those waypoints face.
fn waypoint_ranks(
    rv: usize,
    v_dir: Direction,
    rw: usize,
    w_dir: Direction,
) -> (Vec<usize>, Direction) {
    if rw > rv {
        let p = if v_dir == Direction::Left { rv } else { rv + 1 };
        let q = if w_dir == Direction::Left { rw } else { rw - 1 };
        ((p..=q).collect(), Direction::Right)
    } else if rv > rw {
        let p = if v_dir == Direction::Right { rv } else { rv - 1 };
        let q = if w_dir == Direction::Right { rw } else { rw + 1 };
        ((q..=p).rev().collect(), Direction::Left)
    } else {
        (Vec::new(), Direction::Right)
    }
}

#[allow(clippy::too_many_arguments)]
fn add_segment(
    g: &mut ViewGraph,
    synthesized: &mut SynthesizedTable,
    bundles: &IndexMap<BundleKey, Bundle>,
    key: &BundleKey,
    bundle: &Bundle,
    v: &str,
    w: &str,
    index: usize,
) -> Result<()> {
    let v_dir = g
        .node(v)
        .map(|n| n.node.direction())
        .ok_or_else(|| Error::NotFound {
            node: v.to_string(),
        })?;
    let w_dir = g
        .node(w)
        .map(|n| n.node.direction())
        .ok_or_else(|| Error::NotFound {
            node: w.to_string(),
        })?;
    let (rv, bv, pv) = g.graph().ordering.indices(v)?;
    let (rw, _, _) = g.graph().ordering.indices(w)?;
    let (ranks, direction) = waypoint_ranks(rv, v_dir, rw, w_dir);

    let mut u = v.to_string();
    for r in ranks {
        if let Some(existing) = synthesized.get(v, w, r) {
            let id = existing.clone();
            add_edge(g, bundles, &u, &id, key, bundle.flow_partition.as_ref())?;
            u = id;
            continue;
        }

        let id = waypoint_name(g, v, w, r);
        g.set_node(
            id.as_str(),
            ViewNode {
                node: Node::Waypoint(Waypoint {
                    direction,
                    partition: bundle.default_partition.clone(),
                    title: Some(String::new()),
                }),
                bundle: Some(key.clone()),
            },
        );
        add_edge(g, bundles, &u, &id, key, bundle.flow_partition.as_ref())?;

        let (band, position) = if r == rv {
            // Anchored next to the source, on the side it faces.
            match v_dir {
                Direction::Right => (bv, pv + 1),
                Direction::Left => (bv, pv),
            }
        } else {
            let (previous, side) = match direction {
                Direction::Right => (r - 1, Side::Above),
                Direction::Left => (r + 1, Side::Below),
            };
            let ordering = &g.graph().ordering;
            let (Some(this_bands), Some(other_bands)) =
                (ordering.rank(r), ordering.rank(previous))
            else {
                return Err(Error::IndexOutOfRange {
                    rank: r,
                    band: 0,
                    position: 0,
                });
            };
            new_node_indices(g, this_bands, other_bands, &id, side)
        };
        g.graph_mut()
            .ordering
            .insert(r, band, position, id.as_str())?;
        trace!(waypoint = %id, bundle = %key, rank = r, band, position, "placed waypoint");

        synthesized.insert(
            v,
            w,
            r,
            id.clone(),
            Synthesized {
                bundle: key.clone(),
                index,
            },
        );
        u = id;
    }

    add_edge(g, bundles, &u, w, key, bundle.flow_partition.as_ref())
}

/// Adds `v -> w` for bundle `key`, or appends `key` to the existing edge.
pub(crate) fn add_edge(
    g: &mut ViewGraph,
    bundles: &IndexMap<BundleKey, Bundle>,
    v: &str,
    w: &str,
    key: &BundleKey,
    flow_partition: Option<&Partition>,
) -> Result<()> {
    let Some(edge) = g.edge_mut(v, w, None) else {
        g.set_edge_with_label(
            v,
            w,
            ViewEdge {
                bundles: vec![key.clone()],
                flow_partition: flow_partition.cloned(),
            },
        );
        return Ok(());
    };

    if let (Some(existing), Some(incoming)) = (&edge.flow_partition, flow_partition) {
        if existing != incoming {
            let owner = edge
                .bundles
                .iter()
                .find(|k| {
                    bundles
                        .get(*k)
                        .is_some_and(|b| b.flow_partition.as_ref() == Some(existing))
                })
                .unwrap_or(key);
            return Err(Error::ConflictingPartition {
                v: v.to_string(),
                w: w.to_string(),
                existing: owner.clone(),
                incoming: key.clone(),
            });
        }
    }
    if edge.flow_partition.is_none() {
        edge.flow_partition = flow_partition.cloned();
    }
    edge.bundles.push(key.clone());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_waypoint_ranks_depend_on_directions() {
        use Direction::{Left, Right};
        assert_eq!(waypoint_ranks(0, Right, 3, Right), (vec![1, 2], Right));
        assert_eq!(waypoint_ranks(0, Left, 3, Right), (vec![0, 1, 2], Right));
        assert_eq!(waypoint_ranks(0, Right, 3, Left), (vec![1, 2, 3], Right));
        assert_eq!(waypoint_ranks(0, Right, 1, Right), (vec![], Right));
    }

    #[test]
    fn backward_waypoint_ranks_run_towards_the_target() {
        use Direction::{Left, Right};
        assert_eq!(waypoint_ranks(2, Right, 0, Right), (vec![2, 1, 0], Left));
        assert_eq!(waypoint_ranks(2, Left, 0, Left), (vec![1], Left));
        assert_eq!(waypoint_ranks(1, Left, 0, Left), (vec![], Left));
    }

    #[test]
    fn same_rank_needs_no_waypoints() {
        assert!(waypoint_ranks(1, Direction::Right, 1, Direction::Left).0.is_empty());
    }
}
