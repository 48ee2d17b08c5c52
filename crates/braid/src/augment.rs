//! Synthetic bundles to and from elsewhere.
//!
//! Process groups that would otherwise have no visible connection to the outside of the
//! diagram get a one-rank stub on the side they face (`__{u}>`) and on the side they are fed
//! from (`__>{u}`).

use crate::error::{Error, Result};
use crate::heuristic::{Side, new_node_indices};
use crate::model::{Bundle, BundleKey, ElsewhereFlow, Endpoint, Node, ProcessGroup, ViewDefinition};
use crate::ordering::RankEdge;
use crate::view_graph::{ViewEdge, ViewGraph, ViewNode};
use indexmap::IndexMap;
use rustc_hash::FxHashSet as HashSet;
use tracing::{debug, trace};

/// Dummy nodes and bundles keyed by the dummy id.
pub type ElsewhereBundles = (IndexMap<String, ProcessGroup>, IndexMap<BundleKey, Bundle>);

pub fn to_elsewhere_id(node: &str) -> String {
    format!("__{node}>")
}

pub fn from_elsewhere_id(node: &str) -> String {
    format!("__>{node}")
}

/// Finds the process groups missing a bundle to or from elsewhere and synthesizes one for each.
///
/// A stub is only added when the rank it would occupy exists, unless the definition has no
/// bundles at all, in which case every process group gets both. With `strict`, a second
/// explicit bundle to (or from) elsewhere for the same node is rejected.
pub fn elsewhere_bundles(definition: &ViewDefinition, strict: bool) -> Result<ElsewhereBundles> {
    let mut has_to: HashSet<&str> = HashSet::default();
    let mut has_from: HashSet<&str> = HashSet::default();
    for (key, bundle) in &definition.bundles {
        match (&bundle.source, &bundle.target) {
            (Endpoint::Node(u), Endpoint::Elsewhere) => {
                if !has_to.insert(u) && strict {
                    return Err(Error::DuplicateElsewhereBundle {
                        node: u.clone(),
                        flow: ElsewhereFlow::To,
                    });
                }
            }
            (Endpoint::Elsewhere, Endpoint::Node(u)) => {
                if !has_from.insert(u) && strict {
                    return Err(Error::DuplicateElsewhereBundle {
                        node: u.clone(),
                        flow: ElsewhereFlow::From,
                    });
                }
            }
            (Endpoint::Elsewhere, Endpoint::Elsewhere) => {
                return Err(Error::InvalidBundleEndpoints {
                    bundle: key.clone(),
                    reason: "source and target are both elsewhere".to_string(),
                });
            }
            _ => {}
        }
    }

    let rank_count = definition.ordering.len() as isize;
    let no_bundles = definition.bundles.is_empty();
    let in_range = |r: isize| (0..rank_count).contains(&r);

    let mut nodes = IndexMap::new();
    let mut bundles = IndexMap::new();
    for (u, group) in &definition.process_groups {
        if group.selection.is_empty() {
            continue;
        }
        let step = group.direction.rank_step();
        let (r, _, _) = definition.ordering.indices(u)?;
        let r = r as isize;

        if no_bundles || (in_range(r + step) && !has_to.contains(u.as_str())) {
            let id = to_elsewhere_id(u);
            claim(definition, &id)?;
            nodes.insert(id.clone(), ProcessGroup::default().with_direction(group.direction));
            bundles.insert(
                BundleKey::Name(id.clone()),
                Bundle::new(u.as_str(), Endpoint::Elsewhere).with_waypoints([id]),
            );
        }
        if no_bundles || (in_range(r - step) && !has_from.contains(u.as_str())) {
            let id = from_elsewhere_id(u);
            claim(definition, &id)?;
            nodes.insert(id.clone(), ProcessGroup::default().with_direction(group.direction));
            bundles.insert(
                BundleKey::Name(id.clone()),
                Bundle::new(Endpoint::Elsewhere, u.as_str()).with_waypoints([id]),
            );
        }
    }

    debug!(bundles = bundles.len(), "synthesized elsewhere bundles");
    Ok((nodes, bundles))
}

fn claim(definition: &ViewDefinition, id: &str) -> Result<()> {
    if definition.has_node(id) {
        return Err(Error::Internal {
            message: format!("elsewhere stub \"{id}\" collides with a declared node"),
        });
    }
    Ok(())
}

/// Returns a copy of `graph` with the stub nodes of `new_bundles` added and placed.
///
/// Each bundle must have exactly one waypoint and one end elsewhere. The stub goes one rank
/// away from its anchor; the ordering grows by an empty rank when that rank does not exist yet.
pub fn augment(
    graph: &ViewGraph,
    new_nodes: &IndexMap<String, ProcessGroup>,
    new_bundles: &IndexMap<BundleKey, Bundle>,
) -> Result<ViewGraph> {
    let mut g = graph.clone();

    let mut keys: Vec<&BundleKey> = new_bundles.keys().collect();
    keys.sort();

    for key in keys {
        let bundle = &new_bundles[key];
        let [w] = bundle.waypoints.as_slice() else {
            return Err(Error::Internal {
                message: format!("elsewhere bundle {key} must have exactly one waypoint"),
            });
        };
        let (anchor, flow) = match (&bundle.source, &bundle.target) {
            (Endpoint::Node(u), Endpoint::Elsewhere) => (u.as_str(), ElsewhereFlow::To),
            (Endpoint::Elsewhere, Endpoint::Node(u)) => (u.as_str(), ElsewhereFlow::From),
            _ => {
                return Err(Error::Internal {
                    message: format!("bundle {key} does not lead to or from elsewhere"),
                });
            }
        };
        let Some(stub) = new_nodes.get(w) else {
            return Err(Error::Internal {
                message: format!("no node given for elsewhere waypoint \"{w}\""),
            });
        };
        if g.has_node(w) {
            return Err(Error::Placement {
                node: w.clone(),
                reason: "elsewhere waypoint is already in the view graph".to_string(),
            });
        }
        let direction = g
            .node(anchor)
            .map(|n| n.node.direction())
            .ok_or_else(|| Error::NotFound {
                node: anchor.to_string(),
            })?;

        let step = match flow {
            ElsewhereFlow::To => direction.rank_step(),
            ElsewhereFlow::From => -direction.rank_step(),
        };
        let (r, _, _) = g.graph().ordering.indices(anchor)?;
        let r = make_room(&mut g, r, step);
        let target_rank = (r as isize + step) as usize;

        g.set_node(
            w.as_str(),
            ViewNode {
                node: Node::Process(stub.clone()),
                bundle: Some(key.clone()),
            },
        );
        let (v, u) = match flow {
            ElsewhereFlow::To => (anchor, w.as_str()),
            ElsewhereFlow::From => (w.as_str(), anchor),
        };
        g.set_edge_with_label(
            v,
            u,
            ViewEdge {
                bundles: vec![key.clone()],
                flow_partition: bundle.flow_partition.clone(),
            },
        );

        let ordering = &g.graph().ordering;
        let (Some(this_bands), Some(anchor_bands)) =
            (ordering.rank(target_rank), ordering.rank(r))
        else {
            return Err(Error::IndexOutOfRange {
                rank: target_rank,
                band: 0,
                position: 0,
            });
        };
        let (band, position) = new_node_indices(&g, this_bands, anchor_bands, w, Side::Below);
        g.graph_mut()
            .ordering
            .insert(target_rank, band, position, w.as_str())?;
        trace!(waypoint = %w, bundle = %key, rank = target_rank, band, position, "placed elsewhere stub");
    }

    Ok(g)
}

/// Grows the ordering so rank `r + step` exists; returns the anchor rank after growing.
fn make_room(g: &mut ViewGraph, r: usize, step: isize) -> usize {
    let ordering = &mut g.graph_mut().ordering;
    let target = r as isize + step;
    if target < 0 {
        ordering.grow(RankEdge::Start);
        r + 1
    } else {
        if target as usize >= ordering.len() {
            ordering.grow(RankEdge::End);
        }
        r
    }
}
