use crate::augment::{augment, elsewhere_bundles};
use crate::error::Result;
use crate::model::ViewDefinition;
use crate::options::SankeyOptions;
use crate::results::{BundleFlows, GroupRecord, ResultsGraph, results_graph};
use crate::view_graph::view_graph;
use tracing::debug;

/// Builds the view graph for `definition`, optionally adds elsewhere stubs, and aggregates
/// `flows` onto it.
pub fn sankey_view<F>(
    definition: &ViewDefinition,
    flows: &F,
    options: &SankeyOptions,
) -> Result<(ResultsGraph, Vec<GroupRecord>)>
where
    F: BundleFlows + ?Sized,
{
    let (mut graph, _) = view_graph(definition)?;
    if options.elsewhere {
        let (nodes, bundles) = elsewhere_bundles(definition, options.strict_elsewhere)?;
        if !bundles.is_empty() {
            debug!(stubs = bundles.len(), "augmenting view graph");
            graph = augment(&graph, &nodes, &bundles)?;
        }
    }
    results_graph(
        &graph,
        flows,
        definition.flow_partition.as_ref(),
        definition.time_partition.as_ref(),
    )
}
