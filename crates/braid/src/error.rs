use crate::model::{BundleKey, ElsewhereFlow};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("bundle {bundle} has invalid endpoints: {reason}")]
    InvalidBundleEndpoints { bundle: BundleKey, reason: String },

    #[error("cannot place node \"{node}\": {reason}")]
    Placement { node: String, reason: String },

    #[error("conflicting flow partitions on edge {v} -> {w} (bundles {existing} and {incoming})")]
    ConflictingPartition {
        v: String,
        w: String,
        existing: BundleKey,
        incoming: BundleKey,
    },

    #[error("node \"{node}\" not found in ordering")]
    NotFound { node: String },

    #[error("ordering index out of range: rank {rank}, band {band}, position {position}")]
    IndexOutOfRange {
        rank: usize,
        band: usize,
        position: usize,
    },

    #[error("more than one bundle {flow} elsewhere for node \"{node}\"")]
    DuplicateElsewhereBundle { node: String, flow: ElsewhereFlow },

    // Field names avoid `source`, which thiserror reserves for the underlying error.
    #[error("flow {flow_source} -> {flow_target} matches more than one group (second match: \"{label}\")")]
    AmbiguousPartition {
        label: String,
        flow_source: String,
        flow_target: String,
    },

    #[error("internal consistency error: {message}")]
    Internal { message: String },

    #[error("invalid view definition: {0}")]
    InvalidDefinition(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
