use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SankeyOptions {
    /// Add stub bundles to and from elsewhere for process groups that lack them.
    pub elsewhere: bool,
    /// Reject a second explicit bundle to (or from) elsewhere for the same node instead of
    /// accepting it.
    pub strict_elsewhere: bool,
}

impl Default for SankeyOptions {
    fn default() -> Self {
        Self {
            elsewhere: true,
            strict_elsewhere: false,
        }
    }
}
