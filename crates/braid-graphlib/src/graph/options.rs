//! Graph configuration options.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphOptions {
    /// Allow several edges between the same ordered pair, told apart by their name.
    pub multigraph: bool,
}
