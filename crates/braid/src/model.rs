//! View definition types: process groups, waypoints, bundles and the definition aggregate.
//!
//! These are plain, `Clone`-friendly values. A [`ViewDefinition`] is never mutated by the
//! builder; every build works on its own copy.

use crate::error::{Error, Result};
use crate::ordering::Ordering;
use crate::partition::Partition;
use indexmap::IndexMap;
use rustc_hash::FxHashSet as HashSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Which side of the diagram a node faces. Flow leaves a `Right` node on its right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "L")]
    Left,
}

impl Direction {
    /// Rank step taken by flow leaving a node with this direction.
    pub fn rank_step(self) -> isize {
        match self {
            Direction::Right => 1,
            Direction::Left => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Right => f.write_str("R"),
            Direction::Left => f.write_str("L"),
        }
    }
}

/// Bundle identity. Bundles declared as a list are keyed by their index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BundleKey {
    Index(usize),
    Name(String),
}

impl fmt::Display for BundleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleKey::Index(i) => write!(f, "{i}"),
            BundleKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for BundleKey {
    fn from(value: usize) -> Self {
        BundleKey::Index(value)
    }
}

impl From<&str> for BundleKey {
    fn from(value: &str) -> Self {
        BundleKey::Name(value.to_string())
    }
}

impl From<String> for BundleKey {
    fn from(value: String) -> Self {
        BundleKey::Name(value)
    }
}

/// One end of a bundle: a declared node, or outside the diagram.
///
/// Serialized as the node key, or `null` for [`Endpoint::Elsewhere`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Endpoint {
    Node(String),
    Elsewhere,
}

impl Endpoint {
    pub fn node(&self) -> Option<&str> {
        match self {
            Endpoint::Node(key) => Some(key),
            Endpoint::Elsewhere => None,
        }
    }

    pub fn is_elsewhere(&self) -> bool {
        matches!(self, Endpoint::Elsewhere)
    }
}

impl From<Option<String>> for Endpoint {
    fn from(value: Option<String>) -> Self {
        value.map_or(Endpoint::Elsewhere, Endpoint::Node)
    }
}

impl From<Endpoint> for Option<String> {
    fn from(value: Endpoint) -> Self {
        match value {
            Endpoint::Node(key) => Some(key),
            Endpoint::Elsewhere => None,
        }
    }
}

impl From<&str> for Endpoint {
    fn from(value: &str) -> Self {
        Endpoint::Node(value.to_string())
    }
}

impl From<String> for Endpoint {
    fn from(value: String) -> Self {
        Endpoint::Node(value)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Node(key) => f.write_str(key),
            Endpoint::Elsewhere => f.write_str("*elsewhere*"),
        }
    }
}

/// Which way a bundle crosses the diagram boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElsewhereFlow {
    To,
    From,
}

impl fmt::Display for ElsewhereFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElsewhereFlow::To => f.write_str("to"),
            ElsewhereFlow::From => f.write_str("from"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessGroup {
    pub selection: Vec<String>,
    pub direction: Direction,
    pub partition: Option<Partition>,
    pub title: Option<String>,
}

impl ProcessGroup {
    pub fn new<I, S>(selection: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selection: selection.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_partition(mut self, partition: Partition) -> Self {
        self.partition = Some(partition);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Waypoint {
    pub direction: Direction,
    pub partition: Option<Partition>,
    pub title: Option<String>,
}

impl Waypoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_partition(mut self, partition: Partition) -> Self {
        self.partition = Some(partition);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A diagram node as seen by the layout code.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Process(ProcessGroup),
    Waypoint(Waypoint),
}

impl Default for Node {
    fn default() -> Self {
        Node::Waypoint(Waypoint::default())
    }
}

impl Node {
    pub fn direction(&self) -> Direction {
        match self {
            Node::Process(pg) => pg.direction,
            Node::Waypoint(wp) => wp.direction,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Node::Process(pg) => pg.title.as_deref(),
            Node::Waypoint(wp) => wp.title.as_deref(),
        }
    }

    pub fn partition(&self) -> Option<&Partition> {
        match self {
            Node::Process(pg) => pg.partition.as_ref(),
            Node::Waypoint(wp) => wp.partition.as_ref(),
        }
    }

    pub fn selection(&self) -> &[String] {
        match self {
            Node::Process(pg) => &pg.selection,
            Node::Waypoint(_) => &[],
        }
    }

    /// True for nodes backed by real dataset entities.
    pub fn is_process(&self) -> bool {
        !self.selection().is_empty()
    }
}

impl From<ProcessGroup> for Node {
    fn from(value: ProcessGroup) -> Self {
        Node::Process(value)
    }
}

impl From<Waypoint> for Node {
    fn from(value: Waypoint) -> Self {
        Node::Waypoint(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub source: Endpoint,
    pub target: Endpoint,
    #[serde(default)]
    pub waypoints: Vec<String>,
    #[serde(default)]
    pub default_partition: Option<Partition>,
    #[serde(default)]
    pub flow_partition: Option<Partition>,
}

impl Bundle {
    pub fn new(source: impl Into<Endpoint>, target: impl Into<Endpoint>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            waypoints: Vec::new(),
            default_partition: None,
            flow_partition: None,
        }
    }

    pub fn with_waypoints<I, S>(mut self, waypoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.waypoints = waypoints.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_partition(mut self, partition: Partition) -> Self {
        self.default_partition = Some(partition);
        self
    }

    pub fn with_flow_partition(mut self, partition: Partition) -> Self {
        self.flow_partition = Some(partition);
        self
    }

    pub fn to_elsewhere(&self) -> bool {
        self.target.is_elsewhere()
    }

    pub fn from_elsewhere(&self) -> bool {
        self.source.is_elsewhere()
    }

    /// Source, waypoints and target in routing order.
    pub fn chain(&self) -> Vec<Endpoint> {
        let mut chain = Vec::with_capacity(self.waypoints.len() + 2);
        chain.push(self.source.clone());
        chain.extend(self.waypoints.iter().cloned().map(Endpoint::Node));
        chain.push(self.target.clone());
        chain
    }
}

/// The author-supplied description of a diagram.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewDefinition {
    #[serde(default)]
    pub process_groups: IndexMap<String, ProcessGroup>,
    #[serde(default)]
    pub waypoints: IndexMap<String, Waypoint>,
    #[serde(
        default,
        serialize_with = "serialize_bundles",
        deserialize_with = "deserialize_bundles"
    )]
    pub bundles: IndexMap<BundleKey, Bundle>,
    #[serde(default)]
    pub ordering: Ordering,
    #[serde(default)]
    pub flow_partition: Option<Partition>,
    #[serde(default)]
    pub time_partition: Option<Partition>,
}

impl ViewDefinition {
    /// Creates a definition from bundles given as a list; bundle keys are list indices.
    pub fn new<P, W, B>(process_groups: P, waypoints: W, bundles: B, ordering: Ordering) -> Self
    where
        P: IntoIterator<Item = (String, ProcessGroup)>,
        W: IntoIterator<Item = (String, Waypoint)>,
        B: IntoIterator<Item = Bundle>,
    {
        Self::with_keyed_bundles(
            process_groups,
            waypoints,
            bundles
                .into_iter()
                .enumerate()
                .map(|(i, b)| (BundleKey::Index(i), b)),
            ordering,
        )
    }

    pub fn with_keyed_bundles<P, W, B>(
        process_groups: P,
        waypoints: W,
        bundles: B,
        ordering: Ordering,
    ) -> Self
    where
        P: IntoIterator<Item = (String, ProcessGroup)>,
        W: IntoIterator<Item = (String, Waypoint)>,
        B: IntoIterator<Item = (BundleKey, Bundle)>,
    {
        Self {
            process_groups: process_groups.into_iter().collect(),
            waypoints: waypoints.into_iter().collect(),
            bundles: bundles.into_iter().collect(),
            ordering,
            flow_partition: None,
            time_partition: None,
        }
    }

    pub fn with_flow_partition(mut self, partition: Partition) -> Self {
        self.flow_partition = Some(partition);
        self
    }

    pub fn with_time_partition(mut self, partition: Partition) -> Self {
        self.time_partition = Some(partition);
        self
    }

    /// Parses and validates a JSON view definition.
    pub fn from_json(input: &str) -> Result<Self> {
        let definition: Self = serde_json::from_str(input)?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn has_node(&self, key: &str) -> bool {
        self.process_groups.contains_key(key) || self.waypoints.contains_key(key)
    }

    pub fn node(&self, key: &str) -> Option<Node> {
        if let Some(pg) = self.process_groups.get(key) {
            return Some(Node::Process(pg.clone()));
        }
        self.waypoints.get(key).cloned().map(Node::Waypoint)
    }

    pub fn direction(&self, key: &str) -> Option<Direction> {
        if let Some(pg) = self.process_groups.get(key) {
            return Some(pg.direction);
        }
        self.waypoints.get(key).map(|wp| wp.direction)
    }

    /// Every declared node, process groups first, each in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, Node)> {
        let pgs = self
            .process_groups
            .iter()
            .map(|(k, pg)| (k.as_str(), Node::Process(pg.clone())));
        let wps = self
            .waypoints
            .iter()
            .map(|(k, wp)| (k.as_str(), Node::Waypoint(wp.clone())));
        pgs.chain(wps)
    }

    /// Checks bundle endpoints and the skeleton placement of every declared node.
    pub fn validate(&self) -> Result<()> {
        for key in self.process_groups.keys() {
            if self.waypoints.contains_key(key) {
                return Err(Error::Placement {
                    node: key.clone(),
                    reason: "declared both as a process group and as a waypoint".to_string(),
                });
            }
        }

        for (key, bundle) in &self.bundles {
            if bundle.source.is_elsewhere() && bundle.target.is_elsewhere() {
                return Err(Error::InvalidBundleEndpoints {
                    bundle: key.clone(),
                    reason: "source and target are both elsewhere".to_string(),
                });
            }
            for endpoint in [&bundle.source, &bundle.target] {
                if let Some(node) = endpoint.node() {
                    if !self.has_node(node) {
                        return Err(Error::InvalidBundleEndpoints {
                            bundle: key.clone(),
                            reason: format!("unknown node \"{node}\""),
                        });
                    }
                }
            }
            for waypoint in &bundle.waypoints {
                if !self.has_node(waypoint) {
                    return Err(Error::InvalidBundleEndpoints {
                        bundle: key.clone(),
                        reason: format!("unknown waypoint \"{waypoint}\""),
                    });
                }
            }
        }

        let mut placed: HashSet<&str> = HashSet::default();
        for node in self.ordering.nodes() {
            if !self.has_node(node) {
                return Err(Error::Placement {
                    node: node.to_string(),
                    reason: "ordering refers to an undeclared node".to_string(),
                });
            }
            if !placed.insert(node) {
                return Err(Error::Placement {
                    node: node.to_string(),
                    reason: "node occurs more than once in the ordering".to_string(),
                });
            }
        }
        for (key, _) in self.nodes() {
            if !placed.contains(key) {
                return Err(Error::Placement {
                    node: key.to_string(),
                    reason: "node has no rank in the ordering".to_string(),
                });
            }
        }
        Ok(())
    }
}

// Index-keyed bundles are written back as a list so they load with the same keys.
fn serialize_bundles<S>(
    bundles: &IndexMap<BundleKey, Bundle>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let listed = bundles
        .keys()
        .enumerate()
        .all(|(i, key)| *key == BundleKey::Index(i));
    if listed {
        serializer.collect_seq(bundles.values())
    } else {
        serializer.collect_map(bundles)
    }
}

fn deserialize_bundles<'de, D>(deserializer: D) -> std::result::Result<IndexMap<BundleKey, Bundle>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Bundles {
        List(Vec<Bundle>),
        Keyed(IndexMap<String, Bundle>),
    }

    Ok(match Bundles::deserialize(deserializer)? {
        Bundles::List(list) => list
            .into_iter()
            .enumerate()
            .map(|(i, b)| (BundleKey::Index(i), b))
            .collect(),
        Bundles::Keyed(map) => map
            .into_iter()
            .map(|(key, b)| (bundle_key_from_map_key(key), b))
            .collect(),
    })
}

/// Map keys are always strings; one spelling an index exactly (`"3"`, not `"03"`) is read
/// back as [`BundleKey::Index`].
fn bundle_key_from_map_key(key: String) -> BundleKey {
    match key.parse::<usize>() {
        Ok(i) if i.to_string() == key => BundleKey::Index(i),
        _ => BundleKey::Name(key),
    }
}
