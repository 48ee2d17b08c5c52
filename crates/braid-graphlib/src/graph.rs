//! Graph container used by `braid`.
//!
//! `Graph<N, E, G>` stores node labels `N`, edge labels `E` and a single graph label `G`.
//! Adjacency is kept per node as edge indices so successor / predecessor queries do not scan
//! every edge.

mod edge_key;
mod entries;
mod options;

use rustc_hash::FxBuildHasher;

pub use edge_key::EdgeKey;
pub use options::GraphOptions;

use edge_key::EdgeKeyView;
use entries::{EdgeEntry, NodeEntry};

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

#[derive(Debug, Clone)]
pub struct Graph<N, E, G>
where
    N: Default,
    E: Default,
    G: Default,
{
    options: GraphOptions,
    graph_label: G,

    nodes: Vec<NodeEntry<N>>,
    node_index: HashMap<String, usize>,

    edges: Vec<EdgeEntry<E>>,
    edge_index: HashMap<EdgeKey, usize>,
}

impl<N, E, G> Default for Graph<N, E, G>
where
    N: Default,
    E: Default,
    G: Default,
{
    fn default() -> Self {
        Self::new(GraphOptions::default())
    }
}

impl<N, E, G> Graph<N, E, G>
where
    N: Default,
    E: Default,
    G: Default,
{
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            graph_label: G::default(),
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
        }
    }

    fn edge_ix(&self, v: &str, w: &str, name: Option<&str>) -> Option<usize> {
        let view = EdgeKeyView::new(v, w, name, self.options.multigraph);
        self.edge_index.get(&view).copied()
    }

    pub fn set_graph(&mut self, label: G) -> &mut Self {
        self.graph_label = label;
        self
    }

    pub fn graph(&self) -> &G {
        &self.graph_label
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph_label
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Inserts a node, or replaces the label of an existing one.
    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> &mut Self {
        let id = id.into();
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].label = label;
            return self;
        }
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            label,
            out: Vec::new(),
            in_: Vec::new(),
        });
        self.node_index.insert(id, idx);
        self
    }

    pub fn ensure_node(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if self.node_index.contains_key(&id) {
            return self;
        }
        self.set_node(id, N::default())
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx].label)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        self.node_index
            .get(id)
            .copied()
            .map(move |idx| &mut self.nodes[idx].label)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter().map(|e| &e.key)
    }

    pub fn for_each_edge<F>(&self, mut f: F)
    where
        F: FnMut(&EdgeKey, &E),
    {
        for e in &self.edges {
            f(&e.key, &e.label);
        }
    }

    pub fn set_edge(&mut self, v: impl Into<String>, w: impl Into<String>) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, None)
    }

    pub fn set_edge_with_label(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        label: E,
    ) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, Some(label))
    }

    /// Inserts an edge, creating missing endpoints with default labels.
    ///
    /// An existing edge keeps its label unless `label` is given. The `name` is ignored unless
    /// the graph is a multigraph.
    pub fn set_edge_named(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
        label: Option<E>,
    ) -> &mut Self {
        let v = v.into();
        let w = w.into();
        let name = if self.options.multigraph {
            name.map(Into::into)
        } else {
            None
        };

        if let Some(idx) = self.edge_ix(&v, &w, name.as_deref()) {
            if let Some(label) = label {
                self.edges[idx].label = label;
            }
            return self;
        }

        self.ensure_node(v.clone());
        self.ensure_node(w.clone());
        let idx = self.edges.len();
        let v_ix = self.node_index[v.as_str()];
        let w_ix = self.node_index[w.as_str()];
        self.nodes[v_ix].out.push(idx);
        self.nodes[w_ix].in_.push(idx);

        let key = EdgeKey { v, w, name };
        self.edges.push(EdgeEntry {
            key: key.clone(),
            label: label.unwrap_or_default(),
        });
        self.edge_index.insert(key, idx);
        self
    }

    pub fn set_path(&mut self, nodes: &[&str]) -> &mut Self {
        for pair in nodes.windows(2) {
            self.set_edge(pair[0], pair[1]);
        }
        self
    }

    pub fn has_edge(&self, v: &str, w: &str, name: Option<&str>) -> bool {
        self.edge_ix(v, w, name).is_some()
    }

    pub fn edge(&self, v: &str, w: &str, name: Option<&str>) -> Option<&E> {
        let idx = self.edge_ix(v, w, name)?;
        Some(&self.edges[idx].label)
    }

    pub fn edge_mut(&mut self, v: &str, w: &str, name: Option<&str>) -> Option<&mut E> {
        let idx = self.edge_ix(v, w, name)?;
        Some(&mut self.edges[idx].label)
    }

    pub fn edge_by_key(&self, key: &EdgeKey) -> Option<&E> {
        self.edge(&key.v, &key.w, key.name.as_deref())
    }

    /// Removes a node and every edge incident to it.
    pub fn remove_node(&mut self, id: &str) -> bool {
        if !self.node_index.contains_key(id) {
            return false;
        }
        self.nodes.retain(|n| n.id != id);
        self.edges.retain(|e| e.key.v != id && e.key.w != id);
        self.reindex();
        true
    }

    fn reindex(&mut self) {
        self.node_index.clear();
        for (idx, n) in self.nodes.iter_mut().enumerate() {
            n.out.clear();
            n.in_.clear();
            self.node_index.insert(n.id.clone(), idx);
        }
        self.edge_index.clear();
        for (idx, e) in self.edges.iter().enumerate() {
            let v_ix = self.node_index[e.key.v.as_str()];
            let w_ix = self.node_index[e.key.w.as_str()];
            self.nodes[v_ix].out.push(idx);
            self.nodes[w_ix].in_.push(idx);
            self.edge_index.insert(e.key.clone(), idx);
        }
    }

    pub fn successors(&self, v: &str) -> Vec<&str> {
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        let mut out: Vec<&str> = Vec::with_capacity(self.nodes[v_ix].out.len());
        for &edge_idx in &self.nodes[v_ix].out {
            let w = self.edges[edge_idx].key.w.as_str();
            if !out.contains(&w) {
                out.push(w);
            }
        }
        out
    }

    pub fn predecessors(&self, v: &str) -> Vec<&str> {
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        let mut out: Vec<&str> = Vec::with_capacity(self.nodes[v_ix].in_.len());
        for &edge_idx in &self.nodes[v_ix].in_ {
            let u = self.edges[edge_idx].key.v.as_str();
            if !out.contains(&u) {
                out.push(u);
            }
        }
        out
    }

    pub fn neighbors(&self, v: &str) -> Vec<&str> {
        let mut out = self.successors(v);
        for u in self.predecessors(v) {
            if !out.contains(&u) {
                out.push(u);
            }
        }
        out
    }

    /// True when an edge runs between `v` and `w` in either direction.
    pub fn is_adjacent(&self, v: &str, w: &str) -> bool {
        let Some(&v_ix) = self.node_index.get(v) else {
            return false;
        };
        let node = &self.nodes[v_ix];
        node.out.iter().any(|&e| self.edges[e].key.w == w)
            || node.in_.iter().any(|&e| self.edges[e].key.v == w)
    }

    pub fn out_edges(&self, v: &str, w: Option<&str>) -> Vec<EdgeKey> {
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.nodes[v_ix]
            .out
            .iter()
            .map(|&idx| &self.edges[idx].key)
            .filter(|key| w.is_none_or(|w| key.w == w))
            .cloned()
            .collect()
    }

    pub fn in_edges(&self, v: &str, u: Option<&str>) -> Vec<EdgeKey> {
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.nodes[v_ix]
            .in_
            .iter()
            .map(|&idx| &self.edges[idx].key)
            .filter(|key| u.is_none_or(|u| key.v == u))
            .cloned()
            .collect()
    }

    /// Number of incident edges; a self loop counts twice.
    pub fn degree(&self, v: &str) -> usize {
        self.node_index
            .get(v)
            .map(|&idx| self.nodes[idx].out.len() + self.nodes[idx].in_.len())
            .unwrap_or(0)
    }
}
