//! Keys addressing an edge by `(v, w, name)`.

use std::fmt;

/// Owned edge key. `name` is only ever set on multigraph edges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub v: String,
    pub w: String,
    pub name: Option<String>,
}

impl EdgeKey {
    pub fn new(
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
    ) -> Self {
        Self {
            v: v.into(),
            w: w.into(),
            name: name.map(Into::into),
        }
    }

    pub(in crate::graph) fn as_view(&self) -> EdgeKeyView<'_> {
        EdgeKeyView {
            v: &self.v,
            w: &self.w,
            name: self.name.as_deref(),
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} -> {} ({name})", self.v, self.w),
            None => write!(f, "{} -> {}", self.v, self.w),
        }
    }
}

/// Borrowed lookup key.
///
/// `String` and `Option<String>` hash like `&str` and `Option<&str>`, so a view hashes the same
/// as the [`EdgeKey`] it stands for.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(in crate::graph) struct EdgeKeyView<'a> {
    v: &'a str,
    w: &'a str,
    name: Option<&'a str>,
}

impl<'a> EdgeKeyView<'a> {
    /// Drops `name` unless the graph is a multigraph.
    pub(in crate::graph) fn new(
        v: &'a str,
        w: &'a str,
        name: Option<&'a str>,
        multigraph: bool,
    ) -> Self {
        Self {
            v,
            w,
            name: name.filter(|_| multigraph),
        }
    }
}

impl hashbrown::Equivalent<EdgeKey> for EdgeKeyView<'_> {
    fn equivalent(&self, key: &EdgeKey) -> bool {
        *self == key.as_view()
    }
}
