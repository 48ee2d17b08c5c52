//! Partitions: rules that split a node, or the flows along an edge, into labelled groups.

use crate::error::{Error, Result};
use crate::results::FlowRecord;
use serde::{Deserialize, Serialize};

/// Label given to every record when no partition applies.
pub const ALL_LABEL: &str = "*";

/// Label given to records that match none of a partition's groups.
pub const OTHER_LABEL: &str = "_";

/// A labelled group: a record belongs to it when every query term matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub label: String,
    pub query: Vec<(String, Vec<String>)>,
}

impl Group {
    pub fn new<I, D, V, S>(label: impl Into<String>, query: I) -> Self
    where
        I: IntoIterator<Item = (D, V)>,
        D: Into<String>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            query: query
                .into_iter()
                .map(|(dim, values)| (dim.into(), values.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }

    fn matches(&self, record: &FlowRecord, side: Option<NodeSide>) -> bool {
        self.query.iter().all(|(dim, values)| {
            let dim = side.map_or_else(|| dim.clone(), |side| side.resolve(dim));
            record
                .field(&dim)
                .is_some_and(|value| values.iter().any(|v| v == value))
        })
    }
}

/// End of an edge a node partition is evaluated against.
///
/// Query dimensions starting with `node` are rewritten to `source` or `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSide {
    Source,
    Target,
}

impl NodeSide {
    fn resolve(self, dim: &str) -> String {
        match dim.strip_prefix("node") {
            Some(rest) => match self {
                NodeSide::Source => format!("source{rest}"),
                NodeSide::Target => format!("target{rest}"),
            },
            None => dim.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Partition {
    pub groups: Vec<Group>,
}

impl Partition {
    pub fn new(groups: impl IntoIterator<Item = Group>) -> Self {
        Self {
            groups: groups.into_iter().collect(),
        }
    }

    /// One group per value of `dim`, labelled with the value itself.
    pub fn simple<I, S>(dim: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(values.into_iter().map(|value| {
            let value = value.into();
            Group::new(value.clone(), [(dim, [value])])
        }))
    }

    /// One group per `(label, values)` pair, each matching any of its values of `dim`.
    pub fn grouped<I, L, V, S>(dim: &str, groups: I) -> Self
    where
        I: IntoIterator<Item = (L, V)>,
        L: Into<String>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            groups
                .into_iter()
                .map(|(label, values)| Group::new(label, [(dim, values)])),
        )
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.label.as_str())
    }

    /// Label of the single group `record` belongs to, or `None` when it matches no group.
    pub fn label_for(&self, record: &FlowRecord, side: Option<NodeSide>) -> Result<Option<&str>> {
        let mut found: Option<&str> = None;
        for group in &self.groups {
            if !group.matches(record, side) {
                continue;
            }
            if found.is_some() {
                return Err(Error::AmbiguousPartition {
                    label: group.label.clone(),
                    flow_source: record.source.clone(),
                    flow_target: record.target.clone(),
                });
            }
            found = Some(group.label.as_str());
        }
        Ok(found)
    }
}

/// Label for `record` under an optional partition, applying the `*` and `_` conventions.
pub fn group_label(
    partition: Option<&Partition>,
    record: &FlowRecord,
    side: Option<NodeSide>,
) -> Result<String> {
    let Some(partition) = partition else {
        return Ok(ALL_LABEL.to_string());
    };
    Ok(partition
        .label_for(record, side)?
        .unwrap_or(OTHER_LABEL)
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: &str, target: &str, material: &str) -> FlowRecord {
        FlowRecord::new(source, target, 1.0).with_attribute("material", material)
    }

    #[test]
    fn simple_partition_labels_follow_values() {
        let p = Partition::simple("material", ["m", "n"]);
        assert_eq!(p.labels().collect::<Vec<_>>(), vec!["m", "n"]);
        assert_eq!(p.label_for(&record("a", "b", "n"), None).unwrap(), Some("n"));
        assert_eq!(p.label_for(&record("a", "b", "x"), None).unwrap(), None);
    }

    #[test]
    fn node_dimensions_resolve_against_the_requested_side() {
        let p = Partition::simple("node", ["c1", "c2"]);
        let r = record("a1", "c2", "m");
        assert_eq!(p.label_for(&r, Some(NodeSide::Target)).unwrap(), Some("c2"));
        assert_eq!(p.label_for(&r, Some(NodeSide::Source)).unwrap(), None);
    }

    #[test]
    fn overlapping_groups_are_rejected() {
        let p = Partition::grouped("material", [("x", vec!["m"]), ("y", vec!["m", "n"])]);
        let err = p.label_for(&record("a", "b", "m"), None).unwrap_err();
        assert!(matches!(err, Error::AmbiguousPartition { ref label, .. } if label == "y"));
    }

    #[test]
    fn group_label_defaults() {
        let r = record("a", "b", "m");
        assert_eq!(group_label(None, &r, None).unwrap(), ALL_LABEL);
        let p = Partition::simple("material", ["n"]);
        assert_eq!(group_label(Some(&p), &r, None).unwrap(), OTHER_LABEL);
    }
}
