//! Rank / band / position container.
//!
//! An [`Ordering`] is a sequence of ranks (left to right), each rank a sequence of bands (top to
//! bottom), each band a sequence of node keys. A key occupies exactly one slot.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// End of the rank sequence to grow at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankEdge {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Ordering {
    ranks: Vec<Vec<Vec<String>>>,
}

impl Ordering {
    /// Builds an ordering from ranks of bands. A rank without bands gets one empty band.
    pub fn new<R, B, N, S>(ranks: R) -> Self
    where
        R: IntoIterator<Item = B>,
        B: IntoIterator<Item = N>,
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ranks = ranks
            .into_iter()
            .map(|bands| {
                let mut bands: Vec<Vec<String>> = bands
                    .into_iter()
                    .map(|band| band.into_iter().map(Into::into).collect())
                    .collect();
                if bands.is_empty() {
                    bands.push(Vec::new());
                }
                bands
            })
            .collect();
        Self { ranks }
    }

    /// Builds an ordering where every rank holds a single band.
    pub fn from_ranks<R, N, S>(ranks: R) -> Self
    where
        R: IntoIterator<Item = N>,
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ranks.into_iter().map(|rank| [rank]))
    }

    pub fn ranks(&self) -> &[Vec<Vec<String>>] {
        &self.ranks
    }

    pub fn rank(&self, rank: usize) -> Option<&[Vec<String>]> {
        self.ranks.get(rank).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Every key, rank by rank, band by band.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.ranks
            .iter()
            .flat_map(|bands| bands.iter().flat_map(|band| band.iter().map(String::as_str)))
    }

    pub fn contains(&self, node: &str) -> bool {
        self.nodes().any(|n| n == node)
    }

    /// `(rank, band, position)` of `node`.
    pub fn indices(&self, node: &str) -> Result<(usize, usize, usize)> {
        for (r, bands) in self.ranks.iter().enumerate() {
            for (b, band) in bands.iter().enumerate() {
                if let Some(p) = band.iter().position(|n| n == node) {
                    return Ok((r, b, p));
                }
            }
        }
        Err(Error::NotFound {
            node: node.to_string(),
        })
    }

    /// Inserts `node` at `position` of the band, shifting later nodes right.
    pub fn insert(
        &mut self,
        rank: usize,
        band: usize,
        position: usize,
        node: impl Into<String>,
    ) -> Result<()> {
        let node = node.into();
        if self.contains(&node) {
            return Err(Error::Placement {
                node,
                reason: "node is already in the ordering".to_string(),
            });
        }
        let out_of_range = Error::IndexOutOfRange {
            rank,
            band,
            position,
        };
        let Some(slot) = self.ranks.get_mut(rank).and_then(|bands| bands.get_mut(band)) else {
            return Err(out_of_range);
        };
        if position > slot.len() {
            return Err(out_of_range);
        }
        slot.insert(position, node);
        Ok(())
    }

    /// Adds an empty rank at either end, with as many bands as the rank it is placed next to.
    ///
    /// Growing at [`RankEdge::Start`] shifts every existing rank index up by one.
    pub fn grow(&mut self, edge: RankEdge) {
        let neighbour = match edge {
            RankEdge::Start => self.ranks.first(),
            RankEdge::End => self.ranks.last(),
        };
        let band_count = neighbour.map_or(1, |bands| bands.len().max(1));
        let empty = vec![Vec::new(); band_count];
        match edge {
            RankEdge::Start => self.ranks.insert(0, empty),
            RankEdge::End => self.ranks.push(empty),
        }
    }

    /// Keeps only the keys for which `keep` returns true. Bands and ranks are kept.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        for bands in &mut self.ranks {
            for band in bands.iter_mut() {
                band.retain(|n| keep(n));
            }
        }
    }

    /// Removes ranks in which every band is empty.
    pub fn drop_empty_ranks(&mut self) {
        self.ranks
            .retain(|bands| bands.iter().any(|band| !band.is_empty()));
    }
}

impl<'de> Deserialize<'de> for Ordering {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Layers {
            Banded(Vec<Vec<Vec<String>>>),
            Flat(Vec<Vec<String>>),
        }

        Ok(match Layers::deserialize(deserializer)? {
            Layers::Banded(ranks) => Ordering::new(ranks),
            Layers::Flat(ranks) => Ordering::from_ranks(ranks),
        })
    }
}

/// Concatenates `bands` into one sequence, returning the start offset of every band.
pub fn flatten_bands(bands: &[Vec<String>]) -> (Vec<String>, Vec<usize>) {
    let mut flat = Vec::new();
    let mut offsets = Vec::with_capacity(bands.len());
    for band in bands {
        offsets.push(flat.len());
        flat.extend(band.iter().cloned());
    }
    (flat, offsets)
}

/// Inverse of [`flatten_bands`].
pub fn unflatten_bands(flat: &[String], offsets: &[usize]) -> Vec<Vec<String>> {
    offsets
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = offsets.get(i + 1).copied().unwrap_or(flat.len());
            flat[start..end].to_vec()
        })
        .collect()
}

/// Band containing flat position `pos`: the last band whose start offset is `<= pos`.
pub fn band_index(offsets: &[usize], pos: f64) -> usize {
    offsets
        .iter()
        .rposition(|&start| pos >= start as f64)
        .unwrap_or(offsets.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flatten_and_unflatten_bands() {
        let bands = vec![strings(&["a"]), strings(&["b", "c"]), strings(&["d"])];
        let (flat, offsets) = flatten_bands(&bands);
        assert_eq!(flat, strings(&["a", "b", "c", "d"]));
        assert_eq!(offsets, vec![0, 1, 3]);
        assert_eq!(unflatten_bands(&flat, &offsets), bands);
    }

    #[test]
    fn band_index_finds_the_enclosing_band() {
        // a | b c | d
        let offsets = [0, 1, 3];
        assert_eq!(band_index(&offsets, 0.0), 0);
        assert_eq!(band_index(&offsets, 1.0), 1);
        assert_eq!(band_index(&offsets, 2.0), 1);
        assert_eq!(band_index(&offsets, 2.5), 1);
        assert_eq!(band_index(&offsets, 3.0), 2);
        assert_eq!(band_index(&offsets, 9.0), 2);
    }

    #[test]
    fn band_index_skips_empty_bands() {
        // (empty) | a | (empty) | b
        let offsets = [0, 0, 1, 1];
        assert_eq!(band_index(&offsets, 0.0), 1);
        assert_eq!(band_index(&offsets, 1.0), 3);
    }
}
