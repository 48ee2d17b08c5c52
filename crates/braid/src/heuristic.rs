//! Median placement heuristic for inserting a node into a partially ordered rank.
//!
//! A new node goes next to the weighted median of its neighbours in the adjacent rank. Existing
//! nodes are compared by their own medians, so the insertion point approximates the position
//! that introduces the fewest crossings without running a full crossing-minimization sweep.
//!
//! The even-length median follows Barth, Jünger and Mutzel, "Simple and Efficient Bilayer Cross
//! Counting" (2004): the two middle positions are weighted by the spread on the opposite side.

use crate::ordering::{band_index, flatten_bands};
use braid_graphlib::Graph;

/// Where a new node goes relative to existing nodes with the same median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    /// Before tied nodes.
    Above,
    /// After tied nodes.
    #[default]
    Below,
}

/// Positions within `layer` of every node adjacent to `u`, in layer order.
pub fn neighbour_positions<N, E, G>(g: &Graph<N, E, G>, layer: &[String], u: &str) -> Vec<usize>
where
    N: Default,
    E: Default,
    G: Default,
{
    layer
        .iter()
        .enumerate()
        .filter(|(_, n)| g.is_adjacent(u, n))
        .map(|(i, _)| i)
        .collect()
}

/// Weighted median of ascending `positions`; `None` when there are none.
pub fn median_value(positions: &[usize]) -> Option<f64> {
    let n = positions.len();
    let m = n / 2;
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(positions[m] as f64),
        2 => Some((positions[0] + positions[1]) as f64 / 2.0),
        _ => {
            let lower = positions[m - 1] as f64;
            let upper = positions[m] as f64;
            let left = lower - positions[0] as f64;
            let right = positions[n - 1] as f64 - upper;
            if left + right == 0.0 {
                return Some((lower + upper) / 2.0);
            }
            Some((lower * right + upper * left) / (left + right))
        }
    }
}

/// Replaces unknown medians with the nearest known value on the given side.
///
/// `Below` carries the previous known value forward (an unknown head becomes `0`); `Above`
/// carries the next known value backward (an unknown tail becomes the list length).
pub fn fill_unknown(values: &[Option<f64>], side: Side) -> Vec<f64> {
    match side {
        Side::Below => {
            let mut current = values.first().copied().flatten().unwrap_or(0.0);
            values
                .iter()
                .map(|v| {
                    if let Some(v) = v {
                        current = *v;
                    }
                    current
                })
                .collect()
        }
        Side::Above => {
            let mut current = values
                .last()
                .copied()
                .flatten()
                .unwrap_or(values.len() as f64);
            let mut filled: Vec<f64> = values
                .iter()
                .rev()
                .map(|v| {
                    if let Some(v) = v {
                        current = *v;
                    }
                    current
                })
                .collect();
            filled.reverse();
            filled
        }
    }
}

fn bisect(values: &[f64], x: f64, side: Side) -> usize {
    let (mut lo, mut hi) = (0, values.len());
    while lo < hi {
        let mid = (lo + hi) / 2;
        let go_right = match side {
            Side::Above => values[mid] < x,
            Side::Below => x >= values[mid],
        };
        if go_right {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

fn filled_medians<N, E, G>(
    g: &Graph<N, E, G>,
    this_layer: &[String],
    other_layer: &[String],
    side: Side,
) -> Vec<f64>
where
    N: Default,
    E: Default,
    G: Default,
{
    let medians: Vec<Option<f64>> = this_layer
        .iter()
        .map(|u| median_value(&neighbour_positions(g, other_layer, u)))
        .collect();
    fill_unknown(&medians, side)
}

/// Index at which `new_node` should be inserted into `this_layer`, judged against the adjacent
/// `other_layer`.
pub fn new_node_index_flat<N, E, G>(
    g: &Graph<N, E, G>,
    this_layer: &[String],
    other_layer: &[String],
    new_node: &str,
    side: Side,
) -> usize
where
    N: Default,
    E: Default,
    G: Default,
{
    let Some(new_pos) = median_value(&neighbour_positions(g, other_layer, new_node)) else {
        return 0;
    };
    let existing = filled_medians(g, this_layer, other_layer, side);
    bisect(&existing, new_pos, side)
}

/// `(band, position)` at which `new_node` should be inserted into a banded rank.
///
/// The band is the one holding the new node's median in the adjacent rank. The position is
/// found among the nodes of this rank whose medians fall in the same band. A node with no
/// neighbours goes to `(0, 0)`.
pub fn new_node_indices<N, E, G>(
    g: &Graph<N, E, G>,
    this_bands: &[Vec<String>],
    other_bands: &[Vec<String>],
    new_node: &str,
    side: Side,
) -> (usize, usize)
where
    N: Default,
    E: Default,
    G: Default,
{
    let (this_layer, _) = flatten_bands(this_bands);
    let (other_layer, other_offsets) = flatten_bands(other_bands);

    let Some(new_pos) = median_value(&neighbour_positions(g, &other_layer, new_node)) else {
        return (0, 0);
    };
    let band = band_index(&other_offsets, new_pos).min(this_bands.len().saturating_sub(1));

    let candidates: Vec<f64> = filled_medians(g, &this_layer, &other_layer, side)
        .into_iter()
        .filter(|&pos| band_index(&other_offsets, pos) == band)
        .collect();
    let position = bisect(&candidates, new_pos, side);
    let band_len = this_bands.get(band).map_or(0, Vec::len);
    (band, position.min(band_len))
}
