//! Upstream closure of a stream segment: its drainage basin.
//!
//! # Algorithm
//!
//! Breadth-first over the reverse adjacency index, one level at a time.
//! `visited` starts as `{root}` and the frontier as `[root]`; each popped
//! segment enqueues its upstream neighbors that are not yet visited,
//! marking them on enqueue. A segment therefore enters the queue at most
//! once, no matter how many paths reach it, and a loop in corrupt input is
//! a no-op revisit rather than an endless walk.
//!
//! Work is O(segments + links) in the size of the basin, plus one bitset
//! over the whole network.
//!
//! # Edge Cases
//!
//! - A headwater root yields a basin of exactly `{root}`.
//! - An unknown root fails with [`NetworkError::UnknownSegment`]; no
//!   partial result is returned.

use std::collections::{BTreeSet, VecDeque};

use fixedbitset::FixedBitSet;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::NetworkError;
use crate::network::{Network, SegmentId};

/// A drainage basin: a root segment plus every segment upstream of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Basin {
    /// The segment the basin drains through.
    pub root: SegmentId,
    /// Member segments, root included. Never empty.
    pub segments: BTreeSet<SegmentId>,
    /// Number of breadth-first levels walked: the longest upstream path,
    /// counted in segments, from the root to a headwater.
    pub levels: usize,
}

impl Basin {
    /// `true` if `id` drains through the root (or is the root).
    #[must_use]
    pub fn contains(&self, id: SegmentId) -> bool {
        self.segments.contains(&id)
    }

    /// Number of member segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`: a basin holds at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Member ids in ascending order.
    #[must_use]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = SegmentId> + '_ {
        self.segments.iter().copied()
    }

    /// Member ids joined with commas, as `v.extract cats=` expects.
    #[must_use]
    pub fn cats_csv(&self) -> String {
        self.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// SQL predicate matching the members on column `key`:
    /// `key = 1 OR key = 2 ...`.
    #[must_use]
    pub fn where_clause(&self, key: &str) -> String {
        self.iter()
            .map(|id| format!("{key} = {id}"))
            .collect::<Vec<_>>()
            .join(" OR ")
    }
}

/// Compute the basin draining through `root`.
///
/// # Errors
///
/// Returns [`NetworkError::UnknownSegment`] if `root` is not a segment of
/// `network`.
#[instrument(skip(network), fields(segments = network.len()))]
pub fn upstream_closure(network: &Network, root: SegmentId) -> Result<Basin, NetworkError> {
    let start = network
        .index_of(root)
        .ok_or(NetworkError::UnknownSegment { id: root })?;

    let mut visited = FixedBitSet::with_capacity(network.len());
    visited.insert(start);
    let mut frontier: VecDeque<usize> = VecDeque::from([start]);
    let mut levels = 0;

    while !frontier.is_empty() {
        levels += 1;
        let level_size = frontier.len();

        for _ in 0..level_size {
            let Some(current) = frontier.pop_front() else {
                break;
            };
            for &up in network.upstream_indices(current) {
                // `put` returns the previous bit: enqueue only on first sight.
                if !visited.put(up) {
                    frontier.push_back(up);
                }
            }
        }
    }

    let segments: BTreeSet<SegmentId> = visited.ones().map(|idx| network.id_at(idx)).collect();
    debug!(
        root,
        members = segments.len(),
        levels,
        "computed upstream closure"
    );

    Ok(Basin {
        root,
        segments,
        levels,
    })
}

/// Compute one basin per root, in the order given.
///
/// Each closure is independent of the others; basins of nested roots
/// overlap.
///
/// # Errors
///
/// Returns [`NetworkError::UnknownSegment`] for the first root that is not
/// a segment of `network`.
pub fn upstream_closures(
    network: &Network,
    roots: &[SegmentId],
) -> Result<Vec<Basin>, NetworkError> {
    roots
        .iter()
        .map(|&root| upstream_closure(network, root))
        .collect()
}
