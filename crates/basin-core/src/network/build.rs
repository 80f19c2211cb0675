//! [`Network`] construction from `(id, downstream)` rows.
//!
//! Every known segment gets an upstream entry, empty for headwaters, so
//! lookups never need an existence check past the id → index step. The
//! outlet marker is never a key.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{DEFAULT_OUTLET, SegmentId};
use crate::error::NetworkError;

// ---------------------------------------------------------------------------
// Input rows and options
// ---------------------------------------------------------------------------

/// One attribute row: a segment and the segment it drains into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentLink {
    /// Segment id (`cat`).
    pub id: SegmentId,
    /// Downstream segment id (`tostream`), or the outlet marker.
    pub downstream: SegmentId,
}

impl SegmentLink {
    #[must_use]
    pub const fn new(id: SegmentId, downstream: SegmentId) -> Self {
        Self { id, downstream }
    }
}

impl From<(SegmentId, SegmentId)> for SegmentLink {
    fn from((id, downstream): (SegmentId, SegmentId)) -> Self {
        Self { id, downstream }
    }
}

/// What to do with a downstream id that names no segment in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanglingPolicy {
    /// Fail the build with [`NetworkError::InvalidReference`].
    #[default]
    Reject,
    /// Treat the reference as an outlet. Useful for networks clipped out of
    /// a larger one, where the real downstream segment was cut away.
    Outlet,
}

/// Parameters for [`Network::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkOptions {
    /// Downstream id meaning "leaves the mapped area".
    pub outlet: SegmentId,
    /// Handling of downstream ids that match no segment.
    pub dangling: DanglingPolicy,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self {
            outlet: DEFAULT_OUTLET,
            dangling: DanglingPolicy::Reject,
        }
    }
}

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// An immutable stream network with its reverse adjacency index.
///
/// Built once from an attribute snapshot by [`Network::build`]; a changed
/// segment set means building a new `Network`. Safe to share read-only
/// across threads.
#[derive(Debug, Clone)]
pub struct Network {
    /// Dense index → segment id, in input order.
    ids: Vec<SegmentId>,
    /// Segment id → dense index.
    index: HashMap<SegmentId, usize>,
    /// Dense index → dense index of the downstream segment, `None` for outlets.
    downstream: Vec<Option<usize>>,
    /// Dense index → dense indices of the immediate upstream segments.
    upstream: Vec<Vec<usize>>,
    /// Rows whose downstream reference was accepted as an implicit outlet.
    implicit_outlets: Vec<SegmentLink>,
    outlet: SegmentId,
}

impl Network {
    /// Build a [`Network`] from attribute rows.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::SentinelId`] if a segment id equals the outlet marker.
    /// - [`NetworkError::ZeroId`] if a segment id is `0` under another marker.
    /// - [`NetworkError::DuplicateSegment`] if an id appears twice.
    /// - [`NetworkError::InvalidReference`] if a downstream id names no
    ///   segment and `options.dangling` is [`DanglingPolicy::Reject`].
    ///
    /// # Complexity
    ///
    /// O(N) expected time and memory for N rows.
    #[instrument(skip(links), fields(outlet = options.outlet, dangling = ?options.dangling))]
    pub fn build<I>(links: I, options: &NetworkOptions) -> Result<Self, NetworkError>
    where
        I: IntoIterator<Item = SegmentLink>,
    {
        let links: Vec<SegmentLink> = links.into_iter().collect();

        // Pass 1: assign dense indices, rejecting duplicates and the marker.
        let mut ids = Vec::with_capacity(links.len());
        let mut index = HashMap::with_capacity(links.len());
        for link in &links {
            if link.id == options.outlet {
                return Err(NetworkError::SentinelId { id: link.id });
            }
            if link.id == 0 {
                return Err(NetworkError::ZeroId);
            }
            match index.entry(link.id) {
                Entry::Occupied(_) => {
                    return Err(NetworkError::DuplicateSegment { id: link.id });
                }
                Entry::Vacant(slot) => {
                    slot.insert(ids.len());
                    ids.push(link.id);
                }
            }
        }

        // Pass 2: resolve downstream links and fill the reverse adjacency.
        let mut downstream = Vec::with_capacity(links.len());
        let mut upstream: Vec<Vec<usize>> = vec![Vec::new(); links.len()];
        let mut implicit_outlets = Vec::new();
        for (idx, link) in links.iter().enumerate() {
            if link.downstream == options.outlet {
                downstream.push(None);
                continue;
            }
            if let Some(&target) = index.get(&link.downstream) {
                downstream.push(Some(target));
                upstream[target].push(idx);
                continue;
            }
            match options.dangling {
                DanglingPolicy::Reject => {
                    return Err(NetworkError::InvalidReference {
                        segment: link.id,
                        downstream: link.downstream,
                    });
                }
                DanglingPolicy::Outlet => {
                    warn!(
                        segment = link.id,
                        downstream = link.downstream,
                        "downstream segment missing; treating as outlet"
                    );
                    downstream.push(None);
                    implicit_outlets.push(*link);
                }
            }
        }

        debug!(
            segments = ids.len(),
            implicit_outlets = implicit_outlets.len(),
            "built stream network index"
        );

        Ok(Self {
            ids,
            index,
            downstream,
            upstream,
            implicit_outlets,
            outlet: options.outlet,
        })
    }

    /// Number of segments.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.ids.len()
    }

    /// `true` if the network has no segments.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `true` if `id` is a segment of this network. Always `false` for the
    /// outlet marker.
    #[must_use]
    pub fn contains(&self, id: SegmentId) -> bool {
        self.index.contains_key(&id)
    }

    /// The outlet marker this network was built with.
    #[must_use]
    pub const fn outlet_value(&self) -> SegmentId {
        self.outlet
    }

    /// Segment ids that drain directly into `id`.
    ///
    /// Empty for headwater segments.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnknownSegment`] if `id` is not a segment,
    /// including when `id` is the outlet marker.
    pub fn upstream_of(
        &self,
        id: SegmentId,
    ) -> Result<impl ExactSizeIterator<Item = SegmentId> + '_, NetworkError> {
        let idx = self.require(id)?;
        Ok(self.upstream[idx].iter().map(|&i| self.ids[i]))
    }

    /// The segment `id` drains into, or `None` for outlets (including
    /// implicit ones).
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::UnknownSegment`] if `id` is not a segment.
    pub fn downstream_of(&self, id: SegmentId) -> Result<Option<SegmentId>, NetworkError> {
        let idx = self.require(id)?;
        Ok(self.downstream[idx].map(|i| self.ids[i]))
    }

    /// All segment ids in input order.
    #[must_use]
    pub fn segment_ids(&self) -> impl ExactSizeIterator<Item = SegmentId> + '_ {
        self.ids.iter().copied()
    }

    /// Segments with no downstream segment in this network.
    pub fn outlets(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.downstream
            .iter()
            .enumerate()
            .filter(|(_, down)| down.is_none())
            .map(|(idx, _)| self.ids[idx])
    }

    /// Segments with nothing draining into them.
    pub fn headwaters(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.upstream
            .iter()
            .enumerate()
            .filter(|(_, up)| up.is_empty())
            .map(|(idx, _)| self.ids[idx])
    }

    /// Rows whose dangling downstream reference was accepted as an outlet
    /// under [`DanglingPolicy::Outlet`].
    #[must_use]
    pub fn implicit_outlets(&self) -> &[SegmentLink] {
        &self.implicit_outlets
    }

    // -----------------------------------------------------------------------
    // Dense-index access for traversals in this crate
    // -----------------------------------------------------------------------

    pub(crate) fn index_of(&self, id: SegmentId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub(crate) fn id_at(&self, idx: usize) -> SegmentId {
        self.ids[idx]
    }

    pub(crate) fn upstream_indices(&self, idx: usize) -> &[usize] {
        &self.upstream[idx]
    }

    pub(crate) fn downstream_index(&self, idx: usize) -> Option<usize> {
        self.downstream[idx]
    }

    fn require(&self, id: SegmentId) -> Result<usize, NetworkError> {
        self.index_of(id).ok_or(NetworkError::UnknownSegment { id })
    }
}
