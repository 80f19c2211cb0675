//! Summary statistics for a stream network.
//!
//! # Statistics Provided
//!
//! - **`segment_count`**: Number of segments (attribute rows).
//! - **`link_count`**: Number of resolved downstream links (segments that
//!   drain into another segment of the network).
//! - **`outlet_count`**: Segments with no downstream segment, implicit outlets
//!   included.
//! - **`implicit_outlet_count`**: Dangling downstream references accepted as
//!   outlets.
//! - **`headwater_count`**: Segments nothing drains into (first-order streams).
//! - **`confluence_count`**: Segments fed by two or more upstream segments.
//! - **`max_in_degree`**: Most upstream segments feeding one segment.
//! - **`cycle_count`**: Loops in the downstream links. Zero for a valid network.

use serde::Serialize;

use crate::network::Network;

/// Summary statistics for a [`Network`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkStats {
    pub segment_count: usize,
    pub link_count: usize,
    pub outlet_count: usize,
    pub implicit_outlet_count: usize,
    pub headwater_count: usize,
    pub confluence_count: usize,
    pub max_in_degree: usize,
    pub cycle_count: usize,
}

impl NetworkStats {
    /// Compute statistics from a built [`Network`].
    #[must_use]
    pub fn from_network(network: &Network) -> Self {
        let segment_count = network.len();

        let in_degrees: Vec<usize> = (0..segment_count)
            .map(|idx| network.upstream_indices(idx).len())
            .collect();

        let link_count = in_degrees.iter().sum();
        let headwater_count = in_degrees.iter().filter(|&&d| d == 0).count();
        let confluence_count = in_degrees.iter().filter(|&&d| d >= 2).count();
        let max_in_degree = in_degrees.iter().copied().max().unwrap_or(0);

        Self {
            segment_count,
            link_count,
            outlet_count: network.outlets().count(),
            implicit_outlet_count: network.implicit_outlets().len(),
            headwater_count,
            confluence_count,
            max_in_degree,
            cycle_count: network.find_cycles().len(),
        }
    }

    /// `true` if every segment drains to an outlet.
    #[must_use]
    pub const fn is_acyclic(&self) -> bool {
        self.cycle_count == 0
    }
}
