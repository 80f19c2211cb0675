//! Cycle detection over downstream links.
//!
//! A valid stream network is a forest: following `tostream` from any
//! segment reaches the outlet. The closure engine terminates on cyclic
//! input anyway, but a loop in the links means the attribute table is
//! broken, so `basin check` reports it.
//!
//! Each segment has at most one downstream link, so every cycle is a simple
//! loop and shows up as a strongly connected component with more than one
//! member, or as a self-loop.

#![allow(clippy::module_name_repetitions)]

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::{Network, SegmentId};
use crate::error::NetworkError;

impl Network {
    /// Flow graph with one node per dense index and edges `segment → downstream`.
    fn flow_graph(&self) -> DiGraph<SegmentId, ()> {
        let mut graph = DiGraph::with_capacity(self.len(), self.len());
        for idx in 0..self.len() {
            graph.add_node(self.id_at(idx));
        }
        for idx in 0..self.len() {
            if let Some(down) = self.downstream_index(idx) {
                graph.add_edge(NodeIndex::new(idx), NodeIndex::new(down), ());
            }
        }
        graph
    }

    /// Find every cycle in the downstream links.
    ///
    /// Each entry is the sorted list of segment ids on one loop. Loops are
    /// sorted by their smallest id. Empty for a valid network.
    #[must_use]
    pub fn find_cycles(&self) -> Vec<Vec<SegmentId>> {
        let graph = self.flow_graph();
        let mut cycles: Vec<Vec<SegmentId>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|node| graph.find_edge(*node, *node).is_some())
            })
            .map(|component| {
                let mut ids: Vec<_> = component.into_iter().map(|idx| graph[idx]).collect();
                ids.sort_unstable();
                ids
            })
            .collect();

        cycles.sort_unstable();
        cycles
    }

    /// Fail if the downstream links contain a loop.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Cycle`] naming the segments of the first loop.
    pub fn check_acyclic(&self) -> Result<(), NetworkError> {
        self.find_cycles()
            .into_iter()
            .next()
            .map_or(Ok(()), |segments| Err(NetworkError::Cycle { segments }))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::NetworkError;
    use crate::network::{Network, NetworkOptions, SegmentLink};

    fn build(pairs: &[(u64, u64)]) -> Network {
        Network::build(
            pairs.iter().copied().map(SegmentLink::from),
            &NetworkOptions::default(),
        )
        .expect("network builds")
    }

    #[test]
    fn forest_has_no_cycles() {
        let net = build(&[(1, 0), (2, 1), (3, 1), (4, 0), (5, 4)]);
        assert!(net.find_cycles().is_empty());
        assert!(net.check_acyclic().is_ok());
    }

    #[test]
    fn loop_is_reported() {
        // 1 → outlet, 2 → 3 → 4 → 2
        let net = build(&[(1, 0), (2, 3), (3, 4), (4, 2), (5, 2)]);
        assert_eq!(net.find_cycles(), vec![vec![2, 3, 4]]);
        assert_eq!(
            net.check_acyclic(),
            Err(NetworkError::Cycle {
                segments: vec![2, 3, 4]
            })
        );
    }

    #[test]
    fn self_loop_is_reported() {
        let net = build(&[(1, 0), (7, 7)]);
        assert_eq!(net.find_cycles(), vec![vec![7]]);
    }

    #[test]
    fn multiple_loops_sorted() {
        let net = build(&[(10, 11), (11, 10), (3, 4), (4, 3)]);
        assert_eq!(net.find_cycles(), vec![vec![3, 4], vec![10, 11]]);
    }
}
