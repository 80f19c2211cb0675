//! Proptest generators for stream networks.

#![allow(dead_code)]

use std::collections::BTreeSet;

use basin_core::network::{SegmentId, SegmentLink};
use proptest::prelude::*;
use proptest::sample::Index;

/// Random acyclic forest of up to `max` segments, rows shuffled.
///
/// Segment `i` drains into the outlet or into some earlier segment, so
/// every chain of downstream links ends at the outlet. Ids are spaced out
/// (`1, 4, 7, ...`) so they are not dense indices.
pub fn arb_forest(max: usize) -> impl Strategy<Value = Vec<SegmentLink>> {
    (1..=max)
        .prop_flat_map(|n| prop::collection::vec((prop::bool::weighted(0.15), any::<Index>()), n))
        .prop_map(|choices| {
            choices
                .iter()
                .enumerate()
                .map(|(i, (to_outlet, pick))| {
                    let downstream = if i == 0 || *to_outlet {
                        0
                    } else {
                        id_for(pick.index(i))
                    };
                    SegmentLink::new(id_for(i), downstream)
                })
                .collect::<Vec<_>>()
        })
        .prop_flat_map(|links| Just(links).prop_shuffle())
}

/// Forest plus one of its segment ids.
pub fn arb_forest_with_root(max: usize) -> impl Strategy<Value = (Vec<SegmentLink>, SegmentId)> {
    arb_forest(max).prop_flat_map(|links| {
        let ids: Vec<SegmentId> = links.iter().map(|l| l.id).collect();
        (Just(links), prop::sample::select(ids))
    })
}

pub const fn id_for(i: usize) -> SegmentId {
    (i as SegmentId) * 3 + 1
}

/// Reference closure: `y` is in the basin of `root` iff walking downstream
/// from `y` reaches `root`.
pub fn brute_force_closure(links: &[SegmentLink], root: SegmentId) -> BTreeSet<SegmentId> {
    links
        .iter()
        .filter(|link| {
            let mut current = link.id;
            for _ in 0..=links.len() {
                if current == root {
                    return true;
                }
                match links.iter().find(|l| l.id == current) {
                    Some(l) if l.downstream != 0 => current = l.downstream,
                    _ => return false,
                }
            }
            false
        })
        .map(|link| link.id)
        .collect()
}
