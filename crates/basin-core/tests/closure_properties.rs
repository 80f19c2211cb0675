use basin_core::network::{Network, NetworkOptions, SegmentLink};
use basin_core::upstream_closure;
use proptest::prelude::*;

#[path = "generators.rs"]
mod generators;
use generators::*;

fn build(links: &[SegmentLink]) -> Network {
    Network::build(links.iter().copied(), &NetworkOptions::default()).expect("forest builds")
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn closure_contains_root((links, root) in arb_forest_with_root(80)) {
        let basin = upstream_closure(&build(&links), root).unwrap();
        prop_assert!(basin.contains(root));
        prop_assert!(!basin.is_empty());
        prop_assert_eq!(basin.root, root);
    }

    #[test]
    fn closure_matches_downstream_walk((links, root) in arb_forest_with_root(80)) {
        let basin = upstream_closure(&build(&links), root).unwrap();
        prop_assert_eq!(basin.segments, brute_force_closure(&links, root));
    }

    #[test]
    fn closure_is_repeatable((links, root) in arb_forest_with_root(80)) {
        let net = build(&links);
        let first = upstream_closure(&net, root).unwrap();
        let second = upstream_closure(&net, root).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn closure_independent_of_row_order((links, root) in arb_forest_with_root(60)) {
        let mut reversed = links.clone();
        reversed.reverse();
        let a = upstream_closure(&build(&links), root).unwrap();
        let b = upstream_closure(&build(&reversed), root).unwrap();
        prop_assert_eq!(a.segments, b.segments);
    }

    #[test]
    fn outlet_never_in_closure((links, root) in arb_forest_with_root(80)) {
        let basin = upstream_closure(&build(&links), root).unwrap();
        prop_assert!(!basin.contains(0));
    }

    #[test]
    fn pruning_a_headwater_keeps_unrelated_basins(links in arb_forest(60)) {
        let net = build(&links);
        let Some(leaf) = net.headwaters().next() else {
            return Ok(());
        };
        let pruned: Vec<SegmentLink> = links.iter().copied().filter(|l| l.id != leaf).collect();
        let pruned_net = build(&pruned);

        for root in pruned_net.segment_ids() {
            let before = upstream_closure(&net, root).unwrap();
            let after = upstream_closure(&pruned_net, root).unwrap();
            if before.contains(leaf) {
                let mut expected = before.segments.clone();
                expected.remove(&leaf);
                prop_assert_eq!(after.segments, expected);
            } else {
                prop_assert_eq!(after.segments, before.segments);
            }
        }
    }

    #[test]
    fn outlet_basins_partition_the_network(links in arb_forest(80)) {
        let net = build(&links);
        let total: usize = net
            .outlets()
            .map(|outlet| upstream_closure(&net, outlet).unwrap().len())
            .sum();
        prop_assert_eq!(total, net.len());
    }

    #[test]
    fn levels_bounded_by_basin_size((links, root) in arb_forest_with_root(80)) {
        let basin = upstream_closure(&build(&links), root).unwrap();
        prop_assert!(basin.levels >= 1);
        prop_assert!(basin.levels <= basin.len());
    }
}
