//! End-to-end scenarios: attribute table → network → basin → extraction plan.

use std::collections::BTreeSet;

use basin_core::config::ExtractConfig;
use basin_core::extract::{ExtractTargets, RecordingExtractor, Selection, plan_extraction, run_plan};
use basin_core::network::{DanglingPolicy, Network, NetworkOptions, SegmentId, SegmentLink};
use basin_core::table::{ColumnNames, parse_delimited};
use basin_core::{NetworkError, NetworkStats, upstream_closure};

fn edges(pairs: &[(SegmentId, SegmentId)]) -> Vec<SegmentLink> {
    pairs.iter().copied().map(SegmentLink::from).collect()
}

fn set(ids: &[SegmentId]) -> BTreeSet<SegmentId> {
    ids.iter().copied().collect()
}

#[test]
fn reference_network_basins() {
    let net = Network::build(
        edges(&[(1, 0), (2, 1), (3, 1), (4, 2), (5, 2)]),
        &NetworkOptions::default(),
    )
    .unwrap();

    assert_eq!(upstream_closure(&net, 1).unwrap().segments, set(&[1, 2, 3, 4, 5]));
    assert_eq!(upstream_closure(&net, 2).unwrap().segments, set(&[2, 4, 5]));
    assert_eq!(upstream_closure(&net, 4).unwrap().segments, set(&[4]));
}

#[test]
fn duplicate_row_fails_at_build() {
    let err = Network::build(edges(&[(1, 0), (1, 0)]), &NetworkOptions::default()).unwrap_err();
    assert_eq!(err, NetworkError::DuplicateSegment { id: 1 });
}

#[test]
fn unknown_root_fails() {
    let net = Network::build(edges(&[(1, 0), (2, 1), (3, 1)]), &NetworkOptions::default()).unwrap();
    assert_eq!(
        upstream_closure(&net, 999).unwrap_err(),
        NetworkError::UnknownSegment { id: 999 }
    );
}

#[test]
fn wide_fan_in_enqueues_each_segment_once() {
    // 500 tributaries into segment 1, each with its own headwater.
    let mut links = vec![SegmentLink::new(1, 0)];
    for i in 0..500 {
        let trib = 1000 + i;
        links.push(SegmentLink::new(trib, 1));
        links.push(SegmentLink::new(trib + 10_000, trib));
    }
    let net = Network::build(links, &NetworkOptions::default()).unwrap();
    let basin = upstream_closure(&net, 1).unwrap();
    assert_eq!(basin.len(), 1001);
    assert_eq!(basin.levels, 3);
}

#[test]
fn long_chain_is_not_recursive() {
    let links: Vec<SegmentLink> = (1..=100_000)
        .map(|id| SegmentLink::new(id, id - 1))
        .collect();
    let net = Network::build(links, &NetworkOptions::default()).unwrap();
    let basin = upstream_closure(&net, 1).unwrap();
    assert_eq!(basin.len(), 100_000);
    assert_eq!(basin.levels, 100_000);
}

#[test]
fn clipped_network_needs_outlet_policy() {
    // Segment 10 drained into 99, which was clipped away.
    let rows = edges(&[(10, 99), (11, 10), (12, 10), (13, 0)]);

    let err = Network::build(rows.clone(), &NetworkOptions::default()).unwrap_err();
    assert_eq!(
        err,
        NetworkError::InvalidReference {
            segment: 10,
            downstream: 99
        }
    );

    let options = NetworkOptions {
        dangling: DanglingPolicy::Outlet,
        ..NetworkOptions::default()
    };
    let net = Network::build(rows, &options).unwrap();
    assert_eq!(upstream_closure(&net, 10).unwrap().segments, set(&[10, 11, 12]));
    assert_eq!(NetworkStats::from_network(&net).implicit_outlet_count, 1);
}

#[test]
fn table_to_extraction_plan() {
    let table = "\
cat|tostream|x1|y1
1|0|500.0|10.0
2|1|410.0|40.0
3|1|590.0|35.0
4|2|380.0|90.0
5|2|450.0|95.0
6|0|900.0|10.0
";
    let links = parse_delimited(table, '|', &ColumnNames::default()).unwrap();
    let net = Network::build(links, &NetworkOptions::default()).unwrap();
    net.check_acyclic().unwrap();

    let basin = upstream_closure(&net, 2).unwrap();
    let targets = ExtractTargets {
        input_streams: "streams".to_string(),
        output_streams: "streams_2".to_string(),
        basins: Some(("subbasins".to_string(), "basin_2".to_string())),
    };
    let plan = plan_extraction(&basin, &targets, &ExtractConfig::default());

    let mut recorder = RecordingExtractor::default();
    run_plan(&mut recorder, &plan).unwrap();

    assert_eq!(recorder.requests.len(), 2);
    assert_eq!(
        recorder.requests[0].selection,
        Selection::Where("cat = 2 OR cat = 4 OR cat = 5".to_string())
    );
    assert_eq!(recorder.requests[1].selection, Selection::Cats("2,4,5".to_string()));
}
