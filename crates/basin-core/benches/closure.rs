use basin_core::network::{Network, NetworkOptions, SegmentId, SegmentLink};
use basin_core::upstream_closure;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

struct Tier {
    name: &'static str,
    segments: usize,
}

const TIERS: [Tier; 3] = [
    Tier {
        name: "small",
        segments: 1_000,
    },
    Tier {
        name: "medium",
        segments: 50_000,
    },
    Tier {
        name: "large",
        segments: 500_000,
    },
];

/// Binary-tree-shaped network: segment `i` drains into `i / 2`, segment 1
/// into the outlet. Rows are emitted leaves first, like a raster-derived
/// network numbered from the headwaters.
fn binary_network(segments: usize) -> Vec<SegmentLink> {
    (1..=segments as SegmentId)
        .rev()
        .map(|id| SegmentLink::new(id, id / 2))
        .collect()
}

fn bench_closure(c: &mut Criterion) {
    let mut group = c.benchmark_group("closure.tiered");

    for tier in TIERS {
        let links = binary_network(tier.segments);
        let options = NetworkOptions::default();
        group.throughput(Throughput::Elements(tier.segments as u64));

        group.bench_with_input(BenchmarkId::new("build", tier.name), &links, |b, links| {
            b.iter(|| Network::build(links.iter().copied(), &options));
        });

        let network = Network::build(links, &options).expect("network builds");

        group.bench_with_input(
            BenchmarkId::new("closure_outlet", tier.name),
            &network,
            |b, network| b.iter(|| upstream_closure(network, 1)),
        );

        group.bench_with_input(
            BenchmarkId::new("closure_subbasin", tier.name),
            &network,
            |b, network| b.iter(|| upstream_closure(network, 3)),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_closure);
criterion_main!(benches);
