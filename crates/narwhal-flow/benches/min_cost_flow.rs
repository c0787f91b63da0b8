use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use narwhal_flow::{FlowNetwork, MinCostFlowSolver, SuccessiveShortestPath, UNBOUNDED};
use std::hint::black_box;
use std::time::Duration;

/// A `side x side` grid of nodes with unit-cost edges to the right and downward neighbors; the
/// top-left corner supplies `side` units that the bottom-right corner consumes.
fn grid_network(side: usize) -> FlowNetwork<usize, usize> {
    let mut net: FlowNetwork<usize, usize> = FlowNetwork::new();
    let ix = |r: usize, c: usize| r * side + c;
    for r in 0..side {
        for c in 0..side {
            net.add_node(ix(r, c), 0);
        }
    }
    let supply = side as i64;
    net.add_node(ix(0, 0), -supply);
    net.add_node(ix(side - 1, side - 1), supply);

    let mut key: usize = 0;
    for r in 0..side {
        for c in 0..side {
            if c + 1 < side {
                net.add_edge(ix(r, c), ix(r, c + 1), key, 0, 2, 1).unwrap();
                key += 1;
            }
            if r + 1 < side {
                net.add_edge(ix(r, c), ix(r + 1, c), key, 0, UNBOUNDED, 2)
                    .unwrap();
                key += 1;
            }
        }
    }
    net
}

fn bench_ssp(c: &mut Criterion) {
    let mut group = c.benchmark_group("ssp_grid");
    group.measurement_time(Duration::from_secs(5));
    for side in [4usize, 8, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, &side| {
            b.iter_batched(
                || grid_network(side),
                |net| black_box(SuccessiveShortestPath.solve(&net).unwrap()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ssp);
criterion_main!(benches);
