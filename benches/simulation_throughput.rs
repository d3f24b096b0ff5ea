//! Benchmark for simulation throughput
//!
//! Measures graph generation, full BFS route discovery and cluster rounds
//! across network sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use wsn_sim::cluster::ClusterSimulation;
use wsn_sim::config::{ClusterConfig, TopologyConfig};
use wsn_sim::routing::RoutingSearch;
use wsn_sim::topology::GraphGenerator;

/// Range scaled so the expected degree stays roughly constant as `n` grows
fn topology_config(n: usize) -> TopologyConfig {
    TopologyConfig {
        node_count: n,
        width: 1000.0,
        height: 1000.0,
        max_distance: 1000.0 * (8.0 / (std::f64::consts::PI * n as f64)).sqrt(),
        ..Default::default()
    }
}

/// Benchmark topology generation without the connectivity constraint
fn bench_graph_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_generation");

    for n in [50, 100, 200, 400] {
        let generator = GraphGenerator::new(topology_config(n)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter(|| black_box(generator.generate(&mut rng).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark a complete BFS run on a fixed graph
fn bench_route_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_discovery");

    for n in [50, 100, 200, 400] {
        let generator = GraphGenerator::new(topology_config(n)).unwrap();
        let graph = generator.generate(&mut StdRng::seed_from_u64(7)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let mut search = RoutingSearch::new(&graph).unwrap();
                black_box(search.run_to_completion().unwrap())
            });
        });
    }

    group.finish();
}

/// Benchmark a single cluster round on a fresh population
fn bench_cluster_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster_round");

    for n in [20, 100, 500] {
        let config = ClusterConfig {
            node_count: n,
            ..Default::default()
        };

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            let mut sim = ClusterSimulation::with_seed(config.clone(), 1).unwrap();
            b.iter(|| {
                if sim.should_stop() {
                    sim.reset();
                }
                black_box(sim.run_round())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_graph_generation,
    bench_route_discovery,
    bench_cluster_round
);
criterion_main!(benches);
