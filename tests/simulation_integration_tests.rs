//! End-to-end scenarios for the routing and cluster simulations
//!
//! Drives both components the way a timer-based renderer would: one advance
//! call at a time, reading snapshots in between.

use rand::rngs::StdRng;
use rand::SeedableRng;
use wsn_sim::cluster::{ClusterSimulation, EnergyBand};
use wsn_sim::config::{self, ClusterConfig, TopologyConfig};
use wsn_sim::routing::{RoutingSearch, SearchStatus};
use wsn_sim::snapshot::{self, ClusterSnapshot, GraphSnapshot, NodeMark};
use wsn_sim::telemetry::{LifetimeTrace, SearchTrace};
use wsn_sim::topology::{hop_distances, is_connected, Graph, GraphGenerator};
use wsn_sim::{NodeId, Position, SimError};

fn four_node_scenario() -> Graph {
    Graph::from_positions(
        vec![
            Position::new(0.0, 0.0),
            Position::new(10.0, 0.0),
            Position::new(0.0, 10.0),
            Position::new(100.0, 100.0),
        ],
        15.0,
    )
}

#[test]
fn test_four_node_scenario_edges() {
    let graph = four_node_scenario();
    // sqrt(200) < 15, so 1 and 2 are linked as well
    assert_eq!(
        graph.edges(),
        vec![
            (NodeId(0), NodeId(1)),
            (NodeId(0), NodeId(2)),
            (NodeId(1), NodeId(2))
        ]
    );
    assert_eq!(graph.edge_count(), 3);
    assert!(graph.neighbors(NodeId(3)).is_empty());
}

#[test]
fn test_four_node_scenario_unreachable() {
    let graph = four_node_scenario();
    let mut search = RoutingSearch::with_endpoints(&graph, NodeId(0), NodeId(3)).unwrap();
    assert_eq!(search.run_to_completion().unwrap(), SearchStatus::Exhausted);
    assert!(search.path().is_none());
}

#[test]
fn test_four_node_scenario_direct() {
    let graph = four_node_scenario();
    let mut search = RoutingSearch::with_endpoints(&graph, NodeId(0), NodeId(1)).unwrap();
    assert_eq!(search.run_to_completion().unwrap(), SearchStatus::Found);
    assert_eq!(search.path().unwrap(), &[NodeId(0), NodeId(1)]);
}

#[test]
fn test_generated_network_routing_session() {
    let config = TopologyConfig {
        node_count: 30,
        max_distance: 200.0,
        force_connected: true,
        ..Default::default()
    };
    let generator = GraphGenerator::new(config).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);
    let graph = generator.generate(&mut rng).unwrap();
    assert!(is_connected(&graph));

    let mut search = RoutingSearch::new(&graph).unwrap();
    let mut trace = SearchTrace::new(search.source(), search.destination());
    search.start().unwrap();

    // Render between every step, like the timer-driven display
    while !search.status().is_terminal() {
        let outcome = search.step();
        trace.record(&outcome);
        let snap = GraphSnapshot::of_search(&search);
        assert_eq!(snap.nodes.len(), 30);
        if let Some(current) = outcome.current {
            assert!(snap.nodes[current.0].is_current);
        }
    }
    trace.finish(search.status(), search.path());

    assert_eq!(search.status(), SearchStatus::Found);
    let expected = hop_distances(&graph, graph.source())[graph.destination().0];
    assert_eq!(trace.hop_count(), expected);

    let snap = GraphSnapshot::of_search(&search);
    for id in search.path().unwrap() {
        assert_eq!(snap.nodes[id.0].mark, NodeMark::Path);
    }
}

#[test]
fn test_reset_discards_previous_graph() {
    let generator = GraphGenerator::new(TopologyConfig::default()).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let first = generator.generate(&mut rng).unwrap();
    let second = generator.generate(&mut rng).unwrap();
    assert_ne!(first.positions(), second.positions());
}

#[test]
fn test_single_node_population_scenario() {
    let config = ClusterConfig {
        node_count: 1,
        cluster_head_prob: 1.0,
        ..Default::default()
    };
    let mut sim = ClusterSimulation::with_seed(config, 77).unwrap();
    let mut trace = LifetimeTrace::new();

    while sim.alive_count() > 0 {
        trace.record(sim.run_round());
        let node = &sim.nodes()[0];
        assert!(node.is_cluster_head());
        assert_eq!(node.cluster_id(), None);
        assert!(sim.round_count() < 200);
    }

    assert_eq!(sim.nodes()[0].energy(), 0.0);
    assert_eq!(trace.first_death_round(), Some(sim.round_count()));
    for report in &trace.rounds {
        assert_eq!(report.cluster_heads, vec![NodeId(0)]);
        assert!(report.energy_spent <= 0.012 + 1e-9);
    }
}

#[test]
fn test_cluster_run_to_threshold_with_snapshots() {
    let mut sim = ClusterSimulation::with_seed(ClusterConfig::default(), 8).unwrap();
    sim.start().unwrap();

    while sim.is_running() {
        let report = sim.run_round();
        let snap = ClusterSnapshot::of(&sim);
        assert_eq!(snap.round, report.round);
        assert_eq!(snap.alive, report.alive);
        for view in &snap.nodes {
            assert_eq!(view.band == EnergyBand::Depleted, view.energy == 0.0);
        }
        if sim.should_stop() {
            sim.stop();
        }
    }

    assert!(sim.alive_count() <= 4);
    let concluded = sim.round_count();
    sim.reset();
    assert_eq!(sim.round_count(), 0);
    assert_eq!(sim.alive_count(), 20);
    assert!(concluded > 0);
}

#[test]
fn test_threshold_boundary_twenty_nodes() {
    let mut sim = ClusterSimulation::with_seed(ClusterConfig::default(), 13).unwrap();
    let mut crossed_at = None;

    while crossed_at.is_none() {
        let report = sim.run_round();
        let stop = sim.should_stop();
        assert_eq!(stop, report.alive <= 4, "alive = {}", report.alive);
        if stop {
            crossed_at = Some(report.round);
        }
        assert!(sim.round_count() < 10_000);
    }
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cluster.json");
    let config = ClusterConfig {
        node_count: 42,
        cluster_head_prob: 0.15,
        death_threshold: 0.5,
        ..Default::default()
    };
    snapshot::write_json(&config, &path).unwrap();

    let loaded: ClusterConfig = config::load_json(&path).unwrap();
    assert_eq!(loaded, config);
    let sim = ClusterSimulation::with_seed(loaded, 1).unwrap();
    assert_eq!(sim.nodes().len(), 42);
}

#[test]
fn test_invalid_config_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("topology.json");
    std::fs::write(&path, r#"{ "node_count": 1 }"#).unwrap();

    let loaded: TopologyConfig = config::load_json(&path).unwrap();
    assert!(matches!(
        GraphGenerator::new(loaded),
        Err(SimError::Configuration(_))
    ));

    let missing: Result<TopologyConfig, _> = config::load_json(dir.path().join("missing.json"));
    assert!(matches!(missing, Err(SimError::Io(_))));

    std::fs::write(&path, "{ not json").unwrap();
    let broken: Result<TopologyConfig, _> = config::load_json(&path);
    assert!(matches!(broken, Err(SimError::Serialization(_))));
}

#[test]
fn test_snapshot_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");
    let graph = four_node_scenario();
    snapshot::write_json(&GraphSnapshot::of_graph(&graph), &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let restored: GraphSnapshot = serde_json::from_str(&content).unwrap();
    assert_eq!(restored.nodes.len(), 4);
    assert_eq!(restored.edges.len(), 3);
}
