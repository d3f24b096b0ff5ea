//! Network lifetime experiments
//!
//! Runs many independently seeded cluster simulations in parallel and
//! aggregates how long each network survives.

use crate::cluster::ClusterSimulation;
use crate::config::ClusterConfig;
use crate::error::SimError;
use crate::telemetry::{LifetimeStats, LifetimeTrace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Outcome of a single seeded run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifetimeRun {
    pub seed: u64,
    /// Whether the death threshold was reached before `max_rounds`
    pub concluded: bool,
    pub stats: LifetimeStats,
}

/// Aggregate over all seeds for one head probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub cluster_head_prob: f64,
    pub runs: usize,
    pub concluded_runs: usize,
    pub mean_lifetime: f64,
    pub mean_first_death: Option<f64>,
    pub mean_heads_per_round: f64,
}

/// Run one simulation to its death threshold, or `max_rounds`.
pub fn run_lifetime(config: &ClusterConfig, seed: u64, max_rounds: u64) -> Result<LifetimeRun, SimError> {
    let mut sim = ClusterSimulation::with_seed(config.clone(), seed)?;
    let mut trace = LifetimeTrace::new();

    while !sim.should_stop() && sim.round_count() < max_rounds {
        trace.record(sim.run_round());
    }

    Ok(LifetimeRun {
        seed,
        concluded: sim.should_stop(),
        stats: LifetimeStats::from_trace(&trace, config.node_count),
    })
}

/// Sweep head probabilities, `runs` seeds each (seeds `0..runs`).
pub fn lifetime_sweep(
    base: &ClusterConfig,
    probabilities: &[f64],
    runs: usize,
    max_rounds: u64,
) -> Result<Vec<SweepPoint>, SimError> {
    if runs == 0 {
        return Err(SimError::Configuration("runs must be positive".into()));
    }

    let configs = probabilities
        .iter()
        .map(|&p| {
            let config = ClusterConfig {
                cluster_head_prob: p,
                ..base.clone()
            };
            config.validate().map(|_| config)
        })
        .collect::<Result<Vec<_>, _>>()?;

    configs
        .iter()
        .map(|config| -> Result<SweepPoint, SimError> {
            let results: Vec<LifetimeRun> = (0..runs as u64)
                .into_par_iter()
                .map(|seed| run_lifetime(config, seed, max_rounds))
                .collect::<Result<_, SimError>>()?;

            let point = summarize(config.cluster_head_prob, &results);
            info!(
                prob = point.cluster_head_prob,
                mean_lifetime = point.mean_lifetime,
                concluded = point.concluded_runs,
                "Sweep point complete"
            );
            Ok(point)
        })
        .collect()
}

fn summarize(prob: f64, results: &[LifetimeRun]) -> SweepPoint {
    let n = results.len().max(1) as f64;
    let first_deaths: Vec<u64> = results
        .iter()
        .filter_map(|r| r.stats.first_death_round)
        .collect();

    SweepPoint {
        cluster_head_prob: prob,
        runs: results.len(),
        concluded_runs: results.iter().filter(|r| r.concluded).count(),
        mean_lifetime: results.iter().map(|r| r.stats.final_round as f64).sum::<f64>() / n,
        mean_first_death: if first_deaths.is_empty() {
            None
        } else {
            Some(first_deaths.iter().sum::<u64>() as f64 / first_deaths.len() as f64)
        },
        mean_heads_per_round: results.iter().map(|r| r.stats.mean_heads_per_round).sum::<f64>() / n,
    }
}
