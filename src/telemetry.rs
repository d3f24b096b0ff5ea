//! Logging setup and run traces
//!
//! Installs the `tracing` subscriber used by the drivers and records
//! per-step and per-round traces that can be exported as JSON for later
//! visualization.

use crate::cluster::RoundReport;
use crate::routing::{SearchStatus, StepOutcome};
use crate::NodeId;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// One expansion in a BFS run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTrace {
    pub step: usize,
    pub current: NodeId,
    pub discovered: Vec<NodeId>,
}

/// Trace of a BFS run from start to terminal status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTrace {
    pub source: NodeId,
    pub destination: NodeId,
    pub steps: Vec<StepTrace>,
    pub status: SearchStatus,
    pub path: Option<Vec<NodeId>>,
}

impl SearchTrace {
    pub fn new(source: NodeId, destination: NodeId) -> Self {
        Self {
            source,
            destination,
            steps: Vec::new(),
            status: SearchStatus::Running,
            path: None,
        }
    }

    /// Record a step outcome. Steps that did no work only update the status.
    pub fn record(&mut self, outcome: &StepOutcome) {
        self.status = outcome.status;
        if let Some(current) = outcome.current {
            self.steps.push(StepTrace {
                step: self.steps.len() + 1,
                current,
                discovered: outcome.discovered.clone(),
            });
        }
    }

    pub fn finish(&mut self, status: SearchStatus, path: Option<&[NodeId]>) {
        self.status = status;
        self.path = path.map(<[NodeId]>::to_vec);
    }

    pub fn hop_count(&self) -> Option<usize> {
        self.path.as_ref().map(|p| p.len().saturating_sub(1))
    }

    pub fn discovered_count(&self) -> usize {
        // The source is discovered before the first step
        1 + self.steps.iter().map(|s| s.discovered.len()).sum::<usize>()
    }
}

/// Round-by-round record of a cluster simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifetimeTrace {
    pub rounds: Vec<RoundReport>,
}

impl LifetimeTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: RoundReport) {
        self.rounds.push(report);
    }

    /// Round in which the first node died
    pub fn first_death_round(&self) -> Option<u64> {
        self.rounds
            .iter()
            .find(|r| !r.died.is_empty())
            .map(|r| r.round)
    }

    /// First round after which at least half of `total` nodes were dead
    pub fn half_dead_round(&self, total: usize) -> Option<u64> {
        self.rounds
            .iter()
            .find(|r| r.dead * 2 >= total && total > 0)
            .map(|r| r.round)
    }

    pub fn final_round(&self) -> u64 {
        self.rounds.last().map_or(0, |r| r.round)
    }

    pub fn total_energy_spent(&self) -> f64 {
        self.rounds.iter().map(|r| r.energy_spent).sum()
    }

    pub fn mean_heads_per_round(&self) -> f64 {
        if self.rounds.is_empty() {
            return 0.0;
        }
        let heads: usize = self.rounds.iter().map(|r| r.cluster_heads.len()).sum();
        heads as f64 / self.rounds.len() as f64
    }
}

/// Summary statistics over a lifetime trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifetimeStats {
    pub final_round: u64,
    pub first_death_round: Option<u64>,
    pub half_dead_round: Option<u64>,
    pub total_energy_spent: f64,
    pub mean_heads_per_round: f64,
}

impl LifetimeStats {
    pub fn from_trace(trace: &LifetimeTrace, total: usize) -> Self {
        Self {
            final_round: trace.final_round(),
            first_death_round: trace.first_death_round(),
            half_dead_round: trace.half_dead_round(total),
            total_energy_spent: trace.total_energy_spent(),
            mean_heads_per_round: trace.mean_heads_per_round(),
        }
    }
}
