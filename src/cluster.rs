//! LEACH-style Cluster-Head Rotation
//!
//! A fixed population of battery-powered sensors runs in discrete rounds:
//! heads are elected by independent coin flips, followers join the nearest
//! head, and every radio operation drains energy until enough of the
//! population has died.

use crate::config::ClusterConfig;
use crate::error::SimError;
use crate::{NodeId, Position};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Coarse classification of remaining energy, used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyBand {
    /// Above 0.6
    High,
    /// Above 0.3
    Medium,
    Low,
    Depleted,
}

impl EnergyBand {
    pub fn classify(energy: f64, is_alive: bool) -> Self {
        if !is_alive {
            EnergyBand::Depleted
        } else if energy > 0.6 {
            EnergyBand::High
        } else if energy > 0.3 {
            EnergyBand::Medium
        } else {
            EnergyBand::Low
        }
    }
}

/// A sensor in the cluster simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorNode {
    pub id: NodeId,
    pub position: Position,
    energy: f64,
    is_alive: bool,
    is_cluster_head: bool,
    cluster_id: Option<NodeId>,
    band: EnergyBand,
}

impl SensorNode {
    pub fn new(id: NodeId, position: Position) -> Self {
        Self {
            id,
            position,
            energy: 1.0,
            is_alive: true,
            is_cluster_head: false,
            cluster_id: None,
            band: EnergyBand::High,
        }
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn is_alive(&self) -> bool {
        self.is_alive
    }

    pub fn is_cluster_head(&self) -> bool {
        self.is_cluster_head
    }

    /// Head this node reports to in the current round.
    pub fn cluster_id(&self) -> Option<NodeId> {
        self.cluster_id
    }

    /// Band as of the last refresh.
    pub fn band(&self) -> EnergyBand {
        self.band
    }

    /// Debit `cost` if the node is alive. Returns the energy actually removed.
    ///
    /// Energy clamps at zero and the node dies on reaching it.
    fn consume(&mut self, cost: f64) -> f64 {
        if !self.is_alive {
            return 0.0;
        }
        let before = self.energy;
        self.energy -= cost;
        if self.energy <= 0.0 {
            self.energy = 0.0;
            self.is_alive = false;
        }
        before - self.energy
    }

    fn refresh_band(&mut self) {
        self.band = EnergyBand::classify(self.energy, self.is_alive);
    }
}

/// Summary of one call to [`ClusterSimulation::run_round`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub round: u64,
    pub cluster_heads: Vec<NodeId>,
    pub alive: usize,
    pub dead: usize,
    pub energy_spent: f64,
    /// Nodes whose battery ran out during this round
    pub died: Vec<NodeId>,
}

/// Round-based cluster simulation over a fixed population.
pub struct ClusterSimulation<R: Rng = StdRng> {
    config: ClusterConfig,
    nodes: Vec<SensorNode>,
    cluster_heads: Vec<NodeId>,
    round_count: u64,
    is_running: bool,
    first_death_round: Option<u64>,
    rng: R,
}

impl ClusterSimulation<StdRng> {
    /// Simulation with a deterministic random source.
    pub fn with_seed(config: ClusterConfig, seed: u64) -> Result<Self, SimError> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ClusterSimulation<R> {
    /// Validate `config` and deploy a fresh population.
    pub fn new(config: ClusterConfig, rng: R) -> Result<Self, SimError> {
        config.validate()?;
        let mut sim = Self {
            config,
            nodes: Vec::new(),
            cluster_heads: Vec::new(),
            round_count: 0,
            is_running: false,
            first_death_round: None,
            rng,
        };
        sim.deploy_population();
        Ok(sim)
    }

    /// Redeploy `node_count` nodes over a `width × height` area.
    ///
    /// The new dimensions are validated first; on rejection nothing changes.
    pub fn deploy(&mut self, node_count: usize, width: f64, height: f64) -> Result<(), SimError> {
        let config = ClusterConfig {
            node_count,
            width,
            height,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        self.deploy_population();
        Ok(())
    }

    /// Swap in a new configuration. The population is untouched until the
    /// next [`reset`](Self::reset) or [`deploy`](Self::deploy).
    pub fn reconfigure(&mut self, config: ClusterConfig) -> Result<(), SimError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Zero the round counter and redeploy with the current configuration.
    pub fn reset(&mut self) {
        self.round_count = 0;
        self.is_running = false;
        self.deploy_population();
    }

    fn deploy_population(&mut self) {
        let ClusterConfig {
            node_count,
            width,
            height,
            margin,
            ..
        } = self.config;

        self.nodes = (0..node_count)
            .map(|i| {
                let position = Position::random_in(&mut self.rng, width, height, margin);
                SensorNode::new(NodeId(i), position)
            })
            .collect();
        self.cluster_heads.clear();
        self.first_death_round = None;

        info!(nodes = node_count, width, height, "Deployed sensor population");
    }

    pub fn start(&mut self) -> Result<(), SimError> {
        if self.is_running {
            return Err(SimError::state("simulation already running"));
        }
        self.is_running = true;
        Ok(())
    }

    pub fn stop(&mut self) {
        self.is_running = false;
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Advance the simulation by one round.
    pub fn run_round(&mut self) -> RoundReport {
        self.round_count += 1;
        let energy_before = self.total_energy();
        let alive_before: Vec<bool> = self.nodes.iter().map(SensorNode::is_alive).collect();

        self.elect_cluster_heads();
        self.assign_clusters();
        self.transmit_data();
        self.refresh_states();

        let died: Vec<NodeId> = self
            .nodes
            .iter()
            .zip(alive_before)
            .filter(|(node, was_alive)| *was_alive && !node.is_alive)
            .map(|(node, _)| node.id)
            .collect();

        if !died.is_empty() && self.first_death_round.is_none() {
            self.first_death_round = Some(self.round_count);
            info!(round = self.round_count, "First node depleted");
        }

        let alive = self.alive_count();
        let report = RoundReport {
            round: self.round_count,
            cluster_heads: self.cluster_heads.clone(),
            alive,
            dead: self.nodes.len() - alive,
            energy_spent: energy_before - self.total_energy(),
            died,
        };

        debug!(
            round = report.round,
            heads = report.cluster_heads.len(),
            alive = report.alive,
            spent = report.energy_spent,
            "Round complete"
        );

        report
    }

    /// Independent Bernoulli trial per alive node; previous roles are cleared.
    fn elect_cluster_heads(&mut self) {
        self.cluster_heads.clear();
        let prob = self.config.cluster_head_prob;

        for node in &mut self.nodes {
            node.is_cluster_head = false;
            node.cluster_id = None;

            if node.is_alive && self.rng.gen::<f64>() < prob {
                node.is_cluster_head = true;
                self.cluster_heads.push(node.id);
            }
        }
    }

    /// Attach each alive follower to the nearest head, lowest id on ties.
    fn assign_clusters(&mut self) {
        let heads: Vec<(NodeId, Position)> = self
            .cluster_heads
            .iter()
            .map(|&id| (id, self.nodes[id.0].position))
            .collect();

        for node in &mut self.nodes {
            if node.is_cluster_head || !node.is_alive {
                continue;
            }
            let mut best: Option<(NodeId, f64)> = None;
            for &(head_id, head_pos) in &heads {
                let dist = node.position.distance(&head_pos);
                // Strict comparison keeps the earlier (lower) id on ties
                if best.map_or(true, |(_, best_dist)| dist < best_dist) {
                    best = Some((head_id, dist));
                }
            }
            node.cluster_id = best.map(|(id, _)| id);
        }
    }

    /// Follower traffic first, then head aggregation and uplink.
    fn transmit_data(&mut self) {
        let energy = self.config.energy;

        for i in 0..self.nodes.len() {
            let follower = &self.nodes[i];
            if !follower.is_alive || follower.is_cluster_head {
                continue;
            }
            let Some(head_id) = follower.cluster_id else {
                continue;
            };
            self.nodes[i].consume(energy.transmit);
            self.nodes[head_id.0].consume(energy.receive);
        }

        for &head_id in &self.cluster_heads {
            let head = &mut self.nodes[head_id.0];
            if head.is_alive {
                head.consume(energy.aggregation);
                head.consume(energy.transmit);
            }
        }
    }

    fn refresh_states(&mut self) {
        for node in &mut self.nodes {
            node.refresh_band();
        }
    }

    /// True once the dead fraction reaches the death threshold.
    pub fn should_stop(&self) -> bool {
        let total = self.nodes.len();
        if total == 0 {
            return true;
        }
        let dead = total - self.alive_count();
        dead as f64 / total as f64 >= self.config.death_threshold
    }

    pub fn alive_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_alive).count()
    }

    pub fn dead_count(&self) -> usize {
        self.nodes.len() - self.alive_count()
    }

    pub fn total_energy(&self) -> f64 {
        self.nodes.iter().map(|n| n.energy).sum()
    }

    pub fn round_count(&self) -> u64 {
        self.round_count
    }

    pub fn first_death_round(&self) -> Option<u64> {
        self.first_death_round
    }

    pub fn cluster_heads(&self) -> &[NodeId] {
        &self.cluster_heads
    }

    pub fn nodes(&self) -> &[SensorNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&SensorNode> {
        self.nodes.get(id.0)
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    #[cfg(test)]
    fn place(&mut self, positions: &[Position]) {
        self.nodes = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| SensorNode::new(NodeId(i), p))
            .collect();
    }
}
