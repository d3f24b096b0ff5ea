//! Simulation configuration
//!
//! Every configuration type carries the defaults of the reference demos,
//! validates itself before use, and can be loaded from a JSON file.

use crate::error::SimError;
use crate::Position;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Largest accepted width or height. Keeps the sampling range finite.
pub const MAX_AREA_SIDE: f64 = 1.0e12;

/// Parameters for random geometric graph generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    pub node_count: usize,
    pub width: f64,
    pub height: f64,
    /// Keep-out band along each edge of the area (visual node radius)
    pub margin: f64,
    /// Two nodes are linked iff their distance is at most this value
    pub max_distance: f64,
    pub force_connected: bool,
    /// Cap on connectivity resampling. `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Delay between BFS steps, used by drivers only
    pub step_interval_ms: u64,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            node_count: 15,
            width: 700.0,
            height: 500.0,
            margin: 15.0,
            max_distance: 120.0,
            force_connected: false,
            max_attempts: None,
            step_interval_ms: 800,
        }
    }
}

impl TopologyConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        // Source and destination must be distinct nodes
        if self.node_count < 2 {
            return Err(SimError::config(format!(
                "node_count must be at least 2, got {}",
                self.node_count
            )));
        }
        validate_area(self.width, self.height, self.margin)?;
        if !self.max_distance.is_finite() || self.max_distance < 0.0 {
            return Err(SimError::config(format!(
                "max_distance must be a non-negative number, got {}",
                self.max_distance
            )));
        }
        if self.max_attempts == Some(0) {
            return Err(SimError::config("max_attempts must be positive when set"));
        }
        Ok(())
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }
}

/// Energy cost of each radio operation, in units of a full battery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyModel {
    pub transmit: f64,
    pub receive: f64,
    pub aggregation: f64,
}

impl Default for EnergyModel {
    fn default() -> Self {
        Self {
            transmit: 0.01,
            receive: 0.005,
            aggregation: 0.002,
        }
    }
}

impl EnergyModel {
    pub fn validate(&self) -> Result<(), SimError> {
        for (name, cost) in [
            ("transmit", self.transmit),
            ("receive", self.receive),
            ("aggregation", self.aggregation),
        ] {
            if !cost.is_finite() || cost < 0.0 {
                return Err(SimError::config(format!(
                    "{} cost must be a non-negative number, got {}",
                    name, cost
                )));
            }
        }
        Ok(())
    }
}

/// Parameters for the cluster-head rotation simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub node_count: usize,
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    /// Per-round probability that an alive node becomes a cluster head
    pub cluster_head_prob: f64,
    /// Fraction of dead nodes at which the run concludes
    pub death_threshold: f64,
    pub base_station: Position,
    pub energy: EnergyModel,
    /// Delay between rounds, used by drivers only
    pub round_interval_ms: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            node_count: 20,
            width: 600.0,
            height: 400.0,
            margin: 50.0,
            cluster_head_prob: 0.2,
            death_threshold: 0.8,
            base_station: Position::new(300.0, 20.0),
            energy: EnergyModel::default(),
            round_interval_ms: 1000,
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.node_count == 0 {
            return Err(SimError::config("node_count must be positive"));
        }
        validate_area(self.width, self.height, self.margin)?;
        validate_fraction("cluster_head_prob", self.cluster_head_prob)?;
        validate_fraction("death_threshold", self.death_threshold)?;
        self.energy.validate()
    }

    pub fn round_interval(&self) -> Duration {
        Duration::from_millis(self.round_interval_ms)
    }
}

fn validate_area(width: f64, height: f64, margin: f64) -> Result<(), SimError> {
    if !margin.is_finite() || margin < 0.0 {
        return Err(SimError::config(format!(
            "margin must be a non-negative number, got {}",
            margin
        )));
    }
    if !width.is_finite() || !height.is_finite() || width < 2.0 * margin || height < 2.0 * margin
    {
        return Err(SimError::config(format!(
            "area {}x{} is smaller than twice the margin {}",
            width, height, margin
        )));
    }
    if width > MAX_AREA_SIDE || height > MAX_AREA_SIDE {
        return Err(SimError::config(format!(
            "area {}x{} exceeds the maximum side {}",
            width, height, MAX_AREA_SIDE
        )));
    }
    Ok(())
}

fn validate_fraction(name: &str, value: f64) -> Result<(), SimError> {
    // NaN fails the range check too
    if !(0.0..=1.0).contains(&value) {
        return Err(SimError::config(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

/// Load a configuration value from a JSON file. Missing fields take their defaults.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, SimError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
