//! WSN-SIM: step-driven wireless sensor network simulations
//!
//! Core library for two pedagogical simulations: breadth-first route discovery
//! over a random geometric graph, and LEACH-style cluster-head rotation with
//! energy depletion. Both expose a single "advance" operation so an external
//! driver (timer, renderer, test) decides the pace.

pub mod cluster;
pub mod config;
pub mod error;
pub mod experiment;
pub mod routing;
pub mod snapshot;
pub mod telemetry;
pub mod topology;

pub use error::SimError;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Node identifier. Nodes of a graph or population are numbered `0..N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point in the 2D deployment area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Draw a point uniformly from `[margin, width - margin] × [margin, height - margin]`.
    ///
    /// Callers validate that the area is at least `2 * margin` wide and tall.
    pub fn random_in<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64, margin: f64) -> Self {
        let x = rng.gen_range(margin..=width - margin);
        let y = rng.gen_range(margin..=height - margin);
        Self { x, y }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}
