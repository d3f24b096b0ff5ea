//! Read-only render snapshots
//!
//! Flattened, serializable views of the current simulation state for an
//! external renderer. A snapshot never borrows from the simulation, so the
//! driver can hand it to another thread or write it to disk.

use crate::cluster::{ClusterSimulation, EnergyBand};
use crate::error::SimError;
use crate::routing::{RoutingSearch, SearchStatus};
use crate::topology::Graph;
use crate::{NodeId, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// How a graph node should be drawn. Later variants take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeMark {
    Unvisited,
    Discovered,
    Processed,
    Source,
    Destination,
    Path,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNodeView {
    pub id: NodeId,
    pub position: Position,
    pub mark: NodeMark,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNodeView>,
    pub edges: Vec<(NodeId, NodeId)>,
    pub source: NodeId,
    pub destination: NodeId,
    pub status: SearchStatus,
    pub frontier: Vec<NodeId>,
    /// Present only when the search found the destination
    pub path: Option<Vec<NodeId>>,
}

impl GraphSnapshot {
    /// Topology only, before any search.
    pub fn of_graph(graph: &Graph) -> Self {
        let nodes = graph
            .node_ids()
            .map(|id| GraphNodeView {
                id,
                position: graph.positions()[id.0],
                mark: endpoint_mark(id, graph.source(), graph.destination())
                    .unwrap_or(NodeMark::Unvisited),
                is_current: false,
            })
            .collect();

        Self {
            nodes,
            edges: graph.edges(),
            source: graph.source(),
            destination: graph.destination(),
            status: SearchStatus::Idle,
            frontier: Vec::new(),
            path: None,
        }
    }

    pub fn of_search(search: &RoutingSearch<'_>) -> Self {
        let graph = search.graph();
        let processed: HashSet<NodeId> = search.processed().iter().copied().collect();
        let path: HashSet<NodeId> = search
            .path()
            .map(|p| p.iter().copied().collect())
            .unwrap_or_default();

        let nodes = graph
            .node_ids()
            .map(|id| {
                let mark = if path.contains(&id) {
                    NodeMark::Path
                } else if let Some(mark) = endpoint_mark(id, search.source(), search.destination())
                {
                    mark
                } else if processed.contains(&id) {
                    NodeMark::Processed
                } else if search.is_visited(id) {
                    NodeMark::Discovered
                } else {
                    NodeMark::Unvisited
                };
                GraphNodeView {
                    id,
                    position: graph.positions()[id.0],
                    mark,
                    is_current: search.current() == Some(id),
                }
            })
            .collect();

        Self {
            nodes,
            edges: graph.edges(),
            source: search.source(),
            destination: search.destination(),
            status: search.status(),
            frontier: search.frontier().collect(),
            path: search.path().map(<[NodeId]>::to_vec),
        }
    }
}

fn endpoint_mark(id: NodeId, source: NodeId, destination: NodeId) -> Option<NodeMark> {
    if id == source {
        Some(NodeMark::Source)
    } else if id == destination {
        Some(NodeMark::Destination)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorView {
    pub id: NodeId,
    pub position: Position,
    pub energy: f64,
    pub band: EnergyBand,
    pub is_cluster_head: bool,
    /// Head to draw a link to; only set while both ends are alive
    pub link: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    pub round: u64,
    pub alive: usize,
    pub total: usize,
    pub base_station: Position,
    pub nodes: Vec<SensorView>,
}

impl ClusterSnapshot {
    pub fn of<R: Rng>(sim: &ClusterSimulation<R>) -> Self {
        let nodes = sim
            .nodes()
            .iter()
            .map(|node| {
                let link = node.cluster_id().filter(|&head| {
                    node.is_alive() && sim.node(head).map_or(false, |h| h.is_alive())
                });
                SensorView {
                    id: node.id,
                    position: node.position,
                    energy: node.energy(),
                    band: node.band(),
                    is_cluster_head: node.is_cluster_head() && node.is_alive(),
                    link,
                }
            })
            .collect();

        Self {
            round: sim.round_count(),
            alive: sim.alive_count(),
            total: sim.nodes().len(),
            base_station: sim.config().base_station,
            nodes,
        }
    }
}

/// Write any serializable snapshot or trace as pretty JSON.
pub fn write_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), SimError> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}
