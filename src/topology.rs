//! Random Geometric Graph Generation
//!
//! Nodes are scattered uniformly over a rectangular area and linked whenever
//! they lie within radio range of each other. In force-connected mode the
//! whole placement is resampled until a single component spans every node.

use crate::config::TopologyConfig;
use crate::error::SimError;
use crate::{NodeId, Position};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Undirected geometric graph with a chosen source and destination.
#[derive(Debug, Clone)]
pub struct Graph {
    positions: Vec<Position>,
    /// Neighbor lists, each sorted by ascending id
    adjacency: Vec<Vec<NodeId>>,
    max_distance: f64,
    source: NodeId,
    destination: NodeId,
}

impl Graph {
    /// Build the edge set for fixed positions.
    ///
    /// Endpoints default to the first and last node; use [`Graph::with_endpoints`]
    /// to pick others.
    pub fn from_positions(positions: Vec<Position>, max_distance: f64) -> Self {
        let n = positions.len();
        let mut adjacency = vec![Vec::new(); n];

        // Ascending i then ascending j keeps every neighbor list sorted
        for i in 0..n {
            for j in (i + 1)..n {
                if positions[i].distance(&positions[j]) <= max_distance {
                    adjacency[i].push(NodeId(j));
                    adjacency[j].push(NodeId(i));
                }
            }
        }

        Self {
            positions,
            adjacency,
            max_distance,
            source: NodeId(0),
            destination: NodeId(n.saturating_sub(1)),
        }
    }

    pub fn with_endpoints(mut self, source: NodeId, destination: NodeId) -> Result<Self, SimError> {
        self.check_node(source)?;
        self.check_node(destination)?;
        if source == destination {
            return Err(SimError::config(format!(
                "source and destination must differ, both are {}",
                source
            )));
        }
        self.source = source;
        self.destination = destination;
        Ok(self)
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.positions.len()).map(NodeId)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.0 < self.positions.len()
    }

    pub fn position(&self, node: NodeId) -> Option<Position> {
        self.positions.get(node.0).copied()
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Neighbors of `node` in ascending id order. Unknown nodes have none.
    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.adjacency.get(node.0).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    /// All edges as `(smaller, larger)` pairs.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut edges = Vec::with_capacity(self.edge_count());
        for (i, neighbors) in self.adjacency.iter().enumerate() {
            for &neighbor in neighbors {
                if i < neighbor.0 {
                    edges.push((NodeId(i), neighbor));
                }
            }
        }
        edges
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    pub(crate) fn check_node(&self, node: NodeId) -> Result<(), SimError> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(SimError::config(format!(
                "node {} not in graph of {} nodes",
                node,
                self.node_count()
            )))
        }
    }
}

/// Generates random geometric graphs from a validated [`TopologyConfig`].
#[derive(Debug, Clone)]
pub struct GraphGenerator {
    config: TopologyConfig,
}

impl GraphGenerator {
    pub fn new(config: TopologyConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }

    /// Produce a fresh graph with random source and destination.
    ///
    /// With `force_connected` and no `max_attempts` cap this retries until a
    /// connected placement appears. Sparse settings (many nodes, tiny
    /// `max_distance`) may never produce one and the call will not return.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Graph, SimError> {
        let config = &self.config;
        let mut attempts: u32 = 0;

        let mut graph = loop {
            attempts += 1;
            let positions = (0..config.node_count)
                .map(|_| Position::random_in(rng, config.width, config.height, config.margin))
                .collect();
            let candidate = Graph::from_positions(positions, config.max_distance);

            if !config.force_connected || is_connected(&candidate) {
                break candidate;
            }

            debug!(
                attempt = attempts,
                components = components(&candidate).len(),
                "Disconnected candidate, resampling"
            );

            if let Some(cap) = config.max_attempts {
                if attempts >= cap {
                    warn!(attempts, "Connectivity cap reached");
                    return Err(SimError::ConnectivityNotReached { attempts });
                }
            }
        };

        let ids: Vec<NodeId> = graph.node_ids().collect();
        let source = *ids.choose(rng).ok_or_else(|| SimError::config("empty graph"))?;
        let remaining: Vec<NodeId> = ids.into_iter().filter(|&id| id != source).collect();
        let destination = *remaining
            .choose(rng)
            .ok_or_else(|| SimError::config("graph needs at least two nodes"))?;
        graph.source = source;
        graph.destination = destination;

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            attempts,
            %source,
            %destination,
            "Generated topology"
        );
        Ok(graph)
    }
}

/// Hop distance from `from` to every node, `None` where unreachable.
pub fn hop_distances(graph: &Graph, from: NodeId) -> Vec<Option<usize>> {
    let mut dist = vec![None; graph.node_count()];
    if !graph.contains(from) {
        return dist;
    }

    let mut queue = VecDeque::new();
    dist[from.0] = Some(0);
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        let d = dist[current.0].unwrap_or(0);
        for &neighbor in graph.neighbors(current) {
            if dist[neighbor.0].is_none() {
                dist[neighbor.0] = Some(d + 1);
                queue.push_back(neighbor);
            }
        }
    }

    dist
}

/// Connected components, each sorted, ordered by smallest member.
pub fn components(graph: &Graph) -> Vec<Vec<NodeId>> {
    let mut seen = vec![false; graph.node_count()];
    let mut result = Vec::new();

    for start in graph.node_ids() {
        if seen[start.0] {
            continue;
        }
        let mut members = Vec::new();
        let mut stack = vec![start];
        seen[start.0] = true;
        while let Some(node) = stack.pop() {
            members.push(node);
            for &neighbor in graph.neighbors(node) {
                if !seen[neighbor.0] {
                    seen[neighbor.0] = true;
                    stack.push(neighbor);
                }
            }
        }
        members.sort();
        result.push(members);
    }

    result
}

/// True iff every node is reachable from every other. The empty graph counts as connected.
pub fn is_connected(graph: &Graph) -> bool {
    match graph.node_ids().next() {
        Some(first) => hop_distances(graph, first).iter().all(Option::is_some),
        None => true,
    }
}
