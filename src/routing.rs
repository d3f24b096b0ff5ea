//! Step-wise Breadth-First Route Discovery
//!
//! Implements BFS as an explicit state machine so a driver can animate the
//! search one expansion at a time. The search stops as soon as the
//! destination is discovered and rebuilds the hop-optimal path from the
//! predecessor links.

use crate::error::SimError;
use crate::topology::Graph;
use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, info};

/// Lifecycle of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStatus {
    /// Not started, or stopped by the caller
    Idle,
    /// Frontier may still reach the destination
    Running,
    /// Destination discovered, path available
    Found,
    /// Frontier drained without reaching the destination
    Exhausted,
}

impl SearchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SearchStatus::Found | SearchStatus::Exhausted)
    }
}

/// What a single call to [`RoutingSearch::step`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Node dequeued and expanded, `None` if the step did no work
    pub current: Option<NodeId>,
    /// Nodes discovered during this step, in discovery order
    pub discovered: Vec<NodeId>,
    pub status: SearchStatus,
}

/// Incremental BFS from a source to a destination over a fixed graph.
#[derive(Debug, Clone)]
pub struct RoutingSearch<'g> {
    graph: &'g Graph,
    source: NodeId,
    destination: NodeId,
    frontier: VecDeque<NodeId>,
    visited: HashSet<NodeId>,
    predecessor: HashMap<NodeId, NodeId>,
    /// Nodes fully expanded without finding the destination
    processed: Vec<NodeId>,
    current: Option<NodeId>,
    status: SearchStatus,
    path: Option<Vec<NodeId>>,
    steps: usize,
}

impl<'g> RoutingSearch<'g> {
    /// Search between the graph's own source and destination.
    ///
    /// Fails when those coincide, as in a single-node graph.
    pub fn new(graph: &'g Graph) -> Result<Self, SimError> {
        Self::with_endpoints(graph, graph.source(), graph.destination())
    }

    /// Search between explicit endpoints.
    pub fn with_endpoints(
        graph: &'g Graph,
        source: NodeId,
        destination: NodeId,
    ) -> Result<Self, SimError> {
        graph.check_node(source)?;
        graph.check_node(destination)?;
        if source == destination {
            return Err(SimError::config(format!(
                "source and destination must differ, both are {}",
                source
            )));
        }
        Ok(Self {
            graph,
            source,
            destination,
            frontier: VecDeque::new(),
            visited: HashSet::new(),
            predecessor: HashMap::new(),
            processed: Vec::new(),
            current: None,
            status: SearchStatus::Idle,
            path: None,
            steps: 0,
        })
    }

    /// Reset the working state to `frontier = [source]`, `visited = {source}`.
    ///
    /// Fails if a search is already running. A finished or stopped search
    /// starts over from scratch.
    pub fn start(&mut self) -> Result<(), SimError> {
        if self.status == SearchStatus::Running {
            return Err(SimError::state("search already running"));
        }

        self.frontier.clear();
        self.visited.clear();
        self.predecessor.clear();
        self.processed.clear();
        self.current = None;
        self.path = None;
        self.steps = 0;

        self.frontier.push_back(self.source);
        self.visited.insert(self.source);
        self.status = SearchStatus::Running;

        info!(source = %self.source, destination = %self.destination, "Starting BFS");
        Ok(())
    }

    /// Pause a running search. Explored state is kept for display; the next
    /// [`start`](Self::start) begins again from the source.
    pub fn stop(&mut self) {
        if self.status == SearchStatus::Running {
            self.status = SearchStatus::Idle;
            debug!(steps = self.steps, "BFS stopped");
        }
    }

    /// Expand one frontier node. No-op unless the search is running.
    pub fn step(&mut self) -> StepOutcome {
        if self.status != SearchStatus::Running {
            return StepOutcome {
                current: None,
                discovered: Vec::new(),
                status: self.status,
            };
        }

        let current = match self.frontier.pop_front() {
            Some(node) => node,
            None => {
                self.status = SearchStatus::Exhausted;
                self.current = None;
                info!(
                    visited = self.visited.len(),
                    steps = self.steps,
                    "BFS exhausted, destination unreachable"
                );
                return StepOutcome {
                    current: None,
                    discovered: Vec::new(),
                    status: self.status,
                };
            }
        };

        self.steps += 1;
        self.current = Some(current);
        let mut discovered = Vec::new();

        for &neighbor in self.graph.neighbors(current) {
            if !self.visited.insert(neighbor) {
                continue;
            }
            self.frontier.push_back(neighbor);
            self.predecessor.insert(neighbor, current);
            discovered.push(neighbor);

            // Remaining neighbors of `current` are left unexplored
            if neighbor == self.destination {
                let path = self.reconstruct_path(neighbor);
                info!(hops = path.len() - 1, steps = self.steps, ?path, "Path found");
                self.path = Some(path);
                self.status = SearchStatus::Found;
                return StepOutcome {
                    current: Some(current),
                    discovered,
                    status: self.status,
                };
            }
        }

        self.processed.push(current);
        debug!(
            step = self.steps,
            %current,
            discovered = discovered.len(),
            frontier = self.frontier.len(),
            "BFS step"
        );

        StepOutcome {
            current: Some(current),
            discovered,
            status: self.status,
        }
    }

    /// Start if idle, then step until the search finishes.
    pub fn run_to_completion(&mut self) -> Result<SearchStatus, SimError> {
        if self.status != SearchStatus::Running {
            self.start()?;
        }
        while !self.status.is_terminal() {
            self.step();
        }
        Ok(self.status)
    }

    /// Walk predecessor links back from `node` to the source, returned in
    /// source-to-`node` order. An undiscovered node yields just itself.
    pub fn reconstruct_path(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = vec![node];
        let mut cursor = node;
        while let Some(&prev) = self.predecessor.get(&cursor) {
            path.push(prev);
            cursor = prev;
        }
        path.reverse();
        path
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    /// Final path, present only once the search is `Found`.
    pub fn path(&self) -> Option<&[NodeId]> {
        self.path.as_deref()
    }

    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    pub fn is_visited(&self, node: NodeId) -> bool {
        self.visited.contains(&node)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn frontier(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.frontier.iter().copied()
    }

    pub fn processed(&self) -> &[NodeId] {
        &self.processed
    }

    pub fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        self.predecessor.get(&node).copied()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    fn create_test_graph() -> Graph {
        // Triangle 0-1-2 (1 and 2 are ~14.1 apart), 3 isolated
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

    fn create_line_graph(n: usize) -> Graph {
        Graph::from_positions(
            (0..n).map(|i| Position::new(i as f64 * 10.0, 0.0)).collect(),
            10.0,
        )
    }

    #[test]
    fn test_direct_neighbor_found() {
        let graph = create_test_graph();
        let mut search = RoutingSearch::with_endpoints(&graph, NodeId(0), NodeId(1)).unwrap();
        search.start().unwrap();

        let outcome = search.step();
        assert_eq!(outcome.current, Some(NodeId(0)));
        assert_eq!(outcome.discovered, vec![NodeId(1)]);
        assert_eq!(outcome.status, SearchStatus::Found);
        assert_eq!(search.path(), Some(&[NodeId(0), NodeId(1)][..]));
        // Early exit: node 2 never discovered
        assert!(!search.is_visited(NodeId(2)));
    }

    #[test]
    fn test_isolated_destination_exhausts() {
        let graph = create_test_graph();
        let mut search = RoutingSearch::with_endpoints(&graph, NodeId(0), NodeId(3)).unwrap();
        let status = search.run_to_completion().unwrap();

        assert_eq!(status, SearchStatus::Exhausted);
        assert!(search.path().is_none());
        assert_eq!(search.visited_count(), 3);
        // Three expansions, then one step to notice the empty frontier
        assert_eq!(search.steps(), 3);
    }

    #[test]
    fn test_line_graph_path() {
        let graph = create_line_graph(5);
        let mut search = RoutingSearch::with_endpoints(&graph, NodeId(0), NodeId(4)).unwrap();
        search.start().unwrap();

        let mut outcomes = Vec::new();
        while !search.status().is_terminal() {
            outcomes.push(search.step());
        }

        assert_eq!(outcomes.len(), 4);
        assert_eq!(
            search.path().unwrap(),
            &[NodeId(0), NodeId(1), NodeId(2), NodeId(3), NodeId(4)]
        );
        assert_eq!(search.processed(), &[NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(search.predecessor(NodeId(4)), Some(NodeId(3)));
        assert_eq!(search.predecessor(NodeId(0)), None);
    }

    #[test]
    fn test_step_after_terminal_is_noop() {
        let graph = create_test_graph();
        let mut search = RoutingSearch::with_endpoints(&graph, NodeId(0), NodeId(2)).unwrap();
        search.run_to_completion().unwrap();
        let path = search.path().map(|p| p.to_vec());

        for _ in 0..3 {
            let outcome = search.step();
            assert_eq!(outcome.current, None);
            assert!(outcome.discovered.is_empty());
            assert_eq!(outcome.status, SearchStatus::Found);
        }
        assert_eq!(search.path().map(|p| p.to_vec()), path);
    }

    #[test]
    fn test_step_while_idle_is_noop() {
        let graph = create_line_graph(3);
        let mut search = RoutingSearch::new(&graph).unwrap();
        let outcome = search.step();
        assert_eq!(outcome.status, SearchStatus::Idle);
        assert_eq!(search.visited_count(), 0);
    }

    #[test]
    fn test_start_while_running_fails() {
        let graph = create_line_graph(4);
        let mut search = RoutingSearch::new(&graph).unwrap();
        search.start().unwrap();
        assert!(matches!(search.start(), Err(SimError::InvalidState(_))));
    }

    #[test]
    fn test_stop_and_restart() {
        let graph = create_line_graph(6);
        let mut search = RoutingSearch::new(&graph).unwrap();
        search.start().unwrap();
        search.step();
        search.step();
        search.stop();

        assert_eq!(search.status(), SearchStatus::Idle);
        assert_eq!(search.step().status, SearchStatus::Idle);
        assert_eq!(search.visited_count(), 3);

        search.start().unwrap();
        assert_eq!(search.visited_count(), 1);
        assert_eq!(search.run_to_completion().unwrap(), SearchStatus::Found);
        assert_eq!(search.path().unwrap().len(), 6);
    }

    #[test]
    fn test_restart_after_found() {
        let graph = create_line_graph(3);
        let mut search = RoutingSearch::new(&graph).unwrap();
        search.run_to_completion().unwrap();
        assert!(search.start().is_ok());
        assert!(search.path().is_none());
        assert_eq!(search.status(), SearchStatus::Running);
    }

    #[test]
    fn test_invalid_endpoints() {
        let graph = create_test_graph();
        assert!(RoutingSearch::with_endpoints(&graph, NodeId(1), NodeId(1)).is_err());
        assert!(RoutingSearch::with_endpoints(&graph, NodeId(0), NodeId(4)).is_err());
    }

    #[test]
    fn test_single_node_graph_has_no_search() {
        let graph = Graph::from_positions(vec![Position::new(5.0, 5.0)], 10.0);
        assert_eq!(graph.source(), graph.destination());
        assert!(matches!(
            RoutingSearch::new(&graph),
            Err(SimError::Configuration(_))
        ));
    }

    #[test]
    fn test_reconstruct_undiscovered_node() {
        let graph = create_test_graph();
        let search = RoutingSearch::new(&graph).unwrap();
        assert_eq!(search.reconstruct_path(NodeId(2)), vec![NodeId(2)]);
    }
}
