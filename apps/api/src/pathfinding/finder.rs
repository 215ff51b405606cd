use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::models::role::normalize_role;
use crate::pathfinding::graph::TransitionGraph;
use crate::pathfinding::{PathError, PathSide};

/// One hop of a career path, with the edge statistics that support it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionStep {
    pub from: String,
    pub to: String,
    pub probability: f64,
    pub count: u64,
}

/// Minimum-cost route between two roles.
///
/// `confidence` is the product of step probabilities and is reported
/// alongside the path; the search itself minimizes `total_cost`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerPath {
    pub roles: Vec<String>,
    pub steps: Vec<TransitionStep>,
    pub confidence: f64,
    pub total_cost: f64,
}

/// Read-only after construction; shared across handlers behind an `Arc`.
pub struct PathFinder {
    graph: TransitionGraph,
}

impl PathFinder {
    pub fn new(graph: TransitionGraph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &TransitionGraph {
        &self.graph
    }

    /// Finds the cheapest transition path from `current_role` to `target_role`.
    ///
    /// Both endpoints must be graph nodes. Identical endpoints then succeed
    /// immediately with no steps and confidence 1.0.
    pub fn find_path(&self, current_role: &str, target_role: &str) -> Result<CareerPath, PathError> {
        let from = normalize_role(current_role);
        let to = normalize_role(target_role);

        let source = self
            .graph
            .position(&from)
            .ok_or_else(|| PathError::NodeNotFound {
                side: PathSide::Current,
                role: from.clone(),
            })?;
        let goal = self
            .graph
            .position(&to)
            .ok_or_else(|| PathError::NodeNotFound {
                side: PathSide::Target,
                role: to.clone(),
            })?;

        if source == goal {
            return Ok(CareerPath {
                roles: vec![from],
                steps: Vec::new(),
                confidence: 1.0,
                total_cost: 0.0,
            });
        }

        let Some((nodes, total_cost)) = shortest_path(&self.graph, source, goal) else {
            debug!("No path from '{from}' to '{to}'");
            return Err(PathError::NoPathExists { from, to });
        };

        let path = self.assemble(&nodes, total_cost);
        debug!(
            "Path '{from}' -> '{to}': {} steps, cost {:.4}, confidence {:.4}",
            path.steps.len(),
            path.total_cost,
            path.confidence
        );
        Ok(path)
    }

    fn assemble(&self, nodes: &[usize], total_cost: f64) -> CareerPath {
        let mut steps = Vec::with_capacity(nodes.len().saturating_sub(1));
        let mut confidence = 1.0_f64;

        for pair in nodes.windows(2) {
            // Every consecutive pair came from a relaxed edge.
            let Some(edge) = self.graph.edge(pair[0], pair[1]) else {
                warn!(
                    "Path hop '{}' -> '{}' has no edge; step omitted",
                    self.graph.name(pair[0]),
                    self.graph.name(pair[1])
                );
                debug_assert!(false, "path hop without a graph edge");
                continue;
            };
            confidence *= edge.probability;
            steps.push(TransitionStep {
                from: self.graph.name(pair[0]).to_string(),
                to: self.graph.name(pair[1]).to_string(),
                probability: edge.probability,
                count: edge.count,
            });
        }

        // Long chains of small probabilities underflow; confidence stays in (0, 1].
        let confidence = confidence.max(f64::MIN_POSITIVE);

        CareerPath {
            roles: nodes.iter().map(|&n| self.graph.name(n).to_string()).collect(),
            steps,
            confidence,
            total_cost,
        }
    }
}

/// Dijkstra priority queue entry, ordered so `BinaryHeap` pops the lowest
/// cost first and, among equal costs, the lowest node index.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: f64,
    node: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Returns the node sequence and summed cost of the cheapest path, if any.
///
/// A tentative distance is only replaced by a strictly smaller one, so among
/// equal-cost routes the first discovered wins and repeated runs agree.
fn shortest_path(graph: &TransitionGraph, source: usize, goal: usize) -> Option<(Vec<usize>, f64)> {
    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut came_from: Vec<Option<usize>> = vec![None; n];
    let mut open = BinaryHeap::new();

    dist[source] = 0.0;
    open.push(Frontier {
        cost: 0.0,
        node: source,
    });

    while let Some(Frontier { cost, node }) = open.pop() {
        if node == goal {
            let mut path = vec![goal];
            let mut current = goal;
            while let Some(parent) = came_from[current] {
                path.push(parent);
                current = parent;
            }
            path.reverse();
            return Some((path, cost));
        }

        // Stale entry superseded by a cheaper push.
        if cost > dist[node] {
            continue;
        }

        for edge in graph.edges(node) {
            let tentative = cost + edge.cost;
            if tentative < dist[edge.target] {
                dist[edge.target] = tentative;
                came_from[edge.target] = Some(node);
                open.push(Frontier {
                    cost: tentative,
                    node: edge.target,
                });
            }
        }
    }

    None
}
