use std::collections::{HashMap, HashSet};

use crate::artifacts::ArtifactError;
use crate::models::role::normalize_role;

/// Outgoing edge stored in the adjacency list of its source node.
///
/// `cost` is the search weight exactly as the graph producer supplied it;
/// it is never derived from `probability` here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionEdge {
    pub target: usize,
    pub probability: f64,
    pub count: u64,
    pub cost: f64,
}

/// Immutable directed graph of observed role transitions.
///
/// Nodes are indexed in insertion order and each adjacency list is sorted by
/// target index, which keeps search order stable between runs.
#[derive(Debug, Clone)]
pub struct TransitionGraph {
    nodes: Vec<String>,
    positions: HashMap<String, usize>,
    adjacency: Vec<Vec<TransitionEdge>>,
    edge_count: usize,
}

impl TransitionGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn position(&self, role: &str) -> Option<usize> {
        self.positions.get(role).copied()
    }

    pub fn name(&self, node: usize) -> &str {
        &self.nodes[node]
    }

    pub fn edges(&self, node: usize) -> &[TransitionEdge] {
        &self.adjacency[node]
    }

    /// Roles from `roles` that are not graph nodes, in input order.
    pub fn missing_roles<'a>(&self, roles: &'a [String]) -> Vec<&'a str> {
        roles
            .iter()
            .filter(|r| !self.positions.contains_key(r.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Edge `source -> target` by node index.
    pub fn edge(&self, source: usize, target: usize) -> Option<&TransitionEdge> {
        let edges = self.adjacency.get(source)?;
        edges
            .binary_search_by_key(&target, |e| e.target)
            .ok()
            .map(|i| &edges[i])
    }
}

/// Validating builder; the only way to obtain a `TransitionGraph`.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<String>,
    positions: HashMap<String, usize>,
    adjacency: Vec<Vec<TransitionEdge>>,
    seen: HashSet<(usize, usize)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node if absent and returns its index.
    pub fn add_node(&mut self, raw: &str) -> Result<usize, ArtifactError> {
        let role = normalize_role(raw);
        if role.is_empty() {
            return Err(ArtifactError::Invalid("graph node id is blank".to_string()));
        }
        if let Some(&node) = self.positions.get(&role) {
            return Ok(node);
        }
        let node = self.nodes.len();
        self.positions.insert(role.clone(), node);
        self.nodes.push(role);
        self.adjacency.push(Vec::new());
        Ok(node)
    }

    /// Adds `source -> target`, creating missing endpoints.
    ///
    /// Rejects probability outside (0, 1], zero count, negative or
    /// non-finite cost, and a second edge between the same ordered pair.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        probability: f64,
        count: u64,
        cost: f64,
    ) -> Result<(), ArtifactError> {
        let label = format!("edge '{}' -> '{}'", source.trim(), target.trim());

        if !(probability.is_finite() && probability > 0.0 && probability <= 1.0) {
            return Err(ArtifactError::Invalid(format!(
                "{label}: probability {probability} is outside (0, 1]"
            )));
        }
        if count == 0 {
            return Err(ArtifactError::Invalid(format!("{label}: count must be positive")));
        }
        if !(cost.is_finite() && cost >= 0.0) {
            return Err(ArtifactError::Invalid(format!(
                "{label}: cost {cost} must be finite and non-negative"
            )));
        }

        let from = self.add_node(source)?;
        let to = self.add_node(target)?;
        if !self.seen.insert((from, to)) {
            return Err(ArtifactError::Invalid(format!("{label}: duplicate edge")));
        }

        self.adjacency[from].push(TransitionEdge {
            target: to,
            probability,
            count,
            cost,
        });
        Ok(())
    }

    pub fn build(mut self) -> TransitionGraph {
        for edges in &mut self.adjacency {
            edges.sort_by_key(|e| e.target);
        }
        TransitionGraph {
            nodes: self.nodes,
            positions: self.positions,
            adjacency: self.adjacency,
            edge_count: self.seen.len(),
        }
    }
}
