// Career path search over the transition graph.
// Dijkstra on the producer-supplied edge cost; confidence is the product of step probabilities.

pub mod finder;
pub mod graph;
pub mod handlers;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub use finder::{CareerPath, PathFinder, TransitionStep};
pub use graph::{GraphBuilder, TransitionGraph};

/// Which endpoint of a path request a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSide {
    Current,
    Target,
}

impl fmt::Display for PathSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSide::Current => write!(f, "current"),
            PathSide::Target => write!(f, "target"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("{side} role '{role}' is not in the transition graph")]
    NodeNotFound { side: PathSide, role: String },

    #[error("No realistic path found from '{from}' to '{to}'.")]
    NoPathExists { from: String, to: String },
}

impl PathError {
    /// Stable machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            PathError::NodeNotFound { .. } => "node_not_found",
            PathError::NoPathExists { .. } => "no_path_exists",
        }
    }
}
