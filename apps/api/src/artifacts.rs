//! Startup loading of the three read-only artifacts: role catalog,
//! role embeddings, and the transition graph.
//!
//! Formats:
//! - catalog: JSON array of role names
//! - embeddings: `{"model": "...", "dimension": n, "vectors": [[...], ...]}`
//! - graph: node-link JSON, `{"nodes": [{"id"}], "links": [{"source", "target",
//!   "probability", "count", "weight"}]}` (`cost` is accepted for `weight`)

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::pathfinding::{GraphBuilder, TransitionGraph};
use crate::resolution::{EmbeddingIndex, RoleCatalog};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct EmbeddingsFile {
    #[serde(default)]
    model: Option<String>,
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct GraphFile {
    #[serde(default = "default_directed")]
    directed: bool,
    #[serde(default)]
    nodes: Vec<NodeRecord>,
    #[serde(alias = "edges")]
    links: Vec<LinkRecord>,
}

#[derive(Debug, Deserialize)]
struct NodeRecord {
    id: String,
}

#[derive(Debug, Deserialize)]
struct LinkRecord {
    source: String,
    target: String,
    probability: f64,
    count: u64,
    #[serde(alias = "cost")]
    weight: f64,
}

fn default_directed() -> bool {
    true
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Json {
        path: display,
        source,
    })
}

pub fn load_catalog(path: &Path) -> Result<RoleCatalog, ArtifactError> {
    let raw: Vec<String> = read_json(path)?;
    let catalog = RoleCatalog::new(raw)?;
    if catalog.is_empty() {
        return Err(ArtifactError::Invalid("role catalog is empty".to_string()));
    }
    info!("Loaded role catalog: {} roles", catalog.len());
    Ok(catalog)
}

pub fn load_embeddings(path: &Path) -> Result<EmbeddingIndex, ArtifactError> {
    let file: EmbeddingsFile = read_json(path)?;
    let index = EmbeddingIndex::new(file.dimension, file.vectors)?;
    if index.is_empty() {
        return Err(ArtifactError::Invalid(
            "embeddings file contains no vectors".to_string(),
        ));
    }
    info!(
        "Loaded role embeddings: {} vectors, dim {} (model: {})",
        index.len(),
        index.dimension(),
        file.model.as_deref().unwrap_or("unspecified")
    );
    Ok(index)
}

pub fn load_graph(path: &Path) -> Result<TransitionGraph, ArtifactError> {
    let file: GraphFile = read_json(path)?;
    if !file.directed {
        return Err(ArtifactError::Invalid(
            "transition graph must be directed".to_string(),
        ));
    }

    let mut builder = GraphBuilder::new();
    for node in &file.nodes {
        builder.add_node(&node.id)?;
    }
    for link in &file.links {
        builder.add_edge(
            &link.source,
            &link.target,
            link.probability,
            link.count,
            link.weight,
        )?;
    }

    let graph = builder.build();
    info!(
        "Loaded transition graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_catalog_normalizes_entries() {
        let f = fixture(r#"["Data Analyst", " ML Engineer "]"#);
        let catalog = load_catalog(f.path()).unwrap();
        assert_eq!(catalog.roles(), &["data analyst", "ml engineer"]);
    }

    #[test]
    fn test_load_catalog_rejects_duplicates() {
        let f = fixture(r#"["Analyst", "analyst"]"#);
        assert!(matches!(load_catalog(f.path()), Err(ArtifactError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_catalog(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/catalog.json"));
    }

    #[test]
    fn test_load_catalog_rejects_empty() {
        let f = fixture("[]");
        assert!(matches!(load_catalog(f.path()), Err(ArtifactError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let f = fixture("[\"analyst\",");
        assert!(matches!(load_catalog(f.path()), Err(ArtifactError::Json { .. })));
    }

    #[test]
    fn test_load_embeddings_normalizes_vectors() {
        let f = fixture(r#"{"model": "all-minilm", "dimension": 2, "vectors": [[3.0, 4.0], [0.0, 2.0]]}"#);
        let index = load_embeddings(f.path()).unwrap();
        assert_eq!(index.len(), 2);
        let first = index.vector(0).unwrap();
        assert!((first[0] - 0.6).abs() < 1e-6);
        assert!((first[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_load_embeddings_rejects_ragged_rows() {
        let f = fixture(r#"{"dimension": 2, "vectors": [[1.0, 0.0], [1.0]]}"#);
        assert!(matches!(load_embeddings(f.path()), Err(ArtifactError::Invalid(_))));
    }

    #[test]
    fn test_load_graph_node_link_format() {
        let f = fixture(
            r#"{
                "directed": true,
                "multigraph": false,
                "graph": {},
                "nodes": [{"id": "Analyst"}, {"id": "Engineer"}, {"id": "Isolated"}],
                "links": [
                    {"source": "analyst", "target": "engineer", "probability": 0.6, "count": 40, "weight": 0.51},
                    {"source": "engineer", "target": "ml engineer", "probability": 0.4, "count": 15, "cost": 0.92}
                ]
            }"#,
        );
        let graph = load_graph(f.path()).unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.position("isolated"), Some(2));
        assert_eq!(graph.position("ml engineer"), Some(3));
        let e = graph.edge(1, 3).unwrap();
        assert!((e.cost - 0.92).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_graph_rejects_negative_cost() {
        let f = fixture(
            r#"{"links": [{"source": "a", "target": "b", "probability": 0.5, "count": 1, "weight": -1.0}]}"#,
        );
        assert!(matches!(load_graph(f.path()), Err(ArtifactError::Invalid(_))));
    }

    #[test]
    fn test_load_graph_rejects_undirected() {
        let f = fixture(r#"{"directed": false, "nodes": [], "links": []}"#);
        assert!(load_graph(f.path()).is_err());
    }

    #[test]
    fn test_load_graph_requires_edge_attributes() {
        let f = fixture(r#"{"links": [{"source": "a", "target": "b", "weight": 1.0}]}"#);
        assert!(matches!(load_graph(f.path()), Err(ArtifactError::Json { .. })));
    }
}
