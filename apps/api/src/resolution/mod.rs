// Role resolution: free text -> ranked canonical roles.
// Exact catalog match first, cosine nearest neighbours over the embedding index otherwise.

pub mod catalog;
pub mod embedder;
pub mod handlers;
pub mod index;
pub mod resolver;

use thiserror::Error;

pub use catalog::RoleCatalog;
pub use embedder::{Embedder, OllamaEmbedder, TokenHashEmbedder};
pub use index::EmbeddingIndex;
pub use resolver::{ResolvedMatch, RoleResolver};

#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The text-to-vector step could not run.
    #[error("embedding model unavailable: {0}")]
    ModelUnavailable(String),

    /// Catalog and index disagree on size; the loaded state is unusable.
    #[error("embedding index holds {vectors} vectors but the catalog has {roles} roles")]
    IndexCorrupt { vectors: usize, roles: usize },

    /// The backend produced a vector the index cannot be queried with.
    #[error("invalid query embedding: {0}")]
    InvalidEmbedding(String),
}
