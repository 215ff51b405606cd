use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::models::role::normalize_role;
use crate::resolution::catalog::RoleCatalog;
use crate::resolution::embedder::Embedder;
use crate::resolution::index::{l2_normalize, EmbeddingIndex};
use crate::resolution::ResolutionError;

const CATALOG_EMBED_BATCH: usize = 64;

/// A canonical role and how closely it matched the input.
/// `score` is 1.0 for an exact match, cosine similarity otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMatch {
    pub role: String,
    pub score: f32,
}

/// Read-only after construction; shared across handlers behind an `Arc`.
pub struct RoleResolver {
    catalog: RoleCatalog,
    index: EmbeddingIndex,
    embedder: Arc<dyn Embedder>,
}

impl RoleResolver {
    pub fn new(catalog: RoleCatalog, index: EmbeddingIndex, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            catalog,
            index,
            embedder,
        }
    }

    /// Builds the index by embedding every catalog entry with `embedder`.
    /// Used when no precomputed embeddings file is configured.
    pub async fn with_embedded_catalog(
        catalog: RoleCatalog,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, ResolutionError> {
        let mut vectors = Vec::with_capacity(catalog.len());
        for batch in catalog.roles().chunks(CATALOG_EMBED_BATCH) {
            let embedded = embedder
                .embed_batch(batch)
                .await
                .map_err(|e| ResolutionError::ModelUnavailable(e.to_string()))?;
            vectors.extend(embedded);
        }

        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        let index = EmbeddingIndex::new(dimension, vectors)
            .map_err(|e| ResolutionError::InvalidEmbedding(e.to_string()))?;

        Ok(Self::new(catalog, index, embedder))
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }

    pub fn embedder_name(&self) -> String {
        self.embedder.name()
    }

    /// Checks that every catalog position has exactly one vector.
    pub fn verify(&self) -> Result<(), ResolutionError> {
        if self.index.len() != self.catalog.len() {
            return Err(ResolutionError::IndexCorrupt {
                vectors: self.index.len(),
                roles: self.catalog.len(),
            });
        }
        Ok(())
    }

    /// Resolves free text to at most `k` canonical roles, best first.
    ///
    /// Blank input yields an empty list. Text equal to a catalog entry (after
    /// normalization) yields that single entry with score 1.0 for any `k`.
    pub async fn resolve(&self, text: &str, k: usize) -> Result<Vec<ResolvedMatch>, ResolutionError> {
        let query = normalize_role(text);
        if query.is_empty() {
            return Ok(Vec::new());
        }

        self.verify()?;

        if self.catalog.position(&query).is_some() {
            debug!("Exact catalog match for '{query}'");
            return Ok(vec![ResolvedMatch {
                role: query,
                score: 1.0,
            }]);
        }

        if k == 0 {
            return Ok(Vec::new());
        }

        let mut vector = self
            .embedder
            .embed(&query)
            .await
            .map_err(|e| ResolutionError::ModelUnavailable(e.to_string()))?;

        if vector.len() != self.index.dimension() {
            return Err(ResolutionError::InvalidEmbedding(format!(
                "backend returned {} components, index expects {}",
                vector.len(),
                self.index.dimension()
            )));
        }
        if !l2_normalize(&mut vector) {
            return Err(ResolutionError::InvalidEmbedding(
                "query embedding is zero or non-finite".to_string(),
            ));
        }

        let matches: Vec<ResolvedMatch> = self
            .index
            .search(&vector, k)
            .into_iter()
            .filter_map(|hit| {
                self.catalog.get(hit.position).map(|role| ResolvedMatch {
                    role: role.to_string(),
                    score: hit.score,
                })
            })
            .collect();

        debug!(
            "Vector search for '{query}' returned {} matches (k={k})",
            matches.len()
        );
        Ok(matches)
    }
}
