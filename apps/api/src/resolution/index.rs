use std::cmp::Ordering;

use crate::artifacts::ArtifactError;

/// Exact inner-product index over unit-length role embeddings.
///
/// Vectors are stored row-major in one buffer; row `i` belongs to catalog
/// position `i`. Because every row is unit length, the inner product of a
/// unit query with a row is the cosine similarity.
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    dimension: usize,
    data: Vec<f32>,
}

/// One search hit: catalog position and cosine similarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexHit {
    pub position: usize,
    pub score: f32,
}

impl EmbeddingIndex {
    /// Validates and L2-normalizes the supplied rows.
    pub fn new(dimension: usize, vectors: Vec<Vec<f32>>) -> Result<Self, ArtifactError> {
        if dimension == 0 {
            return Err(ArtifactError::Invalid(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }

        let mut data = Vec::with_capacity(dimension * vectors.len());
        for (row, mut vector) in vectors.into_iter().enumerate() {
            if vector.len() != dimension {
                return Err(ArtifactError::Invalid(format!(
                    "embedding {row} has {} components, expected {dimension}",
                    vector.len()
                )));
            }
            if !l2_normalize(&mut vector) {
                return Err(ArtifactError::Invalid(format!(
                    "embedding {row} is zero or non-finite"
                )));
            }
            data.extend_from_slice(&vector);
        }

        Ok(Self { dimension, data })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[cfg(test)]
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    /// Returns up to `k` rows closest to `query` by inner product.
    ///
    /// Hits are ordered by descending score, ties by ascending position.
    /// `query` must already be unit length and `dimension()` long.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<IndexHit> {
        debug_assert_eq!(query.len(), self.dimension);
        if k == 0 {
            return Vec::new();
        }

        let mut hits: Vec<IndexHit> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, row)| IndexHit {
                position,
                score: dot(query, row).clamp(-1.0, 1.0),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.position.cmp(&b.position))
        });
        hits.truncate(k);
        hits
    }
}

/// Scales `vector` to unit length in place.
/// Returns `false` and leaves the vector untouched when its norm is zero or non-finite.
pub fn l2_normalize(vector: &mut [f32]) -> bool {
    let norm = vector
        .iter()
        .map(|v| f64::from(*v) * f64::from(*v))
        .sum::<f64>()
        .sqrt();
    if !norm.is_finite() || norm <= f64::EPSILON {
        return false;
    }
    for v in vector.iter_mut() {
        *v = (f64::from(*v) / norm) as f32;
    }
    true
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
