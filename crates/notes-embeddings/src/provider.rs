//! Embedding provider trait and vector type.

use serde::{Deserialize, Serialize};

use crate::error::EmbeddingError;

/// A unit-length embedding vector.
///
/// Scores are comparable across an index only when every vector has the
/// same length, so construction normalizes up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// Vector components, scaled to unit length.
    pub values: Vec<f32>,
}

impl Embedding {
    /// Build an embedding from raw components, scaling to unit length.
    /// An all-zero input has no direction and is kept as-is.
    pub fn new(values: Vec<f32>) -> Self {
        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm == 0.0 {
            return Self { values };
        }
        Self {
            values: values.into_iter().map(|v| v / norm).collect(),
        }
    }

    /// Wrap components that are already unit length, skipping the rescale.
    pub fn from_normalized(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Number of components.
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Cosine similarity with another embedding, in [-1, 1].
    ///
    /// Unit length makes this a plain dot product. Mismatched dimensions
    /// score 0.0; the store rejects mixed dimensions before any comparison.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.dimension() != other.dimension() {
            return 0.0;
        }
        self.values.iter().zip(&other.values).map(|(a, b)| a * b).sum()
    }
}

/// Trait for embedding providers.
///
/// Implementations must be thread-safe (Send + Sync) for shared use by the
/// rebuild engine and the search executor. Calls may be slow or blocking;
/// callers must not hold index locks across them.
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier of the active model (e.g. "all-MiniLM-L6-v2").
    ///
    /// Recorded alongside every vector; an index only holds vectors from
    /// one model version at a time.
    fn model_version(&self) -> &str;

    /// Dimension of the vectors this provider produces.
    fn dimension(&self) -> usize;

    /// Generate an embedding for a single text.
    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// Generate embeddings for multiple texts (batch).
    /// Default implementation calls embed() for each text and fails on
    /// the first per-item error.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(emb: &Embedding) -> f32 {
        emb.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    #[test]
    fn test_new_scales_to_unit_length() {
        let emb = Embedding::new(vec![2.0, -1.0, 2.0]);
        assert!((length(&emb) - 1.0).abs() < 1e-6);
        // Direction is preserved
        assert!(emb.values[0] > 0.0);
        assert!(emb.values[1] < 0.0);
    }

    #[test]
    fn test_zero_vector_stays_zero() {
        let emb = Embedding::new(vec![0.0, 0.0, 0.0]);
        assert_eq!(emb.values, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_from_normalized_skips_rescale() {
        let emb = Embedding::from_normalized(vec![0.5, 0.5]);
        assert_eq!(emb.values, vec![0.5, 0.5]);
    }

    #[test]
    fn test_similarity_tracks_angle() {
        let base = Embedding::new(vec![1.0, 1.0, 0.0]);
        let nearby = Embedding::new(vec![1.0, 0.8, 0.1]);
        let perpendicular = Embedding::new(vec![0.0, 0.0, 1.0]);
        let opposite = Embedding::new(vec![-1.0, -1.0, 0.0]);

        assert!((base.cosine_similarity(&base) - 1.0).abs() < 1e-6);
        assert!(base.cosine_similarity(&perpendicular).abs() < 1e-6);
        assert!((base.cosine_similarity(&opposite) + 1.0).abs() < 1e-6);
        assert!(base.cosine_similarity(&nearby) > base.cosine_similarity(&perpendicular));
    }

    #[test]
    fn test_cosine_similarity_dimension_mismatch_is_zero() {
        let emb1 = Embedding::new(vec![1.0, 0.0]);
        let emb2 = Embedding::new(vec![1.0, 0.0, 0.0]);
        assert_eq!(emb1.cosine_similarity(&emb2), 0.0);
    }

    #[test]
    fn test_embedding_serde_roundtrip() {
        let emb = Embedding::new(vec![1.0, 2.0, 2.0]);
        let json = serde_json::to_string(&emb).unwrap();
        let back: Embedding = serde_json::from_str(&json).unwrap();
        assert_eq!(back, emb);
    }
}
