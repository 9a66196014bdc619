//! Deterministic byte-bucket embedder.
//!
//! Folds the UTF-8 bytes of the input into a fixed number of buckets and
//! normalizes. Not semantically meaningful, but deterministic, offline, and
//! dimension-correct, which is everything the index engine's contracts need.
//! Production deployments substitute a sentence-transformer provider behind
//! the same trait.

use tracing::debug;

use crate::error::EmbeddingError;
use crate::provider::{Embedding, EmbeddingProvider};

/// Default vector dimension for the hashing embedder.
pub const DEFAULT_DIMENSION: usize = 64;

/// Local, deterministic embedding provider.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    model_version: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            model_version: format!("hashing-v1-d{}", dimension),
        }
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn model_version(&self) -> &str {
        &self.model_version
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut values = vec![0.0f32; self.dimension];
        for (i, byte) in text.bytes().enumerate() {
            values[i % self.dimension] += byte as f32;
        }
        debug!(len = text.len(), dim = self.dimension, "Embedded text");
        Ok(Embedding::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let embedder = HashingEmbedder::new(8);
        let a = embedder.embed("first test note").unwrap();
        let b = embedder.embed("first test note").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_dimension_and_unit_norm() {
        let embedder = HashingEmbedder::new(8);
        let emb = embedder.embed("some note body").unwrap();
        assert_eq!(emb.dimension(), 8);

        let norm: f32 = emb.values.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_similar_texts_score_higher_than_disjoint() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("walking in the park today").unwrap();
        let b = embedder.embed("walking in the park yesterday").unwrap();
        let c = embedder.embed("zzzz 0#!").unwrap();

        assert!(a.cosine_similarity(&b) > a.cosine_similarity(&c));
    }

    #[test]
    fn test_batch_matches_single() {
        let embedder = HashingEmbedder::new(16);
        let batch = embedder.embed_batch(&["one", "two"]).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], embedder.embed("one").unwrap());
        assert_eq!(batch[1], embedder.embed("two").unwrap());
    }

    #[test]
    fn test_model_version_encodes_dimension() {
        let embedder = HashingEmbedder::new(32);
        assert_eq!(embedder.model_version(), "hashing-v1-d32");
    }
}
