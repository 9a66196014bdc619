//! Embedding error types.

use thiserror::Error;

/// Errors from an embedding provider.
///
/// Provider failures are retryable from the caller's point of view: the
/// index is never mutated on the failing path.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The provider failed to produce a vector for the given text.
    #[error("Embedding failed: {0}")]
    Provider(String),

    /// The provider produced a vector of an unexpected dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
