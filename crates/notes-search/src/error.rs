//! Search error types.

use thiserror::Error;

use notes_embeddings::EmbeddingError;
use notes_types::StoreError;
use notes_vecstore::VecStoreError;

/// Errors from executing a semantic query.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query text could not be embedded.
    #[error("Query embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// The vector index rejected or failed the query.
    #[error("Vector index error: {0}")]
    VecStore(#[from] VecStoreError),

    /// The record store failed while resolving hit metadata.
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_wraps_source() {
        let err = SearchError::from(EmbeddingError::Provider("model offline".to_string()));
        assert!(err.to_string().contains("model offline"));
    }
}
