//! Rebuild engine error types.

use notes_types::{NoteId, StoreError};
use notes_vecstore::VecStoreError;
use thiserror::Error;

/// One or more notes could not be embedded.
///
/// The batch was aborted without mutating the index or the dirty flag;
/// the listed ids are retried on the next invocation.
#[derive(Debug, Error)]
#[error("Embedding failed for {} note(s): {}", .failed.len(), display_ids(.failed))]
pub struct PartialEmbeddingError {
    /// Ids whose embedding calls failed.
    pub failed: Vec<NoteId>,
}

fn display_ids(ids: &[NoteId]) -> String {
    ids.iter()
        .map(NoteId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors from a rebuild invocation.
///
/// All variants are surfaced to the caller with the index unchanged.
#[derive(Debug, Error)]
pub enum RebuildError {
    /// Embedding provider failed for one or more notes (retryable).
    #[error(transparent)]
    Provider(#[from] PartialEmbeddingError),

    /// Record store read failed; the whole attempt was aborted.
    #[error("Record store read failed: {0}")]
    Store(#[from] StoreError),

    /// Vector store rejected the mutation (conflict, publish failure, IO).
    #[error(transparent)]
    VecStore(#[from] VecStoreError),
}
