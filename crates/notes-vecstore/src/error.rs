//! Vector store error types.

use notes_types::NoteId;
use thiserror::Error;

/// Errors that can occur during vector store operations.
#[derive(Debug, Error)]
pub enum VecStoreError {
    /// Append attempted for a note id already present in the manifest.
    /// Callers must pre-filter through `diff_against`.
    #[error("Conflict: note already indexed: {0}")]
    Conflict(NoteId),

    /// Vector dimension does not match the index.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Vector produced by a different model than the index holds.
    #[error("Model mismatch: index holds '{expected}', got '{actual}'")]
    ModelMismatch { expected: String, actual: String },

    /// Staging succeeded but the atomic swap into the live path failed.
    /// The previous index remains authoritative.
    #[error("Publish failed: {0}")]
    Publish(String),

    /// IO error while reading or staging index data.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Index snapshot could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}
