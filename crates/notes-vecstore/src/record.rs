//! Vector record: one embedded note.

use notes_embeddings::Embedding;
use notes_types::NoteId;
use serde::{Deserialize, Serialize};

/// A single indexed vector.
///
/// For a note id present in the index, exactly one current record exists.
/// Dimension and model version are uniform across all records of one index
/// instance; the store enforces both on every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Stable note identifier this vector belongs to.
    pub note_id: NoteId,
    /// The embedding, unit-normalized.
    pub embedding: Embedding,
    /// Identifier of the model that produced the embedding.
    pub model_version: String,
}

impl VectorRecord {
    pub fn new(
        note_id: impl Into<NoteId>,
        embedding: Embedding,
        model_version: impl Into<String>,
    ) -> Self {
        Self {
            note_id: note_id.into(),
            embedding,
            model_version: model_version.into(),
        }
    }

    /// Dimension of the stored embedding.
    pub fn dimension(&self) -> usize {
        self.embedding.dimension()
    }
}
