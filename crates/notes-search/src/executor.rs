//! Query execution over the published vector index.

use std::sync::Arc;

use tracing::debug;

use notes_embeddings::EmbeddingProvider;
use notes_types::{NoteId, NoteMeta, RecordStore};
use notes_vecstore::VecStore;

use crate::error::SearchError;

/// Default number of hits returned when the caller does not specify.
pub const DEFAULT_TOP_K: usize = 5;

/// A search result with metadata resolved from the record store.
///
/// `meta` is `None` when the hit's note has been archived since the index
/// was last rebuilt. Such hits still surface; the caller decides whether
/// to display them.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub note_id: NoteId,
    /// Cosine similarity in [-1, 1]; higher is more similar.
    pub score: f32,
    pub meta: Option<NoteMeta>,
}

/// Embeds query text and scans the published index snapshot.
///
/// Queries never touch the write path: the store hands back an immutable
/// snapshot, so searches keep working mid-rebuild and switch to the new
/// index only once it is published.
pub struct SearchExecutor {
    records: Arc<dyn RecordStore>,
    provider: Arc<dyn EmbeddingProvider>,
    vecstore: Arc<VecStore>,
}

impl SearchExecutor {
    pub fn new(
        records: Arc<dyn RecordStore>,
        provider: Arc<dyn EmbeddingProvider>,
        vecstore: Arc<VecStore>,
    ) -> Self {
        Self {
            records,
            provider,
            vecstore,
        }
    }

    /// Run a semantic query, returning up to `k` hits ordered by
    /// descending similarity. An empty index yields an empty list.
    ///
    /// # Errors
    ///
    /// Fails if the query cannot be embedded, if its dimension does not
    /// match the index, or if the record store errors during metadata
    /// resolution.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, SearchError> {
        let embedding = self.provider.embed(query)?;
        let hits = self.vecstore.query(&embedding, k)?;
        debug!(hits = hits.len(), k, "Query executed");

        let mut results = Vec::with_capacity(hits.len());
        for hit in hits {
            let meta = self.records.get_meta(&hit.note_id).await?;
            results.push(SearchHit {
                note_id: hit.note_id,
                score: hit.score,
                meta,
            });
        }
        Ok(results)
    }
}
