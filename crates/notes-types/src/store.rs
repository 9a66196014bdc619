//! Record store read interface.
//!
//! The authoritative note table lives outside this system (SQLite in the
//! reference deployment). The index engine only needs two reads: list the
//! active notes with their content hashes, and fetch a note body by id.
//!
//! `InMemoryRecordStore` is a complete in-process implementation used by
//! tests and by the demo wiring in the daemon.

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;
use crate::note::{NoteId, NoteMeta};

/// Read-only view of the authoritative note table.
///
/// Implementations must be thread-safe; the rebuild engine and the search
/// executor share one instance.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List `(id, content_hash, updated_at)` for every active note.
    ///
    /// Archived and deleted notes are absent from this listing.
    async fn list_active(&self) -> Result<Vec<NoteMeta>, StoreError>;

    /// Fetch the body text of a note by id.
    async fn fetch_text(&self, id: &NoteId) -> Result<String, StoreError>;

    /// Fetch the metadata row for a single note, if it is active.
    async fn get_meta(&self, id: &NoteId) -> Result<Option<NoteMeta>, StoreError> {
        Ok(self
            .list_active()
            .await?
            .into_iter()
            .find(|meta| &meta.id == id))
    }
}

/// In-memory record store.
///
/// Supports the mutations the external record-update path would perform
/// (upsert, archive) so the index engine's behavior against a changing
/// active set can be exercised without a database.
#[derive(Default)]
pub struct InMemoryRecordStore {
    notes: RwLock<BTreeMap<NoteId, (NoteMeta, String)>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a note. Returns `true` when the note already
    /// existed and its content changed (the caller should set the dirty
    /// flag in that case, mirroring the external record-update path).
    pub fn upsert(&self, id: impl Into<NoteId>, text: impl Into<String>) -> bool {
        let id = id.into();
        let text = text.into();
        let hash = content_hash(&text);

        let mut notes = self.notes.write().unwrap_or_else(|e| e.into_inner());
        let changed = notes
            .get(&id)
            .is_some_and(|(meta, _)| meta.content_hash != hash);
        let meta = NoteMeta {
            id: id.clone(),
            content_hash: hash,
            updated_at: Utc::now(),
        };
        notes.insert(id, (meta, text));
        changed
    }

    /// Remove a note from the active set (archive/delete).
    pub fn archive(&self, id: &NoteId) -> bool {
        self.notes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.notes.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list_active(&self) -> Result<Vec<NoteMeta>, StoreError> {
        let notes = self.notes.read().unwrap_or_else(|e| e.into_inner());
        Ok(notes.values().map(|(meta, _)| meta.clone()).collect())
    }

    async fn fetch_text(&self, id: &NoteId) -> Result<String, StoreError> {
        let notes = self.notes.read().unwrap_or_else(|e| e.into_inner());
        notes
            .get(id)
            .map(|(_, text)| text.clone())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn get_meta(&self, id: &NoteId) -> Result<Option<NoteMeta>, StoreError> {
        let notes = self.notes.read().unwrap_or_else(|e| e.into_inner());
        Ok(notes.get(id).map(|(meta, _)| meta.clone()))
    }
}

/// Content hash for change detection.
fn content_hash(text: &str) -> String {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
