//! Note identity and record metadata.
//!
//! A `NoteId` identifies a logical note across its whole lifetime: edits
//! change the content hash and timestamp, never the id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier for a logical note.
///
/// Derived from the note's path or content at ingest time by the (external)
/// ingestion pipeline. Treated as opaque here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NoteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NoteId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata row for an active note, as exposed by the record store
/// listing interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteMeta {
    /// Stable note identifier.
    pub id: NoteId,
    /// Hash of the note body; changes on every edit.
    pub content_hash: String,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl NoteMeta {
    pub fn new(id: impl Into<NoteId>, content_hash: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content_hash: content_hash.into(),
            updated_at: Utc::now(),
        }
    }
}

impl From<&str> for NoteMeta {
    fn from(id: &str) -> Self {
        Self::new(NoteId::from(id), "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_id_display_roundtrip() {
        let id = NoteId::from("2024-03-10-morning-pages");
        assert_eq!(id.to_string(), "2024-03-10-morning-pages");
        assert_eq!(id.as_str(), "2024-03-10-morning-pages");
    }

    #[test]
    fn test_note_id_serde_transparent() {
        let id = NoteId::from("abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: NoteId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_note_meta_new() {
        let meta = NoteMeta::new("n1", "hash-1");
        assert_eq!(meta.id.as_str(), "n1");
        assert_eq!(meta.content_hash, "hash-1");
    }
}
