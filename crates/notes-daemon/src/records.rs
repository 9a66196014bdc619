//! Filesystem-backed record store.
//!
//! Notes are markdown or plain-text files under the configured notes
//! directory. The note id is the path relative to that directory, so ids
//! stay stable across edits. Hidden entries and the engine's own state
//! directory are skipped.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use notes_types::{NoteId, NoteMeta, RecordStore, StoreError};

use crate::config::STATE_DIR_NAME;

const NOTE_EXTENSIONS: [&str; 3] = ["md", "markdown", "txt"];

/// Reads notes directly from a directory tree.
pub struct FsRecordStore {
    root: PathBuf,
}

impl FsRecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn note_path(&self, id: &NoteId) -> PathBuf {
        self.root.join(id.as_str())
    }

    fn collect(&self, dir: &Path, out: &mut Vec<NoteMeta>) -> Result<(), StoreError> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') || name == STATE_DIR_NAME {
                continue;
            }
            if path.is_dir() {
                self.collect(&path, out)?;
                continue;
            }
            let is_note = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| NOTE_EXTENSIONS.contains(&ext));
            if !is_note {
                continue;
            }
            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Skipping unreadable note");
                    continue;
                }
            };
            let updated_at = entry
                .metadata()?
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            out.push(NoteMeta {
                id: NoteId::from(relative.to_string_lossy().to_string()),
                content_hash: content_hash(&text),
                updated_at,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FsRecordStore {
    async fn list_active(&self) -> Result<Vec<NoteMeta>, StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::Unavailable(format!(
                "notes directory not found: {}",
                self.root.display()
            )));
        }
        let mut notes = Vec::new();
        self.collect(&self.root, &mut notes)?;
        notes.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(notes)
    }

    async fn fetch_text(&self, id: &NoteId) -> Result<String, StoreError> {
        let path = self.note_path(id);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn content_hash(text: &str) -> String {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn write_note(root: &Path, name: &str, text: &str) {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }

    #[tokio::test]
    async fn test_lists_notes_recursively_sorted() {
        let temp = TempDir::new().unwrap();
        write_note(temp.path(), "b.md", "second");
        write_note(temp.path(), "a.md", "first");
        write_note(temp.path(), "projects/plan.txt", "third");

        let store = FsRecordStore::new(temp.path());
        let notes = store.list_active().await.unwrap();
        let ids: Vec<&str> = notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a.md", "b.md", "projects/plan.txt"]);
    }

    #[tokio::test]
    async fn test_skips_state_dir_hidden_and_foreign_files() {
        let temp = TempDir::new().unwrap();
        write_note(temp.path(), "a.md", "note");
        write_note(temp.path(), ".smartnotes/vecstore/index.json", "{}");
        write_note(temp.path(), ".hidden.md", "hidden");
        write_note(temp.path(), "image.png", "binary-ish");

        let store = FsRecordStore::new(temp.path());
        let notes = store.list_active().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id.as_str(), "a.md");
    }

    #[tokio::test]
    async fn test_fetch_text_and_not_found() {
        let temp = TempDir::new().unwrap();
        write_note(temp.path(), "a.md", "hello");

        let store = FsRecordStore::new(temp.path());
        let text = store.fetch_text(&NoteId::from("a.md")).await.unwrap();
        assert_eq!(text, "hello");

        let err = store.fetch_text(&NoteId::from("gone.md")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_root_is_unavailable() {
        let store = FsRecordStore::new("/nonexistent/notes/dir");
        let err = store.list_active().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_content_hash_tracks_edits() {
        let temp = TempDir::new().unwrap();
        write_note(temp.path(), "a.md", "before");
        let store = FsRecordStore::new(temp.path());
        let first = store.list_active().await.unwrap()[0].content_hash.clone();

        write_note(temp.path(), "a.md", "after");
        let second = store.list_active().await.unwrap()[0].content_hash.clone();
        assert_ne!(first, second);
    }
}
