//! The vector store: manifest + vectors as one atomically-published unit.
//!
//! On disk the published index is a single snapshot file
//! (`vecstore/index.json`); mutations serialize the complete new snapshot
//! into `vecstore/staging/` first and promote it with one `rename`. In
//! memory the published snapshot sits behind an `Arc` that readers clone,
//! so a query holds no lock while scoring and never observes a
//! half-written index.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use notes_embeddings::Embedding;
use notes_types::NoteId;

use crate::error::VecStoreError;
use crate::manifest::{IndexManifest, ManifestDiff};
use crate::record::VectorRecord;

/// File name of the published index snapshot.
pub const INDEX_FILE: &str = "index.json";

/// Staging subdirectory used while building a new snapshot.
pub const STAGING_DIR: &str = "staging";

/// Complete index state: model identity plus all vector records.
///
/// The manifest is derived from record order, so manifest and vectors can
/// never disagree within one snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct IndexSnapshot {
    model_version: String,
    dimension: usize,
    records: Vec<VectorRecord>,
}

impl IndexSnapshot {
    fn manifest(&self) -> IndexManifest {
        IndexManifest::from_ids(self.records.iter().map(|r| r.note_id.clone()).collect())
    }
}

/// One search result from `query`.
#[derive(Debug, Clone)]
pub struct QueryHit {
    pub note_id: NoteId,
    /// Cosine similarity in [-1, 1]; higher is more similar.
    pub score: f32,
}

/// Index statistics for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    pub vector_count: usize,
    pub dimension: usize,
    pub model_version: String,
    pub size_bytes: u64,
}

/// On-disk vector index store.
///
/// `append` and `replace_all` are the only mutators and the sole writers of
/// the manifest. Reads (`query`, `manifest`, `diff_against`, `stats`) are
/// safe to call concurrently with an in-progress staging phase.
pub struct VecStore {
    root: PathBuf,
    published: RwLock<Arc<IndexSnapshot>>,
    // Serializes compute-stage-publish sequences so two writers cannot
    // race to publish divergent snapshots.
    write_gate: Mutex<()>,
}

impl VecStore {
    /// Open the store at `root`, loading the published snapshot if one
    /// exists. Leftover staging data from an interrupted rebuild is
    /// ignored; the live snapshot stays authoritative.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, VecStoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        let index_path = root.join(INDEX_FILE);
        let snapshot = if index_path.exists() {
            let bytes = fs::read(&index_path)?;
            let snapshot: IndexSnapshot = serde_json::from_slice(&bytes)
                .map_err(|e| VecStoreError::Serialization(e.to_string()))?;
            info!(
                path = ?index_path,
                vectors = snapshot.records.len(),
                model = %snapshot.model_version,
                "Opened vector store"
            );
            snapshot
        } else {
            info!(path = ?root, "Created empty vector store");
            IndexSnapshot::default()
        };

        Ok(Self {
            root,
            published: RwLock::new(Arc::new(snapshot)),
            write_gate: Mutex::new(()),
        })
    }

    /// Root directory of the store (also the maintenance directory that
    /// holds the dirty-flag marker).
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Current manifest of indexed note ids.
    pub fn manifest(&self) -> IndexManifest {
        self.snapshot().manifest()
    }

    /// Number of indexed vectors.
    pub fn len(&self) -> usize {
        self.snapshot().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Diff the manifest against the active note id set.
    pub fn diff_against(&self, active: &BTreeSet<NoteId>) -> ManifestDiff {
        self.manifest().diff_against(active)
    }

    /// Append vectors for notes not yet indexed.
    ///
    /// Fails with `Conflict` if any id is already in the manifest; callers
    /// pre-filter through `diff_against`. An empty batch is a no-op and
    /// performs no disk write. Returns the number of appended records.
    pub fn append(&self, records: Vec<VectorRecord>) -> Result<usize, VecStoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let _gate = self.write_gate.lock().unwrap_or_else(|e| e.into_inner());
        let current = self.snapshot();

        let manifest = current.manifest();
        for record in &records {
            if manifest.contains(&record.note_id) {
                return Err(VecStoreError::Conflict(record.note_id.clone()));
            }
        }
        validate_uniform(&records)?;
        if !current.records.is_empty() {
            check_compatible(&current, &records[0])?;
        }

        let appended = records.len();
        let mut next = IndexSnapshot {
            model_version: records[0].model_version.clone(),
            dimension: records[0].dimension(),
            records: current.records.clone(),
        };
        next.records.extend(records);

        self.publish(next)?;
        debug!(appended, total = self.len(), "Appended vectors");
        Ok(appended)
    }

    /// Replace the whole index with a freshly built one.
    ///
    /// The new snapshot is staged fully before the atomic swap; stale ids
    /// vanish with the old manifest. Returns the new vector count.
    pub fn replace_all(&self, records: Vec<VectorRecord>) -> Result<usize, VecStoreError> {
        let _gate = self.write_gate.lock().unwrap_or_else(|e| e.into_inner());

        validate_uniform(&records)?;
        let next = IndexSnapshot {
            model_version: records.first().map(|r| r.model_version.clone()).unwrap_or_default(),
            dimension: records.first().map(|r| r.dimension()).unwrap_or_default(),
            records,
        };

        let count = next.records.len();
        self.publish(next)?;
        info!(vectors = count, "Replaced vector index");
        Ok(count)
    }

    /// Top-k nearest note ids by cosine similarity, best first.
    ///
    /// Reads only the currently published snapshot; an in-progress
    /// `replace_all` staging phase is invisible here.
    pub fn query(&self, query: &Embedding, k: usize) -> Result<Vec<QueryHit>, VecStoreError> {
        let snapshot = self.snapshot();
        if snapshot.records.is_empty() {
            return Ok(Vec::new());
        }
        if query.dimension() != snapshot.dimension {
            return Err(VecStoreError::DimensionMismatch {
                expected: snapshot.dimension,
                actual: query.dimension(),
            });
        }

        let mut hits: Vec<QueryHit> = snapshot
            .records
            .iter()
            .map(|record| QueryHit {
                note_id: record.note_id.clone(),
                score: query.cosine_similarity(&record.embedding),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);

        debug!(k, found = hits.len(), "Query complete");
        Ok(hits)
    }

    /// Index statistics for diagnostics.
    pub fn stats(&self) -> IndexStats {
        let snapshot = self.snapshot();
        let size_bytes = fs::metadata(self.root.join(INDEX_FILE))
            .map(|m| m.len())
            .unwrap_or(0);
        IndexStats {
            vector_count: snapshot.records.len(),
            dimension: snapshot.dimension,
            model_version: snapshot.model_version.clone(),
            size_bytes,
        }
    }

    /// Stage the snapshot fully, promote it atomically, then swap the
    /// in-memory handle. Failure anywhere before the swap leaves the old
    /// index authoritative on disk and in memory.
    fn publish(&self, snapshot: IndexSnapshot) -> Result<(), VecStoreError> {
        let staging = self.root.join(STAGING_DIR);
        fs::create_dir_all(&staging)?;

        let staged_path = staging.join(INDEX_FILE);
        let bytes = serde_json::to_vec(&snapshot)
            .map_err(|e| VecStoreError::Serialization(e.to_string()))?;
        fs::write(&staged_path, bytes)?;

        fs::rename(&staged_path, self.root.join(INDEX_FILE))
            .map_err(|e| VecStoreError::Publish(e.to_string()))?;

        *self.published.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(snapshot);
        Ok(())
    }
}

/// All records of one batch must share dimension and model version.
fn validate_uniform(records: &[VectorRecord]) -> Result<(), VecStoreError> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    for record in records {
        if record.dimension() != first.dimension() {
            return Err(VecStoreError::DimensionMismatch {
                expected: first.dimension(),
                actual: record.dimension(),
            });
        }
        if record.model_version != first.model_version {
            return Err(VecStoreError::ModelMismatch {
                expected: first.model_version.clone(),
                actual: record.model_version.clone(),
            });
        }
    }
    Ok(())
}

/// Appended records must match the published index's model and dimension.
fn check_compatible(current: &IndexSnapshot, record: &VectorRecord) -> Result<(), VecStoreError> {
    if record.dimension() != current.dimension {
        return Err(VecStoreError::DimensionMismatch {
            expected: current.dimension,
            actual: record.dimension(),
        });
    }
    if record.model_version != current.model_version {
        return Err(VecStoreError::ModelMismatch {
            expected: current.model_version.clone(),
            actual: record.model_version.clone(),
        });
    }
    Ok(())
}
