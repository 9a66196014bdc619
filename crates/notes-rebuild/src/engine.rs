//! The rebuild policy engine.
//!
//! Owns the decision between incremental add and full rebuild, the
//! embed-then-mutate pipeline, and the ordering contract around the dirty
//! flag: the flag is cleared only after `replace_all` has published. A
//! crash between publish and clear leaves the flag set, so the next
//! if-dirty run redoes the full rebuild (idempotent, not harmful).

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use notes_embeddings::EmbeddingProvider;
use notes_types::{NoteId, RecordStore};
use notes_vecstore::{DirtyFlag, VecStore, VectorRecord};

use crate::error::{PartialEmbeddingError, RebuildError};

/// Requested rebuild mode, as exposed on the external command surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebuildMode {
    /// Incremental add of missing ids only; never consults the dirty flag.
    #[default]
    Auto,
    /// Full rebuild when the dirty flag is set, incremental add otherwise.
    IfDirty,
    /// Unconditional full rebuild.
    Full,
}

impl FromStr for RebuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(RebuildMode::Auto),
            "if-dirty" => Ok(RebuildMode::IfDirty),
            "full" => Ok(RebuildMode::Full),
            other => Err(format!(
                "unknown rebuild mode '{other}' (expected auto, if-dirty, or full)"
            )),
        }
    }
}

impl std::fmt::Display for RebuildMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RebuildMode::Auto => write!(f, "auto"),
            RebuildMode::IfDirty => write!(f, "if-dirty"),
            RebuildMode::Full => write!(f, "full"),
        }
    }
}

/// Action the policy actually took for a given run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildAction {
    Incremental,
    FullRebuild,
}

impl std::fmt::Display for RebuildAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RebuildAction::Incremental => write!(f, "incremental"),
            RebuildAction::FullRebuild => write!(f, "full"),
        }
    }
}

/// Result of a successful rebuild invocation.
#[derive(Debug, Clone)]
pub struct RebuildOutcome {
    /// What the decision table resolved to.
    pub action: RebuildAction,
    /// Total vectors in the manifest after the run.
    pub indexed: usize,
    /// Vectors appended by this run (incremental only).
    pub appended: usize,
    /// Stale ids dropped by this run (full rebuild only).
    pub pruned: usize,
    /// Index dimension after the run (0 when the index is empty).
    pub dimension: usize,
}

/// Rebuild policy engine.
///
/// One instance serializes all rebuild invocations (manual and scheduled)
/// through an internal lock, so two full rebuilds can never race to
/// publish. Embedding runs outside any index lock; only the final publish
/// inside the vector store is a brief atomic operation.
pub struct RebuildEngine {
    records: Arc<dyn RecordStore>,
    provider: Arc<dyn EmbeddingProvider>,
    vecstore: Arc<VecStore>,
    dirty: DirtyFlag,
    gate: Mutex<()>,
}

impl RebuildEngine {
    pub fn new(
        records: Arc<dyn RecordStore>,
        provider: Arc<dyn EmbeddingProvider>,
        vecstore: Arc<VecStore>,
    ) -> Self {
        let dirty = DirtyFlag::new(vecstore.root());
        Self {
            records,
            provider,
            vecstore,
            dirty,
            gate: Mutex::new(()),
        }
    }

    /// The dirty flag this engine consumes. The external record-update
    /// path sets it through this handle; nothing else may clear it.
    pub fn dirty_flag(&self) -> &DirtyFlag {
        &self.dirty
    }

    /// Run one rebuild invocation under the given mode.
    ///
    /// Holds the engine's exclusion lock for the whole run; concurrent
    /// invocations queue up and see the post-run state.
    pub async fn run(&self, mode: RebuildMode) -> Result<RebuildOutcome, RebuildError> {
        let _guard = self.gate.lock().await;

        let full = match mode {
            RebuildMode::Full => true,
            RebuildMode::IfDirty => self.dirty.is_set(),
            RebuildMode::Auto => false,
        };
        debug!(%mode, full, dirty = self.dirty.is_set(), "Rebuild decision");

        if full {
            self.full_rebuild().await
        } else {
            self.incremental_add().await
        }
    }

    /// Embed and append only the notes missing from the manifest.
    /// The dirty flag is not consulted and not changed.
    async fn incremental_add(&self) -> Result<RebuildOutcome, RebuildError> {
        let active = self.active_ids().await?;
        let diff = self.vecstore.diff_against(&active);

        if diff.missing.is_empty() {
            debug!("Index already covers the active set; nothing to append");
            return Ok(self.outcome(RebuildAction::Incremental, 0, 0));
        }

        let records = self.embed_notes(&diff.missing).await?;
        let appended = self.vecstore.append(records)?;

        info!(appended, total = self.vecstore.len(), "Incremental add complete");
        Ok(self.outcome(RebuildAction::Incremental, appended, 0))
    }

    /// Embed every active note and swap the index in one atomic publish.
    /// Stale ids vanish with the old manifest; the dirty flag is cleared
    /// only after the publish succeeded.
    async fn full_rebuild(&self) -> Result<RebuildOutcome, RebuildError> {
        let active = self.active_ids().await?;
        let pruned = self.vecstore.diff_against(&active).stale.len();

        let records = self.embed_notes(&active).await?;
        let indexed = self.vecstore.replace_all(records)?;

        // Ordering contract: publish first, clear second.
        self.dirty.clear()?;

        info!(indexed, pruned, "Full rebuild complete");
        Ok(self.outcome(RebuildAction::FullRebuild, 0, pruned).with_indexed(indexed))
    }

    async fn active_ids(&self) -> Result<BTreeSet<NoteId>, RebuildError> {
        let active = self.records.list_active().await?;
        Ok(active.into_iter().map(|meta| meta.id).collect())
    }

    /// Fetch and embed the given notes. All-or-nothing: any per-note
    /// provider failure aborts the batch with the failed ids listed, and a
    /// store read failure aborts immediately. No index mutation happens on
    /// either path.
    async fn embed_notes(
        &self,
        ids: &BTreeSet<NoteId>,
    ) -> Result<Vec<VectorRecord>, RebuildError> {
        let mut records = Vec::with_capacity(ids.len());
        let mut failed = Vec::new();

        for id in ids {
            let text = self.records.fetch_text(id).await?;
            match self.provider.embed(&text) {
                Ok(embedding) => records.push(VectorRecord::new(
                    id.clone(),
                    embedding,
                    self.provider.model_version(),
                )),
                Err(e) => {
                    warn!(note = %id, error = %e, "Embedding failed");
                    failed.push(id.clone());
                }
            }
        }

        if !failed.is_empty() {
            return Err(PartialEmbeddingError { failed }.into());
        }
        Ok(records)
    }

    fn outcome(&self, action: RebuildAction, appended: usize, pruned: usize) -> RebuildOutcome {
        let stats = self.vecstore.stats();
        RebuildOutcome {
            action,
            indexed: stats.vector_count,
            appended,
            pruned,
            dimension: stats.dimension,
        }
    }
}

impl RebuildOutcome {
    fn with_indexed(mut self, indexed: usize) -> Self {
        self.indexed = indexed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use notes_embeddings::{Embedding, EmbeddingError, HashingEmbedder};
    use notes_types::{InMemoryRecordStore, NoteMeta, StoreError};

    const DIM: usize = 8;

    struct Fixture {
        _temp: TempDir,
        store: Arc<InMemoryRecordStore>,
        vecstore: Arc<VecStore>,
        engine: RebuildEngine,
    }

    fn fixture() -> Fixture {
        fixture_with_provider(Arc::new(HashingEmbedder::new(DIM)))
    }

    fn fixture_with_provider(provider: Arc<dyn EmbeddingProvider>) -> Fixture {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(InMemoryRecordStore::new());
        let vecstore = Arc::new(VecStore::open(temp.path().join("vecstore")).unwrap());
        let engine = RebuildEngine::new(store.clone(), provider, vecstore.clone());
        Fixture {
            _temp: temp,
            store,
            vecstore,
            engine,
        }
    }

    fn manifest_ids(vecstore: &VecStore) -> Vec<String> {
        let mut ids: Vec<String> = vecstore
            .manifest()
            .ids()
            .iter()
            .map(|id| id.to_string())
            .collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_auto_appends_only_missing() {
        let fx = fixture();
        fx.store.upsert("1", "note one");
        fx.store.upsert("2", "note two");

        // First run indexes both
        let outcome = fx.engine.run(RebuildMode::Auto).await.unwrap();
        assert_eq!(outcome.action, RebuildAction::Incremental);
        assert_eq!(outcome.appended, 2);
        assert_eq!(outcome.indexed, 2);
        assert_eq!(outcome.dimension, DIM);

        // Note 3 arrives; only it gets embedded
        fx.store.upsert("3", "note three");
        let outcome = fx.engine.run(RebuildMode::Auto).await.unwrap();
        assert_eq!(outcome.appended, 1);
        assert_eq!(manifest_ids(&fx.vecstore), vec!["1", "2", "3"]);

        // Dirty flag untouched throughout
        assert!(!fx.engine.dirty_flag().is_set());
    }

    #[tokio::test]
    async fn test_auto_is_idempotent() {
        let fx = fixture();
        fx.store.upsert("1", "alpha");
        fx.store.upsert("2", "beta");

        fx.engine.run(RebuildMode::Auto).await.unwrap();
        let second = fx.engine.run(RebuildMode::Auto).await.unwrap();

        assert_eq!(second.appended, 0);
        assert_eq!(second.indexed, 2);
    }

    #[tokio::test]
    async fn test_auto_leaves_dirty_flag_set() {
        let fx = fixture();
        fx.store.upsert("1", "original");
        fx.engine.run(RebuildMode::Auto).await.unwrap();

        // An edit marks the index dirty (external record-update path)
        fx.store.upsert("1", "edited");
        fx.engine.dirty_flag().set().unwrap();

        let outcome = fx.engine.run(RebuildMode::Auto).await.unwrap();
        assert_eq!(outcome.action, RebuildAction::Incremental);
        assert!(fx.engine.dirty_flag().is_set());
    }

    #[tokio::test]
    async fn test_if_dirty_rebuilds_and_clears_then_goes_incremental() {
        let fx = fixture();
        fx.store.upsert("1", "one");
        fx.store.upsert("2", "two");
        fx.engine.run(RebuildMode::Auto).await.unwrap();

        fx.engine.dirty_flag().set().unwrap();

        // Flag set: full rebuild, flag cleared
        let outcome = fx.engine.run(RebuildMode::IfDirty).await.unwrap();
        assert_eq!(outcome.action, RebuildAction::FullRebuild);
        assert!(!fx.engine.dirty_flag().is_set());

        // Flag clear: back to incremental
        fx.store.upsert("3", "three");
        let outcome = fx.engine.run(RebuildMode::IfDirty).await.unwrap();
        assert_eq!(outcome.action, RebuildAction::Incremental);
        assert_eq!(outcome.appended, 1);
    }

    #[tokio::test]
    async fn test_if_dirty_prunes_removed_notes() {
        let fx = fixture();
        fx.store.upsert("1", "one");
        fx.store.upsert("2", "two");
        fx.store.upsert("3", "three");
        fx.engine.run(RebuildMode::Auto).await.unwrap();

        // 3 removed, 4 added, flag set
        fx.store.archive(&NoteId::from("3"));
        fx.store.upsert("4", "four");
        fx.engine.dirty_flag().set().unwrap();

        let outcome = fx.engine.run(RebuildMode::IfDirty).await.unwrap();
        assert_eq!(outcome.action, RebuildAction::FullRebuild);
        assert_eq!(outcome.pruned, 1);
        assert_eq!(manifest_ids(&fx.vecstore), vec!["1", "2", "4"]);
        assert!(!fx.engine.dirty_flag().is_set());
    }

    #[tokio::test]
    async fn test_full_prunes_archived_note() {
        let fx = fixture();
        fx.store.upsert("a", "note a");
        fx.store.upsert("b", "note b");
        fx.store.upsert("c", "note c");
        fx.engine.run(RebuildMode::Full).await.unwrap();
        assert_eq!(fx.vecstore.len(), 3);

        fx.store.archive(&NoteId::from("c"));
        let outcome = fx.engine.run(RebuildMode::Full).await.unwrap();

        assert_eq!(outcome.pruned, 1);
        assert_eq!(manifest_ids(&fx.vecstore), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_full_clears_dirty_flag() {
        let fx = fixture();
        fx.store.upsert("1", "one");
        fx.engine.dirty_flag().set().unwrap();

        fx.engine.run(RebuildMode::Full).await.unwrap();
        assert!(!fx.engine.dirty_flag().is_set());
    }

    /// Provider that fails on any text containing "poison".
    struct PoisonProvider {
        inner: HashingEmbedder,
    }

    impl EmbeddingProvider for PoisonProvider {
        fn model_version(&self) -> &str {
            self.inner.model_version()
        }
        fn dimension(&self) -> usize {
            self.inner.dimension()
        }
        fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
            if text.contains("poison") {
                return Err(EmbeddingError::Provider("poisoned input".to_string()));
            }
            self.inner.embed(text)
        }
    }

    #[tokio::test]
    async fn test_partial_embedding_failure_mutates_nothing() {
        let fx = fixture_with_provider(Arc::new(PoisonProvider {
            inner: HashingEmbedder::new(DIM),
        }));
        fx.store.upsert("good", "fine text");
        fx.store.upsert("bad", "poison text");
        fx.engine.dirty_flag().set().unwrap();

        let err = fx.engine.run(RebuildMode::Full).await.unwrap_err();
        match err {
            RebuildError::Provider(partial) => {
                assert_eq!(partial.failed, vec![NoteId::from("bad")]);
            }
            other => panic!("expected provider error, got {other}"),
        }

        // No index mutation, flag still set: the next run retries
        assert!(fx.vecstore.is_empty());
        assert!(fx.engine.dirty_flag().is_set());
    }

    /// Record store that always fails to list.
    struct DownStore;

    #[async_trait]
    impl notes_types::RecordStore for DownStore {
        async fn list_active(&self) -> Result<Vec<NoteMeta>, StoreError> {
            Err(StoreError::Unavailable("down for maintenance".to_string()))
        }
        async fn fetch_text(&self, id: &NoteId) -> Result<String, StoreError> {
            Err(StoreError::NotFound(id.clone()))
        }
    }

    #[tokio::test]
    async fn test_store_read_failure_aborts_whole_attempt() {
        let temp = TempDir::new().unwrap();
        let vecstore = Arc::new(VecStore::open(temp.path().join("vecstore")).unwrap());
        let engine = RebuildEngine::new(
            Arc::new(DownStore),
            Arc::new(HashingEmbedder::new(DIM)),
            vecstore.clone(),
        );
        engine.dirty_flag().set().unwrap();

        let err = engine.run(RebuildMode::IfDirty).await.unwrap_err();
        assert!(matches!(err, RebuildError::Store(_)));
        assert!(vecstore.is_empty());
        assert!(engine.dirty_flag().is_set());
    }

    #[tokio::test]
    async fn test_concurrent_invocations_serialize() {
        let fx = fixture();
        fx.store.upsert("1", "one");
        fx.store.upsert("2", "two");

        // Two racing auto runs: the exclusion lock serializes them, so the
        // second sees an up-to-date manifest and appends nothing instead of
        // conflicting.
        let (a, b) = tokio::join!(
            fx.engine.run(RebuildMode::Auto),
            fx.engine.run(RebuildMode::Auto)
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.appended + b.appended, 2);
        assert_eq!(fx.vecstore.len(), 2);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("auto".parse::<RebuildMode>().unwrap(), RebuildMode::Auto);
        assert_eq!(
            "if-dirty".parse::<RebuildMode>().unwrap(),
            RebuildMode::IfDirty
        );
        assert_eq!("full".parse::<RebuildMode>().unwrap(), RebuildMode::Full);
        assert!("nightly".parse::<RebuildMode>().is_err());
    }

    #[test]
    fn test_mode_display_roundtrip() {
        for mode in [RebuildMode::Auto, RebuildMode::IfDirty, RebuildMode::Full] {
            assert_eq!(mode.to_string().parse::<RebuildMode>().unwrap(), mode);
        }
    }
}
