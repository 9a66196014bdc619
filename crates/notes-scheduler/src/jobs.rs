//! Scheduled job kinds and actions.
//!
//! The nightly maintenance job chains the external ingest and enrich
//! collaborators ahead of an `auto` index refresh; the weekly report job
//! delegates entirely to the external reporter; the optional weekly-full
//! job forces a full rebuild regardless of the dirty flag, as a safety net.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use notes_rebuild::{RebuildEngine, RebuildMode};

/// Error type carried out of job actions. Failures are logged by the
/// scheduler and never halt the loop.
pub type JobError = Box<dyn std::error::Error + Send + Sync>;

/// Kind of a scheduled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    NightlyMaintenance,
    WeeklyReport,
    WeeklyFullRebuild,
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::NightlyMaintenance => write!(f, "nightly-maintenance"),
            JobKind::WeeklyReport => write!(f, "weekly-report"),
            JobKind::WeeklyFullRebuild => write!(f, "weekly-full-rebuild"),
        }
    }
}

/// An executable job action.
#[async_trait]
pub trait JobAction: Send + Sync {
    async fn run(&self) -> Result<(), JobError>;
}

/// External collaborator: file ingestion and archiving of new notes.
#[async_trait]
pub trait Ingestor: Send + Sync {
    async fn ingest(&self) -> Result<(), JobError>;
}

/// External collaborator: metadata enrichment of ingested notes.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self) -> Result<(), JobError>;
}

/// External collaborator: periodic report generation.
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn generate(&self) -> Result<(), JobError>;
}

/// No-op ingestor for deployments where ingestion runs elsewhere.
pub struct NoopIngestor;

#[async_trait]
impl Ingestor for NoopIngestor {
    async fn ingest(&self) -> Result<(), JobError> {
        debug!("No ingestor configured; skipping");
        Ok(())
    }
}

/// No-op enricher.
pub struct NoopEnricher;

#[async_trait]
impl Enricher for NoopEnricher {
    async fn enrich(&self) -> Result<(), JobError> {
        debug!("No enricher configured; skipping");
        Ok(())
    }
}

/// No-op reporter.
pub struct NoopReporter;

#[async_trait]
impl Reporter for NoopReporter {
    async fn generate(&self) -> Result<(), JobError> {
        debug!("No reporter configured; skipping");
        Ok(())
    }
}

/// Nightly maintenance: ingest, enrich, then refresh the index with
/// mode `auto` (incremental add of missing vectors only).
pub struct MaintenanceJob {
    pub ingestor: Arc<dyn Ingestor>,
    pub enricher: Arc<dyn Enricher>,
    pub engine: Arc<RebuildEngine>,
}

#[async_trait]
impl JobAction for MaintenanceJob {
    async fn run(&self) -> Result<(), JobError> {
        self.ingestor.ingest().await?;
        self.enricher.enrich().await?;
        let outcome = self.engine.run(RebuildMode::Auto).await?;
        info!(
            appended = outcome.appended,
            indexed = outcome.indexed,
            "Nightly index refresh done"
        );
        Ok(())
    }
}

/// Weekly report generation, fully delegated to the external reporter.
pub struct ReportJob {
    pub reporter: Arc<dyn Reporter>,
}

#[async_trait]
impl JobAction for ReportJob {
    async fn run(&self) -> Result<(), JobError> {
        self.reporter.generate().await
    }
}

/// Optional weekly full rebuild: an explicit safety net that prunes stale
/// vectors and re-embeds everything, independent of the dirty flag.
pub struct FullRebuildJob {
    pub engine: Arc<RebuildEngine>,
}

#[async_trait]
impl JobAction for FullRebuildJob {
    async fn run(&self) -> Result<(), JobError> {
        let outcome = self.engine.run(RebuildMode::Full).await?;
        info!(
            indexed = outcome.indexed,
            pruned = outcome.pruned,
            "Weekly full rebuild done"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use notes_embeddings::HashingEmbedder;
    use notes_types::InMemoryRecordStore;
    use notes_vecstore::VecStore;

    fn engine(temp: &TempDir, store: Arc<InMemoryRecordStore>) -> Arc<RebuildEngine> {
        let vecstore = Arc::new(VecStore::open(temp.path().join("vecstore")).unwrap());
        Arc::new(RebuildEngine::new(
            store,
            Arc::new(HashingEmbedder::new(8)),
            vecstore,
        ))
    }

    #[test]
    fn test_job_kind_display() {
        assert_eq!(JobKind::NightlyMaintenance.to_string(), "nightly-maintenance");
        assert_eq!(JobKind::WeeklyReport.to_string(), "weekly-report");
        assert_eq!(JobKind::WeeklyFullRebuild.to_string(), "weekly-full-rebuild");
    }

    #[tokio::test]
    async fn test_maintenance_job_refreshes_index() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(InMemoryRecordStore::new());
        store.upsert("n1", "a note");
        let engine = engine(&temp, store.clone());

        let job = MaintenanceJob {
            ingestor: Arc::new(NoopIngestor),
            enricher: Arc::new(NoopEnricher),
            engine: engine.clone(),
        };
        job.run().await.unwrap();

        // The auto refresh indexed the note and left the flag alone
        assert!(!engine.dirty_flag().is_set());
    }

    #[tokio::test]
    async fn test_maintenance_job_stops_at_failing_collaborator() {
        struct FailingIngestor;

        #[async_trait]
        impl Ingestor for FailingIngestor {
            async fn ingest(&self) -> Result<(), JobError> {
                Err("watch directory missing".into())
            }
        }

        let temp = TempDir::new().unwrap();
        let store = Arc::new(InMemoryRecordStore::new());
        store.upsert("n1", "a note");
        let engine = engine(&temp, store);

        let job = MaintenanceJob {
            ingestor: Arc::new(FailingIngestor),
            enricher: Arc::new(NoopEnricher),
            engine,
        };
        let err = job.run().await.unwrap_err();
        assert!(err.to_string().contains("watch directory"));
    }

    #[tokio::test]
    async fn test_full_rebuild_job_clears_dirty_flag() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(InMemoryRecordStore::new());
        store.upsert("n1", "a note");
        let engine = engine(&temp, store);
        engine.dirty_flag().set().unwrap();

        let job = FullRebuildJob {
            engine: engine.clone(),
        };
        job.run().await.unwrap();
        assert!(!engine.dirty_flag().is_set());
    }

    #[tokio::test]
    async fn test_report_job_delegates() {
        let job = ReportJob {
            reporter: Arc::new(NoopReporter),
        };
        job.run().await.unwrap();
    }
}
