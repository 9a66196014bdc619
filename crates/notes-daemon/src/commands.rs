//! Command implementations for the smartnotes binary.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use notes_embeddings::{EmbeddingProvider, HashingEmbedder};
use notes_rebuild::{RebuildAction, RebuildEngine, RebuildMode};
use notes_scheduler::{
    FullRebuildJob, JobKind, MaintenanceJob, NoopEnricher, NoopIngestor, NoopReporter, ReportJob,
    Scheduler, SystemClock,
};
use notes_search::SearchExecutor;
use notes_types::RecordStore;
use notes_vecstore::VecStore;

use crate::config::Settings;
use crate::error::DaemonError;
use crate::records::FsRecordStore;

struct Wiring {
    records: Arc<dyn RecordStore>,
    provider: Arc<dyn EmbeddingProvider>,
    vecstore: Arc<VecStore>,
}

fn wire(settings: &Settings) -> Result<Wiring> {
    let provider: Arc<dyn EmbeddingProvider> = if settings.vec_model.starts_with("hashing") {
        Arc::new(HashingEmbedder::new(settings.dimension))
    } else {
        return Err(DaemonError::UnknownModel(settings.vec_model.clone()).into());
    };
    let vecstore = VecStore::open(settings.vecstore_dir())
        .with_context(|| format!("Failed to open vector index at {:?}", settings.vecstore_dir()))?;
    Ok(Wiring {
        records: Arc::new(FsRecordStore::new(settings.notes_dir())),
        provider,
        vecstore: Arc::new(vecstore),
    })
}

/// Bring the vector index in line with the notes directory.
pub async fn handle_embed(settings: &Settings, mode: RebuildMode) -> Result<()> {
    let wiring = wire(settings)?;
    let engine = RebuildEngine::new(wiring.records, wiring.provider, wiring.vecstore);

    let outcome = engine
        .run(mode)
        .await
        .with_context(|| format!("Rebuild failed (mode {mode})"))?;

    let applied = match outcome.action {
        RebuildAction::Incremental => "incremental",
        RebuildAction::FullRebuild => "full rebuild",
    };
    println!(
        "{applied}: {} vectors indexed ({} appended, {} pruned, dimension {})",
        outcome.indexed, outcome.appended, outcome.pruned, outcome.dimension
    );
    Ok(())
}

/// Search the indexed notes and print ranked hits.
pub async fn handle_search(settings: &Settings, query: &str, top_k: usize) -> Result<()> {
    let wiring = wire(settings)?;
    let executor = SearchExecutor::new(wiring.records, wiring.provider, wiring.vecstore);

    let hits = executor
        .search(query, top_k)
        .await
        .context("Search failed")?;
    if hits.is_empty() {
        println!("No results. Is the index built? Try: smartnotes embed");
        return Ok(());
    }
    for (rank, hit) in hits.iter().enumerate() {
        let updated = hit
            .meta
            .as_ref()
            .map(|meta| meta.updated_at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "archived".to_string());
        println!(
            "{:>2}. {:.3}  {}  ({updated})",
            rank + 1,
            hit.score,
            hit.note_id
        );
    }
    Ok(())
}

/// Run the maintenance scheduler in the foreground until Ctrl-C.
pub async fn handle_schedule(settings: &Settings) -> Result<()> {
    let wiring = wire(settings)?;
    let engine = Arc::new(RebuildEngine::new(
        wiring.records,
        wiring.provider,
        wiring.vecstore,
    ));

    let times = &settings.report_times;
    let mut scheduler = Scheduler::new(Arc::new(SystemClock));
    scheduler.add_job(
        JobKind::NightlyMaintenance,
        times.daily,
        Arc::new(MaintenanceJob {
            ingestor: Arc::new(NoopIngestor),
            enricher: Arc::new(NoopEnricher),
            engine: engine.clone(),
        }),
    );
    scheduler.add_job(
        JobKind::WeeklyReport,
        times.weekly,
        Arc::new(ReportJob {
            reporter: Arc::new(NoopReporter),
        }),
    );
    if let Some(spec) = times.weekly_full {
        scheduler.add_job(JobKind::WeeklyFullRebuild, spec, Arc::new(FullRebuildJob { engine }));
    }

    let shutdown = CancellationToken::new();
    let loop_token = shutdown.clone();
    let handle = tokio::spawn(scheduler.run(loop_token));

    signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    info!("Ctrl-C received; stopping scheduler");
    shutdown.cancel();
    handle.await.context("Scheduler task panicked")?;
    Ok(())
}

/// Show configuration and index diagnostics.
pub async fn show_status(settings: &Settings) -> Result<()> {
    println!("smartnotes status");
    println!("  Notes dir:   {}", settings.notes_dir().display());
    println!("  State dir:   {}", settings.state_dir().display());
    println!("  Vec model:   {}", settings.vec_model);

    let notes_found = settings.notes_dir().is_dir();
    println!(
        "  Notes:       {}",
        if notes_found { "found" } else { "MISSING" }
    );

    match VecStore::open(settings.vecstore_dir()) {
        Ok(vecstore) => {
            let stats = vecstore.stats();
            println!(
                "  Index:       {} vectors, dimension {}, model {} ({} bytes)",
                stats.vector_count, stats.dimension, stats.model_version, stats.size_bytes
            );
            let dirty = engine_dirty(&vecstore);
            println!(
                "  Dirty flag:  {}",
                if dirty {
                    "SET (full rebuild pending)"
                } else {
                    "clear"
                }
            );
        }
        Err(err) => {
            warn!(error = %err, "Vector index unreadable");
            println!("  Index:       UNREADABLE ({err})");
        }
    }

    let times = &settings.report_times;
    println!("  Nightly:     {}", times.daily);
    println!("  Weekly:      {}", times.weekly);
    match &times.weekly_full {
        Some(spec) => println!("  Weekly full: {spec}"),
        None => println!("  Weekly full: off"),
    }
    Ok(())
}

fn engine_dirty(vecstore: &VecStore) -> bool {
    notes_vecstore::DirtyFlag::new(vecstore.root()).is_set()
}
