//! # notes-scheduler
//!
//! Timed maintenance scheduler for smartnotes.
//!
//! Each job carries a time specification (time-of-day, day-of-week + time,
//! or day-of-month + time) and an action. The scheduler computes the next
//! occurrence strictly after "now" with pure arithmetic over an injected
//! clock, sleeps until the earliest deadline, runs every due job
//! sequentially, and recomputes. Job failures are logged and never halt
//! the loop; graceful shutdown goes through a `CancellationToken`.

pub mod clock;
pub mod config;
pub mod error;
pub mod jobs;
pub mod scheduler;
pub mod timespec;

pub use clock::{Clock, SystemClock};
pub use config::ScheduleConfig;
pub use error::SchedulerError;
pub use jobs::{
    Enricher, FullRebuildJob, Ingestor, JobAction, JobError, JobKind, MaintenanceJob,
    NoopEnricher, NoopIngestor, NoopReporter, Reporter, ReportJob,
};
pub use scheduler::{JobState, Scheduler};
pub use timespec::TimeSpec;
