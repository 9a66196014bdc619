//! The scheduling loop.
//!
//! Each registered job tracks its own next fire time, computed with pure
//! arithmetic from its time spec and the injected clock. `tick` runs every
//! job whose deadline has passed; `run` sleeps until the earliest deadline
//! and ticks, until cancelled. Tests drive `tick` directly with a fixed
//! clock and never wait on real time.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::jobs::{JobAction, JobKind};
use crate::timespec::TimeSpec;

/// Lifecycle state of a scheduled job.
///
/// Idle until its fire time passes, Due once it has, Running while the
/// action executes, then back to Idle with a freshly computed fire time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Due,
    Running,
}

struct JobSlot {
    kind: JobKind,
    spec: TimeSpec,
    action: Arc<dyn JobAction>,
    next_fire: NaiveDateTime,
    state: JobState,
}

/// Runs registered jobs at their configured times.
pub struct Scheduler {
    clock: Arc<dyn Clock>,
    jobs: Vec<JobSlot>,
}

impl Scheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            jobs: Vec::new(),
        }
    }

    /// Register a job. Its first fire time is the spec's next occurrence
    /// strictly after the current clock reading.
    pub fn add_job(&mut self, kind: JobKind, spec: TimeSpec, action: Arc<dyn JobAction>) {
        let next_fire = spec.next_occurrence(self.clock.now());
        info!(job = %kind, spec = %spec, next = %next_fire, "Job scheduled");
        self.jobs.push(JobSlot {
            kind,
            spec,
            action,
            next_fire,
            state: JobState::Idle,
        });
    }

    /// Earliest upcoming fire time across all jobs, if any are registered.
    pub fn next_deadline(&self) -> Option<NaiveDateTime> {
        self.jobs.iter().map(|job| job.next_fire).min()
    }

    /// Snapshot of each job's kind, state, and next fire time.
    pub fn job_states(&self) -> Vec<(JobKind, JobState, NaiveDateTime)> {
        self.jobs
            .iter()
            .map(|job| (job.kind, job.state, job.next_fire))
            .collect()
    }

    /// Run every job whose fire time has passed, in registration order.
    /// Returns the number of jobs that fired. A failing job is logged and
    /// rescheduled like any other.
    pub async fn tick(&mut self) -> usize {
        let now = self.clock.now();
        for job in &mut self.jobs {
            if job.state == JobState::Idle && job.next_fire <= now {
                job.state = JobState::Due;
            }
        }

        let mut fired = 0;
        for i in 0..self.jobs.len() {
            if self.jobs[i].state != JobState::Due {
                continue;
            }
            let kind = self.jobs[i].kind;
            let action = Arc::clone(&self.jobs[i].action);
            self.jobs[i].state = JobState::Running;
            debug!(job = %kind, "Job starting");
            match action.run().await {
                Ok(()) => info!(job = %kind, "Job finished"),
                Err(err) => warn!(job = %kind, error = %err, "Job failed"),
            }
            // Reschedule from the clock after the run, not from the old
            // deadline, so a long run never queues a burst of catch-up fires.
            let slot = &mut self.jobs[i];
            slot.state = JobState::Idle;
            slot.next_fire = slot.spec.next_occurrence(self.clock.now());
            fired += 1;
        }
        fired
    }

    /// Sleep-and-tick until the token is cancelled.
    pub async fn run(mut self, shutdown: CancellationToken) {
        if self.jobs.is_empty() {
            warn!("No jobs registered; scheduler idling until shutdown");
            shutdown.cancelled().await;
            return;
        }
        info!(jobs = self.jobs.len(), "Scheduler started");
        loop {
            let wait = match self.next_deadline() {
                Some(deadline) => (deadline - self.clock.now())
                    .to_std()
                    .unwrap_or(Duration::ZERO),
                None => Duration::from_secs(60),
            };
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Scheduler shutting down");
                    return;
                }
                _ = tokio::time::sleep(wait) => {
                    self.tick().await;
                }
            }
        }
    }
}
