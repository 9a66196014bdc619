//! Scheduler error types.

use thiserror::Error;

/// Errors from scheduler setup and time-spec handling.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A time specification string could not be parsed.
    #[error("Invalid time spec: {0}")]
    InvalidTimeSpec(String),
}
