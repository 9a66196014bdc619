//! Clock abstraction.
//!
//! Next-occurrence arithmetic is pure over a `NaiveDateTime`, so tests
//! drive the scheduler with a fixed clock instead of real wall-clock
//! waits. Production uses the machine's local time, matching how the
//! configured times of day are meant to be read.

use chrono::{Local, NaiveDateTime};

/// Source of "now" for scheduling decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
