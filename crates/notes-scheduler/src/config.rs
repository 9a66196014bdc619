//! Schedule configuration.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::timespec::TimeSpec;

const ELEVEN_PM: NaiveTime = match NaiveTime::from_hms_opt(23, 0, 0) {
    Some(t) => t,
    None => unreachable!(),
};

const SIX_PM: NaiveTime = match NaiveTime::from_hms_opt(18, 0, 0) {
    Some(t) => t,
    None => unreachable!(),
};

fn default_daily() -> TimeSpec {
    TimeSpec::Daily { time: ELEVEN_PM }
}

fn default_weekly() -> TimeSpec {
    TimeSpec::Weekly {
        weekday: Weekday::Sun,
        time: SIX_PM,
    }
}

/// When the recurring jobs fire. Specs are written as config strings:
/// `"23:00"`, `"Sun 18:00"`, or `"1 18:00"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Nightly maintenance (ingest, enrich, incremental index refresh).
    #[serde(default = "default_daily")]
    pub daily: TimeSpec,
    /// Weekly report generation.
    #[serde(default = "default_weekly")]
    pub weekly: TimeSpec,
    /// Optional weekly full index rebuild. Off unless configured.
    #[serde(default)]
    pub weekly_full: Option<TimeSpec>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily: default_daily(),
            weekly: default_weekly(),
            weekly_full: None,
        }
    }
}
