//! Recurring time specifications and next-occurrence arithmetic.
//!
//! Three recurrence shapes, written the way the config file spells them:
//!
//! - `"23:00"`: daily at a time of day
//! - `"Sun 18:00"`: weekly on a weekday at a time of day
//! - `"1 18:00"`: monthly on a day of month at a time of day
//!
//! `next_occurrence` is pure: given "after", it returns the first matching
//! instant strictly later, so the scheduler never double-fires on the
//! boundary. Monthly specs skip months that lack the requested day.

use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDateTime, NaiveTime, Weekday};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SchedulerError;

/// A recurring fire-time specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpec {
    /// Every day at the given time.
    Daily { time: NaiveTime },
    /// Every week on the given weekday at the given time.
    Weekly { weekday: Weekday, time: NaiveTime },
    /// Every month on the given day (1-31) at the given time.
    /// Months without that day are skipped.
    Monthly { day: u32, time: NaiveTime },
}

impl TimeSpec {
    /// First occurrence strictly after `after`.
    pub fn next_occurrence(&self, after: NaiveDateTime) -> NaiveDateTime {
        match *self {
            TimeSpec::Daily { time } => {
                let candidate = after.date().and_time(time);
                if candidate > after {
                    candidate
                } else {
                    (after.date() + Days::new(1)).and_time(time)
                }
            }
            TimeSpec::Weekly { weekday, time } => {
                let today = after.date().weekday().num_days_from_monday();
                let target = weekday.num_days_from_monday();
                let ahead = (target + 7 - today) % 7;
                let candidate = (after.date() + Days::new(ahead as u64)).and_time(time);
                if candidate > after {
                    candidate
                } else {
                    candidate + Days::new(7)
                }
            }
            TimeSpec::Monthly { day, time } => {
                let mut year = after.year();
                let mut month = after.month();
                // Day 29-31 can skip several months in a row; a 4-year
                // horizon always contains a Feb 29.
                for _ in 0..48 {
                    if let Some(date) = chrono::NaiveDate::from_ymd_opt(year, month, day) {
                        let candidate = date.and_time(time);
                        if candidate > after {
                            return candidate;
                        }
                    }
                    month += 1;
                    if month > 12 {
                        month = 1;
                        year += 1;
                    }
                }
                unreachable!("a valid day-of-month occurs within 48 months");
            }
        }
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, SchedulerError> {
    let invalid = || SchedulerError::InvalidTimeSpec(s.to_string());
    let (h, m) = s.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = h.parse().map_err(|_| invalid())?;
    let minute: u32 = m.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

impl FromStr for TimeSpec {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [time] => Ok(TimeSpec::Daily {
                time: parse_time(time)?,
            }),
            [lead, time] => {
                let time = parse_time(time)?;
                if let Ok(weekday) = lead.parse::<Weekday>() {
                    return Ok(TimeSpec::Weekly { weekday, time });
                }
                let day: u32 = lead
                    .parse()
                    .map_err(|_| SchedulerError::InvalidTimeSpec(s.to_string()))?;
                if !(1..=31).contains(&day) {
                    return Err(SchedulerError::InvalidTimeSpec(s.to_string()));
                }
                Ok(TimeSpec::Monthly { day, time })
            }
            _ => Err(SchedulerError::InvalidTimeSpec(s.to_string())),
        }
    }
}

impl std::fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            TimeSpec::Daily { time } => write!(f, "{}", time.format("%H:%M")),
            TimeSpec::Weekly { weekday, time } => {
                write!(f, "{} {}", weekday, time.format("%H:%M"))
            }
            TimeSpec::Monthly { day, time } => write!(f, "{} {}", day, time.format("%H:%M")),
        }
    }
}

impl Serialize for TimeSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
