//! Interval classification for running-total resets.
//!
//! A date cell is coarsened to the start of the [`Interval`] it falls in; two
//! rows belong to the same bucket exactly when their coarsened values match.
//! Calendar units (year, quarter, month, week) follow the [`Calendar`] rules,
//! fixed units (day, hour, minute) are tumbling windows over epoch
//! milliseconds.

use crate::calendar::{Calendar, month_start, quarter_start};
use crate::value::Value;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Milliseconds since UNIX epoch (UTC).
pub type TimestampMs = i64;

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Coarseness level of a date grouping, from `None` (no reset) to `Minute`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    #[default]
    None,
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
}

/// The bucket a value falls into at some [`Interval`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Never resets: no interval, or the value is not a date.
    Unbounded,
    /// Interval starting at this instant.
    Start(NaiveDateTime),
}

impl Interval {
    /// Start of the interval containing `dt`.
    pub fn truncate(self, dt: NaiveDateTime, cal: &Calendar) -> NaiveDateTime {
        let midnight = |d: NaiveDate| d.and_time(chrono::NaiveTime::MIN);
        match self {
            Self::None => dt,
            Self::Year => midnight(dt.date().with_ordinal(1).unwrap_or(dt.date())),
            Self::Quarter => midnight(quarter_start(dt.date())),
            Self::Month => midnight(month_start(dt.date())),
            Self::Week => midnight(cal.week_start(dt.date())),
            Self::Day => tumble(dt, DAY_MS),
            Self::Hour => tumble(dt, HOUR_MS),
            Self::Minute => tumble(dt, MINUTE_MS),
        }
    }

    /// Bucket of a cell value.
    pub fn bucket(self, v: &Value, cal: &Calendar) -> Bucket {
        match (self, v.as_date()) {
            (Self::None, _) | (_, None) => Bucket::Unbounded,
            (level, Some(dt)) => Bucket::Start(level.truncate(dt, cal)),
        }
    }
}

/// Floor `dt` onto a grid of `size_ms` windows anchored at the epoch.
fn tumble(dt: NaiveDateTime, size_ms: i64) -> NaiveDateTime {
    let ts: TimestampMs = dt.and_utc().timestamp_millis();
    let start = div_floor(ts, size_ms) * size_ms;
    DateTime::from_timestamp_millis(start).map_or(dt, |t| t.naive_utc())
}

/// Floor division for i64 (unlike `/` which truncates toward zero).
#[inline]
fn div_floor(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if (r != 0) && ((r > 0) != (b > 0)) { q - 1 } else { q }
}
