//! Civil wall-clock timestamps and elapsed durations.
//!
//! A [CivilTime] is a plain bag of calendar fields interpreted as UTC. It is
//! the wire format every persisted block uses, so fields stay public and
//! serialization is field-by-field. Temporal comparisons always go through the
//! resolved linear instant, never through the raw fields.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use std::fmt::Display;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Calendar date + time of day, implicitly UTC.
///
/// Out-of-range fields are legal and resolve through calendar rollover:
/// minute 61 means one extra minute past the next hour, month 13 means
/// January of the next year. Years must stay inside chrono's supported
/// calendar range (roughly ±262,000); conversions panic outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CivilTime {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
}

impl CivilTime {
    pub fn new(year: i32, month: i32, day: i32, hour: i32, minute: i32, second: i32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub fn midnight(year: i32, month: i32, day: i32) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Resolves the civil fields to seconds since the Unix epoch.
    ///
    /// Month is normalized into the year first, every other field is carried
    /// as a plain second offset from the first of that month.
    pub fn to_instant(&self) -> i64 {
        let months = i64::from(self.month) - 1;
        let year = i64::from(self.year) + months.div_euclid(12);
        let month = months.rem_euclid(12) as u32 + 1;

        let first_of_month = NaiveDate::from_ymd_opt(year as i32, month, 1)
            .expect("year stays within the supported calendar range");
        let base = first_of_month.and_time(NaiveTime::MIN).and_utc().timestamp();

        base + (i64::from(self.day) - 1) * SECONDS_PER_DAY
            + i64::from(self.hour) * 3600
            + i64::from(self.minute) * 60
            + i64::from(self.second)
    }

    /// Inverse of [CivilTime::to_instant]. The result is always in canonical
    /// form, so `from_instant(t.to_instant())` normalizes `t`.
    pub fn from_instant(instant: i64) -> Self {
        let moment = DateTime::<Utc>::from_timestamp(instant, 0)
            .expect("instants stay within the chrono date range");
        Self {
            year: moment.year(),
            month: moment.month() as i32,
            day: moment.day() as i32,
            hour: moment.hour() as i32,
            minute: moment.minute() as i32,
            second: moment.second() as i32,
        }
    }

    pub fn normalized(&self) -> Self {
        Self::from_instant(self.to_instant())
    }

    pub fn before(&self, other: &CivilTime) -> bool {
        self.to_instant() < other.to_instant()
    }

    pub fn after(&self, other: &CivilTime) -> bool {
        self.to_instant() > other.to_instant()
    }

    pub fn same_instant(&self, other: &CivilTime) -> bool {
        self.to_instant() == other.to_instant()
    }

    pub fn add(&self, duration: BlockDuration) -> CivilTime {
        Self::from_instant(self.to_instant() + duration.total_seconds())
    }

    /// The timestamp exactly 24 hours earlier. Crosses month and year
    /// boundaries through the linear time axis, not by decrementing fields.
    pub fn previous_day(&self) -> CivilTime {
        Self::from_instant(self.to_instant() - SECONDS_PER_DAY)
    }

    /// The raw date fields, which key the owning day partition.
    pub fn date(&self) -> CivilDate {
        CivilDate {
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }
}

/// Identity of one day partition. Compared field-wise on purpose: partition
/// membership is decided by the civil date fields as written, not by the
/// resolved instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CivilDate {
    pub year: i32,
    pub month: i32,
    pub day: i32,
}

impl CivilDate {
    pub fn new(year: i32, month: i32, day: i32) -> Self {
        Self { year, month, day }
    }

    pub fn midnight(&self) -> CivilTime {
        CivilTime::midnight(self.year, self.month, self.day)
    }

    pub fn last_second(&self) -> CivilTime {
        CivilTime::new(self.year, self.month, self.day, 23, 59, 59)
    }
}

impl Display for CivilDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// This is the standard way of converting a partition date to a file name.
pub fn date_to_partition_name(date: CivilDate) -> String {
    format!("{date}.json")
}

/// Elapsed time split into hours/minutes/seconds.
///
/// Canonical form comes from [BlockDuration::from_seconds]: truncating
/// division, so for negative totals every non-zero field carries the sign
/// (-3661 s is -1 h -1 m -1 s). Arithmetic always flattens to total seconds
/// and reprojects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockDuration {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl BlockDuration {
    pub fn from_seconds(total: i64) -> Self {
        let hours = total / 3600;
        let rest = total - hours * 3600;
        let minutes = rest / 60;
        let seconds = rest - minutes * 60;
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    pub fn from_hours(hours: i64) -> Self {
        Self::from_seconds(hours * 3600)
    }

    pub fn total_seconds(&self) -> i64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }

    pub fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }

    pub fn add(&self, other: BlockDuration) -> BlockDuration {
        Self::from_seconds(self.total_seconds() + other.total_seconds())
    }

    pub fn sub(&self, other: BlockDuration) -> BlockDuration {
        Self::from_seconds(self.total_seconds() - other.total_seconds())
    }
}

/// Signed span from `a` to `b`, negative when `b` is earlier.
pub fn span_between(a: &CivilTime, b: &CivilTime) -> BlockDuration {
    BlockDuration::from_seconds(b.to_instant() - a.to_instant())
}
