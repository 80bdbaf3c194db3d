//! Shift calendar and time windows.
//!
//! The shop works a single fixed shift, Monday to Saturday 06:00–22:00.
//! Sunday is a rest day. The calendar is a set of pure functions over
//! local wall-clock timestamps.
//!
//! # Time Model
//! All times are `chrono::NaiveDateTime` in the plant's local time.
//! Durations are handled in whole milliseconds; hours are converted at
//! the edges (`hours_to_duration`, `duration_hours`).
//!
//! # Snapping
//! Planning never starts at an arbitrary minute. The current time is
//! rounded forward to the next quarter hour, then pushed into the next
//! working window.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// First working hour of a day (inclusive).
pub const SHIFT_START_HOUR: u32 = 6;
/// End of the working day (exclusive).
pub const SHIFT_END_HOUR: u32 = 22;
/// The weekday on which nothing is scheduled.
pub const REST_DAY: Weekday = Weekday::Sun;
/// Granularity of the planning clock (minutes).
pub const SNAP_MINUTES: u32 = 15;
/// A shift remainder shorter than this is not worth starting work in (minutes).
pub const MIN_SHIFT_REMAINDER_MINUTES: i64 = 15;

/// A time interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: NaiveDateTime,
    /// Interval end (exclusive).
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Length of the window.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether a timestamp falls within this window.
    #[inline]
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        t >= self.start && t < self.end
    }

    /// Whether two windows overlap. Touching windows do not.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Midnight at the start of `date`.
#[inline]
pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

/// Start of the shift on `date` (06:00).
pub fn shift_start(date: NaiveDate) -> NaiveDateTime {
    midnight(date) + Duration::hours(SHIFT_START_HOUR as i64)
}

/// End of the shift on `date` (22:00).
pub fn shift_end(date: NaiveDate) -> NaiveDateTime {
    midnight(date) + Duration::hours(SHIFT_END_HOUR as i64)
}

/// Whether a timestamp lies inside a working window.
pub fn is_work_time(t: NaiveDateTime) -> bool {
    t.weekday() != REST_DAY && t.hour() >= SHIFT_START_HOUR && t.hour() < SHIFT_END_HOUR
}

/// Moves `t` forward to the nearest instant that lies inside a shift.
///
/// Rules are applied until none fires:
/// - on the rest day, jump to 06:00 the next day;
/// - before 06:00, clamp to 06:00 the same day;
/// - at or after 22:00, jump to 06:00 the next day.
///
/// A timestamp already inside a shift is returned unchanged.
pub fn next_valid_work_time(mut t: NaiveDateTime) -> NaiveDateTime {
    loop {
        let next_day = t.date() + Duration::days(1);
        t = if t.weekday() == REST_DAY {
            shift_start(next_day)
        } else if t.hour() < SHIFT_START_HOUR {
            shift_start(t.date())
        } else if t.hour() >= SHIFT_END_HOUR {
            shift_start(next_day)
        } else {
            return t;
        };
    }
}

/// Rounds `t` up to the next quarter hour.
///
/// This is a strict ceiling: a timestamp already on a boundary moves a
/// full 15 minutes forward. Seconds are dropped first.
pub fn snap_to_next_quarter_hour(t: NaiveDateTime) -> NaiveDateTime {
    let minute_of_day = t.hour() * 60 + t.minute();
    let next = (minute_of_day / SNAP_MINUTES + 1) * SNAP_MINUTES;
    midnight(t.date()) + Duration::minutes(next as i64)
}

/// Earliest instant a planning run may place work, given the wall clock.
pub fn planning_start(now: NaiveDateTime) -> NaiveDateTime {
    next_valid_work_time(snap_to_next_quarter_hour(now))
}

/// Converts fractional hours into a millisecond-precise duration.
pub fn hours_to_duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

/// Length of a duration in fractional hours.
pub fn duration_hours(d: Duration) -> f64 {
    d.num_milliseconds() as f64 / 3_600_000.0
}
