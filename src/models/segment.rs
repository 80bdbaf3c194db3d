//! Segment model.
//!
//! A segment is one concrete interval of work on one machine. A step of
//! a job is realized by one or more segments; a step that crosses the
//! end of a shift is split into several.
//!
//! Segments are either **committed** (persisted by the job store,
//! immovable for the planner) or **drafts** (proposed by the planner or
//! created by hand, not yet persisted).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::calendar::{duration_hours, TimeWindow};

/// Persistence state of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentState {
    /// Persisted by the job store.
    Committed,
    /// Proposed, not yet persisted.
    Draft,
}

/// A scheduled interval of work on a machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Unique segment identifier.
    pub id: String,
    /// Owning job.
    pub job_id: String,
    /// Machine the work runs on.
    pub machine: String,
    /// Start (inclusive).
    pub start: NaiveDateTime,
    /// End (exclusive).
    pub end: NaiveDateTime,
    /// Persistence state.
    pub state: SegmentState,
    /// Pinned by a user; automated re-planning must not move it.
    #[serde(default)]
    pub locked: bool,
    /// Index of the job step this segment realizes, when known.
    #[serde(default)]
    pub step: Option<usize>,
}

impl Segment {
    /// Creates a committed segment.
    pub fn committed(
        id: impl Into<String>,
        job_id: impl Into<String>,
        machine: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            job_id: job_id.into(),
            machine: machine.into(),
            start,
            end,
            state: SegmentState::Committed,
            locked: false,
            step: None,
        }
    }

    /// Creates a draft segment.
    pub fn draft(
        id: impl Into<String>,
        job_id: impl Into<String>,
        machine: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            state: SegmentState::Draft,
            ..Self::committed(id, job_id, machine, start, end)
        }
    }

    /// Sets the step index.
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }

    /// Pins the segment.
    pub fn with_lock(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Whether the segment is persisted.
    #[inline]
    pub fn is_committed(&self) -> bool {
        self.state == SegmentState::Committed
    }

    /// Whether the segment is a draft.
    #[inline]
    pub fn is_draft(&self) -> bool {
        self.state == SegmentState::Draft
    }

    /// The occupied interval.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }

    /// Length in fractional hours.
    pub fn hours(&self) -> f64 {
        duration_hours(self.end - self.start)
    }

    /// Calendar day the segment starts on.
    pub fn day(&self) -> NaiveDate {
        self.start.date()
    }

    /// Whether the segment has already started at `now`.
    pub fn has_started(&self, now: NaiveDateTime) -> bool {
        self.start <= now
    }

    /// Whether two segments occupy the same machine at the same time.
    pub fn collides_with(&self, other: &Segment) -> bool {
        self.machine == other.machine && self.window().overlaps(&other.window())
    }
}

/// Latest end among the segments of `job_id`.
pub fn job_completion(segments: &[Segment], job_id: &str) -> Option<NaiveDateTime> {
    segments
        .iter()
        .filter(|s| s.job_id == job_id)
        .map(|s| s.end)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_segment_constructors() {
        let c = Segment::committed("S1", "J1", "M1", at(8, 0), at(10, 30));
        assert!(c.is_committed());
        assert!(!c.locked);
        assert!((c.hours() - 2.5).abs() < 1e-10);

        let d = Segment::draft("S2", "J1", "M1", at(11, 0), at(12, 0)).with_step(1);
        assert!(d.is_draft());
        assert_eq!(d.step, Some(1));
        assert_eq!(d.day(), NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
    }

    #[test]
    fn test_collides_with() {
        let a = Segment::committed("S1", "J1", "M1", at(8, 0), at(10, 0));
        let b = Segment::draft("S2", "J2", "M1", at(9, 0), at(11, 0));
        let c = Segment::draft("S3", "J2", "M2", at(9, 0), at(11, 0));
        let d = Segment::draft("S4", "J3", "M1", at(10, 0), at(11, 0));
        assert!(a.collides_with(&b));
        assert!(!a.collides_with(&c)); // other machine
        assert!(!a.collides_with(&d)); // touching
    }

    #[test]
    fn test_has_started() {
        let s = Segment::committed("S1", "J1", "M1", at(8, 0), at(10, 0));
        assert!(!s.has_started(at(7, 59)));
        assert!(s.has_started(at(8, 0)));
    }

    #[test]
    fn test_job_completion() {
        let segs = vec![
            Segment::committed("S1", "J1", "M1", at(8, 0), at(10, 0)),
            Segment::draft("S2", "J1", "M2", at(10, 0), at(14, 0)),
            Segment::draft("S3", "J2", "M2", at(14, 0), at(15, 0)),
        ];
        assert_eq!(job_completion(&segs, "J1"), Some(at(14, 0)));
        assert_eq!(job_completion(&segs, "J9"), None);
    }

    #[test]
    fn test_state_serde() {
        let s = Segment::draft("S1", "J1", "M1", at(8, 0), at(9, 0));
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"state\":\"draft\""));
        let back: Segment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
