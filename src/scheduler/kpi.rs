//! Planning run metrics.
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Draft count | Number of new segments |
//! | Scheduled hours | Sum of draft durations |
//! | Late jobs | Jobs finishing on a day after their delivery date |
//! | Avg lead time | Mean hours from plan start to job completion |
//! | Skipped jobs | Jobs excluded by ranking or planning |

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::calendar::duration_hours;
use crate::models::{Job, Segment};

/// Summary of a planning run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Number of draft segments produced.
    pub draft_count: usize,
    /// Total hours of draft work.
    pub scheduled_hours: f64,
    /// Jobs whose last segment ends after their delivery date.
    pub late_jobs: usize,
    /// Mean lead time (hours) from plan start to completion of each scheduled job.
    pub avg_lead_time_hours: f64,
    /// Jobs excluded from the run.
    pub skipped_jobs: usize,
    /// Latest end among the drafts.
    pub horizon_end: Option<NaiveDateTime>,
}

impl PlanSummary {
    /// Computes metrics for the jobs that were placed.
    ///
    /// # Arguments
    /// * `jobs` - Jobs that went through planning without being skipped.
    /// * `drafts` - Segments produced by the run.
    /// * `existing` - Segments that were already on the timeline.
    /// * `start` - Instant the run planned from.
    ///
    /// A job counts as scheduled when it has any segment, draft or
    /// committed. Its completion is the latest end among them. Lead
    /// times before `start` count as zero.
    pub fn calculate(
        jobs: &[Job],
        drafts: &[Segment],
        existing: &[Segment],
        start: NaiveDateTime,
    ) -> Self {
        let mut completion: HashMap<&str, NaiveDateTime> = HashMap::new();
        for s in drafts.iter().chain(existing.iter().filter(|s| s.is_committed())) {
            completion
                .entry(s.job_id.as_str())
                .and_modify(|end| *end = (*end).max(s.end))
                .or_insert(s.end);
        }

        let mut late_jobs = 0;
        let mut total_lead = 0.0;
        let mut scheduled = 0usize;
        for job in jobs {
            let Some(&done) = completion.get(job.id.as_str()) else {
                continue;
            };
            scheduled += 1;
            total_lead += duration_hours(done - start).max(0.0);
            if job.delivery.is_some_and(|d| done.date() > d) {
                late_jobs += 1;
            }
        }

        Self {
            draft_count: drafts.len(),
            scheduled_hours: drafts.iter().map(Segment::hours).sum(),
            late_jobs,
            avg_lead_time_hours: if scheduled == 0 {
                0.0
            } else {
                total_lead / scheduled as f64
            },
            skipped_jobs: 0,
            horizon_end: drafts.iter().map(|s| s.end).max(),
        }
    }

    /// Whether every scheduled job meets its delivery date.
    pub fn all_on_time(&self) -> bool {
        self.late_jobs == 0
    }
}
