//! Greedy segment planner.
//!
//! # Algorithm
//!
//! 1. Rank jobs by the selected strategy; drop excluded jobs.
//! 2. For each job, walk its steps in order. Each step starts no earlier
//!    than the end of the previous step (`dependency_end`).
//! 3. Hours already realized by committed segments for (job, machine)
//!    are subtracted; a step within 0.1h of done is skipped over.
//! 4. Remaining hours are packed forward in time: a piece never crosses
//!    the end of a shift, never starts in a shift remainder shorter than
//!    15 minutes, and jumps past any segment it would overlap.
//! 5. Every placed draft is booked into the machine index immediately,
//!    so later steps and later jobs see it.
//! 6. A step on an unregistered machine voids the whole job: its drafts
//!    from this run are released and it is reported as skipped.
//!
//! The planner is greedy and single-pass: it never backtracks, so the
//! result is feasible but not makespan-optimal.
//!
//! # Complexity
//! O(n * s * k) where n = jobs, s = steps/job, k = segments per machine.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info, warn};

use super::PlanSummary;
use crate::dispatching::{rank, RankingOptions};
use crate::error::{SkipReason, Skipped};
use crate::models::calendar::{
    self, hours_to_duration, next_valid_work_time, planning_start, MIN_SHIFT_REMAINDER_MINUTES,
};
use crate::models::{Job, ResourceRegistry, Segment, TimeWindow};

/// A step is considered done when fewer hours than this remain.
pub const STEP_TOLERANCE_HOURS: f64 = 0.1;

/// Input container for a planning run.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    /// Candidate jobs (unranked).
    pub jobs: Vec<Job>,
    /// Segments already on the timeline (committed and existing drafts).
    pub segments: Vec<Segment>,
    /// Valid machines.
    pub registry: ResourceRegistry,
    /// Earliest instant new work may be placed.
    pub start: NaiveDateTime,
    /// Strategy and filters.
    pub options: RankingOptions,
}

impl PlanRequest {
    /// Creates a request planning from the wall-clock time `now`.
    ///
    /// The start is `now` rounded up to the next quarter hour and moved
    /// into the next working window.
    pub fn new(jobs: Vec<Job>, registry: ResourceRegistry, now: NaiveDateTime) -> Self {
        Self {
            jobs,
            segments: Vec::new(),
            registry,
            start: planning_start(now),
            options: RankingOptions::default(),
        }
    }

    /// Plans from an explicit start instead of the snapped wall clock.
    ///
    /// The start is still moved into a working window.
    pub fn starting_at(mut self, start: NaiveDateTime) -> Self {
        self.start = next_valid_work_time(start);
        self
    }

    /// Sets the segments already on the timeline.
    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = segments;
        self
    }

    /// Sets strategy and filters.
    pub fn with_options(mut self, options: RankingOptions) -> Self {
        self.options = options;
        self
    }
}

/// Result of a planning run.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// New draft segments, in placement order.
    pub drafts: Vec<Segment>,
    /// Jobs excluded by ranking or planning.
    pub skipped: Vec<Skipped>,
    /// Run metrics.
    pub summary: PlanSummary,
    /// The instant planning started from.
    pub start: NaiveDateTime,
}

/// Drafts and skips of a placement pass over already-ranked jobs.
#[derive(Debug, Clone, Default)]
pub struct Placement {
    pub drafts: Vec<Segment>,
    pub skipped: Vec<Skipped>,
}

#[derive(Debug, Clone)]
struct Booking {
    window: TimeWindow,
    /// Job whose draft created this booking during the current run.
    drafted_for: Option<String>,
}

/// Per-machine interval index of everything placed so far.
///
/// Seeded with the known segments and grown as drafts are placed, so a
/// placement always sees earlier placements of the same run.
#[derive(Debug, Clone, Default)]
pub struct MachineIndex {
    by_machine: HashMap<String, Vec<Booking>>,
}

impl MachineIndex {
    /// Builds an index over existing segments.
    pub fn from_segments(segments: &[Segment]) -> Self {
        let mut index = Self::default();
        for s in segments {
            index
                .by_machine
                .entry(s.machine.clone())
                .or_default()
                .push(Booking {
                    window: s.window(),
                    drafted_for: None,
                });
        }
        index
    }

    /// First booking on `machine` that overlaps `window`.
    pub fn first_collision(&self, machine: &str, window: &TimeWindow) -> Option<TimeWindow> {
        self.by_machine
            .get(machine)?
            .iter()
            .map(|b| b.window)
            .find(|w| w.overlaps(window))
    }

    /// Books a new draft window on `machine` for `job_id`.
    pub fn book(&mut self, machine: &str, window: TimeWindow, job_id: &str) {
        self.by_machine
            .entry(machine.to_string())
            .or_default()
            .push(Booking {
                window,
                drafted_for: Some(job_id.to_string()),
            });
    }

    /// Drops every draft booking made for `job_id`. Returns how many were dropped.
    pub fn release_job(&mut self, job_id: &str) -> usize {
        let mut released = 0;
        for bookings in self.by_machine.values_mut() {
            let before = bookings.len();
            bookings.retain(|b| b.drafted_for.as_deref() != Some(job_id));
            released += before - bookings.len();
        }
        released
    }

    /// Number of bookings on a machine.
    pub fn booking_count(&self, machine: &str) -> usize {
        self.by_machine.get(machine).map_or(0, Vec::len)
    }
}

/// Work already realized by committed segments for one (job, machine).
#[derive(Debug, Clone, Copy)]
struct Realized {
    done: Duration,
    latest_end: NaiveDateTime,
}

fn realized_work(segments: &[Segment]) -> HashMap<(&str, &str), Realized> {
    let mut realized: HashMap<(&str, &str), Realized> = HashMap::new();
    for s in segments.iter().filter(|s| s.is_committed()) {
        realized
            .entry((s.job_id.as_str(), s.machine.as_str()))
            .and_modify(|r| {
                r.done = r.done + (s.end - s.start);
                r.latest_end = r.latest_end.max(s.end);
            })
            .or_insert(Realized {
                done: s.end - s.start,
                latest_end: s.end,
            });
    }
    realized
}

/// Greedy, shift-aware segment planner.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_shopfloor::models::{Job, ResourceRegistry};
/// use u_shopfloor::scheduler::{PlanRequest, SegmentPlanner};
///
/// // Wednesday 05:30 → planning starts Wednesday 06:00
/// let now = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap().and_hms_opt(5, 30, 0).unwrap();
/// let jobs = vec![Job::new("J1").with_step("M1", 2.0)];
/// let registry = ResourceRegistry::new().with_machine("M1");
///
/// let outcome = SegmentPlanner::new().plan(&PlanRequest::new(jobs, registry, now));
/// assert_eq!(outcome.drafts.len(), 1);
/// assert_eq!(outcome.drafts[0].start.format("%H:%M").to_string(), "06:00");
/// ```
#[derive(Debug, Clone)]
pub struct SegmentPlanner {
    id_prefix: String,
}

impl SegmentPlanner {
    /// Creates a planner issuing draft ids `draft-<job>-<n>`.
    pub fn new() -> Self {
        Self {
            id_prefix: "draft".to_string(),
        }
    }

    /// Sets the prefix of generated draft ids.
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Ranks, places and summarizes a request.
    pub fn plan(&self, request: &PlanRequest) -> PlanOutcome {
        let ranking = rank(&request.jobs, &request.options);
        let placement = self.place(
            &ranking.ordered,
            &request.segments,
            &request.registry,
            request.start,
        );

        let placed: Vec<Job> = ranking
            .ordered
            .into_iter()
            .filter(|j| !placement.skipped.iter().any(|s| s.job_id == j.id))
            .collect();
        let mut skipped = ranking.skipped;
        skipped.extend(placement.skipped);

        let mut summary =
            PlanSummary::calculate(&placed, &placement.drafts, &request.segments, request.start);
        summary.skipped_jobs = skipped.len();

        info!(
            drafts = summary.draft_count,
            hours = summary.scheduled_hours,
            late = summary.late_jobs,
            skipped = summary.skipped_jobs,
            "planning run finished"
        );

        PlanOutcome {
            drafts: placement.drafts,
            skipped,
            summary,
            start: request.start,
        }
    }

    /// Places already-ranked jobs around the `known` segments.
    ///
    /// Jobs are processed in slice order. Nothing here fails: unknown
    /// machines are reported through `skipped`.
    pub fn place(
        &self,
        ranked: &[Job],
        known: &[Segment],
        registry: &ResourceRegistry,
        start: NaiveDateTime,
    ) -> Placement {
        let start = next_valid_work_time(start);
        let mut index = MachineIndex::from_segments(known);
        let realized = realized_work(known);
        let mut taken_ids: HashSet<String> = known.iter().map(|s| s.id.clone()).collect();
        let tolerance = hours_to_duration(STEP_TOLERANCE_HOURS);
        let min_remainder = Duration::minutes(MIN_SHIFT_REMAINDER_MINUTES);
        let mut placement = Placement::default();

        for job in ranked {
            let mut drafts: Vec<Segment> = Vec::new();
            let mut dependency_end = start;
            let mut skip_reason = None;

            for (step_idx, step) in job.steps.iter().enumerate() {
                if !registry.contains(&step.machine) {
                    skip_reason = Some(SkipReason::UnknownResource {
                        machine: step.machine.clone(),
                    });
                    break;
                }

                let existing = realized
                    .get(&(job.id.as_str(), step.machine.as_str()))
                    .copied();
                let done = existing.map_or(Duration::zero(), |r| r.done);
                let mut remaining = hours_to_duration(step.hours) - done;

                if remaining < tolerance {
                    if let Some(r) = existing {
                        dependency_end = dependency_end.max(r.latest_end);
                    }
                    debug!(job = %job.id, step = step_idx, "step already realized");
                    continue;
                }

                let mut search = next_valid_work_time(
                    existing.map_or(dependency_end, |r| r.latest_end.max(dependency_end)),
                );

                while remaining > Duration::zero() {
                    search = next_valid_work_time(search);
                    let shift_end = calendar::shift_end(search.date());
                    let left_in_shift = shift_end - search;
                    if left_in_shift < min_remainder {
                        search = next_valid_work_time(shift_end + Duration::minutes(1));
                        continue;
                    }

                    let window = TimeWindow::new(search, search + remaining.min(left_in_shift));
                    if let Some(hit) = index.first_collision(&step.machine, &window) {
                        search = hit.end;
                        continue;
                    }

                    let id = self.next_id(&job.id, &mut taken_ids);
                    debug!(
                        job = %job.id,
                        step = step_idx,
                        machine = %step.machine,
                        start = %window.start,
                        end = %window.end,
                        "placed draft segment"
                    );
                    index.book(&step.machine, window, &job.id);
                    drafts.push(
                        Segment::draft(id, &job.id, &step.machine, window.start, window.end)
                            .with_step(step_idx),
                    );
                    remaining = remaining - window.duration();
                    search = window.end;
                }

                dependency_end = search;
            }

            match skip_reason {
                Some(reason) => {
                    let released = index.release_job(&job.id);
                    warn!(job = %job.id, %reason, released, "job skipped");
                    placement.skipped.push(Skipped::new(&job.id, reason));
                }
                None => placement.drafts.extend(drafts),
            }
        }

        placement
    }

    fn next_id(&self, job_id: &str, taken: &mut HashSet<String>) -> String {
        let mut n = 1usize;
        loop {
            let id = format!("{}-{}-{}", self.id_prefix, job_id, n);
            if taken.insert(id.clone()) {
                return id;
            }
            n += 1;
        }
    }
}

impl Default for SegmentPlanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::calendar::is_work_time;
    use crate::validation::audit_segments;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // 2024-06-03 is a Monday.
    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn registry(ids: &[&str]) -> ResourceRegistry {
        ids.iter().copied().collect()
    }

    fn of_job<'a>(segs: &'a [Segment], job: &str) -> Vec<&'a Segment> {
        segs.iter().filter(|s| s.job_id == job).collect()
    }

    #[test]
    fn test_splits_across_shift_end() {
        let jobs = vec![Job::new("J1").with_step("M1", 5.0).with_step("M2", 3.0)];
        let placement =
            SegmentPlanner::new().place(&jobs, &[], &registry(&["M1", "M2"]), at(3, 20, 0));

        let step0: Vec<_> = placement.drafts.iter().filter(|s| s.step == Some(0)).collect();
        assert_eq!(step0.len(), 2);
        assert_eq!((step0[0].start, step0[0].end), (at(3, 20, 0), at(3, 22, 0)));
        assert_eq!((step0[1].start, step0[1].end), (at(4, 6, 0), at(4, 9, 0)));

        let step1: Vec<_> = placement.drafts.iter().filter(|s| s.step == Some(1)).collect();
        assert_eq!(step1.len(), 1);
        assert!(step1[0].start >= at(4, 9, 0));
        assert_eq!(step1[0].machine, "M2");
        assert!((step1[0].hours() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_request_snaps_wall_clock() {
        let jobs = vec![Job::new("J1").with_step("M1", 5.0)];
        let request = PlanRequest::new(jobs, registry(&["M1"]), at(3, 19, 50));
        assert_eq!(request.start, at(3, 20, 0));

        let outcome = SegmentPlanner::new().plan(&request);
        assert_eq!(outcome.drafts[0].start, at(3, 20, 0));
        assert_eq!(outcome.drafts[1].end, at(4, 9, 0));
    }

    #[test]
    fn test_two_jobs_share_machine() {
        let jobs = vec![
            Job::new("A").with_step("M1", 2.0),
            Job::new("B").with_step("M1", 2.0),
        ];
        let placement = SegmentPlanner::new().place(&jobs, &[], &registry(&["M1"]), at(5, 6, 0));
        let a = of_job(&placement.drafts, "A");
        let b = of_job(&placement.drafts, "B");
        assert_eq!((a[0].start, a[0].end), (at(5, 6, 0), at(5, 8, 0)));
        assert!(b[0].start >= at(5, 8, 0));
        assert_eq!(b[0].start, at(5, 8, 0));
    }

    #[test]
    fn test_unknown_machine_skips_whole_job() {
        let jobs = vec![
            Job::new("J1")
                .with_step("M1", 3.0)
                .with_step("GHOST", 1.0)
                .with_step("M2", 1.0),
            Job::new("J2").with_step("M1", 1.0),
        ];
        let placement =
            SegmentPlanner::new().place(&jobs, &[], &registry(&["M1", "M2"]), at(5, 6, 0));

        assert!(of_job(&placement.drafts, "J1").is_empty());
        assert_eq!(
            placement.skipped,
            vec![Skipped::new(
                "J1",
                SkipReason::UnknownResource {
                    machine: "GHOST".into()
                }
            )]
        );
        // J1's discarded draft no longer blocks M1
        let j2 = of_job(&placement.drafts, "J2");
        assert_eq!(j2[0].start, at(5, 6, 0));
    }

    #[test]
    fn test_avoids_committed_segments() {
        let known = vec![
            Segment::committed("C1", "OTHER", "M1", at(5, 6, 0), at(5, 9, 0)),
            Segment::committed("C2", "OTHER", "M1", at(5, 10, 0), at(5, 12, 0)),
        ];
        let jobs = vec![Job::new("J1").with_step("M1", 2.0)];
        let placement = SegmentPlanner::new().place(&jobs, &known, &registry(&["M1"]), at(5, 6, 0));

        // The 09:00–10:00 gap is too short: the proposal 09:00–11:00
        // collides with C2, so the planner jumps past it.
        let d = &placement.drafts;
        assert_eq!(d.len(), 1);
        assert_eq!((d[0].start, d[0].end), (at(5, 12, 0), at(5, 14, 0)));
        assert!(audit_segments(&[known, placement.drafts].concat()).is_empty());
    }

    #[test]
    fn test_existing_drafts_block_too() {
        let known = vec![Segment::draft("D1", "OTHER", "M1", at(5, 6, 0), at(5, 7, 0))];
        let jobs = vec![Job::new("J1").with_step("M1", 1.0)];
        let placement = SegmentPlanner::new().place(&jobs, &known, &registry(&["M1"]), at(5, 6, 0));
        assert_eq!(placement.drafts[0].start, at(5, 7, 0));
    }

    #[test]
    fn test_partially_realized_step() {
        let known = vec![Segment::committed("C1", "J1", "M1", at(5, 6, 0), at(5, 9, 0))];
        let jobs = vec![Job::new("J1").with_step("M1", 5.0).with_step("M2", 1.0)];
        let placement =
            SegmentPlanner::new().place(&jobs, &known, &registry(&["M1", "M2"]), at(5, 6, 0));

        let m1: Vec<_> = placement.drafts.iter().filter(|s| s.machine == "M1").collect();
        assert_eq!(m1.len(), 1);
        assert_eq!((m1[0].start, m1[0].end), (at(5, 9, 0), at(5, 11, 0)));
        let m2: Vec<_> = placement.drafts.iter().filter(|s| s.machine == "M2").collect();
        assert_eq!(m2[0].start, at(5, 11, 0));
    }

    #[test]
    fn test_realized_step_advances_dependency() {
        // Step done within tolerance; the next step waits for it.
        let known = vec![Segment::committed("C1", "J1", "M1", at(5, 6, 0), at(5, 9, 57))];
        let jobs = vec![Job::new("J1").with_step("M1", 4.0).with_step("M2", 1.0)];
        let placement =
            SegmentPlanner::new().place(&jobs, &known, &registry(&["M1", "M2"]), at(5, 6, 0));

        assert_eq!(placement.drafts.len(), 1);
        assert_eq!(placement.drafts[0].machine, "M2");
        assert_eq!(placement.drafts[0].start, at(5, 9, 57));
    }

    #[test]
    fn test_short_shift_remainder_is_skipped() {
        let jobs = vec![Job::new("J1").with_step("M1", 1.0)];
        let placement =
            SegmentPlanner::new().place(&jobs, &[], &registry(&["M1"]), at(5, 21, 50));
        assert_eq!(placement.drafts.len(), 1);
        assert_eq!(placement.drafts[0].start, at(6, 6, 0));
    }

    #[test]
    fn test_saturday_spills_to_monday() {
        let jobs = vec![Job::new("J1").with_step("M1", 4.0)];
        let placement = SegmentPlanner::new().place(&jobs, &[], &registry(&["M1"]), at(8, 20, 0));
        let d = &placement.drafts;
        assert_eq!((d[0].start, d[0].end), (at(8, 20, 0), at(8, 22, 0)));
        assert_eq!((d[1].start, d[1].end), (at(10, 6, 0), at(10, 8, 0)));
    }

    #[test]
    fn test_draft_ids_avoid_known_ids() {
        let known = vec![Segment::draft("draft-J1-1", "J1", "M2", at(5, 6, 0), at(5, 7, 0))];
        let jobs = vec![Job::new("J1").with_step("M1", 1.0)];
        let placement =
            SegmentPlanner::new().place(&jobs, &known, &registry(&["M1", "M2"]), at(5, 6, 0));
        assert_eq!(placement.drafts[0].id, "draft-J1-2");
    }

    #[test]
    fn test_plan_merges_skip_lists() {
        let jobs = vec![
            Job::new("EMPTY"),
            Job::new("GHOSTLY").with_step("GHOST", 1.0),
            Job::new("OK").with_step("M1", 1.0),
        ];
        let request = PlanRequest::new(jobs, registry(&["M1"]), at(5, 5, 0));
        let outcome = SegmentPlanner::new().plan(&request);
        let skipped: Vec<&str> = outcome.skipped.iter().map(|s| s.job_id.as_str()).collect();
        assert_eq!(skipped, vec!["EMPTY", "GHOSTLY"]);
        assert_eq!(outcome.summary.draft_count, 1);
        assert_eq!(outcome.summary.skipped_jobs, 2);
    }

    #[test]
    fn test_machine_index_release() {
        let mut index = MachineIndex::from_segments(&[Segment::committed(
            "C1", "J0", "M1", at(5, 6, 0), at(5, 7, 0),
        )]);
        index.book("M1", TimeWindow::new(at(5, 7, 0), at(5, 8, 0)), "J1");
        index.book("M2", TimeWindow::new(at(5, 7, 0), at(5, 8, 0)), "J1");
        assert_eq!(index.release_job("J1"), 2);
        assert_eq!(index.booking_count("M1"), 1);
        assert_eq!(index.release_job("J0"), 0); // committed bookings stay
    }

    #[test]
    fn test_random_workloads_hold_invariants() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let machines = ["M1", "M2", "M3"];
        let reg = registry(&machines);

        for round in 0..25 {
            let start = at(3 + rng.random_range(0..6), rng.random_range(0..24), 0);
            let mut known = Vec::new();
            for k in 0..rng.random_range(0..4usize) {
                let day = 3 + rng.random_range(0..5);
                let h = rng.random_range(6..18);
                let m = machines[rng.random_range(0..machines.len())];
                let seg = Segment::committed(
                    format!("C{round}-{k}"),
                    format!("X{k}"),
                    m,
                    at(day, h, 0),
                    at(day, h + rng.random_range(1..4), 0),
                );
                if !known.iter().any(|c: &Segment| c.collides_with(&seg)) {
                    known.push(seg);
                }
            }
            let jobs: Vec<Job> = (0..rng.random_range(1..8usize))
                .map(|j| {
                    let mut job = Job::new(format!("J{j}"));
                    for _ in 0..rng.random_range(1..4usize) {
                        let m = machines[rng.random_range(0..machines.len())];
                        job = job.with_step(m, rng.random_range(0.25..20.0));
                    }
                    job
                })
                .collect();

            let placement = SegmentPlanner::new().place(&jobs, &known, &reg, start);
            let all = [known.clone(), placement.drafts.clone()].concat();
            assert!(audit_segments(&all).is_empty(), "round {round}");

            for d in &placement.drafts {
                assert!(d.start >= next_valid_work_time(start));
                assert!(is_work_time(d.start));
                assert!(d.end <= calendar::shift_end(d.start.date()));
            }
            for job in &jobs {
                for (i, step) in job.steps.iter().enumerate() {
                    let placed: f64 = placement
                        .drafts
                        .iter()
                        .filter(|s| s.job_id == job.id && s.step == Some(i))
                        .map(Segment::hours)
                        .sum();
                    assert!((placed - step.hours).abs() <= STEP_TOLERANCE_HOURS, "round {round}");
                }
            }
        }
    }
}
