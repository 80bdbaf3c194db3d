//! Input validation and schedule audits.
//!
//! `validate_input` checks structural integrity of jobs and segments
//! before planning. Detects:
//! - Duplicate IDs
//! - Jobs without steps
//! - Non-positive or non-finite step hours
//! - Segments with `end <= start`
//! - References to machines missing from the registry
//!
//! `audit_segments` inspects a segment set (typically the live timeline)
//! and reports overlaps, out-of-order steps and work outside the shift
//! calendar; `find_delivery_misses` adds late jobs when the job list is
//! at hand. Timeline edits are never blocked; these are advisory.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDateTime;

use crate::models::calendar::{is_work_time, shift_end};
use crate::models::{Job, ResourceRegistry, Segment, Violation};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A step or segment references a machine that isn't registered.
    InvalidResourceReference,
    /// A job has no steps.
    EmptyJob,
    /// A step's hours are zero, negative or not a number.
    InvalidHours,
    /// A segment does not end after it starts.
    InvalidInterval,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates planning input.
///
/// Checks:
/// 1. No duplicate job IDs
/// 2. No duplicate segment IDs
/// 3. Every job has at least one step with positive, finite hours
/// 4. Every machine referenced by a step or segment is registered
/// 5. Every segment ends after it starts
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    jobs: &[Job],
    segments: &[Segment],
    registry: &ResourceRegistry,
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut job_ids = HashSet::new();
    for job in jobs {
        if !job_ids.insert(job.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate job ID: {}", job.id),
            ));
        }

        if job.steps.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyJob,
                format!("Job '{}' has no steps", job.id),
            ));
        }

        for (i, step) in job.steps.iter().enumerate() {
            if !step.hours.is_finite() || step.hours <= 0.0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidHours,
                    format!("Job '{}' step {} has invalid hours {}", job.id, i, step.hours),
                ));
            }
            if !registry.contains(&step.machine) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidResourceReference,
                    format!(
                        "Job '{}' step {} references unknown machine '{}'",
                        job.id, i, step.machine
                    ),
                ));
            }
        }
    }

    let mut segment_ids = HashSet::new();
    for s in segments {
        if !segment_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate segment ID: {}", s.id),
            ));
        }
        if s.end <= s.start {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidInterval,
                format!("Segment '{}' ends at or before its start", s.id),
            ));
        }
        if !registry.contains(&s.machine) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidResourceReference,
                format!("Segment '{}' references unknown machine '{}'", s.id, s.machine),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Audits a segment set. Returns all violations found (empty = clean).
pub fn audit_segments(segments: &[Segment]) -> Vec<Violation> {
    let mut violations = find_overlaps(segments);
    violations.extend(find_precedence_violations(segments));
    violations.extend(find_off_shift(segments));
    violations
}

/// Reports every pair of segments sharing a machine and a moment.
///
/// # Algorithm
/// Sweep per machine: sort by start, compare each segment only with the
/// following ones that start before it ends.
pub fn find_overlaps(segments: &[Segment]) -> Vec<Violation> {
    let mut by_machine: BTreeMap<&str, Vec<&Segment>> = BTreeMap::new();
    for s in segments {
        by_machine.entry(s.machine.as_str()).or_default().push(s);
    }

    let mut violations = Vec::new();
    for (machine, mut list) in by_machine {
        list.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        for (i, a) in list.iter().enumerate() {
            for b in list[i + 1..].iter().take_while(|b| b.start < a.end) {
                if a.collides_with(b) {
                    violations.push(Violation::overlap(
                        &a.id,
                        &b.id,
                        format!("'{}' and '{}' overlap on {}", a.id, b.id, machine),
                    ));
                }
            }
        }
    }
    violations
}

#[derive(Debug)]
struct StepSpan<'a> {
    first_start: NaiveDateTime,
    first_id: &'a str,
    last_end: NaiveDateTime,
    last_id: &'a str,
}

/// Reports steps that start before the previous step of their job ends.
///
/// Only segments that carry a step index take part.
pub fn find_precedence_violations(segments: &[Segment]) -> Vec<Violation> {
    let mut spans: HashMap<&str, BTreeMap<usize, StepSpan<'_>>> = HashMap::new();
    for s in segments {
        let Some(step) = s.step else { continue };
        spans
            .entry(s.job_id.as_str())
            .or_default()
            .entry(step)
            .and_modify(|span| {
                if s.start < span.first_start {
                    span.first_start = s.start;
                    span.first_id = &s.id;
                }
                if s.end > span.last_end {
                    span.last_end = s.end;
                    span.last_id = &s.id;
                }
            })
            .or_insert(StepSpan {
                first_start: s.start,
                first_id: &s.id,
                last_end: s.end,
                last_id: &s.id,
            });
    }

    let mut job_ids: Vec<&str> = spans.keys().copied().collect();
    job_ids.sort_unstable();

    let mut violations = Vec::new();
    for job_id in job_ids {
        let steps: Vec<_> = spans[job_id].values().collect();
        for pair in steps.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if next.first_start < prev.last_end {
                violations.push(Violation::precedence(
                    next.first_id,
                    prev.last_id,
                    format!(
                        "Job '{}': '{}' starts before '{}' ends",
                        job_id, next.first_id, prev.last_id
                    ),
                ));
            }
        }
    }
    violations
}

/// Reports segments not contained in a single working window.
pub fn find_off_shift(segments: &[Segment]) -> Vec<Violation> {
    segments
        .iter()
        .filter(|s| !is_work_time(s.start) || s.end > shift_end(s.start.date()))
        .map(|s| Violation::off_shift(&s.id, format!("'{}' lies outside the shift", s.id)))
        .collect()
}

/// Reports jobs whose last segment ends on a day after their delivery date.
///
/// The violation is reported against that last segment. Jobs without a
/// delivery date or without segments are ignored.
pub fn find_delivery_misses(jobs: &[Job], segments: &[Segment]) -> Vec<Violation> {
    let mut last: HashMap<&str, &Segment> = HashMap::new();
    for s in segments {
        last.entry(s.job_id.as_str())
            .and_modify(|cur| {
                if s.end > cur.end {
                    *cur = s;
                }
            })
            .or_insert(s);
    }

    jobs.iter()
        .filter_map(|job| {
            let due = job.delivery?;
            let seg = last.get(job.id.as_str())?;
            (seg.end.date() > due).then(|| {
                Violation::delivery_miss(
                    &seg.id,
                    format!("Job '{}' finishes {} but is due {}", job.id, seg.end.date(), due),
                )
            })
        })
        .collect()
}
