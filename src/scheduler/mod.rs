//! Segment planning and run metrics.
//!
//! # Algorithm
//!
//! `SegmentPlanner` is a greedy, single-pass bin-packer over the shift
//! calendar. Jobs are taken in ranked order and their steps placed as
//! early as machine availability, step order and shift windows allow.
//! It is deterministic but not optimal.
//!
//! # KPI
//!
//! `PlanSummary` reports draft count, scheduled hours, late jobs and
//! average lead time for a run.

mod kpi;
mod planner;

pub use kpi::PlanSummary;
pub use planner::{
    MachineIndex, PlanOutcome, PlanRequest, Placement, SegmentPlanner, STEP_TOLERANCE_HOURS,
};
