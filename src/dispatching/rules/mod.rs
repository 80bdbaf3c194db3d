//! Built-in ranking rules.
//!
//! # Categories
//!
//! - **Urgency**: STATUS (status tier), DELIVERY (earliest delivery date)
//! - **Workload**: SWK (shortest work first), LWK (longest work first)
//! - **Grouping**: PROJECT, MATERIAL, TREATMENT
//!
//! # Ordering Convention
//! `compare(a, b) == Less` means `a` is scheduled before `b`. Rules
//! report `Equal` on ties so the engine can fall through to the next rule.
//! Missing attributes (no delivery date, no project) always sort last.

use std::cmp::Ordering;

use super::RankingRule;
use crate::models::Job;

/// Compares optional keys, placing `None` after every `Some`.
fn missing_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ======================== Urgency rules ========================

/// Status tier ascending.
///
/// Jobs with a known elevated status (rework, expedite, ...) come first;
/// unrecognized codes share the lowest tier.
#[derive(Debug, Clone, Copy)]
pub struct StatusTier;

impl RankingRule for StatusTier {
    fn name(&self) -> &'static str {
        "STATUS"
    }

    fn compare(&self, a: &Job, b: &Job) -> Ordering {
        a.status_tier().cmp(&b.status_tier())
    }

    fn description(&self) -> &'static str {
        "Status tier"
    }
}

/// Earliest delivery date first. Jobs without a date go last.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryDate;

impl RankingRule for DeliveryDate {
    fn name(&self) -> &'static str {
        "DELIVERY"
    }

    fn compare(&self, a: &Job, b: &Job) -> Ordering {
        missing_last(a.delivery, b.delivery)
    }

    fn description(&self) -> &'static str {
        "Earliest Delivery Date"
    }
}

// ======================== Workload rules ========================

/// Shortest total work first.
#[derive(Debug, Clone, Copy)]
pub struct ShortestWork;

impl RankingRule for ShortestWork {
    fn name(&self) -> &'static str {
        "SWK"
    }

    fn compare(&self, a: &Job, b: &Job) -> Ordering {
        a.total_hours().total_cmp(&b.total_hours())
    }

    fn description(&self) -> &'static str {
        "Shortest Work"
    }
}

/// Longest total work first.
#[derive(Debug, Clone, Copy)]
pub struct LongestWork;

impl RankingRule for LongestWork {
    fn name(&self) -> &'static str {
        "LWK"
    }

    fn compare(&self, a: &Job, b: &Job) -> Ordering {
        b.total_hours().total_cmp(&a.total_hours())
    }

    fn description(&self) -> &'static str {
        "Longest Work"
    }
}

// ======================== Grouping rules ========================

/// Groups jobs of the same project together, projects in key order.
#[derive(Debug, Clone, Copy)]
pub struct ProjectKey;

impl RankingRule for ProjectKey {
    fn name(&self) -> &'static str {
        "PROJECT"
    }

    fn compare(&self, a: &Job, b: &Job) -> Ordering {
        missing_last(a.project.as_deref(), b.project.as_deref())
    }

    fn description(&self) -> &'static str {
        "Project grouping"
    }
}

/// Groups jobs by material type.
#[derive(Debug, Clone, Copy)]
pub struct MaterialKey;

impl RankingRule for MaterialKey {
    fn name(&self) -> &'static str {
        "MATERIAL"
    }

    fn compare(&self, a: &Job, b: &Job) -> Ordering {
        missing_last(a.material.as_deref(), b.material.as_deref())
    }

    fn description(&self) -> &'static str {
        "Material grouping"
    }
}

/// Jobs that go out for external treatment first.
///
/// They carry the longest outside lead time, so their in-house steps
/// should be done early.
#[derive(Debug, Clone, Copy)]
pub struct TreatmentFirst;

impl RankingRule for TreatmentFirst {
    fn name(&self) -> &'static str {
        "TREATMENT"
    }

    fn compare(&self, a: &Job, b: &Job) -> Ordering {
        // true sorts before false
        b.needs_treatment().cmp(&a.needs_treatment())
    }

    fn description(&self) -> &'static str {
        "External treatment first"
    }
}
