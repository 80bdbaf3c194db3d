//! Job ranking: strategies, rules and inclusion filters.
//!
//! Provides ordering rules (status tier, delivery date, workload,
//! grouping), a sequential rule engine, and the named strategies the
//! presentation layer offers to the user.
//!
//! # Usage
//!
//! ```
//! use u_shopfloor::dispatching::{rank, InclusionFilters, RankingOptions, Strategy};
//! use u_shopfloor::models::Job;
//!
//! let jobs = vec![
//!     Job::new("J1").with_step("M1", 2.0).with_status("released"),
//!     Job::new("J2").with_step("M1", 1.0).with_status("rework"),
//!     Job::new("J3"),
//! ];
//! let options = RankingOptions::new()
//!     .with_strategy(Strategy::Delivery)
//!     .with_filters(InclusionFilters::none());
//!
//! let ranking = rank(&jobs, &options);
//! assert_eq!(ranking.ordered[0].id, "J2");
//! assert_eq!(ranking.skipped.len(), 1);
//! ```

mod engine;
mod options;
mod priority;
mod ranker;
pub mod rules;

pub use engine::RuleEngine;
pub use options::{InclusionFilters, RankingOptions, Strategy};
pub use priority::PriorityLevel;
pub use ranker::{rank, Ranking};

use crate::models::Job;
use std::cmp::Ordering;
use std::fmt::Debug;

/// A rule that orders two jobs.
///
/// # Ordering Convention
/// Return `Less` when `a` should be planned before `b`, `Equal` when the
/// rule cannot tell them apart. A rule must be a consistent weak order;
/// the engine turns any chain of rules into a total order.
pub trait RankingRule: Send + Sync + Debug {
    /// Rule name (e.g., "STATUS", "DELIVERY").
    fn name(&self) -> &'static str;

    /// Compares two jobs.
    fn compare(&self, a: &Job, b: &Job) -> Ordering;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
