//! Shop-floor domain models.
//!
//! Provides the data types the planner and the timeline work on, plus
//! the fixed shift calendar.
//!
//! # Domain Mappings
//!
//! | u-shopfloor | Shop floor | Timeline view |
//! |-------------|------------|---------------|
//! | Job | Manufacturing order | Row group |
//! | Step | Operation | - |
//! | Segment | Booked machine time | Bar |
//! | ResourceRegistry | Machine park | Rows |

pub mod calendar;
mod job;
mod resource;
mod segment;
mod violation;

pub use calendar::TimeWindow;
pub use job::{status_tier, Job, Step, UNRANKED_TIER};
pub use resource::ResourceRegistry;
pub use segment::{job_completion, Segment, SegmentState};
pub use violation::{Violation, ViolationType};
