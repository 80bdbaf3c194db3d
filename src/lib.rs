//! Shop-floor scheduling and timeline engine.
//!
//! Ranks manufacturing jobs, places their process steps on machines
//! inside a fixed shift calendar, lays overlapping segments out in lanes
//! and tracks interactive timeline edits until they are saved.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Job`, `Step`, `Segment`,
//!   `ResourceRegistry`, `Violation`, and the shift calendar
//! - **`dispatching`**: Ranking strategies and inclusion filters
//! - **`scheduler`**: Greedy segment planner and run summary
//! - **`timeline`**: Lane layout, edit session with undo/redo, job store boundary
//! - **`validation`**: Input integrity checks and segment audits
//! - **`error`**: Skip reasons and error types
//!
//! # Pipeline
//!
//! ```text
//! jobs + registry ─▶ rank ─▶ SegmentPlanner ─▶ drafts ─▶ EditSession ─▶ JobStore
//!                                   ▲                        │
//!                      committed ───┘                        └─▶ LaneLayout
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Kleinberg & Tardos (2005), "Algorithm Design"

pub mod dispatching;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod timeline;
pub mod validation;
