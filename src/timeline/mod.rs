//! Interactive timeline: lane layout, edit session and the store boundary.
//!
//! `EditSession` is the single source of truth for what the timeline
//! shows. `LaneLayout` is derived from its working set on demand.

mod lanes;
mod session;
mod store;

pub use lanes::LaneLayout;
pub use session::{EditSession, HISTORY_DEPTH, MIN_SEGMENT_MINUTES};
pub use store::{JobStore, MemoryStore, SaveBatch, SaveOutcome, SaveReport, SegmentUpdate};
