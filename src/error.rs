//! Error types.
//!
//! Expected planning outcomes (a filtered job, an unknown machine, an
//! empty process plan) are not failures: they are reported as
//! [`SkipReason`]s in skip lists. Hard errors only come from the job
//! store boundary and from edits addressing segments that do not exist.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a job did not reach (or did not survive) planning.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("no process plan")]
    NoStepPlan,

    #[error("filtered out: {filter}")]
    FilteredOut { filter: String },

    #[error("unknown machine: {machine}")]
    UnknownResource { machine: String },
}

/// A job excluded from a ranking or planning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skipped {
    pub job_id: String,
    pub reason: SkipReason,
}

impl Skipped {
    pub fn new(job_id: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            job_id: job_id.into(),
            reason,
        }
    }
}

/// Errors from timeline edit operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("segment not found: {0}")]
    SegmentNotFound(String),

    #[error("segment is a draft and cannot be locked: {0}")]
    NotCommitted(String),

    #[error("segment is committed and cannot be removed: {0}")]
    NotDraft(String),

    #[error("segment id already in use: {0}")]
    DuplicateSegment(String),
}

pub type EditResult<T> = Result<T, EditError>;

/// A single write rejected by the job store.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "segment", rename_all = "snake_case")]
pub enum PersistenceError {
    #[error("segment rejected: {0}")]
    Rejected(String),

    #[error("conflicting update for segment {0}")]
    Conflict(String),

    #[error("job store unavailable: {0}")]
    Unavailable(String),
}

/// A strategy name that does not match any ranking strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown ranking strategy: {0}")]
pub struct ParseStrategyError(pub String);
