//! Job store boundary.
//!
//! The edit session hands the store one batch per save: segments to
//! create and segments whose times changed. The store answers item by
//! item. The batch is not a transaction; some items may succeed while
//! others fail.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::models::Segment;

/// New times for an existing segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentUpdate {
    pub id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl From<&Segment> for SegmentUpdate {
    fn from(s: &Segment) -> Self {
        Self {
            id: s.id.clone(),
            start: s.start,
            end: s.end,
        }
    }
}

/// One save request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveBatch {
    /// Drafts to persist.
    pub created: Vec<Segment>,
    /// Committed segments with changed times.
    pub updated: Vec<SegmentUpdate>,
}

impl SaveBatch {
    /// Whether there is nothing to send.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty()
    }

    /// Number of items in the batch.
    pub fn len(&self) -> usize {
        self.created.len() + self.updated.len()
    }
}

/// The store's answer for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub segment_id: String,
    pub result: Result<(), PersistenceError>,
}

impl SaveOutcome {
    pub fn ok(segment_id: impl Into<String>) -> Self {
        Self {
            segment_id: segment_id.into(),
            result: Ok(()),
        }
    }

    pub fn failed(segment_id: impl Into<String>, error: PersistenceError) -> Self {
        Self {
            segment_id: segment_id.into(),
            result: Err(error),
        }
    }
}

/// Per-item results of a save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveReport {
    pub outcomes: Vec<SaveOutcome>,
}

impl SaveReport {
    /// Whether every item was persisted.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Ids of persisted items.
    pub fn succeeded(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.segment_id.as_str())
    }

    /// Failed items with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &PersistenceError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.segment_id.as_str(), e)))
    }
}

/// Persistence for segments.
///
/// Implementations may write the items concurrently; they must report
/// one outcome per item. An item without an outcome counts as failed.
pub trait JobStore {
    fn persist(&mut self, batch: &SaveBatch) -> SaveReport;
}

/// An in-memory store, used by tests and for dry runs.
///
/// Items whose id is listed in `reject` fail with `Rejected`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub segments: Vec<Segment>,
    pub reject: Vec<String>,
    pub batches: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes writes of `segment_id` fail.
    pub fn rejecting(mut self, segment_id: impl Into<String>) -> Self {
        self.reject.push(segment_id.into());
        self
    }

    fn accept(&self, id: &str) -> Result<(), PersistenceError> {
        if self.reject.iter().any(|r| r == id) {
            Err(PersistenceError::Rejected(id.to_string()))
        } else {
            Ok(())
        }
    }
}

impl JobStore for MemoryStore {
    fn persist(&mut self, batch: &SaveBatch) -> SaveReport {
        self.batches += 1;
        let mut report = SaveReport::default();

        for draft in &batch.created {
            let result = self.accept(&draft.id);
            if result.is_ok() {
                let mut stored = draft.clone();
                stored.state = crate::models::SegmentState::Committed;
                self.segments.push(stored);
            }
            report.outcomes.push(SaveOutcome {
                segment_id: draft.id.clone(),
                result,
            });
        }

        for update in &batch.updated {
            let result = self.accept(&update.id).and_then(|()| {
                let stored = self
                    .segments
                    .iter_mut()
                    .find(|s| s.id == update.id)
                    .ok_or_else(|| PersistenceError::Conflict(update.id.clone()))?;
                stored.start = update.start;
                stored.end = update.end;
                Ok(())
            });
            report.outcomes.push(SaveOutcome {
                segment_id: update.id.clone(),
                result,
            });
        }

        report
    }
}
