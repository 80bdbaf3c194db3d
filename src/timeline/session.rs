//! Interactive edit session over a segment timeline.
//!
//! The session owns two segment sets: the **baseline** (what the job
//! store last accepted) and the **working** set (committed segments with
//! the user's unsaved edits, plus drafts). Presentation reads the
//! working set; saving sends the difference to the store.
//!
//! # History
//!
//! Undo and redo are stacks of full working-set snapshots. A gesture
//! (drag, resize) calls [`EditSession::snapshot`] once before it starts
//! mutating; discrete actions (adding drafts, locking) snapshot by
//! themselves. Every new snapshot clears the redo stack. History is
//! bounded by [`HISTORY_DEPTH`].

use std::collections::HashSet;

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info, warn};

use super::lanes::LaneLayout;
use super::store::{JobStore, SaveBatch, SaveReport, SegmentUpdate};
use crate::error::{EditError, EditResult};
use crate::models::calendar::midnight;
use crate::models::{Segment, SegmentState, Violation};
use crate::validation::audit_segments;

/// Shortest duration a resize may leave.
pub const MIN_SEGMENT_MINUTES: i64 = 10;

/// Undo snapshots kept; the oldest is dropped beyond this.
pub const HISTORY_DEPTH: usize = 100;

/// Optimistic timeline state with undo/redo.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    baseline: Vec<Segment>,
    working: Vec<Segment>,
    undo_stack: Vec<Vec<Segment>>,
    redo_stack: Vec<Vec<Segment>>,
}

impl EditSession {
    /// Opens a session over persisted segments.
    ///
    /// Segments passed here are treated as committed whatever their state.
    pub fn new(committed: Vec<Segment>) -> Self {
        let baseline: Vec<Segment> = committed
            .into_iter()
            .map(|mut s| {
                s.state = SegmentState::Committed;
                s
            })
            .collect();
        Self {
            working: baseline.clone(),
            baseline,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// The working set, committed and drafts.
    pub fn segments(&self) -> &[Segment] {
        &self.working
    }

    /// The last persisted set.
    pub fn baseline(&self) -> &[Segment] {
        &self.baseline
    }

    /// Looks up a working segment.
    pub fn segment(&self, id: &str) -> Option<&Segment> {
        self.working.iter().find(|s| s.id == id)
    }

    fn segment_mut(&mut self, id: &str) -> EditResult<&mut Segment> {
        self.working
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| EditError::SegmentNotFound(id.to_string()))
    }

    // ======================== Drafts ========================

    /// Merges planner output into the working set as one undoable action.
    ///
    /// Fails without changing anything if an id is already in use.
    pub fn add_drafts(&mut self, drafts: Vec<Segment>) -> EditResult<usize> {
        let mut ids: HashSet<&str> = self.working.iter().map(|s| s.id.as_str()).collect();
        for d in &drafts {
            if !ids.insert(d.id.as_str()) {
                return Err(EditError::DuplicateSegment(d.id.clone()));
            }
        }

        let count = drafts.len();
        if count == 0 {
            return Ok(0);
        }
        self.snapshot();
        self.working.extend(drafts.into_iter().map(|mut d| {
            d.state = SegmentState::Draft;
            d
        }));
        info!(count, "drafts added to timeline");
        Ok(count)
    }

    /// Adds a single hand-made draft.
    pub fn add_draft(&mut self, draft: Segment) -> EditResult<()> {
        self.add_drafts(vec![draft]).map(|_| ())
    }

    /// Removes a draft from the working set.
    pub fn remove_draft(&mut self, id: &str) -> EditResult<Segment> {
        let pos = self
            .working
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| EditError::SegmentNotFound(id.to_string()))?;
        if self.working[pos].is_committed() {
            return Err(EditError::NotDraft(id.to_string()));
        }
        self.snapshot();
        Ok(self.working.remove(pos))
    }

    /// Drafts in the working set.
    pub fn drafts(&self) -> Vec<&Segment> {
        self.working.iter().filter(|s| s.is_draft()).collect()
    }

    // ======================== Gestures ========================

    /// Records the working set before a user action.
    ///
    /// At most [`HISTORY_DEPTH`] snapshots are kept.
    pub fn snapshot(&mut self) {
        if self.undo_stack.len() >= HISTORY_DEPTH {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(self.working.clone());
        self.redo_stack.clear();
    }

    /// Shifts a segment in time. Collisions are not checked.
    pub fn drag(&mut self, id: &str, delta: Duration) -> EditResult<()> {
        let s = self.segment_mut(id)?;
        s.start += delta;
        s.end += delta;
        Ok(())
    }

    /// Moves the start edge.
    ///
    /// The start stays on the segment's calendar day and at least
    /// [`MIN_SEGMENT_MINUTES`] before the end.
    pub fn resize_start(&mut self, id: &str, delta: Duration) -> EditResult<()> {
        let s = self.segment_mut(id)?;
        let day_start = midnight(s.start.date());
        let latest = s.end - Duration::minutes(MIN_SEGMENT_MINUTES);
        s.start = (s.start + delta).min(latest).max(day_start);
        Ok(())
    }

    /// Moves the end edge.
    ///
    /// The end stays within the start's calendar day (midnight inclusive)
    /// and at least [`MIN_SEGMENT_MINUTES`] after the start.
    pub fn resize_end(&mut self, id: &str, delta: Duration) -> EditResult<()> {
        let s = self.segment_mut(id)?;
        let day_end = midnight(s.start.date()) + Duration::days(1);
        let earliest = s.start + Duration::minutes(MIN_SEGMENT_MINUTES);
        s.end = (s.end + delta).max(earliest).min(day_end);
        Ok(())
    }

    /// Pins or unpins a committed segment.
    pub fn toggle_lock(&mut self, id: &str, locked: bool) -> EditResult<()> {
        let seg = self
            .segment(id)
            .ok_or_else(|| EditError::SegmentNotFound(id.to_string()))?;
        if seg.is_draft() {
            return Err(EditError::NotCommitted(id.to_string()));
        }
        if seg.locked == locked {
            return Ok(());
        }
        self.snapshot();
        self.segment_mut(id)?.locked = locked;
        Ok(())
    }

    // ======================== History ========================

    /// Restores the state before the last action.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(previous) => {
                let current = std::mem::replace(&mut self.working, previous);
                self.redo_stack.push(current);
                true
            }
            None => false,
        }
    }

    /// Re-applies the last undone action.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                let current = std::mem::replace(&mut self.working, next);
                self.undo_stack.push(current);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    // ======================== Diff / persistence ========================

    /// Committed segments whose times differ from the baseline.
    ///
    /// Matched by id. Drafts are reported by [`drafts`](Self::drafts).
    pub fn dirty_set(&self) -> Vec<&Segment> {
        self.working
            .iter()
            .filter(|s| s.is_committed())
            .filter(|s| {
                self.baseline
                    .iter()
                    .find(|b| b.id == s.id)
                    .is_some_and(|b| b.start != s.start || b.end != s.end)
            })
            .collect()
    }

    /// Whether a save would send anything.
    pub fn has_unsaved_changes(&self) -> bool {
        self.working.iter().any(Segment::is_draft) || !self.dirty_set().is_empty()
    }

    /// The batch a save would send.
    pub fn pending_batch(&self) -> SaveBatch {
        SaveBatch {
            created: self.drafts().into_iter().cloned().collect(),
            updated: self.dirty_set().into_iter().map(SegmentUpdate::from).collect(),
        }
    }

    /// Sends drafts and dirty segments to the store.
    ///
    /// Items the store accepted are folded into the baseline (drafts
    /// become committed). Failed items, and items the report does not
    /// mention, stay pending for the next save. History is cleared once
    /// anything was persisted, since older snapshots no longer match the
    /// store.
    pub fn save<S: JobStore + ?Sized>(&mut self, store: &mut S) -> SaveReport {
        let batch = self.pending_batch();
        if batch.is_empty() {
            debug!("save skipped, nothing pending");
            return SaveReport::default();
        }

        let report = store.persist(&batch);
        for (id, err) in report.failures() {
            warn!(segment = id, error = %err, "segment not persisted");
        }

        // only outcomes for items of this batch count
        let reported: HashSet<&str> = report.succeeded().collect();
        let confirmed: HashSet<&str> = batch
            .created
            .iter()
            .map(|s| s.id.as_str())
            .chain(batch.updated.iter().map(|u| u.id.as_str()))
            .filter(|id| reported.contains(id))
            .collect();
        if confirmed.is_empty() {
            return report;
        }

        for seg in self.working.iter_mut() {
            if !confirmed.contains(seg.id.as_str()) {
                continue;
            }
            seg.state = SegmentState::Committed;
            match self.baseline.iter_mut().find(|b| b.id == seg.id) {
                Some(b) => *b = seg.clone(),
                None => self.baseline.push(seg.clone()),
            }
        }

        if confirmed.len() == batch.len() {
            self.baseline = self.working.clone();
        }
        self.undo_stack.clear();
        self.redo_stack.clear();

        info!(
            persisted = confirmed.len(),
            pending = batch.len() - confirmed.len(),
            "timeline saved"
        );
        report
    }

    /// Drops all unsaved edits and drafts.
    pub fn discard(&mut self) {
        self.working = self.baseline.clone();
        self.undo_stack.clear();
        self.redo_stack.clear();
        debug!("timeline edits discarded");
    }

    // ======================== Derived views ========================

    /// Overlap, ordering and off-shift alerts on the working set.
    pub fn conflicts(&self) -> Vec<Violation> {
        audit_segments(&self.working)
    }

    /// Committed segments re-planning must keep: locked or already started.
    pub fn planning_obstacles(&self, now: NaiveDateTime) -> Vec<Segment> {
        self.working
            .iter()
            .filter(|s| s.is_committed() && (s.locked || s.has_started(now)))
            .cloned()
            .collect()
    }

    /// Committed segments re-planning may move.
    pub fn replannable(&self, now: NaiveDateTime) -> Vec<Segment> {
        self.working
            .iter()
            .filter(|s| s.is_committed() && !s.locked && !s.has_started(now))
            .cloned()
            .collect()
    }

    /// Lane layout of the working set.
    pub fn layout(&self) -> LaneLayout {
        LaneLayout::allocate(&self.working)
    }
}
