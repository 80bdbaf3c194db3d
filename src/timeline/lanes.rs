//! Lane allocation for overlapping segments.
//!
//! Segments on the same machine may overlap (drafts dragged onto each
//! other, conflicting imports). To draw them without covering each
//! other, every segment gets a lane within its (machine, day) group.
//!
//! # Algorithm
//! Greedy interval partitioning: sort the group by start, put each
//! segment in the lowest lane whose last end is at or before its start,
//! or open a new lane. The lane count equals the largest number of
//! segments active at one instant, which is the minimum possible.
//!
//! # Reference
//! Kleinberg & Tardos (2005), "Algorithm Design", Ch. 4.1 (Interval Partitioning)

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::Segment;

/// Lane assignment for a segment set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaneLayout {
    lanes: HashMap<String, usize>,
    group_lanes: BTreeMap<String, BTreeMap<NaiveDate, usize>>,
}

impl LaneLayout {
    /// Assigns a lane to every segment.
    pub fn allocate(segments: &[Segment]) -> Self {
        let mut groups: BTreeMap<(&str, NaiveDate), Vec<&Segment>> = BTreeMap::new();
        for s in segments {
            groups.entry((s.machine.as_str(), s.day())).or_default().push(s);
        }

        let mut layout = Self::default();
        for ((machine, day), mut group) in groups {
            group.sort_by(|a, b| {
                a.start
                    .cmp(&b.start)
                    .then_with(|| a.end.cmp(&b.end))
                    .then_with(|| a.id.cmp(&b.id))
            });

            let mut lane_ends: Vec<NaiveDateTime> = Vec::new();
            for s in group {
                let lane = match lane_ends.iter().position(|&end| end <= s.start) {
                    Some(free) => free,
                    None => {
                        lane_ends.push(s.start);
                        lane_ends.len() - 1
                    }
                };
                lane_ends[lane] = s.end;
                layout.lanes.insert(s.id.clone(), lane);
            }

            layout
                .group_lanes
                .entry(machine.to_string())
                .or_default()
                .insert(day, lane_ends.len());
        }
        layout
    }

    /// Lane index of a segment.
    pub fn lane_of(&self, segment_id: &str) -> Option<usize> {
        self.lanes.get(segment_id).copied()
    }

    /// Lanes used on `machine` on `day` (0 when empty).
    pub fn lanes_in(&self, machine: &str, day: NaiveDate) -> usize {
        self.group_lanes
            .get(machine)
            .and_then(|days| days.get(&day))
            .copied()
            .unwrap_or(0)
    }

    /// Lanes a machine row needs: the peak over all days, at least one.
    pub fn machine_lanes(&self, machine: &str) -> usize {
        self.group_lanes
            .get(machine)
            .and_then(|days| days.values().max())
            .copied()
            .unwrap_or(0)
            .max(1)
    }

    /// Row height for a machine, stable across the visible range.
    pub fn row_height(&self, machine: &str, lane_height: f32, padding: f32) -> f32 {
        self.machine_lanes(machine) as f32 * lane_height + 2.0 * padding
    }
}
