//! Delivery urgency buckets for display.
//!
//! The level does not influence ranking; it colors jobs in the view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Urgency of a job relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityLevel {
    /// Delivery date has passed.
    Critical,
    /// Due within 3 days.
    Soon,
    /// Due within 10 days.
    Normal,
    /// Due later, or no date at all.
    Plenty,
}

impl PriorityLevel {
    /// Buckets a delivery date by whole days from `today`.
    pub fn classify(delivery: Option<NaiveDate>, today: NaiveDate) -> Self {
        let Some(delivery) = delivery else {
            return PriorityLevel::Plenty;
        };
        match (delivery - today).num_days() {
            d if d < 0 => PriorityLevel::Critical,
            0..=3 => PriorityLevel::Soon,
            4..=10 => PriorityLevel::Normal,
            _ => PriorityLevel::Plenty,
        }
    }
}
