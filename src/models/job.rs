//! Job (manufacturing order) model.
//!
//! A job is an ordered list of process steps, each bound to one machine
//! for a number of hours. The order of the list is the dependency order:
//! step *i+1* may not start before step *i* has finished.
//!
//! Jobs are read-only inputs. The surrounding application creates and
//! edits them; this crate only ranks and plans them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tier assigned to status codes that are not in the priority table.
pub const UNRANKED_TIER: u32 = 99;

/// Status codes with an elevated tier (lower = more urgent).
const STATUS_TIERS: &[(&str, u32)] = &[
    ("rework", 2),
    ("expedite", 3),
    ("in_progress", 4),
    ("released", 5),
];

/// One processing step: a machine and the hours it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Machine identifier.
    pub machine: String,
    /// Required processing hours.
    pub hours: f64,
}

impl Step {
    /// Creates a new step.
    pub fn new(machine: impl Into<String>, hours: f64) -> Self {
        Self {
            machine: machine.into(),
            hours,
        }
    }
}

/// A manufacturing job to be scheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: String,
    /// Process plan in dependency order.
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Status code (see [`Job::status_tier`]).
    #[serde(default)]
    pub status: String,
    /// Promised delivery date.
    #[serde(default)]
    pub delivery: Option<NaiveDate>,
    /// Project or grouping key.
    #[serde(default)]
    pub project: Option<String>,
    /// Material type.
    #[serde(default)]
    pub material: Option<String>,
    /// External treatment the job is sent out for (e.g. "anodizing").
    #[serde(default)]
    pub treatment: Option<String>,
    /// A 3-D model exists for the part.
    #[serde(default)]
    pub has_model: bool,
    /// The blueprint has been released to the shop.
    #[serde(default)]
    pub blueprint_released: bool,
    /// Raw material is on hand.
    #[serde(default)]
    pub material_available: bool,
}

impl Job {
    /// Creates a job with no steps and no priority attributes.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            steps: Vec::new(),
            status: String::new(),
            delivery: None,
            project: None,
            material: None,
            treatment: None,
            has_model: false,
            blueprint_released: false,
            material_available: false,
        }
    }

    /// Appends a step.
    pub fn with_step(mut self, machine: impl Into<String>, hours: f64) -> Self {
        self.steps.push(Step::new(machine, hours));
        self
    }

    /// Sets the status code.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Sets the delivery date.
    pub fn with_delivery(mut self, delivery: NaiveDate) -> Self {
        self.delivery = Some(delivery);
        self
    }

    /// Sets the project key.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Sets the material type.
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    /// Sets the external treatment.
    pub fn with_treatment(mut self, treatment: impl Into<String>) -> Self {
        self.treatment = Some(treatment.into());
        self
    }

    /// Marks the job as ready on every filter: model, blueprint and material.
    pub fn ready(mut self) -> Self {
        self.has_model = true;
        self.blueprint_released = true;
        self.material_available = true;
        self
    }

    /// Numeric tier of the status code. Lower is more urgent.
    pub fn status_tier(&self) -> u32 {
        status_tier(&self.status)
    }

    /// Sum of step hours.
    pub fn total_hours(&self) -> f64 {
        self.steps.iter().map(|s| s.hours).sum()
    }

    /// Whether this job has a usable process plan.
    pub fn has_steps(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Whether the job includes an external treatment.
    pub fn needs_treatment(&self) -> bool {
        self.treatment.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Maps a status code to its tier (case-insensitive).
pub fn status_tier(code: &str) -> u32 {
    let code = code.trim();
    STATUS_TIERS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|&(_, tier)| tier)
        .unwrap_or(UNRANKED_TIER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_builder() {
        let job = Job::new("J1")
            .with_step("M1", 2.0)
            .with_step("M2", 1.5)
            .with_status("expedite")
            .with_delivery(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap())
            .with_project("P-7")
            .with_treatment("anodizing")
            .ready();

        assert_eq!(job.id, "J1");
        assert_eq!(job.steps.len(), 2);
        assert_eq!(job.steps[1], Step::new("M2", 1.5));
        assert!((job.total_hours() - 3.5).abs() < 1e-10);
        assert_eq!(job.status_tier(), 3);
        assert!(job.needs_treatment());
        assert!(job.has_model && job.blueprint_released && job.material_available);
    }

    #[test]
    fn test_status_tiers() {
        assert_eq!(status_tier("rework"), 2);
        assert_eq!(status_tier("RELEASED"), 5);
        assert_eq!(status_tier(" in_progress "), 4);
        assert_eq!(status_tier("quoted"), UNRANKED_TIER);
        assert_eq!(status_tier(""), UNRANKED_TIER);
    }

    #[test]
    fn test_job_empty() {
        let job = Job::new("empty");
        assert!(!job.has_steps());
        assert_eq!(job.total_hours(), 0.0);
        assert!(!job.needs_treatment());
    }

    #[test]
    fn test_blank_treatment_is_none() {
        let job = Job::new("J1").with_treatment("  ");
        assert!(!job.needs_treatment());
    }

    #[test]
    fn test_job_from_json() {
        let job: Job = serde_json::from_str(
            r#"{"id":"J9","steps":[{"machine":"M1","hours":4.0}],"status":"rework","delivery":"2024-06-12"}"#,
        )
        .unwrap();
        assert_eq!(job.steps[0].machine, "M1");
        assert_eq!(job.delivery, NaiveDate::from_ymd_opt(2024, 6, 12));
        assert!(!job.has_model);
    }
}
