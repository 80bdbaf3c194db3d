//! Ranking configuration: strategy selection and inclusion filters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::rules;
use super::RuleEngine;
use crate::error::ParseStrategyError;
use crate::models::Job;

/// Named ranking strategies.
///
/// Each strategy is a fixed rule chain (see [`Strategy::engine`]); all of
/// them end with a tie-break on job id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Status tier, then delivery date.
    #[default]
    Delivery,
    /// Status tier only.
    Status,
    /// Least total work first, then delivery date.
    ShortestWork,
    /// Most total work first, then delivery date.
    LongestWork,
    /// Grouped by project, then status tier and delivery date.
    Project,
    /// Jobs with an external treatment first, then status tier and delivery date.
    Treatment,
    /// Grouped by material type, then status tier and delivery date.
    Material,
}

impl Strategy {
    /// All strategies, in menu order.
    pub const ALL: [Strategy; 7] = [
        Strategy::Delivery,
        Strategy::Status,
        Strategy::ShortestWork,
        Strategy::LongestWork,
        Strategy::Project,
        Strategy::Treatment,
        Strategy::Material,
    ];

    /// Stable identifier used in configuration and by the presentation layer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Delivery => "delivery",
            Strategy::Status => "status",
            Strategy::ShortestWork => "shortest_work",
            Strategy::LongestWork => "longest_work",
            Strategy::Project => "project",
            Strategy::Treatment => "treatment",
            Strategy::Material => "material",
        }
    }

    /// Builds the rule chain for this strategy.
    pub fn engine(&self) -> RuleEngine {
        let engine = RuleEngine::new();
        match self {
            Strategy::Delivery => engine
                .with_rule(rules::StatusTier)
                .with_rule(rules::DeliveryDate),
            Strategy::Status => engine.with_rule(rules::StatusTier),
            Strategy::ShortestWork => engine
                .with_rule(rules::ShortestWork)
                .with_rule(rules::DeliveryDate),
            Strategy::LongestWork => engine
                .with_rule(rules::LongestWork)
                .with_rule(rules::DeliveryDate),
            Strategy::Project => engine
                .with_rule(rules::ProjectKey)
                .with_rule(rules::StatusTier)
                .with_rule(rules::DeliveryDate),
            Strategy::Treatment => engine
                .with_rule(rules::TreatmentFirst)
                .with_rule(rules::StatusTier)
                .with_rule(rules::DeliveryDate),
            Strategy::Material => engine
                .with_rule(rules::MaterialKey)
                .with_rule(rules::StatusTier)
                .with_rule(rules::DeliveryDate),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Strategy::ALL
            .into_iter()
            .find(|st| st.as_str() == key)
            .ok_or_else(|| ParseStrategyError(s.to_string()))
    }
}

/// Predicates a job must pass to be planned at all.
///
/// Every filter is off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InclusionFilters {
    /// Require a 3-D model.
    pub require_model: bool,
    /// Require a released blueprint.
    pub require_blueprint: bool,
    /// Require material on hand.
    pub require_material: bool,
    /// Only plan jobs that include an external treatment.
    pub require_treatment: bool,
}

impl InclusionFilters {
    /// No filters.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_model(mut self) -> Self {
        self.require_model = true;
        self
    }

    pub fn with_blueprint(mut self) -> Self {
        self.require_blueprint = true;
        self
    }

    pub fn with_material(mut self) -> Self {
        self.require_material = true;
        self
    }

    pub fn with_treatment(mut self) -> Self {
        self.require_treatment = true;
        self
    }

    /// Label of the first enabled filter `job` fails, if any.
    pub fn first_failure(&self, job: &Job) -> Option<&'static str> {
        let checks = [
            (self.require_model, job.has_model, "3-D model"),
            (self.require_blueprint, job.blueprint_released, "released blueprint"),
            (self.require_material, job.material_available, "available material"),
            (self.require_treatment, job.needs_treatment(), "external treatment"),
        ];
        checks
            .into_iter()
            .find(|&(enabled, passes, _)| enabled && !passes)
            .map(|(_, _, label)| label)
    }
}

/// Options for a ranking run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingOptions {
    pub strategy: Strategy,
    pub filters: InclusionFilters,
}

impl RankingOptions {
    /// Default strategy, no filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the inclusion filters.
    pub fn with_filters(mut self, filters: InclusionFilters) -> Self {
        self.filters = filters;
        self
    }
}
