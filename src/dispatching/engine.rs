//! Rule engine for multi-criteria job ranking.
//!
//! Applies ranking rules in sequence: the next rule is consulted only
//! when all previous rules tie. A final comparison on job id makes every
//! rule chain a total order, so identical input always ranks identically.

use std::cmp::Ordering;
use std::sync::Arc;

use super::RankingRule;
use crate::models::Job;

/// A composable, sequential rule chain.
///
/// # Example
/// ```
/// use u_shopfloor::dispatching::{rules, RuleEngine};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::StatusTier)
///     .with_rule(rules::DeliveryDate);
/// assert_eq!(engine.rule_names(), vec!["STATUS", "DELIVERY"]);
/// ```
#[derive(Clone, Default)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn RankingRule>>,
}

impl RuleEngine {
    /// Creates an empty rule engine (orders by job id only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule to the chain.
    pub fn with_rule<R: RankingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Names of the rules in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Compares two jobs through the chain, then by id.
    pub fn compare(&self, a: &Job, b: &Job) -> Ordering {
        self.rules
            .iter()
            .map(|rule| rule.compare(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }

    /// Returns indices into `jobs`, highest priority first.
    pub fn sort_indices(&self, jobs: &[Job]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..jobs.len()).collect();
        indices.sort_by(|&a, &b| self.compare(&jobs[a], &jobs[b]));
        indices
    }

    /// Sorts jobs in place, highest priority first.
    pub fn sort(&self, jobs: &mut [Job]) {
        jobs.sort_by(|a, b| self.compare(a, b));
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::rules;
    use chrono::NaiveDate;

    fn make_job(id: &str, status: &str, due_day: Option<u32>) -> Job {
        let mut job = Job::new(id).with_status(status).with_step("M1", 1.0);
        job.delivery = due_day.and_then(|d| NaiveDate::from_ymd_opt(2024, 6, d));
        job
    }

    #[test]
    fn test_sequential_fallthrough() {
        let jobs = vec![
            make_job("A", "released", Some(20)),
            make_job("B", "released", Some(10)), // same tier as A, earlier date
            make_job("C", "rework", Some(28)),
        ];
        let engine = RuleEngine::new()
            .with_rule(rules::StatusTier)
            .with_rule(rules::DeliveryDate);

        let order: Vec<&str> = engine
            .sort_indices(&jobs)
            .into_iter()
            .map(|i| jobs[i].id.as_str())
            .collect();
        assert_eq!(order, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_id_tie_break() {
        let jobs = vec![make_job("B", "", None), make_job("A", "", None)];
        let engine = RuleEngine::new().with_rule(rules::DeliveryDate);
        let indices = engine.sort_indices(&jobs);
        assert_eq!(jobs[indices[0]].id, "A");
    }

    #[test]
    fn test_empty_engine_orders_by_id() {
        let mut jobs = vec![make_job("Z", "", None), make_job("M", "", None)];
        RuleEngine::new().sort(&mut jobs);
        assert_eq!(jobs[0].id, "M");
    }

    #[test]
    fn test_empty_jobs() {
        let engine = RuleEngine::new().with_rule(rules::StatusTier);
        assert!(engine.sort_indices(&[]).is_empty());
    }

    #[test]
    fn test_debug_lists_rules() {
        let engine = RuleEngine::new().with_rule(rules::ShortestWork);
        assert!(format!("{engine:?}").contains("SWK"));
    }
}
