//! Job ranking: exclusion, then ordering.

use tracing::debug;

use super::RankingOptions;
use crate::error::{SkipReason, Skipped};
use crate::models::Job;

/// Result of a ranking run.
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    /// Jobs to plan, highest priority first.
    pub ordered: Vec<Job>,
    /// Jobs excluded before planning.
    pub skipped: Vec<Skipped>,
}

/// Orders jobs for planning.
///
/// 1. Jobs without a process plan are excluded unconditionally.
/// 2. Jobs failing an enabled inclusion filter are excluded.
/// 3. The rest are sorted by the strategy's rule chain.
///
/// Exclusions are reported in `skipped` in input order; nothing here fails.
pub fn rank(jobs: &[Job], options: &RankingOptions) -> Ranking {
    let mut ranking = Ranking::default();

    for job in jobs {
        if !job.has_steps() {
            debug!(job = %job.id, "skipping job without process plan");
            ranking
                .skipped
                .push(Skipped::new(&job.id, SkipReason::NoStepPlan));
            continue;
        }
        if let Some(filter) = options.filters.first_failure(job) {
            debug!(job = %job.id, filter, "job filtered out");
            ranking.skipped.push(Skipped::new(
                &job.id,
                SkipReason::FilteredOut {
                    filter: filter.to_string(),
                },
            ));
            continue;
        }
        ranking.ordered.push(job.clone());
    }

    options.strategy.engine().sort(&mut ranking.ordered);
    debug!(
        strategy = %options.strategy,
        ranked = ranking.ordered.len(),
        skipped = ranking.skipped.len(),
        "ranked jobs"
    );
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::{InclusionFilters, Strategy};
    use chrono::NaiveDate;

    fn due(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn ids(r: &Ranking) -> Vec<&str> {
        r.ordered.iter().map(|j| j.id.as_str()).collect()
    }

    fn sample_jobs() -> Vec<Job> {
        vec![
            Job::new("J1")
                .with_step("M1", 4.0)
                .with_status("released")
                .with_delivery(due(20))
                .with_project("P2")
                .ready(),
            Job::new("J2")
                .with_step("M1", 1.0)
                .with_status("rework")
                .with_delivery(due(25))
                .with_project("P1")
                .ready(),
            Job::new("J3")
                .with_step("M2", 2.0)
                .with_step("M1", 6.0)
                .with_status("released")
                .with_delivery(due(12))
                .with_treatment("galvanizing"),
            Job::new("J4")
                .with_step("M2", 0.5)
                .with_status("quoted"),
        ]
    }

    #[test]
    fn test_delivery_strategy() {
        let r = rank(&sample_jobs(), &RankingOptions::new());
        // rework tier 2 first; released tier 5 by date; unknown status last
        assert_eq!(ids(&r), vec!["J2", "J3", "J1", "J4"]);
        assert!(r.skipped.is_empty());
    }

    #[test]
    fn test_workload_strategies() {
        let jobs = sample_jobs();
        let swk = rank(&jobs, &RankingOptions::new().with_strategy(Strategy::ShortestWork));
        assert_eq!(ids(&swk), vec!["J4", "J2", "J1", "J3"]);

        let lwk = rank(&jobs, &RankingOptions::new().with_strategy(Strategy::LongestWork));
        assert_eq!(ids(&lwk), vec!["J3", "J1", "J2", "J4"]);
    }

    #[test]
    fn test_grouping_strategies() {
        let jobs = sample_jobs();
        let project = rank(&jobs, &RankingOptions::new().with_strategy(Strategy::Project));
        // P1, P2, then jobs without a project by tier/date
        assert_eq!(ids(&project), vec!["J2", "J1", "J3", "J4"]);

        let treatment = rank(&jobs, &RankingOptions::new().with_strategy(Strategy::Treatment));
        assert_eq!(ids(&treatment)[0], "J3");
    }

    #[test]
    fn test_no_step_plan_always_skipped() {
        let mut jobs = sample_jobs();
        jobs.push(Job::new("EMPTY").with_status("rework"));
        let r = rank(&jobs, &RankingOptions::new());
        assert!(!ids(&r).contains(&"EMPTY"));
        assert_eq!(r.skipped, vec![Skipped::new("EMPTY", SkipReason::NoStepPlan)]);
    }

    #[test]
    fn test_filters_record_reason() {
        let opts = RankingOptions::new().with_filters(InclusionFilters::none().with_model());
        let r = rank(&sample_jobs(), &opts);
        assert_eq!(ids(&r), vec!["J2", "J1"]);
        assert_eq!(r.skipped.len(), 2);
        assert_eq!(r.skipped[0].job_id, "J3");
        assert_eq!(r.skipped[0].reason.to_string(), "filtered out: 3-D model");
    }

    #[test]
    fn test_deterministic_for_identical_input() {
        let jobs: Vec<Job> = (0..20)
            .map(|i| Job::new(format!("J{i:02}")).with_step("M1", 1.0))
            .collect();
        let mut reversed = jobs.clone();
        reversed.reverse();
        for st in Strategy::ALL {
            let opts = RankingOptions::new().with_strategy(st);
            assert_eq!(ids(&rank(&jobs, &opts)), ids(&rank(&reversed, &opts)));
        }
    }
}
