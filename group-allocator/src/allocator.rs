use std::collections::HashSet;
use std::sync::Arc;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument, warn};

use crate::metrics_consts::{
    ALLOCATION_ATTEMPTS_COUNTER, ALLOCATION_RUNS_COUNTER, CONFLICT_GROUPS_GAUGE,
    LOCKED_CONFLICT_GROUPS_GAUGE, MAX_OVERLAP_GAUGE, UNASSIGNED_MEMBERS_COUNTER,
};
use crate::stats::AllocationReport;
use crate::strategy::{AllocationStrategy, GreedyExclusiveStrategy};
use crate::types::{AllocationConfig, AllocationRequest, Distribution, MemberId};

/// Result of one reallocation run.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub distribution: Distribution,
    pub report: AllocationReport,
    /// Attempt (1-based) that produced `distribution`.
    pub attempt: u32,
}

/// Runs a strategy against a request, owning seeding and retry.
///
/// Holds no state between runs; a single allocator may be shared across
/// threads and called concurrently.
pub struct Allocator {
    config: AllocationConfig,
    strategy: Arc<dyn AllocationStrategy>,
}

impl Allocator {
    pub fn new(config: AllocationConfig, strategy: Arc<dyn AllocationStrategy>) -> Self {
        Self { config, strategy }
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// Run with an RNG seeded from `config.seed`, or from entropy when unset.
    pub fn run(&self, request: &AllocationRequest<'_>) -> AllocationOutcome {
        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        self.run_with_rng(request, &mut rng)
    }

    /// Run up to `max_attempts` passes drawing from `rng`, keeping the best.
    ///
    /// Attempts are ranked by [`AllocationReport::ranking_key`]; the earliest
    /// attempt wins ties, so a single attempt is exactly one pass.
    #[instrument(skip_all, fields(members = request.members.len(), groups = request.groups.len()))]
    pub fn run_with_rng(
        &self,
        request: &AllocationRequest<'_>,
        rng: &mut dyn RngCore,
    ) -> AllocationOutcome {
        let no_locks = HashSet::new();
        let locked = if self.config.respect_locks {
            request.locked_member_ids
        } else {
            &no_locks
        };

        let attempts = self.config.max_attempts.max(1);
        let mut outcome = self.attempt(request, locked, rng, 1);
        for attempt in 2..=attempts {
            let candidate = self.attempt(request, locked, rng, attempt);
            if candidate.report.ranking_key() < outcome.report.ranking_key() {
                outcome = candidate;
            }
        }

        self.record(&outcome);
        outcome
    }

    fn attempt(
        &self,
        request: &AllocationRequest<'_>,
        locked: &HashSet<MemberId>,
        rng: &mut dyn RngCore,
        attempt: u32,
    ) -> AllocationOutcome {
        let distribution = self
            .strategy
            .compute_distribution(request, &self.config, rng);
        let report = AllocationReport::build(&distribution, request.members, locked);
        metrics::counter!(ALLOCATION_ATTEMPTS_COUNTER).increment(1);

        AllocationOutcome {
            distribution,
            report,
            attempt,
        }
    }

    fn record(&self, outcome: &AllocationOutcome) {
        let report = &outcome.report;

        metrics::counter!(ALLOCATION_RUNS_COUNTER).increment(1);
        metrics::counter!(UNASSIGNED_MEMBERS_COUNTER).increment(report.unassigned.len() as u64);
        metrics::gauge!(CONFLICT_GROUPS_GAUGE).set(report.conflict_groups as f64);
        metrics::gauge!(LOCKED_CONFLICT_GROUPS_GAUGE).set(report.locked_conflict_groups as f64);
        metrics::gauge!(MAX_OVERLAP_GAUGE).set(report.max_overlap as f64);

        if !report.unassigned.is_empty() {
            warn!(
                unassigned = report.unassigned.len(),
                members = ?report.unassigned,
                "members could not be placed without a profession conflict"
            );
        }
        if report.locked_conflict_groups > 0 {
            warn!(
                groups = report.locked_conflict_groups,
                "locked members already share a profession, left in place"
            );
        }

        info!(
            placed = outcome.distribution.len() - report.unassigned.len(),
            unassigned = report.unassigned.len(),
            conflict_groups = report.conflict_groups,
            max_overlap = report.max_overlap,
            attempt = outcome.attempt,
            "allocation complete"
        );
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new(
            AllocationConfig::default(),
            Arc::new(GreedyExclusiveStrategy::default()),
        )
    }
}

/// One-shot allocation with the greedy exclusive strategy.
pub fn allocate(request: &AllocationRequest<'_>, config: AllocationConfig) -> AllocationOutcome {
    Allocator::new(config, Arc::new(GreedyExclusiveStrategy::default())).run(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::{Group, Member};

    struct EveryoneUnassigned;

    impl AllocationStrategy for EveryoneUnassigned {
        fn compute_distribution(
            &self,
            request: &AllocationRequest<'_>,
            _config: &AllocationConfig,
            _rng: &mut dyn RngCore,
        ) -> Distribution {
            let mut distribution = Distribution::with_groups(request.groups);
            distribution.unassigned = request.members.iter().map(|m| m.id.clone()).collect();
            distribution
        }
    }

    fn fixture() -> (Vec<Member>, Vec<Group>) {
        let members = (0..6)
            .map(|i| Member {
                id: format!("m{i}"),
                display_name: format!("Member {i}"),
                profession: format!("p{}", i % 2),
                previous_group_id: Some(format!("g{}", i % 3)),
            })
            .collect();
        let groups = ["a", "b", "c"]
            .iter()
            .map(|id| Group {
                id: id.to_string(),
                name: id.to_uppercase(),
            })
            .collect();
        (members, groups)
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let (members, groups) = fixture();
        let prior = Distribution::default();
        let locked = HashSet::new();
        let request = AllocationRequest {
            members: &members,
            groups: &groups,
            prior_distribution: &prior,
            locked_member_ids: &locked,
        };
        let config = AllocationConfig {
            seed: Some(42),
            ..AllocationConfig::default()
        };

        let first = allocate(&request, config.clone());
        let second = allocate(&request, config);
        assert_eq!(first.distribution, second.distribution);
        assert_eq!(first.attempt, 1);
    }

    #[test]
    fn zero_attempts_still_runs_once() {
        let (members, groups) = fixture();
        let prior = Distribution::default();
        let locked = HashSet::new();
        let request = AllocationRequest {
            members: &members,
            groups: &groups,
            prior_distribution: &prior,
            locked_member_ids: &locked,
        };
        let config = AllocationConfig {
            max_attempts: 0,
            seed: Some(1),
            ..AllocationConfig::default()
        };

        let outcome = allocate(&request, config);
        assert_eq!(outcome.distribution.len(), members.len());
        assert_eq!(outcome.attempt, 1);
    }

    #[test]
    fn keeps_first_attempt_when_nothing_improves() {
        let (members, groups) = fixture();
        let prior = Distribution::default();
        let locked = HashSet::new();
        let request = AllocationRequest {
            members: &members,
            groups: &groups,
            prior_distribution: &prior,
            locked_member_ids: &locked,
        };
        let allocator = Allocator::new(
            AllocationConfig {
                max_attempts: 5,
                seed: Some(3),
                ..AllocationConfig::default()
            },
            Arc::new(EveryoneUnassigned),
        );

        let outcome = allocator.run(&request);
        assert_eq!(outcome.attempt, 1);
        assert_eq!(outcome.report.unassigned.len(), members.len());
    }

    #[test]
    fn default_allocator_uses_default_config() {
        let allocator = Allocator::default();
        assert_eq!(allocator.config(), &AllocationConfig::default());
    }
}
