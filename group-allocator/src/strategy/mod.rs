mod greedy_exclusive;

pub use greedy_exclusive::{GreedyExclusiveStrategy, ScoreWeights};

use rand::RngCore;

use crate::types::{AllocationConfig, AllocationRequest, Distribution};

/// Trait for group reallocation strategies.
///
/// The allocator calls `compute_distribution` once per attempt. Implementations
/// decide where each member sits; the allocator then scores the result and
/// keeps the best attempt.
pub trait AllocationStrategy: Send + Sync {
    /// Compute a fresh distribution for this period.
    ///
    /// - `request`: members, groups, the prior distribution and locked ids
    /// - `config`: whether locks are honored and overlap is penalized
    /// - `rng`: source for every random tie-break, so callers can fix a seed
    ///
    /// Every distinct member id in `request.members` must appear exactly once
    /// in the result, either in a group or in the overflow bucket.
    fn compute_distribution(
        &self,
        request: &AllocationRequest<'_>,
        config: &AllocationConfig,
        rng: &mut dyn RngCore,
    ) -> Distribution;
}
