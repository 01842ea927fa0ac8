use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::iter;

use rand::seq::SliceRandom;
use rand::RngCore;
use tracing::{debug, warn};

use super::AllocationStrategy;
use crate::types::{
    AllocationConfig, AllocationRequest, Distribution, Member, MemberId, UNASSIGNED_GROUP_ID,
};

/// Weights of the soft placement score.
///
/// Overlap dominates size when both are contested, size still breaks
/// near-ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWeights {
    pub size: u64,
    pub overlap: u64,
}

impl ScoreWeights {
    pub fn new(size: u64, overlap: u64) -> Self {
        Self { size, overlap }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            size: 10,
            overlap: 50,
        }
    }
}

/// Single-pass greedy placement under profession exclusivity.
///
/// Locked members are copied from the prior distribution without any check.
/// Free members are seated hardest-profession first, each into the candidate
/// group with the lowest `size * members + overlap * shared_previous_group`
/// score. A group already holding the member's profession is never a
/// candidate; a member with no candidate left goes to the overflow bucket.
#[derive(Debug, Clone, Default)]
pub struct GreedyExclusiveStrategy {
    weights: ScoreWeights,
}

impl GreedyExclusiveStrategy {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    fn score(&self, slot: &Slot<'_>, member: &Member, minimize_overlap: bool) -> u64 {
        let overlap = if minimize_overlap {
            slot.overlap_with(member)
        } else {
            0
        };
        slot.members.len() as u64 * self.weights.size + overlap as u64 * self.weights.overlap
    }
}

/// Working state of one group during a run.
#[derive(Default)]
struct Slot<'a> {
    members: Vec<&'a Member>,
    professions: HashSet<&'a str>,
    previous_groups: HashMap<&'a str, usize>,
}

impl<'a> Slot<'a> {
    fn seat(&mut self, member: &'a Member) {
        self.members.push(member);
        self.professions.insert(member.profession.as_str());
        if let Some(previous) = member.previous_group_id.as_deref() {
            *self.previous_groups.entry(previous).or_default() += 1;
        }
    }

    fn holds_profession(&self, profession: &str) -> bool {
        self.professions.contains(profession)
    }

    fn overlap_with(&self, member: &Member) -> usize {
        member
            .previous_group_id
            .as_deref()
            .and_then(|previous| self.previous_groups.get(previous))
            .copied()
            .unwrap_or(0)
    }
}

/// Drop repeated member ids, keeping the first record for each.
fn distinct_members(members: &[Member]) -> Vec<&Member> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(members.len());
    members
        .iter()
        .filter(|member| {
            let first = seen.insert(member.id.as_str());
            if !first {
                warn!(member_id = %member.id, "duplicate member id in roster, ignoring repeat");
            }
            first
        })
        .collect()
}

/// Sort `free` by how common each member's profession is across the whole
/// roster, locked members included. Most common first, random among equals.
fn order_by_difficulty<'m>(
    members: &[&'m Member],
    free: &mut [&'m Member],
    rng: &mut dyn RngCore,
) {
    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for member in members {
        *frequency.entry(member.profession.as_str()).or_default() += 1;
    }
    free.shuffle(rng);
    free.sort_by_key(|m| Reverse(frequency.get(m.profession.as_str()).copied().unwrap_or(0)));
}

impl AllocationStrategy for GreedyExclusiveStrategy {
    fn compute_distribution(
        &self,
        request: &AllocationRequest<'_>,
        config: &AllocationConfig,
        rng: &mut dyn RngCore,
    ) -> Distribution {
        let AllocationRequest {
            members,
            groups,
            prior_distribution,
            locked_member_ids,
        } = *request;

        let members = distinct_members(members);
        let by_id: HashMap<&str, &Member> =
            members.iter().map(|m| (m.id.as_str(), *m)).collect();

        let mut slots: HashMap<&str, Slot<'_>> = groups
            .iter()
            .map(|g| (g.id.as_str(), Slot::default()))
            .collect();
        let mut placed: HashSet<&str> = HashSet::new();
        let mut unassigned: Vec<MemberId> = Vec::new();

        // Step 1: Copy locked members verbatim, conflicts included. A locked
        // member in the prior overflow bucket stays there.
        if config.respect_locks {
            let prior_seats = prior_distribution
                .groups
                .iter()
                .map(|(group_id, member_ids)| (group_id.as_str(), member_ids))
                .chain(iter::once((UNASSIGNED_GROUP_ID, &prior_distribution.unassigned)));

            for (group_id, member_ids) in prior_seats {
                for member_id in member_ids {
                    if !locked_member_ids.contains(member_id) {
                        continue;
                    }
                    let Some(&member) = by_id.get(member_id.as_str()) else {
                        continue;
                    };
                    if !placed.insert(member.id.as_str()) {
                        continue;
                    }
                    if group_id == UNASSIGNED_GROUP_ID {
                        debug!(%member_id, "locked member stays unassigned");
                        unassigned.push(member.id.clone());
                        continue;
                    }
                    if !slots.contains_key(group_id) {
                        warn!(
                            %group_id,
                            %member_id,
                            "locked member sits in a group outside this run"
                        );
                    }
                    slots.entry(group_id).or_default().seat(member);
                }
            }

            for member in &members {
                if locked_member_ids.contains(&member.id) && !placed.contains(member.id.as_str()) {
                    warn!(
                        member_id = %member.id,
                        "locked member has no prior group, treating as free"
                    );
                }
            }
        }

        // Step 2: Everyone else is free
        let mut free: Vec<&Member> = members
            .iter()
            .copied()
            .filter(|m| !placed.contains(m.id.as_str()))
            .collect();

        // Step 3: Most common professions first, random among equals
        order_by_difficulty(&members, &mut free, rng);

        // Step 4: Seat each free member in the cheapest compatible group
        let mut visit_order: Vec<&str> = Vec::with_capacity(groups.len());
        for group in groups {
            if !visit_order.contains(&group.id.as_str()) {
                visit_order.push(group.id.as_str());
            }
        }

        for member in free {
            visit_order.shuffle(rng);

            let best = visit_order
                .iter()
                .copied()
                .filter_map(|group_id| slots.get(group_id).map(|slot| (group_id, slot)))
                .filter(|(_, slot)| !slot.holds_profession(&member.profession))
                .min_by_key(|(_, slot)| self.score(slot, member, config.minimize_overlap))
                .map(|(group_id, _)| group_id);

            match best.and_then(|group_id| slots.get_mut(group_id).map(|slot| (group_id, slot))) {
                Some((group_id, slot)) => {
                    debug!(member_id = %member.id, %group_id, "placed member");
                    slot.seat(member);
                }
                None => {
                    debug!(
                        member_id = %member.id,
                        profession = %member.profession,
                        "no compatible group left"
                    );
                    unassigned.push(member.id.clone());
                }
            }
        }

        // Step 5: Materialize
        let mut distribution = Distribution::with_groups(groups);
        for (group_id, slot) in slots {
            distribution
                .groups
                .entry(group_id.to_string())
                .or_default()
                .extend(slot.members.iter().map(|m| m.id.clone()));
        }
        distribution.unassigned = unassigned;
        distribution
    }
}
