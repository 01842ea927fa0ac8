#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use group_allocator::allocator::{AllocationOutcome, Allocator};
use group_allocator::strategy::GreedyExclusiveStrategy;
use group_allocator::{AllocationConfig, AllocationRequest, Distribution, Group, Member};

pub const SEEDS: std::ops::Range<u64> = 0..50;

pub fn member(id: &str, profession: &str) -> Member {
    Member {
        id: id.to_string(),
        display_name: format!("Member {id}"),
        profession: profession.to_string(),
        previous_group_id: None,
    }
}

pub fn member_from(id: &str, profession: &str, previous_group_id: &str) -> Member {
    Member {
        previous_group_id: Some(previous_group_id.to_string()),
        ..member(id, profession)
    }
}

pub fn groups(ids: &[&str]) -> Vec<Group> {
    ids.iter()
        .map(|id| Group {
            id: id.to_string(),
            name: format!("Group {id}"),
        })
        .collect()
}

pub fn prior<'a>(entries: impl IntoIterator<Item = (&'a str, Vec<&'a str>)>) -> Distribution {
    let mut distribution = Distribution::default();
    for (group_id, member_ids) in entries {
        distribution.groups.insert(
            group_id.to_string(),
            member_ids.iter().map(|m| m.to_string()).collect(),
        );
    }
    distribution
}

pub fn locked(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

/// Everything one run needs, owned so tests can borrow a request from it.
pub struct Scenario {
    pub members: Vec<Member>,
    pub groups: Vec<Group>,
    pub prior: Distribution,
    pub locked: HashSet<String>,
}

impl Scenario {
    pub fn new(members: Vec<Member>, groups: Vec<Group>) -> Self {
        Self {
            members,
            groups,
            prior: Distribution::default(),
            locked: HashSet::new(),
        }
    }

    pub fn with_prior(mut self, prior: Distribution) -> Self {
        self.prior = prior;
        self
    }

    pub fn with_locked(mut self, locked: HashSet<String>) -> Self {
        self.locked = locked;
        self
    }

    pub fn request(&self) -> AllocationRequest<'_> {
        AllocationRequest {
            members: &self.members,
            groups: &self.groups,
            prior_distribution: &self.prior,
            locked_member_ids: &self.locked,
        }
    }

    pub fn run(&self, config: AllocationConfig, seed: u64) -> AllocationOutcome {
        let allocator = Allocator::new(config, Arc::new(GreedyExclusiveStrategy::default()));
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        allocator.run_with_rng(&self.request(), &mut rng)
    }

    pub fn profession_of(&self, member_id: &str) -> &str {
        &self
            .members
            .iter()
            .find(|m| m.id == member_id)
            .unwrap_or_else(|| panic!("unknown member {member_id}"))
            .profession
    }
}

pub fn assert_conserved(scenario: &Scenario, distribution: &Distribution) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for ids in distribution.groups.values() {
        for id in ids {
            *seen.entry(id.as_str()).or_default() += 1;
        }
    }
    for id in &distribution.unassigned {
        *seen.entry(id.as_str()).or_default() += 1;
    }

    let expected: HashSet<&str> = scenario.members.iter().map(|m| m.id.as_str()).collect();
    let actual: HashSet<&str> = seen.keys().copied().collect();
    assert_eq!(actual, expected, "placed ids differ from input ids");
    for (id, count) in seen {
        assert_eq!(count, 1, "{id} placed {count} times");
    }
}

/// No two free-placed members of a group share a profession, and no free
/// member shares a profession with a locked member of its group.
pub fn assert_exclusive(scenario: &Scenario, distribution: &Distribution, respect_locks: bool) {
    for (group_id, ids) in distribution.iter() {
        let mut seen_free: HashSet<&str> = HashSet::new();
        let locked_professions: HashSet<&str> = ids
            .iter()
            .filter(|id| respect_locks && scenario.locked.contains(*id))
            .map(|id| scenario.profession_of(id))
            .collect();

        for id in ids.iter().filter(|id| !(respect_locks && scenario.locked.contains(*id))) {
            let profession = scenario.profession_of(id);
            assert!(
                seen_free.insert(profession),
                "{group_id} holds two free members with profession {profession}"
            );
            assert!(
                !locked_professions.contains(profession),
                "{group_id}: free member {id} joined a locked {profession}"
            );
        }
    }
}

pub fn assert_locks_held(scenario: &Scenario, distribution: &Distribution) {
    for id in &scenario.locked {
        let Some(expected) = scenario.prior.group_of(id) else {
            continue;
        };
        if scenario.members.iter().all(|m| &m.id != id) {
            continue;
        }
        assert_eq!(
            distribution.group_of(id),
            Some(expected),
            "locked member {id} moved"
        );
    }
}
