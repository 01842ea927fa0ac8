use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::{Distribution, GroupId, Member, MemberId};

/// Summary of one real group in a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStats {
    pub group_id: GroupId,
    pub member_count: usize,
    /// Professions held by more than one member, with their counts.
    pub conflicts: BTreeMap<String, usize>,
    /// Conflicting professions whose members are all locked.
    pub locked_conflicts: Vec<String>,
    /// Largest number of members sharing one previous group.
    pub max_overlap: usize,
}

impl GroupStats {
    pub fn has_conflict(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Statistics a caller can recompute from any distribution.
///
/// Overflow and locked conflicts are reported here as data, never as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationReport {
    /// Real groups holding at least one profession conflict.
    pub conflict_groups: usize,
    /// Groups whose conflicts include one made only of locked members.
    pub locked_conflict_groups: usize,
    /// Largest shared-previous-group count over all real groups.
    pub max_overlap: usize,
    /// Difference between the largest and the smallest real group.
    pub size_spread: usize,
    pub unassigned: Vec<MemberId>,
    pub group_stats: Vec<GroupStats>,
}

impl AllocationReport {
    pub fn build(
        distribution: &Distribution,
        members: &[Member],
        locked_member_ids: &HashSet<MemberId>,
    ) -> Self {
        let by_id = index_members(members);

        let group_stats: Vec<GroupStats> = distribution
            .iter()
            .map(|(group_id, member_ids)| {
                let conflicts = profession_conflicts(member_ids, &by_id);
                let locked_conflicts = conflicts
                    .keys()
                    .filter(|profession| {
                        member_ids
                            .iter()
                            .filter(|id| {
                                by_id
                                    .get(id.as_str())
                                    .is_some_and(|m| &m.profession == *profession)
                            })
                            .all(|id| locked_member_ids.contains(id))
                    })
                    .cloned()
                    .collect();

                GroupStats {
                    group_id: group_id.clone(),
                    member_count: member_ids.len(),
                    conflicts,
                    locked_conflicts,
                    max_overlap: overlap_count(member_ids, &by_id),
                }
            })
            .collect();

        let sizes = group_stats.iter().map(|g| g.member_count);
        let size_spread = match (sizes.clone().max(), sizes.min()) {
            (Some(max), Some(min)) => max - min,
            _ => 0,
        };

        Self {
            conflict_groups: group_stats.iter().filter(|g| g.has_conflict()).count(),
            locked_conflict_groups: group_stats
                .iter()
                .filter(|g| !g.locked_conflicts.is_empty())
                .count(),
            max_overlap: group_stats.iter().map(|g| g.max_overlap).max().unwrap_or(0),
            size_spread,
            unassigned: distribution.unassigned.clone(),
            group_stats,
        }
    }

    /// True when every member was placed and no group has a conflict.
    pub fn is_clean(&self) -> bool {
        self.unassigned.is_empty() && self.conflict_groups == 0
    }

    /// Ordering key for comparing attempts, lower is better.
    pub fn ranking_key(&self) -> (usize, usize, usize, usize) {
        (
            self.unassigned.len(),
            self.conflict_groups,
            self.max_overlap,
            self.size_spread,
        )
    }
}

pub fn index_members(members: &[Member]) -> HashMap<&str, &Member> {
    let mut by_id = HashMap::with_capacity(members.len());
    for member in members {
        by_id.entry(member.id.as_str()).or_insert(member);
    }
    by_id
}

/// Professions appearing more than once among `member_ids`.
///
/// Ids missing from `by_id` are skipped.
pub fn profession_conflicts(
    member_ids: &[MemberId],
    by_id: &HashMap<&str, &Member>,
) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for member in member_ids.iter().filter_map(|id| by_id.get(id.as_str())) {
        *counts.entry(member.profession.clone()).or_default() += 1;
    }
    counts.retain(|_, count| *count > 1);
    counts
}

/// Largest number of members among `member_ids` sharing a previous group.
///
/// Members without a previous group never count.
pub fn overlap_count(member_ids: &[MemberId], by_id: &HashMap<&str, &Member>) -> usize {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for member in member_ids.iter().filter_map(|id| by_id.get(id.as_str())) {
        if let Some(previous) = member.previous_group_id.as_deref() {
            *counts.entry(previous).or_default() += 1;
        }
    }
    counts.into_values().max().unwrap_or(0)
}
