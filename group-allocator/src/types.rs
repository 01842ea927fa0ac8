use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

pub type MemberId = String;
pub type GroupId = String;

/// Reserved pseudo-group id for members that could not be placed without
/// breaking profession exclusivity.
pub const UNASSIGNED_GROUP_ID: &str = "unassigned";

/// A member eligible for this period's reallocation.
///
/// Whether a member is locked is decided per run and lives outside this
/// record, see [`AllocationRequest::locked_member_ids`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    #[serde(default)]
    pub display_name: String,
    /// At most one member per profession may sit in a group.
    pub profession: String,
    /// Group the member occupied in the prior period. Only feeds the overlap
    /// penalty, it never constrains placement.
    #[serde(default)]
    pub previous_group_id: Option<GroupId>,
}

/// A destination peer group. Groups have no capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    #[serde(default)]
    pub name: String,
}

/// Member ids per group, plus the overflow bucket.
///
/// Used both as the prior state handed to the engine and as its output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    #[serde(default)]
    pub groups: BTreeMap<GroupId, Vec<MemberId>>,
    #[serde(default)]
    pub unassigned: Vec<MemberId>,
}

impl Distribution {
    /// An empty distribution with one (empty) slot per group.
    pub fn with_groups(groups: &[Group]) -> Self {
        Self {
            groups: groups.iter().map(|g| (g.id.clone(), Vec::new())).collect(),
            unassigned: Vec::new(),
        }
    }

    /// Members of `group_id`. The reserved [`UNASSIGNED_GROUP_ID`] addresses
    /// the overflow bucket.
    pub fn members_of(&self, group_id: &str) -> Option<&[MemberId]> {
        if group_id == UNASSIGNED_GROUP_ID {
            return Some(&self.unassigned);
        }
        self.groups.get(group_id).map(Vec::as_slice)
    }

    /// The group holding `member_id`, [`UNASSIGNED_GROUP_ID`] for overflow.
    pub fn group_of(&self, member_id: &str) -> Option<&str> {
        if self.unassigned.iter().any(|m| m == member_id) {
            return Some(UNASSIGNED_GROUP_ID);
        }
        self.groups
            .iter()
            .find(|(_, members)| members.iter().any(|m| m == member_id))
            .map(|(group_id, _)| group_id.as_str())
    }

    /// Total number of member ids across all groups and the overflow bucket.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum::<usize>() + self.unassigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate real groups and their members, in group id order.
    pub fn iter(&self) -> impl Iterator<Item = (&GroupId, &Vec<MemberId>)> {
        self.groups.iter()
    }
}

/// Run options for a single reallocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// When false, every member is treated as free.
    pub respect_locks: bool,
    /// When false, the overlap term of the score is always zero.
    pub minimize_overlap: bool,
    /// Number of full passes; the best result is kept. Values below 1 run once.
    pub max_attempts: u32,
    /// Fixed seed for reproducible runs. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            respect_locks: true,
            minimize_overlap: true,
            max_attempts: 1,
            seed: None,
        }
    }
}

/// Borrowed view over everything one allocation run reads.
///
/// Locked members found in `prior_distribution.unassigned`, or under a
/// `prior_distribution.groups` key equal to [`UNASSIGNED_GROUP_ID`], stay in
/// the overflow bucket. That key never becomes a real group in the output.
#[derive(Debug, Clone, Copy)]
pub struct AllocationRequest<'a> {
    pub members: &'a [Member],
    pub groups: &'a [Group],
    pub prior_distribution: &'a Distribution,
    pub locked_member_ids: &'a HashSet<MemberId>,
}
