//! JSON contract with the roster provider and the persistence sink.
//!
//! A roster document carries everything one run needs:
//!
//! ```json
//! {
//!   "members": [{"id": "m1", "display_name": "Ada", "profession": "lawyer", "previous_group_id": "g1"}],
//!   "groups": [{"id": "g1", "name": "Tuesday Breakfast"}],
//!   "prior_distribution": {"groups": {"g1": ["m1"]}, "unassigned": []},
//!   "locked_member_ids": ["m1"]
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::allocator::AllocationOutcome;
use crate::error::{Error, Result};
use crate::stats::AllocationReport;
use crate::types::{
    AllocationRequest, Distribution, Group, Member, MemberId, UNASSIGNED_GROUP_ID,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub members: Vec<Member>,
    pub groups: Vec<Group>,
    #[serde(default)]
    pub prior_distribution: Distribution,
    #[serde(default)]
    pub locked_member_ids: HashSet<MemberId>,
}

impl Roster {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let roster: Roster = serde_json::from_str(raw)?;
        roster.validate()?;
        Ok(roster)
    }

    /// Reject ids the engine cannot represent unambiguously.
    pub fn validate(&self) -> Result<()> {
        if let Some(member) = self.members.iter().find(|m| m.id.trim().is_empty()) {
            return Err(Error::invalid_roster(format!(
                "member with profession {:?} has an empty id",
                member.profession
            )));
        }

        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.id.trim().is_empty() {
                return Err(Error::invalid_roster(format!(
                    "group {:?} has an empty id",
                    group.name
                )));
            }
            if group.id == UNASSIGNED_GROUP_ID {
                return Err(Error::invalid_roster(format!(
                    "group id {UNASSIGNED_GROUP_ID:?} is reserved"
                )));
            }
            if !seen.insert(group.id.as_str()) {
                return Err(Error::invalid_roster(format!(
                    "group id {:?} is listed twice",
                    group.id
                )));
            }
        }

        if self
            .prior_distribution
            .groups
            .contains_key(UNASSIGNED_GROUP_ID)
        {
            return Err(Error::invalid_roster(format!(
                "prior distribution uses the reserved group id {UNASSIGNED_GROUP_ID:?}"
            )));
        }

        Ok(())
    }

    pub fn request(&self) -> AllocationRequest<'_> {
        AllocationRequest {
            members: &self.members,
            groups: &self.groups,
            prior_distribution: &self.prior_distribution,
            locked_member_ids: &self.locked_member_ids,
        }
    }
}

/// What the persistence sink receives.
#[derive(Debug, Serialize)]
pub struct AllocationOutput<'a> {
    pub distribution: &'a Distribution,
    pub report: &'a AllocationReport,
}

impl<'a> From<&'a AllocationOutcome> for AllocationOutput<'a> {
    fn from(outcome: &'a AllocationOutcome) -> Self {
        Self {
            distribution: &outcome.distribution,
            report: &outcome.report,
        }
    }
}

pub fn write_outcome<W: Write>(outcome: &AllocationOutcome, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, &AllocationOutput::from(outcome))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
