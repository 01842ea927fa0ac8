pub const ALLOCATION_RUNS_COUNTER: &str = "group_allocation_runs_total";
pub const ALLOCATION_ATTEMPTS_COUNTER: &str = "group_allocation_attempts_total";
pub const UNASSIGNED_MEMBERS_COUNTER: &str = "group_allocation_unassigned_members_total";
pub const CONFLICT_GROUPS_GAUGE: &str = "group_allocation_conflict_groups";
pub const LOCKED_CONFLICT_GROUPS_GAUGE: &str = "group_allocation_locked_conflict_groups";
pub const MAX_OVERLAP_GAUGE: &str = "group_allocation_max_overlap";
