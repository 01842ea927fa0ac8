pub mod allocator;
pub mod config;
pub mod error;
pub mod metrics_consts;
pub mod roster;
pub mod stats;
pub mod strategy;
pub mod types;

pub use allocator::{allocate, AllocationOutcome, Allocator};
pub use stats::AllocationReport;
pub use types::{
    AllocationConfig, AllocationRequest, Distribution, Group, GroupId, Member, MemberId,
    UNASSIGNED_GROUP_ID,
};
