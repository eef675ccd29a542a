//! Domain model for backlog and milestone ordering.
//!
//! Stories, milestones and the reorder planner live here, free of any
//! persistence or transport concerns.

mod error;
mod group;
mod ids;
mod milestone;
mod reorder;
mod story;

pub use error::{
    BacklogDomainError, InvalidAnchorReason, InvalidItemReason, ParseAnchorPolicyError,
    ReorderError,
};
pub use group::{BacklogGroup, GroupVersions};
pub use ids::{ActorId, MilestoneId, ProjectId, StoryId};
pub use milestone::{MAX_MILESTONE_NAME_LENGTH, Milestone};
pub use reorder::{
    Anchor, AnchorPolicy, OrderAssignment, ReorderCommand, ReorderPlan, plan_reorder,
};
pub use story::{INITIAL_VERSION, MAX_SUBJECT_LENGTH, PersistedStoryData, UserStory};
