//! Ordering groups: the backlog and individual milestones.

use super::MilestoneId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Group a story is ordered within.
///
/// Each group keeps its own ordering key on the story: `backlog_order` for
/// the backlog and `sprint_order` for a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "milestone_id", rename_all = "snake_case")]
pub enum BacklogGroup {
    /// Stories not assigned to any milestone.
    Backlog,
    /// Stories planned into a milestone.
    Milestone(MilestoneId),
}

impl BacklogGroup {
    /// Builds a group from an optional milestone column value.
    #[must_use]
    pub const fn from_milestone(milestone: Option<MilestoneId>) -> Self {
        match milestone {
            Some(id) => Self::Milestone(id),
            None => Self::Backlog,
        }
    }

    /// Returns the milestone, or `None` for the backlog.
    #[must_use]
    pub const fn milestone(self) -> Option<MilestoneId> {
        match self {
            Self::Backlog => None,
            Self::Milestone(id) => Some(id),
        }
    }

    /// Returns `true` for the backlog group.
    #[must_use]
    pub const fn is_backlog(self) -> bool {
        matches!(self, Self::Backlog)
    }
}

impl fmt::Display for BacklogGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backlog => f.write_str("backlog"),
            Self::Milestone(id) => write!(f, "milestone:{id}"),
        }
    }
}

/// Concurrency versions of a project's ordering groups.
///
/// Every applied reorder increments the version of the group it wrote
/// into. A group that was never reordered is at version 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupVersions(HashMap<BacklogGroup, u64>);

impl GroupVersions {
    /// Creates an empty set where every group is at version 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the version of `group`.
    pub fn insert(&mut self, group: BacklogGroup, version: u64) {
        self.0.insert(group, version);
    }

    /// Returns the version of `group`.
    #[must_use]
    pub fn version_of(&self, group: BacklogGroup) -> u64 {
        self.0.get(&group).copied().unwrap_or_default()
    }
}

impl FromIterator<(BacklogGroup, u64)> for GroupVersions {
    fn from_iter<I: IntoIterator<Item = (BacklogGroup, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
