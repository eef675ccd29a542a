//! Request and response payloads for backlog ordering operations.

use crate::backlog::domain::{
    Anchor, BacklogGroup, MilestoneId, OrderAssignment, ProjectId, ReorderCommand, StoryId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a bulk order request was rejected before reaching the planner.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum InvalidRequestReason {
    /// Both `after_userstory_id` and `before_userstory_id` were supplied.
    #[error("after_userstory_id and before_userstory_id are mutually exclusive")]
    ConflictingAnchors,

    /// The bulk list exceeds the configured limit.
    #[error("bulk_userstories holds {requested} stories, limit is {limit}")]
    TooManyStories {
        /// Number of stories in the request.
        requested: usize,
        /// Configured maximum.
        limit: usize,
    },
}

/// Bulk backlog/sprint order update, shaped like the HTTP request body.
///
/// ```
/// use storyboard::backlog::services::BulkUpdateOrderRequest;
///
/// let body = r#"{
///     "project_id": "5f0c2b7e-8f5a-4d55-9c1b-0d6f1f4b7a10",
///     "after_userstory_id": null,
///     "bulk_userstories": ["0b6b7a55-5f83-4c51-8f5e-2c9b4a1c3d21"]
/// }"#;
/// let request: BulkUpdateOrderRequest = serde_json::from_str(body).expect("valid body");
/// assert_eq!(request.bulk_userstories().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateOrderRequest {
    project_id: ProjectId,
    #[serde(default)]
    milestone_id: Option<MilestoneId>,
    #[serde(default)]
    after_userstory_id: Option<StoryId>,
    #[serde(default)]
    before_userstory_id: Option<StoryId>,
    bulk_userstories: Vec<StoryId>,
}

impl BulkUpdateOrderRequest {
    /// Creates a request moving `stories` to the start of the backlog.
    #[must_use]
    pub fn new(project_id: ProjectId, stories: impl IntoIterator<Item = StoryId>) -> Self {
        Self {
            project_id,
            milestone_id: None,
            after_userstory_id: None,
            before_userstory_id: None,
            bulk_userstories: stories.into_iter().collect(),
        }
    }

    /// Targets a milestone instead of the backlog.
    #[must_use]
    pub const fn with_milestone(mut self, milestone_id: MilestoneId) -> Self {
        self.milestone_id = Some(milestone_id);
        self
    }

    /// Inserts the stories after `story_id`.
    #[must_use]
    pub const fn after(mut self, story_id: StoryId) -> Self {
        self.after_userstory_id = Some(story_id);
        self
    }

    /// Inserts the stories before `story_id`.
    #[must_use]
    pub const fn before(mut self, story_id: StoryId) -> Self {
        self.before_userstory_id = Some(story_id);
        self
    }

    /// Returns the project the request targets.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the target milestone, `None` for the backlog.
    #[must_use]
    pub const fn milestone_id(&self) -> Option<MilestoneId> {
        self.milestone_id
    }

    /// Returns the stories to move in destination order.
    #[must_use]
    pub fn bulk_userstories(&self) -> &[StoryId] {
        &self.bulk_userstories
    }

    /// Validates the request shape and converts it into a planner command.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestReason`] when both anchors are set or the
    /// bulk list is longer than `max_bulk_size`.
    pub fn into_command(
        self,
        max_bulk_size: usize,
    ) -> Result<ReorderCommand, InvalidRequestReason> {
        let anchor = match (self.after_userstory_id, self.before_userstory_id) {
            (Some(_), Some(_)) => return Err(InvalidRequestReason::ConflictingAnchors),
            (Some(after), None) => Anchor::After(after),
            (None, Some(before)) => Anchor::Before(before),
            (None, None) => Anchor::Start,
        };
        if self.bulk_userstories.len() > max_bulk_size {
            return Err(InvalidRequestReason::TooManyStories {
                requested: self.bulk_userstories.len(),
                limit: max_bulk_size,
            });
        }
        Ok(ReorderCommand::new(
            self.project_id,
            BacklogGroup::from_milestone(self.milestone_id),
            anchor,
            self.bulk_userstories,
        ))
    }
}

/// Ordering key reported for a story, named after the group kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupOrder {
    /// Position inside the backlog.
    #[serde(rename = "backlog_order")]
    Backlog(i64),
    /// Position inside a milestone.
    #[serde(rename = "sprint_order")]
    Sprint(i64),
}

impl GroupOrder {
    /// Returns the numeric position.
    #[must_use]
    pub const fn value(self) -> i64 {
        match self {
            Self::Backlog(order) | Self::Sprint(order) => order,
        }
    }
}

/// One updated story in a bulk order response.
///
/// Serializes as `{"id", "milestone", "backlog_order"}` or
/// `{"id", "milestone", "sprint_order"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryOrderRow {
    /// Story identifier.
    pub id: StoryId,
    /// Milestone after the move, `None` for the backlog.
    pub milestone: Option<MilestoneId>,
    /// New position.
    #[serde(flatten)]
    pub order: GroupOrder,
}

impl From<&OrderAssignment> for StoryOrderRow {
    fn from(assignment: &OrderAssignment) -> Self {
        let order = match assignment.group {
            BacklogGroup::Backlog => GroupOrder::Backlog(assignment.order),
            BacklogGroup::Milestone(_) => GroupOrder::Sprint(assignment.order),
        };
        Self {
            id: assignment.story_id,
            milestone: assignment.group.milestone(),
            order,
        }
    }
}

/// Request payload for creating a story at the end of its group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStoryRequest {
    project_id: ProjectId,
    subject: String,
    milestone_id: Option<MilestoneId>,
}

impl CreateStoryRequest {
    /// Creates a request for a backlog story.
    #[must_use]
    pub fn new(project_id: ProjectId, subject: impl Into<String>) -> Self {
        Self {
            project_id,
            subject: subject.into(),
            milestone_id: None,
        }
    }

    /// Plans the story into a milestone.
    #[must_use]
    pub const fn with_milestone(mut self, milestone_id: MilestoneId) -> Self {
        self.milestone_id = Some(milestone_id);
        self
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the story subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the milestone, if any.
    #[must_use]
    pub const fn milestone_id(&self) -> Option<MilestoneId> {
        self.milestone_id
    }
}
