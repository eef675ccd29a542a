//! Repository port for story and milestone persistence.

use crate::backlog::domain::{
    BacklogGroup, GroupVersions, Milestone, MilestoneId, ProjectId, ReorderPlan, StoryId,
    UserStory,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for backlog repository operations.
pub type BacklogRepositoryResult<T> = Result<T, BacklogRepositoryError>;

/// Backlog persistence contract.
#[async_trait]
pub trait BacklogRepository: Send + Sync {
    /// Stores a new milestone.
    ///
    /// # Errors
    ///
    /// Returns [`BacklogRepositoryError::DuplicateMilestone`] when the
    /// identifier already exists.
    async fn store_milestone(&self, milestone: &Milestone) -> BacklogRepositoryResult<()>;

    /// Finds a milestone by identifier.
    ///
    /// Returns `None` when the milestone does not exist.
    async fn find_milestone(&self, id: MilestoneId) -> BacklogRepositoryResult<Option<Milestone>>;

    /// Stores a new story.
    ///
    /// # Errors
    ///
    /// Returns [`BacklogRepositoryError::DuplicateStory`] when the identifier
    /// already exists.
    async fn store_story(&self, story: &UserStory) -> BacklogRepositoryResult<()>;

    /// Finds a story by identifier.
    ///
    /// Returns `None` when the story does not exist.
    async fn find_story(&self, id: StoryId) -> BacklogRepositoryResult<Option<UserStory>>;

    /// Returns every story of a project, in no particular order.
    async fn stories_in_project(
        &self,
        project_id: ProjectId,
    ) -> BacklogRepositoryResult<Vec<UserStory>>;

    /// Returns the stories of one group ordered by `(order, id)`.
    async fn stories_in_group(
        &self,
        project_id: ProjectId,
        group: BacklogGroup,
    ) -> BacklogRepositoryResult<Vec<UserStory>>;

    /// Returns the order a story appended to `group` should take: one past
    /// the current maximum, or 1 for an empty group.
    async fn next_order(
        &self,
        project_id: ProjectId,
        group: BacklogGroup,
    ) -> BacklogRepositoryResult<i64>;

    /// Returns the reorder versions of every group of a project.
    ///
    /// Read this before loading the stories a plan is computed from, so any
    /// reorder committed in between is caught by [`Self::apply_reorder`].
    async fn group_versions(
        &self,
        project_id: ProjectId,
    ) -> BacklogRepositoryResult<GroupVersions>;

    /// Writes every assignment of `plan` atomically.
    ///
    /// Each story's stored version must equal the planned
    /// `expected_version`, and the target group's version must equal
    /// [`ReorderPlan::expected_group_version`]. On success every written
    /// story's version is incremented, `modified_at` recorded and the group
    /// version incremented.
    ///
    /// # Errors
    ///
    /// Returns [`BacklogRepositoryError::VersionConflict`] when any story
    /// changed since it was read, [`BacklogRepositoryError::GroupConflict`]
    /// when another reorder was applied to the target group, and
    /// [`BacklogRepositoryError::StoryNotFound`] when a story vanished.
    /// Nothing is written in any of these cases.
    async fn apply_reorder(
        &self,
        plan: &ReorderPlan,
        modified_at: DateTime<Utc>,
    ) -> BacklogRepositoryResult<()>;
}

/// Errors returned by backlog repository implementations.
#[derive(Debug, Clone, Error)]
pub enum BacklogRepositoryError {
    /// A story with the same identifier already exists.
    #[error("duplicate story identifier: {0}")]
    DuplicateStory(StoryId),

    /// A milestone with the same identifier already exists.
    #[error("duplicate milestone identifier: {0}")]
    DuplicateMilestone(MilestoneId),

    /// The story was not found.
    #[error("story not found: {0}")]
    StoryNotFound(StoryId),

    /// The story was modified concurrently.
    #[error("story {0} was modified concurrently")]
    VersionConflict(StoryId),

    /// Another reorder was applied to the target group concurrently.
    #[error("{group} of project {project_id} was reordered concurrently")]
    GroupConflict {
        /// Project owning the group.
        project_id: ProjectId,
        /// Group that was reordered.
        group: BacklogGroup,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BacklogRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
