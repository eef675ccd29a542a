//! Service layer for story creation and bulk backlog reordering.

use super::request::{
    BulkUpdateOrderRequest, CreateStoryRequest, InvalidRequestReason, StoryOrderRow,
};
use crate::backlog::{
    domain::{
        ActorId, BacklogDomainError, BacklogGroup, Milestone, MilestoneId, ProjectId,
        ReorderError, UserStory, plan_reorder,
    },
    ports::{
        AccessPolicyError, BacklogRepository, BacklogRepositoryError, ProjectAccessPolicy,
    },
};
use crate::config::ReorderConfig;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Service-level errors for backlog ordering operations.
#[derive(Debug, Error)]
pub enum BacklogOrderError {
    /// The request was malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] InvalidRequestReason),

    /// The actor may not modify the project's backlog.
    #[error("actor {actor} may not modify the backlog of project {project_id}")]
    Forbidden {
        /// Requesting actor.
        actor: ActorId,
        /// Target project.
        project_id: ProjectId,
    },

    /// The milestone does not exist in the project.
    #[error("milestone {0} not found in project")]
    MilestoneNotFound(MilestoneId),

    /// The planner rejected a story or the anchor.
    #[error(transparent)]
    Reorder(#[from] ReorderError),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] BacklogDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] BacklogRepositoryError),

    /// The access policy could not be consulted.
    #[error(transparent)]
    Access(#[from] AccessPolicyError),
}

impl BacklogOrderError {
    /// Returns `true` for errors caused by the caller's input or rights.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_)
                | Self::Forbidden { .. }
                | Self::MilestoneNotFound(_)
                | Self::Reorder(_)
                | Self::Domain(_)
        )
    }

    /// Returns `true` when a concurrent write invalidated the request.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::Repository(
                BacklogRepositoryError::VersionConflict(_)
                    | BacklogRepositoryError::GroupConflict { .. }
            )
        )
    }
}

/// Result type for backlog ordering service operations.
pub type BacklogOrderResult<T> = Result<T, BacklogOrderError>;

/// Backlog ordering orchestration service.
#[derive(Clone)]
pub struct BacklogOrderService<R, A, C>
where
    R: BacklogRepository,
    A: ProjectAccessPolicy,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    access: Arc<A>,
    clock: Arc<C>,
    config: ReorderConfig,
}

impl<R, A, C> BacklogOrderService<R, A, C>
where
    R: BacklogRepository,
    A: ProjectAccessPolicy,
    C: Clock + Send + Sync,
{
    /// Creates a service with the default [`ReorderConfig`].
    #[must_use]
    pub fn new(repository: Arc<R>, access: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            repository,
            access,
            clock,
            config: ReorderConfig::default(),
        }
    }

    /// Replaces the reorder configuration.
    #[must_use]
    pub const fn with_config(mut self, config: ReorderConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the active reorder configuration.
    #[must_use]
    pub const fn config(&self) -> &ReorderConfig {
        &self.config
    }

    /// Creates a milestone in a project.
    ///
    /// # Errors
    ///
    /// Returns [`BacklogOrderError`] when the name is blank or persistence
    /// fails.
    pub async fn create_milestone(
        &self,
        project_id: ProjectId,
        name: impl Into<String> + Send,
    ) -> BacklogOrderResult<Milestone> {
        let milestone = Milestone::new(project_id, name, &*self.clock)?;
        self.repository.store_milestone(&milestone).await?;
        Ok(milestone)
    }

    /// Creates a story appended to the end of its group.
    ///
    /// # Errors
    ///
    /// Returns [`BacklogOrderError::MilestoneNotFound`] when the milestone is
    /// not part of the project, and other variants when validation or
    /// persistence fails.
    pub async fn create_story(&self, request: CreateStoryRequest) -> BacklogOrderResult<UserStory> {
        let project_id = request.project_id();
        if let Some(milestone_id) = request.milestone_id() {
            self.ensure_milestone_in_project(project_id, milestone_id)
                .await?;
        }
        let group = BacklogGroup::from_milestone(request.milestone_id());
        let order = self.repository.next_order(project_id, group).await?;
        let story = UserStory::new(project_id, request.subject(), group, order, &*self.clock)?;
        self.repository.store_story(&story).await?;
        debug!(story_id = %story.id(), %group, order, "story created");
        Ok(story)
    }

    /// Returns the stories of a group in display order.
    ///
    /// # Errors
    ///
    /// Returns [`BacklogOrderError::Repository`] when the lookup fails.
    pub async fn group_sequence(
        &self,
        project_id: ProjectId,
        group: BacklogGroup,
    ) -> BacklogOrderResult<Vec<UserStory>> {
        Ok(self.repository.stories_in_group(project_id, group).await?)
    }

    /// Moves a block of stories into the backlog or a milestone.
    ///
    /// Returns one row per story whose position changed, sorted by
    /// `(order, id)`. Nothing is written unless every check passes, and the
    /// write itself is atomic.
    ///
    /// # Errors
    ///
    /// Returns [`BacklogOrderError`] for malformed requests, refused access,
    /// unknown milestones, planner rejections, and repository failures
    /// including version conflicts.
    pub async fn bulk_update_order(
        &self,
        actor: ActorId,
        request: BulkUpdateOrderRequest,
    ) -> BacklogOrderResult<Vec<StoryOrderRow>> {
        let project_id = request.project_id();
        let command = request.into_command(self.config.max_bulk_size)?;

        if !self.access.can_modify_backlog(actor, project_id).await? {
            warn!(%actor, %project_id, "backlog reorder refused");
            return Err(BacklogOrderError::Forbidden { actor, project_id });
        }
        if let Some(milestone_id) = command.target_group().milestone() {
            self.ensure_milestone_in_project(project_id, milestone_id)
                .await?;
        }

        let group_versions = self.repository.group_versions(project_id).await?;
        let stories = self.repository.stories_in_project(project_id).await?;
        let planned = plan_reorder(&stories, &command, self.config.anchor_policy)?;
        let group_version = group_versions.version_of(planned.group());
        let plan = planned.with_group_version(group_version);
        debug!(
            %project_id,
            group = %plan.group(),
            assignments = plan.assignments().len(),
            "reorder planned"
        );
        if plan.is_empty() {
            return Ok(Vec::new());
        }

        if let Err(err) = self.repository.apply_reorder(&plan, self.clock.utc()).await {
            match &err {
                BacklogRepositoryError::VersionConflict(story_id) => {
                    warn!(%project_id, %story_id, "reorder lost a concurrent update");
                }
                BacklogRepositoryError::GroupConflict { group, .. } => {
                    warn!(%project_id, %group, "reorder lost a concurrent group update");
                }
                _ => {}
            }
            return Err(err.into());
        }
        info!(
            %project_id,
            group = %plan.group(),
            moved = plan.moved_count(),
            affected = plan.assignments().len(),
            "reorder applied"
        );

        let mut rows: Vec<StoryOrderRow> =
            plan.assignments().iter().map(StoryOrderRow::from).collect();
        rows.sort_by_key(|row| (row.order.value(), row.id));
        Ok(rows)
    }

    async fn ensure_milestone_in_project(
        &self,
        project_id: ProjectId,
        milestone_id: MilestoneId,
    ) -> BacklogOrderResult<()> {
        let milestone = self.repository.find_milestone(milestone_id).await?;
        match milestone {
            Some(found) if found.project_id() == project_id => Ok(()),
            _ => Err(BacklogOrderError::MilestoneNotFound(milestone_id)),
        }
    }
}
