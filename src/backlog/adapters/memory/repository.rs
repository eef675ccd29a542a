//! In-memory repository for backlog ordering tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::backlog::{
    domain::{
        BacklogGroup, GroupVersions, Milestone, MilestoneId, ProjectId, ReorderPlan, StoryId,
        UserStory,
    },
    ports::{BacklogRepository, BacklogRepositoryError, BacklogRepositoryResult},
};

/// Thread-safe in-memory backlog repository.
///
/// [`BacklogRepository::apply_reorder`] validates every story version and
/// the target group version before touching any story, all under one write
/// lock, so a failed plan leaves the state unchanged.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBacklogRepository {
    state: Arc<RwLock<InMemoryBacklogState>>,
}

#[derive(Debug, Default)]
struct InMemoryBacklogState {
    stories: HashMap<StoryId, UserStory>,
    milestones: HashMap<MilestoneId, Milestone>,
    group_versions: HashMap<(ProjectId, BacklogGroup), u64>,
}

impl InMemoryBacklogRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> BacklogRepositoryError {
    BacklogRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn group_members(
    state: &InMemoryBacklogState,
    project_id: ProjectId,
    group: BacklogGroup,
) -> impl Iterator<Item = &UserStory> {
    state
        .stories
        .values()
        .filter(move |story| story.project_id() == project_id && story.group() == group)
}

#[async_trait]
impl BacklogRepository for InMemoryBacklogRepository {
    async fn store_milestone(&self, milestone: &Milestone) -> BacklogRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.milestones.contains_key(&milestone.id()) {
            return Err(BacklogRepositoryError::DuplicateMilestone(milestone.id()));
        }
        state.milestones.insert(milestone.id(), milestone.clone());
        Ok(())
    }

    async fn find_milestone(&self, id: MilestoneId) -> BacklogRepositoryResult<Option<Milestone>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.milestones.get(&id).cloned())
    }

    async fn store_story(&self, story: &UserStory) -> BacklogRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.stories.contains_key(&story.id()) {
            return Err(BacklogRepositoryError::DuplicateStory(story.id()));
        }
        state.stories.insert(story.id(), story.clone());
        Ok(())
    }

    async fn find_story(&self, id: StoryId) -> BacklogRepositoryResult<Option<UserStory>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.stories.get(&id).cloned())
    }

    async fn stories_in_project(
        &self,
        project_id: ProjectId,
    ) -> BacklogRepositoryResult<Vec<UserStory>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .stories
            .values()
            .filter(|story| story.project_id() == project_id)
            .cloned()
            .collect())
    }

    async fn stories_in_group(
        &self,
        project_id: ProjectId,
        group: BacklogGroup,
    ) -> BacklogRepositoryResult<Vec<UserStory>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut stories: Vec<UserStory> =
            group_members(&state, project_id, group).cloned().collect();
        stories.sort_by_key(|story| (story.order(), story.id()));
        Ok(stories)
    }

    async fn next_order(
        &self,
        project_id: ProjectId,
        group: BacklogGroup,
    ) -> BacklogRepositoryResult<i64> {
        let state = self.state.read().map_err(lock_error)?;
        let max = group_members(&state, project_id, group)
            .map(UserStory::order)
            .max();
        Ok(max.map_or(1, |order| order + 1))
    }

    async fn group_versions(
        &self,
        project_id: ProjectId,
    ) -> BacklogRepositoryResult<GroupVersions> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .group_versions
            .iter()
            .filter(|((project, _), _)| *project == project_id)
            .map(|((_, group), version)| (*group, *version))
            .collect())
    }

    async fn apply_reorder(
        &self,
        plan: &ReorderPlan,
        modified_at: DateTime<Utc>,
    ) -> BacklogRepositoryResult<()> {
        if plan.is_empty() {
            return Ok(());
        }
        let mut state = self.state.write().map_err(lock_error)?;

        for assignment in plan.assignments() {
            let stored = state
                .stories
                .get(&assignment.story_id)
                .ok_or(BacklogRepositoryError::StoryNotFound(assignment.story_id))?;
            if stored.version() != assignment.expected_version {
                return Err(BacklogRepositoryError::VersionConflict(assignment.story_id));
            }
        }
        let group_key = (plan.project_id(), plan.group());
        let group_version = state
            .group_versions
            .get(&group_key)
            .copied()
            .unwrap_or_default();
        if group_version != plan.expected_group_version() {
            return Err(BacklogRepositoryError::GroupConflict {
                project_id: plan.project_id(),
                group: plan.group(),
            });
        }

        for assignment in plan.assignments() {
            if let Some(story) = state.stories.get_mut(&assignment.story_id) {
                story.reposition(assignment.group, assignment.order, modified_at);
            }
        }
        state.group_versions.insert(group_key, group_version + 1);
        Ok(())
    }
}
