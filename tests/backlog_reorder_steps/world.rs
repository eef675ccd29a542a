//! Shared world state for backlog reorder BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use storyboard::backlog::{
    adapters::memory::{InMemoryBacklogRepository, InMemoryProjectMembers},
    domain::{ActorId, MilestoneId, ProjectId, StoryId},
    services::{BacklogOrderError, BacklogOrderService, StoryOrderRow},
};

/// Service type used by the BDD world.
pub type TestBacklogService =
    BacklogOrderService<InMemoryBacklogRepository, InMemoryProjectMembers, DefaultClock>;

/// Scenario world for backlog reorder behaviour tests.
pub struct BacklogWorld {
    pub service: TestBacklogService,
    pub project: ProjectId,
    pub member: ActorId,
    pub stories: HashMap<String, StoryId>,
    pub milestones: HashMap<String, MilestoneId>,
    pub last_result: Option<Result<Vec<StoryOrderRow>, BacklogOrderError>>,
}

impl BacklogWorld {
    /// Creates a world with one project and one member.
    ///
    /// # Panics
    ///
    /// Panics if the membership lock is poisoned.
    #[must_use]
    pub fn new() -> Self {
        let members = Arc::new(InMemoryProjectMembers::new());
        let project = ProjectId::new();
        let member = ActorId::new();
        members
            .add_member(project, member)
            .expect("fresh membership lock");
        let service = BacklogOrderService::new(
            Arc::new(InMemoryBacklogRepository::new()),
            members,
            Arc::new(DefaultClock),
        );
        Self {
            service,
            project,
            member,
            stories: HashMap::new(),
            milestones: HashMap::new(),
            last_result: None,
        }
    }

    /// Resolves a story label used in the feature file.
    ///
    /// # Errors
    ///
    /// Returns an error if the label was never created.
    pub fn story_id(&self, label: &str) -> Result<StoryId, eyre::Report> {
        self.stories
            .get(label)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown story label {label}"))
    }

    /// Resolves a comma-separated list of story labels.
    ///
    /// # Errors
    ///
    /// Returns an error if any label was never created.
    pub fn story_ids(&self, labels: &str) -> Result<Vec<StoryId>, eyre::Report> {
        split_labels(labels)
            .map(|label| self.story_id(label))
            .collect()
    }

    /// Returns the label a story was created under.
    #[must_use]
    pub fn label_of(&self, story_id: StoryId) -> Option<&str> {
        self.stories
            .iter()
            .find(|(_, id)| **id == story_id)
            .map(|(label, _)| label.as_str())
    }
}

impl Default for BacklogWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a comma-separated label list.
pub fn split_labels(labels: &str) -> impl Iterator<Item = &str> {
    labels
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BacklogWorld {
    BacklogWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
