//! User story aggregate root.

use super::{BacklogDomainError, BacklogGroup, MilestoneId, ProjectId, StoryId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Initial optimistic-concurrency version of a freshly created story.
pub const INITIAL_VERSION: u64 = 1;

/// Maximum subject length in characters, matching the `VARCHAR(500)` column.
pub const MAX_SUBJECT_LENGTH: usize = 500;

/// A user story ordered within the backlog or a milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStory {
    id: StoryId,
    project_id: ProjectId,
    subject: String,
    milestone: Option<MilestoneId>,
    backlog_order: i64,
    sprint_order: i64,
    version: u64,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedStoryData {
    /// Persisted story identifier.
    pub id: StoryId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Story subject.
    pub subject: String,
    /// Milestone the story is planned into, if any.
    pub milestone: Option<MilestoneId>,
    /// Position inside the backlog.
    pub backlog_order: i64,
    /// Position inside the milestone.
    pub sprint_order: i64,
    /// Optimistic-concurrency version.
    pub version: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub modified_at: DateTime<Utc>,
}

impl UserStory {
    /// Creates a story positioned at `order` inside `group`.
    ///
    /// The ordering key of the other group kind starts at zero.
    ///
    /// # Errors
    ///
    /// Returns [`BacklogDomainError::EmptySubject`] when the subject is blank
    /// and [`BacklogDomainError::SubjectTooLong`] when it exceeds
    /// [`MAX_SUBJECT_LENGTH`] characters.
    pub fn new(
        project_id: ProjectId,
        subject: impl Into<String>,
        group: BacklogGroup,
        order: i64,
        clock: &impl Clock,
    ) -> Result<Self, BacklogDomainError> {
        let raw = subject.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BacklogDomainError::EmptySubject);
        }
        let length = trimmed.chars().count();
        if length > MAX_SUBJECT_LENGTH {
            return Err(BacklogDomainError::SubjectTooLong {
                length,
                max: MAX_SUBJECT_LENGTH,
            });
        }
        let timestamp = clock.utc();
        let (backlog_order, sprint_order) = if group.is_backlog() {
            (order, 0)
        } else {
            (0, order)
        };
        Ok(Self {
            id: StoryId::new(),
            project_id,
            subject: trimmed.to_owned(),
            milestone: group.milestone(),
            backlog_order,
            sprint_order,
            version: INITIAL_VERSION,
            created_at: timestamp,
            modified_at: timestamp,
        })
    }

    /// Reconstructs a story from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedStoryData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            subject: data.subject,
            milestone: data.milestone,
            backlog_order: data.backlog_order,
            sprint_order: data.sprint_order,
            version: data.version,
            created_at: data.created_at,
            modified_at: data.modified_at,
        }
    }

    /// Returns the story identifier.
    #[must_use]
    pub const fn id(&self) -> StoryId {
        self.id
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

    /// Returns the milestone, if the story is planned into one.
    #[must_use]
    pub const fn milestone(&self) -> Option<MilestoneId> {
        self.milestone
    }

    /// Returns the group the story currently belongs to.
    #[must_use]
    pub const fn group(&self) -> BacklogGroup {
        BacklogGroup::from_milestone(self.milestone)
    }

    /// Returns the backlog ordering key.
    #[must_use]
    pub const fn backlog_order(&self) -> i64 {
        self.backlog_order
    }

    /// Returns the milestone ordering key.
    #[must_use]
    pub const fn sprint_order(&self) -> i64 {
        self.sprint_order
    }

    /// Returns the ordering key that applies inside the story's own group.
    #[must_use]
    pub const fn order(&self) -> i64 {
        if self.milestone.is_some() {
            self.sprint_order
        } else {
            self.backlog_order
        }
    }

    /// Returns the optimistic-concurrency version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub const fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    /// Moves the story to `order` inside `group` and bumps its version.
    pub fn reposition(&mut self, group: BacklogGroup, order: i64, modified_at: DateTime<Utc>) {
        self.milestone = group.milestone();
        if group.is_backlog() {
            self.backlog_order = order;
        } else {
            self.sprint_order = order;
        }
        self.version += 1;
        self.modified_at = modified_at;
    }
}
