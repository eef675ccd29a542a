//! Milestone (sprint) aggregate.

use super::{BacklogDomainError, MilestoneId, ProjectId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Maximum name length in characters, matching the `VARCHAR(255)` column.
pub const MAX_MILESTONE_NAME_LENGTH: usize = 255;

/// A time-boxed grouping of stories inside a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    id: MilestoneId,
    project_id: ProjectId,
    name: String,
    created_at: DateTime<Utc>,
}

impl Milestone {
    /// Creates a new milestone.
    ///
    /// # Errors
    ///
    /// Returns [`BacklogDomainError::EmptyMilestoneName`] when the name is
    /// blank and [`BacklogDomainError::MilestoneNameTooLong`] when it exceeds
    /// [`MAX_MILESTONE_NAME_LENGTH`] characters.
    pub fn new(
        project_id: ProjectId,
        name: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, BacklogDomainError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BacklogDomainError::EmptyMilestoneName);
        }
        let length = trimmed.chars().count();
        if length > MAX_MILESTONE_NAME_LENGTH {
            return Err(BacklogDomainError::MilestoneNameTooLong {
                length,
                max: MAX_MILESTONE_NAME_LENGTH,
            });
        }
        Ok(Self {
            id: MilestoneId::new(),
            project_id,
            name: trimmed.to_owned(),
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a milestone from persisted columns.
    #[must_use]
    pub const fn from_persisted(
        id: MilestoneId,
        project_id: ProjectId,
        name: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            project_id,
            name,
            created_at,
        }
    }

    /// Returns the milestone identifier.
    #[must_use]
    pub const fn id(&self) -> MilestoneId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the milestone name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
