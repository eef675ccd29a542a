//! Error types for backlog domain validation and reordering.

use super::StoryId;
use std::fmt;
use thiserror::Error;

/// Errors returned while constructing backlog domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BacklogDomainError {
    /// The story subject is empty after trimming.
    #[error("story subject must not be empty")]
    EmptySubject,

    /// The story subject exceeds the stored column width.
    #[error("story subject has {length} characters, limit is {max}")]
    SubjectTooLong {
        /// Characters in the trimmed subject.
        length: usize,
        /// Maximum accepted characters.
        max: usize,
    },

    /// The milestone name is empty after trimming.
    #[error("milestone name must not be empty")]
    EmptyMilestoneName,

    /// The milestone name exceeds the stored column width.
    #[error("milestone name has {length} characters, limit is {max}")]
    MilestoneNameTooLong {
        /// Characters in the trimmed name.
        length: usize,
        /// Maximum accepted characters.
        max: usize,
    },
}

/// Why a moved story was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidItemReason {
    /// The story appears more than once in the moved list.
    Duplicate,
    /// The story does not belong to the project.
    NotInProject,
    /// The anchor story is also listed as moved.
    AnchorMoved,
}

impl InvalidItemReason {
    /// Returns a short human-readable description.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Duplicate => "listed more than once",
            Self::NotInProject => "does not belong to the project",
            Self::AnchorMoved => "is the anchor and cannot be moved",
        }
    }
}

impl fmt::Display for InvalidItemReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an anchor story was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidAnchorReason {
    /// The anchor does not belong to the project.
    NotInProject,
    /// The anchor sits in a group other than the move target.
    OutsideTargetGroup,
}

impl InvalidAnchorReason {
    /// Returns a short human-readable description.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotInProject => "does not belong to the project",
            Self::OutsideTargetGroup => "is not in the target group",
        }
    }
}

impl fmt::Display for InvalidAnchorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the reorder planner.
///
/// Both variants are caller errors: nothing has been written when they are
/// returned.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ReorderError {
    /// A moved story is invalid.
    #[error("invalid story {story_id}: {reason}")]
    InvalidItem {
        /// Offending story.
        story_id: StoryId,
        /// Rejection reason.
        reason: InvalidItemReason,
    },

    /// The anchor story is invalid.
    #[error("invalid anchor story {story_id}: {reason}")]
    InvalidAnchor {
        /// Offending anchor.
        story_id: StoryId,
        /// Rejection reason.
        reason: InvalidAnchorReason,
    },
}

/// Error returned while parsing an anchor policy name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown anchor policy: {0}")]
pub struct ParseAnchorPolicyError(pub String);
