//! Bulk reorder planning for backlog and milestone groups.
//!
//! [`plan_reorder`] is pure: it reads the stories of one project and
//! returns the `(group, order)` assignments needed to splice a block of
//! stories into a target group. Persisting the plan is the repository's job.
//!
//! Stories before the insertion point keep their order. The moved block
//! and every story after it are renumbered as one contiguous run starting
//! just past the last kept story. Groups the block leaves are not
//! compacted.

use super::{
    BacklogGroup, InvalidAnchorReason, InvalidItemReason, ParseAnchorPolicyError, ProjectId,
    ReorderError, StoryId, UserStory,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Where a moved block is inserted within the target group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Before every story already in the group.
    Start,
    /// Immediately after the given story.
    After(StoryId),
    /// Immediately before the given story.
    Before(StoryId),
}

impl Anchor {
    /// Returns the anchor story, if any.
    #[must_use]
    pub const fn story(self) -> Option<StoryId> {
        match self {
            Self::Start => None,
            Self::After(id) | Self::Before(id) => Some(id),
        }
    }
}

/// Handling of an anchor that lives outside the requested target group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPolicy {
    /// Reject the move with [`InvalidAnchorReason::OutsideTargetGroup`].
    #[default]
    Reject,
    /// Move the stories into the anchor's group instead.
    FollowAnchor,
}

impl AnchorPolicy {
    /// Returns the canonical configuration representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::FollowAnchor => "follow_anchor",
        }
    }
}

impl FromStr for AnchorPolicy {
    type Err = ParseAnchorPolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "follow_anchor" => Ok(Self::FollowAnchor),
            _ => Err(ParseAnchorPolicyError(value.to_owned())),
        }
    }
}

impl fmt::Display for AnchorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated bulk move of stories into a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderCommand {
    project_id: ProjectId,
    target_group: BacklogGroup,
    anchor: Anchor,
    moved: Vec<StoryId>,
}

impl ReorderCommand {
    /// Creates a move command. The order of `moved` is the order the stories
    /// take at the destination.
    #[must_use]
    pub const fn new(
        project_id: ProjectId,
        target_group: BacklogGroup,
        anchor: Anchor,
        moved: Vec<StoryId>,
    ) -> Self {
        Self {
            project_id,
            target_group,
            anchor,
            moved,
        }
    }

    /// Returns the project the move is scoped to.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the requested target group.
    #[must_use]
    pub const fn target_group(&self) -> BacklogGroup {
        self.target_group
    }

    /// Returns the insertion anchor.
    #[must_use]
    pub const fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Returns the moved stories in destination order.
    #[must_use]
    pub fn moved(&self) -> &[StoryId] {
        &self.moved
    }
}

/// New position of one story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAssignment {
    /// Story being repositioned.
    pub story_id: StoryId,
    /// Group the story ends up in.
    pub group: BacklogGroup,
    /// Ordering key inside `group`.
    pub order: i64,
    /// Version the story was read at; the write must match it.
    pub expected_version: u64,
    /// Whether the story was part of the moved block, as opposed to shifted.
    pub moved: bool,
}

/// Outcome of [`plan_reorder`]: every story whose position changes.
///
/// Besides the per-story versions, a plan carries the version of its target
/// group as read before the stories were loaded. Two plans that splice into
/// the same group from one snapshot can touch disjoint stories, so only the
/// group version tells them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    project_id: ProjectId,
    group: BacklogGroup,
    expected_group_version: u64,
    assignments: Vec<OrderAssignment>,
}

impl ReorderPlan {
    /// Sets the target group version the write must match.
    #[must_use]
    pub const fn with_group_version(mut self, version: u64) -> Self {
        self.expected_group_version = version;
        self
    }

    /// Returns the target group version the write must match.
    #[must_use]
    pub const fn expected_group_version(&self) -> u64 {
        self.expected_group_version
    }

    /// Returns the project the plan applies to.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the group that was reordered.
    #[must_use]
    pub const fn group(&self) -> BacklogGroup {
        self.group
    }

    /// Returns the assignments in destination order.
    #[must_use]
    pub fn assignments(&self) -> &[OrderAssignment] {
        &self.assignments
    }

    /// Returns `true` when nothing needs to be written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Returns the number of stories in the moved block.
    #[must_use]
    pub fn moved_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.moved).count()
    }
}

/// Computes the assignments that splice `command`'s stories into its group.
///
/// `stories` may contain stories of other projects; only those of the
/// command's project are considered. An empty moved list yields an empty
/// plan without further checks. The plan expects group version 0; callers
/// that read [`GroupVersions`](super::GroupVersions) attach the real one
/// with [`ReorderPlan::with_group_version`].
///
/// # Errors
///
/// Returns [`ReorderError::InvalidItem`] for duplicate, foreign or anchor
/// stories in the moved list and [`ReorderError::InvalidAnchor`] for a
/// foreign anchor or, under [`AnchorPolicy::Reject`], an anchor outside the
/// target group.
pub fn plan_reorder(
    stories: &[UserStory],
    command: &ReorderCommand,
    policy: AnchorPolicy,
) -> Result<ReorderPlan, ReorderError> {
    if command.moved().is_empty() {
        return Ok(ReorderPlan {
            project_id: command.project_id(),
            group: command.target_group(),
            expected_group_version: 0,
            assignments: Vec::new(),
        });
    }

    let by_id: HashMap<StoryId, &UserStory> = stories
        .iter()
        .filter(|story| story.project_id() == command.project_id())
        .map(|story| (story.id(), story))
        .collect();

    let moved = validate_moved(&by_id, command.moved())?;
    let anchor = resolve_anchor(&by_id, &moved, command.anchor())?;
    let group = resolve_group(command.target_group(), anchor, policy)?;

    let mut sequence: Vec<&UserStory> = by_id
        .values()
        .filter(|story| story.group() == group && !moved.contains(&story.id()))
        .copied()
        .collect();
    sequence.sort_by_key(|story| (story.order(), story.id()));

    let insert_at = insertion_index(&sequence, command.anchor())?;
    let floor = insert_at
        .checked_sub(1)
        .and_then(|last_kept| sequence.get(last_kept))
        .map_or(1, |story| story.order() + 1);
    let base = match (command.anchor(), anchor) {
        (Anchor::Before(_), Some(before)) => floor.max(before.order()),
        _ => floor,
    };

    let mut assignments = Vec::with_capacity(command.moved().len());
    let mut next = base;
    for story in command.moved().iter().filter_map(|id| by_id.get(id)) {
        assignments.push(OrderAssignment {
            story_id: story.id(),
            group,
            order: next,
            expected_version: story.version(),
            moved: true,
        });
        next += 1;
    }
    for story in sequence.iter().skip(insert_at) {
        if story.order() != next {
            assignments.push(OrderAssignment {
                story_id: story.id(),
                group,
                order: next,
                expected_version: story.version(),
                moved: false,
            });
        }
        next += 1;
    }

    Ok(ReorderPlan {
        project_id: command.project_id(),
        group,
        expected_group_version: 0,
        assignments,
    })
}

fn validate_moved(
    by_id: &HashMap<StoryId, &UserStory>,
    moved: &[StoryId],
) -> Result<HashSet<StoryId>, ReorderError> {
    let mut seen = HashSet::with_capacity(moved.len());
    for &story_id in moved {
        if !seen.insert(story_id) {
            return Err(ReorderError::InvalidItem {
                story_id,
                reason: InvalidItemReason::Duplicate,
            });
        }
        if !by_id.contains_key(&story_id) {
            return Err(ReorderError::InvalidItem {
                story_id,
                reason: InvalidItemReason::NotInProject,
            });
        }
    }
    Ok(seen)
}

fn resolve_anchor<'a>(
    by_id: &HashMap<StoryId, &'a UserStory>,
    moved: &HashSet<StoryId>,
    anchor: Anchor,
) -> Result<Option<&'a UserStory>, ReorderError> {
    let Some(story_id) = anchor.story() else {
        return Ok(None);
    };
    let story = by_id
        .get(&story_id)
        .copied()
        .ok_or(ReorderError::InvalidAnchor {
            story_id,
            reason: InvalidAnchorReason::NotInProject,
        })?;
    if moved.contains(&story_id) {
        return Err(ReorderError::InvalidItem {
            story_id,
            reason: InvalidItemReason::AnchorMoved,
        });
    }
    Ok(Some(story))
}

fn resolve_group(
    requested: BacklogGroup,
    anchor: Option<&UserStory>,
    policy: AnchorPolicy,
) -> Result<BacklogGroup, ReorderError> {
    match anchor {
        Some(story) if story.group() != requested => match policy {
            AnchorPolicy::Reject => Err(ReorderError::InvalidAnchor {
                story_id: story.id(),
                reason: InvalidAnchorReason::OutsideTargetGroup,
            }),
            AnchorPolicy::FollowAnchor => Ok(story.group()),
        },
        _ => Ok(requested),
    }
}

fn insertion_index(sequence: &[&UserStory], anchor: Anchor) -> Result<usize, ReorderError> {
    let position = |story_id: StoryId| {
        sequence
            .iter()
            .position(|story| story.id() == story_id)
            .ok_or(ReorderError::InvalidAnchor {
                story_id,
                reason: InvalidAnchorReason::OutsideTargetGroup,
            })
    };
    match anchor {
        Anchor::Start => Ok(0),
        Anchor::After(story_id) => position(story_id).map(|index| index + 1),
        Anchor::Before(story_id) => position(story_id),
    }
}
