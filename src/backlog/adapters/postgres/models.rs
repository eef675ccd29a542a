//! Diesel row models for backlog persistence.

use super::schema::{backlog_group_versions, milestones, user_stories};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for user stories.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_stories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StoryRow {
    /// Story identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Story subject.
    pub subject: String,
    /// Milestone, `None` for the backlog.
    pub milestone_id: Option<uuid::Uuid>,
    /// Position inside the backlog.
    pub backlog_order: i64,
    /// Position inside the milestone.
    pub sprint_order: i64,
    /// Optimistic-concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub modified_at: DateTime<Utc>,
}

/// Insert model for user stories.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_stories)]
pub struct NewStoryRow {
    /// Story identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Story subject.
    pub subject: String,
    /// Milestone, `None` for the backlog.
    pub milestone_id: Option<uuid::Uuid>,
    /// Position inside the backlog.
    pub backlog_order: i64,
    /// Position inside the milestone.
    pub sprint_order: i64,
    /// Optimistic-concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub modified_at: DateTime<Utc>,
}

/// Query and insert row for milestones.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = milestones)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MilestoneRow {
    /// Milestone identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query and insert row for group reorder versions.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = backlog_group_versions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GroupVersionRow {
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Milestone of the group, nil for the backlog.
    pub milestone_id: uuid::Uuid,
    /// Number of reorders applied to the group.
    pub version: i64,
}
