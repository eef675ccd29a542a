//! `PostgreSQL` repository implementation for backlog storage.

use super::{
    models::{GroupVersionRow, MilestoneRow, NewStoryRow, StoryRow},
    schema::{backlog_group_versions, milestones, user_stories},
};
use crate::backlog::{
    domain::{
        BacklogGroup, GroupVersions, Milestone, MilestoneId, OrderAssignment, PersistedStoryData,
        ProjectId, ReorderPlan, StoryId, UserStory,
    },
    ports::{BacklogRepository, BacklogRepositoryError, BacklogRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{exists, max};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by backlog adapters.
pub type BacklogPgPool = Pool<ConnectionManager<PgConnection>>;

/// `milestone_id` key of the backlog row in `backlog_group_versions`.
const BACKLOG_GROUP_KEY: uuid::Uuid = uuid::Uuid::nil();

impl From<DieselError> for BacklogRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// `PostgreSQL`-backed backlog repository.
///
/// Diesel calls run on the blocking thread pool. Reorder plans are written
/// in one transaction; every row update is guarded by its expected
/// `version` and the target group's row in `backlog_group_versions` by the
/// plan's group version, so a concurrent writer rolls the whole plan back.
#[derive(Debug, Clone)]
pub struct PostgresBacklogRepository {
    pool: BacklogPgPool,
}

impl PostgresBacklogRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: BacklogPgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &BacklogPgPool {
        &self.pool
    }

    async fn run_blocking<F, T>(&self, f: F) -> BacklogRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> BacklogRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(BacklogRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(BacklogRepositoryError::persistence)?
    }
}

#[async_trait]
impl BacklogRepository for PostgresBacklogRepository {
    async fn store_milestone(&self, milestone: &Milestone) -> BacklogRepositoryResult<()> {
        let milestone_id = milestone.id();
        let row = MilestoneRow {
            id: milestone_id.into_inner(),
            project_id: milestone.project_id().into_inner(),
            name: milestone.name().to_owned(),
            created_at: milestone.created_at(),
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(milestones::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        BacklogRepositoryError::DuplicateMilestone(milestone_id)
                    }
                    _ => BacklogRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_milestone(&self, id: MilestoneId) -> BacklogRepositoryResult<Option<Milestone>> {
        self.run_blocking(move |connection| {
            let row = milestones::table
                .filter(milestones::id.eq(id.into_inner()))
                .select(MilestoneRow::as_select())
                .first::<MilestoneRow>(connection)
                .optional()?;
            Ok(row.map(row_to_milestone))
        })
        .await
    }

    async fn store_story(&self, story: &UserStory) -> BacklogRepositoryResult<()> {
        let story_id = story.id();
        let new_row = to_new_row(story)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(user_stories::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        BacklogRepositoryError::DuplicateStory(story_id)
                    }
                    _ => BacklogRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_story(&self, id: StoryId) -> BacklogRepositoryResult<Option<UserStory>> {
        self.run_blocking(move |connection| {
            let row = user_stories::table
                .filter(user_stories::id.eq(id.into_inner()))
                .select(StoryRow::as_select())
                .first::<StoryRow>(connection)
                .optional()?;
            row.map(row_to_story).transpose()
        })
        .await
    }

    async fn stories_in_project(
        &self,
        project_id: ProjectId,
    ) -> BacklogRepositoryResult<Vec<UserStory>> {
        self.run_blocking(move |connection| {
            let rows = user_stories::table
                .filter(user_stories::project_id.eq(project_id.into_inner()))
                .select(StoryRow::as_select())
                .load::<StoryRow>(connection)?;
            rows.into_iter().map(row_to_story).collect()
        })
        .await
    }

    async fn stories_in_group(
        &self,
        project_id: ProjectId,
        group: BacklogGroup,
    ) -> BacklogRepositoryResult<Vec<UserStory>> {
        self.run_blocking(move |connection| {
            let in_project = user_stories::table
                .filter(user_stories::project_id.eq(project_id.into_inner()))
                .select(StoryRow::as_select());
            let rows = match group {
                BacklogGroup::Backlog => in_project
                    .filter(user_stories::milestone_id.is_null())
                    .order((user_stories::backlog_order.asc(), user_stories::id.asc()))
                    .load::<StoryRow>(connection)?,
                BacklogGroup::Milestone(milestone_id) => in_project
                    .filter(user_stories::milestone_id.eq(milestone_id.into_inner()))
                    .order((user_stories::sprint_order.asc(), user_stories::id.asc()))
                    .load::<StoryRow>(connection)?,
            };
            rows.into_iter().map(row_to_story).collect()
        })
        .await
    }

    async fn next_order(
        &self,
        project_id: ProjectId,
        group: BacklogGroup,
    ) -> BacklogRepositoryResult<i64> {
        self.run_blocking(move |connection| {
            let in_project =
                user_stories::table.filter(user_stories::project_id.eq(project_id.into_inner()));
            let current_max = match group {
                BacklogGroup::Backlog => in_project
                    .filter(user_stories::milestone_id.is_null())
                    .select(max(user_stories::backlog_order))
                    .get_result::<Option<i64>>(connection)?,
                BacklogGroup::Milestone(milestone_id) => in_project
                    .filter(user_stories::milestone_id.eq(milestone_id.into_inner()))
                    .select(max(user_stories::sprint_order))
                    .get_result::<Option<i64>>(connection)?,
            };
            Ok(current_max.map_or(1, |order| order + 1))
        })
        .await
    }

    async fn group_versions(
        &self,
        project_id: ProjectId,
    ) -> BacklogRepositoryResult<GroupVersions> {
        self.run_blocking(move |connection| {
            let rows = backlog_group_versions::table
                .filter(backlog_group_versions::project_id.eq(project_id.into_inner()))
                .select(GroupVersionRow::as_select())
                .load::<GroupVersionRow>(connection)?;
            rows.into_iter()
                .map(|row| -> BacklogRepositoryResult<(BacklogGroup, u64)> {
                    let version =
                        u64::try_from(row.version).map_err(BacklogRepositoryError::persistence)?;
                    Ok((group_from_key(row.milestone_id), version))
                })
                .collect()
        })
        .await
    }

    async fn apply_reorder(
        &self,
        plan: &ReorderPlan,
        modified_at: DateTime<Utc>,
    ) -> BacklogRepositoryResult<()> {
        let assignments = plan.assignments().to_vec();
        if assignments.is_empty() {
            return Ok(());
        }
        let project_id = plan.project_id();
        let group = plan.group();
        let expected_group_version = plan.expected_group_version();

        self.run_blocking(move |connection| {
            connection.transaction::<_, BacklogRepositoryError, _>(|tx| {
                for assignment in &assignments {
                    apply_assignment(tx, assignment, modified_at)?;
                }
                bump_group_version(tx, project_id, group, expected_group_version)
            })
        })
        .await
    }
}

fn group_key(group: BacklogGroup) -> uuid::Uuid {
    group
        .milestone()
        .map_or(BACKLOG_GROUP_KEY, MilestoneId::into_inner)
}

fn group_from_key(key: uuid::Uuid) -> BacklogGroup {
    if key == BACKLOG_GROUP_KEY {
        BacklogGroup::Backlog
    } else {
        BacklogGroup::Milestone(MilestoneId::from_uuid(key))
    }
}

/// Moves the group's version from `expected` to `expected + 1`.
///
/// The first reorder of a group inserts its row; a concurrent first reorder
/// blocks on the primary key and then inserts nothing.
fn bump_group_version(
    connection: &mut PgConnection,
    project_id: ProjectId,
    group: BacklogGroup,
    expected: u64,
) -> BacklogRepositoryResult<()> {
    let project_key = project_id.into_inner();
    let milestone_key = group_key(group);

    let written = if expected == 0 {
        let row = GroupVersionRow {
            project_id: project_key,
            milestone_id: milestone_key,
            version: 1,
        };
        diesel::insert_into(backlog_group_versions::table)
            .values(&row)
            .on_conflict_do_nothing()
            .execute(connection)?
    } else {
        let expected_version =
            i64::try_from(expected).map_err(BacklogRepositoryError::persistence)?;
        let target = backlog_group_versions::table
            .filter(backlog_group_versions::project_id.eq(project_key))
            .filter(backlog_group_versions::milestone_id.eq(milestone_key))
            .filter(backlog_group_versions::version.eq(expected_version));
        diesel::update(target)
            .set(backlog_group_versions::version.eq(backlog_group_versions::version + 1_i64))
            .execute(connection)?
    };

    if written == 0 {
        return Err(BacklogRepositoryError::GroupConflict { project_id, group });
    }
    Ok(())
}

fn apply_assignment(
    connection: &mut PgConnection,
    assignment: &OrderAssignment,
    modified_at: DateTime<Utc>,
) -> BacklogRepositoryResult<()> {
    let story_id = assignment.story_id;
    let expected_version =
        i64::try_from(assignment.expected_version).map_err(BacklogRepositoryError::persistence)?;
    let target = user_stories::table
        .filter(user_stories::id.eq(story_id.into_inner()))
        .filter(user_stories::version.eq(expected_version));

    let updated = match assignment.group {
        BacklogGroup::Backlog => diesel::update(target)
            .set((
                user_stories::milestone_id.eq(None::<uuid::Uuid>),
                user_stories::backlog_order.eq(assignment.order),
                user_stories::version.eq(user_stories::version + 1_i64),
                user_stories::modified_at.eq(modified_at),
            ))
            .execute(connection)?,
        BacklogGroup::Milestone(milestone_id) => diesel::update(target)
            .set((
                user_stories::milestone_id.eq(Some(milestone_id.into_inner())),
                user_stories::sprint_order.eq(assignment.order),
                user_stories::version.eq(user_stories::version + 1_i64),
                user_stories::modified_at.eq(modified_at),
            ))
            .execute(connection)?,
    };

    if updated == 0 {
        let still_exists = diesel::select(exists(
            user_stories::table.filter(user_stories::id.eq(story_id.into_inner())),
        ))
        .get_result::<bool>(connection)?;
        return Err(if still_exists {
            BacklogRepositoryError::VersionConflict(story_id)
        } else {
            BacklogRepositoryError::StoryNotFound(story_id)
        });
    }
    Ok(())
}

fn to_new_row(story: &UserStory) -> BacklogRepositoryResult<NewStoryRow> {
    let version = i64::try_from(story.version()).map_err(BacklogRepositoryError::persistence)?;
    Ok(NewStoryRow {
        id: story.id().into_inner(),
        project_id: story.project_id().into_inner(),
        subject: story.subject().to_owned(),
        milestone_id: story.milestone().map(MilestoneId::into_inner),
        backlog_order: story.backlog_order(),
        sprint_order: story.sprint_order(),
        version,
        created_at: story.created_at(),
        modified_at: story.modified_at(),
    })
}

fn row_to_story(row: StoryRow) -> BacklogRepositoryResult<UserStory> {
    let StoryRow {
        id,
        project_id,
        subject,
        milestone_id,
        backlog_order,
        sprint_order,
        version: persisted_version,
        created_at,
        modified_at,
    } = row;

    let version = u64::try_from(persisted_version).map_err(BacklogRepositoryError::persistence)?;
    Ok(UserStory::from_persisted(PersistedStoryData {
        id: StoryId::from_uuid(id),
        project_id: ProjectId::from_uuid(project_id),
        subject,
        milestone: milestone_id.map(MilestoneId::from_uuid),
        backlog_order,
        sprint_order,
        version,
        created_at,
        modified_at,
    }))
}

fn row_to_milestone(row: MilestoneRow) -> Milestone {
    Milestone::from_persisted(
        MilestoneId::from_uuid(row.id),
        ProjectId::from_uuid(row.project_id),
        row.name,
        row.created_at,
    )
}
