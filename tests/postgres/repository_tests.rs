//! Story and milestone persistence against `PostgreSQL`.

use super::helpers::repository;
use mockable::DefaultClock;
use storyboard::backlog::{
    domain::{BacklogGroup, INITIAL_VERSION, Milestone, ProjectId, UserStory},
    ports::{BacklogRepository, BacklogRepositoryError},
};

#[tokio::test(flavor = "multi_thread")]
async fn stored_story_round_trips() -> Result<(), eyre::Report> {
    let Some(repo) = repository()? else {
        return Ok(());
    };
    let project = ProjectId::new();
    let milestone = Milestone::new(project, "Sprint 1", &DefaultClock)?;
    repo.store_milestone(&milestone).await?;
    let story = UserStory::new(
        project,
        "Persist me",
        BacklogGroup::Milestone(milestone.id()),
        1,
        &DefaultClock,
    )?;
    repo.store_story(&story).await?;

    let found = repo
        .find_story(story.id())
        .await?
        .ok_or_else(|| eyre::eyre!("stored story should be found"))?;
    eyre::ensure!(found.subject() == "Persist me", "subject mismatch");
    eyre::ensure!(found.group() == story.group(), "group mismatch");
    eyre::ensure!(found.sprint_order() == 1, "sprint order mismatch");
    eyre::ensure!(found.version() == INITIAL_VERSION, "version mismatch");

    let found_milestone = repo
        .find_milestone(milestone.id())
        .await?
        .ok_or_else(|| eyre::eyre!("stored milestone should be found"))?;
    eyre::ensure!(found_milestone.project_id() == project, "project mismatch");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_story_is_reported() -> Result<(), eyre::Report> {
    let Some(repo) = repository()? else {
        return Ok(());
    };
    let story = UserStory::new(
        ProjectId::new(),
        "Only once",
        BacklogGroup::Backlog,
        1,
        &DefaultClock,
    )?;
    repo.store_story(&story).await?;

    let result = repo.store_story(&story).await;
    eyre::ensure!(
        matches!(result, Err(BacklogRepositoryError::DuplicateStory(id)) if id == story.id()),
        "expected duplicate story error, got {result:?}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn next_order_follows_the_group_maximum() -> Result<(), eyre::Report> {
    let Some(repo) = repository()? else {
        return Ok(());
    };
    let project = ProjectId::new();
    eyre::ensure!(
        repo.next_order(project, BacklogGroup::Backlog).await? == 1,
        "empty group starts at one"
    );
    for order in [3, 7] {
        let story = UserStory::new(
            project,
            format!("at {order}"),
            BacklogGroup::Backlog,
            order,
            &DefaultClock,
        )?;
        repo.store_story(&story).await?;
    }
    eyre::ensure!(
        repo.next_order(project, BacklogGroup::Backlog).await? == 8,
        "next order should follow the highest order"
    );
    Ok(())
}
