//! Concurrent bulk reorders against one project.

use std::collections::HashMap;
use std::sync::Arc;

use super::helpers::{Board, board};
use mockable::{Clock, DefaultClock};
use rstest::rstest;
use storyboard::backlog::{
    domain::{
        Anchor, AnchorPolicy, BacklogGroup, ReorderCommand, ReorderPlan, StoryId, plan_reorder,
    },
    ports::{BacklogRepository, BacklogRepositoryError},
    services::BulkUpdateOrderRequest,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_plan_is_refused_after_a_concurrent_move(board: Board) -> Result<(), eyre::Report> {
    let us1 = board.story("us1", None).await?;
    let us2 = board.story("us2", None).await?;
    let us3 = board.story("us3", None).await?;
    let snapshot = board.repository.stories_in_project(board.project).await?;
    let stale = plan_reorder(
        &snapshot,
        &ReorderCommand::new(board.project, BacklogGroup::Backlog, Anchor::Start, vec![us3]),
        AnchorPolicy::Reject,
    )?;

    board
        .service
        .bulk_update_order(
            board.member,
            BulkUpdateOrderRequest::new(board.project, [us2]),
        )
        .await?;
    let committed = board.sequence(BacklogGroup::Backlog).await?;
    let result = board
        .repository
        .apply_reorder(&stale, DefaultClock.utc())
        .await;

    eyre::ensure!(
        matches!(result, Err(BacklogRepositoryError::VersionConflict(_))),
        "expected a version conflict, got {result:?}"
    );
    eyre::ensure!(
        board.sequence(BacklogGroup::Backlog).await? == committed,
        "conflicting plan must not write"
    );
    eyre::ensure!(
        committed == vec![(us2, 1), (us1, 2), (us3, 3)],
        "unexpected committed order {committed:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_reorders_leave_a_consistent_backlog(board: Board) -> Result<(), eyre::Report> {
    let mut ids = Vec::new();
    for index in 0..6 {
        ids.push(board.story(&format!("us{index}"), None).await?);
    }
    let shared_board = Arc::new(board);

    let mut handles = Vec::new();
    for story in ids.iter().rev().copied() {
        let shared = Arc::clone(&shared_board);
        handles.push(tokio::spawn(async move {
            shared
                .service
                .bulk_update_order(
                    shared.member,
                    BulkUpdateOrderRequest::new(shared.project, [story]),
                )
                .await
        }));
    }
    for handle in handles {
        if let Err(err) = handle.await? {
            eyre::ensure!(err.is_conflict(), "only conflicts are expected, got {err}");
        }
    }

    let orders: Vec<i64> = shared_board
        .sequence(BacklogGroup::Backlog)
        .await?
        .into_iter()
        .map(|(_, order)| order)
        .collect();
    eyre::ensure!(
        orders == vec![1, 2, 3, 4, 5, 6],
        "backlog must stay densely numbered, got {orders:?}"
    );
    Ok(())
}

#[rstest]
#[case::backlog_and_sprint_story("b", "d")]
#[case::two_sprint_stories("d", "e")]
#[tokio::test(flavor = "multi_thread")]
async fn plans_filling_the_same_slot_cannot_both_commit(
    board: Board,
    #[case] first: &str,
    #[case] second: &str,
) -> Result<(), eyre::Report> {
    let sprint = board.milestone("Sprint 1").await?;
    let mut ids = HashMap::new();
    for label in ["a", "b", "c"] {
        ids.insert(label, board.story(label, None).await?);
    }
    for label in ["d", "e"] {
        ids.insert(label, board.story(label, Some(sprint)).await?);
    }
    let id = |label: &str| -> Result<StoryId, eyre::Report> {
        ids.get(label)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown story {label}"))
    };
    let anchor = id("c")?;

    let versions = board.repository.group_versions(board.project).await?;
    let snapshot = board.repository.stories_in_project(board.project).await?;
    let plan_after_anchor = |story: StoryId| -> Result<ReorderPlan, eyre::Report> {
        let command = ReorderCommand::new(
            board.project,
            BacklogGroup::Backlog,
            Anchor::After(anchor),
            vec![story],
        );
        let planned = plan_reorder(&snapshot, &command, AnchorPolicy::Reject)?;
        Ok(planned.with_group_version(versions.version_of(BacklogGroup::Backlog)))
    };
    let winner = plan_after_anchor(id(first)?)?;
    let loser = plan_after_anchor(id(second)?)?;

    board
        .repository
        .apply_reorder(&winner, DefaultClock.utc())
        .await?;
    let committed = board.sequence(BacklogGroup::Backlog).await?;
    let result = board
        .repository
        .apply_reorder(&loser, DefaultClock.utc())
        .await;

    eyre::ensure!(
        matches!(
            result,
            Err(BacklogRepositoryError::GroupConflict {
                group: BacklogGroup::Backlog,
                ..
            })
        ),
        "expected a group conflict, got {result:?}"
    );
    eyre::ensure!(
        board.sequence(BacklogGroup::Backlog).await? == committed,
        "conflicting plan must not write"
    );
    let orders: Vec<i64> = committed.iter().map(|(_, order)| *order).collect();
    eyre::ensure!(
        orders
            .windows(2)
            .all(|pair| matches!(pair, [low, high] if low < high)),
        "backlog orders must stay strictly increasing, got {orders:?}"
    );
    Ok(())
}
