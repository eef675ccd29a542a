//! Story creation through the backlog order service.

use super::helpers::{Board, board};
use rstest::rstest;
use storyboard::backlog::{domain::BacklogGroup, services::BacklogOrderError};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stories_append_per_group(board: Board) -> Result<(), eyre::Report> {
    let sprint = board.milestone("Sprint 1").await?;
    let first = board.story("first", None).await?;
    let planned = board.story("planned", Some(sprint)).await?;
    let second = board.story("second", None).await?;

    eyre::ensure!(
        board.sequence(BacklogGroup::Backlog).await? == vec![(first, 1), (second, 2)],
        "backlog stories should be numbered in creation order"
    );
    eyre::ensure!(
        board.sequence(BacklogGroup::Milestone(sprint)).await? == vec![(planned, 1)],
        "milestone numbering is independent of the backlog"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_subject_is_a_client_error(board: Board) {
    let err = board
        .story("   ", None)
        .await
        .expect_err("blank subject should be rejected");
    let service_error = err
        .downcast_ref::<BacklogOrderError>()
        .expect("service error should be preserved");
    assert!(service_error.is_client_error());
}
