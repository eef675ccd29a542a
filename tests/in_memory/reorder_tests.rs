//! Bulk reorders across the backlog and milestones.

use super::helpers::{Board, board};
use rstest::rstest;
use storyboard::backlog::{
    domain::{ActorId, BacklogGroup, InvalidAnchorReason, ReorderError},
    services::{BacklogOrderError, BulkUpdateOrderRequest, GroupOrder},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_to_the_beginning_renumbers_the_backlog(board: Board) -> Result<(), eyre::Report> {
    let us1 = board.story("us1", None).await?;
    let us2 = board.story("us2", None).await?;
    let us3 = board.story("us3", None).await?;
    let us4 = board.story("us4", None).await?;

    let rows = board
        .service
        .bulk_update_order(
            board.member,
            BulkUpdateOrderRequest::new(board.project, [us2, us4]),
        )
        .await?;

    let reported: Vec<_> = rows.iter().map(|row| (row.id, row.order)).collect();
    eyre::ensure!(
        reported
            == vec![
                (us2, GroupOrder::Backlog(1)),
                (us4, GroupOrder::Backlog(2)),
                (us1, GroupOrder::Backlog(3)),
                (us3, GroupOrder::Backlog(4)),
            ],
        "unexpected rows: {reported:?}"
    );
    eyre::ensure!(
        board.sequence(BacklogGroup::Backlog).await?
            == vec![(us2, 1), (us4, 2), (us1, 3), (us3, 4)],
        "backlog should follow the requested order"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sprint_stories_join_the_middle_of_the_backlog(board: Board) -> Result<(), eyre::Report> {
    let sprint = board.milestone("Sprint 1").await?;
    let us1 = board.story("us1", None).await?;
    let us2 = board.story("us2", Some(sprint)).await?;
    let us3 = board.story("us3", Some(sprint)).await?;
    let us4 = board.story("us4", None).await?;
    let us5 = board.story("us5", None).await?;

    board
        .service
        .bulk_update_order(
            board.member,
            BulkUpdateOrderRequest::new(board.project, [us1, us3]).after(us4),
        )
        .await?;

    eyre::ensure!(
        board.sequence(BacklogGroup::Backlog).await?
            == vec![(us4, 2), (us1, 3), (us3, 4), (us5, 5)],
        "moved block should follow the anchor"
    );
    eyre::ensure!(
        board.sequence(BacklogGroup::Milestone(sprint)).await? == vec![(us2, 1)],
        "the source milestone keeps its remaining order"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn before_anchor_places_block_ahead_of_it(board: Board) -> Result<(), eyre::Report> {
    let sprint = board.milestone("Sprint 1").await?;
    let a = board.story("a", Some(sprint)).await?;
    let b = board.story("b", Some(sprint)).await?;
    let c = board.story("c", Some(sprint)).await?;
    let incoming = board.story("incoming", None).await?;

    let rows = board
        .service
        .bulk_update_order(
            board.member,
            BulkUpdateOrderRequest::new(board.project, [incoming])
                .with_milestone(sprint)
                .before(b),
        )
        .await?;

    eyre::ensure!(
        rows.iter().all(|row| row.milestone == Some(sprint)),
        "every row should report the target milestone"
    );
    eyre::ensure!(
        board.sequence(BacklogGroup::Milestone(sprint)).await?
            == vec![(a, 1), (incoming, 2), (b, 3), (c, 4)],
        "incoming story should sit between a and b"
    );
    eyre::ensure!(
        board.sequence(BacklogGroup::Backlog).await?.is_empty(),
        "backlog should be empty"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn anchor_in_another_group_is_rejected(board: Board) -> Result<(), eyre::Report> {
    let sprint = board.milestone("Sprint 1").await?;
    let planned = board.story("planned", Some(sprint)).await?;
    let loose = board.story("loose", None).await?;
    let before = board.sequence(BacklogGroup::Backlog).await?;

    let result = board
        .service
        .bulk_update_order(
            board.member,
            BulkUpdateOrderRequest::new(board.project, [loose]).after(planned),
        )
        .await;

    eyre::ensure!(
        matches!(
            result,
            Err(BacklogOrderError::Reorder(ReorderError::InvalidAnchor {
                story_id,
                reason: InvalidAnchorReason::OutsideTargetGroup,
            })) if story_id == planned
        ),
        "expected an anchor outside the target group to be rejected, got {result:?}"
    );
    eyre::ensure!(
        board.sequence(BacklogGroup::Backlog).await? == before,
        "rejected moves should not write"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn non_member_is_forbidden(board: Board) -> Result<(), eyre::Report> {
    let story = board.story("us1", None).await?;
    let outsider = ActorId::new();

    let result = board
        .service
        .bulk_update_order(
            outsider,
            BulkUpdateOrderRequest::new(board.project, [story]),
        )
        .await;
    eyre::ensure!(
        matches!(result, Err(BacklogOrderError::Forbidden { actor, .. }) if actor == outsider),
        "expected forbidden, got {result:?}"
    );

    board.members.add_member(board.project, outsider)?;
    board
        .service
        .bulk_update_order(
            outsider,
            BulkUpdateOrderRequest::new(board.project, [story]),
        )
        .await?;
    Ok(())
}
