//! When steps for backlog reorder BDD scenarios.

use super::world::{BacklogWorld, run_async};
use rstest_bdd_macros::when;
use storyboard::backlog::services::BulkUpdateOrderRequest;

#[when(r#"stories "{labels}" are moved to the start of the backlog"#)]
fn move_to_start(world: &mut BacklogWorld, labels: String) -> Result<(), eyre::Report> {
    let request = BulkUpdateOrderRequest::new(world.project, world.story_ids(&labels)?);
    world.last_result = Some(run_async(
        world.service.bulk_update_order(world.member, request),
    ));
    Ok(())
}

#[when(r#"stories "{labels}" are moved into the backlog after "{anchor}""#)]
fn move_after(
    world: &mut BacklogWorld,
    labels: String,
    anchor: String,
) -> Result<(), eyre::Report> {
    let request = BulkUpdateOrderRequest::new(world.project, world.story_ids(&labels)?)
        .after(world.story_id(&anchor)?);
    world.last_result = Some(run_async(
        world.service.bulk_update_order(world.member, request),
    ));
    Ok(())
}
