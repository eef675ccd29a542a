//! Given steps for backlog reorder BDD scenarios.

use super::world::{BacklogWorld, run_async, split_labels};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use storyboard::backlog::{domain::ProjectId, services::CreateStoryRequest};

#[given(r#"a backlog with stories "{labels}""#)]
fn backlog_with_stories(world: &mut BacklogWorld, labels: String) -> Result<(), eyre::Report> {
    for label in split_labels(&labels) {
        let story = run_async(
            world
                .service
                .create_story(CreateStoryRequest::new(world.project, label)),
        )
        .wrap_err_with(|| format!("create backlog story {label}"))?;
        world.stories.insert(label.to_owned(), story.id());
    }
    Ok(())
}

#[given(r#"a milestone "{name}" with stories "{labels}""#)]
fn milestone_with_stories(
    world: &mut BacklogWorld,
    name: String,
    labels: String,
) -> Result<(), eyre::Report> {
    let milestone = run_async(world.service.create_milestone(world.project, name.as_str()))
        .wrap_err("create milestone")?;
    for label in split_labels(&labels) {
        let request =
            CreateStoryRequest::new(world.project, label).with_milestone(milestone.id());
        let story = run_async(world.service.create_story(request))
            .wrap_err_with(|| format!("create milestone story {label}"))?;
        world.stories.insert(label.to_owned(), story.id());
    }
    world.milestones.insert(name, milestone.id());
    Ok(())
}

#[given(r#"another project with story "{label}""#)]
fn foreign_story(world: &mut BacklogWorld, label: String) -> Result<(), eyre::Report> {
    let story = run_async(
        world
            .service
            .create_story(CreateStoryRequest::new(ProjectId::new(), label.as_str())),
    )
    .wrap_err("create foreign story")?;
    world.stories.insert(label, story.id());
    Ok(())
}
