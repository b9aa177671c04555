//! When steps for task status workflow BDD scenarios.

use super::world::{WorkflowWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use studioflow::task::domain::{HasReviews, ResourceId, Review, RevisionRequest};

#[when(r#""{name}" is put on hold"#)]
fn put_on_hold(world: &mut WorkflowWorld, name: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&name)?;
    world.last_action_result = Some(run_async(world.service.hold(task_id)));
    Ok(())
}

#[when(r#""{name}" is stopped"#)]
fn stopped(world: &mut WorkflowWorld, name: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&name)?;
    world.last_action_result = Some(run_async(world.service.stop(task_id)));
    Ok(())
}

#[when(r#""{name}" is resumed"#)]
fn resumed(world: &mut WorkflowWorld, name: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&name)?;
    world.last_action_result = Some(run_async(world.service.resume(task_id)));
    Ok(())
}

#[when(r#""{name}" is submitted for review"#)]
fn submitted_for_review(world: &mut WorkflowWorld, name: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&name)?;
    let result = run_async(world.service.request_review(task_id));
    world.last_action_result = Some(result.map(drop));
    Ok(())
}

#[when(r#"every review of "{name}" is approved"#)]
fn every_review_approved(world: &mut WorkflowWorld, name: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&name)?;
    let pending = world
        .stored_task(&name)?
        .pending_reviews()
        .map(Review::id)
        .collect::<Vec<_>>();
    eyre::ensure!(!pending.is_empty(), "{name} ({task_id}) has no pending reviews");
    for review_id in pending {
        run_async(world.service.approve_review(review_id))
            .wrap_err_with(|| format!("approve review {review_id} of {name}"))?;
    }
    world.last_action_result = Some(Ok(()));
    Ok(())
}

#[when(r#"a revision of "{name}" is requested by "{reviewer}""#)]
fn revision_requested(
    world: &mut WorkflowWorld,
    name: String,
    reviewer: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&name)?;
    let reviewer_id = ResourceId::new(reviewer).wrap_err("build scenario reviewer")?;
    let result = run_async(
        world
            .service
            .request_revision(task_id, RevisionRequest::new(reviewer_id)),
    );
    world.last_action_result = Some(result.map(drop));
    Ok(())
}
