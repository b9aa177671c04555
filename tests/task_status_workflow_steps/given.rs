//! Given steps for task status workflow BDD scenarios.

use super::world::{WorkflowWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use studioflow::task::domain::{NewTask, ResourceId, RevisionRequest, Schedule, ScheduleUnit};

fn supervisor() -> Result<ResourceId, eyre::Report> {
    ResourceId::new("supervisor").wrap_err("build scenario reviewer")
}

fn create_task(
    world: &mut WorkflowWorld,
    name: String,
    new_task: NewTask,
) -> Result<(), eyre::Report> {
    let reviewed = new_task.with_responsible([supervisor()?]);
    let created = run_async(world.service.create_task(reviewed))
        .wrap_err_with(|| format!("create task {name}"))?;
    world.tasks.insert(name, created.id());
    Ok(())
}

#[given(r#"a task "{name}" scheduled for {timing:u64} "{unit_code}""#)]
fn scheduled_task(
    world: &mut WorkflowWorld,
    name: String,
    timing: u64,
    unit_code: String,
) -> Result<(), eyre::Report> {
    let unit = ScheduleUnit::try_from(unit_code.as_str())
        .map_err(|err| eyre::eyre!("invalid schedule unit in scenario: {err}"))?;
    let new_task = NewTask::new(name.clone(), Schedule::new(timing, unit));
    create_task(world, name, new_task)
}

#[given(r#"a task "{name}" depending on "{prerequisite}""#)]
fn dependent_task(
    world: &mut WorkflowWorld,
    name: String,
    prerequisite: String,
) -> Result<(), eyre::Report> {
    let prerequisite_id = world.task_id(&prerequisite)?;
    let new_task =
        NewTask::new(name.clone(), Schedule::hours(10)).with_dependencies([prerequisite_id]);
    create_task(world, name, new_task)
}

#[given(r#""{name}" logged {hours:i64} hours"#)]
fn logged_hours(world: &mut WorkflowWorld, name: String, hours: i64) -> Result<(), eyre::Report> {
    let request = world.next_time_log(&name, hours)?;
    run_async(world.service.create_time_log(request))
        .wrap_err_with(|| format!("log {hours} hours on {name}"))?;
    Ok(())
}

#[given(r#""{name}" is completed"#)]
fn completed(world: &mut WorkflowWorld, name: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&name)?;
    run_async(world.service.request_review(task_id))
        .wrap_err_with(|| format!("submit {name} for review"))?;
    run_async(world.service.approve(task_id)).wrap_err_with(|| format!("approve {name}"))?;
    Ok(())
}

#[given(r#""{name}" is on hold"#)]
fn on_hold(world: &mut WorkflowWorld, name: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&name)?;
    run_async(world.service.hold(task_id)).wrap_err_with(|| format!("hold {name}"))?;
    Ok(())
}

#[given(r#"a revision of "{name}" is requested by "{reviewer}""#)]
fn revision_requested(
    world: &mut WorkflowWorld,
    name: String,
    reviewer: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&name)?;
    let reviewer_id = ResourceId::new(reviewer).wrap_err("build scenario reviewer")?;
    run_async(
        world
            .service
            .request_revision(task_id, RevisionRequest::new(reviewer_id)),
    )
    .wrap_err_with(|| format!("request a revision of {name}"))?;
    Ok(())
}
