//! Then steps for task status workflow BDD scenarios.

use super::world::{WorkflowWorld, run_async};
use rstest_bdd_macros::then;
use studioflow::task::{
    domain::{DependencyTarget, Schedule, ScheduleUnit, TaskStatus, WorkflowError},
    services::TaskWorkflowError,
};

#[then(r#""{name}" has status "{code}""#)]
fn has_status(world: &WorkflowWorld, name: String, code: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(code.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = world.stored_task(&name)?;

    if task.status() != expected {
        return Err(eyre::eyre!(
            "expected {name} to be {}, found {}",
            expected.code(),
            task.status().code()
        ));
    }

    Ok(())
}

#[then(r#""{name}" has priority {priority:u16}"#)]
fn has_priority(world: &WorkflowWorld, name: String, priority: u16) -> Result<(), eyre::Report> {
    let task = world.stored_task(&name)?;
    eyre::ensure!(
        task.priority().value() == priority,
        "expected {name} at priority {priority}, found {}",
        task.priority().value()
    );
    Ok(())
}

#[then(r#""{name}" is scheduled for {timing:u64} "{unit_code}""#)]
fn is_scheduled_for(
    world: &WorkflowWorld,
    name: String,
    timing: u64,
    unit_code: String,
) -> Result<(), eyre::Report> {
    let unit = ScheduleUnit::try_from(unit_code.as_str())
        .map_err(|err| eyre::eyre!("invalid schedule unit in scenario: {err}"))?;
    let expected = Schedule::new(timing, unit);
    let task = world.stored_task(&name)?;
    eyre::ensure!(
        task.schedule() == expected,
        "expected {name} scheduled for {expected}, found {}",
        task.schedule()
    );
    Ok(())
}

#[then(r#"the dependency of "{dependent}" on "{prerequisite}" targets "{target}""#)]
fn dependency_targets(
    world: &WorkflowWorld,
    dependent: String,
    prerequisite: String,
    target: String,
) -> Result<(), eyre::Report> {
    let expected = DependencyTarget::try_from(target.as_str())
        .map_err(|err| eyre::eyre!("invalid dependency target in scenario: {err}"))?;
    let edge = run_async(
        world
            .service
            .find_dependency(world.task_id(&dependent)?, world.task_id(&prerequisite)?),
    )?;
    eyre::ensure!(
        edge.target() == expected,
        "expected {dependent} to depend on {prerequisite} {expected}, found {}",
        edge.target()
    );
    Ok(())
}

#[then("the action is rejected as a workflow violation")]
fn rejected_as_workflow_violation(world: &WorkflowWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_action_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing action result"))?;

    if !matches!(
        result,
        Err(TaskWorkflowError::Workflow(WorkflowError::Status(_)))
    ) {
        return Err(eyre::eyre!("expected a workflow violation, got {result:?}"));
    }

    Ok(())
}
