//! Hierarchy and dependency walks over committed tasks.

use super::helpers::{TestService, service};
use eyre::ensure;
use rstest::rstest;
use studioflow::task::{
    domain::{NewTask, NotFoundError, Schedule, TaskId, WorkflowError},
    services::TaskWorkflowError,
};

async fn create(
    service: &TestService,
    name: &str,
    parent: Option<TaskId>,
    depends: &[TaskId],
) -> eyre::Result<TaskId> {
    let mut new_task =
        NewTask::new(name, Schedule::hours(4)).with_dependencies(depends.iter().copied());
    if let Some(parent_id) = parent {
        new_task = new_task.with_parent(parent_id);
    }
    Ok(service.create_task(new_task).await?.id())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn hierarchy_walk_lists_levels_in_creation_order(service: TestService) -> eyre::Result<()> {
    let project = create(&service, "Project", None, &[]).await?;
    let sequence = create(&service, "SEQ010", Some(project), &[]).await?;
    let asset = create(&service, "Hero", Some(project), &[]).await?;
    let shot = create(&service, "SH010", Some(sequence), &[]).await?;
    let model = create(&service, "Model", Some(asset), &[]).await?;

    let walked = service.walk_hierarchy(project).await?;

    ensure!(walked == [project, sequence, asset, shot, model]);
    ensure!(service.walk_hierarchy(shot).await? == [shot]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dependency_walk_repeats_shared_prerequisites(service: TestService) -> eyre::Result<()> {
    let task3 = create(&service, "Task 3", None, &[]).await?;
    let task8 = create(&service, "Task 8", None, &[]).await?;
    let task4 = create(&service, "Task 4", None, &[task8, task3]).await?;
    let task5 = create(&service, "Task 5", None, &[task4]).await?;
    let task6 = create(&service, "Task 6", None, &[task4, task5]).await?;
    let task9 = create(&service, "Task 9", None, &[task6]).await?;

    let walked = service.walk_dependencies(task9).await?;

    ensure!(walked == [task9, task6, task4, task5, task8, task3, task4, task8, task3]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn walks_from_unknown_tasks_are_not_found(service: TestService) -> eyre::Result<()> {
    let missing = TaskId::new();

    let result = service.walk_dependencies(missing).await;

    ensure!(matches!(
        result,
        Err(TaskWorkflowError::Workflow(WorkflowError::NotFound(NotFoundError::Task(id))))
            if id == missing
    ));
    Ok(())
}
