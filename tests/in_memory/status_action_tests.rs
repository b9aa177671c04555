//! Hold, stop and resume through the workflow service.

use super::helpers::{
    TestService, complete, create_reviewed, log_work, resource, service, status, stored,
};
use eyre::ensure;
use rstest::rstest;
use studioflow::task::domain::{
    NewTask, Priority, RevisionRequest, Schedule, ScheduleUnit, TaskStatus,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn hold_keeps_the_schedule_and_drops_priority(service: TestService) -> eyre::Result<()> {
    let task = service
        .create_task(
            NewTask::new("Layout", Schedule::new(10, ScheduleUnit::Day)).with_priority(800),
        )
        .await?;
    log_work(&service, task.id(), "artist", 0, 1).await?;

    service.hold(task.id()).await?;

    let held = stored(&service, task.id()).await?;
    ensure!(held.status() == TaskStatus::OnHold);
    ensure!(held.priority() == Priority::LOWEST);
    ensure!(held.schedule() == Schedule::new(10, ScheduleUnit::Day));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stop_clamps_the_schedule_to_logged_work(service: TestService) -> eyre::Result<()> {
    let task = create_reviewed(&service, "Layout", &[]).await?;
    log_work(&service, task.id(), "artist", 0, 1).await?;
    log_work(&service, task.id(), "artist", 1, 1).await?;

    service.stop(task.id()).await?;

    let stopped = stored(&service, task.id()).await?;
    ensure!(stopped.status() == TaskStatus::Stopped);
    ensure!(stopped.schedule() == Schedule::new(2, ScheduleUnit::Hour));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resume_waits_for_an_active_prerequisite(service: TestService) -> eyre::Result<()> {
    let model = create_reviewed(&service, "Model", &[]).await?;
    log_work(&service, model.id(), "modeler", 0, 4).await?;
    complete(&service, model.id()).await?;
    let rig = create_reviewed(&service, "Rig", &[model.id()]).await?;
    log_work(&service, rig.id(), "rigger", 0, 2).await?;
    service.hold(rig.id()).await?;

    service
        .request_revision(model.id(), RevisionRequest::new(resource("supervisor")))
        .await?;
    log_work(&service, model.id(), "modeler", 4, 1).await?;
    ensure!(status(&service, rig.id()).await? == TaskStatus::OnHold);

    service.resume(rig.id()).await?;

    ensure!(status(&service, rig.id()).await? == TaskStatus::DependencyHasRevision);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resume_after_stop_returns_to_work(service: TestService) -> eyre::Result<()> {
    let task = create_reviewed(&service, "Layout", &[]).await?;
    log_work(&service, task.id(), "artist", 0, 3).await?;
    service.stop(task.id()).await?;

    service.resume(task.id()).await?;

    ensure!(status(&service, task.id()).await? == TaskStatus::WorkInProgress);
    Ok(())
}
