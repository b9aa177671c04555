//! Propagation across dependencies and containers.

use super::helpers::{TestService, complete, create_reviewed, log_work, resource, service, status};
use eyre::ensure;
use rstest::rstest;
use studioflow::task::domain::{DependencyTarget, NewTask, RevisionRequest, Schedule, TaskStatus};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reopening_a_prerequisite_reopens_completed_dependents(
    service: TestService,
) -> eyre::Result<()> {
    let model = create_reviewed(&service, "Model", &[]).await?;
    log_work(&service, model.id(), "modeler", 0, 4).await?;
    complete(&service, model.id()).await?;
    let rig = create_reviewed(&service, "Rig", &[model.id()]).await?;
    log_work(&service, rig.id(), "rigger", 0, 4).await?;
    complete(&service, rig.id()).await?;

    service
        .request_revision(
            model.id(),
            RevisionRequest::new(resource("supervisor")).with_description("fix topology"),
        )
        .await?;

    ensure!(status(&service, model.id()).await? == TaskStatus::HasRevision);
    ensure!(status(&service, rig.id()).await? == TaskStatus::DependencyHasRevision);
    let edge = service.find_dependency(rig.id(), model.id()).await?;
    ensure!(edge.target() == DependencyTarget::OnStart);

    log_work(&service, model.id(), "modeler", 4, 1).await?;
    ensure!(status(&service, rig.id()).await? == TaskStatus::WorkInProgress);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completion_chain_readies_each_step(service: TestService) -> eyre::Result<()> {
    let model = create_reviewed(&service, "Model", &[]).await?;
    let rig = create_reviewed(&service, "Rig", &[model.id()]).await?;
    let anim = create_reviewed(&service, "Anim", &[rig.id()]).await?;
    ensure!(status(&service, rig.id()).await? == TaskStatus::WaitingForDependency);
    ensure!(status(&service, anim.id()).await? == TaskStatus::WaitingForDependency);

    log_work(&service, model.id(), "modeler", 0, 4).await?;
    complete(&service, model.id()).await?;
    ensure!(status(&service, rig.id()).await? == TaskStatus::ReadyToStart);
    ensure!(status(&service, anim.id()).await? == TaskStatus::WaitingForDependency);

    log_work(&service, rig.id(), "rigger", 4, 4).await?;
    service.stop(rig.id()).await?;
    ensure!(status(&service, anim.id()).await? == TaskStatus::ReadyToStart);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn containers_track_their_children(service: TestService) -> eyre::Result<()> {
    let shot = service
        .create_task(
            NewTask::new("Shot 010", Schedule::hours(1))
                .with_responsible([resource("supervisor")]),
        )
        .await?;
    let layout = service
        .create_task(NewTask::new("Layout", Schedule::hours(4)).with_parent(shot.id()))
        .await?;
    let comp = service
        .create_task(NewTask::new("Comp", Schedule::hours(4)).with_parent(shot.id()))
        .await?;
    ensure!(status(&service, shot.id()).await? == TaskStatus::ReadyToStart);

    log_work(&service, layout.id(), "artist", 0, 2).await?;
    ensure!(status(&service, shot.id()).await? == TaskStatus::WorkInProgress);

    complete(&service, layout.id()).await?;
    ensure!(service.hold(shot.id()).await.is_err(), "containers cannot be held");
    log_work(&service, comp.id(), "compositor", 2, 2).await?;
    complete(&service, comp.id()).await?;

    ensure!(status(&service, shot.id()).await? == TaskStatus::Completed);
    Ok(())
}
