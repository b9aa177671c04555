//! Review rounds and revision extensions through the workflow service.

use std::sync::Arc;

use super::helpers::{TestService, log_work, resource, service, stored};
use eyre::{OptionExt, ensure};
use mockable::DefaultClock;
use rstest::rstest;
use studioflow::{
    config::WorkflowConfig,
    task::{
        adapters::memory::InMemoryWorkflowRepository,
        domain::{NewTask, ReviewStatus, Schedule, ScheduleUnit, Task, TaskStatus},
        services::{ReviewRevisionRequest, TaskWorkflowService},
    },
};

async fn reviewed_by_three(service: &TestService) -> eyre::Result<Task> {
    Ok(service
        .create_task(NewTask::new("Comp", Schedule::hours(10)).with_responsible([
            resource("supervisor"),
            resource("director"),
            resource("producer"),
        ]))
        .await?)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn one_revision_closes_the_round(service: TestService) -> eyre::Result<()> {
    let task = reviewed_by_three(&service).await?;
    log_work(&service, task.id(), "artist", 0, 2).await?;
    let reviews = service.request_review(task.id()).await?;
    let first = reviews.first().ok_or_eyre("round has reviews")?;
    let last = reviews.last().ok_or_eyre("round has reviews")?;

    service
        .request_review_revision(
            ReviewRevisionRequest::new(first.id()).with_schedule(Schedule::hours(4)),
        )
        .await?;

    let reopened = stored(&service, task.id()).await?;
    ensure!(reopened.status() == TaskStatus::HasRevision);
    ensure!(reopened.schedule() == Schedule::hours(6));
    let superseded = service.find_review(last.id()).await?;
    ensure!(superseded.is_superseded());
    ensure!(superseded.status() == ReviewStatus::New);
    ensure!(service.approve_review(last.id()).await.is_err());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn configured_rounds_wait_for_every_verdict() -> eyre::Result<()> {
    let config = WorkflowConfig::from_json_str(
        r#"{ "review": { "round_policy": "await_all_verdicts" } }"#,
    )?;
    let service = TaskWorkflowService::with_config(
        Arc::new(InMemoryWorkflowRepository::new()),
        Arc::new(DefaultClock),
        &config,
    )?;
    let task = reviewed_by_three(&service).await?;
    log_work(&service, task.id(), "artist", 0, 2).await?;
    let reviews = service.request_review(task.id()).await?;
    let [first, second, third] = reviews.as_slice() else {
        eyre::bail!("expected three reviews, got {}", reviews.len());
    };

    service
        .request_review_revision(
            ReviewRevisionRequest::new(first.id()).with_schedule(Schedule::hours(4)),
        )
        .await?;
    service
        .request_review_revision(
            ReviewRevisionRequest::new(second.id()).with_schedule(Schedule::hours(6)),
        )
        .await?;
    ensure!(stored(&service, task.id()).await?.status() == TaskStatus::PendingReview);

    service.approve_review(third.id()).await?;

    let reopened = stored(&service, task.id()).await?;
    ensure!(reopened.status() == TaskStatus::HasRevision);
    ensure!(reopened.schedule() == Schedule::hours(12));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn extension_adds_requested_effort_to_logged_work(
    service: TestService,
) -> eyre::Result<()> {
    let task = reviewed_by_three(&service).await?;
    log_work(&service, task.id(), "artist", 0, 1).await?;
    service.stop(task.id()).await?;
    service.resume(task.id()).await?;
    let reviews = service.request_review(task.id()).await?;
    let first = reviews.first().ok_or_eyre("round has reviews")?;

    service
        .request_review_revision(
            ReviewRevisionRequest::new(first.id())
                .with_schedule(Schedule::new(2, ScheduleUnit::Day)),
        )
        .await?;

    let reopened = stored(&service, task.id()).await?;
    ensure!(reopened.schedule() == Schedule::new(19, ScheduleUnit::Hour));
    Ok(())
}
