//! Shared test helpers for in-memory workflow integration tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use mockable::DefaultClock;
use rstest::fixture;
use studioflow::task::{
    adapters::memory::InMemoryWorkflowRepository,
    domain::{NewTask, ResourceId, Review, Schedule, Task, TaskId, TaskStatus},
    services::{CreateTimeLogRequest, TaskWorkflowService},
};

/// Service type used by the integration tests.
pub type TestService = TaskWorkflowService<InMemoryWorkflowRepository, DefaultClock>;

/// Provides a service over a fresh in-memory repository.
#[fixture]
pub fn service() -> TestService {
    TaskWorkflowService::new(
        Arc::new(InMemoryWorkflowRepository::new()),
        Arc::new(DefaultClock),
    )
}

/// Monday 2026-01-05 09:00 UTC plus `hours`.
#[must_use]
pub fn at(hours: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0)
        .single()
        .expect("valid base timestamp")
        + Duration::hours(hours)
}

/// Builds a resource reference.
///
/// # Panics
///
/// Panics when `login` is blank.
#[must_use]
pub fn resource(login: &str) -> ResourceId {
    ResourceId::new(login).expect("valid resource")
}

/// Creates a leaf task reviewed by `supervisor`.
///
/// # Errors
///
/// Returns an error if the service rejects the task.
pub async fn create_reviewed(
    service: &TestService,
    name: &str,
    depends: &[TaskId],
) -> eyre::Result<Task> {
    Ok(service
        .create_task(
            NewTask::new(name, Schedule::hours(10))
                .with_responsible([resource("supervisor")])
                .with_dependencies(depends.iter().copied()),
        )
        .await?)
}

/// Logs `hours` of work by `login` starting `from_hour` hours after the
/// base timestamp.
///
/// # Errors
///
/// Returns an error if the service rejects the time log.
pub async fn log_work(
    service: &TestService,
    task_id: TaskId,
    login: &str,
    from_hour: i64,
    hours: i64,
) -> eyre::Result<()> {
    service
        .create_time_log(CreateTimeLogRequest::new(
            task_id,
            login,
            at(from_hour),
            at(from_hour + hours),
        ))
        .await?;
    Ok(())
}

/// Submits a WIP task for review and approves every review.
///
/// # Errors
///
/// Returns an error if either action is rejected.
pub async fn complete(service: &TestService, task_id: TaskId) -> eyre::Result<Vec<Review>> {
    service.request_review(task_id).await?;
    Ok(service.approve(task_id).await?)
}

/// Loads the current status of a task.
///
/// # Errors
///
/// Returns an error if the task is missing.
pub async fn status(service: &TestService, task_id: TaskId) -> eyre::Result<TaskStatus> {
    Ok(stored(service, task_id).await?.status())
}

/// Loads the current state of a task.
///
/// # Errors
///
/// Returns an error if the task is missing.
pub async fn stored(service: &TestService, task_id: TaskId) -> eyre::Result<Task> {
    service
        .find_task(task_id)
        .await?
        .ok_or_else(|| eyre::eyre!("task {task_id} should exist"))
}
