//! Service layer running workflow actions as atomic units of work.

use crate::config::{ConfigError, WorkflowConfig};
use crate::task::{
    domain::{
        DependencyTarget, NewTask, NotFoundError, ResourceId, Review, ReviewId, RevisionRequest,
        Schedule, Status, StatusList, Task, TaskDependency, TaskId, TimeLog, WorkflowError,
        WorkflowPolicy, WorkflowResult, WorkflowTransaction,
    },
    ports::{WorkflowRepository, WorkflowRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Request payload for adding a prerequisite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddDependencyRequest {
    task_id: TaskId,
    depends_on: TaskId,
    target: DependencyTarget,
}

impl AddDependencyRequest {
    /// Creates an `onend` dependency of `task_id` on `depends_on`.
    #[must_use]
    pub const fn new(task_id: TaskId, depends_on: TaskId) -> Self {
        Self {
            task_id,
            depends_on,
            target: DependencyTarget::OnEnd,
        }
    }

    /// Sets the dependency target.
    #[must_use]
    pub const fn with_target(mut self, target: DependencyTarget) -> Self {
        self.target = target;
        self
    }

    const fn into_edge(self) -> TaskDependency {
        TaskDependency::new(self.task_id, self.depends_on).with_target(self.target)
    }
}

/// Request payload for logging work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTimeLogRequest {
    task_id: TaskId,
    resource: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl CreateTimeLogRequest {
    /// Creates a request for `resource` working on `task_id` over
    /// `[start, end)`.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        resource: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id,
            resource: resource.into(),
            start,
            end,
        }
    }
}

/// Request payload for a verdict-level revision request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRevisionRequest {
    review_id: ReviewId,
    schedule: Option<Schedule>,
    description: Option<String>,
}

impl ReviewRevisionRequest {
    /// Creates a revision request on `review_id` with the default effort.
    #[must_use]
    pub const fn new(review_id: ReviewId) -> Self {
        Self {
            review_id,
            schedule: None,
            description: None,
        }
    }

    /// Sets the extra effort the revision needs.
    #[must_use]
    pub const fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Sets the reviewer's note.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Service-level errors for workflow operations.
#[derive(Debug, Error)]
pub enum TaskWorkflowError {
    /// The workflow rejected the action.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] WorkflowRepositoryError),
}

impl From<NotFoundError> for TaskWorkflowError {
    fn from(err: NotFoundError) -> Self {
        Self::Workflow(err.into())
    }
}

/// Result type for workflow service operations.
pub type TaskWorkflowResult<T> = Result<T, TaskWorkflowError>;

/// Task status workflow orchestration service.
///
/// Each action loads the task graph, runs inside a [`WorkflowTransaction`],
/// and commits the resulting change set in one call. Actions issued through
/// one service are serialized.
pub struct TaskWorkflowService<R, C>
where
    R: WorkflowRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    policy: WorkflowPolicy,
    task_statuses: StatusList,
    review_statuses: StatusList,
    write_gate: Mutex<()>,
}

impl<R, C> TaskWorkflowService<R, C>
where
    R: WorkflowRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service with the default configuration.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            policy: WorkflowPolicy::default(),
            task_statuses: StatusList::task_defaults(),
            review_statuses: StatusList::review_defaults(),
            write_gate: Mutex::new(()),
        }
    }

    /// Creates a service with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration is invalid.
    pub fn with_config(
        repository: Arc<R>,
        clock: Arc<C>,
        config: &WorkflowConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            repository,
            clock,
            policy: config.policy()?,
            task_statuses: config.task_statuses.clone(),
            review_statuses: config.review_statuses.clone(),
            write_gate: Mutex::new(()),
        })
    }

    /// Creates a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when validation fails or the repository
    /// rejects the commit.
    pub async fn create_task(&self, new_task: NewTask) -> TaskWorkflowResult<Task> {
        self.run("create_task", |tx| tx.create_task(new_task)).await
    }

    /// Adds a prerequisite to a WFD or RTS task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the action is illegal or the
    /// repository rejects the commit.
    pub async fn add_dependency(
        &self,
        request: AddDependencyRequest,
    ) -> TaskWorkflowResult<TaskDependency> {
        self.run("add_dependency", |tx| tx.add_dependency(request.into_edge()))
            .await
    }

    /// Removes a prerequisite from a WFD or RTS task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the action is illegal, the edge is
    /// missing, or the repository rejects the commit.
    pub async fn remove_dependency(
        &self,
        task_id: TaskId,
        depends_on: TaskId,
    ) -> TaskWorkflowResult<TaskDependency> {
        self.run("remove_dependency", |tx| {
            tx.remove_dependency(task_id, depends_on)
        })
        .await
    }

    /// Logs work on a leaf task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the action is illegal or the
    /// repository rejects the commit.
    pub async fn create_time_log(
        &self,
        request: CreateTimeLogRequest,
    ) -> TaskWorkflowResult<TimeLog> {
        let resource = ResourceId::new(request.resource).map_err(WorkflowError::from)?;
        self.run("create_time_log", |tx| {
            tx.create_time_log(request.task_id, resource, request.start, request.end)
        })
        .await
    }

    /// Submits a WIP task for review.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the action is illegal or the
    /// repository rejects the commit.
    pub async fn request_review(&self, task_id: TaskId) -> TaskWorkflowResult<Vec<Review>> {
        self.run("request_review", |tx| tx.request_review(task_id))
            .await
    }

    /// Reopens a PREV or CMPL task for revision.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the action is illegal or the
    /// repository rejects the commit.
    pub async fn request_revision(
        &self,
        task_id: TaskId,
        request: RevisionRequest,
    ) -> TaskWorkflowResult<Review> {
        self.run("request_revision", |tx| tx.request_revision(task_id, request))
            .await
    }

    /// Approves every pending review of a PREV task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the action is illegal or the
    /// repository rejects the commit.
    pub async fn approve(&self, task_id: TaskId) -> TaskWorkflowResult<Vec<Review>> {
        self.run("approve", |tx| tx.approve(task_id)).await
    }

    /// Puts a task on hold.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the action is illegal or the
    /// repository rejects the commit.
    pub async fn hold(&self, task_id: TaskId) -> TaskWorkflowResult<()> {
        self.run("hold", |tx| tx.hold(task_id)).await
    }

    /// Stops a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the action is illegal or the
    /// repository rejects the commit.
    pub async fn stop(&self, task_id: TaskId) -> TaskWorkflowResult<()> {
        self.run("stop", |tx| tx.stop(task_id)).await
    }

    /// Resumes an OH or STOP task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the action is illegal or the
    /// repository rejects the commit.
    pub async fn resume(&self, task_id: TaskId) -> TaskWorkflowResult<()> {
        self.run("resume", |tx| tx.resume(task_id)).await
    }

    /// Approves one review.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the review is unknown or answered,
    /// or the repository rejects the commit.
    pub async fn approve_review(&self, review_id: ReviewId) -> TaskWorkflowResult<Review> {
        self.run("approve_review", |tx| tx.approve_review(review_id))
            .await
    }

    /// Requests a revision through one review.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the review is unknown or answered,
    /// or the repository rejects the commit.
    pub async fn request_review_revision(
        &self,
        request: ReviewRevisionRequest,
    ) -> TaskWorkflowResult<Review> {
        self.run("request_review_revision", |tx| {
            tx.request_review_revision(request.review_id, request.schedule, request.description)
        })
        .await
    }

    /// Returns the display status of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the task is missing or the lookup
    /// fails.
    pub async fn status_of(&self, task_id: TaskId) -> TaskWorkflowResult<Status> {
        let task = self
            .repository
            .find_by_id(task_id)
            .await?
            .ok_or(NotFoundError::Task(task_id))?;
        let status = task.status();
        Ok(self
            .task_statuses
            .get(status.code())
            .cloned()
            .unwrap_or_else(|| Status::from(status)))
    }

    /// Returns the display status of a review.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the review is missing or the
    /// lookup fails.
    pub async fn review_status_of(&self, review_id: ReviewId) -> TaskWorkflowResult<Status> {
        let status = self.find_review(review_id).await?.status();
        Ok(self
            .review_statuses
            .get(status.code())
            .cloned()
            .unwrap_or_else(|| Status::from(status)))
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Repository`] when the lookup fails.
    pub async fn find_task(&self, task_id: TaskId) -> TaskWorkflowResult<Option<Task>> {
        Ok(self.repository.find_by_id(task_id).await?)
    }

    /// Retrieves the edge from `task_id` to `depends_on`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the edge is missing or the lookup
    /// fails.
    pub async fn find_dependency(
        &self,
        task_id: TaskId,
        depends_on: TaskId,
    ) -> TaskWorkflowResult<TaskDependency> {
        self.read(|tx| Ok(*tx.graph().dependency(task_id, depends_on)?))
            .await
    }

    /// Retrieves a review by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the review is missing or the
    /// lookup fails.
    pub async fn find_review(&self, review_id: ReviewId) -> TaskWorkflowResult<Review> {
        self.read(|tx| Ok(tx.graph().review(review_id)?.1.clone()))
            .await
    }

    /// Lists the task and everything it contains, breadth first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the root is missing or the lookup
    /// fails.
    pub async fn walk_hierarchy(&self, root: TaskId) -> TaskWorkflowResult<Vec<TaskId>> {
        self.read(|tx| Ok(tx.graph().walk_hierarchy(root)?)).await
    }

    /// Lists the task and its prerequisites, breadth first, repeating shared
    /// prerequisites.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the root is missing or the lookup
    /// fails.
    pub async fn walk_dependencies(&self, root: TaskId) -> TaskWorkflowResult<Vec<TaskId>> {
        self.read(|tx| Ok(tx.graph().walk_dependencies(root)?))
            .await
    }

    async fn read<T>(
        &self,
        query: impl FnOnce(&WorkflowTransaction<'_, C>) -> WorkflowResult<T>,
    ) -> TaskWorkflowResult<T> {
        let snapshot = self.repository.load_snapshot().await?;
        let tx = WorkflowTransaction::new(snapshot, self.policy, &*self.clock);
        Ok(query(&tx)?)
    }

    async fn run<T>(
        &self,
        action: &'static str,
        apply: impl FnOnce(&mut WorkflowTransaction<'_, C>) -> WorkflowResult<T>,
    ) -> TaskWorkflowResult<T> {
        let _gate = self.write_gate.lock().await;
        let snapshot = self.repository.load_snapshot().await?;
        let mut tx = WorkflowTransaction::new(snapshot, self.policy, &*self.clock);
        let value = apply(&mut tx)?;
        let change_set = tx.into_change_set();
        if change_set.is_empty() {
            return Ok(value);
        }

        match self.repository.commit(&change_set).await {
            Ok(revision) => {
                info!(
                    action,
                    tasks = change_set.tasks.len(),
                    status_changes = change_set.changes.len(),
                    revision,
                    "workflow action committed"
                );
                Ok(value)
            }
            Err(err) => {
                warn!(
                    action,
                    base_revision = change_set.base_revision,
                    error = %err,
                    "workflow action rolled back"
                );
                Err(err.into())
            }
        }
    }
}
