//! Task-level workflow actions.

use super::WorkflowTransaction;
use crate::task::domain::{
    HasDependencies, HasReviews, HasTimeLogs, InvalidArgumentError, NewTask, NotFoundError,
    Priority, ResourceId, Review, ReviewNumber, Schedule, StatusError, Task, TaskAction,
    TaskDependency, TaskId, TaskStatus, TimeLog, WorkflowResult,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashSet;

/// Parameters of a task-level revision request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRequest {
    reviewer: ResourceId,
    schedule: Option<Schedule>,
    description: Option<String>,
}

impl RevisionRequest {
    /// Creates a revision request by `reviewer` with the default extra effort.
    #[must_use]
    pub const fn new(reviewer: ResourceId) -> Self {
        Self {
            reviewer,
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

impl<C: Clock> WorkflowTransaction<'_, C> {
    /// Creates a task as WFD or RTS depending on its prerequisites and
    /// re-derives its parent.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgumentError`] for blank names, zero timings,
    /// out-of-range priorities, duplicate or circular prerequisites, and
    /// parents that already logged time. Returns [`NotFoundError`] for
    /// missing parents or prerequisites.
    pub fn create_task(&mut self, new_task: NewTask) -> WorkflowResult<Task> {
        if let Some(parent) = new_task.parent()
            && !self.graph.task(parent)?.time_logs().is_empty()
        {
            return Err(InvalidArgumentError::ParentHasTimeLogs(parent).into());
        }
        for depends_on in new_task.depends() {
            self.graph.task(*depends_on)?;
        }

        let task = new_task.into_task(
            TaskStatus::WaitingForDependency,
            self.policy.default_priority,
            self.clock,
        )?;
        let id = task.id();
        let mut seen = HashSet::new();
        for edge in task.depends() {
            let depends_on = edge.depends_on();
            if !seen.insert(depends_on) {
                return Err(InvalidArgumentError::DuplicateDependency {
                    task_id: id,
                    depends_on,
                }
                .into());
            }
            if task
                .parent()
                .is_some_and(|parent| self.graph.influences(parent, depends_on))
            {
                return Err(InvalidArgumentError::CircularDependency {
                    task_id: id,
                    depends_on,
                }
                .into());
            }
        }

        self.graph.insert(task);
        self.touch(id);
        let initial = self.waiting_status(id)?;
        self.graph.task_mut(id)?.set_status(initial, self.clock);
        self.propagate(id)?;
        Ok(self.graph.task(id)?.clone())
    }

    /// Adds a prerequisite edge and re-evaluates the dependent.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::Task`] unless the dependent is WFD or RTS,
    /// [`InvalidArgumentError`] for duplicate or circular edges, and
    /// [`NotFoundError::Task`] for missing tasks.
    pub fn add_dependency(&mut self, edge: TaskDependency) -> WorkflowResult<TaskDependency> {
        let task_id = edge.task_id();
        let depends_on = edge.depends_on();
        self.graph.task(depends_on)?;
        self.ensure_dependencies_changeable(task_id)?;
        if self.graph.task(task_id)?.depends_on(depends_on) {
            return Err(InvalidArgumentError::DuplicateDependency {
                task_id,
                depends_on,
            }
            .into());
        }
        if self.closes_cycle(task_id, depends_on) {
            return Err(InvalidArgumentError::CircularDependency {
                task_id,
                depends_on,
            }
            .into());
        }

        self.graph.task_mut(task_id)?.add_dependency(edge, self.clock);
        self.graph.link_dependent(depends_on, task_id);
        self.touch(task_id);
        self.refresh_waiting(task_id)?;
        Ok(edge)
    }

    /// Removes a prerequisite edge and re-evaluates the dependent.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::Task`] unless the dependent is WFD or RTS and
    /// [`NotFoundError`] when a task or the edge is missing.
    pub fn remove_dependency(
        &mut self,
        task_id: TaskId,
        depends_on: TaskId,
    ) -> WorkflowResult<TaskDependency> {
        self.graph.dependency(task_id, depends_on)?;
        self.ensure_dependencies_changeable(task_id)?;
        let removed = self
            .graph
            .task_mut(task_id)?
            .remove_dependency(depends_on, self.clock)
            .ok_or(NotFoundError::Dependency {
                task_id,
                depends_on,
            })?;
        self.graph.unlink_dependent(depends_on, task_id);
        self.touch(task_id);
        self.refresh_waiting(task_id)?;
        Ok(removed)
    }

    /// Logs work on a leaf task. RTS and HREV tasks move to WIP.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgumentError`] for containers, empty intervals and
    /// overbooked resources, and [`StatusError::Task`] unless the task is
    /// RTS, WIP, HREV or DREV.
    pub fn create_time_log(
        &mut self,
        task_id: TaskId,
        resource: ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> WorkflowResult<TimeLog> {
        self.graph.task(task_id)?;
        if self.graph.is_container(task_id) {
            return Err(InvalidArgumentError::ContainerTimeLog(task_id).into());
        }
        let status = self.ensure_leaf_permits(task_id, TaskAction::CreateTimeLog)?;
        let time_log = TimeLog::new(task_id, resource, start, end)?;
        if let Some(conflict) = self
            .graph
            .tasks()
            .flat_map(|task| task.time_logs())
            .find(|existing| existing.overlaps(&time_log))
        {
            return Err(InvalidArgumentError::ResourceOverbooked {
                resource: conflict.resource().clone(),
                start: conflict.start(),
                end: conflict.end(),
            }
            .into());
        }

        self.graph
            .task_mut(task_id)?
            .add_time_log(time_log.clone(), self.clock);
        self.touch(task_id);
        let next = match status {
            TaskStatus::ReadyToStart | TaskStatus::HasRevision => TaskStatus::WorkInProgress,
            other => other,
        };
        self.transition(task_id, next)?;
        Ok(time_log)
    }

    /// Submits a WIP task for review, opening a round with one review per
    /// effective responsible.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError`] unless the task is a WIP leaf and
    /// [`InvalidArgumentError::NoResponsible`] when nobody can review it.
    pub fn request_review(&mut self, task_id: TaskId) -> WorkflowResult<Vec<Review>> {
        self.ensure_leaf_permits(task_id, TaskAction::RequestReview)?;
        let responsible = self.graph.effective_responsible(task_id);
        if responsible.is_empty() {
            return Err(InvalidArgumentError::NoResponsible(task_id).into());
        }

        let task = self.graph.task_mut(task_id)?;
        let round = task.next_review_number();
        let reviews = responsible
            .into_iter()
            .map(|reviewer| Review::new(task_id, reviewer, round, self.clock))
            .collect::<Vec<_>>();
        for review in &reviews {
            task.add_review(review.clone(), self.clock);
        }
        self.touch(task_id);
        self.transition(task_id, TaskStatus::PendingReview)?;
        Ok(reviews)
    }

    /// Reopens a PREV or CMPL task for another revision.
    ///
    /// In PREV the request joins the current round and supersedes its
    /// unanswered reviews; in CMPL it opens a new round. The schedule grows
    /// to the logged time plus every revision requested in the round.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError`] unless the task is a PREV or CMPL leaf.
    pub fn request_revision(
        &mut self,
        task_id: TaskId,
        request: RevisionRequest,
    ) -> WorkflowResult<Review> {
        let status = self.ensure_leaf_permits(task_id, TaskAction::RequestRevision)?;
        let schedule = request.schedule.unwrap_or(self.policy.default_revision);
        let task = self.graph.task_mut(task_id)?;
        let round = if status == TaskStatus::PendingReview {
            task.latest_review_number().unwrap_or(ReviewNumber::FIRST)
        } else {
            task.next_review_number()
        };
        let review = Review::revision(
            task_id,
            request.reviewer,
            round,
            schedule,
            request.description,
            self.clock,
        );
        for pending in task.pending_reviews_mut() {
            pending.supersede(self.clock);
        }
        task.add_review(review.clone(), self.clock);
        self.touch(task_id);
        self.reopen_for_revision(task_id, round)?;
        Ok(review)
    }

    /// Approves every unanswered review of a PREV task and completes it.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError`] unless the task is a PREV leaf.
    pub fn approve(&mut self, task_id: TaskId) -> WorkflowResult<Vec<Review>> {
        self.ensure_leaf_permits(task_id, TaskAction::Approve)?;
        let task = self.graph.task_mut(task_id)?;
        let mut approved = Vec::new();
        for review in task.pending_reviews_mut() {
            review.approve(self.clock)?;
            approved.push(review.clone());
        }
        self.touch(task_id);
        self.transition(task_id, TaskStatus::Completed)?;
        Ok(approved)
    }

    /// Puts a task on hold and drops its priority to the lowest value.
    ///
    /// Holding an OH task is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError`] unless the task is a WIP, DREV or OH leaf.
    pub fn hold(&mut self, task_id: TaskId) -> WorkflowResult<()> {
        let status = self.ensure_leaf_permits(task_id, TaskAction::Hold)?;
        if status == TaskStatus::OnHold {
            return Ok(());
        }
        self.graph
            .task_mut(task_id)?
            .set_priority(Priority::LOWEST, self.clock);
        self.touch(task_id);
        self.transition(task_id, TaskStatus::OnHold)
    }

    /// Stops a task and clamps its schedule to the time actually logged.
    ///
    /// Stopping a STOP task is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError`] unless the task is a WIP, DREV or STOP leaf.
    pub fn stop(&mut self, task_id: TaskId) -> WorkflowResult<()> {
        let status = self.ensure_leaf_permits(task_id, TaskAction::Stop)?;
        if status == TaskStatus::Stopped {
            return Ok(());
        }
        let task = self.graph.task_mut(task_id)?;
        let clamped = self
            .policy
            .working_time
            .least_meaningful(task.total_logged_seconds());
        task.set_schedule(clamped, self.clock);
        self.touch(task_id);
        self.transition(task_id, TaskStatus::Stopped)
    }

    /// Resumes an OH or STOP task: WIP when every prerequisite is finished,
    /// DREV otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError`] unless the task is an OH or STOP leaf.
    pub fn resume(&mut self, task_id: TaskId) -> WorkflowResult<()> {
        self.ensure_leaf_permits(task_id, TaskAction::Resume)?;
        let next = if self.dependencies_done(task_id)? {
            TaskStatus::WorkInProgress
        } else {
            TaskStatus::DependencyHasRevision
        };
        self.transition(task_id, next)
    }

    /// Checks that `task_id` is a leaf whose status permits `action`.
    /// Returns the current status.
    pub(super) fn ensure_leaf_permits(
        &self,
        task_id: TaskId,
        action: TaskAction,
    ) -> WorkflowResult<TaskStatus> {
        let status = self.graph.task(task_id)?.status();
        if self.graph.is_container(task_id) {
            return Err(StatusError::Container { task_id, action }.into());
        }
        if !status.permits(action) {
            return Err(StatusError::Task {
                task_id,
                status,
                action,
            }
            .into());
        }
        Ok(status)
    }

    /// Sets the status and propagates when it changed.
    pub(super) fn transition(&mut self, task_id: TaskId, to: TaskStatus) -> WorkflowResult<()> {
        if self.set_status(task_id, to)? {
            self.propagate(task_id)?;
        }
        Ok(())
    }

    fn ensure_dependencies_changeable(&self, task_id: TaskId) -> WorkflowResult<()> {
        let status = self.graph.task(task_id)?.status();
        if status.permits(TaskAction::ChangeDependencies) {
            return Ok(());
        }
        Err(StatusError::Task {
            task_id,
            status,
            action: TaskAction::ChangeDependencies,
        }
        .into())
    }

    fn closes_cycle(&self, task_id: TaskId, depends_on: TaskId) -> bool {
        task_id == depends_on
            || self.graph.is_ancestor(depends_on, task_id)
            || self.graph.is_ancestor(task_id, depends_on)
            || self.graph.influences(task_id, depends_on)
    }

    fn refresh_waiting(&mut self, task_id: TaskId) -> WorkflowResult<()> {
        let next = if self.graph.is_container(task_id) {
            self.derived_container_status(task_id)?
        } else {
            self.waiting_status(task_id)?
        };
        self.transition(task_id, next)
    }
}
