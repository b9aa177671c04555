//! Task aggregate root and task creation input.

use super::{
    DependencyTarget, HasDependencies, HasReviews, HasTimeLogs, InvalidArgumentError, Priority,
    ResourceId, Review, ReviewId, Schedule, TaskDependency, TaskId, TaskStatus, TimeLog,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    name: String,
    schedule: Schedule,
    parent: Option<TaskId>,
    priority: Option<u16>,
    is_milestone: bool,
    resources: BTreeSet<ResourceId>,
    responsible: Vec<ResourceId>,
    depends: Vec<TaskId>,
}

impl NewTask {
    /// Creates task input with the required name and effort estimate.
    #[must_use]
    pub fn new(name: impl Into<String>, schedule: Schedule) -> Self {
        Self {
            name: name.into(),
            schedule,
            parent: None,
            priority: None,
            is_milestone: false,
            resources: BTreeSet::new(),
            responsible: Vec::new(),
            depends: Vec::new(),
        }
    }

    /// Places the task under a container.
    #[must_use]
    pub const fn with_parent(mut self, parent: TaskId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the priority. Validated on creation.
    #[must_use]
    pub const fn with_priority(mut self, priority: u16) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Marks the task as a milestone.
    #[must_use]
    pub const fn as_milestone(mut self) -> Self {
        self.is_milestone = true;
        self
    }

    /// Sets the assigned resources.
    #[must_use]
    pub fn with_resources(mut self, resources: impl IntoIterator<Item = ResourceId>) -> Self {
        self.resources = resources.into_iter().collect();
        self
    }

    /// Sets the responsible reviewers in order.
    #[must_use]
    pub fn with_responsible(mut self, responsible: impl IntoIterator<Item = ResourceId>) -> Self {
        self.responsible = responsible.into_iter().collect();
        self
    }

    /// Sets the prerequisite tasks.
    #[must_use]
    pub fn with_dependencies(mut self, depends: impl IntoIterator<Item = TaskId>) -> Self {
        self.depends = depends.into_iter().collect();
        self
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent container, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<TaskId> {
        self.parent
    }

    /// Returns the prerequisite tasks.
    #[must_use]
    pub fn depends(&self) -> &[TaskId] {
        &self.depends
    }

    /// Validates the scalar fields and builds a task in `status`.
    ///
    /// References to other tasks are checked by the workflow graph.
    pub(crate) fn into_task(
        self,
        status: TaskStatus,
        default_priority: Priority,
        clock: &impl Clock,
    ) -> Result<Task, InvalidArgumentError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(InvalidArgumentError::EmptyTaskName);
        }
        if self.schedule.timing() == 0 {
            return Err(InvalidArgumentError::NonPositiveScheduleTiming);
        }
        let priority = match self.priority {
            Some(value) => Priority::new(value)?,
            None => default_priority,
        };

        let id = TaskId::new();
        let timestamp = clock.utc();
        Ok(Task {
            id,
            name: name.to_owned(),
            parent: self.parent,
            status,
            schedule: self.schedule,
            priority,
            is_milestone: self.is_milestone,
            resources: self.resources,
            responsible: self.responsible,
            depends: self
                .depends
                .into_iter()
                .map(|depends_on| TaskDependency::new(id, depends_on))
                .collect(),
            time_logs: Vec::new(),
            reviews: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }
}

/// Task aggregate root.
///
/// A task is a leaf or a container depending on whether other tasks name it
/// as their parent; the workflow graph tracks that relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    name: String,
    parent: Option<TaskId>,
    status: TaskStatus,
    schedule: Schedule,
    priority: Priority,
    is_milestone: bool,
    resources: BTreeSet<ResourceId>,
    responsible: Vec<ResourceId>,
    depends: Vec<TaskDependency>,
    time_logs: Vec<TimeLog>,
    reviews: Vec<Review>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted name.
    pub name: String,
    /// Persisted parent container, if any.
    pub parent: Option<TaskId>,
    /// Persisted workflow status.
    pub status: TaskStatus,
    /// Persisted effort estimate.
    pub schedule: Schedule,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted milestone flag.
    pub is_milestone: bool,
    /// Persisted assigned resources.
    pub resources: BTreeSet<ResourceId>,
    /// Persisted responsible reviewers.
    pub responsible: Vec<ResourceId>,
    /// Persisted dependency edges.
    pub depends: Vec<TaskDependency>,
    /// Persisted time logs.
    pub time_logs: Vec<TimeLog>,
    /// Persisted reviews.
    pub reviews: Vec<Review>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        let mut time_logs = data.time_logs;
        time_logs.sort_by_key(TimeLog::start);
        Self {
            id: data.id,
            name: data.name,
            parent: data.parent,
            status: data.status,
            schedule: data.schedule,
            priority: data.priority,
            is_milestone: data.is_milestone,
            resources: data.resources,
            responsible: data.responsible,
            depends: data.depends,
            time_logs,
            reviews: data.reviews,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent container, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<TaskId> {
        self.parent
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the effort estimate.
    #[must_use]
    pub const fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns `true` for milestones.
    #[must_use]
    pub const fn is_milestone(&self) -> bool {
        self.is_milestone
    }

    /// Returns the assigned resources.
    #[must_use]
    pub const fn resources(&self) -> &BTreeSet<ResourceId> {
        &self.resources
    }

    /// Returns the responsible reviewers set on this task itself.
    #[must_use]
    pub fn responsible(&self) -> &[ResourceId] {
        &self.responsible
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the review with `review_id`, if this task owns it.
    #[must_use]
    pub fn review(&self, review_id: ReviewId) -> Option<&Review> {
        self.reviews.iter().find(|review| review.id() == review_id)
    }

    pub(crate) fn set_status(&mut self, status: TaskStatus, clock: &impl Clock) {
        self.status = status;
        self.touch(clock);
    }

    pub(crate) fn set_schedule(&mut self, schedule: Schedule, clock: &impl Clock) {
        self.schedule = schedule;
        self.touch(clock);
    }

    pub(crate) fn set_priority(&mut self, priority: Priority, clock: &impl Clock) {
        self.priority = priority;
        self.touch(clock);
    }

    pub(crate) fn add_dependency(&mut self, edge: TaskDependency, clock: &impl Clock) {
        self.depends.push(edge);
        self.touch(clock);
    }

    /// Removes the edge to `depends_on`, returning it when present.
    pub(crate) fn remove_dependency(
        &mut self,
        depends_on: TaskId,
        clock: &impl Clock,
    ) -> Option<TaskDependency> {
        let position = self
            .depends
            .iter()
            .position(|edge| edge.depends_on() == depends_on)?;
        let removed = self.depends.remove(position);
        self.touch(clock);
        Some(removed)
    }

    /// Sets the target of the edge to `depends_on`. Returns `true` on change.
    pub(crate) fn retarget_dependency(
        &mut self,
        depends_on: TaskId,
        target: DependencyTarget,
        clock: &impl Clock,
    ) -> bool {
        let Some(edge) = self
            .depends
            .iter_mut()
            .find(|edge| edge.depends_on() == depends_on && edge.target() != target)
        else {
            return false;
        };
        edge.set_target(target);
        self.touch(clock);
        true
    }

    pub(crate) fn add_time_log(&mut self, time_log: TimeLog, clock: &impl Clock) {
        let position = self
            .time_logs
            .partition_point(|existing| existing.start() <= time_log.start());
        self.time_logs.insert(position, time_log);
        self.touch(clock);
    }

    pub(crate) fn add_review(&mut self, review: Review, clock: &impl Clock) {
        self.reviews.push(review);
        self.touch(clock);
    }

    pub(crate) fn review_mut(&mut self, review_id: ReviewId) -> Option<&mut Review> {
        self.reviews.iter_mut().find(|review| review.id() == review_id)
    }

    pub(crate) fn pending_reviews_mut(&mut self) -> impl Iterator<Item = &mut Review> {
        self.reviews.iter_mut().filter(|review| review.is_pending())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

impl HasDependencies for Task {
    fn depends(&self) -> &[TaskDependency] {
        &self.depends
    }
}

impl HasReviews for Task {
    fn reviews(&self) -> &[Review] {
        &self.reviews
    }
}

impl HasTimeLogs for Task {
    fn time_logs(&self) -> &[TimeLog] {
        &self.time_logs
    }
}
