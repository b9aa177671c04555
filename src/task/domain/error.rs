//! Error types for the task status workflow.

use super::{ResourceId, ReviewId, ReviewStatus, TaskAction, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for workflow domain operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors returned by workflow actions and queries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// The action is forbidden in the current status.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// A required parameter is missing or invalid.
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgumentError),

    /// A referenced entity does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Status propagation kept changing statuses past the configured bound.
    ///
    /// The dependency graph is acyclic, so this indicates corrupted data and
    /// is never retried.
    #[error("status propagation did not settle after {steps} steps")]
    PropagationDiverged {
        /// Number of worklist steps processed before giving up.
        steps: usize,
    },
}

/// Workflow violation: the action is not legal in the current status.
///
/// Always raised before any mutation takes place.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatusError {
    /// A leaf task cannot run the action in its current status.
    #[error("task {task_id} is {status}, cannot {action}")]
    Task {
        /// Task the action was attempted on.
        task_id: TaskId,
        /// Status of the task when the action was attempted.
        status: TaskStatus,
        /// Attempted action.
        action: TaskAction,
    },

    /// Container statuses are derived from their children.
    #[error("task {task_id} is a container, cannot {action}")]
    Container {
        /// Container task the action was attempted on.
        task_id: TaskId,
        /// Attempted action.
        action: TaskAction,
    },

    /// The review has already received a verdict or was superseded.
    #[error("review {review_id} is {status}, cannot {action}")]
    Review {
        /// Review the verdict was attempted on.
        review_id: ReviewId,
        /// Status of the review when the verdict was attempted.
        status: ReviewStatus,
        /// Attempted action.
        action: TaskAction,
    },
}

/// Invalid or missing action parameters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidArgumentError {
    /// A resource reference is required.
    #[error("a resource is required")]
    MissingResource,

    /// A time log must end after it starts.
    #[error("time log must end after it starts (start {start}, end {end})")]
    InvalidInterval {
        /// Requested start.
        start: DateTime<Utc>,
        /// Requested end.
        end: DateTime<Utc>,
    },

    /// Containers never log time directly.
    #[error("task {0} is a container and cannot log time")]
    ContainerTimeLog(TaskId),

    /// The resource already logged time overlapping the requested interval.
    #[error("resource {resource} is already booked between {start} and {end}")]
    ResourceOverbooked {
        /// Overbooked resource.
        resource: ResourceId,
        /// Start of the conflicting time log.
        start: DateTime<Utc>,
        /// End of the conflicting time log.
        end: DateTime<Utc>,
    },

    /// Task names must not be blank.
    #[error("task name must not be empty")]
    EmptyTaskName,

    /// Effort estimates must be positive.
    #[error("schedule timing must be greater than zero")]
    NonPositiveScheduleTiming,

    /// Priority is above the accepted range.
    #[error("priority {0} is out of range 0..=1000")]
    PriorityOutOfRange(u16),

    /// No responsible actor is set on the task or any ancestor.
    #[error("task {0} has no responsible to review it")]
    NoResponsible(TaskId),

    /// A task that already logged time cannot become a container.
    #[error("task {0} has time logs and cannot receive children")]
    ParentHasTimeLogs(TaskId),

    /// The dependency would make the dependency graph cyclic.
    #[error("task {task_id} cannot depend on {depends_on}: circular dependency")]
    CircularDependency {
        /// Dependent task.
        task_id: TaskId,
        /// Requested prerequisite.
        depends_on: TaskId,
    },

    /// The dependency already exists.
    #[error("task {task_id} already depends on {depends_on}")]
    DuplicateDependency {
        /// Dependent task.
        task_id: TaskId,
        /// Existing prerequisite.
        depends_on: TaskId,
    },
}

/// A referenced entity does not exist.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotFoundError {
    /// Task lookup failed.
    #[error("task not found: {0}")]
    Task(TaskId),

    /// Review lookup failed.
    #[error("review not found: {0}")]
    Review(ReviewId),

    /// No dependency edge links the two tasks.
    #[error("task {task_id} does not depend on {depends_on}")]
    Dependency {
        /// Dependent task.
        task_id: TaskId,
        /// Expected prerequisite.
        depends_on: TaskId,
    },
}

/// Error returned while parsing status codes from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown status code: {0}")]
pub struct ParseStatusCodeError(pub String);

/// Error returned while parsing schedule units.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown schedule unit: {0}")]
pub struct ParseScheduleUnitError(pub String);

/// Error returned while parsing dependency targets.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown dependency target: {0}")]
pub struct ParseDependencyTargetError(pub String);

/// Errors returned while building status lists.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatusListError {
    /// A status list needs at least one status.
    #[error("status list '{0}' has no statuses")]
    Empty(String),

    /// Status codes must be unique within a list.
    #[error("status list '{list}' contains code {code} more than once")]
    DuplicateCode {
        /// Status list name.
        list: String,
        /// Repeated code.
        code: String,
    },
}
