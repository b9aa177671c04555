//! Domain model for the task status workflow.
//!
//! Tasks form a containment hierarchy and an acyclic dependency graph. The
//! [`workflow`] engine applies status-changing actions to leaf tasks and
//! propagates the consequences to dependents and containers. All
//! infrastructure concerns stay outside this boundary.

mod dependency;
mod error;
mod ids;
mod relations;
mod review;
mod schedule;
mod status;
mod task;
mod time_log;
pub mod workflow;

pub use dependency::{DependencyTarget, TaskDependency};
pub use error::{
    InvalidArgumentError, NotFoundError, ParseDependencyTargetError, ParseScheduleUnitError,
    ParseStatusCodeError, StatusError, StatusListError, WorkflowError, WorkflowResult,
};
pub use ids::{Priority, ResourceId, ReviewId, TaskId, TimeLogId};
pub use relations::{HasDependencies, HasReviews, HasTimeLogs};
pub use review::{Review, ReviewNumber};
pub use schedule::{Schedule, ScheduleUnit, WorkingTime};
pub use status::{ReviewStatus, Status, StatusList, TargetEntityType, TaskAction, TaskStatus};
pub use task::{NewTask, PersistedTaskData, Task};
pub use time_log::TimeLog;
pub use workflow::{
    ChangeSet, ReviewRoundPolicy, RevisionRequest, StatusChange, WorkflowGraph, WorkflowPolicy,
    WorkflowSnapshot, WorkflowTransaction, aggregate_status,
};
