//! Container status derivation.

use super::WorkflowTransaction;
use crate::task::domain::{TaskId, TaskStatus, WorkflowResult};
use mockable::Clock;

/// Derives a container status from its children's statuses.
///
/// CMPL when every child is done, WIP when any child is engaged, RTS when
/// at least one child is ready, and WFD otherwise. No children yields WFD.
#[must_use]
pub fn aggregate_status(children: impl IntoIterator<Item = TaskStatus>) -> TaskStatus {
    let mut any = false;
    let mut all_done = true;
    let mut any_ready = false;
    for status in children {
        any = true;
        if status.is_engaged() {
            return TaskStatus::WorkInProgress;
        }
        all_done &= status.is_done();
        any_ready |= status == TaskStatus::ReadyToStart;
    }
    if any && all_done {
        TaskStatus::Completed
    } else if any_ready {
        TaskStatus::ReadyToStart
    } else {
        TaskStatus::WaitingForDependency
    }
}

impl<C: Clock> WorkflowTransaction<'_, C> {
    /// Status a container should have given its children and its own
    /// prerequisites.
    pub(super) fn derived_container_status(&self, id: TaskId) -> WorkflowResult<TaskStatus> {
        let children = self
            .graph
            .children(id)
            .iter()
            .map(|child| self.graph.task(*child).map(|task| task.status()))
            .collect::<Result<Vec<_>, _>>()?;
        let derived = aggregate_status(children);
        if derived.is_waiting() && !self.dependencies_satisfied(id)? {
            return Ok(TaskStatus::WaitingForDependency);
        }
        Ok(derived)
    }

    /// Re-derives a container's status. Returns `true` on change.
    pub(super) fn reaggregate(&mut self, id: TaskId) -> WorkflowResult<bool> {
        let derived = self.derived_container_status(id)?;
        self.set_status(id, derived)
    }
}
