//! Transitive status propagation through dependents and parents.

use super::{StatusChange, WorkflowTransaction};
use crate::task::domain::{
    DependencyTarget, HasDependencies, TaskId, TaskStatus, WorkflowError, WorkflowResult,
};
use mockable::Clock;
use std::collections::VecDeque;
use tracing::debug;

impl<C: Clock> WorkflowTransaction<'_, C> {
    /// Sets a task's status and records the change. Returns `true` on change.
    pub(super) fn set_status(&mut self, id: TaskId, to: TaskStatus) -> WorkflowResult<bool> {
        let task = self.graph.task_mut(id)?;
        let from = task.status();
        if from == to {
            return Ok(false);
        }
        task.set_status(to, self.clock);
        debug!(task_id = %id, from = from.code(), to = to.code(), "task status changed");
        self.changes.push(StatusChange {
            task_id: id,
            from,
            to,
        });
        self.touch(id);
        Ok(true)
    }

    /// Returns `true` when every prerequisite of `id` satisfies its edge.
    pub(super) fn dependencies_satisfied(&self, id: TaskId) -> WorkflowResult<bool> {
        for edge in self.graph.task(id)?.depends() {
            let prerequisite = self.graph.task(edge.depends_on())?;
            if !edge.is_satisfied_by(prerequisite.status()) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Returns `true` when every prerequisite of `id` is finished, whatever
    /// the edge target.
    pub(super) fn dependencies_done(&self, id: TaskId) -> WorkflowResult<bool> {
        for edge in self.graph.task(id)?.depends() {
            if !self.graph.task(edge.depends_on())?.status().is_done() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Status a leaf in the waiting states should have.
    pub(super) fn waiting_status(&self, id: TaskId) -> WorkflowResult<TaskStatus> {
        Ok(if self.dependencies_satisfied(id)? {
            TaskStatus::ReadyToStart
        } else {
            TaskStatus::WaitingForDependency
        })
    }

    /// Re-evaluates everything affected by a change to `origin` until no
    /// status changes any more.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::PropagationDiverged`] when the worklist
    /// exceeds the configured bound, or the graph-derived bound when none is
    /// configured.
    pub(crate) fn propagate(&mut self, origin: TaskId) -> WorkflowResult<()> {
        let limit = self
            .policy
            .max_propagation_steps
            .unwrap_or_else(|| self.graph.propagation_bound());
        let mut queue = VecDeque::from([origin]);
        let mut steps = 0_usize;
        while let Some(changed) = queue.pop_front() {
            steps = steps.saturating_add(1);
            if steps > limit {
                return Err(WorkflowError::PropagationDiverged { steps: limit });
            }

            let reopened = self.graph.task(changed)?.status().is_reopened();
            if reopened {
                self.retarget_dependents(changed)?;
            }
            for dependent in self.graph.dependents(changed).to_vec() {
                if self.reevaluate_dependent(dependent, reopened)? {
                    queue.push_back(dependent);
                }
            }
            if let Some(parent) = self.graph.parent(changed)
                && self.reaggregate(parent)?
            {
                queue.push_back(parent);
            }
        }
        Ok(())
    }

    /// Flips the edges pointing at a reopened task to `onstart` for every
    /// dependent that has already left the waiting states.
    fn retarget_dependents(&mut self, reopened: TaskId) -> WorkflowResult<()> {
        for dependent in self.graph.dependents(reopened).to_vec() {
            let task = self.graph.task_mut(dependent)?;
            if task.status().is_waiting() {
                continue;
            }
            if task.retarget_dependency(reopened, DependencyTarget::OnStart, self.clock) {
                debug!(
                    task_id = %dependent,
                    depends_on = %reopened,
                    "dependency retargeted to onstart"
                );
                self.touch(dependent);
            }
        }
        Ok(())
    }

    fn reevaluate_dependent(
        &mut self,
        id: TaskId,
        prerequisite_reopened: bool,
    ) -> WorkflowResult<bool> {
        if self.graph.is_container(id) {
            return self.reaggregate(id);
        }
        let current = self.graph.task(id)?.status();
        let next = match current {
            TaskStatus::WaitingForDependency | TaskStatus::ReadyToStart => self.waiting_status(id)?,
            TaskStatus::WorkInProgress if !self.dependencies_satisfied(id)? => {
                TaskStatus::DependencyHasRevision
            }
            TaskStatus::DependencyHasRevision if self.dependencies_satisfied(id)? => {
                TaskStatus::WorkInProgress
            }
            TaskStatus::Completed if prerequisite_reopened => TaskStatus::DependencyHasRevision,
            other => other,
        };
        self.set_status(id, next)
    }
}
