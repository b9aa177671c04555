//! Task status workflow engine.
//!
//! Every action runs inside a [`WorkflowTransaction`]: a private copy of the
//! loaded task graph that the action validates against, mutates, and
//! propagates through until statuses settle. The transaction yields a
//! [`ChangeSet`] holding every touched task, which callers commit atomically.
//! Dropping a transaction discards its work.

mod actions;
mod aggregation;
mod graph;
mod propagation;
mod reviews;

pub use actions::RevisionRequest;
pub use aggregation::aggregate_status;
pub use graph::WorkflowGraph;

use crate::task::domain::{Priority, Schedule, ScheduleUnit, Task, TaskId, TaskStatus, WorkingTime};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a review revision request affects the rest of its round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewRoundPolicy {
    /// The first revision request closes the round and reopens the task.
    #[default]
    CloseOnRevision,
    /// The round closes once every reviewer has answered.
    AwaitAllVerdicts,
}

/// Tunables the engine reads while running actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowPolicy {
    /// Calendar used for unit conversion.
    pub working_time: WorkingTime,
    /// Review round closing rule.
    pub round_policy: ReviewRoundPolicy,
    /// Extra effort assumed when a revision request names none.
    pub default_revision: Schedule,
    /// Priority given to tasks created without one.
    pub default_priority: Priority,
    /// Upper bound on propagation worklist steps. `None` derives the bound
    /// from the graph size.
    pub max_propagation_steps: Option<usize>,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            working_time: WorkingTime::default(),
            round_policy: ReviewRoundPolicy::default(),
            default_revision: Schedule::new(1, ScheduleUnit::Hour),
            default_priority: Priority::DEFAULT,
            max_propagation_steps: None,
        }
    }
}

/// Consistent view of every task at one repository revision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowSnapshot {
    /// Repository revision the tasks were read at.
    pub revision: u64,
    /// Loaded tasks.
    pub tasks: Vec<Task>,
}

/// One status transition recorded during an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// Task whose status changed.
    pub task_id: TaskId,
    /// Status before the change.
    pub from: TaskStatus,
    /// Status after the change.
    pub to: TaskStatus,
}

/// Tasks modified by one action, to be committed atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Revision the action was computed against.
    pub base_revision: u64,
    /// Full state of every touched task.
    pub tasks: Vec<Task>,
    /// Status transitions in the order they happened.
    pub changes: Vec<StatusChange>,
}

impl ChangeSet {
    /// Returns `true` when the action modified nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Unit of work over a private copy of the task graph.
pub struct WorkflowTransaction<'a, C: Clock> {
    graph: WorkflowGraph,
    base_revision: u64,
    policy: WorkflowPolicy,
    clock: &'a C,
    touched: Vec<TaskId>,
    touched_set: HashSet<TaskId>,
    changes: Vec<StatusChange>,
}

impl<'a, C: Clock> WorkflowTransaction<'a, C> {
    /// Opens a transaction over a loaded snapshot.
    #[must_use]
    pub fn new(snapshot: WorkflowSnapshot, policy: WorkflowPolicy, clock: &'a C) -> Self {
        Self {
            graph: WorkflowGraph::new(snapshot.tasks),
            base_revision: snapshot.revision,
            policy,
            clock,
            touched: Vec::new(),
            touched_set: HashSet::new(),
            changes: Vec::new(),
        }
    }

    /// Returns the working graph, including uncommitted changes.
    #[must_use]
    pub const fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    /// Returns the status transitions recorded so far.
    #[must_use]
    pub fn changes(&self) -> &[StatusChange] {
        &self.changes
    }

    /// Closes the transaction, returning every touched task.
    #[must_use]
    pub fn into_change_set(self) -> ChangeSet {
        let Self {
            graph,
            base_revision,
            touched,
            changes,
            ..
        } = self;
        let tasks = touched
            .into_iter()
            .filter_map(|id| graph.get(id).cloned())
            .collect();
        ChangeSet {
            base_revision,
            tasks,
            changes,
        }
    }

    fn touch(&mut self, id: TaskId) {
        if self.touched_set.insert(id) {
            self.touched.push(id);
        }
    }
}
