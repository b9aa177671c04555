//! In-memory workflow repository for tests and embedding.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{ChangeSet, Task, TaskId, WorkflowSnapshot},
    ports::{WorkflowRepository, WorkflowRepositoryError, WorkflowRepositoryResult},
};

/// Thread-safe in-memory task graph with a revision counter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowRepository {
    state: Arc<RwLock<InMemoryWorkflowState>>,
}

#[derive(Debug, Default)]
struct InMemoryWorkflowState {
    revision: u64,
    tasks: HashMap<TaskId, Task>,
    order: Vec<TaskId>,
}

impl InMemoryWorkflowRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with tasks at revision zero.
    ///
    /// Used to seed fixtures with statuses no action sequence produces
    /// cheaply.
    #[must_use]
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut state = InMemoryWorkflowState::default();
        for task in tasks {
            upsert(&mut state, task);
        }
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }
}

fn poisoned(err: impl std::fmt::Display) -> WorkflowRepositoryError {
    WorkflowRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn upsert(state: &mut InMemoryWorkflowState, task: Task) {
    let id = task.id();
    if state.tasks.insert(id, task).is_none() {
        state.order.push(id);
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn load_snapshot(&self) -> WorkflowRepositoryResult<WorkflowSnapshot> {
        let state = self.state.read().map_err(poisoned)?;
        let tasks = state
            .order
            .iter()
            .filter_map(|id| state.tasks.get(id).cloned())
            .collect();
        Ok(WorkflowSnapshot {
            revision: state.revision,
            tasks,
        })
    }

    async fn commit(&self, change_set: &ChangeSet) -> WorkflowRepositoryResult<u64> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.revision != change_set.base_revision {
            return Err(WorkflowRepositoryError::Conflict {
                expected: change_set.base_revision,
                actual: state.revision,
            });
        }
        for task in &change_set.tasks {
            upsert(&mut state, task.clone());
        }
        state.revision = state.revision.saturating_add(1);
        Ok(state.revision)
    }

    async fn find_by_id(&self, id: TaskId) -> WorkflowRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.tasks.get(&id).cloned())
    }
}
