//! Repository port for loading and committing the task graph.

use crate::task::domain::{ChangeSet, Task, TaskId, WorkflowSnapshot};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for workflow repository operations.
pub type WorkflowRepositoryResult<T> = Result<T, WorkflowRepositoryError>;

/// Task graph persistence contract.
///
/// Implementations expose a revision counter. A change set computed against
/// an older revision is rejected so that a cascade is never written over
/// changes it did not see.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Loads every task at the current revision.
    async fn load_snapshot(&self) -> WorkflowRepositoryResult<WorkflowSnapshot>;

    /// Writes every task in the change set atomically and returns the new
    /// revision.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::Conflict`] when the repository
    /// moved past `change_set.base_revision`. Nothing is written in that case.
    async fn commit(&self, change_set: &ChangeSet) -> WorkflowRepositoryResult<u64>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> WorkflowRepositoryResult<Option<Task>>;
}

/// Errors returned by workflow repository implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkflowRepositoryError {
    /// The change set was computed against a stale revision.
    #[error("revision conflict: expected {expected}, found {actual}")]
    Conflict {
        /// Revision the change set was based on.
        expected: u64,
        /// Current repository revision.
        actual: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkflowRepositoryError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
