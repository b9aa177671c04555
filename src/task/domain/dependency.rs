//! Dependency edges between tasks.

use super::{ParseDependencyTargetError, TaskId, TaskStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Point in the prerequisite's life the dependent waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyTarget {
    /// The prerequisite must be finished (CMPL or STOP).
    #[default]
    OnEnd,
    /// The prerequisite must have started.
    OnStart,
}

impl DependencyTarget {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnEnd => "onend",
            Self::OnStart => "onstart",
        }
    }

    /// Returns `true` when a prerequisite in `status` satisfies this target.
    #[must_use]
    pub const fn is_satisfied_by(self, status: TaskStatus) -> bool {
        match self {
            Self::OnEnd => status.is_done(),
            Self::OnStart => status.is_started(),
        }
    }
}

impl fmt::Display for DependencyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DependencyTarget {
    type Error = ParseDependencyTargetError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "onend" => Ok(Self::OnEnd),
            "onstart" => Ok(Self::OnStart),
            _ => Err(ParseDependencyTargetError(value.to_owned())),
        }
    }
}

/// Edge from a dependent task to one of its prerequisites.
///
/// Stored on the dependent; the reverse direction is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskDependency {
    task_id: TaskId,
    depends_on: TaskId,
    target: DependencyTarget,
}

impl TaskDependency {
    /// Creates an `onend` edge.
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

    /// Returns the dependent task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the prerequisite task.
    #[must_use]
    pub const fn depends_on(&self) -> TaskId {
        self.depends_on
    }

    /// Returns the dependency target.
    #[must_use]
    pub const fn target(&self) -> DependencyTarget {
        self.target
    }

    /// Returns `true` when a prerequisite in `status` satisfies the edge.
    #[must_use]
    pub const fn is_satisfied_by(&self, status: TaskStatus) -> bool {
        self.target.is_satisfied_by(status)
    }

    pub(crate) const fn set_target(&mut self, target: DependencyTarget) {
        self.target = target;
    }
}
