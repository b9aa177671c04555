//! Logged work intervals.

use super::{InvalidArgumentError, ResourceId, TaskId, TimeLogId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` interval of work by one resource on one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLog {
    id: TimeLogId,
    task_id: TaskId,
    resource: ResourceId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeLog {
    /// Creates a validated time log.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgumentError::InvalidInterval`] unless `start < end`.
    pub fn new(
        task_id: TaskId,
        resource: ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, InvalidArgumentError> {
        if start >= end {
            return Err(InvalidArgumentError::InvalidInterval { start, end });
        }
        Ok(Self {
            id: TimeLogId::new(),
            task_id,
            resource,
            start,
            end,
        })
    }

    /// Returns the time log identifier.
    #[must_use]
    pub const fn id(&self) -> TimeLogId {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the resource that did the work.
    #[must_use]
    pub const fn resource(&self) -> &ResourceId {
        &self.resource
    }

    /// Returns the interval start.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the interval end (exclusive).
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns the logged duration in whole seconds.
    #[must_use]
    pub fn duration_seconds(&self) -> u64 {
        u64::try_from((self.end - self.start).num_seconds()).unwrap_or(0)
    }

    /// Returns `true` when both logs belong to the same resource and overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.resource == other.resource && self.start < other.end && other.start < self.end
    }
}
