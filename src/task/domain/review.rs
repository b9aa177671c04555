//! Review verdicts recorded against a task.

use super::{ResourceId, ReviewId, ReviewStatus, Schedule, StatusError, TaskAction, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Revision round a review belongs to. Rounds start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewNumber(u32);

impl ReviewNumber {
    /// The first round of a task.
    pub const FIRST: Self = Self(1);

    /// Creates a review number, clamping zero to the first round.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 { Self::FIRST } else { Self(value) }
    }

    /// Returns the following round.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Returns the numeric round.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ReviewNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One reviewer's verdict within one revision round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    id: ReviewId,
    task_id: TaskId,
    reviewer: ResourceId,
    review_number: ReviewNumber,
    status: ReviewStatus,
    description: Option<String>,
    schedule: Option<Schedule>,
    superseded: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Review {
    /// Creates a pending review in the given round.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        reviewer: ResourceId,
        review_number: ReviewNumber,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ReviewId::new(),
            task_id,
            reviewer,
            review_number,
            status: ReviewStatus::New,
            description: None,
            schedule: None,
            superseded: false,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Creates a review that already carries a revision verdict.
    #[must_use]
    pub fn revision(
        task_id: TaskId,
        reviewer: ResourceId,
        review_number: ReviewNumber,
        schedule: Schedule,
        description: Option<String>,
        clock: &impl Clock,
    ) -> Self {
        let mut review = Self::new(task_id, reviewer, review_number, clock);
        review.status = ReviewStatus::RevisionRequested;
        review.schedule = Some(schedule);
        review.description = description;
        review
    }

    /// Returns the review identifier.
    #[must_use]
    pub const fn id(&self) -> ReviewId {
        self.id
    }

    /// Returns the reviewed task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the reviewer.
    #[must_use]
    pub const fn reviewer(&self) -> &ResourceId {
        &self.reviewer
    }

    /// Returns the revision round.
    #[must_use]
    pub const fn review_number(&self) -> ReviewNumber {
        self.review_number
    }

    /// Returns the verdict status.
    #[must_use]
    pub const fn status(&self) -> ReviewStatus {
        self.status
    }

    /// Returns the reviewer's note, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the extra effort requested with a revision, if any.
    #[must_use]
    pub const fn schedule(&self) -> Option<Schedule> {
        self.schedule
    }

    /// Returns `true` once a later round replaced this review unanswered.
    #[must_use]
    pub const fn is_superseded(&self) -> bool {
        self.superseded
    }

    /// Returns `true` while the review waits for a verdict.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        !self.superseded && matches!(self.status, ReviewStatus::New)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest verdict timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Records an approval.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::Review`] unless the review is pending.
    pub fn approve(&mut self, clock: &impl Clock) -> Result<(), StatusError> {
        self.ensure_pending(TaskAction::Approve)?;
        self.status = ReviewStatus::Approved;
        self.updated_at = clock.utc();
        Ok(())
    }

    /// Records a revision request with its extra effort.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::Review`] unless the review is pending.
    pub fn request_revision(
        &mut self,
        schedule: Schedule,
        description: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), StatusError> {
        self.ensure_pending(TaskAction::RequestRevision)?;
        self.status = ReviewStatus::RevisionRequested;
        self.schedule = Some(schedule);
        if description.is_some() {
            self.description = description;
        }
        self.updated_at = clock.utc();
        Ok(())
    }

    pub(crate) fn supersede(&mut self, clock: &impl Clock) {
        self.superseded = true;
        self.updated_at = clock.utc();
    }

    fn ensure_pending(&self, action: TaskAction) -> Result<(), StatusError> {
        if self.is_pending() {
            return Ok(());
        }
        Err(StatusError::Review {
            review_id: self.id,
            status: self.status,
            action,
        })
    }
}
