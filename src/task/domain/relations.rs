//! Capability traits shared by entities that own workflow relationships.

use super::{Review, ReviewNumber, ReviewStatus, TaskDependency, TaskId, TimeLog};

/// Entities that wait on prerequisite tasks.
pub trait HasDependencies {
    /// Returns the outgoing dependency edges.
    fn depends(&self) -> &[TaskDependency];

    /// Returns the edge to `depends_on`, if any.
    fn dependency_on(&self, depends_on: TaskId) -> Option<&TaskDependency> {
        self.depends()
            .iter()
            .find(|edge| edge.depends_on() == depends_on)
    }

    /// Returns `true` when the entity waits on `depends_on`.
    fn depends_on(&self, depends_on: TaskId) -> bool {
        self.dependency_on(depends_on).is_some()
    }
}

/// Entities that collect review verdicts in numbered rounds.
pub trait HasReviews {
    /// Returns every review ever created, superseded ones included.
    fn reviews(&self) -> &[Review];

    /// Returns the highest review round, if any review exists.
    fn latest_review_number(&self) -> Option<ReviewNumber> {
        self.reviews().iter().map(Review::review_number).max()
    }

    /// Returns the round a freshly opened review batch gets.
    fn next_review_number(&self) -> ReviewNumber {
        self.latest_review_number()
            .map_or(ReviewNumber::FIRST, ReviewNumber::next)
    }

    /// Returns the non-superseded reviews of `round`.
    fn reviews_in_round(&self, round: ReviewNumber) -> impl Iterator<Item = &Review> {
        self.reviews()
            .iter()
            .filter(move |review| review.review_number() == round && !review.is_superseded())
    }

    /// Returns the reviews still waiting for a verdict.
    fn pending_reviews(&self) -> impl Iterator<Item = &Review> {
        self.reviews().iter().filter(|review| review.is_pending())
    }

    /// Returns the revision requests recorded in `round`.
    fn revision_requests_in_round(&self, round: ReviewNumber) -> impl Iterator<Item = &Review> {
        self.reviews_in_round(round)
            .filter(|review| review.status() == ReviewStatus::RevisionRequested)
    }
}

/// Entities with logged work.
pub trait HasTimeLogs {
    /// Returns the time logs ordered by start.
    fn time_logs(&self) -> &[TimeLog];

    /// Returns the total logged work in seconds.
    fn total_logged_seconds(&self) -> u64 {
        self.time_logs()
            .iter()
            .map(TimeLog::duration_seconds)
            .fold(0, u64::saturating_add)
    }
}
