//! Review verdicts and revision round closing.

use super::{ReviewRoundPolicy, WorkflowTransaction};
use crate::task::domain::{
    HasReviews, HasTimeLogs, NotFoundError, Review, ReviewId, ReviewNumber, Schedule,
    StatusError, TaskAction, TaskId, TaskStatus, WorkflowResult,
};
use mockable::Clock;

impl<C: Clock> WorkflowTransaction<'_, C> {
    /// Approves one review. The task completes once the round has no
    /// unanswered reviews left and none of them asked for a revision.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Review`] for unknown reviews and
    /// [`StatusError`] when the review was already answered or superseded.
    pub fn approve_review(&mut self, review_id: ReviewId) -> WorkflowResult<Review> {
        let (task_id, round) = self.pending_review(review_id, TaskAction::Approve)?;
        let clock = self.clock;
        let review = self.review_mut(task_id, review_id)?;
        review.approve(clock)?;
        let approved = review.clone();
        self.touch(task_id);
        self.finish_round_if_answered(task_id, round)?;
        Ok(approved)
    }

    /// Records a revision request on one review.
    ///
    /// Under [`ReviewRoundPolicy::CloseOnRevision`] the round closes at once:
    /// the remaining unanswered reviews are superseded and the task reopens.
    /// Under [`ReviewRoundPolicy::AwaitAllVerdicts`] the task reopens once
    /// every reviewer has answered.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Review`] for unknown reviews and
    /// [`StatusError`] when the review was already answered or superseded.
    pub fn request_review_revision(
        &mut self,
        review_id: ReviewId,
        schedule: Option<Schedule>,
        description: Option<String>,
    ) -> WorkflowResult<Review> {
        let (task_id, round) = self.pending_review(review_id, TaskAction::RequestRevision)?;
        let schedule = schedule.unwrap_or(self.policy.default_revision);
        let clock = self.clock;
        let review = self.review_mut(task_id, review_id)?;
        review.request_revision(schedule, description, clock)?;
        let revised = review.clone();
        self.touch(task_id);

        match self.policy.round_policy {
            ReviewRoundPolicy::CloseOnRevision => {
                for pending in self.graph.task_mut(task_id)?.pending_reviews_mut() {
                    pending.supersede(self.clock);
                }
                self.reopen_for_revision(task_id, round)?;
            }
            ReviewRoundPolicy::AwaitAllVerdicts => {
                self.finish_round_if_answered(task_id, round)?;
            }
        }
        Ok(revised)
    }

    /// Grows the schedule to the logged time plus every revision requested
    /// in `round`, then moves the task to HREV.
    pub(super) fn reopen_for_revision(
        &mut self,
        task_id: TaskId,
        round: ReviewNumber,
    ) -> WorkflowResult<()> {
        let working_time = self.policy.working_time;
        let task = self.graph.task_mut(task_id)?;
        let requested = task
            .revision_requests_in_round(round)
            .filter_map(Review::schedule)
            .map(|schedule| working_time.to_seconds(schedule))
            .fold(0, u64::saturating_add);
        let extended =
            working_time.least_meaningful(task.total_logged_seconds().saturating_add(requested));
        task.set_schedule(extended, self.clock);
        self.touch(task_id);
        self.transition(task_id, TaskStatus::HasRevision)
    }

    fn finish_round_if_answered(
        &mut self,
        task_id: TaskId,
        round: ReviewNumber,
    ) -> WorkflowResult<()> {
        let task = self.graph.task(task_id)?;
        if task.reviews_in_round(round).any(Review::is_pending) {
            return Ok(());
        }
        if task.revision_requests_in_round(round).next().is_some() {
            return self.reopen_for_revision(task_id, round);
        }
        self.transition(task_id, TaskStatus::Completed)
    }

    /// Looks up an unanswered review and checks its task is pending review.
    fn pending_review(
        &self,
        review_id: ReviewId,
        action: TaskAction,
    ) -> WorkflowResult<(TaskId, ReviewNumber)> {
        let (task, review) = self.graph.review(review_id)?;
        if !review.is_pending() {
            return Err(StatusError::Review {
                review_id,
                status: review.status(),
                action,
            }
            .into());
        }
        if task.status() != TaskStatus::PendingReview {
            return Err(StatusError::Task {
                task_id: task.id(),
                status: task.status(),
                action,
            }
            .into());
        }
        Ok((task.id(), review.review_number()))
    }

    fn review_mut(&mut self, task_id: TaskId, review_id: ReviewId) -> WorkflowResult<&mut Review> {
        self.graph
            .task_mut(task_id)?
            .review_mut(review_id)
            .ok_or_else(|| NotFoundError::Review(review_id).into())
    }
}
