//! Status codes, status lists, and the leaf action table.

use super::{ParseStatusCodeError, StatusListError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Waiting for dependencies to finish.
    #[serde(rename = "WFD")]
    WaitingForDependency,
    /// Ready to start.
    #[serde(rename = "RTS")]
    ReadyToStart,
    /// Work in progress.
    #[serde(rename = "WIP")]
    WorkInProgress,
    /// Pending review.
    #[serde(rename = "PREV")]
    PendingReview,
    /// Has revision requested by the reviewers.
    #[serde(rename = "HREV")]
    HasRevision,
    /// Revision caused by a reopened dependency.
    #[serde(rename = "DREV")]
    DependencyHasRevision,
    /// On hold.
    #[serde(rename = "OH")]
    OnHold,
    /// Stopped; remaining work is abandoned.
    #[serde(rename = "STOP")]
    Stopped,
    /// Completed.
    #[serde(rename = "CMPL")]
    Completed,
}

impl TaskStatus {
    /// Every task status in workflow order.
    pub const ALL: [Self; 9] = [
        Self::WaitingForDependency,
        Self::ReadyToStart,
        Self::WorkInProgress,
        Self::PendingReview,
        Self::HasRevision,
        Self::DependencyHasRevision,
        Self::OnHold,
        Self::Stopped,
        Self::Completed,
    ];

    /// Returns the canonical status code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::WaitingForDependency => "WFD",
            Self::ReadyToStart => "RTS",
            Self::WorkInProgress => "WIP",
            Self::PendingReview => "PREV",
            Self::HasRevision => "HREV",
            Self::DependencyHasRevision => "DREV",
            Self::OnHold => "OH",
            Self::Stopped => "STOP",
            Self::Completed => "CMPL",
        }
    }

    /// Returns the default display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::WaitingForDependency => "Waiting For Dependency",
            Self::ReadyToStart => "Ready To Start",
            Self::WorkInProgress => "Work In Progress",
            Self::PendingReview => "Pending Review",
            Self::HasRevision => "Has Revision",
            Self::DependencyHasRevision => "Dependency Has Revision",
            Self::OnHold => "On Hold",
            Self::Stopped => "Stopped",
            Self::Completed => "Completed",
        }
    }

    /// Returns `true` for statuses that have not started yet (WFD, RTS).
    #[must_use]
    pub const fn is_waiting(self) -> bool {
        matches!(self, Self::WaitingForDependency | Self::ReadyToStart)
    }

    /// Returns `true` when no more work is expected (CMPL, STOP).
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Completed | Self::Stopped)
    }

    /// Returns `true` once work on the current round has begun.
    ///
    /// HREV and DREV are excluded: a reopened task has not started its new
    /// round until it logs time again.
    #[must_use]
    pub const fn is_started(self) -> bool {
        matches!(
            self,
            Self::WorkInProgress
                | Self::PendingReview
                | Self::OnHold
                | Self::Stopped
                | Self::Completed
        )
    }

    /// Returns `true` for statuses that make a parent container WIP.
    #[must_use]
    pub const fn is_engaged(self) -> bool {
        matches!(
            self,
            Self::WorkInProgress
                | Self::PendingReview
                | Self::HasRevision
                | Self::DependencyHasRevision
                | Self::OnHold
        )
    }

    /// Returns `true` for the statuses a finished task is reopened into.
    #[must_use]
    pub const fn is_reopened(self) -> bool {
        matches!(self, Self::HasRevision | Self::DependencyHasRevision)
    }

    /// Returns `true` when a leaf task in this status may run `action`.
    #[must_use]
    pub const fn permits(self, action: TaskAction) -> bool {
        match action {
            TaskAction::CreateTimeLog => matches!(
                self,
                Self::ReadyToStart
                    | Self::WorkInProgress
                    | Self::HasRevision
                    | Self::DependencyHasRevision
            ),
            TaskAction::RequestReview => matches!(self, Self::WorkInProgress),
            TaskAction::RequestRevision => matches!(self, Self::PendingReview | Self::Completed),
            TaskAction::Approve => matches!(self, Self::PendingReview),
            TaskAction::Hold => matches!(
                self,
                Self::WorkInProgress | Self::DependencyHasRevision | Self::OnHold
            ),
            TaskAction::Stop => matches!(
                self,
                Self::WorkInProgress | Self::DependencyHasRevision | Self::Stopped
            ),
            TaskAction::Resume => matches!(self, Self::OnHold | Self::Stopped),
            TaskAction::ChangeDependencies => self.is_waiting(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseStatusCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.code() == normalized)
            .ok_or_else(|| ParseStatusCodeError(value.to_owned()))
    }
}

/// Verdict status of a single review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewStatus {
    /// Waiting for the reviewer's verdict.
    #[serde(rename = "NEW")]
    New,
    /// The reviewer requested a revision.
    #[serde(rename = "RREV")]
    RevisionRequested,
    /// The reviewer approved the work.
    #[serde(rename = "APP")]
    Approved,
}

impl ReviewStatus {
    /// Every review status in workflow order.
    pub const ALL: [Self; 3] = [Self::New, Self::RevisionRequested, Self::Approved];

    /// Returns the canonical status code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::RevisionRequested => "RREV",
            Self::Approved => "APP",
        }
    }

    /// Returns the default display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::RevisionRequested => "Requested Revision",
            Self::Approved => "Approved",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for ReviewStatus {
    type Error = ParseStatusCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.code() == normalized)
            .ok_or_else(|| ParseStatusCodeError(value.to_owned()))
    }
}

/// Workflow actions that can be attempted on tasks and reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    /// Log work time.
    CreateTimeLog,
    /// Submit for review.
    RequestReview,
    /// Ask for another revision round.
    RequestRevision,
    /// Approve the pending review round.
    Approve,
    /// Put work on hold.
    Hold,
    /// Abandon remaining work.
    Stop,
    /// Resume held or stopped work.
    Resume,
    /// Add or remove prerequisites.
    ChangeDependencies,
}

impl TaskAction {
    /// Returns the action name used in messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateTimeLog => "create_time_log",
            Self::RequestReview => "request_review",
            Self::RequestRevision => "request_revision",
            Self::Approve => "approve",
            Self::Hold => "hold",
            Self::Stop => "stop",
            Self::Resume => "resume",
            Self::ChangeDependencies => "change_dependencies",
        }
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity type a status list applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetEntityType {
    /// Production tasks.
    Task,
    /// Review verdicts.
    Review,
    /// Projects.
    Project,
    /// Assets.
    Asset,
    /// Shots.
    Shot,
    /// Sequences.
    Sequence,
}

impl TargetEntityType {
    /// Returns the entity type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::Review => "Review",
            Self::Project => "Project",
            Self::Asset => "Asset",
            Self::Shot => "Shot",
            Self::Sequence => "Sequence",
        }
    }
}

impl fmt::Display for TargetEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable status value with a unique code and a display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Status {
    code: String,
    name: String,
}

impl Status {
    /// Creates a status value. The code is normalized to upper case.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into().trim().to_ascii_uppercase(),
            name: name.into(),
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<TaskStatus> for Status {
    fn from(status: TaskStatus) -> Self {
        Self::new(status.code(), status.display_name())
    }
}

impl From<ReviewStatus> for Status {
    fn from(status: ReviewStatus) -> Self {
        Self::new(status.code(), status.display_name())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Ordered statuses scoped to one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusList {
    name: String,
    target_entity_type: TargetEntityType,
    statuses: Vec<Status>,
}

impl StatusList {
    /// Creates a validated status list.
    ///
    /// # Errors
    ///
    /// Returns [`StatusListError::Empty`] without statuses or
    /// [`StatusListError::DuplicateCode`] when a code repeats.
    pub fn new(
        name: impl Into<String>,
        target_entity_type: TargetEntityType,
        statuses: Vec<Status>,
    ) -> Result<Self, StatusListError> {
        let list = Self {
            name: name.into(),
            target_entity_type,
            statuses,
        };
        list.validate()?;
        Ok(list)
    }

    /// Default task workflow statuses.
    #[must_use]
    pub fn task_defaults() -> Self {
        Self {
            name: "Task Statuses".to_owned(),
            target_entity_type: TargetEntityType::Task,
            statuses: TaskStatus::ALL.into_iter().map(Status::from).collect(),
        }
    }

    /// Default review verdict statuses.
    #[must_use]
    pub fn review_defaults() -> Self {
        Self {
            name: "Review Statuses".to_owned(),
            target_entity_type: TargetEntityType::Review,
            statuses: ReviewStatus::ALL.into_iter().map(Status::from).collect(),
        }
    }

    /// Checks that the list is non-empty and its codes are unique.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn validate(&self) -> Result<(), StatusListError> {
        if self.statuses.is_empty() {
            return Err(StatusListError::Empty(self.name.clone()));
        }
        let mut seen = HashSet::new();
        for status in &self.statuses {
            if !seen.insert(status.code()) {
                return Err(StatusListError::DuplicateCode {
                    list: self.name.clone(),
                    code: status.code().to_owned(),
                });
            }
        }
        Ok(())
    }

    /// Returns the list name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the entity type this list applies to.
    #[must_use]
    pub const fn target_entity_type(&self) -> TargetEntityType {
        self.target_entity_type
    }

    /// Returns the statuses in order.
    #[must_use]
    pub fn statuses(&self) -> &[Status] {
        &self.statuses
    }

    /// Looks up a status by code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Status> {
        self.statuses
            .iter()
            .find(|status| status.code().eq_ignore_ascii_case(code))
    }

    /// Returns `true` when the list contains the code.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Returns the position of a code in the list.
    #[must_use]
    pub fn position(&self, code: &str) -> Option<usize> {
        self.statuses
            .iter()
            .position(|status| status.code().eq_ignore_ascii_case(code))
    }

    /// Returns the codes from `required` that the list lacks.
    #[must_use]
    pub fn missing_codes<'a>(&self, required: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        required
            .into_iter()
            .filter(|code| !self.contains(code))
            .map(str::to_owned)
            .collect()
    }
}
