//! Workflow engine configuration.
//!
//! Configuration is read from JSON. Every field is optional and falls back
//! to the studio defaults below.

use crate::task::domain::{
    Priority, ReviewRoundPolicy, ReviewStatus, Schedule, ScheduleUnit, StatusList,
    StatusListError, TargetEntityType, TaskStatus, WorkflowPolicy, WorkingTime,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        source: Arc<std::io::Error>,
    },

    /// The configuration is not valid JSON for this schema.
    #[error("invalid workflow configuration: {0}")]
    Parse(Arc<serde_json::Error>),

    /// A status list is malformed.
    #[error(transparent)]
    StatusList(#[from] StatusListError),

    /// A status list lacks a code the engine assigns.
    #[error("status list '{list}' is missing code {code}")]
    MissingStatus {
        /// Status list name.
        list: String,
        /// Missing code.
        code: String,
    },

    /// A status list targets the wrong entity type.
    #[error("status list '{list}' targets {actual}, expected {expected}")]
    WrongTarget {
        /// Status list name.
        list: String,
        /// Entity type the slot requires.
        expected: TargetEntityType,
        /// Entity type the list declares.
        actual: TargetEntityType,
    },

    /// The default priority is above the accepted range.
    #[error("default priority {0} is out of range 0..=1000")]
    PriorityOutOfRange(u16),

    /// A working-time field is zero.
    #[error("working time field '{0}' must be greater than zero")]
    ZeroWorkingTime(&'static str),

    /// The default revision effort is zero.
    #[error("review.default_revision_timing must be greater than zero")]
    ZeroRevisionTiming,

    /// The propagation bound is zero.
    #[error("propagation.max_steps must be greater than zero")]
    ZeroPropagationSteps,
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(Arc::new(err))
    }
}

/// Review round settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// How a revision request affects the rest of its round.
    #[serde(default)]
    pub round_policy: ReviewRoundPolicy,
    /// Extra effort assumed when a revision request names none.
    #[serde(default = "default_revision_timing")]
    pub default_revision_timing: u64,
    /// Unit of [`Self::default_revision_timing`].
    #[serde(default = "default_revision_unit")]
    pub default_revision_unit: ScheduleUnit,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            round_policy: ReviewRoundPolicy::default(),
            default_revision_timing: default_revision_timing(),
            default_revision_unit: default_revision_unit(),
        }
    }
}

/// Propagation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Worklist steps after which propagation is declared divergent. When
    /// unset the bound grows with the task graph.
    #[serde(default)]
    pub max_steps: Option<usize>,
}

/// Top-level workflow configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Studio working calendar.
    #[serde(default)]
    pub working_time: WorkingTime,
    /// Review round settings.
    #[serde(default)]
    pub review: ReviewConfig,
    /// Priority of tasks created without one.
    #[serde(default = "default_priority")]
    pub default_priority: u16,
    /// Propagation settings.
    #[serde(default)]
    pub propagation: PropagationConfig,
    /// Statuses tasks can take.
    #[serde(default = "StatusList::task_defaults")]
    pub task_statuses: StatusList,
    /// Statuses reviews can take.
    #[serde(default = "StatusList::review_defaults")]
    pub review_statuses: StatusList,
}

fn default_revision_timing() -> u64 {
    1
}

fn default_revision_unit() -> ScheduleUnit {
    ScheduleUnit::Hour
}

fn default_priority() -> u16 {
    Priority::DEFAULT.value()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            working_time: WorkingTime::default(),
            review: ReviewConfig::default(),
            default_priority: default_priority(),
            propagation: PropagationConfig::default(),
            task_statuses: StatusList::task_defaults(),
            review_statuses: StatusList::review_defaults(),
        }
    }
}

impl WorkflowConfig {
    /// Parses and validates configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and the validation
    /// errors of [`Self::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, plus the
    /// errors of [`Self::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = path.as_ref();
        let json = std::fs::read_to_string(file).map_err(|err| ConfigError::Read {
            path: file.to_path_buf(),
            source: Arc::new(err),
        })?;
        Self::from_json_str(&json)
    }

    /// Checks every field the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let working_time = self.working_time;
        for (field, value) in [
            ("daily_working_hours", working_time.daily_working_hours),
            ("weekly_working_days", working_time.weekly_working_days),
            ("yearly_working_days", working_time.yearly_working_days),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroWorkingTime(field));
            }
        }
        if self.default_priority > Priority::MAX {
            return Err(ConfigError::PriorityOutOfRange(self.default_priority));
        }
        if self.review.default_revision_timing == 0 {
            return Err(ConfigError::ZeroRevisionTiming);
        }
        if self.propagation.max_steps == Some(0) {
            return Err(ConfigError::ZeroPropagationSteps);
        }
        validate_status_list(
            &self.task_statuses,
            TargetEntityType::Task,
            TaskStatus::ALL.map(TaskStatus::code),
        )?;
        validate_status_list(
            &self.review_statuses,
            TargetEntityType::Review,
            ReviewStatus::ALL.map(ReviewStatus::code),
        )
    }

    /// Builds the engine policy.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::validate`].
    pub fn policy(&self) -> Result<WorkflowPolicy, ConfigError> {
        self.validate()?;
        let default_priority = Priority::new(self.default_priority)
            .map_err(|_| ConfigError::PriorityOutOfRange(self.default_priority))?;
        Ok(WorkflowPolicy {
            working_time: self.working_time,
            round_policy: self.review.round_policy,
            default_revision: Schedule::new(
                self.review.default_revision_timing,
                self.review.default_revision_unit,
            ),
            default_priority,
            max_propagation_steps: self.propagation.max_steps,
        })
    }
}

fn validate_status_list<'a>(
    list: &StatusList,
    expected: TargetEntityType,
    required: impl IntoIterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    list.validate()?;
    if list.target_entity_type() != expected {
        return Err(ConfigError::WrongTarget {
            list: list.name().to_owned(),
            expected,
            actual: list.target_entity_type(),
        });
    }
    if let Some(code) = list.missing_codes(required).into_iter().next() {
        return Err(ConfigError::MissingStatus {
            list: list.name().to_owned(),
            code,
        });
    }
    Ok(())
}
