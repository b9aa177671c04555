//! Shared world state for task status workflow BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use mockable::DefaultClock;
use rstest::fixture;
use studioflow::task::{
    adapters::memory::InMemoryWorkflowRepository,
    domain::{Task, TaskId},
    services::{CreateTimeLogRequest, TaskWorkflowError, TaskWorkflowService},
};

/// Service type used by the BDD world.
pub type TestWorkflowService = TaskWorkflowService<InMemoryWorkflowRepository, DefaultClock>;

/// Scenario world for task status workflow behaviour tests.
pub struct WorkflowWorld {
    pub service: TestWorkflowService,
    pub tasks: HashMap<String, TaskId>,
    pub logged_hours: i64,
    pub last_action_result: Option<Result<(), TaskWorkflowError>>,
}

impl WorkflowWorld {
    /// Creates a world with no tasks.
    #[must_use]
    pub fn new() -> Self {
        let service = TaskWorkflowService::new(
            Arc::new(InMemoryWorkflowRepository::new()),
            Arc::new(DefaultClock),
        );

        Self {
            service,
            tasks: HashMap::new(),
            logged_hours: 0,
            last_action_result: None,
        }
    }

    /// Resolves a task created earlier in the scenario.
    pub fn task_id(&self, name: &str) -> Result<TaskId, eyre::Report> {
        self.tasks
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("no task named {name} in scenario world"))
    }

    /// Loads the committed state of a named task.
    pub fn stored_task(&self, name: &str) -> Result<Task, eyre::Report> {
        let task_id = self.task_id(name)?;
        run_async(self.service.find_task(task_id))?
            .ok_or_else(|| eyre::eyre!("task {name} missing from repository"))
    }

    /// Builds a time log request following every earlier log, so the one
    /// scenario artist is never overbooked.
    pub fn next_time_log(
        &mut self,
        name: &str,
        hours: i64,
    ) -> Result<CreateTimeLogRequest, eyre::Report> {
        let task_id = self.task_id(name)?;
        let start = base_time()? + Duration::hours(self.logged_hours);
        self.logged_hours += hours;
        Ok(CreateTimeLogRequest::new(
            task_id,
            "artist",
            start,
            start + Duration::hours(hours),
        ))
    }
}

impl Default for WorkflowWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn base_time() -> Result<DateTime<Utc>, eyre::Report> {
    Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0)
        .single()
        .ok_or_else(|| eyre::eyre!("invalid scenario base time"))
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> WorkflowWorld {
    WorkflowWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
