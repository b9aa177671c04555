//! Application services for task status workflow orchestration.

mod workflow;

pub use workflow::{
    AddDependencyRequest, CreateTimeLogRequest, ReviewRevisionRequest, TaskWorkflowError,
    TaskWorkflowResult, TaskWorkflowService,
};
