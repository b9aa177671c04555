//! Studioflow: task status workflow engine for studio pipeline tracking.
//!
//! The crate decides how production tasks change status when artists log
//! time, supervisors review work, and prerequisite or child tasks move on.
//! Every action runs as one unit of work: the full cascade of dependent and
//! container updates is computed in memory and committed atomically.
//!
//! # Architecture
//!
//! Studioflow follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: Concrete implementations of ports
//!
//! # Modules
//!
//! - [`task`]: Task status workflow, reviews, time logs and dependencies
//! - [`config`]: Engine configuration loaded from JSON

pub mod config;
pub mod task;
