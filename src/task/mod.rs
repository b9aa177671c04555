//! Task status workflow for studio production tracking.
//!
//! Tasks move through WFD, RTS, WIP, PREV, HREV, DREV, OH, STOP and CMPL in
//! response to direct actions (logging time, review, hold, stop, resume) and
//! to changes of the tasks they depend on or contain. The module follows
//! hexagonal architecture:
//!
//! - Domain types and the workflow engine in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
