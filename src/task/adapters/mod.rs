//! Adapter implementations for task workflow ports.

pub mod memory;
