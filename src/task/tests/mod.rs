//! Unit tests for the task status workflow.

mod ids_tests;
