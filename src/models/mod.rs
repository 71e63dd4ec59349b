//! Data models for test runs
//!
//! This module contains the data structures shared by the runner and the
//! reporters.

mod outcome;

pub use outcome::{ModuleResult, ModuleStatus, ProcessOutcome, RunRecord};
