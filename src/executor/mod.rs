//! Test execution engine
//!
//! Runs discovered test modules in isolated child processes.

mod runner;
mod signals;

pub use runner::{build_collector, test};
