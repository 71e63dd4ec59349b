//! Process outcome and run record models
//!
//! Defines per-module outcomes and the counters of one run.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified result of one test module process
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    Success,
    Failed,
    /// Terminated by the given signal number
    Killed(i32),
}

impl ModuleStatus {
    /// Classify an exit code where negative values mean "killed by signal -code"
    pub fn from_exit_code(code: i32) -> Self {
        match code {
            0 => ModuleStatus::Success,
            c if c < 0 => ModuleStatus::Killed(-c),
            _ => ModuleStatus::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ModuleStatus::Success)
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleStatus::Success => write!(f, "SUCCESS"),
            ModuleStatus::Failed => write!(f, "FAILED"),
            ModuleStatus::Killed(signal) => write!(f, "KILLED({signal})"),
        }
    }
}

/// Exit code and captured output of one child process
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub module: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutcome {
    pub fn new(module: impl Into<String>, exit_code: i32, stdout: &[u8], stderr: &[u8]) -> Self {
        Self {
            module: module.into(),
            exit_code,
            stdout: String::from_utf8_lossy(stdout).into_owned(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }

    pub fn status(&self) -> ModuleStatus {
        ModuleStatus::from_exit_code(self.exit_code)
    }
}

/// Per-module entry of a run record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleResult {
    pub module: String,
    pub status: ModuleStatus,
    pub exit_code: i32,
    pub duration_ms: u64,
}

/// Counters of one run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Modules attempted
    pub ran: usize,
    /// Modules that exited non-zero
    pub failed: usize,
    pub results: Vec<ModuleResult>,
}

impl RunRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished module
    pub fn record(&mut self, outcome: &ProcessOutcome, duration_ms: u64) {
        let status = outcome.status();
        self.ran += 1;
        if !status.is_success() {
            self.failed += 1;
        }
        self.results.push(ModuleResult {
            module: outcome.module.clone(),
            status,
            exit_code: outcome.exit_code,
            duration_ms,
        });
    }

    pub fn passed(&self) -> usize {
        self.ran - self.failed
    }

    /// Process exit status for the whole run
    pub fn exit_status(&self) -> i32 {
        if self.failed == 0 {
            0
        } else {
            1
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &ModuleResult> {
        self.results.iter().filter(|r| !r.status.is_success())
    }
}
