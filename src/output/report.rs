//! Machine-readable run report
//!
//! Provides persistent storage for a finished run in JSON format.

#![allow(dead_code)]

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::{ModuleResult, RunRecord};

/// Stored summary of one run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    /// Top-level package name
    pub package: String,

    /// Directory the run searched
    pub root: PathBuf,

    /// Timestamp when discovery started
    pub started_at: DateTime<Utc>,

    /// Timestamp when the last module finished
    pub completed_at: DateTime<Utc>,

    /// Modules attempted
    pub ran: usize,

    /// Modules that failed
    pub failed: usize,

    /// Process exit status of the run
    pub exit_status: i32,

    /// Individual module results, in run order
    pub results: Vec<ModuleResult>,
}

impl RunReport {
    pub fn new(
        package: impl Into<String>,
        root: impl Into<PathBuf>,
        started_at: DateTime<Utc>,
        record: &RunRecord,
    ) -> Self {
        Self {
            package: package.into(),
            root: root.into(),
            started_at,
            completed_at: Utc::now(),
            ran: record.ran,
            failed: record.failed,
            exit_status: record.exit_status(),
            results: record.results.clone(),
        }
    }

    /// Total wall time in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.completed_at - self.started_at).num_milliseconds()
    }

    /// Save the report as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create report: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .context("Failed to serialize report")?;

        info!("Saved run report to {}", path.display());
        Ok(())
    }

    /// Load a previously saved report
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open report: {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse report: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProcessOutcome;
    use tempfile::tempdir;

    fn record() -> RunRecord {
        let mut record = RunRecord::new();
        record.record(&ProcessOutcome::new("numba.tests.test_a", 0, b"", b""), 12);
        record.record(&ProcessOutcome::new("numba.tests.test_b", 1, b"", b""), 30);
        record
    }

    #[test]
    fn test_report_from_record() {
        let report = RunReport::new("numba", "/src/numba", Utc::now(), &record());
        assert_eq!(report.ran, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.exit_status, 1);
        assert!(report.duration_ms() >= 0);
    }

    #[test]
    fn test_report_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");

        let report = RunReport::new("numba", "/src/numba", Utc::now(), &record());
        report.save(&path).unwrap();

        let loaded = RunReport::load(&path).unwrap();
        assert_eq!(loaded.package, "numba");
        assert_eq!(loaded.results, report.results);
        assert_eq!(loaded.started_at, report.started_at);
    }
}
