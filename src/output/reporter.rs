//! Progress reporter
//!
//! Writes one line per module as it completes, failure diagnostics, and a
//! final summary.

#![allow(dead_code)]

use std::io::{self, Write};
use std::path::Path;

use crate::models::{ProcessOutcome, RunRecord};

/// Width of the module name column
pub const NAME_WIDTH: usize = 70;

/// Width the signal descriptor is right-justified to
pub const DESCRIPTOR_WIDTH: usize = 79;

/// Length of the separator printed after failure output
pub const SEPARATOR_WIDTH: usize = 80;

/// Text reporter writing to any sink
pub struct Reporter<W: Write> {
    out: W,
    failures_only: bool,
}

impl Reporter<io::Stdout> {
    pub fn stdout(failures_only: bool) -> Self {
        Self::new(io::stdout(), failures_only)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, failures_only: bool) -> Self {
        Self { out, failures_only }
    }

    pub fn failures_only(&self) -> bool {
        self.failures_only
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn header(&mut self, root: &Path) -> io::Result<()> {
        writeln!(self.out, "Running tests in {}", root.display())?;
        self.out.flush()
    }

    /// Print the name column before the module runs
    pub fn module_started(&mut self, module: &str) -> io::Result<()> {
        if self.failures_only {
            return Ok(());
        }
        write!(self.out, "{module:<width$}", width = NAME_WIDTH)?;
        self.out.flush()
    }

    /// Finish the module's line; failures also get the signal descriptor,
    /// captured output, and a separator.
    pub fn module_finished(&mut self, outcome: &ProcessOutcome, descriptor: &str) -> io::Result<()> {
        if outcome.status().is_success() {
            if !self.failures_only {
                writeln!(self.out, " SUCCESS")?;
            }
            return self.out.flush();
        }

        if self.failures_only {
            write!(self.out, "{:<width$}", outcome.module, width = NAME_WIDTH)?;
        }
        writeln!(self.out, " FAILED:")?;
        writeln!(self.out, "{descriptor:>width$}", width = DESCRIPTOR_WIDTH)?;
        self.out.write_all(outcome.stdout.as_bytes())?;
        self.out.write_all(outcome.stderr.as_bytes())?;
        writeln!(self.out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
        self.out.flush()
    }

    /// Terminate the name column of a module that never ran
    pub fn module_aborted(&mut self) -> io::Result<()> {
        if self.failures_only {
            return Ok(());
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    pub fn summary(&mut self, record: &RunRecord) -> io::Result<()> {
        writeln!(
            self.out,
            "ran test files: failed: ({}/{})",
            record.failed, record.ran
        )?;
        self.out.flush()
    }
}
