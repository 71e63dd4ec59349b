//! Test execution runner
//!
//! Runs every discovered test module in its own child process, one at a
//! time, and counts the failures.

#![allow(dead_code)]

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::signals::{exit_code, SignalTable};
use crate::config::AppConfig;
use crate::discovery::{Platform, Qualifier, Selection, TestCollector};
use crate::models::{ModuleStatus, ProcessOutcome, RunRecord};
use crate::output::{Reporter, RunReport};
use crate::utils::Timer;

/// Runner errors
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to launch '{program}' for {module}: {source}")]
    Spawn {
        program: String,
        module: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write progress: {0}")]
    Report(#[from] io::Error),
}

/// Command line that runs a module as a program entry point
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Launcher {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl Launcher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
        }
    }

    /// Launcher whose children start in the package's import root
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(config.python.clone(), config.launcher_args.clone())
            .with_working_dir(config.import_root()?))
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments for running `module`
    pub fn args_for(&self, module: &str) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(module.to_string());
        args
    }

    fn command(&self, module: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(self.args_for(module))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }
}

/// Runs each module in an isolated child process
pub struct ProcessRunner<W: Write> {
    launcher: Launcher,
    signals: SignalTable,
    reporter: Reporter<W>,
    record: RunRecord,
}

impl<W: Write> ProcessRunner<W> {
    pub fn new(launcher: Launcher, signals: SignalTable, reporter: Reporter<W>) -> Self {
        Self {
            launcher,
            signals,
            reporter,
            record: RunRecord::new(),
        }
    }

    pub fn record(&self) -> &RunRecord {
        &self.record
    }

    pub fn reporter_mut(&mut self) -> &mut Reporter<W> {
        &mut self.reporter
    }

    pub fn into_parts(self) -> (RunRecord, Reporter<W>) {
        (self.record, self.reporter)
    }

    /// Launch the module and wait for it to exit with all output drained
    async fn execute(&self, module: &str) -> Result<ProcessOutcome, RunnerError> {
        let output = self
            .launcher
            .command(module)
            .output()
            .await
            .map_err(|source| RunnerError::Spawn {
                program: self.launcher.program.clone(),
                module: module.to_string(),
                source,
            })?;

        Ok(ProcessOutcome::new(
            module,
            exit_code(&output.status),
            &output.stdout,
            &output.stderr,
        ))
    }

    /// Run one module, report it, and count it
    pub async fn collect(&mut self, module: &str) -> Result<ModuleStatus, RunnerError> {
        self.reporter.module_started(module)?;

        let timer = Timer::start(module);
        let outcome = match self.execute(module).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.reporter.module_aborted()?;
                return Err(e);
            }
        };
        let duration_ms = timer.stop();

        let status = outcome.status();
        if !status.is_success() {
            warn!("{} exited with code {}", module, outcome.exit_code);
        }

        let descriptor = self.signals.describe(outcome.exit_code);
        self.reporter.module_finished(&outcome, &descriptor)?;
        self.record.record(&outcome, duration_ms);

        Ok(status)
    }

    /// Print the summary line once every module has run
    pub fn finish(&mut self) -> Result<&RunRecord, RunnerError> {
        self.reporter.summary(&self.record)?;
        info!(
            "Ran {} test modules, {} failed",
            self.record.ran, self.record.failed
        );
        Ok(&self.record)
    }
}

/// Discover modules and hand each one to the runner, then finish the run
pub async fn run_tests<W: Write>(
    collector: &TestCollector,
    runner: &mut ProcessRunner<W>,
) -> Result<()> {
    runner.reporter_mut().header(collector.root())?;

    for module in collector.modules() {
        let module = module.context("Test discovery failed")?;
        debug!("Collected {}", module);
        runner.collect(&module).await?;
    }

    runner.finish()?;
    Ok(())
}

/// Build the collector for a configuration and selection
pub fn build_collector(config: &AppConfig, selection: &Selection) -> Result<TestCollector> {
    let root = config.resolve_root()?;
    let filters = selection.filters(&config.discovery, &config.package);
    debug!(
        "Discovering tests under {} with {} filters",
        root.display(),
        filters.len()
    );

    Ok(TestCollector::new(
        root,
        config.discovery.test_package.clone(),
        filters,
        Qualifier::new(config.package.clone()),
    ))
}

/// Completed run with its record and the reporter's sink
pub struct RunSummary<W: Write> {
    pub started_at: DateTime<Utc>,
    pub record: RunRecord,
    pub reporter: Reporter<W>,
}

/// Run every selected module, reporting through `reporter`
pub async fn run<W: Write>(
    config: &AppConfig,
    selection: &Selection,
    signals: SignalTable,
    reporter: Reporter<W>,
) -> Result<RunSummary<W>> {
    let started_at = Utc::now();
    let collector = build_collector(config, selection)?;
    let launcher = Launcher::from_config(config)?;
    debug!("Launching modules from {:?}", launcher.working_dir());
    let mut runner = ProcessRunner::new(launcher, signals, reporter);

    run_tests(&collector, &mut runner).await?;

    let (record, reporter) = runner.into_parts();
    Ok(RunSummary {
        started_at,
        record,
        reporter,
    })
}

/// Run the test suite on stdout; 0 when every module passed, 1 otherwise.
///
/// Saves a JSON report when the configuration names one.
pub async fn test(
    config: &AppConfig,
    whitelist: Option<Vec<String>>,
    blacklist: Option<Vec<String>>,
    print_failures_only: bool,
) -> Result<i32> {
    let selection = Selection::new(whitelist.unwrap_or_default(), blacklist.unwrap_or_default())
        .for_platform(Platform::current(), &config.discovery);

    let summary = run(
        config,
        &selection,
        SignalTable::platform(),
        Reporter::stdout(print_failures_only),
    )
    .await?;

    if let Some(path) = &config.report {
        RunReport::new(
            config.package.clone(),
            config.resolve_root()?,
            summary.started_at,
            &summary.record,
        )
        .save(path)?;
    }

    Ok(summary.record.exit_status())
}
