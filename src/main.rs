//! proctest - process-isolated test runner for package trees
//!
//! Finds test modules inside `tests` packages of a package tree and runs
//! each one as its own child process, so a crash or a hard exit in one
//! module cannot take down the rest of the run.
//!
//! ## Usage
//!
//! ```bash
//! # Run every test module under ./numba
//! proctest run
//!
//! # Only modules mentioning "cuda", skipping anything "slow"
//! proctest run -w cuda -b slow
//!
//! # Only print failures, and keep a JSON report
//! proctest run --failures-only --report build/tests.json
//!
//! # List what would run
//! proctest list --root src/numba
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

mod cli;
mod config;
mod discovery;
mod executor;
mod models;
mod output;
mod utils;

use cli::{Args, ConfigAction, SelectionArgs};
use config::{AppConfig, ConfigFile, EnvConfig};
use discovery::{Platform, Selection};
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    init_logger(LogLevel::resolve(
        args.verbose || env.verbose.unwrap_or(false),
        env.log_level.as_deref(),
    )?);

    let mut config = load_config(&args, &env)?;

    match args.command {
        cli::Command::Run(run_args) => {
            apply_selection_args(&mut config, &run_args.selection);
            if let Some(python) = run_args.python {
                config.python = python;
            }
            if let Some(report) = run_args.report {
                config.report = Some(report);
            }

            let failures_only = run_args.failures_only || env.failures_only_or(false);
            let status = executor::test(
                &config,
                Some(run_args.selection.whitelist),
                Some(run_args.selection.blacklist),
                failures_only,
            )
            .await?;

            std::process::exit(status);
        }
        cli::Command::List(selection_args) => {
            apply_selection_args(&mut config, &selection_args);
            list_modules(&config, selection_args)?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args.action, config)?;
        }
    }

    Ok(())
}

/// Defaults < config file < environment; command line is applied per command
fn load_config(args: &Args, env: &EnvConfig) -> Result<AppConfig> {
    let explicit = args
        .config
        .clone()
        .or_else(|| env.config_file.clone().map(Into::into));

    let file = match explicit {
        Some(path) => ConfigFile::load(&path)?,
        None => ConfigFile::load_default()?,
    };

    let mut config = file.app;
    config.apply_env(env);
    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

fn apply_selection_args(config: &mut AppConfig, selection: &SelectionArgs) {
    if let Some(root) = &selection.root {
        config.root = Some(root.clone());
    }
    if let Some(package) = &selection.package {
        config.package = package.clone();
    }
}

fn list_modules(config: &AppConfig, args: SelectionArgs) -> Result<()> {
    let selection = Selection::new(args.whitelist, args.blacklist)
        .for_platform(Platform::current(), &config.discovery);
    let collector = executor::build_collector(config, &selection)?;

    let modules = collector.discover().context("Test discovery failed")?;
    for module in &modules {
        println!("{module}");
    }

    info!(
        "{} test modules under {}",
        modules.len(),
        collector.root().display()
    );
    Ok(())
}

fn manage_config(action: ConfigAction, config: AppConfig) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let file = ConfigFile {
                app: config,
                ..ConfigFile::default()
            };
            let yaml = serde_yaml::to_string(&file).context("Failed to serialize config")?;
            print!("{yaml}");
        }
        ConfigAction::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            ConfigFile::example().save(&path)?;
            println!("Wrote example configuration to {}", path.display());
        }
        ConfigAction::Env => config::print_env_help(),
    }
    Ok(())
}
