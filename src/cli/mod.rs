//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Discover test modules and run each one in its own process
#[derive(Parser, Debug)]
#[command(name = "proctest")]
#[command(version)]
#[command(about = "Run every test module of a package tree in its own process")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run test modules
    Run(RunArgs),

    /// List test modules without running them
    List(SelectionArgs),

    /// Show or create configuration
    Config(ConfigArgs),
}

/// Module selection and package location
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct SelectionArgs {
    /// Only run modules whose qualified name contains this text (repeatable)
    #[arg(short, long)]
    pub whitelist: Vec<String>,

    /// Skip modules whose qualified name contains this text (repeatable)
    #[arg(short, long)]
    pub blacklist: Vec<String>,

    /// Package directory to search
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Top-level package name
    #[arg(long)]
    pub package: Option<String>,
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Only print failing modules
    #[arg(short, long)]
    pub failures_only: bool,

    /// Program used to launch each module
    #[arg(long)]
    pub python: Option<String>,

    /// Save a JSON report of the run
    #[arg(short, long)]
    pub report: Option<PathBuf>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write an example configuration file
    Init {
        /// Destination file
        #[arg(default_value = "proctest.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Describe environment variable overrides
    Env,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args_parsing() {
        let args = Args::parse_from([
            "proctest",
            "run",
            "-w",
            "cuda",
            "--whitelist",
            "npyufunc",
            "-b",
            "slow",
            "--failures-only",
        ]);
        match args.command {
            Command::Run(run) => {
                assert_eq!(run.selection.whitelist, vec!["cuda", "npyufunc"]);
                assert_eq!(run.selection.blacklist, vec!["slow"]);
                assert!(run.failures_only);
                assert!(run.report.is_none());
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_list_args() {
        let args = Args::parse_from(["proctest", "-v", "list", "--root", "/src/numba"]);
        assert!(args.verbose);
        match args.command {
            Command::List(selection) => {
                assert_eq!(selection.root, Some(PathBuf::from("/src/numba")));
                assert!(selection.whitelist.is_empty());
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_config_init_default_path() {
        let args = Args::parse_from(["proctest", "config", "init"]);
        match args.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { path, force },
            }) => {
                assert_eq!(path, PathBuf::from("proctest.yaml"));
                assert!(!force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
