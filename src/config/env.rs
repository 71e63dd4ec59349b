//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

#![allow(dead_code)]

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "PROCTEST";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Package name from PROCTEST_PACKAGE
    pub package: Option<String>,
    /// Package root from PROCTEST_ROOT
    pub root: Option<String>,
    /// Launcher program from PROCTEST_PYTHON
    pub python: Option<String>,
    /// Config file from PROCTEST_CONFIG
    pub config_file: Option<String>,
    /// Failures-only output from PROCTEST_FAILURES_ONLY
    pub failures_only: Option<bool>,
    /// Verbose from PROCTEST_VERBOSE
    pub verbose: Option<bool>,
    /// Log level name from PROCTEST_LOG
    pub log_level: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            package: get_env("PACKAGE"),
            root: get_env("ROOT"),
            python: get_env("PYTHON"),
            config_file: get_env("CONFIG"),
            failures_only: get_env_bool("FAILURES_ONLY"),
            verbose: get_env_bool("VERBOSE"),
            log_level: get_env("LOG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.package.is_some()
            || self.root.is_some()
            || self.python.is_some()
            || self.config_file.is_some()
            || self.failures_only.is_some()
            || self.verbose.is_some()
            || self.log_level.is_some()
    }

    /// Get failures-only flag with fallback
    pub fn failures_only_or(&self, default: bool) -> bool {
        self.failures_only.unwrap_or(default)
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| parse_bool(&v))
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "enabled"
    )
}

/// Print all PROCTEST environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_PACKAGE        Top-level package name");
    println!("  {ENV_PREFIX}_ROOT           Package directory to search for tests");
    println!("  {ENV_PREFIX}_PYTHON         Program used to launch test modules");
    println!("  {ENV_PREFIX}_CONFIG         Path to configuration file");
    println!("  {ENV_PREFIX}_FAILURES_ONLY  Only print failing modules (true/false)");
    println!("  {ENV_PREFIX}_VERBOSE        Enable verbose logging (true/false)");
    println!("  {ENV_PREFIX}_LOG            Log level (trace/debug/info/warn/error)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_PYTHON=python3");
    println!("  proctest run --whitelist cuda");
}
