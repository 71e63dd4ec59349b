//! Logging setup
//!
//! Diagnostics go to stderr so that stdout carries only the test report.

use std::str::FromStr;

use anyhow::{bail, Error};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Verbosity of diagnostic logging
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Pick the level from the `-v` flag, then `PROCTEST_LOG`, then `warn`
    pub fn resolve(verbose: bool, named: Option<&str>) -> Result<Self, Error> {
        if verbose {
            return Ok(LogLevel::Debug);
        }
        match named {
            Some(name) => name.parse(),
            None => Ok(LogLevel::Warn),
        }
    }

    fn as_tracing(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            other => bail!("Unknown log level: {other}"),
        })
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_logger(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("proctest={}", level.as_tracing())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_names() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!(" DEBUG ".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_resolve_precedence() {
        assert_eq!(LogLevel::resolve(true, Some("error")).unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::resolve(false, Some("info")).unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::resolve(false, None).unwrap(), LogLevel::Warn);
        assert!(LogLevel::resolve(false, Some("loud")).is_err());
    }
}
