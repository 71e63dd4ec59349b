//! Signal number to name lookup
//!
//! Describes children that were terminated by a signal.

#![allow(dead_code)]

use std::collections::HashMap;
use std::process::ExitStatus;

/// Signal names available on this platform, keyed by number
#[derive(Clone, Debug, Default)]
pub struct SignalTable {
    names: HashMap<i32, String>,
}

impl SignalTable {
    /// Build the table from the platform's signal definitions
    #[cfg(unix)]
    pub fn platform() -> Self {
        use nix::sys::signal::Signal;

        let names = Signal::iterator()
            .map(|signal| (signal as i32, signal.as_str().to_string()))
            .collect();
        Self { names }
    }

    #[cfg(not(unix))]
    pub fn platform() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = (i32, S)>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(|(n, s)| (n, s.into())).collect(),
        }
    }

    pub fn name(&self, signal: i32) -> Option<&str> {
        self.names.get(&signal).map(String::as_str)
    }

    /// Describe an exit code. Negative codes name the terminating signal,
    /// falling back to `Signal N`; other codes describe to an empty string.
    pub fn describe(&self, exit_code: i32) -> String {
        if exit_code >= 0 {
            return String::new();
        }
        let signal = -exit_code;
        match self.name(signal) {
            Some(name) => name.to_string(),
            None => format!("Signal {signal}"),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Exit code of a finished child, with termination by signal N as `-N`
pub fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}
