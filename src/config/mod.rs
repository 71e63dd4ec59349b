//! Configuration module
//!
//! Handles loading and managing configuration.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};
pub use file::ConfigFile;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Top-level package name that qualified names are rooted at
    pub package: String,

    /// Package directory to search; `<cwd>/<package>` when unset
    pub root: Option<PathBuf>,

    /// Program used to launch a test module
    pub python: String,

    /// Arguments placed between the program and the module name
    pub launcher_args: Vec<String>,

    /// Where to save a JSON report of each run
    pub report: Option<PathBuf>,

    /// Discovery policy
    pub discovery: DiscoveryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            package: "numba".to_string(),
            root: None,
            python: "python".to_string(),
            launcher_args: vec!["-m".to_string()],
            report: None,
            discovery: DiscoveryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Resolve the package root directory
    pub fn resolve_root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => {
                let cwd = std::env::current_dir().context("Failed to read current directory")?;
                Ok(cwd.join(&self.package))
            }
        }
    }

    /// Directory the package is importable from: the parent of the deepest
    /// `<package>` component of the root, else the root's own parent.
    pub fn import_root(&self) -> Result<PathBuf> {
        let root = self.resolve_root()?;
        let parent = root
            .ancestors()
            .find(|dir| dir.file_name().is_some_and(|name| name == self.package.as_str()))
            .and_then(Path::parent)
            .or_else(|| root.parent());

        Ok(match parent {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        })
    }

    /// Set package name
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Set package root
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set launcher program and its leading arguments
    pub fn with_launcher(mut self, python: impl Into<String>, args: Vec<String>) -> Self {
        self.python = python.into();
        self.launcher_args = args;
        self
    }

    /// Save a JSON report of each run to `path`
    pub fn with_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.report = Some(path.into());
        self
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(package) = &env.package {
            self.package = package.clone();
        }
        if let Some(root) = &env.root {
            self.root = Some(PathBuf::from(root));
        }
        if let Some(python) = &env.python {
            self.python = python.clone();
        }
    }
}

/// Test discovery policy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Directory name that marks a test package
    pub test_package: String,

    /// Base-name prefix of test modules
    pub module_prefix: String,

    /// Source file extension of test modules
    pub source_extension: String,

    /// Bytecode cache directory, never visited
    pub cache_dir: String,

    /// Packages that are never visited, relative to the top-level package
    pub excluded_packages: Vec<String>,

    /// Modules that are always blacklisted on Windows
    pub windows_blacklist: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            test_package: "tests".to_string(),
            module_prefix: "test_".to_string(),
            source_extension: ".py".to_string(),
            cache_dir: "__pycache__".to_string(),
            excluded_packages: vec![
                "minivect".to_string(),
                "pyextensibletype".to_string(),
                "tests.broken_issues".to_string(),
            ],
            windows_blacklist: vec!["test_pycc_tresult".to_string()],
        }
    }
}

impl DiscoveryConfig {
    /// Excluded packages as qualified prefixes under `package`
    pub fn excluded_prefixes(&self, package: &str) -> Vec<String> {
        self.excluded_packages
            .iter()
            .map(|p| format!("{package}.{p}"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.package, "numba");
        assert_eq!(config.python, "python");
        assert_eq!(config.launcher_args, vec!["-m"]);
        assert!(config.root.is_none());
    }

    #[test]
    fn test_discovery_defaults() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.test_package, "tests");
        assert_eq!(config.module_prefix, "test_");
        assert_eq!(config.source_extension, ".py");
        assert!(config
            .excluded_prefixes("numba")
            .contains(&"numba.tests.broken_issues".to_string()));
    }

    #[test]
    fn test_excluded_prefixes_follow_package() {
        let config = DiscoveryConfig::default();
        assert_eq!(
            config.excluded_prefixes("mypkg"),
            vec![
                "mypkg.minivect",
                "mypkg.pyextensibletype",
                "mypkg.tests.broken_issues"
            ]
        );
    }

    #[test]
    fn test_resolve_root() {
        let config = AppConfig::default().with_root("/opt/src/numba");
        assert_eq!(config.resolve_root().unwrap(), PathBuf::from("/opt/src/numba"));

        let config = AppConfig::default().with_package("mypkg");
        assert!(config.resolve_root().unwrap().ends_with("mypkg"));
    }

    #[test]
    fn test_import_root() {
        let config = AppConfig::default().with_root("/opt/src/numba");
        assert_eq!(config.import_root().unwrap(), PathBuf::from("/opt/src"));

        // Deepest package component wins
        let config = AppConfig::default().with_root("/numba/checkout/numba/cuda");
        assert_eq!(config.import_root().unwrap(), PathBuf::from("/numba/checkout"));

        let config = AppConfig::default().with_root("numba");
        assert_eq!(config.import_root().unwrap(), PathBuf::from("."));

        let config = AppConfig::default().with_package("scipy").with_root("/opt/numba");
        assert_eq!(config.import_root().unwrap(), PathBuf::from("/opt"));
    }

    #[test]
    fn test_apply_env() {
        let mut config = AppConfig::default();
        let env = EnvConfig {
            package: Some("other".to_string()),
            python: Some("python3".to_string()),
            ..Default::default()
        };
        config.apply_env(&env);
        assert_eq!(config.package, "other");
        assert_eq!(config.python, "python3");
        assert!(config.root.is_none());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("package: mypkg\n").unwrap();
        assert_eq!(config.package, "mypkg");
        assert_eq!(config.discovery, DiscoveryConfig::default());
    }
}
