//! Two-phase test collection
//!
//! The first walk finds test packages anywhere under the root; each one is
//! then walked on its own to enumerate test modules.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::DiscoveryConfig;

use super::{DiscoveryError, FilterChain, Qualifier, Walk, Walker};

/// Operating system family, for platform-specific exclusions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

/// Caller-supplied module selection
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
}

impl Selection {
    pub fn new(whitelist: Vec<String>, blacklist: Vec<String>) -> Self {
        Self {
            whitelist,
            blacklist,
        }
    }

    /// Add the modules known not to run on `platform`
    pub fn for_platform(mut self, platform: Platform, config: &DiscoveryConfig) -> Self {
        if platform == Platform::Windows {
            for module in &config.windows_blacklist {
                if !self.blacklist.contains(module) {
                    self.blacklist.push(module.clone());
                }
            }
        }
        self
    }

    /// Build the full filter chain for this selection
    pub fn filters(&self, config: &DiscoveryConfig, package: &str) -> FilterChain {
        FilterChain::discovery(config, package)
            .with_whitelist(&self.whitelist)
            .with_blacklist(&self.blacklist)
    }
}

/// Finds test modules under a package root
#[derive(Clone, Debug)]
pub struct TestCollector {
    root: PathBuf,
    test_package: String,
    filters: FilterChain,
    qualifier: Qualifier,
}

impl TestCollector {
    pub fn new(
        root: impl Into<PathBuf>,
        test_package: impl Into<String>,
        filters: FilterChain,
        qualifier: Qualifier,
    ) -> Self {
        Self {
            root: root.into(),
            test_package: test_package.into(),
            filters,
            qualifier,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn qualifier(&self) -> &Qualifier {
        &self.qualifier
    }

    /// Lazily yield qualified test module names
    pub fn modules(&self) -> TestModules<'_> {
        let walker = Walker::new(&self.filters, &self.qualifier);
        TestModules {
            collector: self,
            walker,
            packages: walker.walk(&self.root),
            pending_packages: VecDeque::new(),
            modules: None,
            pending_files: VecDeque::new(),
        }
    }

    /// Collect every qualified test module name
    pub fn discover(&self) -> Result<Vec<String>, DiscoveryError> {
        self.modules().collect()
    }

    fn is_test_package(&self, dir: &Path) -> bool {
        dir.file_name()
            .is_some_and(|name| name == self.test_package.as_str())
    }
}

/// Iterator over the modules found by a [`TestCollector`]
pub struct TestModules<'a> {
    collector: &'a TestCollector,
    walker: Walker<'a>,
    packages: Walk<'a>,
    pending_packages: VecDeque<PathBuf>,
    modules: Option<Walk<'a>>,
    pending_files: VecDeque<PathBuf>,
}

impl Iterator for TestModules<'_> {
    type Item = Result<String, DiscoveryError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(file) = self.pending_files.pop_front() {
                return Some(self.collector.qualifier.qualify(&file));
            }

            if let Some(walk) = self.modules.as_mut() {
                match walk.next() {
                    Some(Ok(frame)) => {
                        self.pending_files.extend(frame.files);
                        continue;
                    }
                    Some(Err(e)) => return Some(Err(e)),
                    None => self.modules = None,
                }
            }

            if let Some(package) = self.pending_packages.pop_front() {
                debug!("Collecting modules in {}", package.display());
                self.modules = Some(self.walker.walk(package));
                continue;
            }

            match self.packages.next()? {
                Ok(frame) => {
                    let collector = self.collector;
                    self.pending_packages.extend(
                        frame
                            .dirs
                            .into_iter()
                            .filter(|dir| collector.is_test_package(dir)),
                    );
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
