//! Test discovery
//!
//! Walks a package tree, narrows it through a filter chain and resolves
//! test files to dotted module names.

mod collector;
mod filter;
mod qualify;
mod walker;

pub use collector::{Platform, Selection, TestCollector};
pub use filter::FilterChain;
pub use qualify::Qualifier;
pub use walker::{Walk, Walker};

use std::path::PathBuf;
use thiserror::Error;

/// Discovery errors
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Package '{package}' does not appear in path {}", path.display())]
    PackageNotInPath { package: String, path: PathBuf },
}
