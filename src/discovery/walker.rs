//! Filtered pre-order directory walk

use std::path::{Path, PathBuf};

use tracing::{trace, warn};
use walkdir::WalkDir;

use super::{DiscoveryError, FilterChain, Qualifier};

/// Entries retained at one directory level, as full paths
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkFrame {
    pub dir: PathBuf,
    pub dirs: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

/// Walks a directory tree, narrowing every level through a filter chain
#[derive(Clone, Copy, Debug)]
pub struct Walker<'a> {
    filters: &'a FilterChain,
    qualifier: &'a Qualifier,
}

impl<'a> Walker<'a> {
    pub fn new(filters: &'a FilterChain, qualifier: &'a Qualifier) -> Self {
        Self { filters, qualifier }
    }

    /// Start a fresh walk rooted at `root`
    pub fn walk(&self, root: impl Into<PathBuf>) -> Walk<'a> {
        Walk {
            walker: *self,
            pending: vec![root.into()],
        }
    }
}

/// Lazy iterator over the frames of one walk
pub struct Walk<'a> {
    walker: Walker<'a>,
    pending: Vec<PathBuf>,
}

impl Walk<'_> {
    fn visit(&mut self, dir: PathBuf) -> Result<Option<WalkFrame>, DiscoveryError> {
        let (dirs, files, links) = match list_dir(&dir) {
            Ok(listing) => listing,
            Err(source) => {
                warn!("Skipping unreadable directory {}: {}", dir.display(), source);
                return Ok(None);
            }
        };

        let (dirs, files) = self
            .walker
            .filters
            .apply(self.walker.qualifier, &dir, &dirs, &files)?;
        trace!(
            "{}: {} dirs, {} files retained",
            dir.display(),
            dirs.len(),
            files.len()
        );

        let dirs: Vec<PathBuf> = dirs.iter().map(|d| dir.join(d)).collect();
        let files: Vec<PathBuf> = files.iter().map(|f| dir.join(f)).collect();

        // Pruned directories never reach the stack. Reverse push keeps
        // sorted pre-order.
        for sub in dirs.iter().rev() {
            if !links.iter().any(|l| sub.ends_with(l)) {
                self.pending.push(sub.clone());
            }
        }

        Ok(Some(WalkFrame { dir, dirs, files }))
    }
}

impl Iterator for Walk<'_> {
    type Item = Result<WalkFrame, DiscoveryError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(dir) = self.pending.pop() {
            match self.visit(dir) {
                Ok(Some(frame)) => return Some(Ok(frame)),
                Ok(None) => continue,
                Err(e) => {
                    self.pending.clear();
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

/// Sorted subdirectory names, file names, and symlinked directory names
/// of a single level
fn list_dir(dir: &Path) -> Result<(Vec<String>, Vec<String>, Vec<String>), walkdir::Error> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    let mut links = Vec::new();

    let level = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in level {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if entry.file_type().is_dir() {
            dirs.push(name);
        } else if entry.path_is_symlink() && entry.path().is_dir() {
            links.push(name.clone());
            dirs.push(name);
        } else {
            files.push(name);
        }
    }

    Ok((dirs, files, links))
}
