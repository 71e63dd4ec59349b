//! Discovery filters
//!
//! A filter narrows the subdirectories and files seen at one level of a
//! walk. Filters never add or reorder entries.

#![allow(dead_code)]

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::DiscoveryConfig;

use super::{DiscoveryError, Qualifier};

/// Predicate over a joined filesystem path
pub type PathPredicate = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// Predicate over a qualified dotted name
pub type NamePredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A single narrowing step
#[derive(Clone)]
pub enum Filter {
    /// Tests the joined path of every directory and file entry
    Path(PathPredicate),
    /// Tests the qualified name of directory entries; files pass through
    Package(NamePredicate),
    /// Tests the qualified name of file entries; directories pass through
    Module(NamePredicate),
    /// Keeps only files ending in the given extension
    Extension(String),
}

impl Filter {
    pub fn path(predicate: impl Fn(&Path) -> bool + Send + Sync + 'static) -> Self {
        Filter::Path(Arc::new(predicate))
    }

    pub fn package(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Filter::Package(Arc::new(predicate))
    }

    pub fn module(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Filter::Module(Arc::new(predicate))
    }

    pub fn extension(ext: impl Into<String>) -> Self {
        Filter::Extension(ext.into())
    }

    /// Narrow the entries of `dir`
    pub fn apply(
        &self,
        qualifier: &Qualifier,
        dir: &Path,
        dirs: &[String],
        files: &[String],
    ) -> Result<(Vec<String>, Vec<String>), DiscoveryError> {
        match self {
            Filter::Path(predicate) => {
                let keep = |name: &String| predicate(dir.join(name).as_path());
                Ok((
                    dirs.iter().filter(|d| keep(*d)).cloned().collect(),
                    files.iter().filter(|f| keep(*f)).cloned().collect(),
                ))
            }
            Filter::Package(predicate) => Ok((
                retain_qualified(qualifier, dir, dirs, predicate)?,
                files.to_vec(),
            )),
            Filter::Module(predicate) => Ok((
                dirs.to_vec(),
                retain_qualified(qualifier, dir, files, predicate)?,
            )),
            Filter::Extension(ext) => Ok((
                dirs.to_vec(),
                files
                    .iter()
                    .filter(|f| f.ends_with(ext.as_str()))
                    .cloned()
                    .collect(),
            )),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Path(_) => f.write_str("Filter::Path"),
            Filter::Package(_) => f.write_str("Filter::Package"),
            Filter::Module(_) => f.write_str("Filter::Module"),
            Filter::Extension(ext) => write!(f, "Filter::Extension({ext:?})"),
        }
    }
}

fn retain_qualified(
    qualifier: &Qualifier,
    dir: &Path,
    entries: &[String],
    predicate: &NamePredicate,
) -> Result<Vec<String>, DiscoveryError> {
    let mut kept = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = qualifier.qualify(&dir.join(entry))?;
        if predicate(name.as_str()) {
            kept.push(entry.clone());
        }
    }
    Ok(kept)
}

/// True if any of `items` occurs in `name` as a plain substring
pub fn matches_any(items: &[String], name: &str) -> bool {
    items.iter().any(|item| name.contains(item.as_str()))
}

/// Ordered sequence of filters, applied left to right
#[derive(Clone, Debug, Default)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed discovery policy: excluded packages under `package`,
    /// bytecode caches, module prefix and source extension.
    pub fn discovery(config: &DiscoveryConfig, package: &str) -> Self {
        let excluded = config.excluded_prefixes(package);
        let cache_suffix = format!(".{}", config.cache_dir);
        let prefix = config.module_prefix.clone();

        Self::new()
            .push(Filter::package(move |pkg| {
                !excluded.iter().any(|p| pkg.starts_with(p.as_str()))
            }))
            .push(Filter::package(move |pkg| !pkg.ends_with(&cache_suffix)))
            .push(Filter::module(move |name| {
                name.rsplit('.')
                    .next()
                    .is_some_and(|base| base.starts_with(prefix.as_str()))
            }))
            .push(Filter::extension(config.source_extension.clone()))
    }

    pub fn push(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Keep modules whose qualified name contains any whitelist entry.
    /// An empty list leaves the chain unchanged.
    pub fn with_whitelist(self, whitelist: &[String]) -> Self {
        if whitelist.is_empty() {
            return self;
        }
        let items = whitelist.to_vec();
        self.push(Filter::module(move |name| matches_any(&items, name)))
    }

    /// Drop modules whose qualified name contains any blacklist entry.
    /// An empty list leaves the chain unchanged.
    pub fn with_blacklist(self, blacklist: &[String]) -> Self {
        if blacklist.is_empty() {
            return self;
        }
        let items = blacklist.to_vec();
        self.push(Filter::module(move |name| !matches_any(&items, name)))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Fold every filter over the entries of `dir`
    pub fn apply(
        &self,
        qualifier: &Qualifier,
        dir: &Path,
        dirs: &[String],
        files: &[String],
    ) -> Result<(Vec<String>, Vec<String>), DiscoveryError> {
        let mut dirs = dirs.to_vec();
        let mut files = files.to_vec();
        for filter in &self.filters {
            let (d, f) = filter.apply(qualifier, dir, &dirs, &files)?;
            dirs = d;
            files = f;
        }
        Ok((dirs, files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn qualifier() -> Qualifier {
        Qualifier::new("numba")
    }

    #[test]
    fn test_extension_filter_is_idempotent() {
        let filter = Filter::extension(".py");
        let dir = Path::new("/src/numba/tests");
        let dirs = strings(&["sub", "data.py"]);
        let files = strings(&["test_a.py", "notes.txt", "test_b.pyc", "test_c.py"]);

        let once = filter.apply(&qualifier(), dir, &dirs, &files).unwrap();
        let twice = filter.apply(&qualifier(), dir, &once.0, &once.1).unwrap();

        assert_eq!(once.0, dirs);
        assert_eq!(once.1, strings(&["test_a.py", "test_c.py"]));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_path_filter_prunes_both_lists() {
        let filter = Filter::path(|p| !p.to_string_lossy().contains("skip"));
        let dir = Path::new("/src/numba");
        let (dirs, files) = filter
            .apply(
                &qualifier(),
                dir,
                &strings(&["keep", "skip_me"]),
                &strings(&["skip.py", "a.py"]),
            )
            .unwrap();
        assert_eq!(dirs, strings(&["keep"]));
        assert_eq!(files, strings(&["a.py"]));
    }

    #[test]
    fn test_package_filter_only_touches_dirs() {
        let filter = Filter::package(|pkg| pkg != "numba.tests.broken_issues");
        let dir = Path::new("/src/numba/tests");
        let files = strings(&["broken_issues.py"]);
        let (dirs, out_files) = filter
            .apply(&qualifier(), dir, &strings(&["broken_issues", "ok"]), &files)
            .unwrap();
        assert_eq!(dirs, strings(&["ok"]));
        assert_eq!(out_files, files);
    }

    #[test]
    fn test_module_filter_only_touches_files() {
        let filter = Filter::module(|name| name.ends_with("test_a"));
        let dir = Path::new("/src/numba/tests");
        let dirs = strings(&["test_b"]);
        let (out_dirs, files) = filter
            .apply(&qualifier(), dir, &dirs, &strings(&["test_a.py", "test_b.py"]))
            .unwrap();
        assert_eq!(out_dirs, dirs);
        assert_eq!(files, strings(&["test_a.py"]));
    }

    #[test]
    fn test_qualified_filter_propagates_config_error() {
        let filter = Filter::module(|_| true);
        let result = filter.apply(
            &qualifier(),
            Path::new("/src/other"),
            &[],
            &strings(&["test_a.py"]),
        );
        assert!(matches!(
            result,
            Err(DiscoveryError::PackageNotInPath { .. })
        ));
    }

    #[test]
    fn test_whitelist() {
        let chain = FilterChain::new().with_whitelist(&strings(&["alpha"]));
        let (_, files) = chain
            .apply(
                &qualifier(),
                Path::new("/src/numba/tests"),
                &[],
                &strings(&["test_alpha.py", "test_beta.py"]),
            )
            .unwrap();
        assert_eq!(files, strings(&["test_alpha.py"]));
    }

    #[test]
    fn test_blacklist() {
        let chain = FilterChain::new().with_blacklist(&strings(&["beta"]));
        let (_, files) = chain
            .apply(
                &qualifier(),
                Path::new("/src/numba/tests"),
                &[],
                &strings(&["test_alpha.py", "test_beta.py"]),
            )
            .unwrap();
        assert_eq!(files, strings(&["test_alpha.py"]));
    }

    #[test]
    fn test_whitelist_is_plain_substring_match() {
        assert!(matches_any(&strings(&["tests.test_a"]), "numba.tests.test_alpha"));
        assert!(matches_any(&strings(&["cuda"]), "numba.cuda.tests.test_x"));
        assert!(!matches_any(&strings(&["gamma"]), "numba.tests.test_alpha"));
        assert!(!matches_any(&[], "numba.tests.test_alpha"));
    }

    #[test]
    fn test_empty_lists_add_no_filters() {
        let chain = FilterChain::new().with_whitelist(&[]).with_blacklist(&[]);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_default_chain_excludes_broken_issues() {
        let chain = FilterChain::discovery(&DiscoveryConfig::default(), "numba");
        let (dirs, _) = chain
            .apply(
                &qualifier(),
                Path::new("/src/numba/tests"),
                &strings(&["broken_issues", "__pycache__", "npyufunc"]),
                &[],
            )
            .unwrap();
        assert_eq!(dirs, strings(&["npyufunc"]));
    }

    #[test]
    fn test_default_chain_excludes_bundled_projects() {
        let chain = FilterChain::discovery(&DiscoveryConfig::default(), "numba");
        let (dirs, _) = chain
            .apply(
                &qualifier(),
                Path::new("/src/numba"),
                &strings(&["minivect", "pyextensibletype", "tests", "typesystem"]),
                &[],
            )
            .unwrap();
        assert_eq!(dirs, strings(&["tests", "typesystem"]));
    }

    #[test]
    fn test_default_chain_selects_test_modules() {
        let chain = FilterChain::discovery(&DiscoveryConfig::default(), "numba");
        let (_, files) = chain
            .apply(
                &qualifier(),
                Path::new("/src/numba/tests"),
                &[],
                &strings(&[
                    "__init__.py",
                    "test_ufunc.py",
                    "support.py",
                    "test_data.txt",
                    "test_old.pyc",
                    "test_loops.py",
                ]),
            )
            .unwrap();
        assert_eq!(files, strings(&["test_ufunc.py", "test_loops.py"]));
    }

    #[test]
    fn test_chain_never_grows_lists() {
        let chain = FilterChain::discovery(&DiscoveryConfig::default(), "numba")
            .with_whitelist(&strings(&["test_"]))
            .with_blacklist(&strings(&["slow"]));
        let dirs = strings(&["a", "broken_issues", "__pycache__"]);
        let files = strings(&["test_a.py", "test_slow.py", "b.py", "c.txt"]);
        let dir = Path::new("/src/numba/tests");

        let mut cur = (dirs.clone(), files.clone());
        for filter in &chain.filters {
            let next = filter.apply(&qualifier(), dir, &cur.0, &cur.1).unwrap();
            assert!(next.0.len() <= cur.0.len());
            assert!(next.1.len() <= cur.1.len());
            cur = next;
        }
        assert_eq!(cur, chain.apply(&qualifier(), dir, &dirs, &files).unwrap());
        assert_eq!(cur.1, strings(&["test_a.py"]));
    }
}
