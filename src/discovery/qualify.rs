//! Path to dotted module name conversion

#![allow(dead_code)]

use std::path::{Path, MAIN_SEPARATOR};

use super::DiscoveryError;

/// Turns filesystem paths into dotted names rooted at the top-level package
#[derive(Clone, Debug)]
pub struct Qualifier {
    package: String,
}

impl Qualifier {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }

    /// Top-level package name
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Qualify a path such as `src/numba/tests/test_foo.py` to
    /// `numba.tests.test_foo`.
    ///
    /// The rightmost `<package>.` in the dotted form wins, so a tree that
    /// repeats the package name resolves against the deepest segment.
    pub fn qualify(&self, path: &Path) -> Result<String, DiscoveryError> {
        let stem = if path.extension().is_some() {
            path.with_extension("")
        } else {
            path.to_path_buf()
        };

        let mut dotted: String = stem
            .to_string_lossy()
            .chars()
            .map(|c| {
                if c == '/' || c == '\\' || c == MAIN_SEPARATOR {
                    '.'
                } else {
                    c
                }
            })
            .collect();
        dotted.push('.');

        let needle = format!("{}.", self.package);
        let offset = dotted
            .rfind(&needle)
            .ok_or_else(|| DiscoveryError::PackageNotInPath {
                package: self.package.clone(),
                path: path.to_path_buf(),
            })?;

        Ok(dotted[offset..].trim_end_matches('.').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_qualify_module_file() {
        let q = Qualifier::new("numba");
        let name = q
            .qualify(Path::new("/home/dev/src/numba/tests/test_foo.py"))
            .unwrap();
        assert_eq!(name, "numba.tests.test_foo");
    }

    #[test]
    fn test_qualify_directory() {
        let q = Qualifier::new("numba");
        let name = q.qualify(Path::new("/opt/numba/tests/broken_issues")).unwrap();
        assert_eq!(name, "numba.tests.broken_issues");
    }

    #[test]
    fn test_qualify_package_root() {
        let q = Qualifier::new("numba");
        assert_eq!(q.qualify(Path::new("/opt/numba")).unwrap(), "numba");
    }

    #[test]
    fn test_qualify_is_independent_of_prefix() {
        let q = Qualifier::new("numba");
        let absolute = q
            .qualify(Path::new("/var/build/numba/tests/test_foo.py"))
            .unwrap();
        let relative = q.qualify(Path::new("numba/tests/test_foo.py")).unwrap();
        assert_eq!(absolute, relative);
    }

    #[test]
    fn test_qualify_backslash_separators() {
        let q = Qualifier::new("numba");
        let name = q
            .qualify(Path::new("C:\\work\\numba\\tests\\test_bar.py"))
            .unwrap();
        assert_eq!(name, "numba.tests.test_bar");
    }

    #[test]
    fn test_rightmost_package_wins() {
        let q = Qualifier::new("numba");
        let name = q
            .qualify(Path::new("/numba/checkout/numba/tests/test_foo.py"))
            .unwrap();
        assert_eq!(name, "numba.tests.test_foo");

        let nested = q
            .qualify(Path::new("/src/numba/tests/numba/test_fixture.py"))
            .unwrap();
        assert_eq!(nested, "numba.test_fixture");
    }

    #[test]
    fn test_missing_package_is_an_error() {
        let q = Qualifier::new("numba");
        let path = PathBuf::from("/home/dev/other/tests/test_foo.py");
        match q.qualify(&path) {
            Err(DiscoveryError::PackageNotInPath { package, path: p }) => {
                assert_eq!(package, "numba");
                assert_eq!(p, path);
            }
            other => panic!("Expected PackageNotInPath, got {other:?}"),
        }
    }
}
