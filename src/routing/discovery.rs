//! Executable discovery.
//!
//! # Responsibilities
//! - List the regular files directly inside the executables directory
//! - Produce one `ExecutableDescriptor` per file, in listing order
//!
//! # Design Decisions
//! - No recursion; subdirectories are ignored
//! - File type is read without following symlinks, so links are excluded
//! - Listing order is whatever the filesystem returns (not sorted)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A discovered executable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableDescriptor {
    path: PathBuf,
    basename: String,
}

impl ExecutableDescriptor {
    pub fn new(path: impl Into<PathBuf>, basename: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            basename: basename.into(),
        }
    }

    /// Path used to spawn the executable (`dir.join(basename)`).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path segment; determines the resource the file serves.
    pub fn basename(&self) -> &str {
        &self.basename
    }
}

/// Errors raised while scanning the executables directory.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot open executables directory {}: {source}", .dir.display())]
    Open { dir: PathBuf, source: io::Error },

    #[error("cannot list executables directory {}: {source}", .dir.display())]
    List { dir: PathBuf, source: io::Error },
}

/// Scan `dir` and return its regular files in listing order.
pub fn discover_executables(dir: &Path) -> Result<Vec<ExecutableDescriptor>, DiscoveryError> {
    let entries = fs::read_dir(dir).map_err(|source| DiscoveryError::Open {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut executables = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| DiscoveryError::List {
            dir: dir.to_path_buf(),
            source,
        })?;
        let file_type = entry.file_type().map_err(|source| DiscoveryError::List {
            dir: dir.to_path_buf(),
            source,
        })?;
        if !file_type.is_file() {
            continue;
        }

        let basename = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(name) => {
                tracing::warn!(name = ?name, "Skipping executable with non UTF-8 name");
                continue;
            }
        };
        executables.push(ExecutableDescriptor::new(dir.join(&basename), basename));
    }

    tracing::debug!(dir = %dir.display(), count = executables.len(), "Executables discovered");
    Ok(executables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_only_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), "").unwrap();
        fs::write(dir.path().join("_"), "").unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();
        fs::write(dir.path().join("subdir").join("nested"), "").unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink(dir.path().join("a"), dir.path().join("link")).unwrap();

        let mut names: Vec<String> = discover_executables(dir.path())
            .unwrap()
            .iter()
            .map(|e| e.basename().to_string())
            .collect();
        names.sort();

        assert_eq!(names, vec!["_", "a"]);
    }

    #[test]
    fn test_paths_are_joined_onto_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("qux"), "").unwrap();

        let found = discover_executables(dir.path()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path(), dir.path().join("qux"));
        assert_eq!(found[0].basename(), "qux");
    }

    #[test]
    fn test_missing_dir_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = discover_executables(&missing).unwrap_err();
        assert!(matches!(err, DiscoveryError::Open { .. }));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_file_instead_of_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, "").unwrap();

        assert!(discover_executables(&file).is_err());
    }
}
