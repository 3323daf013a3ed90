//! Filesystem access used by path discovery.

use std::path::{Path, PathBuf};

/// The filesystem queries path discovery needs.
///
/// Production code uses [`OsProbe`]; tests substitute a mock or an
/// in-memory tree so discovery can be checked without touching disk.
#[cfg_attr(test, mockall::automock)]
pub trait FileProbe {
    /// Whether `path` is an existing regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Whether `path` is an existing directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// The contents of `path`, or `None` if it cannot be read as UTF-8.
    fn read_to_string(&self, path: &Path) -> Option<String>;

    /// `path` with symlinks resolved, or `None` if that fails.
    fn canonicalize(&self, path: &Path) -> Option<PathBuf>;
}

/// [`FileProbe`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsProbe;

impl FileProbe for OsProbe {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Path) -> Option<String> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Some(contents),
            Err(e) => {
                log::debug!("cannot read {}: {e}", path.display());
                None
            }
        }
    }

    fn canonicalize(&self, path: &Path) -> Option<PathBuf> {
        std::fs::canonicalize(path).ok()
    }
}
