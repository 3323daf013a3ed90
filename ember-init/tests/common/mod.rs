//! Common test utilities for integration tests.
//!
//! [`InstallTree`] lays out a throwaway installation on disk so discovery
//! can run against the real filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use ember_init::Snapshot;
use tempfile::TempDir;

/// A temporary installation tree.
///
/// ```text
/// <root>/bin/ember
/// <root>/lib/ember1.0/os.em
/// <root>/lib/ember1.0/lib-dynload/
/// ```
#[allow(dead_code)]
pub struct InstallTree {
    _dir: TempDir,
    root: PathBuf,
}

#[allow(dead_code)]
impl InstallTree {
    /// A complete installation.
    pub fn new() -> Self {
        let tree = Self::bare();
        tree.touch("lib/ember1.0/os.em");
        tree.mkdir("lib/ember1.0/lib-dynload");
        tree
    }

    /// An executable with no landmarks around it.
    pub fn bare() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = dir.path().canonicalize().expect("canonicalize temp dir");
        let tree = Self { _dir: dir, root };
        tree.touch("bin/ember");
        tree
    }

    /// The installation root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `root/relative` as a string; `""` is the root itself.
    pub fn path(&self, relative: &str) -> String {
        let path = if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        };
        path.to_string_lossy().into_owned()
    }

    /// The installed executable.
    pub fn executable(&self) -> PathBuf {
        self.root.join("bin").join("ember")
    }

    /// A snapshot whose running executable is the installed one.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::empty().with_executable(self.executable())
    }

    /// Create an empty file, with parents.
    pub fn touch(&self, relative: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(path, "").expect("write file");
    }

    /// Create a directory, with parents.
    pub fn mkdir(&self, relative: &str) {
        fs::create_dir_all(self.root.join(relative)).expect("create dir");
    }

    /// Create a virtual environment under `root/name` whose base is this
    /// installation. Returns the environment's executable.
    pub fn add_venv(&self, name: &str) -> PathBuf {
        self.touch(&format!("{name}/bin/ember"));
        fs::write(
            self.root.join(name).join("ember.cfg"),
            format!("home = {}\nversion = 1.0\n", self.root.join("bin").display()),
        )
        .expect("write ember.cfg");
        self.root.join(name).join("bin").join("ember")
    }
}
