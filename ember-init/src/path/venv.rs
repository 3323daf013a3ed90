//! Virtual environment detection.
//!
//! A virtual environment is marked by an `ember.cfg` file next to the
//! executable or one directory above it. Its `home` key names the directory
//! holding the base installation's executable.

use std::path::{Path, PathBuf};

use crate::path::probe::FileProbe;

/// Name of the virtual environment marker file.
pub const VENV_CONFIG: &str = "ember.cfg";

/// A detected virtual environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualEnv {
    /// Directory holding `ember.cfg`; becomes `prefix` and `exec_prefix`.
    pub root: PathBuf,
    /// The base installation's executable directory, from `home = DIR`.
    pub home: Option<PathBuf>,
}

/// Look for `ember.cfg` in `exe_dir`, then in its parent.
pub fn detect(exe_dir: &Path, probe: &dyn FileProbe) -> Option<VirtualEnv> {
    let candidates = std::iter::once(exe_dir).chain(exe_dir.parent());
    for dir in candidates {
        let marker = dir.join(VENV_CONFIG);
        if !probe.is_file(&marker) {
            continue;
        }
        let home = probe
            .read_to_string(&marker)
            .and_then(|contents| parse_home(&contents))
            .map(PathBuf::from);
        log::debug!("virtual environment at {} (home: {home:?})", dir.display());
        return Some(VirtualEnv {
            root: dir.to_path_buf(),
            home,
        });
    }
    None
}

/// Extract the `home` value from `ember.cfg` contents.
///
/// Lines are `key = value`; keys are case-insensitive and surrounding
/// whitespace is ignored. Lines starting with `#` are comments.
///
/// # Examples
///
/// ```
/// use ember_init::path::venv::parse_home;
///
/// assert_eq!(parse_home("# base\nHome = /usr/bin\n").as_deref(), Some("/usr/bin"));
/// assert_eq!(parse_home("version = 1.0"), None);
/// ```
#[must_use]
pub fn parse_home(contents: &str) -> Option<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("home"))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
