//! Installation layout: where the landmarks live relative to a prefix.

use std::path::{Path, PathBuf};

/// Version component of the library directory names (`lib/ember1.0`).
pub const RUNTIME_VERSION: &str = "1.0";

/// File whose presence marks the standard library directory.
pub const STDLIB_LANDMARK: &str = "os.em";

/// Directory holding extension modules under the platform library.
pub const DYNLOAD_DIR: &str = "lib-dynload";

/// The shape of an installation tree.
///
/// [`InstallLayout::native`] describes the host platform. Tests construct
/// [`InstallLayout::posix`] or [`InstallLayout::windows`] explicitly so
/// both trees can be exercised anywhere.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use ember_init::path::InstallLayout;
///
/// let layout = InstallLayout::posix();
/// assert_eq!(
///     layout.stdlib_landmark(Path::new("/usr")),
///     Path::new("/usr/lib/ember1.0/os.em")
/// );
/// assert_eq!(
///     layout.platlib_dir(Path::new("/usr"), "lib64"),
///     Path::new("/usr/lib64/ember1.0/lib-dynload")
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    /// Runtime version used in directory names.
    pub version: String,
    /// Windows tree (`Lib`, `DLLs`) with `;` path lists and
    /// case-insensitive path comparison.
    pub windows: bool,
    /// How many directories to examine, starting at the executable's
    /// directory and walking up one parent at a time.
    pub search_depth: usize,
    /// Prefix used when no landmark is found; `None` means the executable's
    /// directory.
    pub default_prefix: Option<PathBuf>,
}

impl InstallLayout {
    /// The POSIX layout.
    #[must_use]
    pub fn posix() -> Self {
        Self {
            version: RUNTIME_VERSION.to_string(),
            windows: false,
            search_depth: 3,
            default_prefix: Some(PathBuf::from("/usr/local")),
        }
    }

    /// The Windows layout.
    #[must_use]
    pub fn windows() -> Self {
        Self {
            version: RUNTIME_VERSION.to_string(),
            windows: true,
            search_depth: 3,
            default_prefix: None,
        }
    }

    /// The layout of the host platform.
    #[must_use]
    pub fn native() -> Self {
        if cfg!(windows) {
            Self::windows()
        } else {
            Self::posix()
        }
    }

    /// Separator between entries of `EMBER_PATH` and of a two-part `home`.
    #[must_use]
    pub fn list_separator(&self) -> char {
        if self.windows {
            ';'
        } else {
            ':'
        }
    }

    /// Whether `name` contains a directory separator.
    #[must_use]
    pub fn has_separator(&self, name: &str) -> bool {
        name.contains('/') || (self.windows && name.contains('\\'))
    }

    /// The standard library directory under `prefix`.
    #[must_use]
    pub fn stdlib_dir(&self, prefix: &Path) -> PathBuf {
        if self.windows {
            prefix.join("Lib")
        } else {
            prefix.join("lib").join(format!("ember{}", self.version))
        }
    }

    /// The file proving `prefix` holds the standard library.
    #[must_use]
    pub fn stdlib_landmark(&self, prefix: &Path) -> PathBuf {
        self.stdlib_dir(prefix).join(STDLIB_LANDMARK)
    }

    /// The platform library directory under `exec_prefix`; it doubles as
    /// that prefix's landmark.
    #[must_use]
    pub fn platlib_dir(&self, exec_prefix: &Path, platlibdir: &str) -> PathBuf {
        if self.windows {
            exec_prefix.join("DLLs")
        } else {
            exec_prefix
                .join(platlibdir)
                .join(format!("ember{}", self.version))
                .join(DYNLOAD_DIR)
        }
    }

    /// Candidate prefixes in search order: `start`, then each parent up to
    /// `search_depth` directories in total.
    pub fn candidates<'a>(&self, start: &'a Path) -> impl Iterator<Item = &'a Path> {
        start.ancestors().take(self.search_depth)
    }

    /// Path equality under this layout's case and separator rules.
    #[must_use]
    pub fn same_path(&self, a: &str, b: &str) -> bool {
        if self.windows {
            a.len() == b.len()
                && a.chars().zip(b.chars()).all(|(x, y)| {
                    let fold = |c: char| if c == '\\' { '/' } else { c.to_ascii_lowercase() };
                    fold(x) == fold(y)
                })
        } else {
            a == b
        }
    }
}

impl Default for InstallLayout {
    fn default() -> Self {
        Self::native()
    }
}
