//! Immutable capture of the process state resolution may read.
//!
//! Resolution never consults live globals. Everything it needs from the
//! process (environment variables, the running executable, the working
//! directory, the locale inventory) is captured once into a [`Snapshot`],
//! which makes resolution a pure function of its inputs and lets tests build
//! arbitrary process states without touching the real environment.

use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::path::{Path, PathBuf};

/// A frozen view of the process environment.
///
/// # Examples
///
/// ```
/// use ember_init::Snapshot;
///
/// let snapshot = Snapshot::empty()
///     .with_var("LANG", "C")
///     .with_var("EMBER_UTF8", "");
///
/// assert_eq!(snapshot.ctype_locale(), "C");
/// // Empty values count as unset.
/// assert_eq!(snapshot.var("EMBER_UTF8"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    vars: BTreeMap<String, String>,
    executable: Option<PathBuf>,
    current_dir: Option<PathBuf>,
    available_locales: Option<BTreeSet<String>>,
}

impl Snapshot {
    /// An empty snapshot: no variables, no executable, no locale inventory.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the live process state.
    ///
    /// Variables whose name or value is not valid Unicode are converted
    /// lossily.
    #[must_use]
    pub fn capture() -> Self {
        let vars = env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect();

        Self {
            vars,
            executable: env::current_exe().ok(),
            current_dir: env::current_dir().ok(),
            available_locales: None,
        }
    }

    /// Set a variable.
    #[must_use]
    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    /// Remove a variable.
    #[must_use]
    pub fn without_var(mut self, name: &str) -> Self {
        self.vars.remove(name);
        self
    }

    /// Set the path of the running executable.
    #[must_use]
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn with_current_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(path.into());
        self
    }

    /// Declare which locales exist on the system.
    ///
    /// Without an inventory, every candidate coercion target is assumed to
    /// be available.
    #[must_use]
    pub fn with_available_locales<I, S>(mut self, locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available_locales = Some(locales.into_iter().map(Into::into).collect());
        self
    }

    /// Look up a variable, treating an empty value as unset.
    #[must_use]
    pub fn var(&self, name: &str) -> Option<&str> {
        self.raw_var(name).filter(|v| !v.is_empty())
    }

    /// Look up a variable exactly as captured.
    #[must_use]
    pub fn raw_var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// The running executable, if known.
    #[must_use]
    pub fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }

    /// The working directory, if known.
    #[must_use]
    pub fn current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// The effective `LC_CTYPE` locale name.
    ///
    /// Mirrors how the C library resolves an empty locale request:
    /// `LC_ALL`, then `LC_CTYPE`, then `LANG`, then `"C"`.
    #[must_use]
    pub fn ctype_locale(&self) -> &str {
        ["LC_ALL", "LC_CTYPE", "LANG"]
            .iter()
            .find_map(|name| self.var(name))
            .unwrap_or("C")
    }

    /// Whether `LC_ALL` is set, which overrides any `LC_CTYPE` coercion.
    #[must_use]
    pub fn lc_all_set(&self) -> bool {
        self.var("LC_ALL").is_some()
    }

    /// Whether a locale can be selected.
    #[must_use]
    pub fn locale_available(&self, name: &str) -> bool {
        self.available_locales
            .as_ref()
            .map_or(true, |set| set.contains(name))
    }
}
