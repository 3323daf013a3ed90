//! Landmark-based discovery of the installation prefixes and the module
//! search path.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::path::layout::InstallLayout;
use crate::path::probe::FileProbe;
use crate::path::venv::{self, VirtualEnv};
use crate::snapshot::Snapshot;
use crate::string_list::StringList;

/// Everything path discovery produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathOutputs {
    /// The executable the runtime considers itself to be.
    pub executable: Option<String>,
    /// The base installation's executable.
    pub base_executable: Option<String>,
    /// Platform-independent prefix.
    pub prefix: String,
    /// Platform-independent prefix of the base installation.
    pub base_prefix: String,
    /// Platform-dependent prefix.
    pub exec_prefix: String,
    /// Platform-dependent prefix of the base installation.
    pub base_exec_prefix: String,
    /// Standard library directory.
    pub stdlib_dir: String,
    /// Module search path, highest priority first, without duplicates.
    pub module_search_paths: StringList,
    /// Diagnostics for failed landmark searches.
    pub warnings: Vec<String>,
}

/// Discovers installation paths from the executable location.
///
/// Discovery never fails: when a landmark cannot be found the layout's
/// default prefix is used and a warning is recorded.
///
/// # Examples
///
/// ```
/// use ember_init::path::{InstallLayout, OsProbe, PathResolver};
/// use ember_init::{Config, Snapshot};
///
/// let mut config = Config::default();
/// config.home = Some("/opt/ember".to_string());
/// config.path_env = Some("/srv/site".to_string());
///
/// let layout = InstallLayout::posix();
/// let outputs = PathResolver::new(&layout, &OsProbe).discover(&config, &Snapshot::empty());
///
/// assert_eq!(outputs.prefix, "/opt/ember");
/// assert_eq!(
///     outputs.module_search_paths.as_slice(),
///     ["/opt/ember/lib/ember1.0", "/opt/ember/lib/ember1.0/lib-dynload", "/srv/site"]
/// );
/// ```
pub struct PathResolver<'a> {
    layout: &'a InstallLayout,
    probe: &'a dyn FileProbe,
}

impl<'a> PathResolver<'a> {
    /// Create a resolver over `layout`, querying the filesystem via `probe`.
    #[must_use]
    pub fn new(layout: &'a InstallLayout, probe: &'a dyn FileProbe) -> Self {
        Self { layout, probe }
    }

    /// Discover paths and store them in `config`.
    ///
    /// Outputs the embedder already set are kept. `module_search_paths` is
    /// replaced and `module_search_paths_set` becomes true. Warnings are
    /// logged and, when `pathconfig_warnings` is on, appended to
    /// `config.warnings`.
    pub fn apply(&self, config: &mut Config, snapshot: &Snapshot) {
        let outputs = self.discover(config, snapshot);

        fill(&mut config.executable, outputs.executable);
        fill(&mut config.base_executable, outputs.base_executable);
        fill(&mut config.prefix, Some(outputs.prefix));
        fill(&mut config.base_prefix, Some(outputs.base_prefix));
        fill(&mut config.exec_prefix, Some(outputs.exec_prefix));
        fill(&mut config.base_exec_prefix, Some(outputs.base_exec_prefix));
        fill(&mut config.stdlib_dir, Some(outputs.stdlib_dir));
        config.module_search_paths = outputs.module_search_paths;
        config.module_search_paths_set = Some(true);

        if config.pathconfig_warnings.unwrap_or(true) {
            for warning in outputs.warnings {
                log::warn!("{warning}");
                config.warnings.push(warning);
            }
        }
    }

    /// Compute the path outputs without modifying `config`.
    #[must_use]
    pub fn discover(&self, config: &Config, snapshot: &Snapshot) -> PathOutputs {
        let executable = config
            .executable
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| self.find_executable(config.program_name.as_deref(), snapshot));

        // a home override skips symlink resolution and venv detection too
        let probing = config.home.is_none();
        let real_executable = executable
            .as_deref()
            .filter(|_| probing)
            .map(|exe| self.probe.canonicalize(exe).unwrap_or_else(|| exe.to_path_buf()));

        let venv = executable
            .as_deref()
            .filter(|_| probing)
            .and_then(Path::parent)
            .and_then(|dir| venv::detect(dir, self.probe));

        let search_start: Option<PathBuf> = match venv.as_ref().and_then(|v| v.home.clone()) {
            Some(home) => Some(home),
            None => real_executable
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf),
        };

        let base_executable = match (&venv, &executable) {
            (Some(VirtualEnv {
                home: Some(home), ..
            }), Some(exe)) => {
                exe.file_name().map(|name| home.join(name))
            }
            (Some(_), _) => real_executable.clone(),
            (None, exe) => exe.clone(),
        };

        let mut warnings = Vec::new();
        let platlibdir = config
            .platlibdir
            .as_deref()
            .unwrap_or(crate::config::schema::DEFAULT_PLATLIBDIR);

        let (base_prefix, base_exec_prefix) = match config.home.as_deref() {
            Some(home) => self.split_home(home),
            None => {
                let fallback = self.fallback_prefix(search_start.as_deref());
                let prefix = self
                    .search(search_start.as_deref(), |dir| {
                        self.probe.is_file(&self.layout.stdlib_landmark(dir))
                    })
                    .unwrap_or_else(|| {
                        warnings.push(format!(
                            "Could not find platform independent libraries <prefix>; using {}",
                            fallback.display()
                        ));
                        fallback.clone()
                    });
                let exec_prefix = self
                    .search(search_start.as_deref(), |dir| {
                        self.probe.is_dir(&self.layout.platlib_dir(dir, platlibdir))
                    })
                    .unwrap_or_else(|| {
                        warnings.push(format!(
                            "Could not find platform dependent libraries <exec_prefix>; using {}",
                            fallback.display()
                        ));
                        fallback.clone()
                    });
                if !warnings.is_empty() {
                    warnings.push(format!(
                        "Consider setting $EMBER_HOME to <prefix>[{}<exec_prefix>]",
                        self.layout.list_separator()
                    ));
                }
                (prefix, exec_prefix)
            }
        };

        let (prefix, exec_prefix) = match &venv {
            Some(venv) => (venv.root.clone(), venv.root.clone()),
            None => (base_prefix.clone(), base_exec_prefix.clone()),
        };

        let stdlib_dir = self.layout.stdlib_dir(&base_prefix);
        let platlib_dir = self.layout.platlib_dir(&base_exec_prefix, platlibdir);
        let module_search_paths =
            self.search_paths(&stdlib_dir, &platlib_dir, config.path_env.as_deref());

        log::debug!(
            "path discovery: prefix={} exec_prefix={} venv={}",
            prefix.display(),
            exec_prefix.display(),
            venv.is_some()
        );

        PathOutputs {
            executable: executable.as_deref().map(display),
            base_executable: base_executable.as_deref().map(display),
            prefix: display(&prefix),
            base_prefix: display(&base_prefix),
            exec_prefix: display(&exec_prefix),
            base_exec_prefix: display(&base_exec_prefix),
            stdlib_dir: display(&stdlib_dir),
            module_search_paths,
            warnings,
        }
    }

    /// Locate the executable from `program_name`.
    ///
    /// A name with a separator is taken relative to the current directory;
    /// a bare name is looked up on `PATH`. Failing both, the running
    /// executable from the snapshot is used.
    fn find_executable(
        &self,
        program_name: Option<&str>,
        snapshot: &Snapshot,
    ) -> Option<PathBuf> {
        if let Some(name) = program_name.filter(|n| !n.is_empty()) {
            if self.layout.has_separator(name) {
                let path = Path::new(name);
                if path.is_absolute() {
                    return Some(path.to_path_buf());
                }
                if let Some(cwd) = snapshot.current_dir() {
                    return Some(cwd.join(path));
                }
            } else if let Some(path_var) = snapshot.var("PATH") {
                let found = path_var
                    .split(self.layout.list_separator())
                    .filter(|dir| !dir.is_empty())
                    .map(|dir| Path::new(dir).join(name))
                    .find(|candidate| self.probe.is_file(candidate));
                if found.is_some() {
                    return found;
                }
            }
        }
        snapshot.executable().map(Path::to_path_buf)
    }

    /// The first candidate directory satisfying `is_prefix`.
    fn search(&self, start: Option<&Path>, is_prefix: impl Fn(&Path) -> bool) -> Option<PathBuf> {
        let start = start?;
        self.layout
            .candidates(start)
            .find(|dir| is_prefix(dir))
            .map(Path::to_path_buf)
    }

    fn fallback_prefix(&self, exe_dir: Option<&Path>) -> PathBuf {
        match (&self.layout.default_prefix, exe_dir) {
            (Some(prefix), _) => prefix.clone(),
            (None, Some(dir)) => dir.to_path_buf(),
            (None, None) => PathBuf::from("."),
        }
    }

    /// Split `PREFIX` or `PREFIX<sep>EXEC_PREFIX`.
    fn split_home(&self, home: &str) -> (PathBuf, PathBuf) {
        match home.split_once(self.layout.list_separator()) {
            Some((prefix, exec_prefix)) if !exec_prefix.is_empty() => {
                (PathBuf::from(prefix), PathBuf::from(exec_prefix))
            }
            Some((prefix, _)) => (PathBuf::from(prefix), PathBuf::from(prefix)),
            None => (PathBuf::from(home), PathBuf::from(home)),
        }
    }

    fn search_paths(
        &self,
        stdlib_dir: &Path,
        platlib_dir: &Path,
        path_env: Option<&str>,
    ) -> StringList {
        let mut paths = StringList::new();
        let entries = [display(stdlib_dir), display(platlib_dir)]
            .into_iter()
            .chain(
                path_env
                    .into_iter()
                    .flat_map(|value| value.split(self.layout.list_separator()))
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_string),
            );

        for entry in entries {
            let seen = paths.iter().any(|p| self.layout.same_path(p, &entry));
            if !seen {
                paths.append(entry);
            }
        }
        paths
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::probe::MockFileProbe;
    use std::collections::BTreeSet;

    /// In-memory tree for discovery tests.
    #[derive(Default)]
    struct FakeTree {
        files: BTreeSet<PathBuf>,
        dirs: BTreeSet<PathBuf>,
        contents: Vec<(PathBuf, String)>,
    }

    impl FakeTree {
        fn file(mut self, path: &str) -> Self {
            self.files.insert(PathBuf::from(path));
            self
        }

        fn dir(mut self, path: &str) -> Self {
            self.dirs.insert(PathBuf::from(path));
            self
        }

        fn text(mut self, path: &str, contents: &str) -> Self {
            self.files.insert(PathBuf::from(path));
            self.contents.push((PathBuf::from(path), contents.to_string()));
            self
        }
    }

    impl FileProbe for FakeTree {
        fn is_file(&self, path: &Path) -> bool {
            self.files.contains(path)
        }

        fn is_dir(&self, path: &Path) -> bool {
            self.dirs.contains(path)
        }

        fn read_to_string(&self, path: &Path) -> Option<String> {
            self.contents
                .iter()
                .find(|(p, _)| p == path)
                .map(|(_, c)| c.clone())
        }

        fn canonicalize(&self, path: &Path) -> Option<PathBuf> {
            Some(path.to_path_buf())
        }
    }

    fn installed_tree() -> FakeTree {
        FakeTree::default()
            .file("/opt/ember/lib/ember1.0/os.em")
            .dir("/opt/ember/lib/ember1.0/lib-dynload")
    }

    fn config_with_exe(exe: &str) -> Config {
        Config {
            executable: Some(exe.to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_landmarks_found_one_level_up() {
        let layout = InstallLayout::posix();
        let tree = installed_tree();
        let outputs = PathResolver::new(&layout, &tree)
            .discover(&config_with_exe("/opt/ember/bin/ember"), &Snapshot::empty());

        assert_eq!(outputs.prefix, "/opt/ember");
        assert_eq!(outputs.exec_prefix, "/opt/ember");
        assert_eq!(outputs.stdlib_dir, "/opt/ember/lib/ember1.0");
        assert!(outputs.warnings.is_empty());
        assert_eq!(
            outputs.module_search_paths.as_slice(),
            ["/opt/ember/lib/ember1.0", "/opt/ember/lib/ember1.0/lib-dynload"]
        );
    }

    #[test]
    fn test_prefixes_searched_independently() {
        let layout = InstallLayout::posix();
        let tree = FakeTree::default()
            .file("/opt/ember/lib/ember1.0/os.em")
            .dir("/opt/ember/bin/lib/ember1.0/lib-dynload");
        let outputs = PathResolver::new(&layout, &tree)
            .discover(&config_with_exe("/opt/ember/bin/ember"), &Snapshot::empty());

        assert_eq!(outputs.prefix, "/opt/ember");
        assert_eq!(outputs.exec_prefix, "/opt/ember/bin");
    }

    #[test]
    fn test_fallback_records_warnings() {
        let layout = InstallLayout::posix();
        let tree = FakeTree::default();
        let outputs = PathResolver::new(&layout, &tree)
            .discover(&config_with_exe("/nowhere/bin/ember"), &Snapshot::empty());

        assert_eq!(outputs.prefix, "/usr/local");
        assert_eq!(outputs.exec_prefix, "/usr/local");
        assert_eq!(outputs.warnings.len(), 3);
        assert!(outputs.warnings[2].contains("EMBER_HOME"));
    }

    #[test]
    fn test_windows_fallback_is_exe_dir() {
        let layout = InstallLayout::windows();
        let tree = FakeTree::default();
        let outputs = PathResolver::new(&layout, &tree)
            .discover(&config_with_exe("/apps/ember/ember.exe"), &Snapshot::empty());
        assert_eq!(outputs.prefix, "/apps/ember");
    }

    #[test]
    fn test_home_with_exec_prefix() {
        let layout = InstallLayout::posix();
        let tree = FakeTree::default();
        let config = Config {
            home: Some("/a:/b".into()),
            ..Config::default()
        };
        let outputs = PathResolver::new(&layout, &tree).discover(&config, &Snapshot::empty());
        assert_eq!(outputs.prefix, "/a");
        assert_eq!(outputs.exec_prefix, "/b");
        assert!(outputs.warnings.is_empty());
    }

    #[test]
    fn test_home_skips_all_probing() {
        let layout = InstallLayout::posix();
        let mut probe = MockFileProbe::new();
        probe.expect_is_dir().never();
        probe.expect_is_file().never();
        probe.expect_read_to_string().never();
        probe.expect_canonicalize().never();

        let config = Config {
            home: Some("/opt/ember".into()),
            executable: Some("/venv/bin/ember".into()),
            ..Config::default()
        };
        let outputs = PathResolver::new(&layout, &probe).discover(&config, &Snapshot::empty());
        assert_eq!(outputs.base_prefix, "/opt/ember");
        assert_eq!(outputs.prefix, "/opt/ember");
        assert_eq!(outputs.executable.as_deref(), Some("/venv/bin/ember"));
        assert_eq!(outputs.base_executable.as_deref(), Some("/venv/bin/ember"));
        assert!(outputs.warnings.is_empty());
    }

    #[test]
    fn test_virtual_environment() {
        let layout = InstallLayout::posix();
        let tree = installed_tree()
            .file("/opt/ember/bin/ember")
            .text("/home/me/venv/ember.cfg", "home = /opt/ember/bin\n");
        let outputs = PathResolver::new(&layout, &tree).discover(
            &config_with_exe("/home/me/venv/bin/ember"),
            &Snapshot::empty(),
        );

        assert_eq!(outputs.prefix, "/home/me/venv");
        assert_eq!(outputs.exec_prefix, "/home/me/venv");
        assert_eq!(outputs.base_prefix, "/opt/ember");
        assert_eq!(outputs.base_executable.as_deref(), Some("/opt/ember/bin/ember"));
        assert_eq!(outputs.stdlib_dir, "/opt/ember/lib/ember1.0");
    }

    #[test]
    fn test_path_env_order_and_dedup() {
        let layout = InstallLayout::posix();
        let tree = installed_tree();
        let config = Config {
            executable: Some("/opt/ember/bin/ember".into()),
            path_env: Some("/srv/a::/opt/ember/lib/ember1.0:/srv/b:/srv/a".into()),
            ..Config::default()
        };
        let outputs = PathResolver::new(&layout, &tree).discover(&config, &Snapshot::empty());
        assert_eq!(
            outputs.module_search_paths.as_slice(),
            [
                "/opt/ember/lib/ember1.0",
                "/opt/ember/lib/ember1.0/lib-dynload",
                "/srv/a",
                "/srv/b"
            ]
        );
    }

    #[test]
    fn test_windows_dedup_is_case_insensitive() {
        let layout = InstallLayout::windows();
        let tree = FakeTree::default();
        let config = Config {
            home: Some("C:/Ember".into()),
            path_env: Some("c:/ember/lib;D:/site".into()),
            ..Config::default()
        };
        let outputs = PathResolver::new(&layout, &tree).discover(&config, &Snapshot::empty());
        assert_eq!(outputs.module_search_paths.len(), 3);
        assert_eq!(outputs.module_search_paths.get(2), Some("D:/site"));
    }

    #[test]
    fn test_program_name_found_on_path() {
        let layout = InstallLayout::posix();
        let tree = installed_tree().file("/opt/ember/bin/ember");
        let config = Config {
            program_name: Some("ember".into()),
            ..Config::default()
        };
        let snapshot = Snapshot::empty()
            .with_var("PATH", "/usr/bin:/opt/ember/bin")
            .with_executable("/elsewhere/host");
        let outputs = PathResolver::new(&layout, &tree).discover(&config, &snapshot);
        assert_eq!(outputs.executable.as_deref(), Some("/opt/ember/bin/ember"));
        assert_eq!(outputs.prefix, "/opt/ember");
    }

    #[test]
    fn test_relative_program_name_uses_cwd() {
        let layout = InstallLayout::posix();
        let tree = installed_tree();
        let config = Config {
            program_name: Some("bin/ember".into()),
            ..Config::default()
        };
        let snapshot = Snapshot::empty().with_current_dir("/opt/ember");
        let outputs = PathResolver::new(&layout, &tree).discover(&config, &snapshot);
        assert_eq!(outputs.executable.as_deref(), Some("/opt/ember/bin/ember"));
    }

    #[test]
    fn test_apply_keeps_explicit_outputs() {
        let layout = InstallLayout::posix();
        let tree = installed_tree();
        let mut config = config_with_exe("/opt/ember/bin/ember");
        config.prefix = Some("/custom".into());
        config.pathconfig_warnings = Some(false);

        PathResolver::new(&layout, &tree).apply(&mut config, &Snapshot::empty());
        assert_eq!(config.prefix.as_deref(), Some("/custom"));
        assert_eq!(config.exec_prefix.as_deref(), Some("/opt/ember"));
        assert_eq!(config.module_search_paths_set, Some(true));
    }

    #[test]
    fn test_apply_suppresses_warnings_when_disabled() {
        let layout = InstallLayout::posix();
        let tree = FakeTree::default();
        let mut config = config_with_exe("/x/ember");
        config.pathconfig_warnings = Some(false);
        PathResolver::new(&layout, &tree).apply(&mut config, &Snapshot::empty());
        assert!(config.warnings.is_empty());

        let mut config = config_with_exe("/x/ember");
        PathResolver::new(&layout, &tree).apply(&mut config, &Snapshot::empty());
        assert!(!config.warnings.is_empty());
    }

    #[test]
    fn test_discovery_is_deterministic() {
        let layout = InstallLayout::posix();
        let tree = installed_tree();
        let config = Config {
            executable: Some("/opt/ember/bin/ember".into()),
            path_env: Some("/b:/a".into()),
            ..Config::default()
        };
        let resolver = PathResolver::new(&layout, &tree);
        let first = resolver.discover(&config, &Snapshot::empty());
        let second = resolver.discover(&config, &Snapshot::empty());
        assert_eq!(first, second);
    }
}
