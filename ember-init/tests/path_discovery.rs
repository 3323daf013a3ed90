//! Path discovery against installation trees on disk.

#![cfg(unix)]

mod common;

use std::cell::Cell;
use std::path::{Path, PathBuf};

use common::InstallTree;
use ember_init::path::{FileProbe, InstallLayout, OsProbe, PathResolver};
use ember_init::{resolve_startup_with, Config, PreConfig, Snapshot};

fn discover(config: &Config, snapshot: &Snapshot) -> ember_init::PathOutputs {
    let layout = InstallLayout::posix();
    PathResolver::new(&layout, &OsProbe).discover(config, snapshot)
}

#[test]
fn test_prefix_found_from_landmarks() {
    let tree = InstallTree::new();
    let outputs = discover(&Config::default(), &tree.snapshot());

    assert_eq!(outputs.prefix, tree.path(""));
    assert_eq!(outputs.exec_prefix, tree.path(""));
    assert_eq!(outputs.base_prefix, outputs.prefix);
    assert_eq!(outputs.stdlib_dir, tree.path("lib/ember1.0"));
    assert_eq!(
        outputs.module_search_paths.as_slice(),
        [tree.path("lib/ember1.0"), tree.path("lib/ember1.0/lib-dynload")]
    );
    assert_eq!(outputs.executable, Some(tree.executable().display().to_string()));
    assert!(outputs.warnings.is_empty());
}

#[test]
fn test_prefixes_found_independently() {
    let tree = InstallTree::bare();
    tree.touch("lib/ember1.0/os.em");
    tree.mkdir("bin/lib64/ember1.0/lib-dynload");

    let config = Config {
        platlibdir: Some("lib64".to_string()),
        ..Config::default()
    };
    let outputs = discover(&config, &tree.snapshot());

    assert_eq!(outputs.prefix, tree.path(""));
    assert_eq!(outputs.exec_prefix, tree.path("bin"));
    assert!(outputs.warnings.is_empty());
}

#[test]
fn test_missing_landmarks_fall_back_with_warnings() {
    let tree = InstallTree::bare();
    let outputs = discover(&Config::default(), &tree.snapshot());

    assert_eq!(outputs.prefix, "/usr/local");
    assert_eq!(outputs.exec_prefix, "/usr/local");
    assert_eq!(outputs.warnings.len(), 3);
    assert!(outputs.warnings[0].contains("<prefix>"));
    assert!(outputs.warnings[1].contains("<exec_prefix>"));
    assert!(outputs.warnings[2].contains("$EMBER_HOME"));
}

#[test]
fn test_apply_records_warnings_only_when_enabled() {
    let tree = InstallTree::bare();
    let layout = InstallLayout::posix();
    let resolver = PathResolver::new(&layout, &OsProbe);

    let mut loud = Config::default();
    resolver.apply(&mut loud, &tree.snapshot());
    assert_eq!(loud.warnings.len(), 3);
    assert_eq!(loud.module_search_paths_set, Some(true));

    let mut silent = Config {
        pathconfig_warnings: Some(false),
        ..Config::default()
    };
    resolver.apply(&mut silent, &tree.snapshot());
    assert!(silent.warnings.is_empty());
    assert_eq!(silent.prefix.as_deref(), Some("/usr/local"));
}

#[test]
fn test_symlinked_executable_resolves_to_target() {
    let tree = InstallTree::new();
    let elsewhere = tempfile::tempdir().unwrap();
    let link = elsewhere.path().join("ember");
    std::os::unix::fs::symlink(tree.executable(), &link).unwrap();

    let outputs = discover(&Config::default(), &Snapshot::empty().with_executable(&link));
    assert_eq!(outputs.prefix, tree.path(""));
    assert_eq!(outputs.executable, Some(link.display().to_string()));
}

#[test]
fn test_virtual_environment() {
    let tree = InstallTree::new();
    let venv_exe = tree.add_venv("venv");

    let outputs = discover(&Config::default(), &Snapshot::empty().with_executable(&venv_exe));
    assert_eq!(outputs.prefix, tree.path("venv"));
    assert_eq!(outputs.exec_prefix, tree.path("venv"));
    assert_eq!(outputs.base_prefix, tree.path(""));
    assert_eq!(outputs.base_exec_prefix, tree.path(""));
    assert_eq!(outputs.executable, Some(venv_exe.display().to_string()));
    assert_eq!(outputs.base_executable, Some(tree.path("bin/ember")));
    assert_eq!(outputs.stdlib_dir, tree.path("lib/ember1.0"));
}

#[test]
fn test_program_name_found_on_path() {
    let tree = InstallTree::new();
    let snapshot = Snapshot::empty().with_var("PATH", &format!("/nonexistent:{}", tree.path("bin")));
    let config = Config {
        program_name: Some("ember".to_string()),
        ..Config::default()
    };

    let outputs = discover(&config, &snapshot);
    assert_eq!(outputs.executable, Some(tree.path("bin/ember")));
    assert_eq!(outputs.prefix, tree.path(""));
}

#[test]
fn test_relative_program_name_uses_current_dir() {
    let tree = InstallTree::new();
    let snapshot = Snapshot::empty().with_current_dir(tree.root());
    let config = Config {
        program_name: Some("bin/ember".to_string()),
        ..Config::default()
    };

    let outputs = discover(&config, &snapshot);
    assert_eq!(outputs.executable, Some(tree.path("bin/ember")));
}

#[test]
fn test_home_override_with_exec_prefix() {
    let tree = InstallTree::bare();
    let config = Config {
        home: Some("/opt/ember:/opt/ember-arch".to_string()),
        path_env: Some("/srv/a::/opt/ember/lib/ember1.0:/srv/b".to_string()),
        ..Config::default()
    };

    let outputs = discover(&config, &tree.snapshot());
    assert_eq!(outputs.prefix, "/opt/ember");
    assert_eq!(outputs.exec_prefix, "/opt/ember-arch");
    assert!(outputs.warnings.is_empty());
    assert_eq!(
        outputs.module_search_paths.as_slice(),
        [
            "/opt/ember/lib/ember1.0",
            "/opt/ember-arch/lib/ember1.0/lib-dynload",
            "/srv/a",
            "/srv/b",
        ]
    );
}

/// Counts every filesystem query.
#[derive(Default)]
struct CountingProbe {
    calls: Cell<usize>,
}

impl CountingProbe {
    fn bump(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl FileProbe for CountingProbe {
    fn is_file(&self, _path: &Path) -> bool {
        self.bump();
        false
    }

    fn is_dir(&self, _path: &Path) -> bool {
        self.bump();
        false
    }

    fn read_to_string(&self, _path: &Path) -> Option<String> {
        self.bump();
        None
    }

    fn canonicalize(&self, _path: &Path) -> Option<PathBuf> {
        self.bump();
        None
    }
}

#[test]
fn test_explicit_search_path_skips_discovery() {
    let probe = CountingProbe::default();
    let snapshot = Snapshot::empty().with_executable("/opt/ember/bin/ember");
    let mut pre = PreConfig::standard();
    let mut config = Config::standard();
    config.module_search_paths_set = Some(true);
    config.module_search_paths = ["/custom/lib", "/custom/site"].into_iter().collect();

    resolve_startup_with(&mut pre, &mut config, &snapshot, &InstallLayout::posix(), &probe)
        .unwrap();

    assert_eq!(probe.calls.get(), 0);
    assert_eq!(config.module_search_paths.as_slice(), ["/custom/lib", "/custom/site"]);
    assert_eq!(config.prefix, None);
}

#[test]
fn test_full_resolution_against_tree() {
    let tree = InstallTree::new();
    let snapshot = tree
        .snapshot()
        .with_var("EMBER_PATH", &tree.path("site"));
    let mut pre = PreConfig::standard();
    let mut config = Config::standard();

    resolve_startup_with(&mut pre, &mut config, &snapshot, &InstallLayout::posix(), &OsProbe)
        .unwrap();

    assert_eq!(config.prefix, Some(tree.path("")));
    assert_eq!(config.stdlib_dir, Some(tree.path("lib/ember1.0")));
    assert_eq!(config.module_search_paths.get(2), Some(tree.path("site").as_str()));
    assert!(config.warnings.is_empty());
}
