//! Property-based tests for search path assembly.

use super::layout::InstallLayout;
use super::probe::OsProbe;
use super::resolver::PathResolver;
use crate::config::Config;
use crate::snapshot::Snapshot;
use proptest::prelude::*;

fn dir_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,6}", 1..4).prop_map(|parts| format!("/{}", parts.join("/")))
}

fn config_for(home: &str, entries: &[String]) -> Config {
    Config {
        home: Some(home.to_string()),
        path_env: Some(entries.join(":")),
        ..Config::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // The standard library and platform library always lead the list
    #[test]
    fn search_path_starts_with_libraries(
        home in dir_strategy(),
        entries in prop::collection::vec(dir_strategy(), 0..8)
    ) {
        let layout = InstallLayout::posix();
        let outputs = PathResolver::new(&layout, &OsProbe)
            .discover(&config_for(&home, &entries), &Snapshot::empty());

        prop_assert_eq!(outputs.module_search_paths.get(0), Some(outputs.stdlib_dir.as_str()));
        prop_assert_eq!(
            outputs.module_search_paths.get(1).map(str::to_string),
            Some(format!("{home}/lib/ember1.0/lib-dynload"))
        );
    }

    // No duplicates, every entry kept, first occurrences in input order
    #[test]
    fn search_path_dedup_is_stable(
        home in dir_strategy(),
        entries in prop::collection::vec(dir_strategy(), 0..8)
    ) {
        let layout = InstallLayout::posix();
        let outputs = PathResolver::new(&layout, &OsProbe)
            .discover(&config_for(&home, &entries), &Snapshot::empty());
        let paths = outputs.module_search_paths.as_slice();

        let mut expected: Vec<String> = Vec::new();
        for entry in paths[..2].iter().cloned().chain(entries.iter().cloned()) {
            if !expected.contains(&entry) {
                expected.push(entry);
            }
        }
        prop_assert_eq!(paths, expected.as_slice());
    }

    // Identical inputs always produce identical outputs
    #[test]
    fn discovery_is_deterministic(
        home in dir_strategy(),
        entries in prop::collection::vec(dir_strategy(), 0..8)
    ) {
        let layout = InstallLayout::posix();
        let resolver = PathResolver::new(&layout, &OsProbe);
        let config = config_for(&home, &entries);
        prop_assert_eq!(
            resolver.discover(&config, &Snapshot::empty()),
            resolver.discover(&config, &Snapshot::empty())
        );
    }
}
