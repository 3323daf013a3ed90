//! Property-based tests for configuration precedence.

use super::merger::ConfigMerger;
use super::schema::Config;
use crate::path::{InstallLayout, OsProbe};
use crate::preconfig::PreConfig;
use crate::snapshot::Snapshot;
use crate::string_list::StringList;
use proptest::prelude::*;

/// Resolve with a home override and no executable so discovery touches
/// nothing on disk.
fn resolve(mut config: Config, snapshot: &Snapshot) -> Config {
    config.home.get_or_insert_with(|| "/opt/ember".to_string());
    let mut pre = PreConfig::standard();
    pre.resolve(&config.argv, snapshot).unwrap();
    config
        .resolve_with(&pre, snapshot, &InstallLayout::posix(), &OsProbe)
        .unwrap();
    config
}

fn argv_with(flag: &str, count: Option<u8>) -> StringList {
    let mut argv = StringList::from_raw(&["ember"]);
    for _ in 0..count.unwrap_or(0) {
        argv.append(flag);
    }
    argv
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Counter fields: command line > API > environment > default
    #[test]
    fn verbose_precedence(
        cli in prop::option::of(1u8..4),
        api in prop::option::of(0i32..10),
        env in prop::option::of(0i32..10)
    ) {
        let mut snapshot = Snapshot::empty();
        if let Some(level) = env {
            snapshot = snapshot.with_var("EMBER_VERBOSE", &level.to_string());
        }
        let mut config = Config::standard();
        config.argv = argv_with("-v", cli);
        config.verbose = api;

        let resolved = resolve(config, &snapshot);
        let expected = cli.map(i32::from).or(api).or(env).unwrap_or(0);
        prop_assert_eq!(resolved.verbose, Some(expected));
    }

    // Boolean fields switched on by a flag follow the same law
    #[test]
    fn safe_path_precedence(
        cli in any::<bool>(),
        api in prop::option::of(any::<bool>()),
        env in any::<bool>()
    ) {
        let snapshot = if env {
            Snapshot::empty().with_var("EMBER_SAFE_PATH", "1")
        } else {
            Snapshot::empty()
        };
        let mut config = Config::standard();
        config.argv = argv_with("-P", cli.then_some(1));
        config.safe_path = api;

        let resolved = resolve(config, &snapshot);
        let expected = if cli { true } else { api.unwrap_or(env) };
        prop_assert_eq!(resolved.safe_path, Some(expected));
    }

    // String fields without a flag: API > environment > default
    #[test]
    fn platlibdir_precedence(
        api in prop::option::of("[a-z]{1,8}"),
        env in prop::option::of("[a-z]{1,8}")
    ) {
        let mut snapshot = Snapshot::empty();
        if let Some(ref value) = env {
            snapshot = snapshot.with_var("EMBER_PLATLIBDIR", value);
        }
        let mut config = Config::standard();
        config.platlibdir.clone_from(&api);

        let resolved = resolve(config, &snapshot);
        let expected = api.or(env).unwrap_or_else(|| "lib".to_string());
        prop_assert_eq!(resolved.platlibdir, Some(expected));
    }

    // Merging a layer then filling from another never lets the lower
    // layer override a value the higher one set
    #[test]
    fn merge_then_fill_respects_layers(
        base in prop::option::of(0i32..5),
        high in prop::option::of(0i32..5),
        low in prop::option::of(0i32..5)
    ) {
        let mut target = Config { optimization_level: base, ..Config::default() };
        let high_layer = Config { optimization_level: high, ..Config::default() };
        let low_layer = Config { optimization_level: low, ..Config::default() };

        ConfigMerger::merge_into(&mut target, &high_layer);
        ConfigMerger::fill_unset(&mut target, &low_layer);
        prop_assert_eq!(target.optimization_level, high.or(base).or(low));
    }

    // Resolving a resolved configuration changes nothing
    #[test]
    fn resolution_is_idempotent(
        opt in 0u8..3,
        warnings in prop::collection::vec("[a-z]{1,6}", 0..4),
        script in prop::option::of("[a-z]{1,8}\\.em")
    ) {
        let mut argv = argv_with("-O", Some(opt));
        for warning in &warnings {
            argv.append("-W");
            argv.append(warning.as_str());
        }
        if let Some(ref script) = script {
            argv.append(script.as_str());
        }
        let mut config = Config::standard();
        config.argv = argv;
        let snapshot = Snapshot::empty().with_var("EMBER_WARNINGS", "ignore");

        let once = resolve(config, &snapshot);
        let twice = resolve(once.clone(), &snapshot);
        prop_assert_eq!(once, twice);
    }
}
