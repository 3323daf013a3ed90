//! Configuration merging and precedence handling.
//!
//! Two operations cover every layer:
//!
//! - [`ConfigMerger::merge_into`] applies a higher-precedence layer on top
//!   of the target (the command line over the embedder's values).
//! - [`ConfigMerger::fill_unset`] applies a lower-precedence layer beneath
//!   it (the environment under the embedder's values).

use crate::config::schema::Config;

/// Invoke `$op(&mut target.field, &source.field)` for every scalar field.
///
/// Run-mode fields are excluded; they are merged as a group.
macro_rules! for_each_scalar {
    ($target:ident, $source:ident, $op:ident) => {
        for_each_scalar!(@fields $target, $source, $op;
            isolated, use_environment, dev_mode, install_signal_handlers,
            use_hash_seed, hash_seed, faulthandler, tracemalloc, perf_profiling,
            import_time, code_debug_ranges, show_ref_count, dump_refs,
            dump_refs_file, malloc_stats, filesystem_encoding, filesystem_errors,
            cache_prefix, parse_argv, site_import, bytes_warning,
            warn_default_encoding, inspect, interactive, optimization_level,
            parser_debug, write_bytecode, verbose, quiet, user_site_directory,
            configure_c_stdio, buffered_stdio, stdio_encoding, stdio_errors,
            check_hash_cache_mode, use_frozen_modules, safe_path,
            int_max_str_digits, thread_inherit_context, context_aware_warnings,
            cpu_count, pathconfig_warnings, program_name, path_env, home,
            platlibdir, module_search_paths_set, stdlib_dir, executable,
            base_executable, prefix, base_prefix, exec_prefix, base_exec_prefix,
            skip_source_first_line,
        );
        $op(
            &mut $target.platform.legacy_windows_stdio,
            &$source.platform.legacy_windows_stdio,
        );
        $op(
            &mut $target.platform.use_system_logger,
            &$source.platform.use_system_logger,
        );
        $op(&mut $target.platform.enable_gil, &$source.platform.enable_gil);
        $op(&mut $target.platform.tlbc_enabled, &$source.platform.tlbc_enabled);
    };
    (@fields $target:ident, $source:ident, $op:ident; $($field:ident),* $(,)?) => {
        $( $op(&mut $target.$field, &$source.$field); )*
    };
}

/// Merges configuration layers according to precedence rules.
///
/// # Examples
///
/// ```
/// use ember_init::config::{Config, ConfigMerger};
///
/// let mut config = Config::default();
/// config.verbose = Some(1);
///
/// let mut cli = Config::default();
/// cli.verbose = Some(3);
///
/// let mut env = Config::default();
/// env.verbose = Some(2);
/// env.optimization_level = Some(1);
///
/// ConfigMerger::merge_into(&mut config, &cli);
/// ConfigMerger::fill_unset(&mut config, &env);
/// assert_eq!(config.verbose, Some(3));
/// assert_eq!(config.optimization_level, Some(1));
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge layers into one, lowest precedence first.
    #[must_use]
    pub fn merge(layers: &[Config]) -> Config {
        let mut result = Config::default();
        for layer in layers {
            Self::merge_into(&mut result, layer);
        }
        result
    }

    /// Merge `source` into `target`; `source` wins.
    ///
    /// # Merging Rules
    ///
    /// - Scalar fields: source overwrites if `Some`
    /// - Run mode: if the source sets any of the three, it replaces all three
    /// - `argv`, `orig_argv`, `module_search_paths`: replaced when the source
    ///   list is non-empty
    /// - `xoptions`: accumulated, source entries after target entries
    /// - `warnoptions`, `warnings`: untouched (assembled during resolution)
    pub fn merge_into(target: &mut Config, source: &Config) {
        for_each_scalar!(target, source, overwrite);

        if source.run_command.is_some()
            || source.run_module.is_some()
            || source.run_filename.is_some()
        {
            target.run_command.clone_from(&source.run_command);
            target.run_module.clone_from(&source.run_module);
            target.run_filename.clone_from(&source.run_filename);
        }

        if !source.argv.is_empty() {
            target.argv.clone_from(&source.argv);
        }
        if !source.orig_argv.is_empty() {
            target.orig_argv.clone_from(&source.orig_argv);
        }
        if !source.module_search_paths.is_empty() {
            target
                .module_search_paths
                .clone_from(&source.module_search_paths);
        }

        for option in source.xoptions.iter() {
            target.xoptions.append(option);
        }
    }

    /// Fill every unset field of `target` from `source`; `target` wins.
    ///
    /// Lists are left alone, and the run mode is copied only when the
    /// target has none.
    pub fn fill_unset(target: &mut Config, source: &Config) {
        for_each_scalar!(target, source, fill);

        if target.run_command.is_none()
            && target.run_module.is_none()
            && target.run_filename.is_none()
        {
            target.run_command.clone_from(&source.run_command);
            target.run_module.clone_from(&source.run_module);
            target.run_filename.clone_from(&source.run_filename);
        }
    }
}

fn overwrite<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        slot.clone_from(value);
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::CpuCount;
    use crate::string_list::StringList;

    #[test]
    fn test_merge_into_overwrites_scalars() {
        let mut target = Config {
            verbose: Some(1),
            home: Some("/opt/a".into()),
            ..Config::default()
        };
        let source = Config {
            verbose: Some(2),
            cpu_count: Some(CpuCount::Fixed(2)),
            ..Config::default()
        };

        ConfigMerger::merge_into(&mut target, &source);
        assert_eq!(target.verbose, Some(2));
        assert_eq!(target.home.as_deref(), Some("/opt/a"));
        assert_eq!(target.cpu_count, Some(CpuCount::Fixed(2)));
    }

    #[test]
    fn test_fill_unset_keeps_existing() {
        let mut target = Config {
            verbose: Some(1),
            ..Config::default()
        };
        let source = Config {
            verbose: Some(2),
            quiet: Some(true),
            ..Config::default()
        };

        ConfigMerger::fill_unset(&mut target, &source);
        assert_eq!(target.verbose, Some(1));
        assert_eq!(target.quiet, Some(true));
    }

    #[test]
    fn test_platform_fields_merge() {
        let mut target = Config::default();
        let mut source = Config::default();
        source.platform.enable_gil = Some(false);

        ConfigMerger::merge_into(&mut target, &source);
        assert_eq!(target.platform.enable_gil, Some(false));
    }

    #[test]
    fn test_run_mode_replaced_as_group() {
        let mut target = Config {
            run_command: Some("pass\n".into()),
            ..Config::default()
        };
        let source = Config {
            run_filename: Some("main.em".into()),
            ..Config::default()
        };

        ConfigMerger::merge_into(&mut target, &source);
        assert_eq!(target.run_command, None);
        assert_eq!(target.run_filename.as_deref(), Some("main.em"));
    }

    #[test]
    fn test_fill_unset_run_mode_only_when_empty() {
        let mut target = Config {
            run_module: Some("pkg".into()),
            ..Config::default()
        };
        let source = Config {
            run_filename: Some("main.em".into()),
            ..Config::default()
        };

        ConfigMerger::fill_unset(&mut target, &source);
        assert_eq!(target.run_module.as_deref(), Some("pkg"));
        assert_eq!(target.run_filename, None);
    }

    #[test]
    fn test_lists() {
        let mut target = Config {
            argv: StringList::from_raw(&["a"]),
            xoptions: StringList::from_raw(&["dev"]),
            warnoptions: StringList::from_raw(&["error"]),
            ..Config::default()
        };
        let source = Config {
            xoptions: StringList::from_raw(&["utf8"]),
            warnoptions: StringList::from_raw(&["ignore"]),
            ..Config::default()
        };

        ConfigMerger::merge_into(&mut target, &source);
        assert_eq!(target.argv.as_slice(), ["a"]);
        assert_eq!(target.xoptions.as_slice(), ["dev", "utf8"]);
        assert_eq!(target.warnoptions.as_slice(), ["error"]);
    }

    #[test]
    fn test_merge_layers_in_order() {
        let low = Config {
            verbose: Some(1),
            quiet: Some(true),
            ..Config::default()
        };
        let high = Config {
            verbose: Some(2),
            ..Config::default()
        };

        let merged = ConfigMerger::merge(&[low, high]);
        assert_eq!(merged.verbose, Some(2));
        assert_eq!(merged.quiet, Some(true));
    }
}
