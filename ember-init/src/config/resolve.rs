//! Config resolution.
//!
//! Layers are applied in a fixed order so the visible precedence is
//! command line > embedder (API) > environment > default:
//!
//! 1. the command line, parsed from `argv`, overwrites
//! 2. unset process flags are inherited from the resolved [`PreConfig`]
//! 3. the environment fills what is still unset
//! 4. derived values, encodings and hard defaults fill the rest
//! 5. path discovery, unless the search path was given explicitly
//! 6. validation
//!
//! Steps that consume `argv` or accumulate lists run only on the first
//! resolution, which makes resolving twice a no-op.

use std::mem;

use crate::config::cmdline;
use crate::config::environment::EnvironmentConfig;
use crate::config::merger::ConfigMerger;
use crate::config::schema::{
    Config, CpuCount, DEFAULT_INT_MAX_STR_DIGITS, DEFAULT_PLATLIBDIR, DEFAULT_PROGRAM_NAME,
};
use crate::config::validator::ConfigValidator;
use crate::error::Result;
use crate::path::{FileProbe, InstallLayout, OsProbe, PathResolver};
use crate::preconfig::locale::{self, COERCION_TARGETS};
use crate::preconfig::PreConfig;
use crate::snapshot::Snapshot;
use crate::string_list::StringList;

impl Config {
    /// Resolve every unset field against a resolved pre-configuration and a
    /// process snapshot, discovering paths on the real filesystem.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Exit`] for `--help`, `--version` and usage errors
    /// - [`crate::Error::InvalidValue`] for malformed flags, environment
    ///   values or out-of-range fields
    /// - [`crate::Error::MutuallyExclusive`] when several run modes are set
    ///
    /// The configuration must not be used after an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use ember_init::{Config, PreConfig, Snapshot};
    ///
    /// let snapshot = Snapshot::empty();
    /// let mut pre = PreConfig::isolated();
    /// let mut config = Config::isolated();
    /// config.home = Some("/opt/ember".to_string());
    /// config.set_argv(&["ember", "-O", "main.em", "--flag"]);
    ///
    /// pre.resolve(&config.argv, &snapshot).unwrap();
    /// config.resolve(&pre, &snapshot).unwrap();
    ///
    /// assert_eq!(config.optimization_level, Some(1));
    /// assert_eq!(config.run_filename.as_deref(), Some("main.em"));
    /// assert_eq!(config.argv.as_slice(), ["main.em", "--flag"]);
    /// assert_eq!(config.module_search_paths_set, Some(true));
    /// ```
    pub fn resolve(&mut self, pre: &PreConfig, snapshot: &Snapshot) -> Result<()> {
        self.resolve_with(pre, snapshot, &InstallLayout::native(), &OsProbe)
    }

    /// [`Config::resolve`] with an explicit installation layout and
    /// filesystem probe.
    ///
    /// # Errors
    ///
    /// See [`Config::resolve`].
    pub fn resolve_with(
        &mut self,
        pre: &PreConfig,
        snapshot: &Snapshot,
        layout: &InstallLayout,
        probe: &dyn FileProbe,
    ) -> Result<()> {
        let first_pass = !self.layers_applied;
        let mut cli_warnoptions = StringList::new();

        if first_pass {
            if self.orig_argv.is_empty() {
                self.orig_argv = self.argv.clone();
            }
            if self.parse_argv.unwrap_or(true) {
                let mut layer = cmdline::parse(&self.argv)?;
                cli_warnoptions = mem::take(&mut layer.warnoptions);
                ConfigMerger::merge_into(self, &layer);
            }
            cmdline::apply_xoptions(self)?;
        }

        fill(&mut self.isolated, pre.isolated);
        let isolated = *self.isolated.get_or_insert(false);
        if isolated {
            fill(&mut self.use_environment, Some(false));
            fill(&mut self.user_site_directory, Some(false));
            fill(&mut self.safe_path, Some(true));
        }
        fill(&mut self.use_environment, pre.use_environment);
        fill(&mut self.dev_mode, pre.dev_mode);

        let use_environment = *self.use_environment.get_or_insert(true);
        let mut env_warnoptions = StringList::new();
        if use_environment {
            let mut layer = EnvironmentConfig::config_layer(snapshot)?;
            env_warnoptions = mem::take(&mut layer.warnoptions);
            ConfigMerger::fill_unset(self, &layer);
        }

        let dev_mode = *self.dev_mode.get_or_insert(false);
        if dev_mode {
            fill(&mut self.faulthandler, Some(true));
        }

        self.resolve_encodings(pre, snapshot);
        if first_pass {
            self.assemble_warnoptions(dev_mode, &env_warnoptions, &cli_warnoptions);
        }
        self.apply_defaults();

        if self.argv.is_empty() {
            self.argv.append("");
        }

        if self.module_search_paths_set.is_none() && !self.module_search_paths.is_empty() {
            self.module_search_paths_set = Some(true);
        }
        if self.module_search_paths_set == Some(true) {
            log::debug!(
                "using {} explicit module search paths",
                self.module_search_paths.len()
            );
        } else {
            PathResolver::new(layout, probe).apply(self, snapshot);
        }

        ConfigValidator::validate(self)?;
        self.layers_applied = true;

        log::debug!(
            "configuration resolved: run_mode={:?} argv={:?} isolated={isolated} use_environment={use_environment}",
            self.run_mode(),
            self.argv.as_slice()
        );
        Ok(())
    }

    /// Whether this configuration has already been through
    /// [`Config::resolve`].
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.layers_applied
    }

    /// Pick encodings from UTF-8 mode and the (possibly coerced) locale.
    fn resolve_encodings(&mut self, pre: &PreConfig, snapshot: &Snapshot) {
        let utf8_mode = pre.utf8_mode.unwrap_or(false);
        let locale = match (pre.coerce_c_locale, pre.coerce_target.as_deref()) {
            (Some(true), Some(target)) => target,
            _ => snapshot.ctype_locale(),
        };
        let locale_encoding = locale::locale_encoding(locale);

        let filesystem_encoding = if utf8_mode || cfg!(any(windows, target_os = "macos")) {
            "utf-8".to_string()
        } else {
            locale_encoding.clone()
        };
        fill(&mut self.filesystem_encoding, Some(filesystem_encoding));
        fill(
            &mut self.filesystem_errors,
            Some(if cfg!(windows) { "surrogatepass" } else { "surrogateescape" }.to_string()),
        );

        let stdio_encoding = if utf8_mode {
            "utf-8".to_string()
        } else {
            locale_encoding
        };
        fill(&mut self.stdio_encoding, Some(stdio_encoding));

        let lenient = utf8_mode
            || locale::is_legacy_locale(locale)
            || COERCION_TARGETS.contains(&locale);
        fill(
            &mut self.stdio_errors,
            Some(if lenient { "surrogateescape" } else { "strict" }.to_string()),
        );
    }

    /// Build the final warning filter list, lowest priority first.
    fn assemble_warnoptions(&mut self, dev_mode: bool, env: &StringList, cli: &StringList) {
        let api = mem::take(&mut self.warnoptions);
        let mut options = StringList::new();

        if dev_mode {
            options.append_unique("default");
        }
        for option in env.iter().chain(cli.iter()) {
            options.append_unique(option);
        }
        match self.bytes_warning {
            Some(1) => {
                options.append_unique("default::BytesWarning");
            }
            Some(level) if level >= 2 => {
                options.append_unique("error::BytesWarning");
            }
            _ => {}
        }
        for option in api.iter() {
            options.append_unique(option);
        }

        self.warnoptions = options;
    }

    fn apply_defaults(&mut self) {
        fill(&mut self.parse_argv, Some(true));
        fill(&mut self.install_signal_handlers, Some(true));
        fill(&mut self.use_hash_seed, Some(false));
        fill(&mut self.hash_seed, Some(0));
        fill(&mut self.faulthandler, Some(false));
        fill(&mut self.tracemalloc, Some(0));
        fill(&mut self.perf_profiling, Some(false));
        fill(&mut self.import_time, Some(0));
        fill(&mut self.code_debug_ranges, Some(true));
        fill(&mut self.show_ref_count, Some(false));
        fill(&mut self.dump_refs, Some(false));
        fill(&mut self.malloc_stats, Some(false));
        fill(&mut self.site_import, Some(true));
        fill(&mut self.bytes_warning, Some(0));
        fill(&mut self.warn_default_encoding, Some(false));
        fill(&mut self.inspect, Some(false));
        fill(&mut self.interactive, Some(false));
        fill(&mut self.optimization_level, Some(0));
        fill(&mut self.parser_debug, Some(false));
        fill(&mut self.write_bytecode, Some(true));
        fill(&mut self.verbose, Some(0));
        fill(&mut self.quiet, Some(false));
        fill(&mut self.user_site_directory, Some(true));
        fill(&mut self.configure_c_stdio, Some(false));
        fill(&mut self.buffered_stdio, Some(true));
        fill(&mut self.check_hash_cache_mode, Some("default".to_string()));
        fill(&mut self.use_frozen_modules, Some(true));
        fill(&mut self.safe_path, Some(false));
        fill(&mut self.int_max_str_digits, Some(DEFAULT_INT_MAX_STR_DIGITS));
        fill(&mut self.thread_inherit_context, Some(false));
        fill(&mut self.context_aware_warnings, Some(false));
        fill(&mut self.cpu_count, Some(CpuCount::Default));
        fill(&mut self.pathconfig_warnings, Some(true));
        fill(&mut self.platlibdir, Some(DEFAULT_PLATLIBDIR.to_string()));
        fill(&mut self.skip_source_first_line, Some(false));

        let program_name = self
            .orig_argv
            .get(0)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_PROGRAM_NAME)
            .to_string();
        fill(&mut self.program_name, Some(program_name));

        if cfg!(windows) {
            fill(&mut self.platform.legacy_windows_stdio, Some(false));
        }
        if cfg!(target_vendor = "apple") {
            fill(&mut self.platform.use_system_logger, Some(false));
        }
    }
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}
