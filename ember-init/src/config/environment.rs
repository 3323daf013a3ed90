//! Environment variable handling.
//!
//! This module reads the `EMBER_*` variables from a [`Snapshot`] and turns
//! them into configuration layers. A layer only carries the fields the
//! environment actually sets; resolution then uses it to fill whatever the
//! embedder and the command line left unset.

use crate::config::schema::{Config, CpuCount, MAX_HASH_SEED};
use crate::config::validator::ConfigValidator;
use crate::error::{Error, Result};
use crate::preconfig::{Allocator, PreConfig};
use crate::snapshot::Snapshot;

/// Builds configuration layers from `EMBER_*` environment variables.
///
/// # Examples
///
/// ```
/// use ember_init::config::EnvironmentConfig;
/// use ember_init::Snapshot;
///
/// let snapshot = Snapshot::empty()
///     .with_var("EMBER_OPTIMIZE", "2")
///     .with_var("EMBER_HOME", "/opt/ember");
///
/// let layer = EnvironmentConfig::config_layer(&snapshot).unwrap();
/// assert_eq!(layer.optimization_level, Some(2));
/// assert_eq!(layer.home.as_deref(), Some("/opt/ember"));
/// assert_eq!(layer.verbose, None);
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Read the variables that affect pre-configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] naming the variable when
    /// `EMBER_MALLOC` names an unknown allocator or `EMBER_UTF8` is not `0`
    /// or `1`.
    pub fn preconfig_layer(snapshot: &Snapshot) -> Result<PreConfig> {
        let mut layer = PreConfig::default();

        // EMBER_MALLOC
        if let Some(name) = snapshot.var("EMBER_MALLOC") {
            let allocator = name.parse::<Allocator>().map_err(|_| {
                Error::invalid_value("EMBER_MALLOC", format!("unknown allocator '{name}'"))
            })?;
            layer.allocator = Some(allocator);
        }

        // EMBER_UTF8
        if let Some(value) = snapshot.var("EMBER_UTF8") {
            layer.utf8_mode = Some(Self::parse_switch("EMBER_UTF8", value)?);
        }

        // EMBER_COERCE_C_LOCALE
        if let Some(value) = snapshot.var("EMBER_COERCE_C_LOCALE") {
            match value {
                "0" => layer.coerce_c_locale = Some(false),
                "warn" => layer.coerce_c_locale_warn = Some(true),
                _ => layer.coerce_c_locale = Some(true),
            }
        }

        if snapshot.var("EMBER_DEV_MODE").is_some() {
            layer.dev_mode = Some(true);
        }

        if snapshot.var("EMBER_LEGACY_WINDOWS_FS_ENCODING").is_some() {
            layer.platform.legacy_windows_fs_encoding = Some(true);
        }

        Ok(layer)
    }

    /// Read the variables that affect the main configuration.
    ///
    /// `EMBER_WARNINGS` entries are returned in `warnoptions`, in the order
    /// they appear.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] naming the variable for any malformed
    /// value.
    pub fn config_layer(snapshot: &Snapshot) -> Result<Config> {
        let mut layer = Config::default();

        Self::apply_path_inputs(snapshot, &mut layer);
        Self::apply_levels(snapshot, &mut layer)?;
        Self::apply_flags(snapshot, &mut layer)?;

        // EMBER_HASH_SEED
        if let Some(value) = snapshot.var("EMBER_HASH_SEED") {
            if value == "random" {
                layer.use_hash_seed = Some(false);
            } else {
                let seed = value
                    .parse::<u64>()
                    .ok()
                    .filter(|seed| *seed <= MAX_HASH_SEED)
                    .ok_or_else(|| {
                        Error::invalid_value(
                            "EMBER_HASH_SEED",
                            format!("must be \"random\" or an integer in range [0; {MAX_HASH_SEED}]"),
                        )
                    })?;
                layer.use_hash_seed = Some(true);
                layer.hash_seed = Some(seed);
            }
        }

        // EMBER_IO_ENCODING (encoding[:errors])
        if let Some(value) = snapshot.var("EMBER_IO_ENCODING") {
            let (encoding, errors) = match value.split_once(':') {
                Some((encoding, errors)) => (encoding, Some(errors)),
                None => (value, None),
            };
            if !encoding.is_empty() {
                layer.stdio_encoding = Some(encoding.to_string());
            }
            if let Some(errors) = errors.filter(|e| !e.is_empty()) {
                layer.stdio_errors = Some(errors.to_string());
            }
        }

        // EMBER_INT_MAX_STR_DIGITS
        if let Some(value) = snapshot.var("EMBER_INT_MAX_STR_DIGITS") {
            let digits = value.parse::<i32>().map_err(|_| {
                Error::invalid_value("EMBER_INT_MAX_STR_DIGITS", "must be an integer")
            })?;
            ConfigValidator::validate_int_max_str_digits("EMBER_INT_MAX_STR_DIGITS", digits)?;
            layer.int_max_str_digits = Some(digits);
        }

        // EMBER_CPU_COUNT
        if let Some(value) = snapshot.var("EMBER_CPU_COUNT") {
            let count = value
                .parse::<CpuCount>()
                .map_err(|msg| Error::invalid_value("EMBER_CPU_COUNT", msg))?;
            layer.cpu_count = Some(count);
        }

        // EMBER_WARNINGS (comma-separated)
        if let Some(value) = snapshot.var("EMBER_WARNINGS") {
            value
                .split(',')
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .for_each(|w| layer.warnoptions.append(w));
        }

        // Switches that only accept 0 or 1
        if let Some(value) = snapshot.var("EMBER_THREAD_INHERIT_CONTEXT") {
            layer.thread_inherit_context =
                Some(Self::parse_switch("EMBER_THREAD_INHERIT_CONTEXT", value)?);
        }
        if let Some(value) = snapshot.var("EMBER_CONTEXT_AWARE_WARNINGS") {
            layer.context_aware_warnings =
                Some(Self::parse_switch("EMBER_CONTEXT_AWARE_WARNINGS", value)?);
        }
        if let Some(value) = snapshot.var("EMBER_GIL") {
            layer.platform.enable_gil = Some(Self::parse_switch("EMBER_GIL", value)?);
        }

        if snapshot.var("EMBER_DEV_MODE").is_some() {
            layer.dev_mode = Some(true);
        }

        Ok(layer)
    }

    /// String-valued inputs copied verbatim.
    fn apply_path_inputs(snapshot: &Snapshot, layer: &mut Config) {
        let copy = |name: &str| snapshot.var(name).map(str::to_string);

        layer.home = copy("EMBER_HOME");
        layer.path_env = copy("EMBER_PATH");
        layer.cache_prefix = copy("EMBER_CACHE_PREFIX");
        layer.platlibdir = copy("EMBER_PLATLIBDIR");
        layer.dump_refs_file = copy("EMBER_DUMP_REFS_FILE");
    }

    /// Variables whose value is a level.
    fn apply_levels(snapshot: &Snapshot, layer: &mut Config) -> Result<()> {
        layer.verbose = Self::level(snapshot, "EMBER_VERBOSE")?;
        layer.optimization_level = Self::level(snapshot, "EMBER_OPTIMIZE")?;
        layer.tracemalloc = Self::level(snapshot, "EMBER_TRACEMALLOC")?;

        if let Some(level) = Self::level(snapshot, "EMBER_PROFILE_IMPORT_TIME")? {
            if level > 2 {
                return Err(Error::invalid_value(
                    "EMBER_PROFILE_IMPORT_TIME",
                    format!("expected 0, 1 or 2, got {level}"),
                ));
            }
            layer.import_time = Some(level);
        }

        Ok(())
    }

    /// Variables that switch a behaviour on when their level is non-zero.
    fn apply_flags(snapshot: &Snapshot, layer: &mut Config) -> Result<()> {
        let enabled = |name: &str| -> Result<bool> {
            Ok(Self::level(snapshot, name)?.is_some_and(|level| level > 0))
        };

        if enabled("EMBER_NO_USER_SITE")? {
            layer.user_site_directory = Some(false);
        }
        if enabled("EMBER_DONT_WRITE_BYTECODE")? {
            layer.write_bytecode = Some(false);
        }
        if enabled("EMBER_UNBUFFERED")? {
            layer.buffered_stdio = Some(false);
        }
        if enabled("EMBER_NO_DEBUG_RANGES")? {
            layer.code_debug_ranges = Some(false);
        }
        if enabled("EMBER_INSPECT")? {
            layer.inspect = Some(true);
        }
        if enabled("EMBER_DEBUG")? {
            layer.parser_debug = Some(true);
        }
        if enabled("EMBER_FAULTHANDLER")? {
            layer.faulthandler = Some(true);
        }
        if enabled("EMBER_SAFE_PATH")? {
            layer.safe_path = Some(true);
        }
        if enabled("EMBER_WARN_DEFAULT_ENCODING")? {
            layer.warn_default_encoding = Some(true);
        }
        if enabled("EMBER_PERF_PROFILING")? {
            layer.perf_profiling = Some(true);
        }
        if enabled("EMBER_LEGACY_WINDOWS_STDIO")? {
            layer.platform.legacy_windows_stdio = Some(true);
        }

        Ok(())
    }

    fn level(snapshot: &Snapshot, name: &str) -> Result<Option<i32>> {
        snapshot
            .var(name)
            .map(|value| Self::parse_level(name, value))
            .transpose()
    }

    /// Parse a level value.
    ///
    /// Accepts a non-negative decimal integer, or true/yes/on (1) and
    /// false/no/off (0), case-insensitive.
    fn parse_level(name: &str, value: &str) -> Result<i32> {
        if let Ok(level) = value.parse::<i32>() {
            if level >= 0 {
                return Ok(level);
            }
        }
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" => Ok(1),
            "false" | "no" | "off" => Ok(0),
            _ => Err(Error::invalid_value(
                name,
                format!("invalid value '{value}' (expected a non-negative integer or true/false/yes/no/on/off)"),
            )),
        }
    }

    fn parse_switch(name: &str, value: &str) -> Result<bool> {
        match value {
            "1" => Ok(true),
            "0" => Ok(false),
            _ => Err(Error::invalid_value(
                name,
                format!("expected 0 or 1, got '{value}'"),
            )),
        }
    }
}
