//! Configuration validation.
//!
//! Runs after every layer has been applied and reports the first
//! violation only.

use crate::config::schema::{
    Config, CHECK_HASH_CACHE_MODES, INT_MAX_STR_DIGITS_THRESHOLD, MAX_HASH_SEED,
};
use crate::error::{Error, Result};

/// Validates a configuration's ranges and cross-field invariants.
///
/// # Examples
///
/// ```
/// use ember_init::config::{Config, ConfigValidator};
///
/// let mut config = Config::default();
/// ConfigValidator::validate(&config).unwrap();
///
/// config.optimization_level = Some(-1);
/// assert!(ConfigValidator::validate(&config).is_err());
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a configuration.
    ///
    /// Unset fields are not checked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] for an out-of-range field and
    /// [`Error::MutuallyExclusive`] when more than one run mode is set.
    pub fn validate(config: &Config) -> Result<()> {
        Self::non_negative("optimization_level", config.optimization_level)?;
        Self::non_negative("verbose", config.verbose)?;
        Self::non_negative("bytes_warning", config.bytes_warning)?;
        Self::non_negative("tracemalloc", config.tracemalloc)?;

        if let Some(level) = config.import_time {
            if !(0..=2).contains(&level) {
                return Err(Error::invalid_value(
                    "import_time",
                    format!("must be 0, 1 or 2, got {level}"),
                ));
            }
        }

        if let Some(digits) = config.int_max_str_digits {
            Self::validate_int_max_str_digits("int_max_str_digits", digits)?;
        }

        if let Some(seed) = config.hash_seed {
            if seed > MAX_HASH_SEED {
                return Err(Error::invalid_value(
                    "hash_seed",
                    format!("must be at most {MAX_HASH_SEED}"),
                ));
            }
        }

        if let Some(ref mode) = config.check_hash_cache_mode {
            if !CHECK_HASH_CACHE_MODES.contains(&mode.as_str()) {
                return Err(Error::invalid_value(
                    "check_hash_cache_mode",
                    format!("must be one of default, always, never; got '{mode}'"),
                ));
            }
        }

        Self::validate_run_mode(config)?;
        Self::validate_search_paths(config)?;

        Ok(())
    }

    /// Check an `int_max_str_digits` value: 0 (unlimited) or at least 640.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] naming `field`.
    pub fn validate_int_max_str_digits(field: &str, digits: i32) -> Result<()> {
        if digits == 0 || digits >= INT_MAX_STR_DIGITS_THRESHOLD {
            return Ok(());
        }
        Err(Error::invalid_value(
            field,
            format!("must be 0 or at least {INT_MAX_STR_DIGITS_THRESHOLD}, got {digits}"),
        ))
    }

    fn non_negative(field: &str, value: Option<i32>) -> Result<()> {
        match value {
            Some(v) if v < 0 => Err(Error::invalid_value(
                field,
                format!("must not be negative, got {v}"),
            )),
            _ => Ok(()),
        }
    }

    fn validate_run_mode(config: &Config) -> Result<()> {
        let set: Vec<&'static str> = [
            ("run_command", config.run_command.is_some()),
            ("run_module", config.run_module.is_some()),
            ("run_filename", config.run_filename.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect();

        match set.as_slice() {
            [first, second, ..] => Err(Error::MutuallyExclusive {
                first: *first,
                second: *second,
            }),
            _ => Ok(()),
        }
    }

    fn validate_search_paths(config: &Config) -> Result<()> {
        let flagged = config.module_search_paths_set == Some(true);
        let populated = !config.module_search_paths.is_empty();
        match (flagged, populated) {
            (true, false) => Err(Error::invalid_value(
                "module_search_paths",
                "marked as set but empty",
            )),
            (false, true) => Err(Error::invalid_value(
                "module_search_paths",
                "populated but module_search_paths_set is not true",
            )),
            _ => Ok(()),
        }
    }
}
