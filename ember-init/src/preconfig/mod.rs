//! Pre-configuration: locale, UTF-8 mode and allocator selection.
//!
//! These settings are resolved before anything else because changing them
//! once the runtime has started allocating or decoding text is unsafe.
//!
//! # Resolution order
//!
//! 1. Preset ([`PreConfig::standard`] or [`PreConfig::isolated`])
//! 2. Command-line pre-scan (`-E`, `-I`, `-X dev`, `-X utf8`), which
//!    overrides everything below it
//! 3. Environment variables (`EMBER_*`), which only fill unset fields
//! 4. Locale coercion and UTF-8 mode, derived from the snapshot locale
//! 5. Hard-coded defaults
//!
//! # Examples
//!
//! ```
//! use ember_init::{PreConfig, Snapshot, StringList};
//!
//! let snapshot = Snapshot::empty()
//!     .with_var("LC_CTYPE", "C")
//!     .with_var("EMBER_COERCE_C_LOCALE", "warn");
//!
//! let mut pre = PreConfig::standard();
//! pre.resolve(&StringList::from_raw(&["ember"]), &snapshot).unwrap();
//!
//! assert_eq!(pre.coerce_c_locale, Some(true));
//! assert_eq!(pre.coerce_target.as_deref(), Some("C.UTF-8"));
//! assert!(pre.coercion_warning().is_some());
//! assert_eq!(pre.utf8_mode, Some(true));
//! ```

pub mod allocator;
pub mod locale;

use serde::{Deserialize, Serialize};

use crate::config::cmdline;
use crate::config::environment::EnvironmentConfig;
use crate::config::Config;
use crate::error::Result;
use crate::snapshot::Snapshot;
use crate::string_list::StringList;

pub use allocator::Allocator;

/// Platform capabilities that only exist on some targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrePlatformConfig {
    /// Use the legacy ANSI code page for filesystem names (Windows only).
    pub legacy_windows_fs_encoding: Option<bool>,
}

/// The minimal configuration needed before the allocator and text
/// encoding are committed.
///
/// Every field uses `None` for "unset, inherit from the next source".
/// After [`PreConfig::resolve`] succeeds, every field except
/// `coerce_target` is `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreConfig {
    /// Pre-scan the command line.
    pub parse_argv: Option<bool>,
    /// Isolated mode.
    pub isolated: Option<bool>,
    /// Read `EMBER_*` environment variables.
    pub use_environment: Option<bool>,
    /// Allowed to inspect and coerce the `LC_CTYPE` locale.
    pub configure_locale: Option<bool>,
    /// Requested coercion before resolution; whether coercion is active after.
    pub coerce_c_locale: Option<bool>,
    /// Emit a warning when the locale is coerced.
    pub coerce_c_locale_warn: Option<bool>,
    /// The UTF-8 locale selected when coercion is active.
    pub coerce_target: Option<String>,
    /// UTF-8 mode.
    pub utf8_mode: Option<bool>,
    /// Development mode.
    pub dev_mode: Option<bool>,
    /// Memory allocator.
    pub allocator: Option<Allocator>,
    /// Platform-specific capabilities.
    pub platform: PrePlatformConfig,
}

impl PreConfig {
    /// The default preset: inherits the environment and configures the
    /// locale.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            parse_argv: Some(true),
            configure_locale: Some(true),
            ..Self::default()
        }
    }

    /// The isolated preset: ignores the environment and leaves the locale
    /// alone.
    #[must_use]
    pub fn isolated() -> Self {
        Self {
            isolated: Some(true),
            use_environment: Some(false),
            configure_locale: Some(false),
            utf8_mode: Some(false),
            dev_mode: Some(false),
            ..Self::default()
        }
    }

    /// Fill unset process-level fields from a configuration the embedder
    /// already built.
    pub fn inherit_from(&mut self, config: &Config) {
        fill(&mut self.parse_argv, config.parse_argv);
        fill(&mut self.isolated, config.isolated);
        fill(&mut self.use_environment, config.use_environment);
        fill(&mut self.dev_mode, config.dev_mode);
    }

    /// Resolve every unset field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidValue`] naming the variable when an
    /// environment value is malformed. The pre-configuration must not be
    /// used after an error.
    pub fn resolve(&mut self, args: &StringList, snapshot: &Snapshot) -> Result<()> {
        let parse_argv = self.parse_argv.unwrap_or(true);
        if parse_argv {
            let layer = cmdline::prescan(args);
            self.overwrite_from(&layer);
        }

        if self.isolated == Some(true) {
            self.use_environment = Some(false);
        }
        let use_environment = self.use_environment.unwrap_or(true);

        if use_environment {
            let layer = EnvironmentConfig::preconfig_layer(snapshot)?;
            self.fill_from(&layer);
        }

        let configure_locale = *self.configure_locale.get_or_insert(true);
        if configure_locale {
            let decision = locale::decide_coercion(snapshot, self.coerce_c_locale);
            self.coerce_c_locale = Some(decision.active);
            self.coerce_target = decision.target;
            fill(&mut self.coerce_c_locale_warn, Some(false));
        } else {
            self.coerce_c_locale = Some(false);
            self.coerce_c_locale_warn = Some(false);
            self.coerce_target = None;
        }

        fill(
            &mut self.utf8_mode,
            Some(locale::is_legacy_locale(snapshot.ctype_locale())),
        );

        let dev_mode = *self.dev_mode.get_or_insert(false);
        fill(
            &mut self.allocator,
            Some(if dev_mode {
                Allocator::Debug
            } else {
                Allocator::Default
            }),
        );
        fill(&mut self.isolated, Some(false));
        self.use_environment = Some(use_environment);
        self.parse_argv = Some(parse_argv);
        fill(&mut self.platform.legacy_windows_fs_encoding, Some(false));

        if let Some(message) = self.coercion_warning() {
            log::warn!("{message}");
        }
        log::debug!(
            "pre-configuration resolved: utf8_mode={:?} allocator={:?} coerce={:?}",
            self.utf8_mode,
            self.allocator,
            self.coerce_target
        );

        Ok(())
    }

    /// The warning to surface when the locale was coerced with warnings on.
    #[must_use]
    pub fn coercion_warning(&self) -> Option<String> {
        if self.coerce_c_locale != Some(true) || self.coerce_c_locale_warn != Some(true) {
            return None;
        }
        let target = self.coerce_target.as_deref().unwrap_or("a UTF-8 locale");
        Some(format!(
            "ember detected LC_CTYPE=C: LC_CTYPE coerced to {target} \
             (set another locale or EMBER_COERCE_C_LOCALE=0 to disable this coercion)"
        ))
    }

    /// Whether every field that must be resolved holds a value.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.parse_argv.is_some()
            && self.isolated.is_some()
            && self.use_environment.is_some()
            && self.configure_locale.is_some()
            && self.coerce_c_locale.is_some()
            && self.coerce_c_locale_warn.is_some()
            && self.utf8_mode.is_some()
            && self.dev_mode.is_some()
            && self.allocator.is_some()
            && self.platform.legacy_windows_fs_encoding.is_some()
    }

    /// Overwrite fields with every value `layer` sets.
    fn overwrite_from(&mut self, layer: &Self) {
        overwrite(&mut self.isolated, layer.isolated);
        overwrite(&mut self.use_environment, layer.use_environment);
        overwrite(&mut self.utf8_mode, layer.utf8_mode);
        overwrite(&mut self.dev_mode, layer.dev_mode);
        overwrite(&mut self.allocator, layer.allocator);
    }

    /// Fill unset fields from `layer`.
    fn fill_from(&mut self, layer: &Self) {
        fill(&mut self.allocator, layer.allocator);
        fill(&mut self.utf8_mode, layer.utf8_mode);
        fill(&mut self.coerce_c_locale, layer.coerce_c_locale);
        fill(&mut self.coerce_c_locale_warn, layer.coerce_c_locale_warn);
        fill(&mut self.dev_mode, layer.dev_mode);
        fill(
            &mut self.platform.legacy_windows_fs_encoding,
            layer.platform.legacy_windows_fs_encoding,
        );
    }
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}
