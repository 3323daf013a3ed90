//! The full startup pipeline: pre-configuration, then configuration.

use crate::config::Config;
use crate::error::Result;
use crate::path::{FileProbe, InstallLayout, OsProbe};
use crate::preconfig::PreConfig;
use crate::snapshot::Snapshot;

/// Resolve `pre` and then `config` against `snapshot`.
///
/// Process-level flags the embedder set on `config` seed `pre` first, so
/// `config.isolated = Some(true)` is enough to keep the environment out of
/// both records.
///
/// Once `config` has been resolved its `argv` holds the program's own
/// arguments, so a later pass pre-scans `orig_argv` instead.
///
/// # Errors
///
/// Any error from [`PreConfig::resolve`] or [`Config::resolve`]. Both
/// records must be discarded after an error.
///
/// # Examples
///
/// ```
/// use ember_init::{resolve_startup, Config, PreConfig, Snapshot};
///
/// let snapshot = Snapshot::empty().with_var("EMBER_UTF8", "1");
/// let mut pre = PreConfig::standard();
/// let mut config = Config::standard();
/// config.home = Some("/opt/ember".to_string());
///
/// resolve_startup(&mut pre, &mut config, &snapshot).unwrap();
/// assert_eq!(pre.utf8_mode, Some(true));
/// assert_eq!(config.filesystem_encoding.as_deref(), Some("utf-8"));
/// ```
pub fn resolve_startup(pre: &mut PreConfig, config: &mut Config, snapshot: &Snapshot) -> Result<()> {
    resolve_startup_with(pre, config, snapshot, &InstallLayout::native(), &OsProbe)
}

/// [`resolve_startup`] with an explicit installation layout and
/// filesystem probe.
///
/// # Errors
///
/// See [`resolve_startup`].
pub fn resolve_startup_with(
    pre: &mut PreConfig,
    config: &mut Config,
    snapshot: &Snapshot,
    layout: &InstallLayout,
    probe: &dyn FileProbe,
) -> Result<()> {
    pre.inherit_from(config);
    let args = if config.is_resolved() {
        &config.orig_argv
    } else {
        &config.argv
    };
    pre.resolve(args, snapshot)?;
    config.resolve_with(pre, snapshot, layout, probe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn run(pre: &mut PreConfig, config: &mut Config, snapshot: &Snapshot) -> Result<()> {
        config.home.get_or_insert_with(|| "/opt/ember".to_string());
        resolve_startup_with(pre, config, snapshot, &InstallLayout::posix(), &OsProbe)
    }

    #[test]
    fn test_config_isolation_reaches_preconfig() {
        let snapshot = Snapshot::empty().with_var("EMBER_MALLOC", "malloc");
        let mut pre = PreConfig::standard();
        let mut config = Config::standard();
        config.isolated = Some(true);

        run(&mut pre, &mut config, &snapshot).unwrap();
        assert_eq!(pre.use_environment, Some(false));
        assert_ne!(pre.allocator, Some(crate::Allocator::Malloc));
        assert_eq!(config.use_environment, Some(false));
    }

    #[test]
    fn test_dev_flag_reaches_both_records() {
        let mut pre = PreConfig::standard();
        let mut config = Config::standard();
        config.set_argv(&["ember", "-X", "dev"]);

        run(&mut pre, &mut config, &Snapshot::empty()).unwrap();
        assert_eq!(pre.dev_mode, Some(true));
        assert_eq!(config.dev_mode, Some(true));
        assert_eq!(config.faulthandler, Some(true));
    }

    #[test]
    fn test_second_pass_ignores_program_arguments() {
        let mut pre = PreConfig::standard();
        let mut config = Config::standard();
        config.set_argv(&["ember", "main.em", "-I", "-X", "utf8"]);

        run(&mut pre, &mut config, &Snapshot::empty()).unwrap();
        let (first_pre, first_config) = (pre.clone(), config.clone());
        assert_eq!(pre.isolated, Some(false));
        assert_eq!(pre.utf8_mode, Some(false));
        assert_eq!(config.argv.as_slice(), ["main.em", "-I", "-X", "utf8"]);

        run(&mut pre, &mut config, &Snapshot::empty()).unwrap();
        assert_eq!(pre, first_pre);
        assert_eq!(config, first_config);
    }

    #[test]
    fn test_preconfig_error_stops_pipeline() {
        let snapshot = Snapshot::empty().with_var("EMBER_MALLOC", "nope");
        let mut pre = PreConfig::standard();
        let mut config = Config::standard();

        let err = run(&mut pre, &mut config, &snapshot).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
        assert!(!config.is_resolved());
    }
}
