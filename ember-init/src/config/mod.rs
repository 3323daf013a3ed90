//! Startup configuration.
//!
//! [`Config`] carries everything the runtime needs to start: process
//! flags, argv, warning filters, encodings and the module search path.
//!
//! # Configuration Precedence
//!
//! Values are merged from several sources with the following precedence
//! (highest to lowest):
//!
//! 1. Command line (`argv`, when `parse_argv` is on)
//! 2. Values set by the embedder on the [`Config`] itself
//! 3. Environment variables (`EMBER_*`, when `use_environment` is on)
//! 4. Built-in defaults
//!
//! An unset field is `None`; each source only fills the fields that no
//! higher source has set.
//!
//! # Examples
//!
//! ```
//! use ember_init::{Config, PreConfig, Snapshot};
//!
//! let snapshot = Snapshot::empty().with_var("EMBER_VERBOSE", "2");
//!
//! let mut config = Config::standard();
//! config.home = Some("/opt/ember".to_string());
//! config.set_argv(&["ember", "-X", "dev", "-c", "print('hi')"]);
//!
//! let mut pre = PreConfig::standard();
//! pre.inherit_from(&config);
//! pre.resolve(&config.argv, &snapshot).unwrap();
//! config.resolve(&pre, &snapshot).unwrap();
//!
//! assert_eq!(config.verbose, Some(2));
//! assert_eq!(config.dev_mode, Some(true));
//! assert_eq!(config.run_command.as_deref(), Some("print('hi')\n"));
//! assert_eq!(config.argv.as_slice(), ["-c"]);
//! ```

pub mod cmdline;
pub mod environment;
pub mod merger;
mod resolve;
pub mod schema;
pub mod validator;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use environment::EnvironmentConfig;
pub use merger::ConfigMerger;
pub use schema::{Config, CpuCount, PlatformConfig, RunMode};
pub use validator::ConfigValidator;
