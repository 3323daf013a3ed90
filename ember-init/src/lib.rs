#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # ember-init
//!
//! Startup configuration resolution for the embeddable ember runtime.
//!
//! Before the runtime can start it needs to know how to allocate memory,
//! which text encoding to use, which flags it was started with and where
//! its standard library lives. This crate resolves all of that from the
//! command line, values set by the embedder, `EMBER_*` environment
//! variables and the installation on disk.
//!
//! ## Core Types
//!
//! - [`PreConfig`]: allocator, locale coercion and UTF-8 mode
//! - [`Config`]: the full startup configuration
//! - [`PathResolver`]: installation prefix and module search path discovery
//! - [`ConfigHandle`]: name-addressed access to both records
//! - [`Snapshot`]: the frozen process state resolution reads
//! - [`Status`], [`Error`] and [`Result`]: outcome reporting
//! - [`StringList`]: owned, ordered string lists
//! - [`Logger`] and [`LogLevel`]: a stderr backend for the `log` facade
//!
//! ## Examples
//!
//! ```
//! use ember_init::{resolve_startup, Config, PreConfig, Snapshot};
//!
//! let snapshot = Snapshot::empty().with_var("EMBER_OPTIMIZE", "1");
//!
//! let mut pre = PreConfig::standard();
//! let mut config = Config::standard();
//! config.home = Some("/opt/ember".to_string());
//! config.set_argv(&["ember", "-v", "-m", "http.server", "8000"]);
//!
//! resolve_startup(&mut pre, &mut config, &snapshot).unwrap();
//!
//! assert_eq!(config.verbose, Some(1));
//! assert_eq!(config.optimization_level, Some(1));
//! assert_eq!(config.run_module.as_deref(), Some("http.server"));
//! assert_eq!(config.argv.as_slice(), ["-m", "8000"]);
//! ```

pub mod config;
pub mod error;
pub mod handle;
pub mod logging;
pub mod path;
pub mod preconfig;
pub mod snapshot;
pub mod startup;
pub mod status;
pub mod string_list;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigMerger, ConfigValidator, EnvironmentConfig, RunMode};
pub use error::{Error, ExitOutput, Result};
pub use handle::{ConfigHandle, ConfigKey, OptionKind};
pub use logging::{init_logger, LogLevel, Logger};
pub use path::{InstallLayout, PathOutputs, PathResolver};
pub use preconfig::{Allocator, PreConfig};
pub use snapshot::Snapshot;
pub use startup::{resolve_startup, resolve_startup_with};
pub use status::Status;
pub use string_list::StringList;
