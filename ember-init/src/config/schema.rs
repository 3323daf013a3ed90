//! Configuration schema definitions.
//!
//! [`Config`] is the full startup configuration. Scalar fields are
//! `Option`s: `None` means "unset, inherit from the next lower-precedence
//! source", which makes the precedence law a property of the types rather
//! than of a sentinel value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::string_list::StringList;

/// Default limit on the number of digits in int/str conversions.
pub const DEFAULT_INT_MAX_STR_DIGITS: i32 = 4300;

/// Smallest non-zero value accepted for `int_max_str_digits`.
pub const INT_MAX_STR_DIGITS_THRESHOLD: i32 = 640;

/// Largest accepted hash seed.
pub const MAX_HASH_SEED: u64 = 4_294_967_295;

/// Default `platlibdir`.
pub const DEFAULT_PLATLIBDIR: &str = "lib";

/// Program name used when argv does not provide one.
pub const DEFAULT_PROGRAM_NAME: &str = "ember";

/// Accepted values of `check_hash_cache_mode`.
pub const CHECK_HASH_CACHE_MODES: [&str; 3] = ["default", "always", "never"];

/// Processor count reported to programs.
///
/// # Examples
///
/// ```
/// use ember_init::config::CpuCount;
///
/// assert_eq!("default".parse::<CpuCount>().unwrap(), CpuCount::Default);
/// assert_eq!("4".parse::<CpuCount>().unwrap(), CpuCount::Fixed(4));
/// assert!("0".parse::<CpuCount>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuCount {
    /// Ask the operating system.
    Default,
    /// Report a fixed count.
    Fixed(u32),
}

impl CpuCount {
    /// Integer form used by the configuration handle (`-1` for default).
    #[must_use]
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Default => -1,
            Self::Fixed(n) => i64::from(n),
        }
    }
}

impl fmt::Display for CpuCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Fixed(n) => write!(f, "{n}"),
        }
    }
}

impl std::str::FromStr for CpuCount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "default" {
            return Ok(Self::Default);
        }
        match s.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Self::Fixed(n)),
            _ => Err(format!("expected 'default' or a positive integer, got '{s}'")),
        }
    }
}

/// Platform capabilities that only exist on some targets.
///
/// Kept as one record on every target so the data model is shared; fields
/// that do not apply are simply never consulted there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Use the legacy console I/O layer (Windows).
    pub legacy_windows_stdio: Option<bool>,
    /// Route stdout/stderr to the system logger (Apple platforms).
    pub use_system_logger: Option<bool>,
    /// Enable the global interpreter lock (free-threaded builds).
    pub enable_gil: Option<bool>,
    /// Enable thread-local bytecode (free-threaded builds).
    pub tlbc_enabled: Option<bool>,
}

/// Complete startup configuration.
///
/// Build one from a preset, adjust fields directly, then call
/// [`Config::resolve`](crate::Config::resolve).
///
/// # Examples
///
/// ```
/// use ember_init::Config;
///
/// let mut config = Config::isolated();
/// config.optimization_level = Some(1);
/// assert_eq!(config.use_environment, Some(false));
/// assert_eq!(config.home, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Isolated mode.
    pub isolated: Option<bool>,
    /// Read `EMBER_*` environment variables.
    pub use_environment: Option<bool>,
    /// Development mode.
    pub dev_mode: Option<bool>,
    /// Install the runtime's signal handlers.
    pub install_signal_handlers: Option<bool>,
    /// Use `hash_seed` instead of a random seed.
    pub use_hash_seed: Option<bool>,
    /// Hash randomisation seed.
    pub hash_seed: Option<u64>,
    /// Dump tracebacks on fatal signals.
    pub faulthandler: Option<bool>,
    /// Number of frames traced by the allocation tracer (0 disables).
    pub tracemalloc: Option<i32>,
    /// Emit perf map entries.
    pub perf_profiling: Option<bool>,
    /// Import timing level (0, 1 or 2).
    pub import_time: Option<i32>,
    /// Keep column information in code objects.
    pub code_debug_ranges: Option<bool>,
    /// Show total reference counts.
    pub show_ref_count: Option<bool>,
    /// Dump live references at exit.
    pub dump_refs: Option<bool>,
    /// File receiving the reference dump.
    pub dump_refs_file: Option<String>,
    /// Print allocator statistics at exit.
    pub malloc_stats: Option<bool>,
    /// Filesystem encoding.
    pub filesystem_encoding: Option<String>,
    /// Filesystem error handler.
    pub filesystem_errors: Option<String>,
    /// Directory for cached bytecode instead of per-package cache dirs.
    pub cache_prefix: Option<String>,
    /// Parse `argv` as a command line.
    pub parse_argv: Option<bool>,
    /// The command line exactly as received.
    pub orig_argv: StringList,
    /// Program arguments after option parsing.
    pub argv: StringList,
    /// `-X` options.
    pub xoptions: StringList,
    /// Warning filters, lowest priority first.
    pub warnoptions: StringList,
    /// Import the site module at startup.
    pub site_import: Option<bool>,
    /// Bytes/str comparison warning level.
    pub bytes_warning: Option<i32>,
    /// Warn when the default encoding is used implicitly.
    pub warn_default_encoding: Option<bool>,
    /// Enter interactive mode after running the program.
    pub inspect: Option<bool>,
    /// Force interactive mode.
    pub interactive: Option<bool>,
    /// Optimization level.
    pub optimization_level: Option<i32>,
    /// Parser debug output.
    pub parser_debug: Option<bool>,
    /// Write bytecode caches.
    pub write_bytecode: Option<bool>,
    /// Verbosity level.
    pub verbose: Option<i32>,
    /// Suppress the interactive banner.
    pub quiet: Option<bool>,
    /// Add the user site directory.
    pub user_site_directory: Option<bool>,
    /// Configure C standard streams (binary mode, buffering).
    pub configure_c_stdio: Option<bool>,
    /// Buffer stdio streams.
    pub buffered_stdio: Option<bool>,
    /// Encoding of stdin/stdout/stderr.
    pub stdio_encoding: Option<String>,
    /// Error handler of stdin/stdout/stderr.
    pub stdio_errors: Option<String>,
    /// Validation of hash-based bytecode caches.
    pub check_hash_cache_mode: Option<String>,
    /// Use frozen builtin modules.
    pub use_frozen_modules: Option<bool>,
    /// Do not prepend a potentially unsafe path to the module search path.
    pub safe_path: Option<bool>,
    /// Int/str conversion digit limit; 0 means unlimited.
    pub int_max_str_digits: Option<i32>,
    /// New threads inherit the caller's context.
    pub thread_inherit_context: Option<bool>,
    /// Warnings filters are context-local.
    pub context_aware_warnings: Option<bool>,
    /// Processor count override.
    pub cpu_count: Option<CpuCount>,

    /// Warn when path discovery falls back to defaults.
    pub pathconfig_warnings: Option<bool>,
    /// Program name used to locate the executable.
    pub program_name: Option<String>,
    /// Raw `EMBER_PATH` value.
    pub path_env: Option<String>,
    /// Installation home override, `PREFIX` or `PREFIX<sep>EXEC_PREFIX`.
    pub home: Option<String>,
    /// Platform library directory name.
    pub platlibdir: Option<String>,

    /// Whether `module_search_paths` is authoritative.
    pub module_search_paths_set: Option<bool>,
    /// Module search path, highest priority first.
    pub module_search_paths: StringList,
    /// Standard library directory.
    pub stdlib_dir: Option<String>,
    /// Resolved executable.
    pub executable: Option<String>,
    /// Executable of the base installation (differs inside a virtual environment).
    pub base_executable: Option<String>,
    /// Platform-independent installation prefix.
    pub prefix: Option<String>,
    /// Prefix of the base installation.
    pub base_prefix: Option<String>,
    /// Platform-dependent installation prefix.
    pub exec_prefix: Option<String>,
    /// Exec prefix of the base installation.
    pub base_exec_prefix: Option<String>,

    /// Skip the first line of the source file.
    pub skip_source_first_line: Option<bool>,
    /// Code passed with `-c`.
    pub run_command: Option<String>,
    /// Module passed with `-m`.
    pub run_module: Option<String>,
    /// Script file to run.
    pub run_filename: Option<String>,

    /// Platform-specific capabilities.
    pub platform: PlatformConfig,

    /// Non-fatal diagnostics recorded during resolution.
    #[serde(default)]
    pub warnings: Vec<String>,

    /// Set once argv and the list layers have been applied.
    #[serde(skip)]
    pub layers_applied: bool,
}

/// How the runtime was asked to run code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Inline source code.
    Command(String),
    /// A module run as a script.
    Module(String),
    /// A script file.
    Filename(String),
}

impl Config {
    /// The default preset: inherits the environment and parses argv.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            parse_argv: Some(true),
            configure_c_stdio: Some(true),
            install_signal_handlers: Some(true),
            pathconfig_warnings: Some(true),
            ..Self::default()
        }
    }

    /// The isolated preset: no environment, no user site directory, no
    /// unsafe path, no signal handlers.
    #[must_use]
    pub fn isolated() -> Self {
        Self {
            isolated: Some(true),
            use_environment: Some(false),
            user_site_directory: Some(false),
            safe_path: Some(true),
            dev_mode: Some(false),
            install_signal_handlers: Some(false),
            configure_c_stdio: Some(false),
            pathconfig_warnings: Some(false),
            ..Self::default()
        }
    }

    /// Replace `argv` with a deep copy of `args`.
    pub fn set_argv<S: AsRef<str>>(&mut self, args: &[S]) {
        self.argv = StringList::from_raw(args);
    }

    /// Set the run mode, clearing the other two.
    pub fn set_run_mode(&mut self, mode: RunMode) {
        self.run_command = None;
        self.run_module = None;
        self.run_filename = None;
        match mode {
            RunMode::Command(code) => self.run_command = Some(code),
            RunMode::Module(name) => self.run_module = Some(name),
            RunMode::Filename(path) => self.run_filename = Some(path),
        }
    }

    /// The run mode, if exactly one is set.
    #[must_use]
    pub fn run_mode(&self) -> Option<RunMode> {
        match (&self.run_command, &self.run_module, &self.run_filename) {
            (Some(code), None, None) => Some(RunMode::Command(code.clone())),
            (None, Some(name), None) => Some(RunMode::Module(name.clone())),
            (None, None, Some(path)) => Some(RunMode::Filename(path.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fully_unset() {
        let config = Config::default();
        assert_eq!(config.isolated, None);
        assert_eq!(config.optimization_level, None);
        assert!(config.argv.is_empty());
        assert!(!config.layers_applied);
    }

    #[test]
    fn test_standard_preset() {
        let config = Config::standard();
        assert_eq!(config.parse_argv, Some(true));
        assert_eq!(config.use_environment, None);
        assert_eq!(config.pathconfig_warnings, Some(true));
    }

    #[test]
    fn test_isolated_preset() {
        let config = Config::isolated();
        assert_eq!(config.isolated, Some(true));
        assert_eq!(config.use_environment, Some(false));
        assert_eq!(config.user_site_directory, Some(false));
        assert_eq!(config.safe_path, Some(true));
        assert_eq!(config.parse_argv, None);
    }

    #[test]
    fn test_set_run_mode_clears_others() {
        let mut config = Config::default();
        config.set_run_mode(RunMode::Command("pass\n".into()));
        config.set_run_mode(RunMode::Module("http.server".into()));
        assert_eq!(config.run_command, None);
        assert_eq!(config.run_mode(), Some(RunMode::Module("http.server".into())));
    }

    #[test]
    fn test_run_mode_ambiguous() {
        let mut config = Config::default();
        config.run_command = Some("pass".into());
        config.run_filename = Some("a.em".into());
        assert_eq!(config.run_mode(), None);
    }

    #[test]
    fn test_set_argv_copies() {
        let source = vec!["prog".to_string(), "arg".to_string()];
        let mut config = Config::default();
        config.set_argv(&source);
        drop(source);
        assert_eq!(config.argv.as_slice(), ["prog", "arg"]);
    }

    #[test]
    fn test_cpu_count_parse() {
        assert_eq!("default".parse::<CpuCount>(), Ok(CpuCount::Default));
        assert!("-3".parse::<CpuCount>().is_err());
        assert_eq!(CpuCount::Fixed(8).as_i64(), 8);
        assert_eq!(CpuCount::Default.as_i64(), -1);
    }
}
