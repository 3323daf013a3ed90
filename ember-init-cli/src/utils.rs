//! Utility functions for CLI operations.
//!
//! Shared option handling, logger setup and output rendering.

use crate::error::CliError;
use clap::ValueEnum;
use ember_init::{init_logger, Error, ExitOutput, LogLevel, Logger, Snapshot};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Log level from `--log-mode` or `EMBER_LOG_MODE`.
    pub log_mode: Option<String>,
}

/// Output format for resolved records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

/// Install the stderr logger.
///
/// `--verbose` and `--quiet` win over `--log-mode`; an unrecognised mode
/// falls back to the normal level.
pub fn init_logging(global: &GlobalOptions) {
    let logger = match global.log_mode.as_deref().map(LogLevel::parse) {
        Some(Ok(level)) if !global.verbose && !global.quiet => Logger::new(level),
        _ => init_logger(global.verbose, global.quiet),
    };
    // Only fails if a logger is already installed
    let _ = logger.install();
}

/// Render `value` in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| CliError::Serialization(e.to_string()))
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| CliError::Serialization(e.to_string()))
        }
    }
}

/// Capture the live process, optionally pretending to be `executable`.
pub fn snapshot_for(executable: Option<&Path>) -> Result<Snapshot, CliError> {
    let snapshot = Snapshot::capture();
    match executable {
        None => Ok(snapshot),
        Some(path) if path.is_file() => Ok(snapshot.with_executable(absolute(path)?)),
        Some(path) => Err(CliError::InvalidArguments(format!(
            "executable '{}' does not exist",
            path.display()
        ))),
    }
}

/// The `--executable` override as a configuration value, taken from the
/// snapshot built by [`snapshot_for`] so it is already absolute.
pub fn executable_override(requested: Option<&Path>, snapshot: &Snapshot) -> Option<String> {
    requested
        .and(snapshot.executable())
        .map(|path| path.to_string_lossy().into_owned())
}

fn absolute(path: &Path) -> Result<PathBuf, CliError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Print the output attached to a runtime exit request and turn it into
/// [`CliError::Exit`]. Other errors pass through.
pub fn report_exit(err: Error) -> CliError {
    match err {
        Error::Exit { code, output } => {
            match output {
                Some(ExitOutput::Stdout(text)) => println!("{}", text.trim_end()),
                Some(ExitOutput::Stderr(text)) => eprintln!("{}", text.trim_end()),
                None => {}
            }
            CliError::Exit(code)
        }
        other => CliError::from(other),
    }
}
