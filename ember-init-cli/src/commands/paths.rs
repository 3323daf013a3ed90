//! Command to show path discovery results.

use crate::error::CliError;
use crate::utils::{executable_override, render, snapshot_for, GlobalOptions, OutputFormat};
use clap::Args;
use ember_init::path::{InstallLayout, OsProbe, PathResolver};
use ember_init::{Config, ConfigMerger, EnvironmentConfig};
use std::path::PathBuf;

/// Show installation prefixes and the module search path.
#[derive(Args)]
pub struct PathsCommand {
    /// Installation home, PREFIX or PREFIX:EXEC_PREFIX
    #[arg(long, value_name = "DIR")]
    pub home: Option<String>,

    /// Resolve paths as if running from this executable
    #[arg(long, value_name = "PATH")]
    pub executable: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl PathsCommand {
    pub fn execute(self, _global: &GlobalOptions) -> Result<(), CliError> {
        let snapshot = snapshot_for(self.executable.as_deref())?;

        // EMBER_HOME, EMBER_PATH and EMBER_PLATLIBDIR still apply
        let mut config = Config {
            home: self.home,
            executable: executable_override(self.executable.as_deref(), &snapshot),
            ..Config::default()
        };
        ConfigMerger::fill_unset(&mut config, &EnvironmentConfig::config_layer(&snapshot)?);

        let layout = InstallLayout::native();
        let outputs = PathResolver::new(&layout, &OsProbe).discover(&config, &snapshot);
        for warning in &outputs.warnings {
            log::warn!("{warning}");
        }

        println!("{}", render(&outputs, self.format)?);
        Ok(())
    }
}
