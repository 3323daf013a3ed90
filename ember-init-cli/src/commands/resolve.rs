//! Command to resolve the full startup configuration.

use crate::error::CliError;
use crate::utils::{
    executable_override, render, report_exit, snapshot_for, GlobalOptions, OutputFormat,
};
use clap::Args;
use ember_init::config::schema::DEFAULT_PROGRAM_NAME;
use ember_init::{resolve_startup, Config, PreConfig};
use serde::Serialize;
use std::path::PathBuf;

/// Resolve the pre-configuration and configuration the runtime would use.
#[derive(Args)]
pub struct ResolveCommand {
    /// Start from the isolated presets
    #[arg(long)]
    pub isolated: bool,

    /// Installation home, PREFIX or PREFIX:EXEC_PREFIX
    #[arg(long, value_name = "DIR")]
    pub home: Option<String>,

    /// Resolve paths as if running from this executable
    #[arg(long, value_name = "PATH")]
    pub executable: Option<PathBuf>,

    /// Ignore EMBER_* environment variables
    #[arg(long)]
    pub no_env: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Runtime command line (after `--`)
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

#[derive(Serialize)]
struct Resolved<'a> {
    preconfig: &'a PreConfig,
    config: &'a Config,
    warnings: Vec<String>,
}

impl ResolveCommand {
    pub fn execute(self, _global: &GlobalOptions) -> Result<(), CliError> {
        let snapshot = snapshot_for(self.executable.as_deref())?;

        let (mut pre, mut config) = if self.isolated {
            (PreConfig::isolated(), Config::isolated())
        } else {
            (PreConfig::standard(), Config::standard())
        };
        if self.no_env {
            pre.use_environment = Some(false);
            config.use_environment = Some(false);
        }
        config.home = self.home;
        config.executable = executable_override(self.executable.as_deref(), &snapshot);

        let mut argv = vec![DEFAULT_PROGRAM_NAME.to_string()];
        argv.extend(self.args);
        config.set_argv(&argv);

        log::debug!("resolving argv {argv:?}");
        resolve_startup(&mut pre, &mut config, &snapshot).map_err(report_exit)?;

        let mut warnings = config.warnings.clone();
        warnings.extend(pre.coercion_warning());

        let output = render(
            &Resolved {
                preconfig: &pre,
                config: &config,
                warnings,
            },
            self.format,
        )?;
        println!("{output}");
        Ok(())
    }
}
