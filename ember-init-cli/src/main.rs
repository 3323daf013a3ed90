//! Main entry point for the ember-init CLI.
//!
//! Shows the startup configuration the ember runtime would resolve for a
//! given command line and environment:
//! - `resolve`: both resolved records plus warnings
//! - `paths`: installation prefixes and the module search path
//! - `names`: every option a configuration handle accepts
//! - `completions`: shell completion scripts

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use error::CliError;
use utils::GlobalOptions;

fn main() {
    let cli = Cli::parse();

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        log_mode: cli.log_mode,
    };
    utils::init_logging(&global);

    let result = match cli.command {
        cli::Command::Resolve(cmd) => cmd.execute(&global),
        cli::Command::Paths(cmd) => cmd.execute(&global),
        cli::Command::Names(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    match result {
        Ok(()) => std::process::exit(0),
        // The runtime command line already printed its own output
        Err(CliError::Exit(code)) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
