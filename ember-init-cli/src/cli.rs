//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{CompletionsCommand, NamesCommand, PathsCommand, ResolveCommand};
use clap::{Parser, Subcommand};

/// Inspect the startup configuration of the ember runtime.
#[derive(Parser)]
#[command(name = "ember-init")]
#[command(
    version,
    about = "Inspect the startup configuration of the ember runtime",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log level when neither --verbose nor --quiet is given (quiet, normal, verbose)
    #[arg(long, value_name = "MODE", global = true, env = "EMBER_LOG_MODE")]
    pub log_mode: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Resolve the pre-configuration and configuration for a command line
    Resolve(ResolveCommand),

    /// Show installation prefixes and the module search path
    Paths(PathsCommand),

    /// List the option names a configuration handle accepts
    Names(NamesCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
