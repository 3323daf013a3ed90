//! Build script for ember-init-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
fn build_cli() -> Command {
    Command::new("ember-init")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect the startup configuration of the ember runtime")
        .long_about(
            "Resolve and display the configuration, installation prefixes and module \
             search path the ember runtime would start with",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-mode")
                .long("log-mode")
                .help("Log level when neither --verbose nor --quiet is given")
                .value_name("MODE")
                .global(true)
                .env("EMBER_LOG_MODE"),
        )
        .subcommands(vec![
            Command::new("resolve")
                .about("Resolve the pre-configuration and configuration for a command line")
                .long_about(
                    "Resolve both configuration records against the live environment, \
                     using the arguments after -- as the runtime command line",
                ),
            Command::new("paths")
                .about("Show installation prefixes and the module search path")
                .long_about("Run landmark-based path discovery and print its results"),
            Command::new("names")
                .about("List the option names a configuration handle accepts")
                .long_about("Print every configuration handle option with its kind"),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("ember-init.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}
