//! Command to list the configuration handle registry.

use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::{Args, ValueEnum};
use ember_init::{ConfigKey, OptionKind};

/// Option kinds accepted by `--kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindFilter {
    /// Integers and booleans
    Int,
    /// Strings
    String,
    /// String lists
    List,
}

impl KindFilter {
    fn matches(self, kind: OptionKind) -> bool {
        matches!(
            (self, kind),
            (Self::Int, OptionKind::Int)
                | (Self::String, OptionKind::Str)
                | (Self::List, OptionKind::StrList)
        )
    }
}

/// List every option name with its kind.
#[derive(Args)]
pub struct NamesCommand {
    /// Only list options of this kind
    #[arg(long, value_enum)]
    pub kind: Option<KindFilter>,
}

impl NamesCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let keys = ConfigKey::ALL
            .iter()
            .filter(|key| self.kind.map_or(true, |kind| kind.matches(key.kind())));

        for key in keys {
            if global.quiet {
                println!("{}", key.name());
            } else {
                println!("{:<28} {}", key.name(), key.kind());
            }
        }
        Ok(())
    }
}
