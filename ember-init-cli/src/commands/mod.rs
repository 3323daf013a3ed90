//! CLI command implementations.
//!
//! - `resolve`: resolve both configuration records for a command line
//! - `paths`: path discovery only
//! - `names`: list the configuration handle registry
//! - `completions`: shell completion scripts

pub mod completions;
pub mod names;
pub mod paths;
pub mod resolve;

pub use completions::CompletionsCommand;
pub use names::NamesCommand;
pub use paths::PathsCommand;
pub use resolve::ResolveCommand;
