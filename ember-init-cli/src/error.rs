//! CLI-specific error types with exit codes.
//!
//! This module defines error types specific to the CLI layer,
//! wrapping library errors and providing appropriate exit codes.

use ember_init::Error as LibError;
use std::fmt;

/// CLI-specific error type with exit code mapping.
#[derive(Debug)]
pub enum CliError {
    /// Library error (wrapped).
    Library(LibError),

    /// Invalid command-line arguments.
    InvalidArguments(String),

    /// I/O error.
    Io(std::io::Error),

    /// Rendering the output failed.
    Serialization(String),

    /// The runtime command line asked to exit (help, version, usage).
    /// Its output has already been printed.
    Exit(i32),
}

impl CliError {
    /// Get the appropriate exit code for this error.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 2: Usage error
    /// - 3: Invalid value
    /// - 4: Other library error
    /// - 5: I/O or serialization error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Exit(code) => *code,
            CliError::InvalidArguments(_) => 2,
            CliError::Library(lib_err) => match lib_err {
                LibError::InvalidValue { .. }
                | LibError::InvalidName { .. }
                | LibError::TypeMismatch { .. }
                | LibError::MutuallyExclusive { .. }
                | LibError::OutOfRange { .. } => 3,
                LibError::Io(_) => 5,
                LibError::Exit { code, .. } => *code,
                _ => 4,
            },
            CliError::Io(_) | CliError::Serialization(_) => 5,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Library(e) => write!(f, "{e}"),
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
            CliError::Serialization(msg) => write!(f, "Cannot render output: {msg}"),
            CliError::Exit(code) => write!(f, "exit requested with code {code}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Library(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LibError> for CliError {
    fn from(e: LibError) -> Self {
        CliError::Library(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
