//! Error types for the ember-init library.
//!
//! Every fallible operation returns [`Result`]. A deliberate early stop
//! (`--help`, `--version`, usage errors) travels through the same channel as
//! [`Error::Exit`] so a multi-step pipeline can abort with a single `?`, while
//! callers can still tell "stop" apart from "fail" via [`Error::is_exit`].

use thiserror::Error;

/// Result type alias for operations that may fail with an ember-init error.
///
/// # Examples
///
/// ```
/// use ember_init::{Error, Result};
///
/// fn example_operation() -> Result<i32> {
///     Ok(2)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the ember-init library.
#[derive(Debug, Error)]
pub enum Error {
    /// An allocation failed while building a value.
    #[error("memory allocation failed")]
    OutOfMemory,

    /// A flag, environment variable or field held a malformed or
    /// out-of-range value.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue {
        /// The field, flag or environment variable at fault.
        field: String,
        /// A description of the problem.
        message: String,
    },

    /// A configuration handle was asked for a name it does not know.
    #[error("unknown configuration option '{name}'")]
    InvalidName {
        /// The unknown name.
        name: String,
    },

    /// A configuration handle accessor did not match the option's type.
    #[error("option '{name}' is of type {found}, not {expected}")]
    TypeMismatch {
        /// The option name.
        name: String,
        /// The kind the caller asked for.
        expected: &'static str,
        /// The kind the option actually has.
        found: &'static str,
    },

    /// Two fields that exclude each other were both set.
    #[error("'{first}' and '{second}' are mutually exclusive")]
    MutuallyExclusive {
        /// The first field that was set.
        first: &'static str,
        /// The second field that was set.
        second: &'static str,
    },

    /// A list index was outside the list.
    #[error("index {index} out of range for list of length {len}")]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The length of the list.
        len: usize,
    },

    /// A configuration handle was modified after it was committed.
    #[error("configuration is read-only after commit")]
    AlreadyCommitted,

    /// The caller asked to stop rather than fail (help, version, usage).
    #[error("exit requested with code {code}")]
    Exit {
        /// The process exit code to use.
        code: i32,
        /// Text the embedder should print before exiting, if any.
        output: Option<ExitOutput>,
    },

    /// An I/O error occurred while probing the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text attached to an early exit, with the stream it belongs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutput {
    /// Informational text for stdout (help, version).
    Stdout(String),
    /// Diagnostic text for stderr (usage errors).
    Stderr(String),
}

impl ExitOutput {
    /// The text regardless of stream.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Stdout(s) | Self::Stderr(s) => s,
        }
    }
}

impl Error {
    /// Shorthand for [`Error::InvalidValue`].
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Check whether this is a requested exit rather than a failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use ember_init::Error;
    ///
    /// let err = Error::Exit { code: 0, output: None };
    /// assert!(err.is_exit());
    /// assert!(!Error::OutOfMemory.is_exit());
    /// ```
    #[must_use]
    pub fn is_exit(&self) -> bool {
        matches!(self, Self::Exit { .. })
    }

    /// The exit code carried by an [`Error::Exit`], if any.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exit { code, .. } => Some(*code),
            _ => None,
        }
    }
}
