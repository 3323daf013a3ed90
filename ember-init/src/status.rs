//! The flattened tri-state outcome of a resolution step.
//!
//! Library functions return [`crate::Result`]; [`Status`] is the value an
//! embedder stores when it cannot carry a typed result around, such as the
//! last-operation state kept by [`crate::ConfigHandle`].

use serde::Serialize;

use crate::error::{Error, Result};

/// Outcome of an operation: ok, error, or a requested exit.
///
/// # Examples
///
/// ```
/// use ember_init::Status;
///
/// let ok = Status::ok();
/// assert!(!ok.is_exceptional());
///
/// let help = Status::exit(0);
/// assert!(help.is_exit());
/// assert!(help.is_exceptional());
/// assert!(!help.is_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Status {
    /// The operation succeeded.
    Ok,
    /// The operation failed.
    Error {
        /// The operation that produced the error, when known.
        func: Option<String>,
        /// Human-readable description.
        message: String,
    },
    /// The operation asked the process to stop with the given code.
    Exit {
        /// Process exit code.
        code: i32,
    },
}

impl Status {
    /// A successful status.
    #[must_use]
    pub const fn ok() -> Self {
        Self::Ok
    }

    /// An error status with no recorded source operation.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            func: None,
            message: message.into(),
        }
    }

    /// The status reported for a failed allocation.
    #[must_use]
    pub fn no_memory() -> Self {
        Self::error(Error::OutOfMemory.to_string())
    }

    /// A requested exit.
    #[must_use]
    pub const fn exit(code: i32) -> Self {
        Self::Exit { code }
    }

    /// Flatten a typed error, recording which operation raised it.
    #[must_use]
    pub fn from_error(func: &str, err: &Error) -> Self {
        match err {
            Error::Exit { code, .. } => Self::Exit { code: *code },
            other => Self::Error {
                func: Some(func.to_string()),
                message: other.to_string(),
            },
        }
    }

    /// Flatten a typed result.
    #[must_use]
    pub fn from_result<T>(func: &str, result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(err) => Self::from_error(func, err),
        }
    }

    /// True for [`Status::Error`].
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// True for [`Status::Exit`].
    #[must_use]
    pub const fn is_exit(&self) -> bool {
        matches!(self, Self::Exit { .. })
    }

    /// True for either an error or an exit; callers use this to abort a
    /// pipeline with one check.
    #[must_use]
    pub const fn is_exceptional(&self) -> bool {
        !matches!(self, Self::Ok)
    }

    /// The error message, if this is an error.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    /// The exit code, if this is an exit.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exit { code } => Some(*code),
            _ => None,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Ok
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Error {
                func: Some(func),
                message,
            } => write!(f, "{func}: {message}"),
            Self::Error { func: None, message } => write!(f, "{message}"),
            Self::Exit { code } => write!(f, "exit({code})"),
        }
    }
}
