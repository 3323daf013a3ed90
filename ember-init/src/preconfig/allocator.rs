//! Memory allocator selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which memory allocator the runtime installs before any allocation.
///
/// Only the selection is made here; the allocators themselves live in the
/// runtime.
///
/// # Examples
///
/// ```
/// use ember_init::Allocator;
///
/// let allocator: Allocator = "malloc_debug".parse().unwrap();
/// assert_eq!(allocator, Allocator::MallocDebug);
/// assert!(allocator.has_debug_hooks());
/// assert!("jemalloc".parse::<Allocator>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Allocator {
    /// The build's default allocator.
    Default,
    /// The default allocator with debug hooks installed.
    Debug,
    /// The C library `malloc`.
    Malloc,
    /// `malloc` with debug hooks.
    MallocDebug,
    /// The runtime's small-object allocator.
    Pymalloc,
    /// The small-object allocator with debug hooks.
    PymallocDebug,
    /// mimalloc.
    Mimalloc,
    /// mimalloc with debug hooks.
    MimallocDebug,
}

impl Allocator {
    /// Every allocator, in registry order.
    pub const ALL: [Self; 8] = [
        Self::Default,
        Self::Debug,
        Self::Malloc,
        Self::MallocDebug,
        Self::Pymalloc,
        Self::PymallocDebug,
        Self::Mimalloc,
        Self::MimallocDebug,
    ];

    /// The name accepted by `EMBER_MALLOC`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Debug => "debug",
            Self::Malloc => "malloc",
            Self::MallocDebug => "malloc_debug",
            Self::Pymalloc => "pymalloc",
            Self::PymallocDebug => "pymalloc_debug",
            Self::Mimalloc => "mimalloc",
            Self::MimallocDebug => "mimalloc_debug",
        }
    }

    /// Whether debug hooks wrap this allocator.
    #[must_use]
    pub const fn has_debug_hooks(self) -> bool {
        matches!(
            self,
            Self::Debug | Self::MallocDebug | Self::PymallocDebug | Self::MimallocDebug
        )
    }

    /// Stable integer code used by the configuration handle.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Default => 1,
            Self::Debug => 2,
            Self::Malloc => 3,
            Self::MallocDebug => 4,
            Self::Pymalloc => 5,
            Self::PymallocDebug => 6,
            Self::Mimalloc => 7,
            Self::MimallocDebug => 8,
        }
    }

    /// Inverse of [`Allocator::code`].
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.code() == code)
    }
}

impl fmt::Display for Allocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Allocator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| Error::invalid_value("allocator", format!("unknown allocator '{s}'")))
    }
}
