//! Installation path discovery.
//!
//! Given the running executable, the runtime has to find its own standard
//! library. It does so by looking for *landmarks*: files or directories
//! that only exist inside an installation tree.
//!
//! # Search
//!
//! Starting at the executable's directory (after following symlinks), the
//! directory itself, its parent and its grandparent are tried in that
//! order:
//!
//! - the first one holding `lib/ember<VER>/os.em` becomes `prefix`
//! - the first one holding `<platlibdir>/ember<VER>/lib-dynload` becomes
//!   `exec_prefix`
//!
//! The two searches are independent. A virtual environment (`ember.cfg`
//! next to the executable or one level up) redirects the search to the
//! base installation named by its `home` key. A `home` override skips
//! all of this, virtual environment detection included.
//!
//! # Search path
//!
//! The module search path is the standard library directory, then the
//! platform library directory, then every `EMBER_PATH` entry. Duplicates
//! are dropped in place, keeping the first occurrence.
//!
//! # Testing
//!
//! All filesystem access goes through [`FileProbe`], so discovery can run
//! against an in-memory tree or a mock.

pub mod layout;
pub mod probe;
pub mod resolver;
pub mod venv;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use layout::{InstallLayout, RUNTIME_VERSION};
pub use probe::{FileProbe, OsProbe};
pub use resolver::{PathOutputs, PathResolver};
pub use venv::VirtualEnv;
