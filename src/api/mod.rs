//! Purpose: Define the public Rust API boundary for magicsess.
//! Exports: Session types, configuration, flag/param catalogues, errors, and the one-shot `check`.
//! Role: Public, additive-only surface over `core`.
//! Invariants: `MagicSession`, `MagicCookie`, `check`, and `engine_version` exist only when libmagic links.

pub use crate::core::config::SessionConfig;
pub use crate::core::dispatch::check_with;
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::flags::{Flags, Param, lsmodes, lsparams};
pub use crate::core::magic::Cookie;
pub use crate::core::session::{Capabilities, Session, SessionState};
pub use crate::core::validate::{check_database, check_readable_path};

#[cfg(has_libmagic)]
pub use crate::core::dispatch::check;
#[cfg(has_libmagic)]
pub use crate::core::magic::{MagicCookie, engine_version};

/// A session over the system libmagic.
#[cfg(has_libmagic)]
pub type MagicSession = Session<MagicCookie>;
