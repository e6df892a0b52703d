//! Purpose: Boundary between sessions and the foreign detection engine.
//! Exports: `Cookie` (engine operations), `MagicCookie` and `engine_version` when libmagic links.
//! Role: Everything past this trait is a black box that classifies bytes or paths.
//! Invariants: A cookie value owns exactly one engine handle; dropping it releases the handle.
//! Invariants: All FFI interaction is confined to `libmagic` + `sys`.
use std::path::Path;

use crate::core::error::Error;
use crate::core::flags::{Flags, Param};

#[cfg(has_libmagic)]
mod libmagic;
#[cfg(has_libmagic)]
pub mod sys;

#[cfg(test)]
pub(crate) mod fake;

#[cfg(has_libmagic)]
pub use libmagic::{MagicCookie, engine_version, engine_version_raw};

/// An owned engine handle.
///
/// Implementations release the handle in `Drop`, so a cookie can never be
/// used after release and is released exactly once.
pub trait Cookie: Sized {
    /// Allocates a handle configured with `flags`.
    fn open(flags: Flags) -> Result<Self, Error>;

    /// Engine version encoded as `major * 100 + minor` (e.g. 545).
    fn version(&self) -> u32;

    /// Structural check of a database file; `Err` carries the engine diagnostic.
    fn check_database(&mut self, path: &Path) -> Result<(), String>;

    /// Loads `database`, or the compiled-in default when `None`.
    fn load(&mut self, database: Option<&Path>) -> Result<(), Error>;

    /// `Ok(None)` means the engine produced no match without reporting an error.
    fn classify_path(&mut self, path: &Path) -> Result<Option<String>, Error>;

    fn classify_buffer(&mut self, bytes: &[u8]) -> Result<Option<String>, Error>;

    /// `None` when this engine build does not support `param`.
    fn get_param(&self, param: Param) -> Option<usize>;

    /// Returns false when the engine rejected the parameter.
    fn set_param(&mut self, param: Param, value: usize) -> bool;

    /// Returns false when the engine rejected the flags.
    fn set_flags(&mut self, flags: Flags) -> bool;

    fn flags(&self) -> Flags;

    /// Dumps the signature set to stdout and returns the engine status.
    fn list(&mut self, database: Option<&Path>) -> Result<i32, Error>;
}
