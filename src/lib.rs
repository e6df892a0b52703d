//! Purpose: Library crate backing the `magicsess` CLI and tests.
//! Exports: `api` (stable surface) and `core` (sessions, validation, engine boundary, errors).
//! Role: Validated, lifecycle-safe access to a libmagic detection handle.
//! Invariants: Nothing reaches the engine without passing the validation pipeline first.
//! Invariants: The library never installs a tracing subscriber; binaries do.
pub mod api;
pub mod core;
