// Core modules implementing validation, engine ownership, sessions, and errors.
pub mod config;
pub mod dispatch;
pub mod error;
pub mod flags;
pub mod magic;
pub mod session;
pub mod validate;
