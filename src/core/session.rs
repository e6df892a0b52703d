//! Purpose: Own one engine handle and enforce the Open -> Closed lifecycle around it.
//! Exports: `Session`, `SessionState`, `Capabilities`.
//! Role: Single allocation point for handles; every engine call goes through an open session.
//! Invariants: The handle is present iff the state is `Open`; the state is derived from it.
//! Invariants: The handle is released exactly once, by `close` or by `Drop`.
//! Invariants: Closed sessions reject every operation except `close` and inspection.
//! Invariants: Stored flags and params mirror what the engine reports, not what was requested.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::config::SessionConfig;
use crate::core::error::Error;
use crate::core::flags::{Flags, Param};
use crate::core::magic::Cookie;
use crate::core::validate;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    Open,
    Closed,
}

/// Engine features probed once when the session opens.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Capabilities {
    pub version: u32,
    pub params: bool,
}

impl Capabilities {
    fn probe<C: Cookie>(cookie: &C) -> Self {
        Self {
            version: cookie.version(),
            params: cookie.get_param(Param::IndirMax).is_some(),
        }
    }
}

pub struct Session<C: Cookie> {
    cookie: Option<C>,
    config: SessionConfig,
    capabilities: Capabilities,
}

impl<C: Cookie> Session<C> {
    /// Validates `config`, then allocates the handle and applies parameter
    /// overrides. A config that fails validation never allocates.
    pub fn open(mut config: SessionConfig) -> Result<Self, Error> {
        config.validate()?;
        let cookie = C::open(config.flags())?;
        let capabilities = Capabilities::probe(&cookie);
        let requested = config.take_params();

        let mut session = Self {
            cookie: Some(cookie),
            config,
            capabilities,
        };
        let actual = session.cookie_mut()?.flags();
        session.config.set_flags(actual);
        for (param, value) in requested {
            if session.set_param(param, value)?.is_none() {
                debug!(param = param.name(), "parameter override unsupported by engine");
            }
        }

        debug!(
            file = %session.config.file().display(),
            flags = actual.bits(),
            engine_version = capabilities.version,
            "session opened"
        );
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        if self.cookie.is_some() {
            SessionState::Open
        } else {
            SessionState::Closed
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state() == SessionState::Closed
    }

    pub fn file(&self) -> &Path {
        self.config.file()
    }

    pub fn database(&self) -> Option<&Path> {
        self.config.database()
    }

    pub fn flags(&self) -> Flags {
        self.config.flags()
    }

    pub fn params(&self) -> &BTreeMap<Param, usize> {
        self.config.params()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Releases the handle. Later calls are no-ops.
    pub fn close(&mut self) {
        if let Some(cookie) = self.cookie.take() {
            drop(cookie);
            debug!(file = %self.config.file().display(), "session closed");
        }
    }

    /// Stores the database path (`None` restores the engine default), then
    /// checks it. The path stays stored on failure so the next load reports
    /// the same error.
    pub fn set_database_path(&mut self, database: Option<PathBuf>) -> Result<(), Error> {
        let cookie = self.cookie.as_mut().ok_or_else(Error::closed)?;
        self.config.set_database(database)?;
        validate::check_optional_database(cookie, self.config.database())
    }

    pub fn set_file_path(&mut self, file: impl Into<PathBuf>) -> Result<(), Error> {
        self.cookie_mut()?;
        self.config.set_file(file.into())
    }

    /// Validates the configured database (if any) and loads it into the handle.
    pub fn load_database(&mut self) -> Result<(), Error> {
        let cookie = self.cookie.as_mut().ok_or_else(Error::closed)?;
        let database = self.config.database();
        validate::check_optional_database(cookie, database)?;
        cookie.load(database)?;
        debug!(
            database = %database.map_or_else(|| "<default>".into(), |p| p.display().to_string()),
            "database loaded"
        );
        Ok(())
    }

    /// `Ok(None)` when the engine build does not support `param`.
    pub fn get_param(&mut self, param: Param) -> Result<Option<usize>, Error> {
        let supported = self.capabilities.params;
        let cookie = self.cookie_mut()?;
        if !supported {
            return Ok(None);
        }
        Ok(cookie.get_param(param))
    }

    /// Applies `value` and returns the engine's effective value after re-reading it.
    /// Only values the engine accepted are recorded as overrides.
    pub fn set_param(&mut self, param: Param, value: usize) -> Result<Option<usize>, Error> {
        let supported = self.capabilities.params;
        let cookie = self.cookie_mut()?;
        if !supported {
            return Ok(None);
        }
        let accepted = cookie.set_param(param, value);
        let effective = cookie.get_param(param);
        match effective {
            Some(effective) if accepted => self.config.set_param(param, effective),
            _ => {
                debug!(param = param.name(), value, "engine rejected parameter value");
            }
        }
        Ok(effective)
    }

    /// Applies `flags` and returns what the engine reports afterwards.
    /// `Ok(None)` leaves the stored flags untouched.
    pub fn set_flags(&mut self, flags: Flags) -> Result<Option<Flags>, Error> {
        let cookie = self.cookie_mut()?;
        if !cookie.set_flags(flags) {
            debug!(flags = flags.bits(), "engine rejected flags");
            return Ok(None);
        }
        let actual = cookie.flags();
        self.config.set_flags(actual);
        debug!(requested = flags.bits(), actual = actual.bits(), "flags applied");
        Ok(Some(actual))
    }

    /// Asks the engine to dump its signature list to stdout; returns its status (0 = ok).
    pub fn list_signatures(&mut self) -> Result<i32, Error> {
        let cookie = self.cookie.as_mut().ok_or_else(Error::closed)?;
        let database = self.config.database();
        validate::check_optional_database(cookie, database)?;
        cookie.list(database)
    }

    pub(crate) fn cookie_mut(&mut self) -> Result<&mut C, Error> {
        self.cookie.as_mut().ok_or_else(Error::closed)
    }
}

impl<C: Cookie> Drop for Session<C> {
    fn drop(&mut self) {
        if self.cookie.is_some() {
            debug!("closing session on drop");
            self.close();
        }
    }
}
