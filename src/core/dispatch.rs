// Classification requests issued through an open session.
// Every request re-validates and reloads the database before asking the engine.
use std::path::Path;

use crate::core::config::SessionConfig;
use crate::core::error::Error;
use crate::core::magic::Cookie;
use crate::core::session::Session;
use crate::core::validate;

impl<C: Cookie> Session<C> {
    /// Classifies the session's subject file. `Ok(None)` means no match.
    pub fn classify_file(&mut self) -> Result<Option<String>, Error> {
        let file = self.file().to_path_buf();
        self.classify_path(&file)
    }

    /// Classifies `path` instead of the configured subject.
    pub fn classify_path(&mut self, path: &Path) -> Result<Option<String>, Error> {
        self.cookie_mut()?;
        validate::check_readable_path(path)?;
        self.load_database()?;
        self.cookie_mut()?.classify_path(path)
    }

    /// Classifies an in-memory buffer using its full length.
    pub fn classify_buffer(&mut self, bytes: &[u8]) -> Result<Option<String>, Error> {
        self.load_database()?;
        self.cookie_mut()?.classify_buffer(bytes)
    }
}

/// One-shot open, classify, close. The handle is released on every path.
pub fn check_with<C: Cookie>(config: SessionConfig) -> Result<Option<String>, Error> {
    let mut session = Session::<C>::open(config)?;
    let result = session.classify_file();
    session.close();
    result
}

/// [`check_with`] against libmagic.
#[cfg(has_libmagic)]
pub fn check(config: SessionConfig) -> Result<Option<String>, Error> {
    check_with::<crate::core::magic::MagicCookie>(config)
}
