// Closed error taxonomy shared by validation, session, and dispatch code.
use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Required configuration missing or malformed.
    Configuration,
    NotFound,
    Unreadable,
    IsDirectory,
    /// Database failed the engine's structural check.
    InvalidDatabase,
    SessionClosed,
    EngineInit,
    EngineLoad,
    /// Engine reported a failure while classifying or listing.
    Engine,
    Io,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Configuration => "Configuration",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Unreadable => "Unreadable",
            ErrorKind::IsDirectory => "IsDirectory",
            ErrorKind::InvalidDatabase => "InvalidDatabase",
            ErrorKind::SessionClosed => "SessionClosed",
            ErrorKind::EngineInit => "EngineInit",
            ErrorKind::EngineLoad => "EngineLoad",
            ErrorKind::Engine => "Engine",
            ErrorKind::Io => "Io",
        }
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    path: Option<PathBuf>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            path: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub(crate) fn closed() -> Self {
        Self::new(ErrorKind::SessionClosed).with_message("session is closed")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.as_str())?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Engine => 1,
        ErrorKind::Configuration => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Unreadable => 4,
        ErrorKind::IsDirectory => 5,
        ErrorKind::InvalidDatabase => 6,
        ErrorKind::SessionClosed => 7,
        ErrorKind::EngineInit => 8,
        ErrorKind::EngineLoad => 9,
        ErrorKind::Io => 10,
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind, to_exit_code};

    #[test]
    fn exit_code_mapping_is_stable() {
        let cases = [
            (ErrorKind::Engine, 1),
            (ErrorKind::Configuration, 2),
            (ErrorKind::NotFound, 3),
            (ErrorKind::Unreadable, 4),
            (ErrorKind::IsDirectory, 5),
            (ErrorKind::InvalidDatabase, 6),
            (ErrorKind::SessionClosed, 7),
            (ErrorKind::EngineInit, 8),
            (ErrorKind::EngineLoad, 9),
            (ErrorKind::Io, 10),
        ];

        for (kind, code) in cases {
            assert_eq!(to_exit_code(kind), code);
        }
    }

    #[test]
    fn display_includes_message_and_path() {
        let err = Error::new(ErrorKind::IsDirectory)
            .with_message("database is a directory")
            .with_path("/tmp/magic");
        assert_eq!(
            err.to_string(),
            "IsDirectory: database is a directory (path: /tmp/magic)"
        );
        assert_eq!(err.message(), Some("database is a directory"));
    }

    #[test]
    fn source_is_exposed() {
        use std::error::Error as _;
        let io = std::io::Error::other("boom");
        let err = Error::new(ErrorKind::Io).with_source(io);
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".to_string()));
    }
}
