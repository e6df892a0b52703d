// Session configuration: subject path, optional database, flags, param overrides.
// Pure in-memory state; nothing here touches the filesystem.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::error::{Error, ErrorKind};
use crate::core::flags::{Flags, Param};
use crate::core::validate::path_cstring;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionConfig {
    file: PathBuf,
    database: Option<PathBuf>,
    flags: Flags,
    params: BTreeMap<Param, usize>,
}

impl SessionConfig {
    pub fn new(file: impl Into<PathBuf>) -> Result<Self, Error> {
        let file = file.into();
        validate_file(&file)?;
        Ok(Self {
            file,
            database: None,
            flags: Flags::DEFAULT,
            params: BTreeMap::new(),
        })
    }

    /// Without a database the engine's compiled-in default is used.
    pub fn with_database(mut self, database: impl Into<PathBuf>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_param(mut self, param: Param, value: usize) -> Self {
        self.params.insert(param, value);
        self
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn database(&self) -> Option<&Path> {
        self.database.as_deref()
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn params(&self) -> &BTreeMap<Param, usize> {
        &self.params
    }

    pub fn validate(&self) -> Result<(), Error> {
        validate_file(&self.file)?;
        if let Some(database) = &self.database {
            validate_database(database)?;
        }
        Ok(())
    }

    pub(crate) fn set_file(&mut self, file: PathBuf) -> Result<(), Error> {
        validate_file(&file)?;
        self.file = file;
        Ok(())
    }

    pub(crate) fn set_database(&mut self, database: Option<PathBuf>) -> Result<(), Error> {
        if let Some(path) = &database {
            validate_database(path)?;
        }
        self.database = database;
        Ok(())
    }

    pub(crate) fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }

    pub(crate) fn set_param(&mut self, param: Param, value: usize) {
        self.params.insert(param, value);
    }

    pub(crate) fn take_params(&mut self) -> BTreeMap<Param, usize> {
        std::mem::take(&mut self.params)
    }
}

fn validate_file(file: &Path) -> Result<(), Error> {
    if file.as_os_str().is_empty() {
        return Err(Error::new(ErrorKind::Configuration).with_message("file path is required"));
    }
    path_cstring(file).map(|_| ())
}

fn validate_database(database: &Path) -> Result<(), Error> {
    if database.as_os_str().is_empty() {
        return Err(
            Error::new(ErrorKind::Configuration).with_message("database path must not be empty")
        );
    }
    path_cstring(database).map(|_| ())
}
