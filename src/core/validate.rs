// Filesystem and database checks run before any path crosses into the engine.
// Each check returns a typed error instead of a boolean; nothing here mutates.
use std::ffi::CString;
use std::fs;
use std::io;
use std::path::Path;

use libc::{EACCES, ENOENT, ENOTDIR, EPERM, F_OK, R_OK};

use crate::core::error::{Error, ErrorKind};
use crate::core::magic::Cookie;

/// Fails with `NotFound` when `path` is missing and `Unreadable` when the
/// current process cannot read it.
pub fn check_readable_path(path: &Path) -> Result<(), Error> {
    let c_path = path_cstring(path)?;
    access(&c_path, F_OK).map_err(|err| match err.raw_os_error() {
        Some(ENOENT) | Some(ENOTDIR) => not_found(path),
        Some(EACCES) | Some(EPERM) => unreadable(path),
        _ => Error::new(ErrorKind::Io).with_path(path).with_source(err),
    })?;
    access(&c_path, R_OK).map_err(|_| unreadable(path))
}

/// Runs the database checks in order: existence, directory, readability,
/// then the engine's structural check against `cookie`'s current flags.
pub fn check_database<C: Cookie>(cookie: &mut C, path: &Path) -> Result<(), Error> {
    let meta = fs::metadata(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => not_found(path),
        io::ErrorKind::PermissionDenied => unreadable(path),
        _ => Error::new(ErrorKind::Io).with_path(path).with_source(err),
    })?;
    if meta.is_dir() {
        return Err(Error::new(ErrorKind::IsDirectory)
            .with_message("database is a directory")
            .with_path(path));
    }
    let c_path = path_cstring(path)?;
    access(&c_path, R_OK).map_err(|_| unreadable(path))?;

    cookie.check_database(path).map_err(|diagnostic| {
        Error::new(ErrorKind::InvalidDatabase)
            .with_message(format!(
                "{diagnostic} ({} is not a valid magic file)",
                path.display()
            ))
            .with_path(path)
    })
}

/// Engine default databases are trusted; only explicit paths are checked.
pub fn check_optional_database<C: Cookie>(
    cookie: &mut C,
    path: Option<&Path>,
) -> Result<(), Error> {
    match path {
        Some(path) => check_database(cookie, path),
        None => Ok(()),
    }
}

pub(crate) fn path_cstring(path: &Path) -> Result<CString, Error> {
    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        path.as_os_str().as_bytes().to_vec()
    };
    #[cfg(not(unix))]
    let bytes = path
        .to_str()
        .ok_or_else(|| {
            Error::new(ErrorKind::Configuration)
                .with_message("path is not valid UTF-8")
                .with_path(path)
        })?
        .as_bytes()
        .to_vec();

    CString::new(bytes).map_err(|err| {
        Error::new(ErrorKind::Configuration)
            .with_message("path contains NUL")
            .with_path(path)
            .with_source(err)
    })
}

fn access(path: &CString, mode: libc::c_int) -> io::Result<()> {
    if mode == R_OK && read_denied_in_tests(path) {
        return Err(io::Error::from_raw_os_error(EACCES));
    }
    let ret = unsafe { libc::access(path.as_ptr(), mode) };
    if ret == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(test)]
fn read_denied_in_tests(path: &CString) -> bool {
    read_denied::contains(path)
}

#[cfg(not(test))]
fn read_denied_in_tests(_path: &CString) -> bool {
    false
}

fn not_found(path: &Path) -> Error {
    Error::new(ErrorKind::NotFound)
        .with_message("no such file or directory")
        .with_path(path)
}

fn unreadable(path: &Path) -> Error {
    Error::new(ErrorKind::Unreadable)
        .with_message("permission denied")
        .with_path(path)
}
