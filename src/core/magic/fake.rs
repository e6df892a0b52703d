// Scripted in-memory engine for session and dispatch tests.
//
// Databases are files starting with `FAKEMAGIC`. Directories classify as
// "directory", buffers starting with `%PDF-` as a PDF, empty input as no match.
// The engine drops `DEBUG` from any flags it is given, clamps params to 4096
// and rejects a zero `NAME_MAX`.
use std::cell::Cell;
use std::fs;
use std::path::Path;

use crate::core::error::{Error, ErrorKind};
use crate::core::flags::{Flags, Param};
use crate::core::magic::Cookie;

pub(crate) const DB_HEADER: &[u8] = b"FAKEMAGIC";
pub(crate) const PARAM_CEILING: usize = 4096;

thread_local! {
    static OPENED: Cell<usize> = const { Cell::new(0) };
    static CLOSED: Cell<usize> = const { Cell::new(0) };
    static LOADS: Cell<usize> = const { Cell::new(0) };
    static CLASSIFY_CALLS: Cell<usize> = const { Cell::new(0) };
    static FAIL_NEXT_OPEN: Cell<bool> = const { Cell::new(false) };
    static FAIL_NEXT_LOAD: Cell<bool> = const { Cell::new(false) };
    static FAIL_NEXT_CLASSIFY: Cell<bool> = const { Cell::new(false) };
    static PARAMS_SUPPORTED: Cell<bool> = const { Cell::new(true) };
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Counters {
    pub opened: usize,
    pub closed: usize,
    pub loads: usize,
    pub classify_calls: usize,
}

pub(crate) fn reset() {
    OPENED.with(|c| c.set(0));
    CLOSED.with(|c| c.set(0));
    LOADS.with(|c| c.set(0));
    CLASSIFY_CALLS.with(|c| c.set(0));
    FAIL_NEXT_OPEN.with(|c| c.set(false));
    FAIL_NEXT_LOAD.with(|c| c.set(false));
    FAIL_NEXT_CLASSIFY.with(|c| c.set(false));
    PARAMS_SUPPORTED.with(|c| c.set(true));
}

pub(crate) fn counters() -> Counters {
    Counters {
        opened: OPENED.with(Cell::get),
        closed: CLOSED.with(Cell::get),
        loads: LOADS.with(Cell::get),
        classify_calls: CLASSIFY_CALLS.with(Cell::get),
    }
}

pub(crate) fn fail_next_open() {
    FAIL_NEXT_OPEN.with(|c| c.set(true));
}

/// The next `load` fails after validation has already passed.
pub(crate) fn fail_next_load() {
    FAIL_NEXT_LOAD.with(|c| c.set(true));
}

/// The next classification returns no text and sets an engine error.
pub(crate) fn fail_next_classify() {
    FAIL_NEXT_CLASSIFY.with(|c| c.set(true));
}

pub(crate) fn disable_params() {
    PARAMS_SUPPORTED.with(|c| c.set(false));
}

pub(crate) fn write_db(path: &Path) {
    let mut body = DB_HEADER.to_vec();
    body.extend_from_slice(b"\n0 string %PDF- PDF document\n");
    fs::write(path, body).expect("write fake db");
}

pub(crate) struct FakeCookie {
    flags: Flags,
    loaded: bool,
    indir_max: usize,
    name_max: usize,
}

impl FakeCookie {
    fn describe(&self, raw: &str, mime: &str) -> String {
        if self.flags.contains(Flags::MIME_TYPE) {
            mime.to_string()
        } else {
            raw.to_string()
        }
    }

    fn detect(&self, bytes: &[u8]) -> Option<String> {
        if bytes.is_empty() {
            return None;
        }
        if bytes.starts_with(b"%PDF-") {
            return Some(self.describe("PDF document", "application/pdf"));
        }
        Some(self.describe("data", "application/octet-stream"))
    }

    fn require_loaded(&self) -> Result<(), Error> {
        if FAIL_NEXT_CLASSIFY.with(|c| c.replace(false)) {
            return Err(Error::new(ErrorKind::Engine).with_message("fake classify failed"));
        }
        if self.loaded {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::Engine).with_message("no database loaded"))
        }
    }
}

impl Cookie for FakeCookie {
    fn open(flags: Flags) -> Result<Self, Error> {
        if FAIL_NEXT_OPEN.with(|c| c.replace(false)) {
            return Err(Error::new(ErrorKind::EngineInit).with_message("fake open failed"));
        }
        OPENED.with(|c| c.set(c.get() + 1));
        Ok(Self {
            flags: flags.without(Flags::DEBUG),
            loaded: false,
            indir_max: 15,
            name_max: 50,
        })
    }

    fn version(&self) -> u32 {
        545
    }

    fn check_database(&mut self, path: &Path) -> Result<(), String> {
        let bytes = fs::read(path).map_err(|err| err.to_string())?;
        if bytes.starts_with(DB_HEADER) {
            Ok(())
        } else {
            Err("bad magic header".to_string())
        }
    }

    fn load(&mut self, database: Option<&Path>) -> Result<(), Error> {
        LOADS.with(|c| c.set(c.get() + 1));
        if FAIL_NEXT_LOAD.with(|c| c.replace(false)) {
            self.loaded = false;
            let mut err = Error::new(ErrorKind::EngineLoad).with_message("fake load failed");
            if let Some(path) = database {
                err = err.with_path(path);
            }
            return Err(err);
        }
        if let Some(path) = database {
            self.check_database(path).map_err(|message| {
                Error::new(ErrorKind::EngineLoad)
                    .with_message(message)
                    .with_path(path)
            })?;
        }
        self.loaded = true;
        Ok(())
    }

    fn classify_path(&mut self, path: &Path) -> Result<Option<String>, Error> {
        CLASSIFY_CALLS.with(|c| c.set(c.get() + 1));
        self.require_loaded()?;
        if path.is_dir() {
            return Ok(Some(self.describe("directory", "inode/directory")));
        }
        let bytes = fs::read(path)
            .map_err(|err| Error::new(ErrorKind::Io).with_path(path).with_source(err))?;
        Ok(self.detect(&bytes))
    }

    fn classify_buffer(&mut self, bytes: &[u8]) -> Result<Option<String>, Error> {
        CLASSIFY_CALLS.with(|c| c.set(c.get() + 1));
        self.require_loaded()?;
        Ok(self.detect(bytes))
    }

    fn get_param(&self, param: Param) -> Option<usize> {
        if !PARAMS_SUPPORTED.with(Cell::get) {
            return None;
        }
        match param {
            Param::IndirMax => Some(self.indir_max),
            Param::NameMax => Some(self.name_max),
            _ => None,
        }
    }

    fn set_param(&mut self, param: Param, value: usize) -> bool {
        if !PARAMS_SUPPORTED.with(Cell::get) {
            return false;
        }
        let value = value.min(PARAM_CEILING);
        match param {
            Param::NameMax if value == 0 => return false,
            Param::IndirMax => self.indir_max = value,
            Param::NameMax => self.name_max = value,
            _ => return false,
        }
        true
    }

    fn set_flags(&mut self, flags: Flags) -> bool {
        if flags.contains(Flags::PRESERVE_ATIME) {
            return false;
        }
        self.flags = flags.without(Flags::DEBUG);
        true
    }

    fn flags(&self) -> Flags {
        self.flags
    }

    fn list(&mut self, database: Option<&Path>) -> Result<i32, Error> {
        match database {
            Some(path) if self.check_database(path).is_err() => Ok(-1),
            _ => Ok(0),
        }
    }
}

impl Drop for FakeCookie {
    fn drop(&mut self) {
        CLOSED.with(|c| c.set(c.get() + 1));
    }
}
