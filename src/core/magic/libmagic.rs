// Safe `Cookie` implementation over a libmagic `magic_t`.
use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};
use std::path::Path;
use std::ptr::{self, NonNull};

use crate::core::error::{Error, ErrorKind};
use crate::core::flags::{Flags, Param};
use crate::core::magic::{Cookie, sys};
use crate::core::validate::path_cstring;

pub struct MagicCookie {
    raw: NonNull<sys::magic_set>,
}

// A cookie may move between threads; it is never shared (`!Sync`).
unsafe impl Send for MagicCookie {}

impl MagicCookie {
    fn as_ptr(&self) -> sys::magic_t {
        self.raw.as_ptr()
    }

    fn last_error(&self) -> Option<String> {
        let ptr = unsafe { sys::magic_error(self.as_ptr()) };
        copy_c_str(ptr)
    }

    fn text_result(&self, ptr: *const c_char, what: &str) -> Result<Option<String>, Error> {
        if let Some(text) = copy_c_str(ptr) {
            return Ok(Some(text));
        }
        match self.last_error() {
            Some(message) => Err(Error::new(ErrorKind::Engine)
                .with_message(format!("{what}: {message}"))),
            None => Ok(None),
        }
    }
}

impl Cookie for MagicCookie {
    fn open(flags: Flags) -> Result<Self, Error> {
        let raw = unsafe { sys::magic_open(flags.bits() as c_int) };
        NonNull::new(raw).map(|raw| Self { raw }).ok_or_else(|| {
            Error::new(ErrorKind::EngineInit)
                .with_message("magic_open failed")
                .with_source(std::io::Error::last_os_error())
        })
    }

    fn version(&self) -> u32 {
        engine_version_raw()
    }

    fn check_database(&mut self, path: &Path) -> Result<(), String> {
        let c_path = path_cstring(path).map_err(|err| err.to_string())?;
        let status = unsafe { sys::magic_check(self.as_ptr(), c_path.as_ptr()) };
        if status == 0 {
            return Ok(());
        }
        Err(self
            .last_error()
            .unwrap_or_else(|| "magic_check failed".to_string()))
    }

    fn load(&mut self, database: Option<&Path>) -> Result<(), Error> {
        let c_path = database.map(path_cstring).transpose()?;
        let c_ptr = c_path.as_ref().map_or(ptr::null(), |path| path.as_ptr());
        let status = unsafe { sys::magic_load(self.as_ptr(), c_ptr) };
        if status == 0 {
            return Ok(());
        }
        let mut err = Error::new(ErrorKind::EngineLoad).with_message(
            self.last_error()
                .unwrap_or_else(|| "magic_load failed".to_string()),
        );
        if let Some(path) = database {
            err = err.with_path(path);
        }
        Err(err)
    }

    fn classify_path(&mut self, path: &Path) -> Result<Option<String>, Error> {
        let c_path = path_cstring(path)?;
        let ptr = unsafe { sys::magic_file(self.as_ptr(), c_path.as_ptr()) };
        self.text_result(ptr, "magic_file")
            .map_err(|err| err.with_path(path))
    }

    fn classify_buffer(&mut self, bytes: &[u8]) -> Result<Option<String>, Error> {
        let ptr = unsafe {
            sys::magic_buffer(self.as_ptr(), bytes.as_ptr() as *const c_void, bytes.len())
        };
        self.text_result(ptr, "magic_buffer")
    }

    fn get_param(&self, param: Param) -> Option<usize> {
        let mut value: usize = 0;
        let status = unsafe {
            sys::magic_getparam(
                self.as_ptr(),
                param.id() as c_int,
                &mut value as *mut usize as *mut c_void,
            )
        };
        (status == 0).then_some(value)
    }

    fn set_param(&mut self, param: Param, value: usize) -> bool {
        let status = unsafe {
            sys::magic_setparam(
                self.as_ptr(),
                param.id() as c_int,
                &value as *const usize as *const c_void,
            )
        };
        status == 0
    }

    fn set_flags(&mut self, flags: Flags) -> bool {
        unsafe { sys::magic_setflags(self.as_ptr(), flags.bits() as c_int) == 0 }
    }

    fn flags(&self) -> Flags {
        let bits = unsafe { sys::magic_getflags(self.as_ptr()) };
        Flags::from_bits(bits as u32)
    }

    fn list(&mut self, database: Option<&Path>) -> Result<i32, Error> {
        let c_path = database.map(path_cstring).transpose()?;
        let c_ptr = c_path.as_ref().map_or(ptr::null(), |path| path.as_ptr());
        Ok(unsafe { sys::magic_list(self.as_ptr(), c_ptr) })
    }
}

impl Drop for MagicCookie {
    fn drop(&mut self) {
        unsafe { sys::magic_close(self.as_ptr()) };
    }
}

/// Raw libmagic version, e.g. 545 for 5.45.
pub fn engine_version_raw() -> u32 {
    let version = unsafe { sys::magic_version() };
    u32::try_from(version).unwrap_or(0)
}

/// libmagic version formatted as `major.minor`.
pub fn engine_version() -> String {
    let raw = engine_version_raw();
    format!("{}.{:02}", raw / 100, raw % 100)
}

fn copy_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let text = unsafe { CStr::from_ptr(ptr) };
    Some(text.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::{MagicCookie, engine_version};
    use crate::core::error::ErrorKind;
    use crate::core::flags::{Flags, Param};
    use crate::core::magic::Cookie;
    use std::path::Path;

    #[test]
    fn version_is_formatted_major_minor() {
        let version = engine_version();
        let (major, minor) = version.split_once('.').expect("dot");
        assert!(major.parse::<u32>().expect("major") >= 5);
        assert_eq!(minor.len(), 2);
    }

    #[test]
    fn buffer_uses_full_length() {
        let mut cookie = MagicCookie::open(Flags::MIME_TYPE).expect("open");
        cookie.load(None).expect("load");
        let result = cookie
            .classify_buffer(b"%PDF-1.3\r\n")
            .expect("classify")
            .expect("match");
        assert_eq!(result, "application/pdf");
    }

    #[test]
    fn flags_are_read_back_from_engine() {
        let mut cookie = MagicCookie::open(Flags::DEFAULT).expect("open");
        assert_eq!(cookie.flags(), Flags::DEFAULT);
        assert!(cookie.set_flags(Flags::RAW));
        assert_eq!(cookie.flags(), Flags::RAW);
    }

    #[test]
    fn name_max_param_round_trips() {
        let mut cookie = MagicCookie::open(Flags::DEFAULT).expect("open");
        let Some(before) = cookie.get_param(Param::NameMax) else {
            return;
        };
        assert!(cookie.set_param(Param::NameMax, before + 1));
        assert_eq!(cookie.get_param(Param::NameMax), Some(before + 1));
    }

    #[test]
    fn missing_database_fails_load() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("missing.mgc");
        let mut cookie = MagicCookie::open(Flags::DEFAULT).expect("open");
        let err = cookie.load(Some(&missing)).expect_err("missing db");
        assert_eq!(err.kind(), ErrorKind::EngineLoad);
        assert_eq!(err.path(), Some(missing.as_path()));
        assert!(err.message().is_some());
    }

    #[test]
    fn unreadable_subject_is_an_engine_error_under_magic_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("missing.bin");
        let mut cookie = MagicCookie::open(Flags::MIME | Flags::ERROR).expect("open");
        cookie.load(None).expect("load");
        let err = cookie.classify_path(&missing).expect_err("missing subject");
        assert_eq!(err.kind(), ErrorKind::Engine);
        assert_eq!(err.path(), Some(missing.as_path()));
        assert!(err.message().expect("message").starts_with("magic_file: "));
    }

    #[test]
    fn list_rejects_nul_database_path() {
        let mut cookie = MagicCookie::open(Flags::DEFAULT).expect("open");
        let err = cookie
            .list(Some(Path::new("bad\0db")))
            .expect_err("nul path");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
