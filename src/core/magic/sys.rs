// Raw FFI bindings to libmagic (`<magic.h>`).
#![allow(non_camel_case_types)]
use std::os::raw::{c_char, c_int, c_void};

#[repr(C)]
pub struct magic_set {
    _private: [u8; 0],
}

pub type magic_t = *mut magic_set;

unsafe extern "C" {
    pub fn magic_open(flags: c_int) -> magic_t;

    pub fn magic_close(cookie: magic_t);

    pub fn magic_error(cookie: magic_t) -> *const c_char;

    pub fn magic_errno(cookie: magic_t) -> c_int;

    pub fn magic_file(cookie: magic_t, filename: *const c_char) -> *const c_char;

    pub fn magic_buffer(cookie: magic_t, buffer: *const c_void, length: usize) -> *const c_char;

    pub fn magic_getflags(cookie: magic_t) -> c_int;

    pub fn magic_setflags(cookie: magic_t, flags: c_int) -> c_int;

    pub fn magic_version() -> c_int;

    pub fn magic_load(cookie: magic_t, filename: *const c_char) -> c_int;

    pub fn magic_check(cookie: magic_t, filename: *const c_char) -> c_int;

    pub fn magic_list(cookie: magic_t, filename: *const c_char) -> c_int;

    pub fn magic_setparam(cookie: magic_t, param: c_int, value: *const c_void) -> c_int;

    pub fn magic_getparam(cookie: magic_t, param: c_int, value: *mut c_void) -> c_int;
}
