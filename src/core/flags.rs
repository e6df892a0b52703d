//! Purpose: Named libmagic flag bits and tunable parameter ids.
//! Exports: `Flags`, `Param`, `lsmodes`, `lsparams`.
//! Role: Single catalogue used by config parsing, the engine boundary, and the CLI.
//! Invariants: Values match `<magic.h>`; the catalogues are enumerable by name.
//! Invariants: Text parsing accepts `MAGIC_`-prefixed or bare names and numeric forms.
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use crate::core::error::{Error, ErrorKind};

/// Detection-mode bitmask passed to `magic_open`/`magic_setflags`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Flags(u32);

impl Flags {
    pub const NONE: Flags = Flags(0x000_0000);
    pub const DEBUG: Flags = Flags(0x000_0001);
    pub const SYMLINK: Flags = Flags(0x000_0002);
    pub const COMPRESS: Flags = Flags(0x000_0004);
    pub const DEVICES: Flags = Flags(0x000_0008);
    pub const MIME_TYPE: Flags = Flags(0x000_0010);
    pub const CONTINUE: Flags = Flags(0x000_0020);
    pub const CHECK: Flags = Flags(0x000_0040);
    pub const PRESERVE_ATIME: Flags = Flags(0x000_0080);
    pub const RAW: Flags = Flags(0x000_0100);
    pub const ERROR: Flags = Flags(0x000_0200);
    pub const MIME_ENCODING: Flags = Flags(0x000_0400);
    pub const MIME: Flags = Flags(Self::MIME_TYPE.0 | Self::MIME_ENCODING.0);
    pub const APPLE: Flags = Flags(0x000_0800);
    pub const EXTENSION: Flags = Flags(0x100_0000);
    pub const COMPRESS_TRANSP: Flags = Flags(0x200_0000);
    pub const NO_CHECK_COMPRESS: Flags = Flags(0x000_1000);
    pub const NO_CHECK_TAR: Flags = Flags(0x000_2000);
    pub const NO_CHECK_SOFT: Flags = Flags(0x000_4000);
    pub const NO_CHECK_APPTYPE: Flags = Flags(0x000_8000);
    pub const NO_CHECK_ELF: Flags = Flags(0x001_0000);
    pub const NO_CHECK_TEXT: Flags = Flags(0x002_0000);
    pub const NO_CHECK_CDF: Flags = Flags(0x004_0000);
    pub const NO_CHECK_CSV: Flags = Flags(0x008_0000);
    pub const NO_CHECK_TOKENS: Flags = Flags(0x010_0000);
    pub const NO_CHECK_ENCODING: Flags = Flags(0x020_0000);
    pub const NO_CHECK_JSON: Flags = Flags(0x040_0000);

    /// MIME output, checked parsing, symlink following (1106).
    pub const DEFAULT: Flags = Flags(Self::MIME.0 | Self::CHECK.0 | Self::SYMLINK.0);

    pub const NAMED: [(&'static str, Flags); 27] = [
        ("MAGIC_NONE", Self::NONE),
        ("MAGIC_DEBUG", Self::DEBUG),
        ("MAGIC_SYMLINK", Self::SYMLINK),
        ("MAGIC_COMPRESS", Self::COMPRESS),
        ("MAGIC_DEVICES", Self::DEVICES),
        ("MAGIC_MIME_TYPE", Self::MIME_TYPE),
        ("MAGIC_MIME_ENCODING", Self::MIME_ENCODING),
        ("MAGIC_MIME", Self::MIME),
        ("MAGIC_CONTINUE", Self::CONTINUE),
        ("MAGIC_CHECK", Self::CHECK),
        ("MAGIC_PRESERVE_ATIME", Self::PRESERVE_ATIME),
        ("MAGIC_RAW", Self::RAW),
        ("MAGIC_ERROR", Self::ERROR),
        ("MAGIC_APPLE", Self::APPLE),
        ("MAGIC_EXTENSION", Self::EXTENSION),
        ("MAGIC_COMPRESS_TRANSP", Self::COMPRESS_TRANSP),
        ("MAGIC_NO_CHECK_APPTYPE", Self::NO_CHECK_APPTYPE),
        ("MAGIC_NO_CHECK_CDF", Self::NO_CHECK_CDF),
        ("MAGIC_NO_CHECK_COMPRESS", Self::NO_CHECK_COMPRESS),
        ("MAGIC_NO_CHECK_ELF", Self::NO_CHECK_ELF),
        ("MAGIC_NO_CHECK_ENCODING", Self::NO_CHECK_ENCODING),
        ("MAGIC_NO_CHECK_SOFT", Self::NO_CHECK_SOFT),
        ("MAGIC_NO_CHECK_TAR", Self::NO_CHECK_TAR),
        ("MAGIC_NO_CHECK_TEXT", Self::NO_CHECK_TEXT),
        ("MAGIC_NO_CHECK_TOKENS", Self::NO_CHECK_TOKENS),
        ("MAGIC_NO_CHECK_JSON", Self::NO_CHECK_JSON),
        ("MAGIC_NO_CHECK_CSV", Self::NO_CHECK_CSV),
    ];

    pub const fn from_bits(bits: u32) -> Self {
        Flags(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn without(self, other: Flags) -> Self {
        Flags(self.0 & !other.0)
    }

    pub fn by_name(name: &str) -> Option<Flags> {
        let wanted = name.trim().to_ascii_uppercase();
        let wanted = wanted.strip_prefix("MAGIC_").unwrap_or(&wanted);
        Self::NAMED
            .iter()
            .find(|(named, _)| named.strip_prefix("MAGIC_") == Some(wanted))
            .map(|(_, flags)| *flags)
    }
}

impl Default for Flags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Flags {
    type Err = Error;

    /// Accepts `1106`, `0x452`, or `|`-separated names such as `MAGIC_MIME|raw`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::new(ErrorKind::Configuration).with_message("flags are empty"));
        }
        let mut flags = Flags::NONE;
        for part in text.split('|') {
            let part = part.trim();
            flags |= match parse_unsigned(part) {
                Some(bits) => {
                    let bits = u32::try_from(bits).map_err(|err| {
                        Error::new(ErrorKind::Configuration)
                            .with_message(format!("flags out of range: {part}"))
                            .with_source(err)
                    })?;
                    Flags(bits)
                }
                None => Flags::by_name(part).ok_or_else(|| {
                    Error::new(ErrorKind::Configuration)
                        .with_message(format!("unknown flag: {part}"))
                })?,
            };
        }
        Ok(flags)
    }
}

/// Engine-tunable limits read and written through `magic_getparam`/`magic_setparam`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Param {
    IndirMax,
    NameMax,
    ElfPhnumMax,
    ElfShnumMax,
    ElfNotesMax,
    RegexMax,
    BytesMax,
}

impl Param {
    pub const ALL: [Param; 7] = [
        Param::IndirMax,
        Param::NameMax,
        Param::ElfPhnumMax,
        Param::ElfShnumMax,
        Param::ElfNotesMax,
        Param::RegexMax,
        Param::BytesMax,
    ];

    pub const fn id(self) -> i32 {
        match self {
            Param::IndirMax => 0,
            Param::NameMax => 1,
            Param::ElfPhnumMax => 2,
            Param::ElfShnumMax => 3,
            Param::ElfNotesMax => 4,
            Param::RegexMax => 5,
            Param::BytesMax => 6,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Param::IndirMax => "MAGIC_PARAM_INDIR_MAX",
            Param::NameMax => "MAGIC_PARAM_NAME_MAX",
            Param::ElfPhnumMax => "MAGIC_PARAM_ELF_PHNUM_MAX",
            Param::ElfShnumMax => "MAGIC_PARAM_ELF_SHNUM_MAX",
            Param::ElfNotesMax => "MAGIC_PARAM_ELF_NOTES_MAX",
            Param::RegexMax => "MAGIC_PARAM_REGEX_MAX",
            Param::BytesMax => "MAGIC_PARAM_BYTES_MAX",
        }
    }

    pub fn from_id(id: i32) -> Option<Param> {
        Self::ALL.into_iter().find(|param| param.id() == id)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Param {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if let Some(id) = parse_unsigned(text) {
            return i32::try_from(id)
                .ok()
                .and_then(Param::from_id)
                .ok_or_else(|| {
                    Error::new(ErrorKind::Configuration)
                        .with_message(format!("unknown parameter id: {text}"))
                });
        }
        let wanted = text.to_ascii_uppercase();
        let wanted = wanted.strip_prefix("MAGIC_PARAM_").unwrap_or(&wanted);
        Self::ALL
            .into_iter()
            .find(|param| param.name().strip_prefix("MAGIC_PARAM_") == Some(wanted))
            .ok_or_else(|| {
                Error::new(ErrorKind::Configuration)
                    .with_message(format!("unknown parameter: {text}"))
            })
    }
}

pub fn lsmodes() -> BTreeMap<&'static str, u32> {
    Flags::NAMED
        .iter()
        .map(|(name, flags)| (*name, flags.bits()))
        .collect()
}

pub fn lsparams() -> BTreeMap<&'static str, i32> {
    Param::ALL
        .into_iter()
        .map(|param| (param.name(), param.id()))
        .collect()
}

fn parse_unsigned(text: &str) -> Option<u64> {
    if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).ok();
    }
    if text.chars().all(|c| c.is_ascii_digit()) && !text.is_empty() {
        return text.parse().ok();
    }
    None
}
