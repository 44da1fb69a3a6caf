//! Character-set adapter.
//!
//! The splitter and the scanner walk raw bytes; this adapter tells them how
//! many bytes the character under the cursor occupies so that no boundary
//! ever lands inside a multi-byte sequence.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use mysqlscript_error::ScriptError;

/// Character sets the scanner understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    /// UTF-8, up to four bytes per character (`utf8`, `utf8mb3`, `utf8mb4`).
    #[default]
    Utf8,
    /// ISO 8859-1 as extended by the server (`latin1`).
    Latin1,
    /// Seven-bit ASCII.
    Ascii,
    /// Raw bytes, no case folding beyond ASCII.
    Binary,
}

/// Character-set names accepted after a `_` introducer (`_utf8'abc'`).
const KNOWN_CHARSET_NAMES: &[&str] = &[
    "armscii8", "ascii", "big5", "binary", "cp1250", "cp1251", "cp1256", "cp1257", "cp850",
    "cp852", "cp866", "cp932", "dec8", "eucjpms", "euckr", "gb18030", "gb2312", "gbk",
    "geostd8", "greek", "hebrew", "hp8", "keybcs2", "koi8r", "koi8u", "latin1", "latin2",
    "latin5", "latin7", "macce", "macroman", "sjis", "swe7", "tis620", "ucs2", "ujis", "utf16",
    "utf16le", "utf32", "utf8", "utf8mb3", "utf8mb4",
];

impl Charset {
    /// Look up a charset (or collation) name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let base = name.split('_').next().unwrap_or(name).to_ascii_lowercase();
        match base.as_str() {
            "utf8" | "utf8mb3" | "utf8mb4" => Some(Self::Utf8),
            "latin1" => Some(Self::Latin1),
            "ascii" => Some(Self::Ascii),
            "binary" => Some(Self::Binary),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::Latin1 => "latin1",
            Self::Ascii => "ascii",
            Self::Binary => "binary",
        }
    }

    pub const fn is_multibyte(self) -> bool {
        matches!(self, Self::Utf8)
    }

    /// Expected byte length of a character from its lead byte alone.
    ///
    /// Bytes that cannot start a character report 1 so that callers always
    /// make progress.
    pub const fn mb_char_len(self, lead: u8) -> usize {
        match self {
            Self::Utf8 => match lead {
                0xC2..=0xDF => 2,
                0xE0..=0xEF => 3,
                0xF0..=0xF4 => 4,
                _ => 1,
            },
            _ => 1,
        }
    }

    /// Length of the complete, valid multi-byte character at the head of
    /// `bytes`, or 0 when `bytes` does not start with one.
    pub fn mb_len(self, bytes: &[u8]) -> usize {
        if !self.is_multibyte() {
            return 0;
        }
        let Some(&lead) = bytes.first() else {
            return 0;
        };
        let want = self.mb_char_len(lead);
        if want < 2 || bytes.len() < want {
            return 0;
        }
        let second = bytes[1];
        let second_ok = match lead {
            0xE0 => (0xA0..=0xBF).contains(&second),
            0xED => (0x80..=0x9F).contains(&second),
            0xF0 => (0x90..=0xBF).contains(&second),
            0xF4 => (0x80..=0x8F).contains(&second),
            _ => is_continuation(second),
        };
        if second_ok && bytes[2..want].iter().all(|&b| is_continuation(b)) {
            want
        } else {
            0
        }
    }

    /// Byte length of the character at the head of `bytes` (1 for a
    /// single-byte or malformed character, 0 only for empty input).
    pub fn char_len(self, bytes: &[u8]) -> usize {
        if bytes.is_empty() {
            return 0;
        }
        self.mb_len(bytes).max(1)
    }

    /// Number of characters in `bytes`.
    pub fn count_chars(self, bytes: &[u8]) -> usize {
        let mut pos = 0;
        let mut count = 0;
        while pos < bytes.len() {
            pos += self.char_len(&bytes[pos..]);
            count += 1;
        }
        count
    }

    /// Case folding used for keyword comparison.
    pub const fn to_upper(self, byte: u8) -> u8 {
        match self {
            Self::Latin1 if byte >= 0xE0 && byte != 0xF7 && byte != 0xFF => byte - 0x20,
            _ => byte.to_ascii_uppercase(),
        }
    }

    pub fn eq_ignore_case(self, a: &[u8], b: &[u8]) -> bool {
        a.len() == b.len()
            && a
                .iter()
                .zip(b)
                .all(|(&x, &y)| self.to_upper(x) == self.to_upper(y))
    }

    /// Whether `byte` may appear inside an unquoted identifier.
    pub const fn is_ident_byte(self, byte: u8) -> bool {
        byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$' || byte >= 0x80
    }

    /// Whether `name` (without the leading `_`) is a server charset name.
    pub fn is_known_name(name: &str) -> bool {
        KNOWN_CHARSET_NAMES
            .iter()
            .any(|known| known.eq_ignore_ascii_case(name))
    }
}

const fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = ScriptError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::from_name(name).ok_or_else(|| ScriptError::UnknownCharset {
            name: name.to_owned(),
        })
    }
}

impl Serialize for Charset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Accepts any name [`Charset::from_name`] resolves, collations included.
impl<'de> Deserialize<'de> for Charset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}
