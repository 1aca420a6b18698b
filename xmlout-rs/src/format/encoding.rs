//! Output character encodings understood by the byte-oriented outputters.

use std::sync::Arc;

use super::escape::{Bits7Escape, Bits8Escape, EscapeStrategy, UnicodeEscape};
use crate::error::{Error, Result};

/// An encoding the text outputter can produce bytes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    /// Big endian, written with a byte order mark.
    Utf16,
    Ascii,
    Latin1,
}

impl Encoding {
    /// Looks an encoding up by its IANA name or a common alias.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().replace('_', "-").as_str() {
            "UTF-8" | "UTF8" => Some(Encoding::Utf8),
            "UTF-16" | "UTF16" | "UTF-16BE" => Some(Encoding::Utf16),
            "US-ASCII" | "ASCII" => Some(Encoding::Ascii),
            "ISO-8859-1" | "ISO8859-1" | "LATIN1" | "LATIN-1" => Some(Encoding::Latin1),
            _ => None,
        }
    }

    /// The escape strategy matching what this encoding can carry.
    pub fn escape_strategy(self) -> Arc<dyn EscapeStrategy> {
        match self {
            Encoding::Utf8 | Encoding::Utf16 => Arc::new(UnicodeEscape),
            Encoding::Ascii => Arc::new(Bits7Escape),
            Encoding::Latin1 => Arc::new(Bits8Escape),
        }
    }

    /// Returns true if `ch` has a byte representation.
    pub fn can_encode(self, ch: char) -> bool {
        match self {
            Encoding::Utf8 | Encoding::Utf16 => true,
            Encoding::Ascii => ch.is_ascii(),
            Encoding::Latin1 => u32::from(ch) <= 0xFF,
        }
    }

    /// Bytes written before any content.
    pub fn byte_order_mark(self) -> &'static [u8] {
        match self {
            Encoding::Utf16 => &[0xFE, 0xFF],
            _ => &[],
        }
    }

    /// Appends the encoded form of `s` to `out`.
    pub fn encode_into(self, s: &str, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Encoding::Utf8 => out.extend_from_slice(s.as_bytes()),
            Encoding::Utf16 => {
                for unit in s.encode_utf16() {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
            }
            Encoding::Ascii | Encoding::Latin1 => {
                for ch in s.chars() {
                    if !self.can_encode(ch) {
                        return Err(Error::Data(format!(
                            "character U+{:04X} cannot be represented in {:?}",
                            u32::from(ch),
                            self
                        )));
                    }
                    out.push(u32::from(ch) as u8);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(Encoding::from_name("utf-8"), Some(Encoding::Utf8));
        assert_eq!(Encoding::from_name("ISO_8859_1"), Some(Encoding::Latin1));
        assert_eq!(Encoding::from_name("us-ascii"), Some(Encoding::Ascii));
        assert_eq!(Encoding::from_name("EBCDIC"), None);
    }

    #[test]
    fn test_encode() {
        let mut out = Vec::new();
        Encoding::Latin1.encode_into("caf\u{e9}", &mut out).unwrap();
        assert_eq!(out, b"caf\xe9");

        let mut out = Vec::new();
        Encoding::Utf16.encode_into("a", &mut out).unwrap();
        assert_eq!(out, [0x00, 0x61]);

        let mut out = Vec::new();
        let err = Encoding::Ascii.encode_into("\u{e9}", &mut out).unwrap_err();
        assert!(matches!(err, Error::Data(_)));
    }

    #[test]
    fn test_strategy_matches_capacity() {
        for enc in [Encoding::Utf8, Encoding::Ascii, Encoding::Latin1] {
            let strategy = enc.escape_strategy();
            for ch in ['a', '\u{e9}', '\u{20ac}'] {
                assert_eq!(strategy.should_escape(ch), !enc.can_encode(ch), "{enc:?} {ch}");
            }
        }
    }
}
