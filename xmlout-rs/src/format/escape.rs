//! Character escaping for element text and attribute values.
//!
//! Both grammars replace the markup characters with their predefined
//! entities and escape carriage returns numerically. Beyond that an
//! [`EscapeStrategy`] decides which characters the target encoding cannot
//! carry; those are written as `&#xHEX;` using the full code point.

use std::fmt;

use crate::error::{Error, Result};

/// Decides which characters are written as numeric character references.
pub trait EscapeStrategy: fmt::Debug + Send + Sync {
    /// Returns true if `ch` must be numerically escaped.
    fn should_escape(&self, ch: char) -> bool;
}

/// For Unicode encodings: escapes only characters outside the Basic
/// Multilingual Plane, which some XML 1.0 consumers mishandle.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeEscape;

impl EscapeStrategy for UnicodeEscape {
    fn should_escape(&self, ch: char) -> bool {
        u32::from(ch) > 0xFFFF
    }
}

/// For US-ASCII: escapes everything above U+007F.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bits7Escape;

impl EscapeStrategy for Bits7Escape {
    fn should_escape(&self, ch: char) -> bool {
        u32::from(ch) > 0x7F
    }
}

/// For ISO-8859-1: escapes everything above U+00FF.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bits8Escape;

impl EscapeStrategy for Bits8Escape {
    fn should_escape(&self, ch: char) -> bool {
        u32::from(ch) > 0xFF
    }
}

/// Adapts a closure into an [`EscapeStrategy`].
pub struct FnEscape<F>(pub F);

impl<F> fmt::Debug for FnEscape<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnEscape(..)")
    }
}

impl<F> EscapeStrategy for FnEscape<F>
where
    F: Fn(char) -> bool + Send + Sync,
{
    fn should_escape(&self, ch: char) -> bool {
        (self.0)(ch)
    }
}

#[derive(Clone, Copy)]
enum Grammar<'a> {
    /// Element content; line feeds become `eol` when one is given.
    Text { eol: Option<&'a str> },
    /// Attribute values; every whitespace control is escaped.
    Attribute,
}

/// Escapes element text. Line feeds are replaced by `eol` when given,
/// otherwise passed through.
pub fn escape_text(strategy: &dyn EscapeStrategy, eol: Option<&str>, value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        push_escaped(&mut out, strategy, Grammar::Text { eol }, ch);
    }
    out
}

/// Escapes an attribute value for use between double quotes.
pub fn escape_attribute(strategy: &dyn EscapeStrategy, value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        push_escaped(&mut out, strategy, Grammar::Attribute, ch);
    }
    out
}

/// Escapes element text given as UTF-16 code units. Surrogate pairs are
/// combined into one code point before escaping; an unpaired or truncated
/// surrogate is a data error.
pub fn escape_text_utf16(
    strategy: &dyn EscapeStrategy,
    eol: Option<&str>,
    units: &[u16],
) -> Result<String> {
    escape_units(strategy, Grammar::Text { eol }, units)
}

/// Attribute-value counterpart of [`escape_text_utf16`].
pub fn escape_attribute_utf16(strategy: &dyn EscapeStrategy, units: &[u16]) -> Result<String> {
    escape_units(strategy, Grammar::Attribute, units)
}

fn escape_units(
    strategy: &dyn EscapeStrategy,
    grammar: Grammar<'_>,
    units: &[u16],
) -> Result<String> {
    let mut out = String::with_capacity(units.len());
    for decoded in char::decode_utf16(units.iter().copied()) {
        let ch = decoded.map_err(|e| {
            Error::Data(format!(
                "could not decode surrogate pair: unpaired surrogate 0x{:04X}",
                e.unpaired_surrogate()
            ))
        })?;
        push_escaped(&mut out, strategy, grammar, ch);
    }
    Ok(out)
}

fn push_escaped(out: &mut String, strategy: &dyn EscapeStrategy, grammar: Grammar<'_>, ch: char) {
    match (ch, grammar) {
        ('<', _) => out.push_str("&lt;"),
        ('>', _) => out.push_str("&gt;"),
        ('&', _) => out.push_str("&amp;"),
        ('\r', _) => out.push_str("&#xD;"),
        ('"', Grammar::Attribute) => out.push_str("&quot;"),
        ('\t', Grammar::Attribute) => out.push_str("&#x9;"),
        ('\n', Grammar::Attribute) => out.push_str("&#xA;"),
        ('\n', Grammar::Text { eol: Some(eol) }) => out.push_str(eol),
        _ if strategy.should_escape(ch) => out.push_str(&format!("&#x{:X};", u32::from(ch))),
        _ => out.push(ch),
    }
}
