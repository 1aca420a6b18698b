//! Output formatting options.
//!
//! A [`Format`] is an immutable bag of settings handed to an outputter.
//! Changing one means cloning it first: every `with_*` method consumes the
//! value and returns the modified copy, so a format shared between output
//! passes is never changed underneath them.

mod encoding;
mod escape;
mod stack;
pub mod whitespace;

pub use encoding::Encoding;
pub use escape::{
    escape_attribute, escape_attribute_utf16, escape_text, escape_text_utf16, Bits7Escape,
    Bits8Escape, EscapeStrategy, FnEscape, UnicodeEscape,
};
pub use stack::FormatStack;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::constants::{STANDARD_ENCODING, STANDARD_INDENT};

/// How whitespace in text content is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextMode {
    /// Emit text exactly as stored.
    #[default]
    Preserve,
    /// Trim the edges of each text run.
    Trim,
    /// Trim edges and collapse interior whitespace to single spaces.
    Normalize,
    /// Drop runs that are entirely whitespace, keep the rest verbatim.
    TrimFullWhite,
}

impl FromStr for TextMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "preserve" => Ok(TextMode::Preserve),
            "trim" => Ok(TextMode::Trim),
            "normalize" => Ok(TextMode::Normalize),
            "trim_full_white" => Ok(TextMode::TrimFullWhite),
            other => Err(format!("unknown text mode: {}", other)),
        }
    }
}

/// Named line separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineSeparator {
    /// `\r\n`
    CrNl,
    /// `\n`
    Nl,
    /// `\r`
    Cr,
    /// Same as [`LineSeparator::CrNl`].
    Dos,
    /// Same as [`LineSeparator::Nl`].
    Unix,
    /// The host platform's convention.
    System,
    /// No separator: output is never broken into lines.
    None,
    /// Same as [`LineSeparator::CrNl`], the XML specification's example.
    #[default]
    Default,
}

impl LineSeparator {
    /// The separator text, `None` for [`LineSeparator::None`].
    pub fn value(self) -> Option<&'static str> {
        match self {
            LineSeparator::CrNl | LineSeparator::Dos | LineSeparator::Default => Some("\r\n"),
            LineSeparator::Nl | LineSeparator::Unix => Some("\n"),
            LineSeparator::Cr => Some("\r"),
            LineSeparator::System => Some(if cfg!(windows) { "\r\n" } else { "\n" }),
            LineSeparator::None => None,
        }
    }
}

impl FromStr for LineSeparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crnl" | "crlf" => Ok(LineSeparator::CrNl),
            "nl" | "lf" => Ok(LineSeparator::Nl),
            "cr" => Ok(LineSeparator::Cr),
            "dos" => Ok(LineSeparator::Dos),
            "unix" => Ok(LineSeparator::Unix),
            "system" => Ok(LineSeparator::System),
            "none" => Ok(LineSeparator::None),
            "default" => Ok(LineSeparator::Default),
            other => Err(format!("unknown line separator: {}", other)),
        }
    }
}

/// Output configuration shared by every outputter.
#[derive(Clone)]
pub struct Format {
    /// One level of indentation; `None` disables indenting and line breaks.
    indent: Option<String>,
    line_separator: Option<String>,
    encoding: String,
    omit_declaration: bool,
    omit_encoding: bool,
    expand_empty_elements: bool,
    ignore_trax_escaping_pis: bool,
    specified_attributes_only: bool,
    text_mode: TextMode,
    escape_strategy: Arc<dyn EscapeStrategy>,
}

impl Format {
    /// Emits content exactly as stored: no indentation, PRESERVE text.
    pub fn raw() -> Self {
        Format {
            indent: None,
            line_separator: LineSeparator::Default.value().map(str::to_string),
            encoding: STANDARD_ENCODING.to_string(),
            omit_declaration: false,
            omit_encoding: false,
            expand_empty_elements: false,
            ignore_trax_escaping_pis: false,
            specified_attributes_only: false,
            text_mode: TextMode::Preserve,
            escape_strategy: Encoding::Utf8.escape_strategy(),
        }
    }

    /// Two-space indentation, normalized text, expanded empty elements.
    pub fn pretty() -> Self {
        Self::raw()
            .with_indent(Some(STANDARD_INDENT))
            .with_text_mode(TextMode::Normalize)
            .with_expand_empty_elements(true)
    }

    /// No indentation but normalized text, for whitespace-insensitive
    /// consumers.
    pub fn compact() -> Self {
        Self::raw().with_text_mode(TextMode::Normalize)
    }

    /// Sets the indent unit; `None` turns indentation off.
    pub fn with_indent(mut self, indent: Option<&str>) -> Self {
        self.indent = indent.map(str::to_string);
        self
    }

    /// Sets the line separator from a named convention.
    pub fn with_line_separator(mut self, separator: LineSeparator) -> Self {
        self.line_separator = separator.value().map(str::to_string);
        self
    }

    /// Sets an arbitrary line separator; `None` or empty disables
    /// line breaks.
    pub fn with_custom_line_separator(mut self, separator: Option<&str>) -> Self {
        self.line_separator = separator.filter(|s| !s.is_empty()).map(str::to_string);
        self
    }

    /// Sets the declared encoding and picks the matching escape strategy.
    /// Unknown names fall back to 7-bit escaping.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        let encoding = encoding.into();
        self.escape_strategy = match Encoding::from_name(&encoding) {
            Some(known) => known.escape_strategy(),
            None => {
                log::warn!(
                    "unknown encoding {:?}, escaping every non-ASCII character",
                    encoding
                );
                Arc::new(Bits7Escape)
            }
        };
        self.encoding = encoding;
        self
    }

    /// Overrides the escape strategy chosen by the encoding.
    pub fn with_escape_strategy(mut self, strategy: Arc<dyn EscapeStrategy>) -> Self {
        self.escape_strategy = strategy;
        self
    }

    pub fn with_omit_declaration(mut self, omit: bool) -> Self {
        self.omit_declaration = omit;
        self
    }

    pub fn with_omit_encoding(mut self, omit: bool) -> Self {
        self.omit_encoding = omit;
        self
    }

    pub fn with_expand_empty_elements(mut self, expand: bool) -> Self {
        self.expand_empty_elements = expand;
        self
    }

    /// When set, TrAX escaping PIs are written out like any other PI
    /// instead of switching escaping.
    pub fn with_ignore_trax_escaping_pis(mut self, ignore: bool) -> Self {
        self.ignore_trax_escaping_pis = ignore;
        self
    }

    /// When set, DTD-defaulted attributes are not written.
    pub fn with_specified_attributes_only(mut self, only: bool) -> Self {
        self.specified_attributes_only = only;
        self
    }

    pub fn with_text_mode(mut self, mode: TextMode) -> Self {
        self.text_mode = mode;
        self
    }

    pub fn indent(&self) -> Option<&str> {
        self.indent.as_deref()
    }

    pub fn line_separator(&self) -> Option<&str> {
        self.line_separator.as_deref()
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn omit_declaration(&self) -> bool {
        self.omit_declaration
    }

    pub fn omit_encoding(&self) -> bool {
        self.omit_encoding
    }

    pub fn expand_empty_elements(&self) -> bool {
        self.expand_empty_elements
    }

    pub fn ignore_trax_escaping_pis(&self) -> bool {
        self.ignore_trax_escaping_pis
    }

    pub fn specified_attributes_only(&self) -> bool {
        self.specified_attributes_only
    }

    pub fn text_mode(&self) -> TextMode {
        self.text_mode
    }

    pub fn escape_strategy(&self) -> &Arc<dyn EscapeStrategy> {
        &self.escape_strategy
    }
}

impl Default for Format {
    fn default() -> Self {
        Self::raw()
    }
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Format")
            .field("indent", &self.indent)
            .field("line_separator", &self.line_separator)
            .field("encoding", &self.encoding)
            .field("omit_declaration", &self.omit_declaration)
            .field("omit_encoding", &self.omit_encoding)
            .field("expand_empty_elements", &self.expand_empty_elements)
            .field("text_mode", &self.text_mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let raw = Format::raw();
        assert_eq!(raw.indent(), None);
        assert_eq!(raw.line_separator(), Some("\r\n"));
        assert_eq!(raw.text_mode(), TextMode::Preserve);
        assert!(!raw.expand_empty_elements());

        let pretty = Format::pretty();
        assert_eq!(pretty.indent(), Some("  "));
        assert_eq!(pretty.text_mode(), TextMode::Normalize);
        assert!(pretty.expand_empty_elements());

        let compact = Format::compact();
        assert_eq!(compact.indent(), None);
        assert_eq!(compact.text_mode(), TextMode::Normalize);

        let default = Format::default();
        assert_eq!(default.text_mode(), raw.text_mode());
        assert_eq!(default.encoding(), "UTF-8");
    }

    #[test]
    fn test_clone_then_modify() {
        let shared = Format::pretty();
        let custom = shared.clone().with_indent(Some("\t")).with_encoding("US-ASCII");
        assert_eq!(shared.indent(), Some("  "));
        assert_eq!(shared.encoding(), "UTF-8");
        assert_eq!(custom.indent(), Some("\t"));
        assert!(custom.escape_strategy().should_escape('\u{e9}'));
        assert!(!shared.escape_strategy().should_escape('\u{e9}'));
    }

    #[test]
    fn test_line_separators() {
        assert_eq!(LineSeparator::Unix.value(), Some("\n"));
        assert_eq!(LineSeparator::Dos.value(), Some("\r\n"));
        assert_eq!(LineSeparator::None.value(), None);
        let f = Format::raw().with_custom_line_separator(Some(""));
        assert_eq!(f.line_separator(), None);
        assert_eq!("lf".parse::<LineSeparator>(), Ok(LineSeparator::Nl));
    }

    #[test]
    fn test_text_mode_parsing() {
        assert_eq!("trim-full-white".parse::<TextMode>(), Ok(TextMode::TrimFullWhite));
        assert_eq!("NORMALIZE".parse::<TextMode>(), Ok(TextMode::Normalize));
        assert!("squash".parse::<TextMode>().is_err());
    }
}
