//! xmlout - XML document model and output formatting
//!
//! This library holds XML documents in memory and writes them out through
//! one shared formatting engine to four kinds of target:
//!
//! - text ([`XmlOutputter`]), encoded as UTF-8, UTF-16, US-ASCII or
//!   ISO-8859-1
//! - SAX-style callbacks ([`SaxOutputter`])
//! - a mutable DOM ([`DomOutputter`])
//! - quick-xml events and writers ([`StaxEventOutputter`],
//!   [`StaxStreamOutputter`])
//!
//! # Overview
//!
//! A [`Format`] decides indentation, line separators, the declaration, how
//! empty elements are written, and how text is handled ([`TextMode`]).
//! Runs of adjacent text, CDATA and entity references are formatted as a
//! unit, so trimming and whitespace normalization behave the same however
//! the text happens to be split into nodes, and every back end sees the
//! same logical output.
//!
//! # Example
//!
//! ```
//! use xmlout::{parse_str, Format, LineSeparator, XmlOutputter};
//!
//! let doc = parse_str("<r><a>  hi  </a>text<!--c--></r>").unwrap();
//! let format = Format::raw()
//!     .with_indent(Some("  "))
//!     .with_line_separator(LineSeparator::Nl)
//!     .with_text_mode(xmlout::TextMode::Normalize);
//! let out = XmlOutputter::with_format(format);
//! assert_eq!(
//!     out.element_to_string(doc.root().unwrap()).unwrap(),
//!     "<r>\n  <a>hi</a>\n  text\n  <!--c-->\n</r>"
//! );
//! ```

pub mod constants;
pub mod dom;
pub mod error;
pub mod format;
pub mod model;
pub mod output;
pub mod sax;
pub mod stax;
pub mod xml;

// Re-export commonly used types
pub use constants::*;
pub use error::{Error, Result};
pub use format::{Encoding, EscapeStrategy, Format, FormatStack, LineSeparator, TextMode};
pub use model::{
    Attribute, AttributeType, CData, Comment, Content, ContentKind, ContentMask, DocType,
    Document, Element, EntityRef, Namespace, ProcessingInstruction, Text,
};
pub use output::{Emitter, NamespaceStack, OutputSink};

// Re-export back ends
pub use dom::{DomNode, DomOutputter, DomRef};
pub use sax::{EventTrace, SaxAttribute, SaxHandler, SaxOutputter};
pub use stax::{StaxEventOutputter, StaxStreamOutputter, XmlEventConsumer};
pub use xml::{parse_file, parse_str, DocumentBuilder, XmlOutputter, XmlPrinter};
