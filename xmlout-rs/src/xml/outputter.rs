//! Text output of documents and fragments.

use std::io::{BufWriter, Write};

use super::printer::XmlPrinter;
use crate::error::{Error, Result};
use crate::format::{escape_attribute, escape_text, Encoding, Format};
use crate::model::{Content, Document, Element};
use crate::output::Emitter;

/// Serializes model trees as XML text.
///
/// An outputter holds only its [`Format`]; every call builds its own
/// formatting state, so one outputter can be shared between threads.
///
/// ```
/// use xmlout::{Element, Format, XmlOutputter};
///
/// let root = Element::new("r").with_content(Element::new("a").with_text("  hi  "));
/// let out = XmlOutputter::with_format(Format::pretty().with_expand_empty_elements(false));
/// assert_eq!(out.element_to_string(&root).unwrap(), "<r>\r\n  <a>hi</a>\r\n</r>");
/// ```
#[derive(Debug, Clone, Default)]
pub struct XmlOutputter {
    format: Format,
}

impl XmlOutputter {
    /// Creates an outputter with the raw format.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: Format) -> Self {
        XmlOutputter { format }
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    /// Writes a whole document, encoded as the format's encoding says.
    pub fn output_document<W: Write>(&self, doc: &Document, out: W) -> Result<()> {
        self.write_bytes(out, "while outputting the Document", |e| e.document(doc))
    }

    /// Writes one element and its subtree.
    pub fn output_element<W: Write>(&self, element: &Element, out: W) -> Result<()> {
        self.write_bytes(out, "while outputting the Element", |e| e.element(element))
    }

    /// Writes only the content of `element`.
    pub fn output_element_content<W: Write>(&self, element: &Element, out: W) -> Result<()> {
        self.write_bytes(out, "while outputting the Element content", |e| {
            e.element_content(element)
        })
    }

    pub fn output_content_list<W: Write>(&self, content: &[Content], out: W) -> Result<()> {
        self.write_bytes(out, "while outputting the content list", |e| {
            e.content_list(content)
        })
    }

    /// Writes a single node of any kind.
    pub fn output_content<W: Write>(&self, node: &Content, out: W) -> Result<()> {
        self.write_bytes(out, "while outputting the Content", |e| e.content(node))
    }

    pub fn document_to_string(&self, doc: &Document) -> Result<String> {
        self.write_string(|e| e.document(doc))
    }

    pub fn element_to_string(&self, element: &Element) -> Result<String> {
        self.write_string(|e| e.element(element))
    }

    pub fn element_content_to_string(&self, element: &Element) -> Result<String> {
        self.write_string(|e| e.element_content(element))
    }

    pub fn content_list_to_string(&self, content: &[Content]) -> Result<String> {
        self.write_string(|e| e.content_list(content))
    }

    pub fn content_to_string(&self, node: &Content) -> Result<String> {
        self.write_string(|e| e.content(node))
    }

    /// Escapes `value` as attribute content under this format's strategy.
    pub fn escape_attribute_entities(&self, value: &str) -> String {
        escape_attribute(self.format.escape_strategy().as_ref(), value)
    }

    /// Escapes `value` as element text under this format's strategy.
    pub fn escape_element_entities(&self, value: &str) -> String {
        escape_text(
            self.format.escape_strategy().as_ref(),
            self.format.line_separator(),
            value,
        )
    }

    fn write_bytes<W, F>(&self, out: W, context: &'static str, body: F) -> Result<()>
    where
        W: Write,
        F: FnOnce(&mut Emitter<'_, XmlPrinter<BufWriter<W>>>) -> Result<()>,
    {
        let encoding = Encoding::from_name(self.format.encoding()).unwrap_or(Encoding::Ascii);
        log::debug!(
            "text output in {:?} with {:?}",
            encoding,
            self.format.text_mode()
        );
        let mut printer = XmlPrinter::with_encoding(BufWriter::new(out), encoding, true);
        let result = body(&mut Emitter::new(&self.format, &mut printer));
        result
            .and_then(|()| printer.flush())
            .map_err(|e| e.in_context(context))
    }

    /// String output is always UTF-8; the format still decides which
    /// characters are escaped.
    fn write_string<F>(&self, body: F) -> Result<String>
    where
        F: FnOnce(&mut Emitter<'_, XmlPrinter<Vec<u8>>>) -> Result<()>,
    {
        let mut printer = XmlPrinter::new(Vec::new());
        body(&mut Emitter::new(&self.format, &mut printer))?;
        String::from_utf8(printer.into_inner())
            .map_err(|e| Error::Internal(format!("printer produced invalid UTF-8: {}", e)))
    }
}
