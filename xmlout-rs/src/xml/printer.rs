//! Character output sink.
//!
//! The printer turns the emitter's write operations into markup, escapes
//! through the format stack, and encodes the result in the configured
//! output encoding.

use std::io::Write;

use crate::error::Result;
use crate::format::{Encoding, FormatStack};
use crate::model::{Comment, DocType, Element, ProcessingInstruction};
use crate::output::{output_attributes, NamespaceStack, OutputSink};

/// Writes markup to a byte stream.
pub struct XmlPrinter<W: Write> {
    writer: W,
    encoding: Encoding,
    /// Emit a byte order mark at the start of a document.
    bom: bool,
    /// Scratch buffer for one markup fragment.
    markup: String,
    bytes: Vec<u8>,
}

impl<W: Write> XmlPrinter<W> {
    /// Creates a printer that encodes in UTF-8.
    pub fn new(writer: W) -> Self {
        Self::with_encoding(writer, Encoding::Utf8, false)
    }

    /// Creates a printer for `encoding`, optionally writing its byte order
    /// mark before a document.
    pub fn with_encoding(writer: W, encoding: Encoding, bom: bool) -> Self {
        XmlPrinter {
            writer,
            encoding,
            bom,
            markup: String::new(),
            bytes: Vec::new(),
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_str(&mut self, s: &str) -> Result<()> {
        self.bytes.clear();
        self.encoding.encode_into(s, &mut self.bytes)?;
        self.writer.write_all(&self.bytes)?;
        Ok(())
    }

    /// Writes the scratch buffer and clears it.
    fn write_markup(&mut self) -> Result<()> {
        let markup = std::mem::take(&mut self.markup);
        let result = self.write_str(&markup);
        self.markup = markup;
        self.markup.clear();
        result
    }

    fn open_tag(&mut self, fstack: &FormatStack, element: &Element, nstack: &NamespaceStack) {
        let tag = &mut self.markup;
        tag.push('<');
        tag.push_str(&element.qualified_name());

        for ns in nstack.added_forward() {
            tag.push(' ');
            tag.push_str(&ns.declaration_name());
            tag.push_str("=\"");
            tag.push_str(&fstack.escape_attribute(ns.uri()));
            tag.push('"');
        }

        for attr in output_attributes(fstack, element) {
            tag.push(' ');
            tag.push_str(&attr.qualified_name());
            tag.push_str("=\"");
            tag.push_str(&fstack.escape_attribute(attr.value()));
            tag.push('"');
        }
    }
}

impl<W: Write> OutputSink for XmlPrinter<W> {
    fn start_document(&mut self, _fstack: &FormatStack) -> Result<()> {
        if self.bom {
            self.writer.write_all(self.encoding.byte_order_mark())?;
        }
        Ok(())
    }

    fn end_document(&mut self, _fstack: &FormatStack) -> Result<()> {
        self.flush()
    }

    fn declaration(&mut self, fstack: &FormatStack) -> Result<()> {
        let format = fstack.format();
        self.markup.push_str("<?xml version=\"1.0\"");
        if !format.omit_encoding() {
            self.markup.push_str(" encoding=\"");
            self.markup.push_str(format.encoding());
            self.markup.push('"');
        }
        self.markup.push_str("?>");
        self.write_markup()
    }

    fn doctype(&mut self, fstack: &FormatStack, doctype: &DocType) -> Result<()> {
        let eol = fstack.format().line_separator().unwrap_or("");
        self.markup.push_str("<!DOCTYPE ");
        self.markup.push_str(&doctype.body(eol));
        self.markup.push('>');
        self.write_markup()
    }

    fn start_element(
        &mut self,
        fstack: &FormatStack,
        element: &Element,
        nstack: &NamespaceStack,
    ) -> Result<()> {
        self.open_tag(fstack, element, nstack);
        self.markup.push('>');
        self.write_markup()
    }

    fn empty_element(
        &mut self,
        fstack: &FormatStack,
        element: &Element,
        nstack: &NamespaceStack,
    ) -> Result<()> {
        self.open_tag(fstack, element, nstack);
        self.markup.push_str("/>");
        self.write_markup()
    }

    fn end_element(
        &mut self,
        _fstack: &FormatStack,
        element: &Element,
        _nstack: &NamespaceStack,
    ) -> Result<()> {
        self.markup.push_str("</");
        self.markup.push_str(&element.qualified_name());
        self.markup.push('>');
        self.write_markup()
    }

    fn text(&mut self, fstack: &FormatStack, text: &str) -> Result<()> {
        let escaped = fstack.escape_text(text);
        self.write_str(&escaped)
    }

    fn cdata(&mut self, _fstack: &FormatStack, text: &str) -> Result<()> {
        self.markup.push_str("<![CDATA[");
        // A terminator inside the data closes the section and reopens it
        // between the two brackets and the '>'.
        self.markup.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
        self.markup.push_str("]]>");
        self.write_markup()
    }

    fn comment(&mut self, _fstack: &FormatStack, comment: &Comment) -> Result<()> {
        self.markup.push_str("<!--");
        self.markup.push_str(comment.text());
        self.markup.push_str("-->");
        self.write_markup()
    }

    fn processing_instruction(
        &mut self,
        _fstack: &FormatStack,
        pi: &ProcessingInstruction,
    ) -> Result<()> {
        self.markup.push_str("<?");
        self.markup.push_str(pi.target());
        if !pi.data().is_empty() {
            self.markup.push(' ');
            self.markup.push_str(pi.data());
        }
        self.markup.push_str("?>");
        self.write_markup()
    }

    fn entity_ref(&mut self, _fstack: &FormatStack, name: &str) -> Result<()> {
        self.markup.push('&');
        self.markup.push_str(name);
        self.markup.push(';');
        self.write_markup()
    }

    fn raw_indent(&mut self, _fstack: &FormatStack, indent: &str) -> Result<()> {
        self.write_str(indent)
    }

    fn raw_eol(&mut self, _fstack: &FormatStack, eol: &str) -> Result<()> {
        self.write_str(eol)
    }

    fn honours_escaping_pis(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;
    use crate::model::{Attribute, Namespace};
    use crate::output::Emitter;

    fn print_element(format: &Format, element: &Element) -> String {
        let mut printer = XmlPrinter::new(Vec::new());
        Emitter::new(format, &mut printer).element(element).unwrap();
        String::from_utf8(printer.into_inner()).unwrap()
    }

    #[test]
    fn test_print_simple() {
        let e = Element::new("root").with_text("text");
        assert_eq!(print_element(&Format::raw(), &e), "<root>text</root>");
    }

    #[test]
    fn test_print_with_attributes_in_order() {
        let e = Element::new("root")
            .with_attribute("z", "1")
            .with_attribute("a", "x\"y<&")
            .with_text("content");
        assert_eq!(
            print_element(&Format::raw(), &e),
            "<root z=\"1\" a=\"x&quot;y&lt;&amp;\">content</root>"
        );
    }

    #[test]
    fn test_print_empty_element() {
        let e = Element::new("root").with_content(Element::new("empty"));
        assert_eq!(print_element(&Format::raw(), &e), "<root><empty/></root>");
        assert_eq!(
            print_element(&Format::raw().with_expand_empty_elements(true), &e),
            "<root><empty></empty></root>"
        );
    }

    #[test]
    fn test_entity_encoding() {
        let e = Element::new("root").with_text("a < b && c > d\r");
        assert_eq!(
            print_element(&Format::raw(), &e),
            "<root>a &lt; b &amp;&amp; c &gt; d&#xD;</root>"
        );
    }

    #[test]
    fn test_namespace_declarations() {
        let a = Namespace::new("a", "urn:a");
        let e = Element::new_ns("root", a.clone())
            .with_namespace_declaration(Namespace::default_for("urn:d"))
            .with_attribute_node(Attribute::new_ns("x", "1", a.clone()))
            .with_content(Element::new_ns("child", a));
        assert_eq!(
            print_element(&Format::raw(), &e),
            "<a:root xmlns:a=\"urn:a\" xmlns=\"urn:d\" a:x=\"1\"><a:child/></a:root>"
        );
    }

    #[test]
    fn test_cdata_terminator_split() {
        let e = Element::new("r").with_content(crate::model::CData::new("a]]>b"));
        assert_eq!(
            print_element(&Format::raw(), &e),
            "<r><![CDATA[a]]]]><![CDATA[>b]]></r>"
        );
    }

    #[test]
    fn test_pi_without_data() {
        let e = Element::new("r")
            .with_content(ProcessingInstruction::new("go", ""))
            .with_content(ProcessingInstruction::new("t", "d=1"));
        assert_eq!(print_element(&Format::raw(), &e), "<r><?go?><?t d=1?></r>");
    }

    #[test]
    fn test_ascii_escapes_non_ascii_text() {
        let e = Element::new("r").with_attribute("v", "é").with_text("é€");
        let format = Format::raw().with_encoding("US-ASCII");
        let mut printer = XmlPrinter::with_encoding(Vec::new(), Encoding::Ascii, false);
        Emitter::new(&format, &mut printer).element(&e).unwrap();
        assert_eq!(
            printer.into_inner(),
            b"<r v=\"&#xE9;\">&#xE9;&#x20AC;</r>".to_vec()
        );
    }

    #[test]
    fn test_unencodable_name_is_data_error() {
        let e = Element::new("é");
        let format = Format::raw().with_encoding("US-ASCII");
        let mut printer = XmlPrinter::with_encoding(Vec::new(), Encoding::Ascii, false);
        let err = Emitter::new(&format, &mut printer).element(&e).unwrap_err();
        assert!(matches!(err, crate::Error::Data(_)));
    }
}
