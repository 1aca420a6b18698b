//! Output through quick-xml's streaming API.
//!
//! Both outputters emit the events that the text outputter's bytes
//! describe: the declaration, padding as text events, and childless
//! elements as [`Event::Empty`]. Writing the events with a
//! [`quick_xml::Writer`] therefore reproduces the text output exactly when
//! the target encoding is UTF-8.

mod event;
mod stream;

pub use event::{StaxEventOutputter, XmlEventConsumer};
pub use stream::StaxStreamOutputter;

use quick_xml::events::attributes::Attribute as QuickAttribute;
use quick_xml::events::{
    BytesCData, BytesDecl, BytesEnd, BytesPI, BytesRef, BytesStart, BytesText, Event,
};

use crate::error::Result;
use crate::format::FormatStack;
use crate::model::{Comment, DocType, Element, ProcessingInstruction};
use crate::output::{output_attributes, NamespaceStack, OutputSink};

/// Turns write operations into quick-xml events.
struct StaxSink<'c, C: XmlEventConsumer + ?Sized> {
    consumer: &'c mut C,
}

impl<'c, C: XmlEventConsumer + ?Sized> StaxSink<'c, C> {
    fn new(consumer: &'c mut C) -> Self {
        StaxSink { consumer }
    }

    fn start_tag(
        fstack: &FormatStack,
        element: &Element,
        nstack: &NamespaceStack,
    ) -> BytesStart<'static> {
        let mut start = BytesStart::new(element.qualified_name().into_owned());
        for ns in nstack.added_forward() {
            let value = fstack.escape_attribute(ns.uri());
            let name = ns.declaration_name();
            // Values are escaped already; the byte-pair form writes them raw.
            start.push_attribute(QuickAttribute::from((name.as_bytes(), value.as_bytes())));
        }
        for attr in output_attributes(fstack, element) {
            let value = fstack.escape_attribute(attr.value());
            let name = attr.qualified_name();
            start.push_attribute(QuickAttribute::from((name.as_bytes(), value.as_bytes())));
        }
        start
    }

    fn whitespace(&mut self, whitespace: &str) -> Result<()> {
        if whitespace.is_empty() {
            return Ok(());
        }
        self.consumer
            .consume(Event::Text(BytesText::from_escaped(whitespace)))
    }
}

impl<C: XmlEventConsumer + ?Sized> OutputSink for StaxSink<'_, C> {
    fn declaration(&mut self, fstack: &FormatStack) -> Result<()> {
        let format = fstack.format();
        let encoding = (!format.omit_encoding()).then(|| format.encoding());
        self.consumer
            .consume(Event::Decl(BytesDecl::new("1.0", encoding, None)))
    }

    fn doctype(&mut self, fstack: &FormatStack, doctype: &DocType) -> Result<()> {
        let eol = fstack.format().line_separator().unwrap_or("");
        self.consumer
            .consume(Event::DocType(BytesText::from_escaped(doctype.body(eol))))
    }

    fn start_element(
        &mut self,
        fstack: &FormatStack,
        element: &Element,
        nstack: &NamespaceStack,
    ) -> Result<()> {
        let start = Self::start_tag(fstack, element, nstack);
        self.consumer.consume(Event::Start(start))
    }

    fn empty_element(
        &mut self,
        fstack: &FormatStack,
        element: &Element,
        nstack: &NamespaceStack,
    ) -> Result<()> {
        let start = Self::start_tag(fstack, element, nstack);
        self.consumer.consume(Event::Empty(start))
    }

    fn end_element(
        &mut self,
        _fstack: &FormatStack,
        element: &Element,
        _nstack: &NamespaceStack,
    ) -> Result<()> {
        let end = BytesEnd::new(element.qualified_name().into_owned());
        self.consumer.consume(Event::End(end))
    }

    fn text(&mut self, fstack: &FormatStack, text: &str) -> Result<()> {
        let escaped = fstack.escape_text(text);
        self.consumer
            .consume(Event::Text(BytesText::from_escaped(escaped)))
    }

    fn cdata(&mut self, _fstack: &FormatStack, text: &str) -> Result<()> {
        // Split at each terminator: "a]]>b" becomes "a]]" and ">b".
        let mut rest = text;
        while let Some(pos) = rest.find("]]>") {
            self.consumer
                .consume(Event::CData(BytesCData::new(&rest[..pos + 2])))?;
            rest = &rest[pos + 2..];
        }
        self.consumer.consume(Event::CData(BytesCData::new(rest)))
    }

    fn comment(&mut self, _fstack: &FormatStack, comment: &Comment) -> Result<()> {
        self.consumer
            .consume(Event::Comment(BytesText::from_escaped(comment.text())))
    }

    fn processing_instruction(
        &mut self,
        _fstack: &FormatStack,
        pi: &ProcessingInstruction,
    ) -> Result<()> {
        let content = if pi.data().is_empty() {
            pi.target().to_string()
        } else {
            format!("{} {}", pi.target(), pi.data())
        };
        self.consumer.consume(Event::PI(BytesPI::new(content)))
    }

    fn entity_ref(&mut self, _fstack: &FormatStack, name: &str) -> Result<()> {
        self.consumer
            .consume(Event::GeneralRef(BytesRef::new(name)))
    }

    fn raw_indent(&mut self, _fstack: &FormatStack, indent: &str) -> Result<()> {
        self.whitespace(indent)
    }

    fn raw_eol(&mut self, _fstack: &FormatStack, eol: &str) -> Result<()> {
        self.whitespace(eol)
    }

    // Text events carry pre-escaped content.
    fn honours_escaping_pis(&self) -> bool {
        true
    }
}
