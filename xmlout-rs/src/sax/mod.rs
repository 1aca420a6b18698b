//! SAX-style event output.
//!
//! [`SaxOutputter`] replays a tree as callbacks on a [`SaxHandler`]. The
//! formatting decisions are the same as for text output: padding arrives as
//! [`SaxHandler::ignorable_whitespace`], formatted text as
//! [`SaxHandler::characters`].

use crate::error::Result;
use crate::format::{Format, FormatStack};
use crate::model::{Comment, Content, DocType, Document, Element, ProcessingInstruction};
use crate::output::{output_attributes, Emitter, NamespaceStack, OutputSink};

/// One attribute as reported to [`SaxHandler::start_element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaxAttribute {
    pub uri: String,
    pub local_name: String,
    pub qname: String,
    /// The SAX type name, e.g. `CDATA` or `ID`.
    pub attribute_type: &'static str,
    pub value: String,
}

/// Receives document events.
///
/// Only the element and character callbacks are required; lexical events
/// (DTD, CDATA boundaries, comments) and the rest default to no-ops.
/// Returning an error stops the output pass.
pub trait SaxHandler {
    fn start_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn start_prefix_mapping(&mut self, _prefix: &str, _uri: &str) -> Result<()> {
        Ok(())
    }

    fn end_prefix_mapping(&mut self, _prefix: &str) -> Result<()> {
        Ok(())
    }

    fn start_element(
        &mut self,
        uri: &str,
        local_name: &str,
        qname: &str,
        attributes: &[SaxAttribute],
    ) -> Result<()>;

    fn end_element(&mut self, uri: &str, local_name: &str, qname: &str) -> Result<()>;

    fn characters(&mut self, text: &str) -> Result<()>;

    fn ignorable_whitespace(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn processing_instruction(&mut self, _target: &str, _data: &str) -> Result<()> {
        Ok(())
    }

    /// Entity references are reported here by name.
    fn skipped_entity(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn start_dtd(
        &mut self,
        _name: &str,
        _public_id: Option<&str>,
        _system_id: Option<&str>,
    ) -> Result<()> {
        Ok(())
    }

    fn end_dtd(&mut self) -> Result<()> {
        Ok(())
    }

    fn start_cdata(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_cdata(&mut self) -> Result<()> {
        Ok(())
    }

    fn comment(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// Outputs trees as SAX events.
pub struct SaxOutputter<H: SaxHandler> {
    handler: H,
    format: Format,
    report_namespace_declarations: bool,
    report_dtd_events: bool,
}

impl<H: SaxHandler> SaxOutputter<H> {
    /// Creates an outputter with the raw format. DTD events are reported;
    /// namespace declarations are not repeated as attributes.
    pub fn new(handler: H) -> Self {
        SaxOutputter {
            handler,
            format: Format::raw(),
            report_namespace_declarations: false,
            report_dtd_events: true,
        }
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Also report each namespace declaration as an `xmlns` attribute.
    pub fn with_namespace_declarations(mut self, report: bool) -> Self {
        self.report_namespace_declarations = report;
        self
    }

    pub fn with_dtd_events(mut self, report: bool) -> Self {
        self.report_dtd_events = report;
        self
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    pub fn output_document(&mut self, doc: &Document) -> Result<()> {
        self.run("while outputting the Document", |e| e.document(doc))
    }

    /// Outputs one element wrapped in document events.
    pub fn output_element(&mut self, element: &Element) -> Result<()> {
        self.run("while outputting the Element", |e| {
            e.with_document_events(|e| e.element(element))
        })
    }

    /// Outputs a content list without document events.
    pub fn output_fragment(&mut self, content: &[Content]) -> Result<()> {
        self.run("while outputting the fragment", |e| e.content_list(content))
    }

    fn run<F>(&mut self, context: &'static str, body: F) -> Result<()>
    where
        F: FnOnce(&mut Emitter<'_, SaxSink<'_, H>>) -> Result<()>,
    {
        log::debug!("SAX output with {:?}", self.format.text_mode());
        let mut sink = SaxSink {
            handler: &mut self.handler,
            report_namespace_declarations: self.report_namespace_declarations,
            report_dtd_events: self.report_dtd_events,
        };
        body(&mut Emitter::new(&self.format, &mut sink)).map_err(|e| e.in_context(context))
    }
}

struct SaxSink<'h, H: SaxHandler> {
    handler: &'h mut H,
    report_namespace_declarations: bool,
    report_dtd_events: bool,
}

impl<H: SaxHandler> SaxSink<'_, H> {
    fn padding(&mut self, fstack: &FormatStack, whitespace: &str) -> Result<()> {
        // Outside the root there is no content to carry whitespace.
        if fstack.depth() == 0 || whitespace.is_empty() {
            return Ok(());
        }
        self.handler.ignorable_whitespace(whitespace)
    }
}

impl<H: SaxHandler> OutputSink for SaxSink<'_, H> {
    fn start_document(&mut self, _fstack: &FormatStack) -> Result<()> {
        self.handler.start_document()
    }

    fn end_document(&mut self, _fstack: &FormatStack) -> Result<()> {
        self.handler.end_document()
    }

    fn declaration(&mut self, _fstack: &FormatStack) -> Result<()> {
        Ok(())
    }

    fn doctype(&mut self, _fstack: &FormatStack, doctype: &DocType) -> Result<()> {
        if !self.report_dtd_events {
            return Ok(());
        }
        self.handler.start_dtd(
            doctype.element_name(),
            doctype.public_id(),
            doctype.system_id(),
        )?;
        self.handler.end_dtd()
    }

    fn start_element(
        &mut self,
        fstack: &FormatStack,
        element: &Element,
        nstack: &NamespaceStack,
    ) -> Result<()> {
        let mut attributes = Vec::new();
        for ns in nstack.added_forward() {
            self.handler.start_prefix_mapping(ns.prefix(), ns.uri())?;
            if self.report_namespace_declarations {
                attributes.push(SaxAttribute {
                    uri: String::new(),
                    local_name: String::new(),
                    qname: ns.declaration_name(),
                    attribute_type: "CDATA",
                    value: ns.uri().to_string(),
                });
            }
        }
        for attr in output_attributes(fstack, element) {
            attributes.push(SaxAttribute {
                uri: attr.namespace().uri().to_string(),
                local_name: attr.name().to_string(),
                qname: attr.qualified_name().into_owned(),
                attribute_type: attr.attribute_type().sax_name(),
                value: attr.value().to_string(),
            });
        }
        self.handler.start_element(
            element.namespace().uri(),
            element.name(),
            &element.qualified_name(),
            &attributes,
        )
    }

    fn end_element(
        &mut self,
        _fstack: &FormatStack,
        element: &Element,
        nstack: &NamespaceStack,
    ) -> Result<()> {
        self.handler.end_element(
            element.namespace().uri(),
            element.name(),
            &element.qualified_name(),
        )?;
        for ns in nstack.added_reverse() {
            self.handler.end_prefix_mapping(ns.prefix())?;
        }
        Ok(())
    }

    fn text(&mut self, _fstack: &FormatStack, text: &str) -> Result<()> {
        self.handler.characters(text)
    }

    fn cdata(&mut self, _fstack: &FormatStack, text: &str) -> Result<()> {
        self.handler.start_cdata()?;
        self.handler.characters(text)?;
        self.handler.end_cdata()
    }

    fn comment(&mut self, _fstack: &FormatStack, comment: &Comment) -> Result<()> {
        self.handler.comment(comment.text())
    }

    fn processing_instruction(
        &mut self,
        _fstack: &FormatStack,
        pi: &ProcessingInstruction,
    ) -> Result<()> {
        self.handler.processing_instruction(pi.target(), pi.data())
    }

    fn entity_ref(&mut self, _fstack: &FormatStack, name: &str) -> Result<()> {
        self.handler.skipped_entity(name)
    }

    fn raw_indent(&mut self, fstack: &FormatStack, indent: &str) -> Result<()> {
        self.padding(fstack, indent)
    }

    fn raw_eol(&mut self, fstack: &FormatStack, eol: &str) -> Result<()> {
        self.padding(fstack, eol)
    }
}

/// A handler that records every event as a line of text.
///
/// Useful for debugging and for the `events` command line tool.
#[derive(Debug, Clone, Default)]
pub struct EventTrace {
    events: Vec<String>,
}

impl EventTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn into_events(self) -> Vec<String> {
        self.events
    }
}

impl SaxHandler for EventTrace {
    fn start_document(&mut self) -> Result<()> {
        self.events.push("startDocument".to_string());
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.events.push("endDocument".to_string());
        Ok(())
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<()> {
        self.events.push(format!("startPrefixMapping({:?}, {:?})", prefix, uri));
        Ok(())
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> Result<()> {
        self.events.push(format!("endPrefixMapping({:?})", prefix));
        Ok(())
    }

    fn start_element(
        &mut self,
        uri: &str,
        _local_name: &str,
        qname: &str,
        attributes: &[SaxAttribute],
    ) -> Result<()> {
        let mut line = format!("startElement({:?}, {:?}", uri, qname);
        for attr in attributes {
            line.push_str(&format!(", {}={:?}", attr.qname, attr.value));
        }
        line.push(')');
        self.events.push(line);
        Ok(())
    }

    fn end_element(&mut self, _uri: &str, _local_name: &str, qname: &str) -> Result<()> {
        self.events.push(format!("endElement({:?})", qname));
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        self.events.push(format!("characters({:?})", text));
        Ok(())
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<()> {
        self.events.push(format!("ignorableWhitespace({:?})", text));
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
        self.events.push(format!("processingInstruction({:?}, {:?})", target, data));
        Ok(())
    }

    fn skipped_entity(&mut self, name: &str) -> Result<()> {
        self.events.push(format!("skippedEntity({:?})", name));
        Ok(())
    }

    fn start_dtd(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<()> {
        self.events.push(format!("startDTD({:?}, {:?}, {:?})", name, public_id, system_id));
        Ok(())
    }

    fn end_dtd(&mut self) -> Result<()> {
        self.events.push("endDTD".to_string());
        Ok(())
    }

    fn start_cdata(&mut self) -> Result<()> {
        self.events.push("startCDATA".to_string());
        Ok(())
    }

    fn end_cdata(&mut self) -> Result<()> {
        self.events.push("endCDATA".to_string());
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<()> {
        self.events.push(format!("comment({:?})", text));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::format::LineSeparator;
    use crate::model::{Attribute, AttributeType, CData, EntityRef, Namespace};

    fn trace<F>(outputter: SaxOutputter<EventTrace>, f: F) -> Vec<String>
    where
        F: FnOnce(&mut SaxOutputter<EventTrace>) -> Result<()>,
    {
        let mut outputter = outputter;
        f(&mut outputter).unwrap();
        outputter.into_handler().into_events()
    }

    #[test]
    fn test_document_events() {
        let doc = Document::new(
            Element::new("r")
                .with_attribute("id", "1")
                .with_content(CData::new("c"))
                .with_content(EntityRef::new("e")),
        )
        .with_doctype(DocType::new("r").with_system_id("r.dtd"))
        .with_content(Comment::new("tail"));

        let events = trace(SaxOutputter::new(EventTrace::new()), |o| o.output_document(&doc));
        assert_eq!(
            events,
            vec![
                "startDocument",
                "startDTD(\"r\", None, Some(\"r.dtd\"))",
                "endDTD",
                "startElement(\"\", \"r\", id=\"1\")",
                "startCDATA",
                "characters(\"c\")",
                "endCDATA",
                "skippedEntity(\"e\")",
                "endElement(\"r\")",
                "comment(\"tail\")",
                "endDocument",
            ]
        );
    }

    #[test]
    fn test_escaping_pis_reach_the_handler() {
        use crate::constants::{PI_DISABLE_OUTPUT_ESCAPING, PI_ENABLE_OUTPUT_ESCAPING};
        use crate::model::ProcessingInstruction;

        let e = Element::new("r")
            .with_content(ProcessingInstruction::new(PI_DISABLE_OUTPUT_ESCAPING, ""))
            .with_text("<b>raw</b>")
            .with_content(ProcessingInstruction::new(PI_ENABLE_OUTPUT_ESCAPING, ""));
        let events = trace(SaxOutputter::new(EventTrace::new()), |o| o.output_element(&e));
        assert_eq!(
            events,
            vec![
                "startDocument".to_string(),
                "startElement(\"\", \"r\")".to_string(),
                format!("processingInstruction({:?}, \"\")", PI_DISABLE_OUTPUT_ESCAPING),
                "characters(\"<b>raw</b>\")".to_string(),
                format!("processingInstruction({:?}, \"\")", PI_ENABLE_OUTPUT_ESCAPING),
                "endElement(\"r\")".to_string(),
                "endDocument".to_string(),
            ]
        );
    }

    #[test]
    fn test_padding_is_ignorable_whitespace() {
        let e = Element::new("r").with_content(Element::new("a").with_text(" x "));
        let format = Format::pretty().with_line_separator(LineSeparator::Nl);
        let events = trace(SaxOutputter::new(EventTrace::new()).with_format(format), |o| {
            o.output_element(&e)
        });
        assert_eq!(
            events,
            vec![
                "startDocument",
                "startElement(\"\", \"r\")",
                "ignorableWhitespace(\"\\n\")",
                "ignorableWhitespace(\"  \")",
                "startElement(\"\", \"a\")",
                "characters(\"x\")",
                "endElement(\"a\")",
                "ignorableWhitespace(\"\\n\")",
                "endElement(\"r\")",
                "endDocument",
            ]
        );
    }

    #[test]
    fn test_prefix_mappings_nest() {
        let a = Namespace::new("a", "urn:a");
        let e = Element::new_ns("r", a.clone())
            .with_content(Element::new_ns("c", Namespace::new("b", "urn:b")))
            .with_content(Element::new_ns("d", a));
        let events = trace(
            SaxOutputter::new(EventTrace::new()).with_namespace_declarations(true),
            |o| o.output_fragment(std::slice::from_ref(&Content::from(e))),
        );
        assert_eq!(
            events,
            vec![
                "startPrefixMapping(\"a\", \"urn:a\")",
                "startElement(\"urn:a\", \"a:r\", xmlns:a=\"urn:a\")",
                "startPrefixMapping(\"b\", \"urn:b\")",
                "startElement(\"urn:b\", \"b:c\", xmlns:b=\"urn:b\")",
                "endElement(\"b:c\")",
                "endPrefixMapping(\"b\")",
                "startElement(\"urn:a\", \"a:d\")",
                "endElement(\"a:d\")",
                "endElement(\"a:r\")",
                "endPrefixMapping(\"a\")",
            ]
        );
    }

    #[test]
    fn test_attribute_types_and_specified_filter() {
        #[derive(Default)]
        struct Attrs(Vec<SaxAttribute>);
        impl SaxHandler for Attrs {
            fn start_element(
                &mut self,
                _: &str,
                _: &str,
                _: &str,
                a: &[SaxAttribute],
            ) -> Result<()> {
                self.0.extend_from_slice(a);
                Ok(())
            }
            fn end_element(&mut self, _: &str, _: &str, _: &str) -> Result<()> {
                Ok(())
            }
            fn characters(&mut self, _: &str) -> Result<()> {
                Ok(())
            }
        }

        let e = Element::new("r")
            .with_attribute_node(Attribute::new("id", "x").with_type(AttributeType::Id))
            .with_attribute_node(Attribute::new("dflt", "d").with_specified(false));
        let mut outputter = SaxOutputter::new(Attrs::default())
            .with_format(Format::raw().with_specified_attributes_only(true));
        outputter.output_element(&e).unwrap();
        let attrs = outputter.into_handler().0;
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].attribute_type, "ID");
        assert_eq!(attrs[0].local_name, "id");
    }

    #[test]
    fn test_handler_error_stops_output() {
        struct Refuse;
        impl SaxHandler for Refuse {
            fn start_element(
                &mut self,
                _: &str,
                _: &str,
                _: &str,
                _: &[SaxAttribute],
            ) -> Result<()> {
                Err(Error::handler("no elements"))
            }
            fn end_element(&mut self, _: &str, _: &str, _: &str) -> Result<()> {
                Ok(())
            }
            fn characters(&mut self, _: &str) -> Result<()> {
                Ok(())
            }
        }
        let err = SaxOutputter::new(Refuse)
            .output_document(&Document::new(Element::new("r")))
            .unwrap_err();
        assert!(matches!(err, Error::Output { .. }));
    }
}
