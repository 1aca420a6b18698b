use std::io::Write;

use quick_xml::events::Event;
use quick_xml::Writer;

use super::StaxSink;
use crate::error::Result;
use crate::format::Format;
use crate::model::{Content, Document, Element};
use crate::output::Emitter;

/// Receives the events of a StAX event output pass.
pub trait XmlEventConsumer {
    fn consume(&mut self, event: Event<'_>) -> Result<()>;
}

/// Collects owned events.
impl XmlEventConsumer for Vec<Event<'static>> {
    fn consume(&mut self, event: Event<'_>) -> Result<()> {
        self.push(event.into_owned());
        Ok(())
    }
}

/// Writes each event as it arrives.
impl<W: Write> XmlEventConsumer for Writer<W> {
    fn consume(&mut self, event: Event<'_>) -> Result<()> {
        self.write_event(event)?;
        Ok(())
    }
}

/// Outputs model trees as a sequence of quick-xml events.
///
/// ```
/// use quick_xml::events::Event;
/// use xmlout::{Element, StaxEventOutputter};
///
/// let mut events: Vec<Event<'static>> = Vec::new();
/// StaxEventOutputter::new()
///     .output_element(&Element::new("a").with_text("x"), &mut events)
///     .unwrap();
/// assert_eq!(events.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaxEventOutputter {
    format: Format,
}

impl StaxEventOutputter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: Format) -> Self {
        StaxEventOutputter { format }
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn output_document<C>(&self, doc: &Document, consumer: &mut C) -> Result<()>
    where
        C: XmlEventConsumer + ?Sized,
    {
        self.run(consumer, "while outputting the Document", |e| e.document(doc))
    }

    pub fn output_element<C>(&self, element: &Element, consumer: &mut C) -> Result<()>
    where
        C: XmlEventConsumer + ?Sized,
    {
        self.run(consumer, "while outputting the Element", |e| e.element(element))
    }

    pub fn output_element_content<C>(&self, element: &Element, consumer: &mut C) -> Result<()>
    where
        C: XmlEventConsumer + ?Sized,
    {
        self.run(consumer, "while outputting the Element content", |e| {
            e.element_content(element)
        })
    }

    pub fn output_content_list<C>(&self, content: &[Content], consumer: &mut C) -> Result<()>
    where
        C: XmlEventConsumer + ?Sized,
    {
        self.run(consumer, "while outputting the content list", |e| {
            e.content_list(content)
        })
    }

    fn run<C, F>(&self, consumer: &mut C, context: &'static str, body: F) -> Result<()>
    where
        C: XmlEventConsumer + ?Sized,
        F: FnOnce(&mut Emitter<'_, StaxSink<'_, C>>) -> Result<()>,
    {
        log::debug!("StAX event output with {:?}", self.format.text_mode());
        let mut sink = StaxSink::new(consumer);
        body(&mut Emitter::new(&self.format, &mut sink)).map_err(|e| e.in_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::LineSeparator;
    use crate::model::{CData, EntityRef, ProcessingInstruction};

    fn kinds(events: &[Event<'static>]) -> Vec<&'static str> {
        events
            .iter()
            .map(|e| match e {
                Event::Start(_) => "start",
                Event::End(_) => "end",
                Event::Empty(_) => "empty",
                Event::Text(_) => "text",
                Event::CData(_) => "cdata",
                Event::Comment(_) => "comment",
                Event::Decl(_) => "decl",
                Event::PI(_) => "pi",
                Event::DocType(_) => "doctype",
                Event::GeneralRef(_) => "ref",
                _ => "other",
            })
            .collect()
    }

    #[test]
    fn test_document_events() {
        let doc = Document::new(
            Element::new("r")
                .with_content(Element::new("a"))
                .with_content(CData::new("x]]>y"))
                .with_content(EntityRef::new("e"))
                .with_content(ProcessingInstruction::new("p", "")),
        );
        let mut events: Vec<Event<'static>> = Vec::new();
        let format = Format::raw().with_line_separator(LineSeparator::Nl);
        StaxEventOutputter::with_format(format)
            .output_document(&doc, &mut events)
            .unwrap();
        assert_eq!(
            kinds(&events),
            vec!["decl", "text", "start", "empty", "cdata", "cdata", "ref", "pi", "end", "text"]
        );
        match &events[4] {
            Event::CData(c) => assert_eq!(&c[..], b"x]]"),
            other => panic!("expected CDATA, got {:?}", other),
        }
    }

    #[test]
    fn test_writer_as_consumer() {
        let e = Element::new("r").with_attribute("a", "<\"").with_text("1 & 2");
        let mut writer = Writer::new(Vec::new());
        StaxEventOutputter::new().output_element(&e, &mut writer).unwrap();
        assert_eq!(
            String::from_utf8(writer.into_inner()).unwrap(),
            "<r a=\"&lt;&quot;\">1 &amp; 2</r>"
        );
    }
}
