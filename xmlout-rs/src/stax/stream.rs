use std::io::Write;

use quick_xml::Writer;

use super::StaxSink;
use crate::error::Result;
use crate::format::Format;
use crate::model::{Content, Document, Element};
use crate::output::Emitter;

/// Outputs model trees through a [`quick_xml::Writer`].
#[derive(Debug, Clone, Default)]
pub struct StaxStreamOutputter {
    format: Format,
}

impl StaxStreamOutputter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: Format) -> Self {
        StaxStreamOutputter { format }
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn output_document<W: Write>(&self, doc: &Document, writer: &mut Writer<W>) -> Result<()> {
        self.run(writer, "while outputting the Document", |e| e.document(doc))
    }

    pub fn output_element<W: Write>(
        &self,
        element: &Element,
        writer: &mut Writer<W>,
    ) -> Result<()> {
        self.run(writer, "while outputting the Element", |e| e.element(element))
    }

    pub fn output_element_content<W: Write>(
        &self,
        element: &Element,
        writer: &mut Writer<W>,
    ) -> Result<()> {
        self.run(writer, "while outputting the Element content", |e| {
            e.element_content(element)
        })
    }

    pub fn output_content_list<W: Write>(
        &self,
        content: &[Content],
        writer: &mut Writer<W>,
    ) -> Result<()> {
        self.run(writer, "while outputting the content list", |e| {
            e.content_list(content)
        })
    }

    /// Writes a document into a byte vector.
    pub fn document_to_bytes(&self, doc: &Document) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        self.output_document(doc, &mut writer)?;
        Ok(writer.into_inner())
    }

    fn run<W, F>(&self, writer: &mut Writer<W>, context: &'static str, body: F) -> Result<()>
    where
        W: Write,
        F: FnOnce(&mut Emitter<'_, StaxSink<'_, Writer<W>>>) -> Result<()>,
    {
        log::debug!("StAX stream output with {:?}", self.format.text_mode());
        let mut sink = StaxSink::new(writer);
        body(&mut Emitter::new(&self.format, &mut sink)).map_err(|e| e.in_context(context))?;
        writer.get_mut().flush()?;
        Ok(())
    }
}
