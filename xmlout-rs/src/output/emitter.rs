//! Recursive descent over the document model.

use super::run::{
    content_shape, is_all_whitespace as run_is_all_whitespace, ContentShape, Segment, Segments,
    TextRun,
};
use super::text::{format_run, TextEmission};
use super::{NamespaceStack, OutputSink};
use crate::constants::{PI_DISABLE_OUTPUT_ESCAPING, PI_ENABLE_OUTPUT_ESCAPING};
use crate::error::{Error, Result};
use crate::format::whitespace::is_all_whitespace;
use crate::format::{Format, FormatStack, TextMode};
use crate::model::{Content, Document, Element};

/// Where padding goes around a list of segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// Inside an element: a line break after the start tag and after each
    /// segment, then the closing indent.
    Element,
    /// A bare content list: line breaks only between segments.
    Fragment,
}

/// Drives one output pass into a sink.
///
/// The format and namespace stacks live exactly as long as the emitter, so
/// concurrent passes over the same tree never share mutable state.
pub struct Emitter<'s, S: OutputSink + ?Sized> {
    sink: &'s mut S,
    fstack: FormatStack,
    nstack: NamespaceStack,
}

impl<'s, S: OutputSink + ?Sized> Emitter<'s, S> {
    /// Starts a pass with fresh stacks seeded from `format`.
    pub fn new(format: &Format, sink: &'s mut S) -> Self {
        Emitter {
            sink,
            fstack: FormatStack::new(format),
            nstack: NamespaceStack::new(),
        }
    }

    /// Wraps `body` in start/end document events.
    pub fn with_document_events<F>(&mut self, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.sink.start_document(&self.fstack)?;
        body(self)?;
        self.sink.end_document(&self.fstack)
    }

    /// Writes a whole document: declaration, top-level nodes separated by
    /// the level line break, and a final line separator.
    pub fn document(&mut self, doc: &Document) -> Result<()> {
        self.with_document_events(|this| {
            if !this.fstack.format().omit_declaration() {
                this.sink.declaration(&this.fstack)?;
                if let Some(sep) = this.fstack.format().line_separator() {
                    this.sink.raw_eol(&this.fstack, sep)?;
                }
            }

            let mut first = true;
            for node in doc.content() {
                if node.is_text_like() {
                    // Only whitespace is legal outside the root, and only
                    // PRESERVE keeps it.
                    if let Content::Text(t) = node {
                        if this.fstack.text_mode() == TextMode::Preserve
                            && is_all_whitespace(t.text())
                            && !t.text().is_empty()
                        {
                            this.sink.raw_indent(&this.fstack, t.text())?;
                        }
                    }
                    continue;
                }
                if this.consume_escaping_pi(node) {
                    continue;
                }
                if !first {
                    this.pad_eol()?;
                }
                first = false;
                this.structural(node)?;
            }

            if !doc.content().is_empty() {
                if let Some(sep) = this.fstack.format().line_separator() {
                    this.sink.raw_eol(&this.fstack, sep)?;
                }
            }
            Ok(())
        })
    }

    /// Writes one element and its subtree.
    pub fn element(&mut self, element: &Element) -> Result<()> {
        self.nstack.push(element);
        self.fstack.push();
        let result = self.element_body(element);
        self.fstack.pop();
        self.nstack.pop();
        result
    }

    /// Writes only the content of `element`, with its namespaces in scope.
    pub fn element_content(&mut self, element: &Element) -> Result<()> {
        self.nstack.push(element);
        self.apply_xml_space(element);
        let result = self.segments(element.content(), Layout::Fragment);
        self.nstack.pop();
        result
    }

    /// Writes a bare content list, segments separated by line breaks.
    pub fn content_list(&mut self, content: &[Content]) -> Result<()> {
        self.segments(content, Layout::Fragment)
    }

    /// Writes a single node of any kind. Text-like nodes are formatted as
    /// a run of one.
    pub fn content(&mut self, node: &Content) -> Result<()> {
        if node.is_text_like() {
            return self.run(TextRun::new(std::slice::from_ref(node), 0, 1));
        }
        if self.consume_escaping_pi(node) {
            return Ok(());
        }
        self.structural(node)
    }

    fn apply_xml_space(&mut self, element: &Element) {
        let mode = match element.xml_space() {
            Some("default") => self.fstack.default_mode(),
            Some("preserve") => TextMode::Preserve,
            _ => return,
        };
        log::trace!("xml:space on <{}> selects {:?}", element.qualified_name(), mode);
        self.fstack.set_text_mode(mode);
    }

    fn element_body(&mut self, element: &Element) -> Result<()> {
        self.apply_xml_space(element);
        let content = element.content();

        match self.shape_of(content) {
            ContentShape::Empty => {
                if self.fstack.format().expand_empty_elements() {
                    self.sink.start_element(&self.fstack, element, &self.nstack)?;
                } else {
                    return self.sink.empty_element(&self.fstack, element, &self.nstack);
                }
            }
            ContentShape::TextOnly => {
                self.sink.start_element(&self.fstack, element, &self.nstack)?;
                self.inline(content)?;
            }
            ContentShape::Mixed => {
                self.sink.start_element(&self.fstack, element, &self.nstack)?;
                self.segments(content, Layout::Element)?;
            }
        }
        self.sink.end_element(&self.fstack, element, &self.nstack)
    }

    /// Like [`content_shape`], but escaping PIs this pass consumes do not
    /// count as content.
    fn shape_of(&self, content: &[Content]) -> ContentShape {
        let shape = content_shape(content, self.fstack.text_mode());
        let only_pis = content
            .iter()
            .all(|node| node.is_text_like() || self.escaping_pi(node).is_some());
        if shape != ContentShape::Mixed || !only_pis {
            return shape;
        }
        let mut text = content
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_text_like())
            .peekable();
        if text.peek().is_none() {
            return ContentShape::Empty;
        }
        let preserve = self.fstack.text_mode() == TextMode::Preserve;
        if !preserve && text.all(|(i, _)| run_is_all_whitespace(content, i, 1)) {
            return ContentShape::Empty;
        }
        ContentShape::TextOnly
    }

    /// Writes text-only content with no padding, applying any escaping PIs
    /// between its runs.
    fn inline(&mut self, content: &[Content]) -> Result<()> {
        for segment in Segments::new(content) {
            match segment {
                Segment::Text(run) => self.run(run)?,
                Segment::Structural(node) => {
                    if !self.consume_escaping_pi(node) {
                        self.structural(node)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn segments(&mut self, content: &[Content], layout: Layout) -> Result<()> {
        if layout == Layout::Element {
            self.pad_eol()?;
        }

        let mut first = true;
        for segment in Segments::new(content) {
            match segment {
                Segment::Structural(node) => {
                    if self.consume_escaping_pi(node) {
                        continue;
                    }
                    self.pad_before(layout, first)?;
                    self.structural(node)?;
                }
                Segment::Text(run) => {
                    if self.fstack.text_mode() != TextMode::Preserve && run.is_all_whitespace() {
                        continue;
                    }
                    self.pad_before(layout, first)?;
                    self.run(run)?;
                }
            }
            if layout == Layout::Element {
                self.pad_eol()?;
            }
            first = false;
        }

        if layout == Layout::Element {
            if let Some(indent) = self.fstack.closing_indent().filter(|s| !s.is_empty()) {
                self.sink.raw_indent(&self.fstack, indent)?;
            }
        }
        Ok(())
    }

    fn pad_before(&mut self, layout: Layout, first: bool) -> Result<()> {
        if layout == Layout::Fragment && !first {
            self.pad_eol()?;
        }
        match self.fstack.level_indent() {
            Some(indent) if !indent.is_empty() => self.sink.raw_indent(&self.fstack, indent),
            _ => Ok(()),
        }
    }

    fn pad_eol(&mut self) -> Result<()> {
        match self.fstack.level_eol() {
            Some(eol) => self.sink.raw_eol(&self.fstack, eol),
            None => Ok(()),
        }
    }

    fn run(&mut self, run: TextRun<'_>) -> Result<()> {
        for emission in format_run(&run, self.fstack.text_mode())? {
            match emission {
                TextEmission::Text(text) => self.sink.text(&self.fstack, &text)?,
                TextEmission::CData(text) => self.sink.cdata(&self.fstack, &text)?,
                TextEmission::EntityRef(name) => self.sink.entity_ref(&self.fstack, name)?,
            }
        }
        Ok(())
    }

    fn structural(&mut self, node: &Content) -> Result<()> {
        match node {
            Content::Element(e) => self.element(e),
            Content::Comment(c) => self.sink.comment(&self.fstack, c),
            Content::ProcessingInstruction(pi) => {
                self.sink.processing_instruction(&self.fstack, pi)
            }
            Content::DocType(d) => self.sink.doctype(&self.fstack, d),
            Content::Text(_) | Content::CData(_) | Content::EntityRef(_) => Err(Error::Internal(
                format!("{:?} node dispatched as structural content", node.kind()),
            )),
        }
    }

    /// The escape setting `node` selects if it is a TrAX escaping PI that
    /// this pass consumes. Sinks that cannot honour them, and formats that
    /// ignore them, get the PI as ordinary content.
    fn escaping_pi(&self, node: &Content) -> Option<bool> {
        let Content::ProcessingInstruction(pi) = node else {
            return None;
        };
        if !self.sink.honours_escaping_pis() || self.fstack.format().ignore_trax_escaping_pis() {
            return None;
        }
        match pi.target() {
            PI_DISABLE_OUTPUT_ESCAPING => Some(false),
            PI_ENABLE_OUTPUT_ESCAPING => Some(true),
            _ => None,
        }
    }

    /// Applies `node` if it is a consumed escaping PI. Returns true if it
    /// was one.
    fn consume_escaping_pi(&mut self, node: &Content) -> bool {
        let Some(escape) = self.escaping_pi(node) else {
            return false;
        };
        log::trace!(
            "output escaping {} at depth {}",
            if escape { "on" } else { "off" },
            self.fstack.depth()
        );
        self.fstack.set_escape_output(escape);
        true
    }
}
