//! The output engine shared by every back end.
//!
//! [`Emitter`] walks a tree once, deciding grouping, whitespace, and
//! padding. Each back end only implements [`OutputSink`], the set of
//! primitive write operations, so the text, SAX, DOM and StAX outputters
//! produce the same logical output from the same walk.

mod emitter;
mod namespace_stack;
pub mod run;
pub mod text;

pub use emitter::Emitter;
pub use namespace_stack::NamespaceStack;
pub use run::{ContentShape, Segment, TextRun};
pub use text::TextEmission;

use crate::error::Result;
use crate::format::FormatStack;
use crate::model::{Attribute, Comment, DocType, Element, ProcessingInstruction};

/// Receives the primitive write operations of an output pass.
///
/// Every method gets the current [`FormatStack`] so sinks that serialize
/// text can apply the level's escaping policy. Strings passed to
/// [`OutputSink::text`] and attribute values are unescaped; the padding
/// passed to [`OutputSink::raw_indent`] and [`OutputSink::raw_eol`] is
/// pure whitespace and must be written untouched (or dropped by sinks that
/// have no place for it).
pub trait OutputSink {
    /// Called once before a document's content.
    fn start_document(&mut self, _fstack: &FormatStack) -> Result<()> {
        Ok(())
    }

    /// Called once after a document's content.
    fn end_document(&mut self, _fstack: &FormatStack) -> Result<()> {
        Ok(())
    }

    /// Writes the XML declaration. Not called when the format omits it.
    fn declaration(&mut self, fstack: &FormatStack) -> Result<()>;

    fn doctype(&mut self, fstack: &FormatStack, doctype: &DocType) -> Result<()>;

    /// Opens an element. `nstack` has already been pushed for it, so
    /// [`NamespaceStack::added_forward`] lists the bindings to declare.
    fn start_element(
        &mut self,
        fstack: &FormatStack,
        element: &Element,
        nstack: &NamespaceStack,
    ) -> Result<()>;

    /// Writes an element with no content in self-closing form.
    fn empty_element(
        &mut self,
        fstack: &FormatStack,
        element: &Element,
        nstack: &NamespaceStack,
    ) -> Result<()> {
        self.start_element(fstack, element, nstack)?;
        self.end_element(fstack, element, nstack)
    }

    /// Closes an element. [`NamespaceStack::added_reverse`] lists the
    /// bindings going out of scope.
    fn end_element(
        &mut self,
        fstack: &FormatStack,
        element: &Element,
        nstack: &NamespaceStack,
    ) -> Result<()>;

    fn text(&mut self, fstack: &FormatStack, text: &str) -> Result<()>;

    fn cdata(&mut self, fstack: &FormatStack, text: &str) -> Result<()>;

    fn comment(&mut self, fstack: &FormatStack, comment: &Comment) -> Result<()>;

    fn processing_instruction(
        &mut self,
        fstack: &FormatStack,
        pi: &ProcessingInstruction,
    ) -> Result<()>;

    fn entity_ref(&mut self, fstack: &FormatStack, name: &str) -> Result<()>;

    /// Indentation before a segment or end tag.
    fn raw_indent(&mut self, fstack: &FormatStack, indent: &str) -> Result<()>;

    /// Line break after a segment.
    fn raw_eol(&mut self, fstack: &FormatStack, eol: &str) -> Result<()>;

    /// True if the sink applies [`FormatStack::escape_output`] itself, so
    /// the TrAX escaping PIs can be consumed instead of forwarded.
    fn honours_escaping_pis(&self) -> bool {
        false
    }
}

/// Attributes of `element` that the format says to write.
pub fn output_attributes<'a>(
    fstack: &FormatStack,
    element: &'a Element,
) -> impl Iterator<Item = &'a Attribute> {
    let specified_only = fstack.format().specified_attributes_only();
    element
        .attributes()
        .iter()
        .filter(move |a| !specified_only || a.is_specified())
}
