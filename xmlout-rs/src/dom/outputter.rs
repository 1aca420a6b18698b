//! Builds DOM trees from the document model.

use super::{new_dom_node, DomAttr, DomData, DomElement, DomNode, DomRef};
use crate::constants::XMLNS_NAMESPACE_URI;
use crate::error::Result;
use crate::format::{Format, FormatStack};
use crate::model::{Comment, Content, DocType, Document, Element, ProcessingInstruction};
use crate::output::{output_attributes, Emitter, NamespaceStack, OutputSink};

/// Outputs model trees as DOM nodes.
///
/// Formatting applies as for text output: padding inside elements becomes
/// whitespace text nodes, text is trimmed or normalized per the format's
/// mode. Padding outside the root element is dropped.
#[derive(Debug, Clone, Default)]
pub struct DomOutputter {
    format: Format,
}

impl DomOutputter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: Format) -> Self {
        DomOutputter { format }
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    /// Returns a `Document` node.
    pub fn output_document(&self, doc: &Document) -> Result<DomRef> {
        let roots = self.run("while outputting the Document", |e| e.document(doc))?;
        Ok(single(roots))
    }

    /// Returns a detached `Element` node.
    pub fn output_element(&self, element: &Element) -> Result<DomRef> {
        let roots = self.run("while outputting the Element", |e| e.element(element))?;
        Ok(single(roots))
    }

    /// Returns the detached top-level nodes of a content list.
    pub fn output_content_list(&self, content: &[Content]) -> Result<Vec<DomRef>> {
        self.run("while outputting the content list", |e| e.content_list(content))
    }

    fn run<F>(&self, context: &'static str, body: F) -> Result<Vec<DomRef>>
    where
        F: FnOnce(&mut Emitter<'_, DomSink>) -> Result<()>,
    {
        log::debug!("DOM output with {:?}", self.format.text_mode());
        let mut sink = DomSink::default();
        body(&mut Emitter::new(&self.format, &mut sink)).map_err(|e| e.in_context(context))?;
        Ok(sink.roots)
    }
}

/// The first root, or an empty fragment when the pass produced nothing.
fn single(mut roots: Vec<DomRef>) -> DomRef {
    if roots.is_empty() {
        new_dom_node(DomData::DocumentFragment)
    } else {
        roots.swap_remove(0)
    }
}

#[derive(Default)]
struct DomSink {
    /// Open containers, innermost last.
    open: Vec<DomRef>,
    roots: Vec<DomRef>,
}

impl DomSink {
    fn append(&mut self, node: DomRef) {
        match self.open.last() {
            Some(parent) => DomNode::append_child(parent, node),
            None => self.roots.push(node),
        }
    }

    fn append_data(&mut self, data: DomData) -> Result<()> {
        self.append(new_dom_node(data));
        Ok(())
    }

    fn padding(&mut self, fstack: &FormatStack, whitespace: &str) -> Result<()> {
        if fstack.depth() == 0 || whitespace.is_empty() {
            return Ok(());
        }
        self.append_data(DomData::Text(whitespace.to_string()))
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

impl OutputSink for DomSink {
    fn start_document(&mut self, _fstack: &FormatStack) -> Result<()> {
        let doc = new_dom_node(DomData::Document);
        self.append(doc.clone());
        self.open.push(doc);
        Ok(())
    }

    fn end_document(&mut self, _fstack: &FormatStack) -> Result<()> {
        self.open.pop();
        Ok(())
    }

    fn declaration(&mut self, _fstack: &FormatStack) -> Result<()> {
        Ok(())
    }

    fn doctype(&mut self, _fstack: &FormatStack, doctype: &DocType) -> Result<()> {
        self.append_data(DomData::DocumentType {
            name: doctype.element_name().to_string(),
            public_id: doctype.public_id().map(str::to_string),
            system_id: doctype.system_id().map(str::to_string),
            internal_subset: doctype.internal_subset().map(str::to_string),
        })
    }

    fn start_element(
        &mut self,
        fstack: &FormatStack,
        element: &Element,
        nstack: &NamespaceStack,
    ) -> Result<()> {
        let mut attributes = Vec::new();
        for ns in nstack.added_forward() {
            let (prefix, local_name) = if ns.prefix().is_empty() {
                (None, "xmlns".to_string())
            } else {
                (Some("xmlns".to_string()), ns.prefix().to_string())
            };
            attributes.push(DomAttr {
                namespace_uri: Some(XMLNS_NAMESPACE_URI.to_string()),
                prefix,
                local_name,
                value: ns.uri().to_string(),
            });
        }
        for attr in output_attributes(fstack, element) {
            attributes.push(DomAttr {
                namespace_uri: non_empty(attr.namespace().uri()),
                prefix: non_empty(attr.namespace().prefix()),
                local_name: attr.name().to_string(),
                value: attr.value().to_string(),
            });
        }

        let node = new_dom_node(DomData::Element(DomElement {
            namespace_uri: non_empty(element.namespace().uri()),
            prefix: non_empty(element.namespace().prefix()),
            local_name: element.name().to_string(),
            attributes,
        }));
        self.append(node.clone());
        self.open.push(node);
        Ok(())
    }

    fn end_element(
        &mut self,
        _fstack: &FormatStack,
        _element: &Element,
        _nstack: &NamespaceStack,
    ) -> Result<()> {
        self.open.pop();
        Ok(())
    }

    fn text(&mut self, _fstack: &FormatStack, text: &str) -> Result<()> {
        self.append_data(DomData::Text(text.to_string()))
    }

    fn cdata(&mut self, _fstack: &FormatStack, text: &str) -> Result<()> {
        self.append_data(DomData::CDataSection(text.to_string()))
    }

    fn comment(&mut self, _fstack: &FormatStack, comment: &Comment) -> Result<()> {
        self.append_data(DomData::Comment(comment.text().to_string()))
    }

    fn processing_instruction(
        &mut self,
        _fstack: &FormatStack,
        pi: &ProcessingInstruction,
    ) -> Result<()> {
        self.append_data(DomData::ProcessingInstruction {
            target: pi.target().to_string(),
            data: pi.data().to_string(),
        })
    }

    fn entity_ref(&mut self, _fstack: &FormatStack, name: &str) -> Result<()> {
        self.append_data(DomData::EntityReference(name.to_string()))
    }

    fn raw_indent(&mut self, fstack: &FormatStack, indent: &str) -> Result<()> {
        self.padding(fstack, indent)
    }

    fn raw_eol(&mut self, fstack: &FormatStack, eol: &str) -> Result<()> {
        self.padding(fstack, eol)
    }
}
