//! The document model consumed by the outputters.
//!
//! Trees are plain owned values: a [`Document`] holds an ordered list of
//! [`Content`], and an [`Element`] holds its own. Output never mutates them,
//! so one tree can be written by several outputters at once.

mod element;
mod namespace;
mod text;

pub use element::{Attribute, AttributeType, Element};
pub use namespace::{is_xmlns_attr, split_qname, Namespace, NamespaceContext};
pub use text::{CData, Comment, DocType, EntityRef, ProcessingInstruction, Text};

use bitflags::bitflags;

/// Discriminant of a [`Content`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Element,
    Text,
    CData,
    Comment,
    ProcessingInstruction,
    EntityRef,
    DocType,
}

impl ContentKind {
    /// Returns the single-bit mask for this kind.
    pub fn mask(self) -> ContentMask {
        match self {
            ContentKind::Element => ContentMask::ELEMENT,
            ContentKind::Text => ContentMask::TEXT,
            ContentKind::CData => ContentMask::CDATA,
            ContentKind::Comment => ContentMask::COMMENT,
            ContentKind::ProcessingInstruction => ContentMask::PI,
            ContentKind::EntityRef => ContentMask::ENTITY_REF,
            ContentKind::DocType => ContentMask::DOCTYPE,
        }
    }
}

bitflags! {
    /// Sets of content kinds, used to classify content lists.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContentMask: u8 {
        const ELEMENT = 1;
        const CDATA = 1 << 1;
        const TEXT = 1 << 2;
        const COMMENT = 1 << 3;
        const PI = 1 << 4;
        const ENTITY_REF = 1 << 5;
        const DOCTYPE = 1 << 6;
        /// Nodes that merge into text runs.
        const TEXT_LIKE = Self::TEXT.bits() | Self::CDATA.bits() | Self::ENTITY_REF.bits();
        /// Nodes that always stand alone.
        const STRUCTURAL = Self::ELEMENT.bits()
            | Self::COMMENT.bits()
            | Self::PI.bits()
            | Self::DOCTYPE.bits();
    }
}

impl ContentMask {
    /// Union of the kinds present in a content list.
    pub fn of(content: &[Content]) -> ContentMask {
        content
            .iter()
            .fold(ContentMask::empty(), |mask, node| mask | node.kind().mask())
    }
}

/// One node of element or document content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Element(Element),
    Text(Text),
    CData(CData),
    Comment(Comment),
    ProcessingInstruction(ProcessingInstruction),
    EntityRef(EntityRef),
    DocType(DocType),
}

impl Content {
    /// Returns the kind tag used for dispatch.
    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Element(_) => ContentKind::Element,
            Content::Text(_) => ContentKind::Text,
            Content::CData(_) => ContentKind::CData,
            Content::Comment(_) => ContentKind::Comment,
            Content::ProcessingInstruction(_) => ContentKind::ProcessingInstruction,
            Content::EntityRef(_) => ContentKind::EntityRef,
            Content::DocType(_) => ContentKind::DocType,
        }
    }

    /// Returns true for Text, CDATA and entity references.
    pub fn is_text_like(&self) -> bool {
        ContentMask::TEXT_LIKE.contains(self.kind().mask())
    }

    /// Character data carried by Text and CDATA nodes.
    pub fn char_data(&self) -> Option<&str> {
        match self {
            Content::Text(t) => Some(t.text()),
            Content::CData(c) => Some(c.text()),
            _ => None,
        }
    }

    /// Returns a reference to the element, if this is an element node.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Content::Element(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Element> for Content {
    fn from(e: Element) -> Self {
        Content::Element(e)
    }
}

impl From<Text> for Content {
    fn from(t: Text) -> Self {
        Content::Text(t)
    }
}

impl From<CData> for Content {
    fn from(c: CData) -> Self {
        Content::CData(c)
    }
}

impl From<Comment> for Content {
    fn from(c: Comment) -> Self {
        Content::Comment(c)
    }
}

impl From<ProcessingInstruction> for Content {
    fn from(pi: ProcessingInstruction) -> Self {
        Content::ProcessingInstruction(pi)
    }
}

impl From<EntityRef> for Content {
    fn from(e: EntityRef) -> Self {
        Content::EntityRef(e)
    }
}

impl From<DocType> for Content {
    fn from(d: DocType) -> Self {
        Content::DocType(d)
    }
}

/// A complete document: prolog nodes, the root element and trailing
/// comments or PIs, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    content: Vec<Content>,
}

impl Document {
    /// Creates a document with the given root element.
    pub fn new(root: Element) -> Self {
        Document {
            content: vec![Content::Element(root)],
        }
    }

    /// Creates a document from raw top-level content.
    pub fn from_content(content: Vec<Content>) -> Self {
        Document { content }
    }

    /// Appends a top-level node.
    pub fn add_content(&mut self, content: impl Into<Content>) {
        self.content.push(content.into());
    }

    /// Builder form of [`Document::add_content`].
    pub fn with_content(mut self, content: impl Into<Content>) -> Self {
        self.add_content(content);
        self
    }

    /// Places a DOCTYPE first, replacing any existing one.
    pub fn with_doctype(mut self, doctype: DocType) -> Self {
        self.content.retain(|c| !matches!(c, Content::DocType(_)));
        self.content.insert(0, Content::DocType(doctype));
        self
    }

    pub fn content(&self) -> &[Content] {
        &self.content
    }

    /// Returns the first element in the document.
    pub fn root(&self) -> Option<&Element> {
        self.content.iter().find_map(Content::as_element)
    }

    pub fn doctype(&self) -> Option<&DocType> {
        self.content.iter().find_map(|c| match c {
            Content::DocType(d) => Some(d),
            _ => None,
        })
    }
}
