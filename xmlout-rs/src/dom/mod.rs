//! A small mutable DOM.
//!
//! Nodes are shared as [`DomRef`] (`Rc<RefCell<DomNode>>`) with weak
//! parent links, so a tree can be walked in both directions and edited in
//! place. [`DomOutputter`] builds these trees from the document model.

mod outputter;

pub use outputter::DomOutputter;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::format::{escape_attribute, escape_text, UnicodeEscape};

/// A reference-counted pointer to a DOM node.
pub type DomRef = Rc<RefCell<DomNode>>;

/// Creates a detached node.
pub fn new_dom_node(data: DomData) -> DomRef {
    Rc::new(RefCell::new(DomNode {
        data,
        children: Vec::new(),
        parent: Weak::new(),
    }))
}

/// An attribute node. Namespace declarations are attributes in the
/// `http://www.w3.org/2000/xmlns/` namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomAttr {
    pub namespace_uri: Option<String>,
    pub prefix: Option<String>,
    pub local_name: String,
    pub value: String,
}

impl DomAttr {
    /// `prefix:local`, or the local name alone.
    pub fn name(&self) -> String {
        qualify(self.prefix.as_deref(), &self.local_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomElement {
    pub namespace_uri: Option<String>,
    pub prefix: Option<String>,
    pub local_name: String,
    pub attributes: Vec<DomAttr>,
}

impl DomElement {
    pub fn tag_name(&self) -> String {
        qualify(self.prefix.as_deref(), &self.local_name)
    }

    /// Looks an attribute up by qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name() == name)
            .map(|a| a.value.as_str())
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomData {
    Document,
    /// Holds top-level nodes that have no document.
    DocumentFragment,
    DocumentType {
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
        internal_subset: Option<String>,
    },
    Element(DomElement),
    Text(String),
    CDataSection(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
    EntityReference(String),
}

/// A node in a DOM tree.
#[derive(Debug)]
pub struct DomNode {
    data: DomData,
    children: Vec<DomRef>,
    parent: Weak<RefCell<DomNode>>,
}

impl DomNode {
    pub fn data(&self) -> &DomData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut DomData {
        &mut self.data
    }

    pub fn children(&self) -> &[DomRef] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn parent(&self) -> Option<DomRef> {
        self.parent.upgrade()
    }

    pub fn as_element(&self) -> Option<&DomElement> {
        match &self.data {
            DomData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// The DOM `nodeName`.
    pub fn node_name(&self) -> String {
        match &self.data {
            DomData::Document => "#document".to_string(),
            DomData::DocumentFragment => "#document-fragment".to_string(),
            DomData::DocumentType { name, .. } => name.clone(),
            DomData::Element(e) => e.tag_name(),
            DomData::Text(_) => "#text".to_string(),
            DomData::CDataSection(_) => "#cdata-section".to_string(),
            DomData::Comment(_) => "#comment".to_string(),
            DomData::ProcessingInstruction { target, .. } => target.clone(),
            DomData::EntityReference(name) => name.clone(),
        }
    }

    /// Appends `child` to `parent`, detaching nothing; `child` must not
    /// already have a parent.
    pub fn append_child(parent: &DomRef, child: DomRef) {
        child.borrow_mut().parent = Rc::downgrade(parent);
        parent.borrow_mut().children.push(child);
    }

    /// Removes and returns the child at `index`.
    pub fn remove_child(parent: &DomRef, index: usize) -> Option<DomRef> {
        let mut node = parent.borrow_mut();
        if index >= node.children.len() {
            return None;
        }
        let child = node.children.remove(index);
        child.borrow_mut().parent = Weak::new();
        Some(child)
    }

    /// The DOM `textContent`: concatenated text and CDATA of the subtree.
    pub fn text_content(node: &DomRef) -> String {
        let mut out = String::new();
        collect_text(node, &mut out);
        out
    }

    /// Merges adjacent text nodes and removes empty ones, recursively.
    pub fn normalize(node: &DomRef) {
        let children = std::mem::take(&mut node.borrow_mut().children);
        let mut merged: Vec<DomRef> = Vec::with_capacity(children.len());

        for child in children {
            let text = match &child.borrow().data {
                DomData::Text(t) => Some(t.clone()),
                _ => None,
            };
            match text {
                Some(t) if t.is_empty() => continue,
                Some(t) => {
                    if let Some(last) = merged.last() {
                        if let DomData::Text(prev) = &mut last.borrow_mut().data {
                            prev.push_str(&t);
                            continue;
                        }
                    }
                }
                None => DomNode::normalize(&child),
            }
            merged.push(child);
        }
        node.borrow_mut().children = merged;
    }

    /// Serializes the subtree as XML without a declaration. Empty elements
    /// use the self-closing form.
    pub fn serialize(node: &DomRef) -> String {
        let mut out = String::new();
        write_node(node, &mut out);
        out
    }
}

fn qualify(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{}:{}", p, local),
        _ => local.to_string(),
    }
}

fn collect_text(node: &DomRef, out: &mut String) {
    let node = node.borrow();
    match &node.data {
        DomData::Text(t) | DomData::CDataSection(t) => out.push_str(t),
        DomData::Comment(_) | DomData::ProcessingInstruction { .. } => {}
        _ => {
            for child in &node.children {
                collect_text(child, out);
            }
        }
    }
}

fn write_node(node: &DomRef, out: &mut String) {
    let node = node.borrow();
    match &node.data {
        DomData::Document | DomData::DocumentFragment => {
            for child in &node.children {
                write_node(child, out);
            }
        }
        DomData::DocumentType {
            name,
            public_id,
            system_id,
            internal_subset,
        } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            if let Some(p) = public_id {
                out.push_str(&format!(" PUBLIC \"{}\"", p));
            }
            if let Some(s) = system_id {
                if public_id.is_none() {
                    out.push_str(" SYSTEM");
                }
                out.push_str(&format!(" \"{}\"", s));
            }
            if let Some(subset) = internal_subset {
                out.push_str(&format!(" [{}]", subset));
            }
            out.push('>');
        }
        DomData::Element(e) => {
            out.push('<');
            out.push_str(&e.tag_name());
            for attr in &e.attributes {
                out.push(' ');
                out.push_str(&attr.name());
                out.push_str("=\"");
                out.push_str(&escape_attribute(&UnicodeEscape, &attr.value));
                out.push('"');
            }
            if node.children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in &node.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&e.tag_name());
            out.push('>');
        }
        DomData::Text(t) => out.push_str(&escape_text(&UnicodeEscape, None, t)),
        DomData::CDataSection(t) => {
            out.push_str("<![CDATA[");
            out.push_str(&t.replace("]]>", "]]]]><![CDATA[>"));
            out.push_str("]]>");
        }
        DomData::Comment(t) => {
            out.push_str("<!--");
            out.push_str(t);
            out.push_str("-->");
        }
        DomData::ProcessingInstruction { target, data } => {
            out.push_str("<?");
            out.push_str(target);
            if !data.is_empty() {
                out.push(' ');
                out.push_str(data);
            }
            out.push_str("?>");
        }
        DomData::EntityReference(name) => {
            out.push('&');
            out.push_str(name);
            out.push(';');
        }
    }
}
