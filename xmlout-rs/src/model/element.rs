//! Elements and their attributes.

use std::borrow::Cow;
use std::fmt;

use super::namespace::Namespace;
use super::text::Text;
use super::Content;

/// Declared type of an attribute, as a DTD would state it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttributeType {
    /// No declaration seen.
    #[default]
    Undeclared,
    CData,
    Id,
    IdRef,
    IdRefs,
    Entity,
    Entities,
    NmToken,
    NmTokens,
    Notation,
    /// A list of allowed values.
    Enumeration,
}

impl AttributeType {
    /// Type name reported through SAX attribute lists.
    pub fn sax_name(self) -> &'static str {
        match self {
            AttributeType::Undeclared | AttributeType::CData => "CDATA",
            AttributeType::Id => "ID",
            AttributeType::IdRef => "IDREF",
            AttributeType::IdRefs => "IDREFS",
            AttributeType::Entity => "ENTITY",
            AttributeType::Entities => "ENTITIES",
            AttributeType::NmToken | AttributeType::Enumeration => "NMTOKEN",
            AttributeType::NmTokens => "NMTOKENS",
            AttributeType::Notation => "NOTATION",
        }
    }
}

/// An attribute of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Local name, without prefix.
    name: String,
    value: String,
    namespace: Namespace,
    attribute_type: AttributeType,
    /// False when the value was defaulted by a DTD rather than written.
    specified: bool,
}

impl Attribute {
    /// Creates an attribute in no namespace.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new_ns(name, value, Namespace::NO_NAMESPACE)
    }

    /// Creates an attribute in the given namespace.
    pub fn new_ns(name: impl Into<String>, value: impl Into<String>, namespace: Namespace) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
            namespace,
            attribute_type: AttributeType::Undeclared,
            specified: true,
        }
    }

    /// Sets the declared type.
    pub fn with_type(mut self, attribute_type: AttributeType) -> Self {
        self.attribute_type = attribute_type;
        self
    }

    /// Marks the attribute as defaulted (not written in the source).
    pub fn with_specified(mut self, specified: bool) -> Self {
        self.specified = specified;
        self
    }

    /// Returns the local name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unescaped value.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn attribute_type(&self) -> AttributeType {
        self.attribute_type
    }

    pub fn is_specified(&self) -> bool {
        self.specified
    }

    /// Returns `prefix:name`, or just the name when unprefixed.
    pub fn qualified_name(&self) -> Cow<'_, str> {
        qualify(self.namespace.prefix(), &self.name)
    }

    fn same_key(&self, other: &Attribute) -> bool {
        self.name == other.name && self.namespace.uri() == other.namespace.uri()
    }
}

/// An XML element: name, namespace, attributes and ordered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Local name, without prefix.
    name: String,
    namespace: Namespace,
    /// Insertion ordered; unique per (local name, namespace URI).
    attributes: Vec<Attribute>,
    /// Declarations that are not the element's own namespace.
    additional_namespaces: Vec<Namespace>,
    content: Vec<Content>,
}

impl Element {
    /// Creates an element in no namespace.
    pub fn new(name: impl Into<String>) -> Self {
        Self::new_ns(name, Namespace::NO_NAMESPACE)
    }

    /// Creates an element in the given namespace.
    pub fn new_ns(name: impl Into<String>, namespace: Namespace) -> Self {
        Element {
            name: name.into(),
            namespace,
            attributes: Vec::new(),
            additional_namespaces: Vec::new(),
            content: Vec::new(),
        }
    }

    /// Returns the local name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Returns `prefix:name`, or just the name when unprefixed.
    pub fn qualified_name(&self) -> Cow<'_, str> {
        qualify(self.namespace.prefix(), &self.name)
    }

    /// Adds an attribute, replacing one with the same name and namespace.
    pub fn set_attribute(&mut self, attribute: Attribute) {
        match self.attributes.iter_mut().find(|a| a.same_key(&attribute)) {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }

    /// Builder form of [`Element::set_attribute`] for no-namespace
    /// attributes.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(Attribute::new(name, value));
        self
    }

    /// Builder form of [`Element::set_attribute`].
    pub fn with_attribute_node(mut self, attribute: Attribute) -> Self {
        self.set_attribute(attribute);
        self
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Looks up a no-namespace attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attribute_ns(name, &Namespace::NO_NAMESPACE)
    }

    /// Looks up an attribute by local name and namespace URI.
    pub fn attribute_ns(&self, name: &str, namespace: &Namespace) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name == name && a.namespace.uri() == namespace.uri())
    }

    /// Value of the `xml:space` attribute, if present.
    pub fn xml_space(&self) -> Option<&str> {
        self.attribute_ns("space", &Namespace::XML_NAMESPACE)
            .map(Attribute::value)
    }

    /// Declares a namespace on this element without using it for the
    /// element's own name. Re-declaring a prefix replaces the old binding.
    pub fn add_namespace_declaration(&mut self, namespace: Namespace) {
        if namespace == self.namespace || namespace.is_xml() {
            return;
        }
        match self
            .additional_namespaces
            .iter_mut()
            .find(|ns| ns.prefix() == namespace.prefix())
        {
            Some(existing) => *existing = namespace,
            None => self.additional_namespaces.push(namespace),
        }
    }

    /// Builder form of [`Element::add_namespace_declaration`].
    pub fn with_namespace_declaration(mut self, namespace: Namespace) -> Self {
        self.add_namespace_declaration(namespace);
        self
    }

    pub fn additional_namespaces(&self) -> &[Namespace] {
        &self.additional_namespaces
    }

    /// Appends a child node.
    pub fn add_content(&mut self, content: impl Into<Content>) {
        self.content.push(content.into());
    }

    /// Builder form of [`Element::add_content`].
    pub fn with_content(mut self, content: impl Into<Content>) -> Self {
        self.add_content(content);
        self
    }

    /// Appends a text node.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_content(Text::new(text))
    }

    /// Returns the ordered child nodes.
    pub fn content(&self) -> &[Content] {
        &self.content
    }

    /// Iterates over child elements only.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.content.iter().filter_map(Content::as_element)
    }

    /// Returns the first child element with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children().find(|e| e.name == name)
    }

    /// Concatenation of the direct Text and CDATA children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.content {
            match node {
                Content::Text(t) => out.push_str(t.text()),
                Content::CData(c) => out.push_str(c.text()),
                _ => {}
            }
        }
        out
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Element: <{}", self.qualified_name())?;
        if !self.namespace.uri().is_empty() {
            write!(f, " [Namespace: {}]", self.namespace.uri())?;
        }
        write!(f, "/>]")
    }
}

fn qualify<'a>(prefix: &str, name: &'a str) -> Cow<'a, str> {
    if prefix.is_empty() {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{}:{}", prefix, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_replacement_keeps_order() {
        let mut e = Element::new("e")
            .with_attribute("a", "1")
            .with_attribute("b", "2");
        e.set_attribute(Attribute::new("a", "3"));

        let names: Vec<_> = e.attributes().iter().map(|a| (a.name(), a.value())).collect();
        assert_eq!(names, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_namespaced_attributes_are_distinct() {
        let ns = Namespace::new("x", "urn:x");
        let e = Element::new("e")
            .with_attribute("a", "plain")
            .with_attribute_node(Attribute::new_ns("a", "qualified", ns.clone()));

        assert_eq!(e.attributes().len(), 2);
        assert_eq!(e.attribute("a").map(Attribute::value), Some("plain"));
        assert_eq!(e.attribute_ns("a", &ns).map(Attribute::value), Some("qualified"));
        assert_eq!(e.attributes()[1].qualified_name(), "x:a");
    }

    #[test]
    fn test_xml_space() {
        let e = Element::new("pre").with_attribute_node(Attribute::new_ns(
            "space",
            "preserve",
            Namespace::XML_NAMESPACE,
        ));
        assert_eq!(e.xml_space(), Some("preserve"));
        assert_eq!(Element::new("p").xml_space(), None);
    }

    #[test]
    fn test_qualified_name() {
        let e = Element::new_ns("rect", Namespace::new("svg", "http://www.w3.org/2000/svg"));
        assert_eq!(e.qualified_name(), "svg:rect");
        assert_eq!(Element::new("rect").qualified_name(), "rect");
    }

    #[test]
    fn test_namespace_declarations() {
        let own = Namespace::new("a", "urn:a");
        let e = Element::new_ns("e", own.clone())
            .with_namespace_declaration(own)
            .with_namespace_declaration(Namespace::new("b", "urn:b"))
            .with_namespace_declaration(Namespace::new("b", "urn:b2"))
            .with_namespace_declaration(Namespace::XML_NAMESPACE);

        assert_eq!(e.additional_namespaces(), &[Namespace::new("b", "urn:b2")]);
    }

    #[test]
    fn test_text_concatenation() {
        use crate::model::{CData, Comment};
        let e = Element::new("e")
            .with_text("a")
            .with_content(Comment::new("skip"))
            .with_content(CData::new("<b>"))
            .with_content(Element::new("child").with_text("ignored"));
        assert_eq!(e.text(), "a<b>");
        assert_eq!(e.children().count(), 1);
        assert!(e.child("child").is_some());
    }

    #[test]
    fn test_sax_type_names() {
        assert_eq!(AttributeType::Undeclared.sax_name(), "CDATA");
        assert_eq!(AttributeType::Enumeration.sax_name(), "NMTOKEN");
        assert_eq!(AttributeType::IdRefs.sax_name(), "IDREFS");
    }
}
