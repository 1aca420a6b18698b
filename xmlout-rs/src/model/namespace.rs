//! Namespace handling for XML elements.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::constants::XML_NAMESPACE_URI;

/// A prefix bound to a namespace URI.
///
/// The empty prefix is the default namespace; the empty URI with the empty
/// prefix is "no namespace".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    prefix: Cow<'static, str>,
    uri: Cow<'static, str>,
}

impl Namespace {
    /// The absence of a namespace (`xmlns=""`).
    pub const NO_NAMESPACE: Namespace = Namespace {
        prefix: Cow::Borrowed(""),
        uri: Cow::Borrowed(""),
    };

    /// The namespace permanently bound to the `xml` prefix.
    pub const XML_NAMESPACE: Namespace = Namespace {
        prefix: Cow::Borrowed("xml"),
        uri: Cow::Borrowed(XML_NAMESPACE_URI),
    };

    /// Creates a namespace binding. The reserved `xml` prefix and the empty
    /// binding map onto their singletons.
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let uri = uri.into();
        if prefix.is_empty() && uri.is_empty() {
            return Self::NO_NAMESPACE;
        }
        if prefix == "xml" && uri == XML_NAMESPACE_URI {
            return Self::XML_NAMESPACE;
        }
        Namespace {
            prefix: Cow::Owned(prefix),
            uri: Cow::Owned(uri),
        }
    }

    /// Creates a default (unprefixed) namespace.
    pub fn default_for(uri: impl Into<String>) -> Self {
        Self::new("", uri)
    }

    /// Returns the prefix, empty for the default namespace.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the namespace URI, empty for no namespace.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns true for [`Namespace::NO_NAMESPACE`].
    pub fn is_none(&self) -> bool {
        self.prefix.is_empty() && self.uri.is_empty()
    }

    /// Returns true for the reserved `xml` namespace.
    pub fn is_xml(&self) -> bool {
        self.prefix == "xml"
    }

    /// Name of the attribute that declares this binding.
    pub fn declaration_name(&self) -> String {
        if self.prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", self.prefix)
        }
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::NO_NAMESPACE
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Namespace: prefix \"{}\" is mapped to URI \"{}\"]", self.prefix, self.uri)
    }
}

/// Tracks prefix bindings while a document is being read.
pub struct NamespaceContext {
    /// Stack of scopes, each containing prefix -> URI bindings.
    scopes: Vec<HashMap<String, String>>,
}

impl Default for NamespaceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceContext {
    /// Creates a new namespace context with the xml prefix pre-bound.
    pub fn new() -> Self {
        let mut ctx = NamespaceContext {
            scopes: vec![HashMap::new()],
        };
        ctx.bind("xml", XML_NAMESPACE_URI);
        ctx
    }

    /// Pushes a new scope for entering an element.
    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pops the current scope when leaving an element.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Binds a prefix to a URI in the current scope.
    pub fn bind(&mut self, prefix: &str, uri: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(prefix.to_string(), uri.to_string());
        }
    }

    /// Resolves a prefix to its URI, searching from innermost scope.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(prefix))
            .map(String::as_str)
    }

    /// Resolves a prefix into a [`Namespace`]. The empty prefix always
    /// resolves, to no namespace when nothing is bound.
    pub fn namespace_for(&self, prefix: Option<&str>) -> Option<Namespace> {
        match prefix {
            None | Some("") => Some(Namespace::default_for(
                self.resolve("").unwrap_or_default(),
            )),
            Some(p) => self.resolve(p).map(|uri| Namespace::new(p, uri)),
        }
    }
}

/// Splits a qualified name into prefix and local name.
///
/// Returns (Some(prefix), local) for "prefix:local"
/// Returns (None, name) for "name" without prefix
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some(pos) = qname.find(':') {
        (Some(&qname[..pos]), &qname[pos + 1..])
    } else {
        (None, qname)
    }
}

/// Checks if an attribute name is a namespace declaration.
pub fn is_xmlns_attr(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_qname() {
        assert_eq!(split_qname("svg:rect"), (Some("svg"), "rect"));
        assert_eq!(split_qname("rect"), (None, "rect"));
        assert_eq!(split_qname("ns:foo:bar"), (Some("ns"), "foo:bar"));
    }

    #[test]
    fn test_singletons() {
        assert_eq!(Namespace::new("", ""), Namespace::NO_NAMESPACE);
        assert_eq!(Namespace::new("xml", XML_NAMESPACE_URI), Namespace::XML_NAMESPACE);
        assert!(Namespace::NO_NAMESPACE.is_none());
        assert!(Namespace::XML_NAMESPACE.is_xml());
        assert_eq!(Namespace::default_for("urn:a").declaration_name(), "xmlns");
        assert_eq!(Namespace::new("a", "urn:a").declaration_name(), "xmlns:a");
    }

    #[test]
    fn test_namespace_context() {
        let mut ctx = NamespaceContext::new();
        ctx.push_scope();
        ctx.bind("svg", "http://www.w3.org/2000/svg");

        assert_eq!(ctx.resolve("svg"), Some("http://www.w3.org/2000/svg"));

        ctx.pop_scope();
        assert!(ctx.resolve("svg").is_none());
    }

    #[test]
    fn test_is_xmlns() {
        assert!(is_xmlns_attr("xmlns"));
        assert!(is_xmlns_attr("xmlns:svg"));
        assert!(!is_xmlns_attr("xml:space"));
        assert!(!is_xmlns_attr("href"));
    }

    #[test]
    fn test_default_namespace_resolution() {
        let mut ctx = NamespaceContext::new();
        assert_eq!(ctx.namespace_for(None), Some(Namespace::NO_NAMESPACE));

        ctx.push_scope();
        ctx.bind("", "http://www.w3.org/1999/xhtml");
        assert_eq!(
            ctx.namespace_for(None),
            Some(Namespace::default_for("http://www.w3.org/1999/xhtml"))
        );
        assert_eq!(ctx.namespace_for(Some("missing")), None);
        assert_eq!(ctx.namespace_for(Some("xml")), Some(Namespace::XML_NAMESPACE));

        ctx.pop_scope();
        assert_eq!(ctx.namespace_for(None), Some(Namespace::NO_NAMESPACE));
    }
}
