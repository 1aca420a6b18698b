//! Namespace bindings in scope during output.

use crate::model::{Element, Namespace};

#[derive(Debug, Clone)]
struct Scope {
    /// Every binding visible at this level, sorted by prefix.
    in_scope: Vec<Namespace>,
    /// Bindings introduced at this level, in declaration order.
    added: Vec<Namespace>,
}

/// Tracks which bindings each element must declare.
///
/// Pushing an element compares the namespaces it needs (its own, its
/// additional declarations, and those of prefixed attributes) against the
/// enclosing scope. Only bindings that are new or that rebind a prefix are
/// reported as added, so a binding repeated lower in the tree is never
/// declared twice.
#[derive(Debug, Clone)]
pub struct NamespaceStack {
    scopes: Vec<Scope>,
}

impl Default for NamespaceStack {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceStack {
    /// Starts with only `xml` and "no namespace" in scope.
    pub fn new() -> Self {
        NamespaceStack {
            scopes: vec![Scope {
                in_scope: vec![Namespace::NO_NAMESPACE, Namespace::XML_NAMESPACE],
                added: Vec::new(),
            }],
        }
    }

    /// Opens the scope of `element`.
    pub fn push(&mut self, element: &Element) {
        let mut scope = Scope {
            in_scope: self.current().in_scope.clone(),
            added: Vec::new(),
        };
        scope.bind(element.namespace());
        for ns in element.additional_namespaces() {
            scope.bind(ns);
        }
        for attr in element.attributes() {
            let ns = attr.namespace();
            // Unprefixed attributes are never in the default namespace.
            if ns.prefix().is_empty() || ns.is_xml() {
                continue;
            }
            scope.bind(ns);
        }
        self.scopes.push(scope);
    }

    /// Closes the innermost element scope.
    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Number of element scopes currently open.
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Bindings introduced by the innermost element, in declaration order.
    pub fn added_forward(&self) -> &[Namespace] {
        &self.current().added
    }

    /// The same bindings in reverse, the order in which scopes close.
    pub fn added_reverse(&self) -> std::iter::Rev<std::slice::Iter<'_, Namespace>> {
        self.current().added.iter().rev()
    }

    /// Every binding visible in the innermost scope, sorted by prefix.
    pub fn in_scope(&self) -> &[Namespace] {
        &self.current().in_scope
    }

    /// Returns the binding for `prefix` in the innermost scope.
    pub fn namespace_for_prefix(&self, prefix: &str) -> Option<&Namespace> {
        let in_scope = &self.current().in_scope;
        in_scope
            .binary_search_by(|ns| ns.prefix().cmp(prefix))
            .ok()
            .map(|i| &in_scope[i])
    }

    /// Returns true if exactly this binding is visible.
    pub fn is_in_scope(&self, namespace: &Namespace) -> bool {
        self.namespace_for_prefix(namespace.prefix()) == Some(namespace)
    }

    fn current(&self) -> &Scope {
        // The base scope is never popped.
        &self.scopes[self.scopes.len() - 1]
    }
}

impl Scope {
    fn bind(&mut self, ns: &Namespace) {
        if ns.is_xml() || self.added.iter().any(|a| a.prefix() == ns.prefix()) {
            return;
        }
        match self.in_scope.binary_search_by(|n| n.prefix().cmp(ns.prefix())) {
            Ok(i) if self.in_scope[i] == *ns => {}
            Ok(i) => {
                self.in_scope[i] = ns.clone();
                self.added.push(ns.clone());
            }
            Err(i) => {
                self.in_scope.insert(i, ns.clone());
                self.added.push(ns.clone());
            }
        }
    }
}
