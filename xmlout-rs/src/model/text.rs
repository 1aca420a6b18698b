//! Leaf content types: character data, comments, processing instructions,
//! entity references and the document type declaration.

use std::fmt;

/// Character data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Text {
    text: String,
}

impl Text {
    /// Creates a text node.
    pub fn new(text: impl Into<String>) -> Self {
        Text { text: text.into() }
    }

    /// Returns the raw (unescaped) text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Appends more character data.
    pub fn append(&mut self, more: &str) {
        self.text.push_str(more);
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Text: {}]", self.text)
    }
}

/// A CDATA section. Its text is written verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CData {
    text: String,
}

impl CData {
    /// Creates a CDATA section.
    pub fn new(text: impl Into<String>) -> Self {
        CData { text: text.into() }
    }

    /// Returns the section's text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for CData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[CDATA: {}]", self.text)
    }
}

/// XML comment content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comment {
    /// The comment text (without the <!-- and --> markers).
    text: String,
}

impl Comment {
    /// Creates a comment.
    pub fn new(text: impl Into<String>) -> Self {
        Comment { text: text.into() }
    }

    /// Returns the comment text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<!--{}-->", self.text)
    }
}

/// XML processing instruction content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingInstruction {
    /// The target of the PI (e.g., "xml-stylesheet").
    target: String,
    /// Everything after the target, without the separating whitespace.
    data: String,
}

impl ProcessingInstruction {
    /// Creates a PI from target and data.
    pub fn new(target: impl Into<String>, data: impl Into<String>) -> Self {
        ProcessingInstruction {
            target: target.into(),
            data: data.into(),
        }
    }

    /// Returns the PI target.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the PI data.
    pub fn data(&self) -> &str {
        &self.data
    }
}

impl fmt::Display for ProcessingInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.data.is_empty() {
            write!(f, "<?{}?>", self.target)
        } else {
            write!(f, "<?{} {}?>", self.target, self.data)
        }
    }
}

/// An unexpanded general entity reference such as `&copy;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    name: String,
}

impl EntityRef {
    /// Creates a reference to the named entity.
    pub fn new(name: impl Into<String>) -> Self {
        EntityRef { name: name.into() }
    }

    /// Returns the entity name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "&{};", self.name)
    }
}

/// The `<!DOCTYPE>` declaration. The internal subset is carried as opaque
/// text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocType {
    element_name: String,
    public_id: Option<String>,
    system_id: Option<String>,
    internal_subset: Option<String>,
}

impl DocType {
    /// Creates a declaration naming the root element.
    pub fn new(element_name: impl Into<String>) -> Self {
        DocType {
            element_name: element_name.into(),
            ..Default::default()
        }
    }

    /// Sets the public identifier.
    pub fn with_public_id(mut self, id: impl Into<String>) -> Self {
        self.public_id = Some(id.into());
        self
    }

    /// Sets the system identifier.
    pub fn with_system_id(mut self, id: impl Into<String>) -> Self {
        self.system_id = Some(id.into());
        self
    }

    /// Sets the internal subset text.
    pub fn with_internal_subset(mut self, subset: impl Into<String>) -> Self {
        self.internal_subset = Some(subset.into());
        self
    }

    pub fn element_name(&self) -> &str {
        &self.element_name
    }

    pub fn public_id(&self) -> Option<&str> {
        self.public_id.as_deref()
    }

    pub fn system_id(&self) -> Option<&str> {
        self.system_id.as_deref()
    }

    /// Returns the internal subset, `None` when absent or empty.
    pub fn internal_subset(&self) -> Option<&str> {
        self.internal_subset.as_deref().filter(|s| !s.is_empty())
    }

    /// Renders the declaration's body (everything between `<!DOCTYPE `
    /// and `>`), with `eol` before the internal subset.
    pub fn body(&self, eol: &str) -> String {
        let mut out = String::from(&*self.element_name);
        if let Some(public_id) = &self.public_id {
            out.push_str(" PUBLIC \"");
            out.push_str(public_id);
            out.push('"');
        }
        if let Some(system_id) = &self.system_id {
            if self.public_id.is_none() {
                out.push_str(" SYSTEM");
            }
            out.push_str(" \"");
            out.push_str(system_id);
            out.push('"');
        }
        if let Some(subset) = self.internal_subset() {
            out.push_str(" [");
            out.push_str(eol);
            out.push_str(subset);
            out.push(']');
        }
        out
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<!DOCTYPE {}>", self.body("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doctype_body() {
        let plain = DocType::new("html");
        assert_eq!(plain.body("\n"), "html");

        let system = DocType::new("note").with_system_id("note.dtd");
        assert_eq!(system.body("\n"), "note SYSTEM \"note.dtd\"");

        let public = DocType::new("html")
            .with_public_id("-//W3C//DTD XHTML 1.0 Strict//EN")
            .with_system_id("xhtml1-strict.dtd");
        assert_eq!(
            public.body("\n"),
            "html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \"xhtml1-strict.dtd\""
        );

        let subset = DocType::new("r").with_internal_subset("<!ENTITY e \"x\">\n");
        assert_eq!(subset.body("\r\n"), "r [\r\n<!ENTITY e \"x\">\n]");
    }

    #[test]
    fn test_empty_subset_is_absent() {
        let dt = DocType::new("r").with_internal_subset("");
        assert_eq!(dt.internal_subset(), None);
        assert_eq!(dt.to_string(), "<!DOCTYPE r>");
    }

    #[test]
    fn test_display() {
        assert_eq!(ProcessingInstruction::new("go", "").to_string(), "<?go?>");
        assert_eq!(
            ProcessingInstruction::new("xml-stylesheet", "href=\"a.xsl\"").to_string(),
            "<?xml-stylesheet href=\"a.xsl\"?>"
        );
        assert_eq!(EntityRef::new("copy").to_string(), "&copy;");
        assert_eq!(Comment::new(" c ").to_string(), "<!-- c -->");
    }
}
