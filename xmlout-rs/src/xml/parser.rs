//! Document builder on top of quick-xml.
//!
//! The builder keeps everything the output side distinguishes: whitespace
//! is never trimmed, CDATA stays CDATA, unknown entity references stay
//! references, and comments, PIs and the DOCTYPE are retained.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::format::whitespace::is_all_whitespace;
use crate::model::{
    is_xmlns_attr, split_qname, Attribute, CData, Comment, Content, DocType, Document, Element,
    EntityRef, Namespace, NamespaceContext, ProcessingInstruction, Text,
};

/// Builds [`Document`]s from XML text.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    /// Fail on character references that name no character instead of
    /// substituting U+FFFD.
    strict_char_refs: bool,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects character references that do not name a valid character.
    pub fn with_strict_char_refs(mut self, strict: bool) -> Self {
        self.strict_char_refs = strict;
        self
    }

    /// Parses XML from a string.
    pub fn parse_str(&self, xml: &str) -> Result<Document> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        self.parse_reader(&mut reader)
    }

    /// Parses XML from a file.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        let file = File::open(path)?;
        let mut reader = Reader::from_reader(BufReader::new(file));
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        self.parse_reader(&mut reader)
    }

    fn parse_reader<R: BufRead>(&self, reader: &mut Reader<R>) -> Result<Document> {
        let mut state = BuildState::new(self);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    state.flush_text();
                    let element = state.open_element(e, reader)?;
                    state.open.push(element);
                }
                Ok(Event::End(_)) => {
                    state.flush_text();
                    let element = state.open.pop().ok_or_else(|| {
                        Error::Parse("end tag without a matching start tag".to_string())
                    })?;
                    state.close_element(element);
                }
                Ok(Event::Empty(ref e)) => {
                    state.flush_text();
                    let element = state.open_element(e, reader)?;
                    state.close_element(element);
                }
                Ok(Event::Text(e)) => {
                    let raw =
                        std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                    let text = unescape(raw).map_err(|e| Error::Parse(e.to_string()))?;
                    state.push_text(&text);
                }
                Ok(Event::CData(ref e)) => {
                    let text = decode_utf8(e.as_ref())?;
                    state.append(CData::new(text));
                }
                Ok(Event::GeneralRef(ref e)) => {
                    let name = decode_utf8(e.as_ref())?;
                    state.push_reference(&name)?;
                }
                Ok(Event::Comment(ref e)) => {
                    let text = decode_utf8(e.as_ref())?;
                    state.append(Comment::new(text));
                }
                Ok(Event::PI(ref e)) => {
                    let target = decode_utf8(e.target())?;
                    let data = decode_utf8(e.content())?;
                    state.append(ProcessingInstruction::new(target, data.trim()));
                }
                Ok(Event::DocType(ref e)) => {
                    let raw = decode_utf8(e.as_ref())?;
                    state.append(parse_doctype(&raw)?);
                }
                Ok(Event::Decl(_)) => {}
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Parse(format!(
                        "XML parse error at position {}: {}",
                        reader.error_position(),
                        e
                    )))
                }
            }
            buf.clear();
        }

        state.finish()
    }
}

/// Mutable state of one parse.
struct BuildState<'b> {
    builder: &'b DocumentBuilder,
    namespaces: NamespaceContext,
    /// Elements whose end tag has not been seen yet.
    open: Vec<Element>,
    document: Vec<Content>,
    /// Character data waiting to become one Text node.
    text: Option<String>,
}

impl<'b> BuildState<'b> {
    fn new(builder: &'b DocumentBuilder) -> Self {
        BuildState {
            builder,
            namespaces: NamespaceContext::new(),
            open: Vec::new(),
            document: Vec::new(),
            text: None,
        }
    }

    fn append(&mut self, content: impl Into<Content>) {
        self.flush_text();
        let content = content.into();
        match self.open.last_mut() {
            Some(parent) => parent.add_content(content),
            None if content.is_text_like() => {}
            None => self.document.push(content),
        }
    }

    fn push_text(&mut self, text: &str) {
        match &mut self.text {
            Some(pending) => pending.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    fn flush_text(&mut self) {
        let Some(text) = self.text.take() else {
            return;
        };
        match self.open.last_mut() {
            Some(parent) => parent.add_content(Text::new(text)),
            // Whitespace between top-level nodes is not document content.
            None if is_all_whitespace(&text) => {}
            None => log::debug!("dropping character data outside the root element"),
        }
    }

    fn push_reference(&mut self, name: &str) -> Result<()> {
        if let Some(value) = resolve_predefined_entity(name) {
            self.push_text(value);
            return Ok(());
        }
        if let Some(number) = name.strip_prefix('#') {
            let ch = self.char_ref(number)?;
            self.push_text(ch.encode_utf8(&mut [0; 4]));
            return Ok(());
        }
        self.append(EntityRef::new(name));
        Ok(())
    }

    fn char_ref(&self, number: &str) -> Result<char> {
        let code = match number.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => number.parse::<u32>(),
        }
        .map_err(|e| Error::Parse(format!("bad character reference &#{};: {}", number, e)))?;

        match char::from_u32(code) {
            Some(ch) => Ok(ch),
            None if self.builder.strict_char_refs => Err(Error::Parse(format!(
                "character reference &#{}; is not a character",
                number
            ))),
            None => Ok(char::REPLACEMENT_CHARACTER),
        }
    }

    fn open_element<R>(&mut self, e: &BytesStart, reader: &Reader<R>) -> Result<Element> {
        self.namespaces.push_scope();

        let qname = reader
            .decoder()
            .decode(e.name().as_ref())
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();

        let mut declared = Vec::new();
        let mut attributes = Vec::new();
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|e| Error::Parse(format!("Attribute error: {}", e)))?;
            let key = reader
                .decoder()
                .decode(attr.key.as_ref())
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();

            if is_xmlns_attr(&key) {
                let prefix = key.strip_prefix("xmlns:").unwrap_or("");
                self.namespaces.bind(prefix, &value);
                declared.push(Namespace::new(prefix, value));
            } else {
                attributes.push((key, value));
            }
        }

        let (prefix, local) = split_qname(&qname);
        let mut element = Element::new_ns(local, self.resolve(prefix, &qname)?);

        for (key, value) in attributes {
            let attribute = match split_qname(&key) {
                (None, local) => Attribute::new(local, value),
                (Some(prefix), local) => {
                    Attribute::new_ns(local, value, self.resolve(Some(prefix), &key)?)
                }
            };
            element.set_attribute(attribute);
        }
        for ns in declared {
            element.add_namespace_declaration(ns);
        }
        Ok(element)
    }

    fn resolve(&self, prefix: Option<&str>, qname: &str) -> Result<Namespace> {
        self.namespaces
            .namespace_for(prefix)
            .ok_or_else(|| Error::Parse(format!("unbound namespace prefix in {:?}", qname)))
    }

    fn close_element(&mut self, element: Element) {
        self.namespaces.pop_scope();
        match self.open.last_mut() {
            Some(parent) => parent.add_content(element),
            None => self.document.push(element.into()),
        }
    }

    fn finish(mut self) -> Result<Document> {
        self.flush_text();
        if let Some(unclosed) = self.open.last() {
            return Err(Error::Parse(format!(
                "unexpected end of input inside <{}>",
                unclosed.qualified_name()
            )));
        }
        Ok(Document::from_content(self.document))
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| Error::Parse(e.to_string()))
}

/// Parses the body of a `<!DOCTYPE ...>` declaration.
fn parse_doctype(raw: &str) -> Result<DocType> {
    let raw = raw.trim();
    let (head, subset) = match raw.find('[') {
        Some(open) => {
            let inner = raw[open + 1..].trim_end();
            let inner = inner.strip_suffix(']').unwrap_or(inner);
            (&raw[..open], Some(inner.trim()))
        }
        None => (raw, None),
    };

    let mut tokens = DoctypeTokens { rest: head };
    let name = tokens
        .next()
        .ok_or_else(|| Error::Parse("DOCTYPE without a root element name".to_string()))?;
    let mut doctype = DocType::new(name);

    match tokens.next() {
        Some("PUBLIC") => {
            let public_id = tokens
                .next()
                .ok_or_else(|| Error::Parse("DOCTYPE PUBLIC without an identifier".to_string()))?;
            doctype = doctype.with_public_id(public_id);
            if let Some(system_id) = tokens.next() {
                doctype = doctype.with_system_id(system_id);
            }
        }
        Some("SYSTEM") => {
            let system_id = tokens
                .next()
                .ok_or_else(|| Error::Parse("DOCTYPE SYSTEM without an identifier".to_string()))?;
            doctype = doctype.with_system_id(system_id);
        }
        Some(other) => {
            return Err(Error::Parse(format!("unexpected {:?} in DOCTYPE", other)));
        }
        None => {}
    }

    if let Some(subset) = subset.filter(|s| !s.is_empty()) {
        doctype = doctype.with_internal_subset(subset);
    }
    Ok(doctype)
}

/// Whitespace separated words and quoted literals (quotes removed).
struct DoctypeTokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for DoctypeTokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest.trim_start();
        let quote = rest.chars().next()?;
        if quote == '"' || quote == '\'' {
            let body = &rest[1..];
            let end = body.find(quote).unwrap_or(body.len());
            self.rest = body.get(end + 1..).unwrap_or("");
            Some(&body[..end])
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            self.rest = &rest[end..];
            Some(&rest[..end])
        }
    }
}

/// Parses XML from a file with the default builder.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    DocumentBuilder::new().parse_file(path)
}

/// Parses XML from a string with the default builder.
pub fn parse_str(xml: &str) -> Result<Document> {
    DocumentBuilder::new().parse_str(xml)
}
