//! Splitting content lists into text runs and structural nodes.

use crate::format::whitespace::is_all_whitespace as str_is_all_whitespace;
use crate::format::TextMode;
use crate::model::{Content, ContentMask};

/// A maximal span of consecutive Text, CDATA and entity reference nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRun<'a> {
    content: &'a [Content],
    offset: usize,
    len: usize,
}

impl<'a> TextRun<'a> {
    /// Views `len` nodes of `content` starting at `offset` as one run.
    pub fn new(content: &'a [Content], offset: usize, len: usize) -> Self {
        debug_assert!(len >= 1 && offset + len <= content.len());
        TextRun {
            content,
            offset,
            len,
        }
    }

    /// The nodes of the run.
    pub fn nodes(&self) -> &'a [Content] {
        &self.content[self.offset..self.offset + self.len]
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index one past the last node.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// See [`is_all_whitespace`].
    pub fn is_all_whitespace(&self) -> bool {
        is_all_whitespace(self.content, self.offset, self.len)
    }
}

/// One unit of a content list: a lone structural node or a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Structural(&'a Content),
    Text(TextRun<'a>),
}

impl Segment<'_> {
    /// Index one past this segment in its content list.
    fn end(&self, start: usize) -> usize {
        match self {
            Segment::Structural(_) => start + 1,
            Segment::Text(run) => run.end(),
        }
    }
}

/// Classifies the node at `start`. For a text-like node the returned run
/// extends over every following text-like node.
pub fn classify(content: &[Content], start: usize) -> Segment<'_> {
    let node = &content[start];
    if !node.is_text_like() {
        return Segment::Structural(node);
    }
    let len = content[start..]
        .iter()
        .take_while(|c| c.is_text_like())
        .count();
    Segment::Text(TextRun::new(content, start, len))
}

/// True when every Text and CDATA node in the range holds only XML
/// whitespace and no entity reference appears; an entity's expansion is
/// unknown, so it never counts as whitespace.
pub fn is_all_whitespace(content: &[Content], offset: usize, len: usize) -> bool {
    content[offset..offset + len].iter().all(|node| match node {
        Content::Text(t) => str_is_all_whitespace(t.text()),
        Content::CData(c) => str_is_all_whitespace(c.text()),
        _ => false,
    })
}

/// Iterates over the segments of a content list in order.
pub struct Segments<'a> {
    content: &'a [Content],
    next: usize,
}

impl<'a> Segments<'a> {
    pub fn new(content: &'a [Content]) -> Self {
        Segments { content, next: 0 }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.content.len() {
            return None;
        }
        let segment = classify(self.content, self.next);
        self.next = segment.end(self.next);
        Some(segment)
    }
}

/// How an element's content is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentShape {
    /// Nothing to write between the tags.
    Empty,
    /// Only text-like nodes: written inline as one run.
    TextOnly,
    /// Anything structural: written with padding between segments.
    Mixed,
}

/// Decides the layout of a content list under `mode`. Outside PRESERVE,
/// text-only content that is all whitespace counts as empty.
pub fn content_shape(content: &[Content], mode: TextMode) -> ContentShape {
    if content.is_empty() {
        return ContentShape::Empty;
    }
    if !ContentMask::TEXT_LIKE.contains(ContentMask::of(content)) {
        return ContentShape::Mixed;
    }
    if mode != TextMode::Preserve && is_all_whitespace(content, 0, content.len()) {
        return ContentShape::Empty;
    }
    ContentShape::TextOnly
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CData, Comment, Element, EntityRef, Text};

    fn sample() -> Vec<Content> {
        vec![
            Text::new(" a ").into(),
            EntityRef::new("e").into(),
            CData::new("b").into(),
            Element::new("x").into(),
            Text::new("\n  ").into(),
            Comment::new("c").into(),
        ]
    }

    #[test]
    fn test_classify_runs() {
        let content = sample();
        match classify(&content, 0) {
            Segment::Text(run) => {
                assert_eq!((run.offset(), run.len(), run.end()), (0, 3, 3));
                assert!(!run.is_all_whitespace());
            }
            other => panic!("expected a run, got {:?}", other),
        }
        assert!(matches!(classify(&content, 3), Segment::Structural(Content::Element(_))));
        match classify(&content, 4) {
            Segment::Text(run) => {
                assert_eq!(run.len(), 1);
                assert!(run.is_all_whitespace());
            }
            other => panic!("expected a run, got {:?}", other),
        }
    }

    #[test]
    fn test_segments() {
        let content = sample();
        let kinds: Vec<&str> = Segments::new(&content)
            .map(|s| match s {
                Segment::Structural(_) => "node",
                Segment::Text(_) => "run",
            })
            .collect();
        assert_eq!(kinds, vec!["run", "node", "run", "node"]);
    }

    #[test]
    fn test_entity_refs_are_never_whitespace() {
        let content: Vec<Content> = vec![Text::new("  ").into(), EntityRef::new("nbsp").into()];
        assert!(!is_all_whitespace(&content, 0, 2));
        assert!(is_all_whitespace(&content, 0, 1));

        let cdata: Vec<Content> = vec![CData::new(" \t").into(), Text::new("").into()];
        assert!(is_all_whitespace(&cdata, 0, 2));
    }

    #[test]
    fn test_content_shape() {
        let ws: Vec<Content> = vec![Text::new("  ").into(), Text::new("\n").into()];
        assert_eq!(content_shape(&[], TextMode::Preserve), ContentShape::Empty);
        assert_eq!(content_shape(&ws, TextMode::Trim), ContentShape::Empty);
        assert_eq!(content_shape(&ws, TextMode::TrimFullWhite), ContentShape::Empty);
        assert_eq!(content_shape(&ws, TextMode::Preserve), ContentShape::TextOnly);

        let text: Vec<Content> = vec![Text::new(" x ").into()];
        assert_eq!(content_shape(&text, TextMode::Normalize), ContentShape::TextOnly);

        let entity: Vec<Content> = vec![EntityRef::new("e").into()];
        assert_eq!(content_shape(&entity, TextMode::Trim), ContentShape::TextOnly);

        assert_eq!(content_shape(&sample(), TextMode::Trim), ContentShape::Mixed);
    }
}
