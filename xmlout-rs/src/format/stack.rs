//! Depth-indexed formatting state.
//!
//! The stack is a set of parallel arrays indexed by element depth. Frames
//! are copied by value on [`FormatStack::push`] and never freed on
//! [`FormatStack::pop`], so walking a tree allocates only when it first
//! reaches a new depth.

use std::borrow::Cow;

use super::escape::{escape_attribute, escape_text};
use super::{Format, TextMode};
use crate::constants::FORMAT_STACK_CAPACITY;

/// Formatting state derived from a [`Format`] as the tree is walked.
///
/// Invariant: at every depth `d`, the level indent is either `None` or
/// exactly `d` copies of the format's indent unit, and the level EOL is
/// `None` exactly when the level indent is.
#[derive(Debug, Clone)]
pub struct FormatStack {
    format: Format,
    depth: usize,
    capacity: usize,
    mode: Vec<TextMode>,
    level_indent: Vec<Option<String>>,
    level_eol: Vec<Option<String>>,
    escape_output: Vec<bool>,
}

impl FormatStack {
    /// Seeds depth 0 from the format.
    pub fn new(format: &Format) -> Self {
        let capacity = FORMAT_STACK_CAPACITY;
        let mut stack = FormatStack {
            format: format.clone(),
            depth: 0,
            capacity,
            mode: vec![format.text_mode(); capacity],
            level_indent: vec![None; capacity],
            level_eol: vec![None; capacity],
            escape_output: vec![true; capacity],
        };
        stack.recompute_padding();
        stack
    }

    /// Enters one element level, inheriting the current frame.
    pub fn push(&mut self) {
        let prev = self.depth;
        self.depth += 1;
        if self.depth >= self.capacity {
            self.capacity *= 2;
            self.mode.resize(self.capacity, TextMode::Preserve);
            self.level_indent.resize(self.capacity, None);
            self.level_eol.resize(self.capacity, None);
            self.escape_output.resize(self.capacity, true);
        }
        let depth = self.depth;
        self.mode[depth] = self.mode[prev];
        self.escape_output[depth] = self.escape_output[prev];
        self.level_indent[depth] = match (&self.level_indent[prev], self.format.indent()) {
            (Some(prev_indent), Some(unit)) => Some(format!("{}{}", prev_indent, unit)),
            _ => None,
        };
        self.level_eol[depth] = self.level_eol[prev].clone();
    }

    /// Leaves the current level. The frame's storage is kept for reuse.
    pub fn pop(&mut self) {
        debug_assert!(self.depth > 0, "format stack popped below its base");
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The format this stack was seeded from.
    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn text_mode(&self) -> TextMode {
        self.mode[self.depth]
    }

    /// The configured text mode, restored by `xml:space="default"`.
    pub fn default_mode(&self) -> TextMode {
        self.format.text_mode()
    }

    /// Changes the text mode of the current level only. Switching to
    /// PRESERVE drops the level's padding; switching away rebuilds it from
    /// the depth.
    pub fn set_text_mode(&mut self, mode: TextMode) {
        if self.mode[self.depth] == mode {
            return;
        }
        self.mode[self.depth] = mode;
        self.recompute_padding();
    }

    fn recompute_padding(&mut self) {
        let depth = self.depth;
        let padded = self.mode[depth] != TextMode::Preserve;
        match (self.format.indent(), self.format.line_separator()) {
            (Some(unit), Some(eol)) if padded => {
                self.level_indent[depth] = Some(unit.repeat(depth));
                self.level_eol[depth] = Some(eol.to_string());
            }
            _ => {
                self.level_indent[depth] = None;
                self.level_eol[depth] = None;
            }
        }
    }

    /// Indentation for content at this level, `None` when not indenting.
    pub fn level_indent(&self) -> Option<&str> {
        self.level_indent[self.depth].as_deref()
    }

    /// Line break between content at this level, `None` when not indenting.
    pub fn level_eol(&self) -> Option<&str> {
        self.level_eol[self.depth].as_deref()
    }

    /// Indentation of the enclosing level, used before an end tag.
    pub fn closing_indent(&self) -> Option<&str> {
        let unit = self.format.indent().map_or(0, str::len);
        self.level_indent()
            .map(|indent| &indent[..indent.len().saturating_sub(unit)])
    }

    /// Separator substituted for line feeds inside text. PRESERVE keeps
    /// line feeds as stored.
    pub fn text_eol(&self) -> Option<&str> {
        match self.text_mode() {
            TextMode::Preserve => None,
            _ => self.format.line_separator(),
        }
    }

    pub fn escape_output(&self) -> bool {
        self.escape_output[self.depth]
    }

    pub fn set_escape_output(&mut self, escape: bool) {
        self.escape_output[self.depth] = escape;
    }

    /// Escapes element text under the current level's policy.
    pub fn escape_text<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.escape_output() {
            Cow::Owned(escape_text(
                self.format.escape_strategy().as_ref(),
                self.text_eol(),
                text,
            ))
        } else {
            Cow::Borrowed(text)
        }
    }

    /// Escapes an attribute value under the current level's policy.
    pub fn escape_attribute<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if self.escape_output() {
            Cow::Owned(escape_attribute(self.format.escape_strategy().as_ref(), value))
        } else {
            Cow::Borrowed(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::LineSeparator;

    fn pretty() -> Format {
        Format::pretty().with_line_separator(LineSeparator::Nl)
    }

    #[test]
    fn test_push_accumulates_indent() {
        let mut stack = FormatStack::new(&pretty());
        assert_eq!(stack.level_indent(), Some(""));
        assert_eq!(stack.level_eol(), Some("\n"));

        stack.push();
        stack.push();
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.level_indent(), Some("    "));
        assert_eq!(stack.closing_indent(), Some("  "));

        stack.pop();
        assert_eq!(stack.level_indent(), Some("  "));
    }

    #[test]
    fn test_raw_has_no_padding() {
        let mut stack = FormatStack::new(&Format::raw());
        stack.push();
        assert_eq!(stack.level_indent(), None);
        assert_eq!(stack.level_eol(), None);
        assert_eq!(stack.closing_indent(), None);
    }

    #[test]
    fn test_compact_has_no_padding() {
        let stack = FormatStack::new(&Format::compact());
        assert_eq!(stack.level_indent(), None);
        assert_eq!(stack.level_eol(), None);
        assert_eq!(stack.text_eol(), Some("\r\n"));
    }

    #[test]
    fn test_text_mode_is_per_level() {
        let mut stack = FormatStack::new(&pretty());
        stack.push();
        stack.push();
        stack.set_text_mode(TextMode::Preserve);
        assert_eq!(stack.level_indent(), None);
        assert_eq!(stack.level_eol(), None);

        stack.push();
        assert_eq!(stack.text_mode(), TextMode::Preserve);
        stack.set_text_mode(TextMode::Trim);
        assert_eq!(stack.level_indent(), Some("      "));
        assert_eq!(stack.level_eol(), Some("\n"));
        stack.pop();

        assert_eq!(stack.text_mode(), TextMode::Preserve);
        stack.pop();
        assert_eq!(stack.text_mode(), TextMode::Normalize);
        assert_eq!(stack.level_indent(), Some("  "));
    }

    #[test]
    fn test_growth_past_capacity() {
        let mut stack = FormatStack::new(&pretty());
        for _ in 0..(FORMAT_STACK_CAPACITY * 3) {
            stack.push();
        }
        assert_eq!(stack.depth(), FORMAT_STACK_CAPACITY * 3);
        assert_eq!(
            stack.level_indent().map(str::len),
            Some(2 * FORMAT_STACK_CAPACITY * 3)
        );
        for _ in 0..(FORMAT_STACK_CAPACITY * 3) {
            stack.pop();
        }
        assert_eq!(stack.level_indent(), Some(""));
    }

    #[test]
    fn test_escape_flag_is_scoped() {
        let mut stack = FormatStack::new(&Format::raw());
        stack.push();
        stack.set_escape_output(false);
        assert_eq!(stack.escape_text("<b>"), "<b>");
        stack.push();
        assert!(!stack.escape_output());
        stack.pop();
        stack.pop();
        assert_eq!(stack.escape_text("<b>"), "&lt;b&gt;");
    }

    #[test]
    fn test_text_eol_follows_mode() {
        let mut stack = FormatStack::new(&pretty());
        assert_eq!(stack.escape_text("a\nb"), "a\nb");
        stack.push();
        stack.set_text_mode(TextMode::Preserve);
        assert_eq!(stack.text_eol(), None);

        let crnl = FormatStack::new(&Format::pretty());
        assert_eq!(crnl.escape_text("a\nb"), "a\r\nb");
    }
}
