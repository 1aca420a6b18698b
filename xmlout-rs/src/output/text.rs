//! Whitespace handling for text runs.
//!
//! A run is formatted as a whole, not node by node: TRIM trims the run's
//! outer edges while keeping whitespace between nodes, and NORMALIZE carries
//! a pending separator across node boundaries so that whitespace spanning
//! several nodes still collapses to one space.

use std::borrow::Cow;

use super::run::TextRun;
use crate::error::{Error, Result};
use crate::format::whitespace::{
    compact, ends_with_whitespace, is_all_whitespace, starts_with_whitespace, trim_both,
    trim_left, trim_right,
};
use crate::format::TextMode;
use crate::model::Content;

/// One instruction for the sink: what to write and as which kind of node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextEmission<'a> {
    Text(Cow<'a, str>),
    CData(Cow<'a, str>),
    /// Entity references are passed through by name, never transformed.
    EntityRef(&'a str),
}

impl TextEmission<'_> {
    fn is_empty_char_data(&self) -> bool {
        match self {
            TextEmission::Text(s) | TextEmission::CData(s) => s.is_empty(),
            TextEmission::EntityRef(_) => false,
        }
    }
}

/// Decides what a run writes under `mode`.
pub fn format_run<'a>(run: &TextRun<'a>, mode: TextMode) -> Result<Vec<TextEmission<'a>>> {
    let nodes = run.nodes();
    match mode {
        TextMode::Preserve => verbatim(nodes),
        TextMode::TrimFullWhite => {
            if run.is_all_whitespace() {
                Ok(Vec::new())
            } else {
                verbatim(nodes)
            }
        }
        TextMode::Trim => trim(nodes),
        TextMode::Normalize => normalize(nodes),
    }
}

fn verbatim(nodes: &[Content]) -> Result<Vec<TextEmission<'_>>> {
    nodes.iter().map(|node| emission(node, Cow::Borrowed)).collect()
}

/// Maps a node to an emission, transforming its character data with `f`.
fn emission<'a, F>(node: &'a Content, f: F) -> Result<TextEmission<'a>>
where
    F: FnOnce(&'a str) -> Cow<'a, str>,
{
    match node {
        Content::Text(t) => Ok(TextEmission::Text(f(t.text()))),
        Content::CData(c) => Ok(TextEmission::CData(f(c.text()))),
        Content::EntityRef(e) => Ok(TextEmission::EntityRef(e.name())),
        other => Err(Error::Internal(format!(
            "{:?} node inside a text run",
            other.kind()
        ))),
    }
}

fn trim(nodes: &[Content]) -> Result<Vec<TextEmission<'_>>> {
    // Only whitespace Text can be dropped from the edges; CDATA and
    // entity references always anchor the run.
    let skippable =
        |node: &Content| matches!(node, Content::Text(t) if is_all_whitespace(t.text()));

    let Some(left) = nodes.iter().position(|n| !skippable(n)) else {
        return Ok(Vec::new());
    };
    let right = nodes.iter().rposition(|n| !skippable(n)).unwrap_or(left);

    let mut out = Vec::with_capacity(right - left + 1);
    if left == right {
        out.push(emission(&nodes[left], |s| Cow::Borrowed(trim_both(s)))?);
    } else {
        out.push(emission(&nodes[left], |s| Cow::Borrowed(trim_left(s)))?);
        for node in &nodes[left + 1..right] {
            out.push(emission(node, Cow::Borrowed)?);
        }
        out.push(emission(&nodes[right], |s| Cow::Borrowed(trim_right(s)))?);
    }
    out.retain(|e| !e.is_empty_char_data());
    Ok(out)
}

fn normalize(nodes: &[Content]) -> Result<Vec<TextEmission<'_>>> {
    let mut out = Vec::with_capacity(nodes.len());
    let mut emitted = false;
    let mut pending_space = false;

    for node in nodes {
        let Some(text) = node.char_data() else {
            // Entity reference: passed through, closes any pending space.
            if pending_space {
                out.push(TextEmission::Text(Cow::Borrowed(" ")));
            }
            out.push(emission(node, Cow::Borrowed)?);
            emitted = true;
            pending_space = false;
            continue;
        };
        if text.is_empty() {
            continue;
        }
        if is_all_whitespace(text) {
            if emitted {
                pending_space = true;
            }
            continue;
        }
        if emitted && starts_with_whitespace(text) {
            pending_space = true;
        }
        if pending_space {
            out.push(TextEmission::Text(Cow::Borrowed(" ")));
        }
        out.push(emission(node, |s| Cow::Owned(compact(s)))?);
        emitted = true;
        pending_space = ends_with_whitespace(text);
    }
    Ok(out)
}
