//! Run-aware text view of a paragraph.
//!
//! A paragraph's visible text is spread over `w:r` elements, often split at
//! arbitrary points by the editor. [`RunSequence`] gathers the runs that
//! contribute text, and [`LogicalText`] flattens them into one character
//! stream where every character remembers the run it came from.

use super::formatting::{direct_emphasis, paragraph_style_id, run_style_id, Emphasis};
use super::styles::StyleSheet;
use crate::util::descendants_pruned;
use crate::util::strings::NO_BREAK_HYPHEN;
use crate::xml::arena::XmlDocument;
use crate::xml::namespaces::{MC, W};
use crate::xml::node::XmlNodeData;
use indextree::NodeId;
use std::ops::Range;

#[derive(Debug, Clone)]
pub struct TextRun {
    pub node: NodeId,
    pub text: String,
    /// Effective emphasis of the run's text.
    pub emphasis: Emphasis,
    /// Emphasis the run would have without its direct `b`/`i`.
    pub inherited: Emphasis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provenance {
    pub run: usize,
    pub offset: usize,
}

#[derive(Debug, Clone)]
pub struct RunSequence {
    runs: Vec<TextRun>,
    /// Endnote reference elements and the number of characters before them.
    references: Vec<(NodeId, usize)>,
}

/// Content never shown as paragraph text.
fn is_hidden_content(data: &XmlNodeData) -> bool {
    [
        "del",
        "moveFrom",
        "delText",
        "instrText",
        "rPr",
        "pPr",
        "txbxContent",
    ]
    .iter()
    .any(|local| data.is_named(W::NS, local))
        || data.is_named(MC::NS, "Fallback")
}

impl RunSequence {
    pub fn collect(doc: &XmlDocument, paragraph: NodeId, styles: &StyleSheet) -> Self {
        let paragraph_style = paragraph_style_id(doc, paragraph);
        let mut runs: Vec<TextRun> = Vec::new();
        let mut references = Vec::new();
        let mut length = 0;

        for node in descendants_pruned(doc, paragraph, is_hidden_content) {
            let Some(data) = doc.get(node) else { continue };
            if data.is_named(W::NS, "endnoteReference") {
                references.push((node, length));
                continue;
            }

            // w:tab also names a tab stop, but only inside the pruned pPr
            let piece = match data.name() {
                Some(name) if name.is(W::NS, "t") => doc.inner_text(node),
                Some(name) if name.is(W::NS, "tab") => "\t".to_string(),
                Some(name) if name.is(W::NS, "br") || name.is(W::NS, "cr") => "\n".to_string(),
                Some(name) if name.is(W::NS, "noBreakHyphen") => NO_BREAK_HYPHEN.to_string(),
                _ => continue,
            };
            let Some(run) = doc.ancestor_named(node, &W::r()) else {
                continue;
            };

            if runs.last().map(|r| r.node) != Some(run) {
                let run_style = run_style_id(doc, run);
                let inherited = styles.inherited(run_style.as_deref(), paragraph_style.as_deref());
                let emphasis = styles.resolve(
                    direct_emphasis(doc, run),
                    run_style.as_deref(),
                    paragraph_style.as_deref(),
                );
                runs.push(TextRun {
                    node: run,
                    text: String::new(),
                    emphasis,
                    inherited,
                });
            }
            length += piece.chars().count();
            if let Some(current) = runs.last_mut() {
                current.text.push_str(&piece);
            }
        }

        Self {
            runs,
            references,
        }
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub fn run(&self, index: usize) -> Option<&TextRun> {
        self.runs.get(index)
    }

    /// Character offset of an endnote reference in this paragraph.
    pub fn offset_of(&self, reference: NodeId) -> Option<usize> {
        self.references
            .iter()
            .find(|(node, _)| *node == reference)
            .map(|(_, offset)| *offset)
    }

    pub fn logical_text(&self) -> LogicalText {
        let mut chars = Vec::new();
        let mut provenance = Vec::new();
        for (run, text_run) in self.runs.iter().enumerate() {
            for (offset, c) in text_run.text.chars().enumerate() {
                chars.push(c);
                provenance.push(Provenance { run, offset });
            }
        }
        LogicalText { chars, provenance }
    }
}

/// Flattened paragraph text with per-character provenance.
#[derive(Debug, Clone, Default)]
pub struct LogicalText {
    chars: Vec<char>,
    provenance: Vec<Provenance>,
}

impl LogicalText {
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn provenance(&self, index: usize) -> Option<Provenance> {
        self.provenance.get(index).copied()
    }

    /// Characters of `range` paired with their source.
    pub fn window(&self, range: Range<usize>) -> impl Iterator<Item = (char, Provenance)> + '_ {
        let end = range.end.min(self.chars.len());
        let start = range.start.min(end);
        self.chars[start..end]
            .iter()
            .copied()
            .zip(self.provenance[start..end].iter().copied())
    }

    pub fn slice(&self, range: Range<usize>) -> String {
        self.window(range).map(|(c, _)| c).collect()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }
}
