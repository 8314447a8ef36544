use super::runs::RunSequence;
use super::styles::StyleSheet;
use crate::util::descendants_pruned;
use crate::xml::arena::XmlDocument;
use crate::xml::namespaces::{MC, W};
use crate::xml::node::XmlNodeData;
use indextree::NodeId;
use std::collections::HashMap;

/// One `w:endnoteReference` in the body, in reading order.
#[derive(Debug, Clone)]
pub struct EndnoteReference {
    /// One-based position among all located references.
    pub ordinal: usize,
    pub note_id: String,
    pub node: NodeId,
    pub run: NodeId,
    /// Index into [`LocatedReferences::paragraphs`].
    pub paragraph: usize,
    /// Characters of the paragraph's logical text before the reference.
    pub offset: usize,
}

#[derive(Debug, Clone)]
pub struct NoteEntry {
    pub id: String,
    pub node: NodeId,
}

/// Note entries of the endnotes part keyed by id.
#[derive(Debug, Clone, Default)]
pub struct NoteTable {
    entries: HashMap<String, NoteEntry>,
}

impl NoteTable {
    /// Index every `w:endnote` except the separator notes.
    pub fn build(notes: &XmlDocument) -> Self {
        let mut entries = HashMap::new();
        let Some(root) = notes.root() else {
            return Self { entries };
        };

        for node in notes.elements_by_name(root, &W::endnote()) {
            let Some(data) = notes.get(node) else { continue };
            if let Some(kind) = data.attribute(W::NS, "type") {
                if matches!(kind, "separator" | "continuationSeparator" | "continuationNotice") {
                    continue;
                }
            }
            if let Some(id) = data.attribute(W::NS, "id") {
                entries.insert(id.to_string(), NoteEntry { id: id.to_string(), node });
            }
        }

        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&NoteEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Visible text of a note, whitespace-collapsed.
    pub fn note_text(&self, notes: &XmlDocument, id: &str) -> Option<String> {
        let entry = self.get(id)?;
        let mut pieces = Vec::new();
        for node in descendants_pruned(notes, entry.node, is_not_note_text) {
            if let Some(data) = notes.get(node) {
                if data.is_named(W::NS, "t") {
                    pieces.push(notes.inner_text(node));
                } else if data.is_named(W::NS, "p") && !pieces.is_empty() {
                    pieces.push(" ".to_string());
                }
            }
        }
        let joined = pieces.concat();
        Some(joined.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

fn is_not_note_text(data: &XmlNodeData) -> bool {
    data.is_named(W::NS, "del") || data.is_named(W::NS, "instrText") || data.is_named(MC::NS, "Fallback")
}

fn is_revised_away(data: &XmlNodeData) -> bool {
    data.is_named(W::NS, "del") || data.is_named(W::NS, "moveFrom") || data.is_named(MC::NS, "Fallback")
}

/// References found in the body together with the text view of every
/// paragraph that holds one.
#[derive(Debug, Clone, Default)]
pub struct LocatedReferences {
    pub references: Vec<EndnoteReference>,
    pub paragraphs: Vec<RunSequence>,
}

impl LocatedReferences {
    pub fn paragraph_of(&self, reference: &EndnoteReference) -> Option<&RunSequence> {
        self.paragraphs.get(reference.paragraph)
    }
}

/// Walk the body in document order and collect every live endnote
/// reference. References inside deleted or moved-away revisions are ignored.
pub fn locate(body: &XmlDocument, styles: &StyleSheet) -> LocatedReferences {
    let mut located = LocatedReferences::default();
    let Some(root) = body.root() else {
        return located;
    };
    let mut paragraph_index: HashMap<NodeId, usize> = HashMap::new();

    let reference_nodes: Vec<NodeId> = descendants_pruned(body, root, is_revised_away)
        .filter(|&n| body.get(n).is_some_and(|d| d.is_named(W::NS, "endnoteReference")))
        .collect();

    for node in reference_nodes {
        let Some(note_id) = body.get(node).and_then(|d| d.attribute(W::NS, "id")) else {
            tracing::warn!("endnote reference without an id; left in place");
            continue;
        };
        let (Some(run), Some(paragraph)) = (
            body.ancestor_named(node, &W::r()),
            body.ancestor_named(node, &W::p()),
        ) else {
            tracing::warn!(note_id, "endnote reference outside a paragraph run; left in place");
            continue;
        };

        let index = *paragraph_index.entry(paragraph).or_insert_with(|| {
            located
                .paragraphs
                .push(RunSequence::collect(body, paragraph, styles));
            located.paragraphs.len() - 1
        });
        let offset = located.paragraphs[index].offset_of(node).unwrap_or(0);

        located.references.push(EndnoteReference {
            ordinal: located.references.len() + 1,
            note_id: note_id.to_string(),
            node,
            run,
            paragraph: index,
            offset,
        });
    }

    located
}
