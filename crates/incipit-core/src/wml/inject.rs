//! Body-tree surgery for one converted reference.
//!
//! The endnote reference is taken out of its run and, at the same spot,
//! the incipit runs, a hidden bookmark and a `PAGEREF` field pointing at
//! that bookmark are inserted:
//!
//! ```xml
//! <w:r><w:rPr>..</w:rPr><w:t>Call me Ishmael</w:t></w:r>
//! <w:bookmarkStart w:id="7" w:name="_Incipit0001"/><w:bookmarkEnd w:id="7"/>
//! <w:r><w:fldChar w:fldCharType="begin" w:dirty="true"/></w:r>
//! <w:r><w:instrText xml:space="preserve"> PAGEREF _Incipit0001 \h </w:instrText></w:r>
//! <w:r><w:fldChar w:fldCharType="separate"/></w:r>
//! <w:r><w:t>0</w:t></w:r>
//! <w:r><w:fldChar w:fldCharType="end"/></w:r>
//! ```

use super::extractor::IncipitCandidate;
use super::formatting::{apply_emphasis, toggle_value, Emphasis};
use super::locator::{EndnoteReference, NoteEntry};
use super::runs::RunSequence;
use super::settings::{ConversionSettings, EmphasisStyle};
use crate::util::make_valid_xml;
use crate::xml::arena::XmlDocument;
use crate::xml::namespaces::W;
use crate::xml::node::XmlNodeData;
use crate::xml::xname::{XAttribute, XName};
use indextree::NodeId;
use std::collections::HashSet;

/// Hidden bookmark marking where a reference used to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub name: String,
    pub id: u64,
}

/// Hands out bookmark names and ids that do not clash with the ones
/// already in the document.
#[derive(Debug, Clone, Default)]
pub struct AnchorAllocator {
    names: HashSet<String>,
    next_id: u64,
}

impl AnchorAllocator {
    pub fn scan(body: &XmlDocument) -> Self {
        let mut allocator = Self::default();
        let Some(root) = body.root() else {
            return allocator;
        };

        let mut max_id = None;
        for node in body.descendants(root) {
            let Some(data) = body.get(node) else { continue };
            if !data.is_named(W::NS, "bookmarkStart") {
                continue;
            }
            if let Some(name) = data.attribute(W::NS, "name") {
                allocator.names.insert(name.to_string());
            }
            if let Some(id) = data.attribute(W::NS, "id").and_then(|v| v.parse::<u64>().ok()) {
                max_id = max_id.max(Some(id));
            }
        }
        allocator.next_id = max_id.map_or(0, |id| id + 1);
        allocator
    }

    /// `_Incipit0001` for the first reference; a numeric suffix is added if
    /// the document already uses the name.
    pub fn allocate(&mut self, ordinal: usize) -> Anchor {
        let base = format!("_Incipit{:04}", ordinal);
        let mut name = base.clone();
        let mut suffix = 2;
        while self.names.contains(&name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        self.names.insert(name.clone());

        let id = self.next_id;
        self.next_id += 1;
        Anchor { name, id }
    }
}

fn w_element(local: &str, attrs: &[(&str, &str)]) -> XmlNodeData {
    XmlNodeData::element_with_attrs(
        XName::new(W::NS, local),
        attrs
            .iter()
            .map(|(name, value)| XAttribute::new(XName::new(W::NS, name), value))
            .collect(),
    )
}

/// Where new content goes relative to the reference's run.
#[derive(Debug, Clone, Copy)]
enum Cursor {
    Before(NodeId),
    After(NodeId),
}

impl Cursor {
    fn insert(&mut self, doc: &mut XmlDocument, data: XmlNodeData) -> NodeId {
        match *self {
            Cursor::Before(sibling) => doc.add_before(sibling, data),
            Cursor::After(sibling) => {
                let node = doc.add_after(sibling, data);
                *self = Cursor::After(node);
                node
            }
        }
    }
}

/// Take the reference element out of its run.
///
/// A run with text on both sides of the reference is split and the text
/// after it moves to a new run with the same properties. An earlier split
/// may have moved the reference out of the run it was found in, so the
/// run is looked up from the reference node itself.
/// Returns the insertion cursor and the run when it is left empty.
fn detach_reference(doc: &mut XmlDocument, reference: &EndnoteReference) -> (Cursor, Option<NodeId>) {
    let run = doc.parent(reference.node).unwrap_or(reference.run);
    let is_content = |doc: &XmlDocument, n: NodeId| doc.get(n).is_some_and(|d| !d.is_named(W::NS, "rPr"));

    let has_leading = std::iter::successors(doc.previous_sibling(reference.node), |&n| {
        doc.previous_sibling(n)
    })
    .any(|n| is_content(doc, n));
    let trailing: Vec<NodeId> = std::iter::successors(doc.next_sibling(reference.node), |&n| {
        doc.next_sibling(n)
    })
    .collect();
    doc.remove(reference.node);

    if !has_leading {
        let empty = !trailing.iter().any(|&n| is_content(doc, n));
        return (Cursor::Before(run), empty.then_some(run));
    }

    if !trailing.is_empty() {
        let attributes = doc
            .get(run)
            .and_then(|d| d.attributes())
            .map(<[XAttribute]>::to_vec)
            .unwrap_or_default();
        let tail = doc.add_after(run, XmlNodeData::element_with_attrs(W::r(), attributes));
        if let Some(rpr) = doc.first_child_named(run, &W::rPr()) {
            if let Some(copy) = doc.clone_subtree(rpr) {
                doc.reparent(tail, copy);
            }
        }
        for node in trailing {
            doc.reparent(tail, node);
        }
    }

    (Cursor::After(run), None)
}

fn add_text(doc: &mut XmlDocument, run: NodeId, text: &str) {
    let text = make_valid_xml(text);
    let needs_preserve = text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace);
    let attrs = if needs_preserve {
        vec![XAttribute::new(XName::xml_space(), "preserve")]
    } else {
        Vec::new()
    };
    let t = doc.add_child(run, XmlNodeData::element_with_attrs(W::t(), attrs));
    doc.add_child(t, XmlNodeData::text(&text));
}

/// Build one incipit run at the cursor.
fn splice_segment(
    doc: &mut XmlDocument,
    cursor: &mut Cursor,
    text: &str,
    emphasis: Emphasis,
    source: Option<(NodeId, Emphasis)>,
    style: EmphasisStyle,
) {
    let run = cursor.insert(doc, XmlNodeData::element(W::r()));

    let source_rpr = source.and_then(|(node, _)| doc.first_child_named(node, &W::rPr()));
    let mut rpr = source_rpr.and_then(|rpr| doc.clone_subtree(rpr));
    if let Some(copy) = rpr {
        doc.reparent(run, copy);
    }

    if style != EmphasisStyle::Preserve {
        let rpr = *rpr.get_or_insert_with(|| doc.add_child(run, XmlNodeData::element(W::rPr())));
        let inherited = source.map(|(_, inherited)| inherited).unwrap_or_default();
        apply_emphasis(doc, rpr, emphasis.styled(style), inherited);
    }

    add_text(doc, run, text);
}

/// Replace `reference` with the candidate text, the anchor bookmark and a
/// page field pointing at it.
pub fn inject(
    doc: &mut XmlDocument,
    reference: &EndnoteReference,
    candidate: &IncipitCandidate,
    paragraph: &RunSequence,
    anchor: &Anchor,
    settings: &ConversionSettings,
) {
    let (mut cursor, emptied) = detach_reference(doc, reference);

    for segment in candidate.segments.iter().filter(|s| !s.text.is_empty()) {
        let source = segment
            .run
            .and_then(|i| paragraph.run(i))
            .map(|r| (r.node, r.inherited));
        splice_segment(
            doc,
            &mut cursor,
            &segment.text,
            segment.emphasis,
            source,
            settings.emphasis_style,
        );
    }

    let id = anchor.id.to_string();
    cursor.insert(
        doc,
        w_element("bookmarkStart", &[("id", &id), ("name", &anchor.name)]),
    );
    cursor.insert(doc, w_element("bookmarkEnd", &[("id", &id)]));

    let instruction = format!(" PAGEREF {} \\h ", anchor.name);
    let field: [(&str, Vec<XAttribute>, Option<&str>); 5] = [
        ("fldChar", field_char("begin", true), None),
        ("instrText", vec![XAttribute::new(XName::xml_space(), "preserve")], Some(instruction.as_str())),
        ("fldChar", field_char("separate", false), None),
        ("t", Vec::new(), Some(settings.page_placeholder.as_str())),
        ("fldChar", field_char("end", false), None),
    ];
    for (local, attrs, text) in field {
        let run = cursor.insert(doc, XmlNodeData::element(W::r()));
        let inner = doc.add_child(run, XmlNodeData::element_with_attrs(XName::new(W::NS, local), attrs));
        if let Some(text) = text {
            doc.add_child(inner, XmlNodeData::text(text));
        }
    }

    if let Some(run) = emptied {
        doc.remove(run);
    }
}

fn field_char(kind: &str, dirty: bool) -> Vec<XAttribute> {
    let mut attrs = vec![XAttribute::new(W::fldCharType(), kind)];
    if dirty {
        attrs.push(XAttribute::new(W::dirty(), "true"));
    }
    attrs
}

/// Delete a note entry from the endnotes tree.
pub fn remove_note(notes: &mut XmlDocument, entry: &NoteEntry) {
    notes.remove(entry.node);
}

/// Make sure `w:settings` asks for a field update on open. Returns false
/// when the setting was already on.
pub fn request_field_update(settings: &mut XmlDocument) -> bool {
    let Some(root) = settings.root() else {
        return false;
    };

    if let Some(existing) = settings.first_child_named(root, &W::updateFields()) {
        if toggle_value(settings, existing) {
            return false;
        }
        settings.set_attribute(existing, &W::val(), "true");
        return true;
    }

    let element = w_element("updateFields", &[("val", "true")]);
    let preceding = settings.children(root).filter(|&child| {
        settings.get(child).is_some_and(|d| {
            W::SETTINGS_BEFORE_UPDATE_FIELDS
                .iter()
                .any(|local| d.is_named(W::NS, local))
        })
    });
    let last_preceding = preceding.last();
    let first = settings.children(root).next();

    match (last_preceding, first) {
        (Some(prev), _) => settings.add_after(prev, element),
        (None, Some(first)) => settings.add_before(first, element),
        (None, None) => settings.add_child(root, element),
    };
    true
}
