//! Bold/italic handling for extracted text.
//!
//! Source emphasis is read from run properties and style definitions; the
//! spliced runs get explicit `w:b`/`w:i` elements so the configured
//! [`EmphasisStyle`] wins over anything inherited from styles.

use super::settings::EmphasisStyle;
use crate::xml::arena::XmlDocument;
use crate::xml::namespaces::W;
use crate::xml::node::XmlNodeData;
use crate::xml::xname::{XAttribute, XName};
use indextree::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Emphasis {
    pub bold: bool,
    pub italic: bool,
}

impl Emphasis {
    pub const PLAIN: Emphasis = Emphasis { bold: false, italic: false };

    pub fn new(bold: bool, italic: bool) -> Self {
        Self { bold, italic }
    }

    /// Emphasis after applying the configured output style.
    pub fn styled(self, style: EmphasisStyle) -> Self {
        match style {
            EmphasisStyle::Bold => Self::new(true, false),
            EmphasisStyle::Italic => Self::new(false, true),
            EmphasisStyle::Preserve => self,
        }
    }
}

/// Emphasis as declared at one level of the style hierarchy; `None` means
/// the level says nothing and the next level decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartialEmphasis {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
}

impl PartialEmphasis {
    /// Read `w:b` and `w:i` from an `rPr` element.
    pub fn from_rpr(doc: &XmlDocument, rpr: NodeId) -> Self {
        Self {
            bold: doc.first_child_named(rpr, &W::b()).map(|b| toggle_value(doc, b)),
            italic: doc.first_child_named(rpr, &W::i()).map(|i| toggle_value(doc, i)),
        }
    }

    /// Fill the gaps in `self` from a lower-priority level.
    pub fn or(self, fallback: PartialEmphasis) -> Self {
        Self {
            bold: self.bold.or(fallback.bold),
            italic: self.italic.or(fallback.italic),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.bold.is_some() && self.italic.is_some()
    }

    pub fn resolve(self) -> Emphasis {
        Emphasis::new(self.bold.unwrap_or(false), self.italic.unwrap_or(false))
    }
}

/// On/off properties are on unless `w:val` says `0`, `false` or `off`.
pub fn toggle_value(doc: &XmlDocument, element: NodeId) -> bool {
    match doc.get(element).and_then(|d| d.attribute(W::NS, "val")) {
        Some(val) => !matches!(val, "0" | "false" | "off"),
        None => true,
    }
}

/// Direct emphasis of a run, read from its `w:rPr`.
pub fn direct_emphasis(doc: &XmlDocument, run: NodeId) -> PartialEmphasis {
    doc.first_child_named(run, &W::rPr())
        .map(|rpr| PartialEmphasis::from_rpr(doc, rpr))
        .unwrap_or_default()
}

pub fn run_style_id(doc: &XmlDocument, run: NodeId) -> Option<String> {
    let rpr = doc.first_child_named(run, &W::rPr())?;
    style_reference(doc, rpr, &W::rStyle())
}

pub fn paragraph_style_id(doc: &XmlDocument, paragraph: NodeId) -> Option<String> {
    let ppr = doc.first_child_named(paragraph, &W::pPr())?;
    style_reference(doc, ppr, &W::pStyle())
}

fn style_reference(doc: &XmlDocument, props: NodeId, name: &XName) -> Option<String> {
    let element = doc.first_child_named(props, name)?;
    doc.get(element)?.attribute(W::NS, "val").map(str::to_string)
}

/// Rewrite the emphasis of a freshly cloned `w:rPr` so it renders as
/// `target`. Direct `b`, `bCs`, `i` and `iCs` are dropped; an explicit
/// element is written when `target` sets the flag, or when it clears a
/// flag that `inherited` would otherwise turn on.
pub fn apply_emphasis(doc: &mut XmlDocument, rpr: NodeId, target: Emphasis, inherited: Emphasis) {
    let stale: Vec<NodeId> = doc
        .children(rpr)
        .filter(|&child| {
            doc.get(child).is_some_and(|d| {
                d.is_named(W::NS, "b")
                    || d.is_named(W::NS, "bCs")
                    || d.is_named(W::NS, "i")
                    || d.is_named(W::NS, "iCs")
            })
        })
        .collect();
    for node in stale {
        doc.remove(node);
    }

    // rStyle and rFonts precede b and i in CT_RPr.
    let anchor = doc.children(rpr).take_while(|&child| {
        doc.get(child)
            .is_some_and(|d| d.is_named(W::NS, "rStyle") || d.is_named(W::NS, "rFonts"))
    });
    let mut cursor = anchor.last();

    for (local, wanted, from_styles) in [
        ("b", target.bold, inherited.bold),
        ("i", target.italic, inherited.italic),
    ] {
        let element = match (wanted, from_styles) {
            (true, _) => XmlNodeData::element(XName::new(W::NS, local)),
            (false, true) => XmlNodeData::element_with_attrs(
                XName::new(W::NS, local),
                vec![XAttribute::new(W::val(), "0")],
            ),
            (false, false) => continue,
        };
        let first = doc.children(rpr).next();
        let inserted = match (cursor, first) {
            (Some(prev), _) => doc.add_after(prev, element),
            (None, Some(first)) => doc.add_before(first, element),
            (None, None) => doc.add_child(rpr, element),
        };
        cursor = Some(inserted);
    }
}
