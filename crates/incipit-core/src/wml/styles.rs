use super::formatting::{Emphasis, PartialEmphasis};
use crate::xml::arena::XmlDocument;
use crate::xml::namespaces::W;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
struct StyleDef {
    based_on: Option<String>,
    emphasis: PartialEmphasis,
}

/// Emphasis-relevant view of `styles.xml`.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: HashMap<String, StyleDef>,
    default_paragraph_style: Option<String>,
    defaults: PartialEmphasis,
}

impl StyleSheet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_xml(doc: &XmlDocument) -> Self {
        let mut sheet = Self::default();
        let Some(root) = doc.root() else {
            return sheet;
        };

        if let Some(rpr) = doc
            .first_child_named(root, &W::docDefaults())
            .and_then(|d| doc.first_child_named(d, &W::rPrDefault()))
            .and_then(|d| doc.first_child_named(d, &W::rPr()))
        {
            sheet.defaults = PartialEmphasis::from_rpr(doc, rpr);
        }

        for style in doc.elements_by_name(root, &W::style()) {
            let Some(data) = doc.get(style) else { continue };
            let Some(id) = data.attribute(W::NS, "styleId") else {
                continue;
            };
            let is_default = data
                .attribute(W::NS, "default")
                .is_some_and(|v| matches!(v, "1" | "true" | "on"));
            if is_default && data.attribute(W::NS, "type") == Some("paragraph") {
                sheet.default_paragraph_style = Some(id.to_string());
            }

            let based_on = doc
                .first_child_named(style, &W::basedOn())
                .and_then(|b| doc.get(b))
                .and_then(|b| b.attribute(W::NS, "val"))
                .map(str::to_string);
            let emphasis = doc
                .first_child_named(style, &W::rPr())
                .map(|rpr| PartialEmphasis::from_rpr(doc, rpr))
                .unwrap_or_default();

            sheet
                .styles
                .insert(id.to_string(), StyleDef { based_on, emphasis });
        }

        sheet
    }

    /// Emphasis declared by a style and the styles it is based on.
    fn chain(&self, style_id: Option<&str>) -> PartialEmphasis {
        let mut result = PartialEmphasis::default();
        let mut seen = HashSet::new();
        let mut current = style_id;

        while let Some(id) = current {
            if result.is_complete() || !seen.insert(id) {
                break;
            }
            let Some(def) = self.styles.get(id) else { break };
            result = result.or(def.emphasis);
            current = def.based_on.as_deref();
        }

        result
    }

    /// Emphasis a run gets from styles and document defaults alone.
    pub fn inherited(&self, run_style: Option<&str>, paragraph_style: Option<&str>) -> Emphasis {
        self.resolve(PartialEmphasis::default(), run_style, paragraph_style)
    }

    /// Effective emphasis: direct formatting, then the character style
    /// chain, then the paragraph style chain, then document defaults.
    pub fn resolve(
        &self,
        direct: PartialEmphasis,
        run_style: Option<&str>,
        paragraph_style: Option<&str>,
    ) -> Emphasis {
        let paragraph_style = paragraph_style.or(self.default_paragraph_style.as_deref());
        direct
            .or(self.chain(run_style))
            .or(self.chain(paragraph_style))
            .or(self.defaults)
            .resolve()
    }
}
