use crate::xml::namespaces::CT;
use crate::xml::XmlDocument;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    pub fn new() -> Self {
        let mut defaults = HashMap::new();
        defaults.insert("rels".to_string(), content_type_values::RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), "application/xml".to_string());

        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }

    /// Build from a parsed `[Content_Types].xml`.
    pub fn from_xml(doc: &XmlDocument) -> Self {
        let mut types = Self::default();
        let Some(root) = doc.root() else {
            return types;
        };

        for child in doc.children(root) {
            let Some(data) = doc.get(child) else { continue };
            let attr = |local: &str| {
                data.attributes()?
                    .iter()
                    .find(|a| a.name.namespace.is_none() && a.name.local_name == local)
                    .map(|a| a.value.as_str())
            };
            if data.is_named(CT::NS, "Default") {
                if let (Some(ext), Some(ct)) = (attr("Extension"), attr("ContentType")) {
                    types.add_default(ext, ct);
                }
            } else if data.is_named(CT::NS, "Override") {
                if let (Some(part), Some(ct)) = (attr("PartName"), attr("ContentType")) {
                    types.set_content_type(part, ct);
                }
            }
        }

        types
    }

    /// Content type of a part; accepts names with or without a leading slash.
    pub fn get_content_type(&self, path: &str) -> Option<&str> {
        let part_name = format!("/{}", path.trim_start_matches('/'));
        if let Some(ct) = self.overrides.get(&part_name) {
            return Some(ct);
        }

        let ext = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())?;
        self.defaults.get(&ext).map(String::as_str)
    }

    pub fn set_content_type(&mut self, path: &str, content_type: &str) {
        let part_name = format!("/{}", path.trim_start_matches('/'));
        self.overrides.insert(part_name, content_type.to_string());
    }

    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults
            .insert(extension.to_ascii_lowercase(), content_type.to_string());
    }
}

/// True for the main-part content types of documents, templates and their
/// macro-enabled variants.
pub fn is_wordprocessing_main(content_type: &str) -> bool {
    matches!(
        content_type,
        content_type_values::WORD_DOCUMENT
            | content_type_values::WORD_TEMPLATE
            | content_type_values::WORD_MACRO_DOCUMENT
            | content_type_values::WORD_MACRO_TEMPLATE
    )
}

pub mod content_type_values {
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const WORD_DOCUMENT: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const WORD_TEMPLATE: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";
    pub const WORD_MACRO_DOCUMENT: &str = "application/vnd.ms-word.document.macroEnabled.main+xml";
    pub const WORD_MACRO_TEMPLATE: &str = "application/vnd.ms-word.template.macroEnabledTemplate.main+xml";
}
