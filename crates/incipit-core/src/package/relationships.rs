use crate::xml::namespaces::PR;
use crate::xml::XmlDocument;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TargetMode {
    #[default]
    Internal,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    #[serde(default)]
    pub target_mode: TargetMode,
}

impl Relationship {
    pub fn new(id: &str, rel_type: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: TargetMode::Internal,
        }
    }

    /// Read every `Relationship` element of a `.rels` part.
    pub fn parse_all(doc: &XmlDocument) -> Vec<Relationship> {
        let Some(root) = doc.root() else {
            return Vec::new();
        };

        doc.elements_by_name(root, &PR::Relationship())
            .filter_map(|node| {
                let data = doc.get(node)?;
                let attr = |local: &str| {
                    data.attributes()?
                        .iter()
                        .find(|a| a.name.namespace.is_none() && a.name.local_name == local)
                        .map(|a| a.value.as_str())
                };
                let mut rel = Relationship::new(attr("Id")?, attr("Type")?, attr("Target")?);
                if attr("TargetMode") == Some("External") {
                    rel.target_mode = TargetMode::External;
                }
                Some(rel)
            })
            .collect()
    }
}

/// Name of the `.rels` part holding the relationships of `source_part`.
/// The empty string stands for the package itself.
pub fn rels_part_name(source_part: &str) -> String {
    match source_part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None if source_part.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{}.rels", source_part),
    }
}

/// Resolve a relationship target against the part that owns the
/// relationship, yielding a zip entry name without a leading slash.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize(absolute);
    }
    let base = source_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    if base.is_empty() {
        normalize(target)
    } else {
        normalize(&format!("{}/{}", base, target))
    }
}

fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

pub mod relationship_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const SETTINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
    pub const ENDNOTES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/endnotes";
}
