use crate::error::{IncipitError, Result};
use crate::xml::XmlDocument;
use std::collections::{BTreeSet, HashMap};
use std::io::{Cursor, Read, Write};
use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use super::content_types::ContentTypes;
use super::relationships::{rels_part_name, resolve_target, Relationship, TargetMode};

/// An opened OPC package. Parts are kept in archive order; parts replaced
/// through [`OoxmlPackage::put_xml_part`] are marked dirty and are the only
/// ones re-encoded on [`OoxmlPackage::save`].
pub struct OoxmlPackage {
    source: Vec<u8>,
    order: Vec<String>,
    parts: HashMap<String, Vec<u8>>,
    dirty: BTreeSet<String>,
    content_types: ContentTypes,
}

impl OoxmlPackage {
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| IncipitError::corrupt(format!("not a readable zip archive: {}", e)))?;

        let mut order = Vec::with_capacity(archive.len());
        let mut parts = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| IncipitError::corrupt(format!("entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut content = Vec::new();
            file.read_to_end(&mut content)
                .map_err(|e| IncipitError::corrupt(format!("entry '{}': {}", name, e)))?;
            order.push(name.clone());
            parts.insert(name, content);
        }

        let content_types = match parts.get(CONTENT_TYPES_PART) {
            Some(bytes) => {
                let doc = crate::xml::parser::parse_part(bytes, CONTENT_TYPES_PART)?;
                ContentTypes::from_xml(&doc)
            }
            None => return Err(IncipitError::missing_part(CONTENT_TYPES_PART)),
        };

        Ok(Self {
            source: bytes.to_vec(),
            order,
            parts,
            dirty: BTreeSet::new(),
            content_types,
        })
    }

    /// Write the package back out. With no dirty parts the input bytes are
    /// returned unchanged; otherwise untouched entries are raw-copied so
    /// their compressed payload and metadata survive.
    pub fn save(&self) -> Result<Vec<u8>> {
        if self.dirty.is_empty() {
            return Ok(self.source.clone());
        }

        let mut archive = ZipArchive::new(Cursor::new(self.source.as_slice()))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i)?;
            let name = entry.name().to_string();
            if self.dirty.contains(&name) {
                drop(entry);
                if let Some(content) = self.parts.get(&name) {
                    writer.start_file(name.as_str(), options)?;
                    writer.write_all(content)?;
                }
            } else {
                writer.raw_copy_file(entry)?;
            }
        }

        for name in self.dirty.iter().filter(|n| !self.order.contains(n)) {
            if let Some(content) = self.parts.get(name) {
                writer.start_file(name.as_str(), options)?;
                writer.write_all(content)?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }

    pub fn get_part(&self, path: &str) -> Option<&[u8]> {
        self.parts.get(path).map(|v| v.as_slice())
    }

    pub fn has_part(&self, path: &str) -> bool {
        self.parts.contains_key(path)
    }

    pub fn get_xml_part(&self, path: &str) -> Result<XmlDocument> {
        let bytes = self
            .get_part(path)
            .ok_or_else(|| IncipitError::missing_part(path))?;
        crate::xml::parser::parse_part(bytes, path)
    }

    /// Like [`get_xml_part`](Self::get_xml_part) but `None` for absent parts.
    pub fn get_optional_xml_part(&self, path: &str) -> Result<Option<XmlDocument>> {
        self.get_part(path)
            .map(|bytes| crate::xml::parser::parse_part(bytes, path))
            .transpose()
    }

    pub fn put_xml_part(&mut self, path: &str, doc: &XmlDocument) -> Result<()> {
        let bytes = crate::xml::builder::serialize_bytes(doc)?;
        self.parts.insert(path.to_string(), bytes);
        self.dirty.insert(path.to_string());
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Relationships owned by `source_part`; the empty string addresses the
    /// package-level relationships. A missing `.rels` part yields none.
    pub fn get_relationships(&self, source_part: &str) -> Result<Vec<Relationship>> {
        let rels_part = rels_part_name(source_part);
        Ok(self
            .get_optional_xml_part(&rels_part)?
            .map(|doc| Relationship::parse_all(&doc))
            .unwrap_or_default())
    }

    /// Resolve the first internal relationship of `rel_type` from
    /// `source_part` to a part name.
    pub fn related_part(&self, source_part: &str, rel_type: &str) -> Result<Option<String>> {
        Ok(self
            .get_relationships(source_part)?
            .into_iter()
            .find(|rel| rel.rel_type == rel_type && rel.target_mode == TargetMode::Internal)
            .map(|rel| resolve_target(source_part, &rel.target)))
    }

    pub fn get_content_type(&self, path: &str) -> Option<&str> {
        self.content_types.get_content_type(path)
    }

    pub fn part_names(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }
}

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
