use super::styles::StyleSheet;
use crate::error::{IncipitError, Result};
use crate::package::content_types::is_wordprocessing_main;
use crate::package::{relationship_types, OoxmlPackage};
use crate::xml::arena::XmlDocument;

const DEFAULT_MAIN_PART: &str = "word/document.xml";
const DEFAULT_ENDNOTES_PART: &str = "word/endnotes.xml";
const DEFAULT_STYLES_PART: &str = "word/styles.xml";
const DEFAULT_SETTINGS_PART: &str = "word/settings.xml";
const GENERIC_XML: &str = "application/xml";

/// An unpacked WordprocessingML package with the parts a conversion reads
/// or rewrites already parsed.
pub struct WmlDocument {
    package: OoxmlPackage,
    main_part: String,
    endnotes_part: String,
    settings_part: Option<String>,
    body: XmlDocument,
    notes: XmlDocument,
    settings: Option<XmlDocument>,
    styles: StyleSheet,
    body_dirty: bool,
    notes_dirty: bool,
    settings_dirty: bool,
}

impl WmlDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let package = OoxmlPackage::open(bytes)?;

        let main_part = discover(&package, "", relationship_types::OFFICE_DOCUMENT, DEFAULT_MAIN_PART)?
            .ok_or_else(|| IncipitError::missing_part(DEFAULT_MAIN_PART))?;
        if let Some(content_type) = package.get_content_type(&main_part) {
            // A bare extension default says nothing about the document kind
            if content_type != GENERIC_XML && !is_wordprocessing_main(content_type) {
                return Err(IncipitError::UnsupportedDocument {
                    content_type: content_type.to_string(),
                });
            }
        }
        let body = package.get_xml_part(&main_part)?;

        let endnotes_part = discover(&package, &main_part, relationship_types::ENDNOTES, DEFAULT_ENDNOTES_PART)?
            .ok_or_else(|| IncipitError::missing_part(DEFAULT_ENDNOTES_PART))?;
        let notes = package.get_xml_part(&endnotes_part)?;

        let styles = match discover(&package, &main_part, relationship_types::STYLES, DEFAULT_STYLES_PART)? {
            Some(part) => StyleSheet::from_xml(&package.get_xml_part(&part)?),
            None => StyleSheet::empty(),
        };

        let settings_part = discover(&package, &main_part, relationship_types::SETTINGS, DEFAULT_SETTINGS_PART)?;
        let settings = match &settings_part {
            Some(part) => Some(package.get_xml_part(part)?),
            None => None,
        };

        tracing::debug!(
            main = %main_part,
            endnotes = %endnotes_part,
            settings = ?settings_part,
            "unpacked document"
        );

        Ok(Self {
            package,
            main_part,
            endnotes_part,
            settings_part,
            body,
            notes,
            settings,
            styles,
            body_dirty: false,
            notes_dirty: false,
            settings_dirty: false,
        })
    }

    /// Serialize the parts that were handed out mutably and repack. An
    /// untouched document comes back byte for byte.
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        if self.body_dirty {
            self.package.put_xml_part(&self.main_part, &self.body)?;
        }
        if self.notes_dirty {
            self.package.put_xml_part(&self.endnotes_part, &self.notes)?;
        }
        if let (true, Some(part), Some(settings)) =
            (self.settings_dirty, &self.settings_part, &self.settings)
        {
            self.package.put_xml_part(part, settings)?;
        }
        self.package.save()
    }

    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    pub fn endnotes_part(&self) -> &str {
        &self.endnotes_part
    }

    pub fn body(&self) -> &XmlDocument {
        &self.body
    }

    pub fn notes(&self) -> &XmlDocument {
        &self.notes
    }

    /// `None` when the package has no settings part.
    pub fn settings_mut(&mut self) -> Option<&mut XmlDocument> {
        let settings = self.settings.as_mut()?;
        self.settings_dirty = true;
        Some(settings)
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    /// Body and notes trees, both borrowed mutably.
    pub fn split_mut(&mut self) -> (&mut XmlDocument, &mut XmlDocument) {
        self.body_dirty = true;
        self.notes_dirty = true;
        (&mut self.body, &mut self.notes)
    }
}

/// Follow a relationship of `rel_type` from `source`, falling back to the
/// conventional part name when no relationship exists. `None` when neither
/// is present in the package.
fn discover(package: &OoxmlPackage, source: &str, rel_type: &str, fallback: &str) -> Result<Option<String>> {
    if let Some(part) = package.related_part(source, rel_type)? {
        if package.has_part(&part) {
            return Ok(Some(part));
        }
        tracing::warn!(part = %part, "relationship target is missing from the package");
    }
    Ok(package.has_part(fallback).then(|| fallback.to_string()))
}
