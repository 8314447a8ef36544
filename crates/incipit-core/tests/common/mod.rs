//! In-memory `.docx` fixtures for the integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::{CompressionMethod, ZipArchive};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const WORD_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

/// Builds a small but complete WordprocessingML package.
pub struct DocxBuilder {
    paragraphs: Vec<String>,
    notes: Vec<(String, String)>,
    styles: Option<String>,
    settings: Option<String>,
    main_content_type: String,
    with_endnotes: bool,
}

impl Default for DocxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self {
            paragraphs: Vec::new(),
            notes: Vec::new(),
            styles: None,
            settings: None,
            main_content_type: WORD_MAIN.to_string(),
            with_endnotes: true,
        }
    }

    /// Add a `w:p` with the given inner markup.
    pub fn paragraph(mut self, inner: impl Into<String>) -> Self {
        self.paragraphs.push(inner.into());
        self
    }

    pub fn note(mut self, id: &str, text: &str) -> Self {
        self.notes.push((id.to_string(), text.to_string()));
        self
    }

    /// Inner markup of `w:styles`.
    pub fn styles(mut self, inner: impl Into<String>) -> Self {
        self.styles = Some(inner.into());
        self
    }

    /// Inner markup of `w:settings`.
    pub fn settings(mut self, inner: impl Into<String>) -> Self {
        self.settings = Some(inner.into());
        self
    }

    pub fn main_content_type(mut self, content_type: &str) -> Self {
        self.main_content_type = content_type.to_string();
        self
    }

    pub fn without_endnotes(mut self) -> Self {
        self.with_endnotes = false;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut overrides = format!(
            r#"<Override PartName="/word/document.xml" ContentType="{}"/>"#,
            self.main_content_type
        );
        let mut document_rels = String::new();
        if self.with_endnotes {
            overrides.push_str(r#"<Override PartName="/word/endnotes.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.endnotes+xml"/>"#);
            document_rels.push_str(r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/endnotes" Target="endnotes.xml"/>"#);
        }
        if self.styles.is_some() {
            overrides.push_str(r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#);
            document_rels.push_str(r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#);
        }
        if self.settings.is_some() {
            overrides.push_str(r#"<Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/>"#);
            document_rels.push_str(r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/>"#);
        }

        let mut entries = vec![
            (
                "[Content_Types].xml".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{overrides}</Types>"#
                ),
            ),
            (
                "_rels/.rels".to_string(),
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#
                    .to_string(),
            ),
            (
                "word/_rels/document.xml.rels".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{document_rels}</Relationships>"#
                ),
            ),
            (
                "word/document.xml".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{}<w:sectPr/></w:body></w:document>"#,
                    self.paragraphs
                        .iter()
                        .map(|p| format!("<w:p>{p}</w:p>"))
                        .collect::<String>()
                ),
            ),
        ];

        if self.with_endnotes {
            let notes: String = self
                .notes
                .iter()
                .map(|(id, text)| {
                    format!(
                        r#"<w:endnote w:id="{id}"><w:p><w:r><w:rPr><w:rStyle w:val="EndnoteReference"/></w:rPr><w:endnoteRef/></w:r><w:r><w:t xml:space="preserve"> {text}</w:t></w:r></w:p></w:endnote>"#
                    )
                })
                .collect();
            entries.push((
                "word/endnotes.xml".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:endnotes xmlns:w="{W_NS}"><w:endnote w:type="separator" w:id="-1"><w:p><w:r><w:separator/></w:r></w:p></w:endnote><w:endnote w:type="continuationSeparator" w:id="0"><w:p><w:r><w:continuationSeparator/></w:r></w:p></w:endnote>{notes}</w:endnotes>"#
                ),
            ));
        }
        if let Some(styles) = &self.styles {
            entries.push((
                "word/styles.xml".to_string(),
                format!(r#"<w:styles xmlns:w="{W_NS}">{styles}</w:styles>"#),
            ));
        }
        if let Some(settings) = &self.settings {
            entries.push((
                "word/settings.xml".to_string(),
                format!(r#"<w:settings xmlns:w="{W_NS}">{settings}</w:settings>"#),
            ));
        }

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, content) in entries {
            writer.start_file(name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}

pub fn run(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{text}</w:t></w:r>"#)
}

pub fn bold_run(text: &str) -> String {
    format!(r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">{text}</w:t></w:r>"#)
}

pub fn italic_run(text: &str) -> String {
    format!(r#"<w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">{text}</w:t></w:r>"#)
}

pub fn reference(id: &str) -> String {
    format!(
        r#"<w:r><w:rPr><w:rStyle w:val="EndnoteReference"/></w:rPr><w:endnoteReference w:id="{id}"/></w:r>"#
    )
}

/// Decompressed content of one archive entry.
pub fn read_part(archive: &[u8], name: &str) -> String {
    let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
    let mut file = zip.by_name(name).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

pub fn entry_names(archive: &[u8]) -> Vec<String> {
    let zip = ZipArchive::new(Cursor::new(archive)).unwrap();
    zip.file_names().map(str::to_string).collect()
}

/// Counts of the structures a conversion produces, read from the output
/// body with roxmltree.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BodySummary {
    pub references: Vec<String>,
    pub bookmarks: Vec<String>,
    pub page_refs: Vec<String>,
    pub paragraphs: Vec<String>,
}

pub fn summarize_body(document_xml: &str) -> BodySummary {
    let doc = roxmltree::Document::parse(document_xml).unwrap();
    let mut summary = BodySummary::default();

    for node in doc.descendants().filter(|n| n.is_element()) {
        let tag = node.tag_name();
        if tag.namespace() != Some(W_NS) {
            continue;
        }
        match tag.name() {
            "endnoteReference" => summary
                .references
                .push(node.attribute((W_NS, "id")).unwrap_or_default().to_string()),
            "bookmarkStart" => summary
                .bookmarks
                .push(node.attribute((W_NS, "name")).unwrap_or_default().to_string()),
            "instrText" => {
                if let Some(name) = node.text().and_then(|t| t.trim().strip_prefix("PAGEREF ")) {
                    summary
                        .page_refs
                        .push(name.trim_end_matches("\\h").trim().to_string());
                }
            }
            "p" => summary.paragraphs.push(
                node.descendants()
                    .filter(|n| n.has_tag_name((W_NS, "t")))
                    .filter_map(|n| n.text())
                    .collect(),
            ),
            _ => {}
        }
    }
    summary
}

fn flag(rpr: Option<roxmltree::Node<'_, '_>>, local: &str) -> bool {
    rpr.and_then(|rpr| rpr.children().find(|c| c.has_tag_name((W_NS, local))))
        .map(|el| !matches!(el.attribute((W_NS, "val")), Some("0" | "false" | "off")))
        .unwrap_or(false)
}

/// Text, direct bold and direct italic of every run holding `w:t` text.
pub fn text_runs(document_xml: &str) -> Vec<(String, bool, bool)> {
    let doc = roxmltree::Document::parse(document_xml).unwrap();

    doc.descendants()
        .filter(|n| n.has_tag_name((W_NS, "r")))
        .filter_map(|r| {
            let text: String = r
                .children()
                .filter(|c| c.has_tag_name((W_NS, "t")))
                .filter_map(|t| t.text())
                .collect();
            if text.is_empty() {
                return None;
            }
            let rpr = r.children().find(|c| c.has_tag_name((W_NS, "rPr")));
            Some((text, flag(rpr, "b"), flag(rpr, "i")))
        })
        .collect()
}
