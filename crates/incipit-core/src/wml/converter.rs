//! Conversion entry points.
//!
//! A conversion runs in two phases. Every reference is located and its
//! incipit chosen against the untouched body; only then is the body
//! rewritten, in document order. Choosing first keeps each candidate
//! independent of the surgery done for earlier references.

use super::document::WmlDocument;
use super::extractor::{Extractor, IncipitCandidate};
use super::inject::{inject, remove_note, request_field_update, AnchorAllocator};
use super::locator::{locate, EndnoteReference, LocatedReferences, NoteTable};
use super::report::{ConversionIssue, ConversionReport, ReferenceReport, ReferenceStatus};
use super::settings::ConversionSettings;
use crate::error::Result;
use std::collections::BTreeSet;

/// Note excerpts in reports are cut to this many characters.
const EXCERPT_CHARS: usize = 80;

#[derive(Debug, Clone)]
pub struct ConversionResult {
    /// The rewritten `.docx` archive.
    pub document: Vec<u8>,
    pub report: ConversionReport,
}

struct PlannedReference {
    reference: EndnoteReference,
    /// `None` for dangling references.
    candidate: Option<IncipitCandidate>,
    excerpt: Option<String>,
}

pub struct IncipitConverter;

impl IncipitConverter {
    /// Convert every endnote citation of a `.docx` into incipit text, a
    /// hidden bookmark and a page reference field.
    pub fn convert(bytes: &[u8], settings: &ConversionSettings) -> Result<ConversionResult> {
        settings.validate()?;
        let mut document = WmlDocument::from_bytes(bytes)?;
        let mut report = ConversionReport::default();
        let (located, planned) = plan(&document, settings, &mut report);

        if planned.iter().any(|p| p.candidate.is_some()) {
            apply(&mut document, &located, &planned, settings, &mut report);
        } else {
            for item in &planned {
                report.record(entry(item, ReferenceStatus::Dangling, None));
            }
        }

        tracing::info!(
            found = report.references_found,
            converted = report.converted,
            issues = report.issues.len(),
            "conversion finished"
        );

        Ok(ConversionResult {
            document: document.into_bytes()?,
            report,
        })
    }

    /// Report what [`convert`](Self::convert) would do without producing
    /// an output archive.
    pub fn preview(bytes: &[u8], settings: &ConversionSettings) -> Result<ConversionReport> {
        settings.validate()?;
        let document = WmlDocument::from_bytes(bytes)?;
        let mut report = ConversionReport::default();
        let (_, planned) = plan(&document, settings, &mut report);
        let mut allocator = AnchorAllocator::scan(document.body());

        for item in &planned {
            if item.candidate.is_some() {
                let anchor = allocator.allocate(item.reference.ordinal);
                report.record(entry(item, ReferenceStatus::Planned, Some(anchor.name)));
            } else {
                report.record(entry(item, ReferenceStatus::Dangling, None));
            }
        }
        Ok(report)
    }
}

/// Locate references, pair them with notes and choose every incipit.
/// Recoverable problems are pushed onto `report`.
fn plan(
    document: &WmlDocument,
    settings: &ConversionSettings,
    report: &mut ConversionReport,
) -> (LocatedReferences, Vec<PlannedReference>) {
    let located = locate(document.body(), document.styles());
    let table = NoteTable::build(document.notes());
    let extractor = Extractor::new(settings);
    report.references_found = located.references.len();

    tracing::debug!(
        references = located.references.len(),
        notes = table.len(),
        "located endnote references"
    );
    if located.references.is_empty() {
        report.push_issue(ConversionIssue::NoReferencesFound);
        return (located, Vec::new());
    }

    let mut planned = Vec::with_capacity(located.references.len());
    for reference in &located.references {
        let ordinal = reference.ordinal;
        let note_id = reference.note_id.clone();

        let Some(paragraph) = located.paragraph_of(reference).filter(|_| table.contains(&note_id)) else {
            tracing::warn!(ordinal, note_id = %note_id, "endnote reference has no matching note");
            report.push_issue(ConversionIssue::DanglingReference { ordinal, note_id });
            planned.push(PlannedReference {
                reference: reference.clone(),
                candidate: None,
                excerpt: None,
            });
            continue;
        };

        let manual = if settings.auto_extract {
            None
        } else {
            let text = settings.manual_text_for(&note_id);
            if text.is_none() {
                tracing::warn!(ordinal, note_id = %note_id, "no manual incipit configured");
                report.push_issue(ConversionIssue::MissingManualText {
                    ordinal,
                    note_id: note_id.clone(),
                });
            }
            text
        };
        let candidate = match manual {
            Some(text) => IncipitCandidate::manual(text, paragraph, reference.offset),
            None => extractor.extract(paragraph, reference.offset),
        };

        tracing::debug!(
            ordinal,
            note_id = %note_id,
            classification = %candidate.classification,
            words = candidate.word_count,
            "incipit chosen"
        );
        if candidate.short {
            tracing::warn!(
                ordinal,
                note_id = %note_id,
                requested = settings.word_count,
                available = candidate.word_count,
                "fewer words than requested before the reference"
            );
            report.push_issue(ConversionIssue::ShortCandidate {
                ordinal,
                note_id: note_id.clone(),
                requested: settings.word_count,
                available: candidate.word_count,
            });
        }

        planned.push(PlannedReference {
            reference: reference.clone(),
            candidate: Some(candidate),
            excerpt: table.note_text(document.notes(), &note_id).map(|t| excerpt(&t)),
        });
    }

    (located, planned)
}

/// Rewrite the body and notes for every planned reference.
fn apply(
    document: &mut WmlDocument,
    located: &LocatedReferences,
    planned: &[PlannedReference],
    settings: &ConversionSettings,
    report: &mut ConversionReport,
) {
    let table = NoteTable::build(document.notes());
    let mut allocator = AnchorAllocator::scan(document.body());
    let mut converted_notes = BTreeSet::new();

    {
        let (body, notes) = document.split_mut();
        for item in planned {
            let (Some(candidate), Some(paragraph)) =
                (&item.candidate, located.paragraph_of(&item.reference))
            else {
                report.record(entry(item, ReferenceStatus::Dangling, None));
                continue;
            };

            let anchor = allocator.allocate(item.reference.ordinal);
            inject(body, &item.reference, candidate, paragraph, &anchor, settings);
            converted_notes.insert(item.reference.note_id.as_str());

            let status = if candidate.short {
                ReferenceStatus::ConvertedShort
            } else {
                ReferenceStatus::Converted
            };
            report.record(entry(item, status, Some(anchor.name)));
        }

        for note_id in &converted_notes {
            if let Some(note) = table.get(note_id) {
                remove_note(notes, note);
            }
        }
    }

    if settings.update_fields_on_open {
        match document.settings_mut() {
            Some(settings_part) => {
                if request_field_update(settings_part) {
                    tracing::debug!("requested field update on open");
                }
            }
            None => tracing::warn!("document has no settings part; page numbers update on first repagination"),
        }
    }
}

fn entry(item: &PlannedReference, status: ReferenceStatus, anchor_name: Option<String>) -> ReferenceReport {
    let candidate = item.candidate.as_ref();
    ReferenceReport {
        ordinal: item.reference.ordinal,
        note_id: item.reference.note_id.clone(),
        anchor_name,
        incipit: candidate.map(IncipitCandidate::text),
        classification: candidate.map(|c| c.classification),
        status,
        word_count: candidate.map_or(0, |c| c.word_count),
        note_excerpt: item.excerpt.clone(),
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(EXCERPT_CHARS).collect();
    format!("{}…", cut.trim_end())
}
