//! Per-document conversion report.
//!
//! Recoverable problems never abort a conversion; they are collected here
//! so callers can present a success-with-caveats outcome.

use super::extractor::Classification;
use serde::{Deserialize, Serialize};

/// Outcome for one located reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceStatus {
    /// Replaced by incipit text, anchor and page field.
    Converted,
    /// Converted, but with fewer words than requested.
    ConvertedShort,
    /// No matching note entry; the marker was left in place.
    Dangling,
    /// Preview only; nothing was changed.
    Planned,
}

impl ReferenceStatus {
    pub fn is_converted(self) -> bool {
        matches!(self, Self::Converted | Self::ConvertedShort)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceReport {
    /// One-based position in reading order.
    pub ordinal: usize,
    pub note_id: String,
    pub anchor_name: Option<String>,
    pub incipit: Option<String>,
    pub classification: Option<Classification>,
    pub status: ReferenceStatus,
    pub word_count: usize,
    /// Start of the note text, for previews.
    pub note_excerpt: Option<String>,
}

/// Recoverable problems met during a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConversionIssue {
    #[serde(rename_all = "camelCase")]
    DanglingReference { ordinal: usize, note_id: String },
    #[serde(rename_all = "camelCase")]
    ShortCandidate {
        ordinal: usize,
        note_id: String,
        requested: usize,
        available: usize,
    },
    #[serde(rename_all = "camelCase")]
    MissingManualText { ordinal: usize, note_id: String },
    NoReferencesFound,
}

impl std::fmt::Display for ConversionIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingReference { ordinal, note_id } => write!(
                f,
                "reference #{} points to endnote {} which does not exist; left unchanged",
                ordinal, note_id
            ),
            Self::ShortCandidate {
                ordinal,
                note_id,
                requested,
                available,
            } => write!(
                f,
                "reference #{} (endnote {}): only {} of {} words available",
                ordinal, note_id, available, requested
            ),
            Self::MissingManualText { ordinal, note_id } => write!(
                f,
                "reference #{} (endnote {}): no manual text configured; extracted automatically",
                ordinal, note_id
            ),
            Self::NoReferencesFound => f.write_str("document does not use endnotes"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    pub references_found: usize,
    pub converted: usize,
    pub entries: Vec<ReferenceReport>,
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    pub fn record(&mut self, entry: ReferenceReport) {
        if entry.status.is_converted() {
            self.converted += 1;
        }
        self.entries.push(entry);
    }

    pub fn push_issue(&mut self, issue: ConversionIssue) {
        self.issues.push(issue);
    }

    /// False when nothing was converted, which callers should treat as
    /// "document does not use endnotes" rather than returning a copy.
    pub fn is_success(&self) -> bool {
        self.converted > 0
    }

    pub fn dangling_ids(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter_map(|issue| match issue {
                ConversionIssue::DanglingReference { note_id, .. } => Some(note_id.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn short_ids(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter_map(|issue| match issue {
                ConversionIssue::ShortCandidate { note_id, .. } => Some(note_id.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Ids of references left unconverted in the output.
    pub fn skipped_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.status == ReferenceStatus::Dangling)
            .map(|e| e.note_id.as_str())
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
