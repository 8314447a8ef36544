mod converter;
mod document;
mod extractor;
mod formatting;
mod inject;
mod locator;
mod report;
mod runs;
mod settings;
mod styles;

pub use converter::{ConversionResult, IncipitConverter};
pub use document::WmlDocument;
pub use extractor::{
    default_rules, Classification, EmDashRule, EpigraphRule, ExtractionContext, Extractor,
    IncipitCandidate, IncipitRule, RuleMatch, Segment, SentenceStartRule,
};
pub use formatting::{Emphasis, PartialEmphasis};
pub use inject::{inject, request_field_update, Anchor, AnchorAllocator};
pub use locator::{locate, EndnoteReference, LocatedReferences, NoteEntry, NoteTable};
pub use report::{ConversionIssue, ConversionReport, ReferenceReport, ReferenceStatus};
pub use runs::{LogicalText, Provenance, RunSequence, TextRun};
pub use settings::{ConversionSettings, EmphasisStyle, MAX_WORD_COUNT, MIN_WORD_COUNT};
pub use styles::StyleSheet;
