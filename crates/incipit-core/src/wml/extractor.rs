//! Choosing the incipit for an endnote reference.
//!
//! The extractor looks only at the paragraph holding the reference. A list
//! of [`IncipitRule`]s decides where the cited sentence starts (first match
//! wins), then the first few words from that point up to the reference
//! become the incipit.

use super::formatting::Emphasis;
use super::runs::{LogicalText, RunSequence};
use super::settings::ConversionSettings;
use crate::util::group_adjacent;
use crate::util::strings::{
    is_boundary_mark, is_reference_suffix, is_terminal_punctuation, trim_terminal_punctuation,
    EM_DASH, LEFT_DOUBLE_QUOTE, LEFT_SINGLE_QUOTE, RIGHT_DOUBLE_QUOTE, RIGHT_SINGLE_QUOTE,
};
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    Epigraph,
    SentenceStart,
    EmDashAdjusted,
    /// Literal text supplied by the caller.
    Manual,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Epigraph => "epigraph",
            Self::SentenceStart => "sentence-start",
            Self::EmDashAdjusted => "em-dash-adjusted",
            Self::Manual => "manual",
        };
        f.write_str(label)
    }
}

/// A stretch of incipit text taken from one source run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub emphasis: Emphasis,
    /// Index of the source run in the paragraph's [`RunSequence`], if any.
    pub run: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncipitCandidate {
    pub segments: Vec<Segment>,
    /// Logical-text range the words were taken from.
    pub range: Range<usize>,
    pub classification: Classification,
    pub word_count: usize,
    /// Fewer words were available than requested.
    pub short: bool,
}

impl IncipitCandidate {
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Candidate made of caller-supplied text, formatted like the run just
    /// before the reference.
    pub fn manual(text: &str, paragraph: &RunSequence, reference_offset: usize) -> Self {
        let logical = paragraph.logical_text();
        let run = reference_offset
            .checked_sub(1)
            .and_then(|i| logical.provenance(i))
            .map(|p| p.run);
        let emphasis = run
            .and_then(|r| paragraph.run(r))
            .map(|r| r.emphasis)
            .unwrap_or_default();

        Self {
            segments: vec![Segment {
                text: text.to_string(),
                emphasis,
                run,
            }],
            range: reference_offset..reference_offset,
            classification: Classification::Manual,
            word_count: text.split_whitespace().count(),
            short: false,
        }
    }
}

/// Everything a rule may look at.
pub struct ExtractionContext<'a> {
    pub runs: &'a RunSequence,
    pub text: &'a LogicalText,
    /// End of the scan window: the reference offset minus the punctuation
    /// attached to the reference.
    pub end: usize,
    pub epigraph_max_chars: usize,
    quote_open: Vec<bool>,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(
        runs: &'a RunSequence,
        text: &'a LogicalText,
        reference_offset: usize,
        epigraph_max_chars: usize,
    ) -> Self {
        let chars = text.chars();
        let mut end = reference_offset.min(chars.len());
        while end > 0 && is_reference_suffix(chars[end - 1]) {
            end -= 1;
        }

        Self {
            runs,
            text,
            end,
            epigraph_max_chars,
            quote_open: open_quotation_map(chars),
        }
    }

    /// A `.`, `:` or `;` that is not followed directly by a letter or digit.
    pub fn is_boundary(&self, index: usize) -> bool {
        let chars = self.text.chars();
        chars.get(index).is_some_and(|&c| is_boundary_mark(c))
            && !chars.get(index + 1).is_some_and(|c| c.is_alphanumeric())
    }

    /// Whether a quotation is open just before `index`.
    pub fn in_open_quotation(&self, index: usize) -> bool {
        self.quote_open.get(index).copied().unwrap_or(false)
    }

    /// Start of the sentence ending at `end`: just past the nearest boundary
    /// outside quotation marks, or the paragraph start.
    pub fn sentence_start(&self) -> usize {
        (0..self.end)
            .rev()
            .find(|&i| self.is_boundary(i) && !self.in_open_quotation(i))
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    fn is_italic(&self, index: usize) -> bool {
        self.text
            .provenance(index)
            .and_then(|p| self.runs.run(p.run))
            .is_some_and(|r| r.emphasis.italic)
    }
}

/// For every character index, whether a quotation is open before it.
/// Curly double and single quotes open and close; a straight double quote
/// toggles; `’` between two letters is an apostrophe.
fn open_quotation_map(chars: &[char]) -> Vec<bool> {
    let mut open = Vec::with_capacity(chars.len());
    let mut double_depth: usize = 0;
    let mut single_depth: usize = 0;
    let mut straight_open = false;

    for (i, &c) in chars.iter().enumerate() {
        open.push(double_depth > 0 || single_depth > 0 || straight_open);
        match c {
            LEFT_DOUBLE_QUOTE => double_depth += 1,
            RIGHT_DOUBLE_QUOTE => double_depth = double_depth.saturating_sub(1),
            '"' => straight_open = !straight_open,
            LEFT_SINGLE_QUOTE => single_depth += 1,
            RIGHT_SINGLE_QUOTE => {
                let between_letters = i > 0
                    && chars[i - 1].is_alphabetic()
                    && chars.get(i + 1).is_some_and(|c| c.is_alphabetic());
                if !between_letters {
                    single_depth = single_depth.saturating_sub(1);
                }
            }
            _ => {}
        }
    }

    open
}

/// Where a rule decided the incipit starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    pub start: usize,
    pub classification: Classification,
    /// Skip text set off by em-dashes while collecting words.
    pub exclude_dashed: bool,
}

pub trait IncipitRule {
    fn name(&self) -> &'static str;

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Option<RuleMatch>;
}

/// Short, entirely italic paragraphs start at their first character.
pub struct EpigraphRule;

impl IncipitRule for EpigraphRule {
    fn name(&self) -> &'static str {
        "epigraph"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Option<RuleMatch> {
        let chars = ctx.text.chars();
        let first = chars.iter().position(|c| !c.is_whitespace())?;
        let last = chars.iter().rposition(|c| !c.is_whitespace())?;

        if last + 1 - first >= ctx.epigraph_max_chars {
            return None;
        }
        let all_italic = (first..=last)
            .filter(|&i| !chars[i].is_whitespace())
            .all(|i| ctx.is_italic(i));

        all_italic.then_some(RuleMatch {
            start: first,
            classification: Classification::Epigraph,
            exclude_dashed: false,
        })
    }
}

/// An em-dash between the sentence start and the reference marks an
/// aside, which is left out of the incipit.
pub struct EmDashRule;

impl IncipitRule for EmDashRule {
    fn name(&self) -> &'static str {
        "em-dash"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Option<RuleMatch> {
        let start = ctx.sentence_start();
        let chars = ctx.text.chars();
        chars[start..ctx.end].contains(&EM_DASH).then_some(RuleMatch {
            start,
            classification: Classification::EmDashAdjusted,
            exclude_dashed: true,
        })
    }
}

pub struct SentenceStartRule;

impl IncipitRule for SentenceStartRule {
    fn name(&self) -> &'static str {
        "sentence-start"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Option<RuleMatch> {
        Some(RuleMatch {
            start: ctx.sentence_start(),
            classification: Classification::SentenceStart,
            exclude_dashed: false,
        })
    }
}

pub fn default_rules() -> Vec<Box<dyn IncipitRule>> {
    vec![
        Box::new(EpigraphRule),
        Box::new(EmDashRule),
        Box::new(SentenceStartRule),
    ]
}

/// A piece of output text: a source character, or a space standing in for
/// text that was skipped.
#[derive(Debug, Clone, Copy)]
struct Piece {
    c: char,
    run: Option<usize>,
}

/// What separates a word from the previous one.
#[derive(Debug, Clone, Default)]
enum Lead {
    #[default]
    Start,
    Whitespace(Vec<usize>),
    /// Excluded text; rendered as a single space.
    Gap,
}

#[derive(Debug, Clone)]
struct Word {
    chars: Vec<usize>,
    lead: Lead,
}

pub struct Extractor {
    rules: Vec<Box<dyn IncipitRule>>,
    word_count: usize,
    epigraph_max_chars: usize,
}

impl Extractor {
    pub fn new(settings: &ConversionSettings) -> Self {
        Self::with_rules(default_rules(), settings)
    }

    pub fn with_rules(rules: Vec<Box<dyn IncipitRule>>, settings: &ConversionSettings) -> Self {
        Self {
            rules,
            word_count: settings.word_count,
            epigraph_max_chars: settings.epigraph_max_chars,
        }
    }

    pub fn extract(&self, paragraph: &RunSequence, reference_offset: usize) -> IncipitCandidate {
        let text = paragraph.logical_text();
        let ctx = ExtractionContext::new(paragraph, &text, reference_offset, self.epigraph_max_chars);

        let (rule, matched) = self
            .rules
            .iter()
            .find_map(|rule| rule.apply(&ctx).map(|m| (rule.name(), m)))
            .unwrap_or((
                "paragraph-start",
                RuleMatch {
                    start: 0,
                    classification: Classification::SentenceStart,
                    exclude_dashed: false,
                },
            ));
        tracing::trace!(rule, start = matched.start, end = ctx.end, "incipit rule matched");

        self.collect_words(&ctx, matched)
    }

    /// Split `start..end` into words. With `exclude_dashed`, em-dashes
    /// toggle an excluded span and also end the current word.
    fn split_words(ctx: &ExtractionContext<'_>, matched: RuleMatch) -> Vec<Word> {
        let chars = ctx.text.chars();
        let mut words = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        let mut lead = Lead::Start;
        let mut spacing: Vec<usize> = Vec::new();
        let mut gap = false;
        let mut excluded = false;

        for i in matched.start.min(ctx.end)..ctx.end {
            let c = chars[i];
            let breaks_word = if matched.exclude_dashed && c == EM_DASH {
                excluded = !excluded;
                gap = true;
                true
            } else if excluded {
                true
            } else if c.is_whitespace() {
                spacing.push(i);
                true
            } else {
                false
            };

            if breaks_word {
                if !current.is_empty() {
                    words.push(Word {
                        chars: std::mem::take(&mut current),
                        lead: std::mem::take(&mut lead),
                    });
                }
                continue;
            }

            if current.is_empty() {
                lead = if words.is_empty() {
                    Lead::Start
                } else if gap {
                    Lead::Gap
                } else {
                    Lead::Whitespace(std::mem::take(&mut spacing))
                };
                spacing.clear();
                gap = false;
            }
            current.push(i);
        }
        if !current.is_empty() {
            words.push(Word { chars: current, lead });
        }

        words
    }

    fn collect_words(&self, ctx: &ExtractionContext<'_>, matched: RuleMatch) -> IncipitCandidate {
        let chars = ctx.text.chars();
        let run_of = |i: usize| ctx.text.provenance(i).map(|p| p.run);
        let words = Self::split_words(ctx, matched);

        // Tokens made only of punctuation ride along between words but are
        // never counted and never end the incipit.
        let counts = |w: &Word| w.chars.iter().any(|&i| !is_terminal_punctuation(chars[i]));
        let available = words.iter().filter(|&w| counts(w)).count();
        let mut counted = 0;
        let mut taken = 0;
        for (k, word) in words.iter().enumerate() {
            if counted == self.word_count {
                break;
            }
            if counts(word) {
                counted += 1;
                taken = k + 1;
            }
        }

        let mut pieces: Vec<Piece> = Vec::new();
        let mut range_end = matched.start.min(ctx.end);
        for (k, word) in words[..taken].iter().enumerate() {
            match &word.lead {
                Lead::Start => {}
                Lead::Gap => {
                    let run = pieces.last().and_then(|p| p.run);
                    pieces.push(Piece { c: ' ', run });
                }
                Lead::Whitespace(spacing) => {
                    pieces.extend(spacing.iter().map(|&i| Piece {
                        c: if matches!(chars[i], '\t' | '\n' | '\r') { ' ' } else { chars[i] },
                        run: run_of(i),
                    }));
                }
            }

            let mut indices = word.chars.as_slice();
            if k + 1 == taken {
                let spelled: String = indices.iter().map(|&i| chars[i]).collect();
                let keep = trim_terminal_punctuation(&spelled).chars().count();
                indices = &indices[..keep];
            }
            pieces.extend(indices.iter().map(|&i| Piece { c: chars[i], run: run_of(i) }));
            if let Some(&last) = indices.last() {
                range_end = last + 1;
            }
        }

        let range_start = words
            .first()
            .and_then(|w| w.chars.first().copied())
            .unwrap_or(range_end)
            .min(range_end);

        let segments = group_adjacent(&pieces, |p| p.run)
            .into_iter()
            .map(|group| {
                let run = group[0].run;
                Segment {
                    text: group.iter().map(|p| p.c).collect(),
                    emphasis: run
                        .and_then(|r| ctx.runs.run(r))
                        .map(|r| r.emphasis)
                        .unwrap_or_default(),
                    run,
                }
            })
            .collect();

        IncipitCandidate {
            segments,
            range: range_start..range_end,
            classification: matched.classification,
            word_count: counted,
            short: available < self.word_count,
        }
    }
}
