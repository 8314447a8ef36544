use crate::error::{IncipitError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Smallest and largest number of words an incipit may hold.
pub const MIN_WORD_COUNT: usize = 2;
pub const MAX_WORD_COUNT: usize = 7;

/// How the spliced incipit text is emphasized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmphasisStyle {
    /// Bold on, italic off.
    #[default]
    Bold,
    /// Italic on, bold off.
    Italic,
    /// Keep whatever emphasis the source text had.
    Preserve,
}

impl std::str::FromStr for EmphasisStyle {
    type Err = IncipitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bold" => Ok(Self::Bold),
            "italic" => Ok(Self::Italic),
            "preserve" => Ok(Self::Preserve),
            other => Err(IncipitError::InvalidSettings {
                message: format!("unknown emphasis style '{}'", other),
            }),
        }
    }
}

/// Settings for [`IncipitConverter`](super::IncipitConverter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionSettings {
    /// Number of words taken from the citing sentence (2 to 7).
    pub word_count: usize,

    pub emphasis_style: EmphasisStyle,

    /// When false, no text is extracted and the manual text is spliced
    /// in instead.
    pub auto_extract: bool,

    /// Literal incipit per endnote id, used when `auto_extract` is off.
    pub manual_incipits: BTreeMap<String, String>,

    /// Fallback literal incipit for notes missing from `manual_incipits`.
    pub manual_default: Option<String>,

    /// Paragraphs shorter than this (after trimming) that are entirely
    /// italic are treated as epigraphs.
    pub epigraph_max_chars: usize,

    /// Result text shown by the page field until the editor updates it.
    pub page_placeholder: String,

    /// Ask the editor to refresh all fields when the document is opened.
    pub update_fields_on_open: bool,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            word_count: 3,
            emphasis_style: EmphasisStyle::Bold,
            auto_extract: true,
            manual_incipits: BTreeMap::new(),
            manual_default: None,
            epigraph_max_chars: 150,
            page_placeholder: "0".to_string(),
            update_fields_on_open: false,
        }
    }
}

impl ConversionSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_word_count(mut self, word_count: usize) -> Self {
        self.word_count = word_count;
        self
    }

    pub fn with_emphasis_style(mut self, style: EmphasisStyle) -> Self {
        self.emphasis_style = style;
        self
    }

    pub fn with_auto_extract(mut self, auto_extract: bool) -> Self {
        self.auto_extract = auto_extract;
        self
    }

    /// Set the literal text for one note. Implies nothing about
    /// `auto_extract`; callers turn that off separately.
    pub fn with_manual_incipit(mut self, note_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.manual_incipits.insert(note_id.into(), text.into());
        self
    }

    pub fn with_manual_default(mut self, text: impl Into<String>) -> Self {
        self.manual_default = Some(text.into());
        self
    }

    pub fn with_epigraph_max_chars(mut self, max_chars: usize) -> Self {
        self.epigraph_max_chars = max_chars;
        self
    }

    pub fn with_page_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.page_placeholder = placeholder.into();
        self
    }

    pub fn with_update_fields_on_open(mut self, update: bool) -> Self {
        self.update_fields_on_open = update;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_WORD_COUNT..=MAX_WORD_COUNT).contains(&self.word_count) {
            return Err(IncipitError::InvalidSettings {
                message: format!(
                    "word count {} outside {}..={}",
                    self.word_count, MIN_WORD_COUNT, MAX_WORD_COUNT
                ),
            });
        }
        if self.page_placeholder.is_empty() {
            return Err(IncipitError::InvalidSettings {
                message: "page placeholder must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Literal text for a note when extraction is disabled.
    pub fn manual_text_for(&self, note_id: &str) -> Option<&str> {
        self.manual_incipits
            .get(note_id)
            .or(self.manual_default.as_ref())
            .map(String::as_str)
    }
}
