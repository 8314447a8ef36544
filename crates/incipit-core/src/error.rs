use thiserror::Error;

#[derive(Error, Debug)]
pub enum IncipitError {
    #[error("Corrupt or incomplete archive: {message}")]
    ArchiveCorrupt { message: String },

    #[error("Malformed markup in '{part}' at {location}: {message}")]
    MarkupMalformed {
        part: String,
        message: String,
        location: String,
    },

    #[error("Unsupported document: main part has content type '{content_type}'")]
    UnsupportedDocument { content_type: String },

    #[error("Invalid settings: {message}")]
    InvalidSettings { message: String },

    #[error("XML serialization error: {0}")]
    XmlWrite(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

impl IncipitError {
    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        Self::ArchiveCorrupt {
            message: message.into(),
        }
    }

    pub(crate) fn missing_part(part_path: &str) -> Self {
        Self::ArchiveCorrupt {
            message: format!("missing mandatory part '{}'", part_path),
        }
    }

    /// True for errors caused by the input document rather than the settings
    /// or the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::ArchiveCorrupt { .. } | Self::MarkupMalformed { .. } | Self::UnsupportedDocument { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, IncipitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        let err = IncipitError::ArchiveCorrupt {
            message: "test error".to_string(),
        };
        assert_eq!(err.to_string(), "Corrupt or incomplete archive: test error");
    }

    #[test]
    fn missing_part_is_reported_as_corrupt_archive() {
        let err = IncipitError::missing_part("word/endnotes.xml");
        assert_eq!(
            err.to_string(),
            "Corrupt or incomplete archive: missing mandatory part 'word/endnotes.xml'"
        );
        assert!(err.is_input_error());
    }

    #[test]
    fn malformed_markup_names_the_part() {
        let err = IncipitError::MarkupMalformed {
            part: "word/document.xml".to_string(),
            message: "unexpected end of stream".to_string(),
            location: "line 3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed markup in 'word/document.xml' at line 3: unexpected end of stream"
        );
    }

    #[test]
    fn settings_errors_are_not_input_errors() {
        let err = IncipitError::InvalidSettings {
            message: "word count 9 outside 2..=7".to_string(),
        };
        assert!(!err.is_input_error());
    }
}
