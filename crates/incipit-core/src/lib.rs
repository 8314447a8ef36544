pub mod error;
pub mod xml;
pub mod package;
pub mod util;
pub mod wml;

pub use error::{IncipitError, Result};

pub use wml::{
    Classification, ConversionIssue, ConversionReport, ConversionResult, ConversionSettings,
    EmphasisStyle, IncipitConverter, ReferenceReport, ReferenceStatus, WmlDocument,
};
