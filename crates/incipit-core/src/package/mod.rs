pub mod content_types;
pub mod ooxml;
pub mod relationships;

pub use content_types::ContentTypes;
pub use ooxml::OoxmlPackage;
pub use relationships::{relationship_types, Relationship};
