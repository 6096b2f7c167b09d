//! Error types for package and XML access

use thiserror::Error;

/// Errors raised while reading, editing or writing an OOXML package
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// The ZIP container could not be read or written
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A part is not well-formed XML
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// A part the document model needs is absent from the package
    #[error("Package part not found: {0}")]
    MissingPart(String),

    /// A part parsed but does not have the expected shape
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),
}

impl OoxmlError {
    pub fn missing_part(path: impl Into<String>) -> Self {
        Self::MissingPart(path.into())
    }

    pub fn invalid_structure(reason: impl Into<String>) -> Self {
        Self::InvalidStructure(reason.into())
    }
}

/// Result type for package operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
