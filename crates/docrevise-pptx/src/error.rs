//! Error types for slide decks.

use docrevise_ooxml::OoxmlError;
use thiserror::Error;

/// Result type for presentation operations
pub type Result<T> = std::result::Result<T, PptxError>;

/// Errors that can occur while reading or writing a presentation
#[derive(Error, Debug)]
pub enum PptxError {
    /// Package, XML or I/O failure
    #[error(transparent)]
    Ooxml(#[from] OoxmlError),

    /// `ppt/presentation.xml` is not a presentation
    #[error("Invalid presentation: {reason}")]
    InvalidPresentation { reason: String },

    /// Slide list entry without a matching relationship
    #[error("Unresolved slide relationship '{rel_id}'")]
    UnresolvedSlide { rel_id: String },

    /// Slide relationship pointing at a part the package lacks
    #[error("Missing slide part: {path}")]
    MissingSlide { path: String },

    /// Slide part that is not a `p:sld`
    #[error("Invalid slide {path}: {reason}")]
    InvalidSlide { path: String, reason: String },
}

impl PptxError {
    /// Create an invalid presentation error
    pub fn invalid_presentation(reason: impl Into<String>) -> Self {
        Self::InvalidPresentation {
            reason: reason.into(),
        }
    }

    /// Create an unresolved slide error
    pub fn unresolved_slide(rel_id: impl Into<String>) -> Self {
        Self::UnresolvedSlide {
            rel_id: rel_id.into(),
        }
    }

    /// Create a missing slide error
    pub fn missing_slide(path: impl Into<String>) -> Self {
        Self::MissingSlide { path: path.into() }
    }

    /// Create an invalid slide error
    pub fn invalid_slide(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSlide {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ooxml(_) => "PPTX001",
            Self::InvalidPresentation { .. } => "PPTX002",
            Self::UnresolvedSlide { .. } => "PPTX003",
            Self::MissingSlide { .. } => "PPTX004",
            Self::InvalidSlide { .. } => "PPTX005",
        }
    }
}
