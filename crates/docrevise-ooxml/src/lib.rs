//! # docrevise-ooxml
//!
//! Office Open XML access for docrevise.
//!
//! This crate provides:
//! - Lossless reading and rewriting of DOCX/PPTX packages
//! - An editable XML tree that serializes untouched markup byte for byte
//! - Run models for WordprocessingML (`w:r`) and DrawingML (`a:r`) paragraphs
//! - Media marker census for the image guard
//!
//! ## Example: Revising a Document
//!
//! ```no_run
//! use docrevise_core::{Reviser, ServiceError, TransformRequest};
//! use docrevise_ooxml::WordDocument;
//!
//! let mut document = WordDocument::open("report.docx")?;
//! let mut reviser = Reviser::new(|request: &TransformRequest<'_>| -> Result<String, ServiceError> {
//!     Ok(request.text.replace("teh", "the"))
//! });
//! let report = reviser.run(&mut document, "Corrige les fautes", None);
//! println!("{} paragraphs modified", report.counts().modified);
//! document.save("report_revised.docx")?;
//! # Ok::<(), docrevise_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod docx;
pub mod drawingml;
pub mod error;
pub mod media;
pub mod paragraph;
pub mod relationships;
pub mod test_utils;
pub mod wordml;
pub mod xml;

pub use archive::{OoxmlArchive, PackageKind, DOCUMENT_PART, PRESENTATION_PART};
pub use docx::WordDocument;
pub use error::{OoxmlError, Result};
pub use media::{count_media, media_refs, MediaKind, MediaRef};
pub use paragraph::{plain_text, read_runs, Dialect, OoxmlParagraph};
pub use relationships::{
    rels_path_for, resolve_target, Relationship, Relationships, SLIDE_RELATIONSHIP,
};
pub use xml::{XmlDeclaration, XmlDocument, XmlElement, XmlNode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
