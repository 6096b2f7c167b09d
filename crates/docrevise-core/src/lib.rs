//! docrevise-core - Style-preserving text revision
//!
//! Reconciles a paragraph's styled runs with replacement text produced by an
//! external text service, keeping per-character formatting and embedded
//! media intact.
//!
//! # Example
//!
//! ```
//! use docrevise_core::{align, extract_runs, remap, StyleAttributes, StyledRun};
//!
//! let runs = [
//!     StyledRun::new("Ceci", StyleAttributes::plain().with_bold(true)),
//!     StyledRun::plain(" est un text"),
//! ];
//! let (original, spans) = extract_runs(&runs);
//! let new_text = "Ceci est un texte";
//! let remapped = remap(&spans, &align(&original, new_text), new_text);
//!
//! assert_eq!(remapped.len(), 2);
//! assert_eq!(remapped[0].text, "Ceci");
//! assert_eq!(remapped[1].text, " est un texte");
//! ```

pub mod align;
pub mod apply;
pub mod diff;
pub mod error;
pub mod guard;
pub mod journal;
pub mod paragraph;
pub mod pipeline;
pub mod remap;
pub mod service;
pub mod spans;
pub mod style;
pub mod uniform;

pub use align::{align, align_chars, AlignmentOp, OpKind};
pub use apply::{apply, runs_for};
pub use diff::{
    diff, diff_with_context, replay, ChangeKind, ChangeRecord, DiffMode, DEFAULT_CONTEXT_CHARS,
};
pub use error::{ReviseError, Result};
pub use guard::{detect, GuardOutcome, ImageGuard};
pub use journal::{ChangeJournal, JournalEntry};
pub use paragraph::{MediaCensus, ParagraphSource, StyledParagraph};
pub use pipeline::{
    process_paragraph, OutcomeCounts, ParagraphOutcome, ParagraphReport, PassReport, ReviseOptions,
    Reviser, VerificationReport, DEFAULT_CONTEXT_PARAGRAPHS, DEFAULT_CORRECTION_KEYWORDS,
};
pub use remap::remap;
pub use service::{ServiceError, TextTransformer, TransformRequest};
pub use spans::{extract, extract_runs, StyleSpan};
pub use style::{FontSize, RgbColor, StyleAttributes, StyledRun, Underline};
pub use uniform::{census, uniformize, StyleCensus, UniformizeOptions, UniformizeReport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
