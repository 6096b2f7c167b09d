//! # docrevise-pptx
//!
//! Slide-deck support for docrevise.
//!
//! A [`Presentation`] exposes the text paragraphs of every slide, in
//! presentation order, as one paragraph sequence the revision pass can walk.
//! Paragraphs in title placeholders report themselves as headings.
//!
//! ## Example
//!
//! ```no_run
//! use docrevise_core::{uniformize, UniformizeOptions};
//! use docrevise_pptx::Presentation;
//!
//! let mut deck = Presentation::open("deck.pptx")?;
//! let report = uniformize(&mut deck, &UniformizeOptions::default());
//! println!("{} runs changed", report.runs_changed);
//! deck.save("deck_revised.pptx")?;
//! # Ok::<(), docrevise_pptx::PptxError>(())
//! ```

pub mod error;
pub mod presentation;
pub mod slide;

// Re-exports
pub use error::{PptxError, Result};
pub use presentation::Presentation;
pub use slide::Slide;

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
