//! Writes remapped spans back into a paragraph

use crate::error::{ReviseError, Result};
use crate::paragraph::StyledParagraph;
use crate::spans::{covers_exactly, StyleSpan};
use crate::style::StyledRun;

/// Converts spans into runs, one run per span
///
/// The spans must tile `new_text` exactly. An empty span list over
/// non-empty text yields a single plain run.
pub fn runs_for(new_text: &str, spans: &[StyleSpan]) -> Result<Vec<StyledRun>> {
    let len = new_text.chars().count();
    if spans.is_empty() {
        return Ok(if len == 0 {
            Vec::new()
        } else {
            vec![StyledRun::plain(new_text)]
        });
    }
    if !covers_exactly(spans, len) {
        return Err(ReviseError::SpanCoverage {
            expected: len,
            covered: spans.iter().map(StyleSpan::len).sum(),
        });
    }

    let mut chars = new_text.chars();
    let runs = spans
        .iter()
        .map(|span| {
            let text: String = chars.by_ref().take(span.len()).collect();
            StyledRun::new(text, span.attributes.clone())
        })
        .collect();
    Ok(runs)
}

/// Replaces the paragraph's text runs with one run per span
///
/// Validation happens before the paragraph is touched, so an error leaves
/// it unmodified. Returns the number of runs written.
pub fn apply<P: StyledParagraph + ?Sized>(
    paragraph: &mut P,
    new_text: &str,
    spans: &[StyleSpan],
) -> Result<usize> {
    let runs = runs_for(new_text, spans)?;
    paragraph.replace_runs(&runs);
    Ok(runs.len())
}
