//! Style spans and their extraction from runs
//!
//! A span list partitions a paragraph's text into contiguous half-open
//! character ranges, each carrying one set of formatting attributes.
//! Offsets are counted in `char`s, never bytes.

use serde::{Deserialize, Serialize};

use crate::paragraph::StyledParagraph;
use crate::style::{StyleAttributes, StyledRun};

/// A contiguous range of text sharing one formatting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSpan {
    /// First character offset (inclusive)
    pub start: usize,
    /// Last character offset (exclusive)
    pub end: usize,
    /// The text covered by this span
    pub text: String,
    /// Formatting of the span
    pub attributes: StyleAttributes,
}

impl StyleSpan {
    /// Create a span
    pub fn new(
        start: usize,
        end: usize,
        text: impl Into<String>,
        attributes: StyleAttributes,
    ) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            attributes,
        }
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers no characters
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `[start, end)` intersects this span
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }

    /// Whether `offset` lies inside this span
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Walks a paragraph's runs and produces its span list together with the
/// paragraph text the spans index into
pub fn extract<P: StyledParagraph + ?Sized>(paragraph: &P) -> (String, Vec<StyleSpan>) {
    extract_runs(&paragraph.runs())
}

/// Same as [`extract`], from an explicit run list
///
/// Empty runs contribute no span, so the result never contains
/// zero-length spans.
pub fn extract_runs(runs: &[StyledRun]) -> (String, Vec<StyleSpan>) {
    let mut text = String::new();
    let mut spans = Vec::with_capacity(runs.len());
    let mut offset = 0;

    for run in runs {
        let len = run.char_len();
        if len == 0 {
            continue;
        }
        spans.push(StyleSpan::new(
            offset,
            offset + len,
            run.text.clone(),
            run.attributes.clone(),
        ));
        text.push_str(&run.text);
        offset += len;
    }

    (text, spans)
}

/// Checks that `spans` are contiguous, non-overlapping, non-empty and cover
/// exactly `[0, text_len)`
pub fn covers_exactly(spans: &[StyleSpan], text_len: usize) -> bool {
    let mut cursor = 0;
    for span in spans {
        if span.start != cursor || span.end <= span.start {
            return false;
        }
        cursor = span.end;
    }
    cursor == text_len
}

/// Merges adjacent spans with style-equal attributes
pub fn merge_adjacent(spans: Vec<StyleSpan>) -> Vec<StyleSpan> {
    let mut merged: Vec<StyleSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if last.end == span.start && last.attributes == span.attributes => {
                last.end = span.end;
                last.text.push_str(&span.text);
            }
            _ => merged.push(span),
        }
    }
    merged
}

/// Returns the substring covering characters `[start, end)`
pub(crate) fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let mut indices = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()));
    let from = indices.nth(start).unwrap_or(text.len());
    let to = if end > start {
        indices.nth(end - start - 1).unwrap_or(text.len())
    } else {
        from
    };
    &text[from..to]
}
