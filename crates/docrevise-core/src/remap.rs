//! Carries original style spans over to replacement text
//!
//! Each alignment op is attributed independently:
//! - `Equal`: every overlapping original sub-span is copied, shifted by
//!   the op's offset
//! - `Replace`: the whole new range takes the style of the earliest
//!   original span overlapping the replaced range
//! - `Insert`: the style of the preceding output span, else of the
//!   original span that follows, else plain
//! - `Delete`: produces nothing
//!
//! The result is merged so adjacent spans never share identical styling.

use crate::align::{AlignmentOp, OpKind};
use crate::spans::{char_slice, merge_adjacent, StyleSpan};
use crate::style::StyleAttributes;

/// Remaps `spans` (original coordinates) onto `new_text` using `ops`
pub fn remap(spans: &[StyleSpan], ops: &[AlignmentOp], new_text: &str) -> Vec<StyleSpan> {
    let mut out: Vec<StyleSpan> = Vec::new();

    for op in ops {
        match op.kind {
            OpKind::Equal => {
                for span in spans
                    .iter()
                    .filter(|s| s.overlaps(op.orig.start, op.orig.end))
                {
                    let start = span.start.max(op.orig.start);
                    let end = span.end.min(op.orig.end);
                    push(
                        &mut out,
                        new_text,
                        op.new.start + (start - op.orig.start),
                        op.new.start + (end - op.orig.start),
                        &span.attributes,
                    );
                }
            }
            OpKind::Replace => {
                let attributes = spans
                    .iter()
                    .find(|s| s.overlaps(op.orig.start, op.orig.end))
                    .map(|s| s.attributes.clone())
                    .unwrap_or_default();
                push(&mut out, new_text, op.new.start, op.new.end, &attributes);
            }
            OpKind::Insert => {
                let attributes = match out.last() {
                    Some(previous) => previous.attributes.clone(),
                    None => following_style(spans, op.orig.start),
                };
                push(&mut out, new_text, op.new.start, op.new.end, &attributes);
            }
            OpKind::Delete => {}
        }
    }

    fill_gaps(out, new_text)
}

/// Style of the original span at or after `offset`
fn following_style(spans: &[StyleSpan], offset: usize) -> StyleAttributes {
    spans
        .iter()
        .find(|s| s.contains(offset) || s.start >= offset)
        .map(|s| s.attributes.clone())
        .unwrap_or_default()
}

fn push(
    out: &mut Vec<StyleSpan>,
    new_text: &str,
    start: usize,
    end: usize,
    attributes: &StyleAttributes,
) {
    if end > start {
        out.push(StyleSpan::new(
            start,
            end,
            char_slice(new_text, start, end),
            attributes.clone(),
        ));
    }
}

/// Closes any hole left by an `Equal` range the original spans did not
/// cover (only possible when the spans were inconsistent with the text),
/// extending the previous span's style, then merges
fn fill_gaps(spans: Vec<StyleSpan>, new_text: &str) -> Vec<StyleSpan> {
    let total = new_text.chars().count();
    let mut filled: Vec<StyleSpan> = Vec::with_capacity(spans.len());
    let mut cursor = 0;

    for span in spans {
        if span.start > cursor {
            let attributes = filled
                .last()
                .map(|s| s.attributes.clone())
                .unwrap_or_else(|| span.attributes.clone());
            push(&mut filled, new_text, cursor, span.start, &attributes);
        }
        cursor = span.end;
        filled.push(span);
    }
    if cursor < total {
        let attributes = filled
            .last()
            .map(|s| s.attributes.clone())
            .unwrap_or_default();
        push(&mut filled, new_text, cursor, total, &attributes);
    }

    merge_adjacent(filled)
}
