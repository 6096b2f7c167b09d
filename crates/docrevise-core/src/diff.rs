//! Human-readable change reports for audit logs
//!
//! `Detailed` mode lists every replacement, insertion and deletion with a
//! window of original text on each side. `Summary` mode reports a free-form
//! rewrite as one whole-text replacement.

use serde::{Deserialize, Serialize};

use crate::align::{align_chars, OpKind};

/// Default width of the context window, in characters
pub const DEFAULT_CONTEXT_CHARS: usize = 20;

/// Reporting granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffMode {
    /// One record per changed region
    Detailed,
    /// At most one record for the whole text
    Summary,
}

impl DiffMode {
    /// `Detailed` when the instruction mentions any correction keyword
    /// (case-insensitive), otherwise `Summary`
    pub fn for_instruction<S: AsRef<str>>(instruction: &str, correction_keywords: &[S]) -> Self {
        let lowered = instruction.to_lowercase();
        if correction_keywords
            .iter()
            .any(|k| !k.as_ref().is_empty() && lowered.contains(&k.as_ref().to_lowercase()))
        {
            Self::Detailed
        } else {
            Self::Summary
        }
    }
}

/// Kind of a reported change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Text replaced by other text
    Replacement,
    /// Text added
    Insertion,
    /// Text removed
    Deletion,
}

impl ChangeKind {
    /// Upper-case label used in text logs
    pub fn label(self) -> &'static str {
        match self {
            Self::Replacement => "REPLACEMENT",
            Self::Insertion => "INSERTION",
            Self::Deletion => "DELETION",
        }
    }
}

/// One textual difference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Kind of change
    pub kind: ChangeKind,
    /// Character offset in the original text
    pub position: usize,
    /// Original text (empty for insertions)
    pub before: String,
    /// New text (empty for deletions)
    pub after: String,
    /// Original text immediately before the change
    pub context_before: String,
    /// Original text immediately after the change
    pub context_after: String,
}

/// Computes the change report between `original` and `final_text`
pub fn diff(original: &str, final_text: &str, mode: DiffMode) -> Vec<ChangeRecord> {
    diff_with_context(original, final_text, mode, DEFAULT_CONTEXT_CHARS)
}

/// Same as [`diff`] with an explicit context width
pub fn diff_with_context(
    original: &str,
    final_text: &str,
    mode: DiffMode,
    context_chars: usize,
) -> Vec<ChangeRecord> {
    if original == final_text {
        return Vec::new();
    }

    match mode {
        DiffMode::Summary => vec![ChangeRecord {
            kind: ChangeKind::Replacement,
            position: 0,
            before: original.to_string(),
            after: final_text.to_string(),
            context_before: String::new(),
            context_after: String::new(),
        }],
        DiffMode::Detailed => {
            let a: Vec<char> = original.chars().collect();
            let b: Vec<char> = final_text.chars().collect();
            let collect = |chars: &[char], start: usize, end: usize| -> String {
                chars[start.min(chars.len())..end.min(chars.len())]
                    .iter()
                    .collect()
            };

            align_chars(&a, &b)
                .into_iter()
                .filter_map(|op| {
                    let kind = match op.kind {
                        OpKind::Equal => return None,
                        OpKind::Replace => ChangeKind::Replacement,
                        OpKind::Insert => ChangeKind::Insertion,
                        OpKind::Delete => ChangeKind::Deletion,
                    };
                    let (i1, i2) = (op.orig.start, op.orig.end);
                    Some(ChangeRecord {
                        kind,
                        position: i1,
                        before: collect(&a, i1, i2),
                        after: collect(&b, op.new.start, op.new.end),
                        context_before: collect(&a, i1.saturating_sub(context_chars), i1),
                        context_after: collect(&a, i2, i2 + context_chars),
                    })
                })
                .collect()
        }
    }
}

/// Applies `records` in order to `original`
///
/// Replaying a detailed report reconstructs the final text exactly.
pub fn replay(original: &str, records: &[ChangeRecord]) -> String {
    let chars: Vec<char> = original.chars().collect();
    let mut out = String::with_capacity(original.len());
    let mut cursor = 0;

    for record in records {
        let position = record.position.min(chars.len());
        if position > cursor {
            out.extend(&chars[cursor..position]);
        }
        out.push_str(&record.after);
        cursor = cursor.max(position + record.before.chars().count());
    }
    if cursor < chars.len() {
        out.extend(&chars[cursor..]);
    }
    out
}
