//! Character-level sequence alignment
//!
//! Computes an edit script between two texts as an ordered list of
//! [`AlignmentOp`]s. Matching is a longest-common-subsequence over `char`s,
//! so the script has minimal insert/delete cost and the largest possible
//! total `Equal` length. The common prefix and suffix are stripped before
//! the quadratic table is built, which keeps the usual "small correction
//! in a long paragraph" case close to linear.
//!
//! Guarantees:
//! - the original ranges partition `[0, len(original))` in order
//! - the new ranges partition `[0, len(new))` in order
//! - no two consecutive ops have the same kind
//! - `Equal` ops have equal-length ranges; `Insert` has an empty original
//!   range, `Delete` an empty new range, `Replace` neither

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Kind of an alignment operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// Identical text on both sides
    Equal,
    /// Original text replaced by different new text
    Replace,
    /// Text present only in the new side
    Insert,
    /// Text present only in the original side
    Delete,
}

/// A classified region of the two texts, in character offsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentOp {
    /// Operation kind
    pub kind: OpKind,
    /// Range in the original text
    pub orig: Range<usize>,
    /// Range in the new text
    pub new: Range<usize>,
}

impl AlignmentOp {
    fn gap(orig: Range<usize>, new: Range<usize>) -> Self {
        let kind = match (orig.is_empty(), new.is_empty()) {
            (false, false) => OpKind::Replace,
            (false, true) => OpKind::Delete,
            (true, false) => OpKind::Insert,
            (true, true) => unreachable!("empty gap is never emitted"),
        };
        Self { kind, orig, new }
    }

    /// Whether this op leaves the text unchanged
    pub fn is_equal(&self) -> bool {
        self.kind == OpKind::Equal
    }
}

/// Aligns `original` against `new_text`
pub fn align(original: &str, new_text: &str) -> Vec<AlignmentOp> {
    let a: Vec<char> = original.chars().collect();
    let b: Vec<char> = new_text.chars().collect();
    align_chars(&a, &b)
}

/// Aligns two character sequences
pub fn align_chars(a: &[char], b: &[char]) -> Vec<AlignmentOp> {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mid_a = &a[prefix..a.len() - suffix];
    let mid_b = &b[prefix..b.len() - suffix];

    let mut builder = OpBuilder::default();
    if prefix > 0 {
        builder.equal(0..prefix, 0..prefix);
    }
    for (i, j) in lcs_pairs(mid_a, mid_b) {
        builder.matched(prefix + i, prefix + j);
    }
    builder.finish(a.len() - suffix, b.len() - suffix);
    if suffix > 0 {
        builder.equal(a.len() - suffix..a.len(), b.len() - suffix..b.len());
    }
    builder.ops
}

/// Matched index pairs of a longest common subsequence, in increasing order
///
/// The table holds suffix LCS lengths so the walk can run forward and take
/// a diagonal whenever characters agree, which keeps matched characters as
/// contiguous and as far left as possible.
fn lcs_pairs(a: &[char], b: &[char]) -> Vec<(usize, usize)> {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 {
        return Vec::new();
    }

    let width = m + 1;
    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if a[i] == b[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let mut pairs = Vec::with_capacity(table[0] as usize);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            pairs.push((i, j));
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}

/// Accumulates matches into coalesced ops
#[derive(Default)]
struct OpBuilder {
    ops: Vec<AlignmentOp>,
    i: usize,
    j: usize,
}

impl OpBuilder {
    fn equal(&mut self, orig: Range<usize>, new: Range<usize>) {
        self.flush_gap(orig.start, new.start);
        match self.ops.last_mut() {
            Some(last)
                if last.is_equal() && last.orig.end == orig.start && last.new.end == new.start =>
            {
                last.orig.end = orig.end;
                last.new.end = new.end;
            }
            _ => self.ops.push(AlignmentOp {
                kind: OpKind::Equal,
                orig: orig.clone(),
                new: new.clone(),
            }),
        }
        self.i = orig.end;
        self.j = new.end;
    }

    fn matched(&mut self, i: usize, j: usize) {
        self.equal(i..i + 1, j..j + 1);
    }

    fn finish(&mut self, i: usize, j: usize) {
        self.flush_gap(i, j);
    }

    fn flush_gap(&mut self, i: usize, j: usize) {
        if i > self.i || j > self.j {
            self.ops.push(AlignmentOp::gap(self.i..i, self.j..j));
            self.i = i;
            self.j = j;
        }
    }
}
