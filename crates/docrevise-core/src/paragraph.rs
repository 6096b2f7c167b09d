//! Host document accessors
//!
//! The core never touches XML. Documents expose their paragraphs through
//! these traits and the reconciliation stages work only in terms of
//! [`StyledRun`]s.

use serde::Serialize;

use crate::style::{FontSize, StyledRun};

/// A paragraph whose runs can be read and rewritten
pub trait StyledParagraph {
    /// Opaque backup sufficient to restore runs, styling and media
    type Snapshot;

    /// Ordered text runs
    fn runs(&self) -> Vec<StyledRun>;

    /// Plain text, the concatenation of run texts
    fn text(&self) -> String {
        self.runs().into_iter().map(|r| r.text).collect()
    }

    /// Clear the text runs and create one run per entry, in order
    fn replace_runs(&mut self, runs: &[StyledRun]);

    /// Number of embedded media objects
    fn media_count(&self) -> usize;

    /// Capture a full structural backup
    fn snapshot(&self) -> Self::Snapshot;

    /// Overwrite the paragraph with a backup
    fn restore(&mut self, snapshot: Self::Snapshot);

    /// Whether the paragraph is a heading or title
    fn is_heading(&self) -> bool {
        false
    }

    /// Change the font family and/or size of one run in place, keeping its
    /// text and other formatting
    fn restyle_run(&mut self, index: usize, font_family: Option<&str>, font_size: Option<FontSize>);
}

/// A document exposing its paragraphs by index
pub trait ParagraphSource {
    /// Borrowed paragraph handle
    type Paragraph<'a>: StyledParagraph
    where
        Self: 'a;

    /// Number of paragraphs
    fn paragraph_count(&self) -> usize;

    /// Mutable handle to a paragraph
    fn paragraph_mut(&mut self, index: usize) -> Option<Self::Paragraph<'_>>;

    /// Current text of a paragraph
    fn paragraph_text(&mut self, index: usize) -> Option<String> {
        self.paragraph_mut(index).map(|p| p.text())
    }

    /// Media census: total count and indices of paragraphs carrying media
    fn media_census(&mut self) -> MediaCensus {
        let mut census = MediaCensus::default();
        for index in 0..self.paragraph_count() {
            if let Some(paragraph) = self.paragraph_mut(index) {
                let count = paragraph.media_count();
                if count > 0 {
                    census.total += count;
                    census.paragraphs.push(index);
                }
            }
        }
        census
    }
}

/// Media found in a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaCensus {
    /// Total media objects
    pub total: usize,
    /// Indices of paragraphs with at least one media object
    pub paragraphs: Vec<usize>,
}


impl<P: StyledParagraph + ?Sized> StyledParagraph for &mut P {
    type Snapshot = P::Snapshot;

    fn runs(&self) -> Vec<StyledRun> {
        (**self).runs()
    }

    fn text(&self) -> String {
        (**self).text()
    }

    fn replace_runs(&mut self, runs: &[StyledRun]) {
        (**self).replace_runs(runs)
    }

    fn media_count(&self) -> usize {
        (**self).media_count()
    }

    fn snapshot(&self) -> Self::Snapshot {
        (**self).snapshot()
    }

    fn restore(&mut self, snapshot: Self::Snapshot) {
        (**self).restore(snapshot)
    }

    fn is_heading(&self) -> bool {
        (**self).is_heading()
    }

    fn restyle_run(
        &mut self,
        index: usize,
        font_family: Option<&str>,
        font_size: Option<FontSize>,
    ) {
        (**self).restyle_run(index, font_family, font_size)
    }
}
