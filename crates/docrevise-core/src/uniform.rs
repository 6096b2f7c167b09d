//! Font family and size normalisation across a document
//!
//! Works on runs directly and never calls the text service. Headings keep
//! their size. Single-word emphasis (a bold, italic or underlined word set
//! apart from its neighbours) keeps its size when `preserve_emphasis` is on.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::paragraph::{ParagraphSource, StyledParagraph};
use crate::style::{FontSize, StyledRun};

/// Target selection for uniformization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformizeOptions {
    /// Font family to apply, `None` for the document majority
    pub font: Option<String>,
    /// Body font size to apply, `None` for the document majority
    pub size: Option<FontSize>,
    /// Keep the size of single-word emphasis runs
    pub preserve_emphasis: bool,
}

impl Default for UniformizeOptions {
    fn default() -> Self {
        Self {
            font: None,
            size: None,
            preserve_emphasis: true,
        }
    }
}

/// Most common explicit formatting in a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleCensus {
    /// Most common font family over non-blank runs
    pub font_family: Option<String>,
    /// Most common font size over non-blank body runs
    pub font_size: Option<FontSize>,
    /// Non-blank runs examined
    pub runs: usize,
}

/// Outcome of a uniformization pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniformizeReport {
    /// Font applied to every run, if any
    pub target_font: Option<String>,
    /// Size applied to body runs, if any
    pub target_size: Option<FontSize>,
    /// Runs touched at least once
    pub runs_changed: usize,
    /// Runs whose font family was replaced
    pub font_changes: usize,
    /// Runs whose size was replaced
    pub size_changes: usize,
    /// Emphasis runs whose size was left alone
    pub preserved_emphasis: usize,
}

/// Insertion-ordered tally; ties go to the first value seen
struct Tally<T> {
    entries: Vec<(T, usize)>,
}

impl<T: PartialEq> Tally<T> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add(&mut self, value: T) {
        match self.entries.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((value, 1)),
        }
    }

    fn winner(self) -> Option<T> {
        let mut best: Option<(T, usize)> = None;
        for (value, count) in self.entries {
            if best.as_ref().map_or(true, |(_, b)| count > *b) {
                best = Some((value, count));
            }
        }
        best.map(|(value, _)| value)
    }
}

/// Counts explicit font families and body font sizes
pub fn census<D: ParagraphSource>(document: &mut D) -> StyleCensus {
    let mut fonts = Tally::new();
    let mut sizes = Tally::new();
    let mut runs = 0;

    for index in 0..document.paragraph_count() {
        let Some(paragraph) = document.paragraph_mut(index) else {
            continue;
        };
        let heading = paragraph.is_heading();
        let styled = paragraph.runs();
        for run in styled.iter().filter(|r| !r.text.trim().is_empty()) {
            runs += 1;
            if let Some(family) = &run.attributes.font_family {
                fonts.add(family.clone());
            }
            if let (false, Some(size)) = (heading, run.attributes.font_size) {
                sizes.add(size);
            }
        }
    }

    StyleCensus {
        font_family: fonts.winner(),
        font_size: sizes.winner(),
        runs,
    }
}

/// A single word emphasised differently from a neighbouring run
pub fn is_intentional_emphasis(runs: &[StyledRun], index: usize) -> bool {
    let Some(run) = runs.get(index) else {
        return false;
    };
    let word = run.text.trim();
    if word.is_empty() || word.contains(char::is_whitespace) || !run.attributes.is_emphasis() {
        return false;
    }

    let flags = |r: &StyledRun| {
        (
            r.attributes.bold == Some(true),
            r.attributes.italic == Some(true),
            r.attributes.underline.is_some(),
        )
    };
    let own = flags(run);
    let previous = index.checked_sub(1).and_then(|i| runs.get(i));
    let next = runs.get(index + 1);
    [previous, next]
        .into_iter()
        .flatten()
        .any(|neighbour| flags(neighbour) != own)
}

/// Applies a uniform font family and body size
pub fn uniformize<D: ParagraphSource>(
    document: &mut D,
    options: &UniformizeOptions,
) -> UniformizeReport {
    let needs_census = options.font.is_none() || options.size.is_none();
    let majority = if needs_census {
        census(document)
    } else {
        StyleCensus::default()
    };

    let mut report = UniformizeReport {
        target_font: options.font.clone().or(majority.font_family),
        target_size: options.size.or(majority.font_size),
        ..UniformizeReport::default()
    };
    info!(
        font = report.target_font.as_deref().unwrap_or("-"),
        size = ?report.target_size,
        "uniformizing styles"
    );

    let target_font = report.target_font.clone();
    let target_size = report.target_size;

    for index in 0..document.paragraph_count() {
        let Some(mut paragraph) = document.paragraph_mut(index) else {
            continue;
        };
        let heading = paragraph.is_heading();
        let runs = paragraph.runs();

        for (i, run) in runs.iter().enumerate() {
            if run.text.trim().is_empty() {
                continue;
            }
            let font = target_font
                .as_deref()
                .filter(|target| run.attributes.font_family.as_deref() != Some(*target));

            let mut size = target_size
                .filter(|target| !heading && run.attributes.font_size != Some(*target));
            if size.is_some() && options.preserve_emphasis && is_intentional_emphasis(&runs, i) {
                debug!(paragraph = index, run = i, "keeping emphasis size");
                report.preserved_emphasis += 1;
                size = None;
            }

            if font.is_none() && size.is_none() {
                continue;
            }
            paragraph.restyle_run(i, font, size);
            report.runs_changed += 1;
            report.font_changes += usize::from(font.is_some());
            report.size_changes += usize::from(size.is_some());
        }
    }

    info!(
        runs = report.runs_changed,
        fonts = report.font_changes,
        sizes = report.size_changes,
        "uniformization finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paragraph::mock::{MockDocument, MockParagraph};
    use crate::style::StyleAttributes;

    fn run(text: &str, font: &str, pt: f32) -> StyledRun {
        StyledRun::new(
            text,
            StyleAttributes::plain()
                .with_font_family(font)
                .with_font_size(FontSize::from_points(pt)),
        )
    }

    fn document() -> MockDocument {
        let mut title = MockParagraph::new(vec![run("Rapport", "Arial", 20.0)]);
        title.heading = true;
        MockDocument {
            paragraphs: vec![
                title,
                MockParagraph::new(vec![
                    run("Le texte ", "Calibri", 11.0),
                    run("principal", "Calibri", 11.0),
                ]),
                MockParagraph::new(vec![run("Autre police", "Times New Roman", 12.0)]),
                MockParagraph::new(vec![
                    run("Un mot ", "Calibri", 11.0),
                    StyledRun::new(
                        "important",
                        StyleAttributes::plain()
                            .with_bold(true)
                            .with_font_family("Calibri")
                            .with_font_size(FontSize::from_points(14.0)),
                    ),
                    run(" ici", "Calibri", 11.0),
                ]),
            ],
        }
    }

    #[test]
    fn test_census_majority() {
        let mut doc = document();
        let c = census(&mut doc);
        assert_eq!(c.font_family.as_deref(), Some("Calibri"));
        assert_eq!(c.font_size, Some(FontSize::from_points(11.0)));
        assert_eq!(c.runs, 7);
    }

    #[test]
    fn test_tally_ties_go_to_first_seen() {
        let mut tally = Tally::new();
        for v in ["b", "a", "a", "b"] {
            tally.add(v);
        }
        assert_eq!(tally.winner(), Some("b"));
        assert_eq!(Tally::<&str>::new().winner(), None);
    }

    #[test]
    fn test_emphasis_detection() {
        let doc = document();
        let runs = &doc.paragraphs[3].runs;
        assert!(is_intentional_emphasis(runs, 1));
        assert!(!is_intentional_emphasis(runs, 0));
        assert!(!is_intentional_emphasis(runs, 9));

        let phrase = vec![
            StyledRun::plain("a "),
            StyledRun::new("two words", StyleAttributes::plain().with_italic(true)),
        ];
        assert!(!is_intentional_emphasis(&phrase, 1));
    }

    #[test]
    fn test_uniformize_auto_targets() {
        let mut doc = document();
        let report = uniformize(&mut doc, &UniformizeOptions::default());

        assert_eq!(report.target_font.as_deref(), Some("Calibri"));
        assert_eq!(report.target_size, Some(FontSize::from_points(11.0)));
        assert_eq!(report.preserved_emphasis, 1);

        let title = &doc.paragraphs[0].runs[0].attributes;
        assert_eq!(title.font_family.as_deref(), Some("Calibri"));
        assert_eq!(title.font_size, Some(FontSize::from_points(20.0)));

        let other = &doc.paragraphs[2].runs[0].attributes;
        assert_eq!(other.font_family.as_deref(), Some("Calibri"));
        assert_eq!(other.font_size, Some(FontSize::from_points(11.0)));

        let emphasis = &doc.paragraphs[3].runs[1].attributes;
        assert_eq!(emphasis.font_size, Some(FontSize::from_points(14.0)));
        assert_eq!(emphasis.bold, Some(true));

        assert_eq!(report.font_changes, 2);
        assert_eq!(report.size_changes, 1);
        assert_eq!(report.runs_changed, 2);
    }

    #[test]
    fn test_uniformize_explicit_targets_without_emphasis() {
        let mut doc = document();
        let options = UniformizeOptions {
            font: Some("Georgia".into()),
            size: Some(FontSize::from_points(12.0)),
            preserve_emphasis: false,
        };
        let report = uniformize(&mut doc, &options);

        assert_eq!(report.preserved_emphasis, 0);
        for paragraph in &doc.paragraphs[1..] {
            for run in &paragraph.runs {
                assert_eq!(run.attributes.font_family.as_deref(), Some("Georgia"));
                assert_eq!(run.attributes.font_size, Some(FontSize::from_points(12.0)));
            }
        }
        let title = &doc.paragraphs[0].runs[0].attributes;
        assert_eq!(title.font_size, Some(FontSize::from_points(20.0)));
    }
}
