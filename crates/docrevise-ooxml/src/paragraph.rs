//! Paragraph adapter shared by Word and slide documents
//!
//! [`OoxmlParagraph`] borrows one paragraph element of an editable tree and
//! exposes it to the revision core through [`StyledParagraph`]. Snapshots
//! are deep copies of the paragraph element.

use docrevise_core::{FontSize, StyledParagraph, StyledRun};

use crate::xml::XmlElement;
use crate::{drawingml, media, wordml};

/// Markup vocabulary of a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `w:p` paragraphs of word-processing documents
    WordprocessingMl,
    /// `a:p` paragraphs of slide text bodies
    DrawingMl,
}

impl Dialect {
    /// Qualified paragraph element name
    pub fn paragraph_name(self) -> &'static str {
        match self {
            Self::WordprocessingMl => "w:p",
            Self::DrawingMl => "a:p",
        }
    }
}

/// Mutable view of one paragraph element
#[derive(Debug)]
pub struct OoxmlParagraph<'a> {
    element: &'a mut XmlElement,
    dialect: Dialect,
    heading: Option<bool>,
}

impl<'a> OoxmlParagraph<'a> {
    /// Wraps a paragraph element
    pub fn new(element: &'a mut XmlElement, dialect: Dialect) -> Self {
        Self {
            element,
            dialect,
            heading: None,
        }
    }

    /// Overrides heading detection (slide titles are known from their shape)
    pub fn with_heading(mut self, heading: bool) -> Self {
        self.heading = Some(heading);
        self
    }

    /// The underlying element
    pub fn element(&self) -> &XmlElement {
        self.element
    }

    /// Paragraph dialect
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Embedded media references
    pub fn media(&self) -> Vec<media::MediaRef> {
        media::media_refs(self.element, self.dialect)
    }
}

/// Runs of a paragraph element without borrowing it mutably
pub fn read_runs(element: &XmlElement, dialect: Dialect) -> Vec<StyledRun> {
    let children = &element.children;
    match dialect {
        Dialect::WordprocessingMl => wordml::model_runs(element)
            .into_iter()
            .filter_map(|i| children[i].as_element())
            .map(wordml::read_run)
            .collect(),
        Dialect::DrawingMl => drawingml::model_runs(element)
            .into_iter()
            .filter_map(|i| children[i].as_element())
            .map(drawingml::read_run)
            .collect(),
    }
}

/// Plain text of a paragraph element
pub fn plain_text(element: &XmlElement, dialect: Dialect) -> String {
    read_runs(element, dialect)
        .into_iter()
        .map(|r| r.text)
        .collect()
}

impl StyledParagraph for OoxmlParagraph<'_> {
    type Snapshot = XmlElement;

    fn runs(&self) -> Vec<StyledRun> {
        read_runs(self.element, self.dialect)
    }

    fn replace_runs(&mut self, runs: &[StyledRun]) {
        match self.dialect {
            Dialect::WordprocessingMl => wordml::replace_runs(self.element, runs),
            Dialect::DrawingMl => drawingml::replace_runs(self.element, runs),
        }
    }

    fn media_count(&self) -> usize {
        media::count_media(self.element, self.dialect)
    }

    fn snapshot(&self) -> Self::Snapshot {
        self.element.clone()
    }

    fn restore(&mut self, snapshot: Self::Snapshot) {
        *self.element = snapshot;
    }

    fn is_heading(&self) -> bool {
        match (self.heading, self.dialect) {
            (Some(heading), _) => heading,
            (None, Dialect::WordprocessingMl) => wordml::is_heading(self.element),
            (None, Dialect::DrawingMl) => false,
        }
    }

    fn restyle_run(
        &mut self,
        index: usize,
        font_family: Option<&str>,
        font_size: Option<FontSize>,
    ) {
        match self.dialect {
            Dialect::WordprocessingMl => {
                wordml::restyle_run(self.element, index, font_family, font_size)
            }
            Dialect::DrawingMl => {
                drawingml::restyle_run(self.element, index, font_family, font_size)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;
    use docrevise_core::{detect, GuardOutcome, ImageGuard, StyleAttributes};

    fn parse(xml: &str) -> XmlElement {
        XmlDocument::parse(xml.as_bytes()).unwrap().root
    }

    #[test]
    fn test_word_paragraph_runs() {
        let mut el = parse(concat!(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr>"#,
            r#"<w:r><w:rPr><w:b/></w:rPr><w:t>Ceci</w:t></w:r>"#,
            r#"<w:r><w:t xml:space="preserve"> est un text</w:t></w:r></w:p>"#
        ));
        let p = OoxmlParagraph::new(&mut el, Dialect::WordprocessingMl);
        assert_eq!(p.text(), "Ceci est un text");
        let bold = StyleAttributes::plain().with_bold(true);
        assert_eq!(p.runs()[0], StyledRun::new("Ceci", bold));
        assert!(p.is_heading());
        assert!(!detect(&p));
    }

    #[test]
    fn test_snapshot_restore() {
        let xml = concat!(
            r#"<w:p><w:r><w:t>Figure</w:t></w:r>"#,
            r#"<w:r><w:drawing><wp:inline/></w:drawing></w:r></w:p>"#
        );
        let original = parse(xml);
        let mut el = original.clone();
        let mut p = OoxmlParagraph::new(&mut el, Dialect::WordprocessingMl);
        let guard = ImageGuard::arm(&p);

        // simulate a host that drops the drawing run while rewriting
        p.replace_runs(&[StyledRun::plain("Figure 1")]);
        p.element.children.pop();
        assert_eq!(p.media_count(), 0);

        assert_eq!(guard.verify(&mut p), GuardOutcome::Restored);
        assert_eq!(el, original);
    }

    #[test]
    fn test_slide_heading_override() {
        let mut el = parse(r#"<a:p><a:r><a:t>Titre</a:t></a:r></a:p>"#);
        let p = OoxmlParagraph::new(&mut el, Dialect::DrawingMl);
        assert!(!p.is_heading());
        let p = p.with_heading(true);
        assert!(p.is_heading());
        assert_eq!(p.dialect().paragraph_name(), "a:p");
    }
}
