//! A single slide part and its text paragraphs.
//!
//! Paragraphs are the `a:p` elements of shape and table-cell text bodies,
//! in document order. A paragraph counts as a heading when its shape is a
//! title placeholder:
//!
//! ```xml
//! <p:sp>
//!   <p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/>
//!     <p:nvPr><p:ph type="title"/></p:nvPr>
//!   </p:nvSpPr>
//!   <p:txBody><a:bodyPr/><a:p><a:r><a:t>Agenda</a:t></a:r></a:p></p:txBody>
//! </p:sp>
//! ```

use docrevise_ooxml::{plain_text, Dialect, OoxmlParagraph, XmlDocument, XmlElement};

use crate::error::{PptxError, Result};

/// Placeholder types rendered as slide titles
const TITLE_PLACEHOLDERS: &[&str] = &["title", "ctrTitle"];

/// A text paragraph located in a slide tree
#[derive(Debug, Clone, PartialEq, Eq)]
struct SlideParagraph {
    /// Child-index path from the slide root
    path: Vec<usize>,
    /// Inside a title placeholder
    heading: bool,
}

/// One parsed slide part
#[derive(Debug)]
pub struct Slide {
    part: String,
    xml: XmlDocument,
    paragraphs: Vec<SlideParagraph>,
}

impl Slide {
    /// Parse a slide part
    pub fn parse(part: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let part = part.into();
        let xml = XmlDocument::parse(bytes)?;
        if !xml.root.is("p:sld") {
            return Err(PptxError::invalid_slide(
                part,
                format!("expected p:sld root, found {}", xml.root.name),
            ));
        }

        let paragraphs = xml
            .root
            .outermost_paths(Dialect::DrawingMl.paragraph_name())
            .into_iter()
            .map(|path| SlideParagraph {
                heading: in_title_shape(&xml.root, &path),
                path,
            })
            .collect();

        Ok(Self { part, xml, paragraphs })
    }

    /// Package path of the slide part
    pub fn part(&self) -> &str {
        &self.part
    }

    /// Number of text paragraphs
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Mutable handle to a paragraph of this slide
    pub fn paragraph_mut(&mut self, index: usize) -> Option<OoxmlParagraph<'_>> {
        let entry = self.paragraphs.get(index)?;
        let heading = entry.heading;
        let element = self.xml.root.at_path_mut(&entry.path)?;
        let paragraph = OoxmlParagraph::new(element, Dialect::DrawingMl);
        Some(paragraph.with_heading(heading))
    }

    /// Paragraph element by index
    pub fn paragraph_element(&self, index: usize) -> Option<&XmlElement> {
        self.xml.root.at_path(&self.paragraphs.get(index)?.path)
    }

    /// Plain text of every paragraph, in order
    pub fn texts(&self) -> Vec<String> {
        self.paragraphs
            .iter()
            .map(|p| {
                self.xml
                    .root
                    .at_path(&p.path)
                    .map(|el| plain_text(el, Dialect::DrawingMl))
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Title text, from the first title placeholder paragraph
    pub fn title(&self) -> Option<String> {
        let index = self.paragraphs.iter().position(|p| p.heading)?;
        self.texts().into_iter().nth(index)
    }

    /// Serialized slide part
    pub fn to_bytes(&self) -> Vec<u8> {
        self.xml.to_bytes()
    }
}

/// Whether the element at `path` sits inside a title placeholder shape
fn in_title_shape(root: &XmlElement, path: &[usize]) -> bool {
    let mut element = root;
    for &i in path {
        if element.is("p:sp") && is_title_shape(element) {
            return true;
        }
        match element.children.get(i).and_then(|n| n.as_element()) {
            Some(child) => element = child,
            None => return false,
        }
    }
    false
}

fn is_title_shape(shape: &XmlElement) -> bool {
    shape
        .child("p:nvSpPr")
        .and_then(|nv| nv.child("p:nvPr"))
        .and_then(|nv| nv.child("p:ph"))
        .and_then(|ph| ph.attr("type"))
        .is_some_and(|kind| TITLE_PLACEHOLDERS.contains(&kind))
}
