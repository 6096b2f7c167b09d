//! Word-processing documents (`.docx`)
//!
//! `word/document.xml` is parsed into an editable tree; every other part of
//! the package is carried through unchanged. Paragraphs are all `w:p`
//! elements under `w:body`, table cells and content controls included,
//! paragraphs nested in text boxes excluded.

use std::io::{Read, Seek, Write};
use std::path::Path;

use docrevise_core::ParagraphSource;
use tracing::debug;

use crate::archive::{OoxmlArchive, DOCUMENT_PART};
use crate::error::{OoxmlError, Result};
use crate::paragraph::{plain_text, Dialect, OoxmlParagraph};
use crate::xml::{XmlDocument, XmlElement};

/// An opened `.docx` package
#[derive(Debug)]
pub struct WordDocument {
    archive: OoxmlArchive,
    xml: XmlDocument,
    /// Child-index paths of paragraphs, relative to `w:body`
    paragraphs: Vec<Vec<usize>>,
    body_index: usize,
}

impl WordDocument {
    /// Open a `.docx` file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_archive(OoxmlArchive::open(path)?)
    }

    /// Read a `.docx` package from any reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_archive(OoxmlArchive::from_reader(reader)?)
    }

    /// Wrap an unpacked package
    pub fn from_archive(archive: OoxmlArchive) -> Result<Self> {
        let xml = XmlDocument::parse(archive.document_xml()?)?;
        if !xml.root.is("w:document") {
            return Err(OoxmlError::InvalidStructure(format!(
                "expected w:document root, found {}",
                xml.root.name
            )));
        }
        let body_index = xml
            .root
            .children
            .iter()
            .position(|n| n.as_element().is_some_and(|e| e.is("w:body")))
            .ok_or_else(|| OoxmlError::invalid_structure("document has no w:body"))?;

        let paragraphs = match xml.root.children[body_index].as_element() {
            Some(body) => body.outermost_paths(Dialect::WordprocessingMl.paragraph_name()),
            None => Vec::new(),
        };
        debug!(paragraphs = paragraphs.len(), "parsed word document");

        Ok(Self {
            archive,
            xml,
            paragraphs,
            body_index,
        })
    }

    fn body(&self) -> Option<&XmlElement> {
        self.xml.root.children.get(self.body_index)?.as_element()
    }

    fn body_mut(&mut self) -> Option<&mut XmlElement> {
        self.xml.root.children.get_mut(self.body_index)?.as_element_mut()
    }

    /// Paragraph element by index
    pub fn paragraph_element(&self, index: usize) -> Option<&XmlElement> {
        let path = self.paragraphs.get(index)?;
        self.body()?.at_path(path)
    }

    /// Plain text of every paragraph, in order
    pub fn texts(&self) -> Vec<String> {
        (0..self.paragraphs.len())
            .map(|i| {
                self.paragraph_element(i)
                    .map(|p| plain_text(p, Dialect::WordprocessingMl))
                    .unwrap_or_default()
            })
            .collect()
    }

    /// The underlying package
    pub fn archive(&self) -> &OoxmlArchive {
        &self.archive
    }

    /// Serialized `word/document.xml`
    pub fn document_xml(&self) -> String {
        self.xml.to_xml()
    }

    /// Stores the edited document part in the package if it changed
    fn flush(&mut self) {
        let bytes = self.xml.to_bytes();
        if self.archive.get(DOCUMENT_PART) != Some(bytes.as_slice()) {
            debug!(part = DOCUMENT_PART, "document part modified");
            self.archive.set(DOCUMENT_PART, bytes);
        }
    }

    /// Write the package, with the edited document part, to any writer
    pub fn write_to<W: Write + Seek>(&mut self, writer: W) -> Result<()> {
        self.flush();
        self.archive.write_to(writer)
    }

    /// Save the package to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.flush();
        self.archive.write_to_file(path)
    }
}

impl ParagraphSource for WordDocument {
    type Paragraph<'a> = OoxmlParagraph<'a>;

    fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    fn paragraph_mut(&mut self, index: usize) -> Option<Self::Paragraph<'_>> {
        let path = self.paragraphs.get(index)?.clone();
        let element = self.body_mut()?.at_path_mut(&path)?;
        Some(OoxmlParagraph::new(element, Dialect::WordprocessingMl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_docx;
    use docrevise_core::{StyledParagraph, StyledRun};
    use std::io::Cursor;

    const BODY: &str = concat!(
        r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Rapport</w:t></w:r></w:p>"#,
        r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Cellule</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        r#"<w:p><w:r><w:t>Fin</w:t></w:r></w:p>"#,
        r#"<w:sectPr/>"#
    );

    #[test]
    fn test_paragraphs_include_tables() {
        let doc = WordDocument::from_reader(Cursor::new(create_docx(BODY))).unwrap();
        assert_eq!(doc.paragraph_count(), 3);
        assert_eq!(doc.texts(), ["Rapport", "Cellule", "Fin"]);
    }

    #[test]
    fn test_edit_and_save_roundtrip() {
        let mut doc = WordDocument::from_reader(Cursor::new(create_docx(BODY))).unwrap();
        {
            let mut p = doc.paragraph_mut(1).unwrap();
            p.replace_runs(&[StyledRun::plain("Cellule modifiée")]);
        }

        let mut buffer = Cursor::new(Vec::new());
        doc.write_to(&mut buffer).unwrap();
        buffer.set_position(0);

        let reopened = WordDocument::from_reader(buffer).unwrap();
        assert_eq!(reopened.texts(), ["Rapport", "Cellule modifiée", "Fin"]);
        assert!(reopened.archive().contains("word/styles.xml"));
    }

    #[test]
    fn test_untouched_document_part_is_identical() {
        let bytes = create_docx(BODY);
        let original = crate::test_utils::extract_file(&bytes, DOCUMENT_PART).unwrap();
        let doc = WordDocument::from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(doc.document_xml(), original);
    }

    #[test]
    fn test_rejects_non_word_package() {
        let mut archive = OoxmlArchive::default();
        archive.set_string(DOCUMENT_PART, "<w:document><w:nobody/></w:document>");
        let err = WordDocument::from_archive(archive).unwrap_err();
        assert!(matches!(err, OoxmlError::InvalidStructure(_)));

        let err = WordDocument::from_archive(OoxmlArchive::default()).unwrap_err();
        assert!(matches!(err, OoxmlError::MissingPart(_)));
    }
}
