//! Presentation packages (`.pptx`)
//!
//! Slides are discovered in presentation order from `p:sldIdLst`, resolved
//! through the presentation's relationships part. Paragraph indices run
//! across all slides: the first paragraph of slide 2 follows the last
//! paragraph of slide 1.

use std::io::{Read, Seek, Write};
use std::path::Path;

use docrevise_core::ParagraphSource;
use docrevise_ooxml::{
    rels_path_for, resolve_target, OoxmlArchive, OoxmlParagraph, Relationships, XmlDocument,
    PRESENTATION_PART, SLIDE_RELATIONSHIP,
};
use tracing::debug;

use crate::error::{PptxError, Result};
use crate::slide::Slide;

/// An opened `.pptx` package
#[derive(Debug)]
pub struct Presentation {
    archive: OoxmlArchive,
    slides: Vec<Slide>,
}

impl Presentation {
    /// Open a `.pptx` file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_archive(OoxmlArchive::open(path)?)
    }

    /// Read a `.pptx` package from any reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_archive(OoxmlArchive::from_reader(reader)?)
    }

    /// Wrap an unpacked package
    pub fn from_archive(archive: OoxmlArchive) -> Result<Self> {
        let presentation = XmlDocument::parse(archive.presentation_xml()?)?;
        if !presentation.root.is("p:presentation") {
            return Err(PptxError::invalid_presentation(format!(
                "expected p:presentation root, found {}",
                presentation.root.name
            )));
        }

        let rels = match archive.get(&rels_path_for(PRESENTATION_PART)) {
            Some(bytes) => Relationships::parse(bytes)?,
            None => Relationships::default(),
        };

        let mut slides = Vec::new();
        let slide_ids = presentation
            .root
            .child("p:sldIdLst")
            .into_iter()
            .flat_map(|list| list.elements())
            .filter(|e| e.is("p:sldId"));
        for slide_id in slide_ids {
            let rel_id = slide_id
                .attr("r:id")
                .ok_or_else(|| PptxError::invalid_presentation("p:sldId without r:id"))?;
            let rel = rels
                .relationship(rel_id)
                .ok_or_else(|| PptxError::unresolved_slide(rel_id))?;
            if rel.rel_type != SLIDE_RELATIONSHIP || rel.external {
                return Err(PptxError::invalid_presentation(format!(
                    "{} does not reference a slide part",
                    rel_id
                )));
            }
            let part = resolve_target(PRESENTATION_PART, &rel.target);
            let bytes = archive
                .get(&part)
                .ok_or_else(|| PptxError::missing_slide(part.as_str()))?;
            let slide = Slide::parse(part.as_str(), bytes)?;
            debug!(
                part = %part,
                paragraphs = slide.paragraph_count(),
                "parsed slide"
            );
            slides.push(slide);
        }

        Ok(Self { archive, slides })
    }

    /// Slides in presentation order
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// The underlying package
    pub fn archive(&self) -> &OoxmlArchive {
        &self.archive
    }

    /// Plain text of every paragraph across all slides
    pub fn texts(&self) -> Vec<String> {
        self.slides.iter().flat_map(Slide::texts).collect()
    }

    /// Slide number (1-based) and local index of a global paragraph index
    pub fn locate(&self, index: usize) -> Option<(usize, usize)> {
        let mut remaining = index;
        for (n, slide) in self.slides.iter().enumerate() {
            if remaining < slide.paragraph_count() {
                return Some((n + 1, remaining));
            }
            remaining -= slide.paragraph_count();
        }
        None
    }

    /// Stores edited slide parts in the package
    fn flush(&mut self) {
        for slide in &self.slides {
            let bytes = slide.to_bytes();
            if self.archive.get(slide.part()) != Some(bytes.as_slice()) {
                debug!(part = slide.part(), "slide part modified");
                self.archive.set(slide.part(), bytes);
            }
        }
    }

    /// Write the package, with edited slides, to any writer
    pub fn write_to<W: Write + Seek>(&mut self, writer: W) -> Result<()> {
        self.flush();
        Ok(self.archive.write_to(writer)?)
    }

    /// Save the package to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.flush();
        Ok(self.archive.write_to_file(path)?)
    }
}

impl ParagraphSource for Presentation {
    type Paragraph<'a> = OoxmlParagraph<'a>;

    fn paragraph_count(&self) -> usize {
        self.slides.iter().map(Slide::paragraph_count).sum()
    }

    fn paragraph_mut(&mut self, index: usize) -> Option<Self::Paragraph<'_>> {
        let (number, local) = self.locate(index)?;
        self.slides.get_mut(number - 1)?.paragraph_mut(local)
    }
}
