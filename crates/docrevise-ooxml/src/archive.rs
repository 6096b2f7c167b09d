//! Archive handling for DOCX/PPTX packages
//!
//! Office packages are ZIP archives of XML parts and resources. Parts are
//! kept as raw bytes in their original entry order; only the parts a caller
//! replaces are rewritten on save.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use tracing::debug;
use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::error::{OoxmlError, Result};

/// Main part of a word-processing package
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Main part of a presentation package
pub const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Kind of Office package, detected from its main part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    /// `.docx`
    Word,
    /// `.pptx`
    Presentation,
}

/// One entry of the package
#[derive(Debug, Clone)]
struct Part {
    name: String,
    contents: Vec<u8>,
    /// Compression used when the entry was read; new parts are deflated
    method: CompressionMethod,
}

/// An unpacked OOXML package, parts kept as raw bytes in entry order
#[derive(Debug, Default)]
pub struct OoxmlArchive {
    parts: Vec<Part>,
    index: HashMap<String, usize>,
}

impl OoxmlArchive {
    /// Open and unpack a package file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;
        let mut archive = Self::default();

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let method = entry.compression();
            let mut contents = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut contents)?;
            archive.insert(name, contents, method);
        }

        debug!(parts = archive.parts.len(), kind = ?archive.kind(), "package unpacked");
        Ok(archive)
    }

    fn insert(&mut self, name: String, contents: Vec<u8>, method: CompressionMethod) {
        match self.index.get(&name) {
            Some(&i) => self.parts[i].contents = contents,
            None => {
                self.index.insert(name.clone(), self.parts.len());
                self.parts.push(Part {
                    name,
                    contents,
                    method,
                });
            }
        }
    }

    /// Package kind, from the main part present
    pub fn kind(&self) -> Option<PackageKind> {
        if self.contains(DOCUMENT_PART) {
            Some(PackageKind::Word)
        } else if self.contains(PRESENTATION_PART) {
            Some(PackageKind::Presentation)
        } else {
            None
        }
    }

    /// Contents of a part
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.index
            .get(path)
            .map(|&i| self.parts[i].contents.as_slice())
    }

    /// Contents of a part, failing if it is absent
    pub fn part(&self, path: &str) -> Result<&[u8]> {
        self.get(path).ok_or_else(|| OoxmlError::missing_part(path))
    }

    /// Contents of a part as text
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// `word/document.xml`
    pub fn document_xml(&self) -> Result<&[u8]> {
        self.part(DOCUMENT_PART)
    }

    /// `ppt/presentation.xml`
    pub fn presentation_xml(&self) -> Result<&[u8]> {
        self.part(PRESENTATION_PART)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Part names in entry order
    pub fn file_list(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Replace a part's contents, or append a new part
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.insert(path.into(), contents, CompressionMethod::Deflated);
    }

    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.set(path, contents.into().into_bytes());
    }

    /// Remove a part from the package
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        let i = self.index.remove(path)?;
        let part = self.parts.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(part.contents)
    }

    /// Write the package to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Write the package to any writer, each entry with its original compression
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        for part in &self.parts {
            let options = SimpleFileOptions::default().compression_method(part.method);
            zip.start_file(part.name.as_str(), options)?;
            zip.write_all(&part.contents)?;
        }
        zip.finish()?;
        Ok(())
    }
}
