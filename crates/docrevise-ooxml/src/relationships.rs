//! Relationship parts (`_rels/*.rels`)
//!
//! A presentation lists its slides as `r:id` references; the relationships
//! part next to `presentation.xml` turns those IDs into slide part paths.

use crate::error::{OoxmlError, Result};
use crate::xml::XmlDocument;

/// Relationship type of a slide referenced from the presentation part
pub const SLIDE_RELATIONSHIP: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

/// One `Relationship` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    /// `TargetMode="External"` (URLs, linked files)
    pub external: bool,
}

/// The entries of one `.rels` part, in document order
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Parse a `.rels` part; entries without `Id` or `Target` are ignored
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let document = XmlDocument::parse(xml)?;
        if document.root.local_name() != "Relationships" {
            return Err(OoxmlError::InvalidStructure(format!(
                "expected Relationships root, found {}",
                document.root.name
            )));
        }

        let entries = document
            .root
            .elements()
            .filter(|e| e.local_name() == "Relationship")
            .filter_map(|e| {
                Some(Relationship {
                    id: e.attr("Id")?.to_string(),
                    rel_type: e.attr("Type").unwrap_or_default().to_string(),
                    target: e.attr("Target")?.to_string(),
                    external: e.attr("TargetMode") == Some("External"),
                })
            })
            .collect();
        Ok(Self { entries })
    }

    /// Target of relationship `id`
    pub fn get(&self, id: &str) -> Option<&str> {
        self.relationship(id).map(|r| r.target.as_str())
    }

    /// Full entry for `id`
    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Path of the relationships part for `part`
/// (`ppt/presentation.xml` -> `ppt/_rels/presentation.xml.rels`)
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolves a relative relationship target against the part that owns it
/// (`ppt/presentation.xml` + `slides/slide1.xml` -> `ppt/slides/slide1.xml`)
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
