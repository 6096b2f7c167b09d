//! Embedded media markers
//!
//! Word paragraphs embed pictures, VML shapes and OLE objects through run
//! content:
//!
//! ```xml
//! <w:r>
//!   <w:drawing>
//!     <wp:inline>
//!       <a:graphic><a:graphicData><pic:pic>
//!         <pic:blipFill><a:blip r:embed="rId11"/></pic:blipFill>
//!       </pic:pic></a:graphicData></a:graphic>
//!     </wp:inline>
//!   </w:drawing>
//! </w:r>
//! ```
//!
//! Each outermost `w:drawing`, `w:pict` or `w:object` counts as one object.
//! Slide paragraphs only carry media as picture bullets (`a:buBlip/a:blip`).

use crate::paragraph::Dialect;
use crate::xml::XmlElement;

/// Kind of embedded object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// DrawingML picture or chart (`w:drawing`)
    Drawing,
    /// Legacy VML (`w:pict`)
    Vml,
    /// Embedded OLE object (`w:object`)
    Object,
    /// DrawingML image reference (`a:blip`)
    Blip,
}

impl MediaKind {
    /// Marker kind of an element in the given dialect
    pub fn of(element: &XmlElement, dialect: Dialect) -> Option<Self> {
        match (dialect, element.name.as_str()) {
            (Dialect::WordprocessingMl, "w:drawing") => Some(Self::Drawing),
            (Dialect::WordprocessingMl, "w:pict") => Some(Self::Vml),
            (Dialect::WordprocessingMl, "w:object") => Some(Self::Object),
            (Dialect::DrawingMl, "a:blip") => Some(Self::Blip),
            _ => None,
        }
    }
}

/// One embedded object found in a paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    /// Marker kind
    pub kind: MediaKind,
    /// Relationship ID of the image data, when referenced
    pub rel_id: Option<String>,
}

/// Number of outermost media markers below `element`
pub fn count_media(element: &XmlElement, dialect: Dialect) -> usize {
    element.count_outermost(&|e: &XmlElement| MediaKind::of(e, dialect).is_some())
}

/// Media markers below `element`, in document order
pub fn media_refs(element: &XmlElement, dialect: Dialect) -> Vec<MediaRef> {
    let mut out = Vec::new();
    collect_refs(element, dialect, &mut out);
    out
}

fn collect_refs(element: &XmlElement, dialect: Dialect, out: &mut Vec<MediaRef>) {
    for child in element.elements() {
        match MediaKind::of(child, dialect) {
            Some(kind) => out.push(MediaRef {
                kind,
                rel_id: first_embed(child),
            }),
            None => collect_refs(child, dialect, out),
        }
    }
}

/// First `r:embed` or `r:id` attribute at or below `element`
fn first_embed(element: &XmlElement) -> Option<String> {
    if let Some(id) = element.attr("r:embed").or_else(|| element.attr("r:id")) {
        return Some(id.to_string());
    }
    element.elements().find_map(first_embed)
}
