//! Shared test fixtures for docrevise
//!
//! Builds small but valid `.docx` and `.pptx` packages in memory. Used by the
//! unit tests of this crate and by the presentation and CLI crates.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

use crate::archive::OoxmlArchive;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const P_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const WP_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const PIC_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

/// A 1x1 transparent PNG
pub const PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

fn write_parts(parts: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (name, contents) in parts {
        zip.start_file(name.as_str(), options).unwrap();
        zip.write_all(contents).unwrap();
    }

    zip.finish().unwrap();
    buffer.into_inner()
}

fn part(name: &str, contents: impl Into<Vec<u8>>) -> (String, Vec<u8>) {
    (name.to_string(), contents.into())
}

/// Create a `.docx` whose `w:body` holds `body_xml`
///
/// The package carries a styles part and an image part (`word/media/image1.png`,
/// relationship `rId7`) so drawings in `body_xml` can reference it.
///
/// # Example
/// ```ignore
/// use docrevise_ooxml::test_utils::create_docx;
/// let docx = create_docx("<w:p><w:r><w:t>Bonjour</w:t></w:r></w:p>");
/// ```
pub fn create_docx(body_xml: &str) -> Vec<u8> {
    let document = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<w:document xmlns:w="{}" xmlns:r="{}" xmlns:a="{}" xmlns:wp="{}" xmlns:pic="{}">"#,
            "<w:body>{}</w:body></w:document>"
        ),
        W_NS, R_NS, A_NS, WP_NS, PIC_NS, body_xml
    );

    write_parts(&[
        part(
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#,
        ),
        part(
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#,
        ),
        part(
            "word/_rels/document.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
</Relationships>"#,
        ),
        part("word/document.xml", document),
        part(
            "word/styles.xml",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
  <w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/></w:style>
</w:styles>"#,
        ),
        part("word/media/image1.png", PIXEL_PNG),
    ])
}

/// Inline picture run referencing `rel_id`
pub fn drawing_run(rel_id: &str) -> String {
    format!(
        concat!(
            "<w:r><w:drawing><wp:inline><a:graphic><a:graphicData>",
            r#"<pic:pic><pic:blipFill><a:blip r:embed="{}"/></pic:blipFill></pic:pic>"#,
            "</a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"
        ),
        rel_id
    )
}

/// Create a `.pptx` with one slide per entry of `slides`
///
/// Each entry is the inner XML of the slide's `p:spTree`. Slide parts are
/// named `ppt/slides/slideN.xml` and listed in order in `p:sldIdLst`.
pub fn create_pptx(slides: &[&str]) -> Vec<u8> {
    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#,
    );
    let mut sld_ids = String::new();
    let mut pres_rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    let mut slide_parts = Vec::new();

    for (i, tree) in slides.iter().enumerate() {
        let n = i + 1;
        content_types.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            n
        ));
        sld_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, 10 + n));
        pres_rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
            10 + n,
            n
        ));
        slide_parts.push(part(
            &format!("ppt/slides/slide{}.xml", n),
            format!(
                concat!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                    "\n",
                    r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
                    "<p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"
                ),
                A_NS, R_NS, P_NS, tree
            ),
        ));
    }
    content_types.push_str("</Types>");
    pres_rels.push_str("</Relationships>");

    let presentation = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            r#"<p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/>"#,
            "</p:presentation>"
        ),
        A_NS, R_NS, P_NS, sld_ids
    );

    let mut parts = vec![
        part("[Content_Types].xml", content_types),
        part(
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#,
        ),
        part("ppt/presentation.xml", presentation),
        part("ppt/_rels/presentation.xml.rels", pres_rels),
    ];
    parts.extend(slide_parts);
    write_parts(&parts)
}

/// Text shape for a slide tree; `placeholder` is the `p:ph` type, if any
pub fn text_shape(id: u32, placeholder: Option<&str>, paragraphs_xml: &str) -> String {
    let nv_pr = match placeholder {
        Some(kind) => format!(r#"<p:nvPr><p:ph type="{}"/></p:nvPr>"#, kind),
        None => "<p:nvPr/>".to_string(),
    };
    format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Shape {}"/><p:cNvSpPr/>{}</p:nvSpPr>"#,
            "<p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody></p:sp>"
        ),
        id, id, nv_pr, paragraphs_xml
    )
}

/// Extract a file from a package as a string
pub fn extract_file(package: &[u8], path: &str) -> Option<String> {
    let cursor = Cursor::new(package);
    let archive = OoxmlArchive::from_reader(cursor).unwrap();
    archive.get_string(path)
}
