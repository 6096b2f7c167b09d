//! WordprocessingML runs (`w:r`)
//!
//! Reads and writes run formatting (`w:rPr`) and run text. Only direct
//! `w:r` children of a paragraph outside complex fields take part in the
//! run model; hyperlinks, simple fields and field-code runs are left alone.

use docrevise_core::{FontSize, RgbColor, StyleAttributes, StyledRun, Underline};

use crate::xml::{XmlElement, XmlNode};

/// Schema order of the `w:rPr` children written or touched here
#[rustfmt::skip]
pub const RPR_ORDER: &[&str] = &[
    "w:rStyle", "w:rFonts", "w:b", "w:bCs", "w:i", "w:iCs", "w:caps", "w:smallCaps", "w:strike",
    "w:dstrike", "w:outline", "w:shadow", "w:emboss", "w:imprint", "w:noProof", "w:snapToGrid",
    "w:vanish", "w:webHidden", "w:color", "w:spacing", "w:w", "w:kern", "w:position", "w:sz",
    "w:szCs", "w:highlight", "w:u", "w:effect", "w:bdr", "w:shd", "w:fitText", "w:vertAlign",
    "w:rtl", "w:cs", "w:em", "w:lang", "w:eastAsianLayout", "w:specVanish", "w:oMath",
];

/// Whether a run child is part of the run text
///
/// Page and column breaks are layout, not text: they are never read as
/// `\n` and survive a rewrite like any other non-text content.
fn is_text_child(element: &XmlElement) -> bool {
    match element.name.as_str() {
        "w:t" | "w:tab" | "w:cr" => true,
        "w:br" => matches!(element.attr("w:type"), None | Some("textWrapping")),
        _ => false,
    }
}

/// Reads a `w:val` on/off toggle (`<w:b/>`, `<w:b w:val="0"/>`)
fn toggle(element: &XmlElement) -> bool {
    !matches!(element.attr("w:val"), Some("0" | "false" | "off" | "none"))
}

/// Formatting of a run from its `w:rPr`
pub fn read_properties(rpr: Option<&XmlElement>) -> StyleAttributes {
    let Some(rpr) = rpr else {
        return StyleAttributes::plain();
    };

    StyleAttributes {
        bold: rpr.child("w:b").map(toggle),
        italic: rpr.child("w:i").map(toggle),
        underline: rpr
            .child("w:u")
            .and_then(|u| u.attr("w:val"))
            .map(Underline::from_wordml),
        font_family: rpr
            .child("w:rFonts")
            .and_then(|f| f.attr("w:ascii").or_else(|| f.attr("w:hAnsi")))
            .map(str::to_string),
        font_size: rpr
            .child("w:sz")
            .and_then(|s| s.attr("w:val"))
            .and_then(|v| v.parse().ok())
            .map(FontSize::from_half_points),
        color: rpr
            .child("w:color")
            .and_then(|c| c.attr("w:val"))
            .and_then(RgbColor::from_hex),
    }
}

/// `w:rPr` for the given formatting, `None` when nothing is set
pub fn write_properties(attributes: &StyleAttributes) -> Option<XmlElement> {
    if attributes.is_plain() {
        return None;
    }

    let flag = |name: &str, on: bool| {
        let element = XmlElement::new(name);
        if on {
            element
        } else {
            element.with_attr("w:val", "0")
        }
    };

    let mut rpr = XmlElement::new("w:rPr");
    if let Some(family) = &attributes.font_family {
        rpr = rpr.with_child(fonts_element(family));
    }
    if let Some(bold) = attributes.bold {
        rpr = rpr.with_child(flag("w:b", bold));
    }
    if let Some(italic) = attributes.italic {
        rpr = rpr.with_child(flag("w:i", italic));
    }
    if let Some(color) = attributes.color {
        rpr = rpr.with_child(valued("w:color", color.to_hex()));
    }
    if let Some(size) = attributes.font_size {
        let half_points = size.half_points().to_string();
        rpr = rpr
            .with_child(valued("w:sz", half_points.clone()))
            .with_child(valued("w:szCs", half_points));
    }
    if let Some(underline) = &attributes.underline {
        rpr = rpr.with_child(valued("w:u", underline.to_wordml()));
    }
    Some(rpr)
}

/// `<name w:val="value"/>`
fn valued(name: &str, value: impl Into<String>) -> XmlElement {
    XmlElement::new(name).with_attr("w:val", value)
}

fn fonts_element(family: &str) -> XmlElement {
    XmlElement::new("w:rFonts")
        .with_attr("w:ascii", family)
        .with_attr("w:hAnsi", family)
        .with_attr("w:cs", family)
}

/// Visible text of a run: `w:t` content, tabs and breaks
pub fn run_text(run: &XmlElement) -> String {
    let mut text = String::new();
    for child in run.elements().filter(|e| is_text_child(e)) {
        match child.name.as_str() {
            "w:t" => text.push_str(&child.text()),
            "w:tab" => text.push('\t'),
            _ => text.push('\n'),
        }
    }
    text
}

/// Text and style of a `w:r`
pub fn read_run(run: &XmlElement) -> StyledRun {
    StyledRun::new(run_text(run), read_properties(run.child("w:rPr")))
}

/// Whether the run has text children
pub fn has_text(run: &XmlElement) -> bool {
    run.elements().any(is_text_child)
}

/// Whether the run holds anything besides formatting and text
pub fn has_other_content(run: &XmlElement) -> bool {
    run.elements().any(|e| e.name != "w:rPr" && !is_text_child(e))
}

/// Removes text children, keeping formatting and other content
pub fn strip_text(run: &mut XmlElement) {
    run.children
        .retain(|n| !matches!(n, XmlNode::Element(e) if is_text_child(e)));
}

/// Builds a `w:r` for a styled run; tabs become `w:tab`, newlines `w:br`
pub fn build_run(run: &StyledRun) -> XmlElement {
    let mut element = XmlElement::new("w:r");
    if let Some(rpr) = write_properties(&run.attributes) {
        element = element.with_child(rpr);
    }

    let mut pending = String::new();
    let flush = |element: &mut XmlElement, pending: &mut String| {
        if !pending.is_empty() {
            let t = XmlElement::new("w:t")
                .with_attr("xml:space", "preserve")
                .with_text(std::mem::take(pending));
            element.children.push(XmlNode::Element(t));
        }
    };
    for c in run.text.chars() {
        match c {
            '\t' => {
                flush(&mut element, &mut pending);
                element.children.push(XmlNode::Element(XmlElement::new("w:tab")));
            }
            '\n' => {
                flush(&mut element, &mut pending);
                element.children.push(XmlNode::Element(XmlElement::new("w:br")));
            }
            other => pending.push(other),
        }
    }
    flush(&mut element, &mut pending);
    element
}

/// Indices into `paragraph.children` of the runs in the run model
pub fn model_runs(paragraph: &XmlElement) -> Vec<usize> {
    let mut out = Vec::new();
    let mut field_depth = 0usize;

    for (i, node) in paragraph.children.iter().enumerate() {
        let XmlNode::Element(run) = node else { continue };
        if !run.is("w:r") {
            continue;
        }

        let mut in_field = field_depth > 0 || run.has_child("w:instrText");
        for fld in run.elements().filter(|e| e.is("w:fldChar")) {
            in_field = true;
            match fld.attr("w:fldCharType") {
                Some("begin") => field_depth += 1,
                Some("end") => field_depth = field_depth.saturating_sub(1),
                _ => {}
            }
        }
        if !in_field {
            out.push(i);
        }
    }
    out
}

/// Rewrites the paragraph's model runs with `runs`
///
/// Text-only runs are removed. Runs with other content (drawings, footnote
/// references) keep it and lose only their text. The new runs take the
/// place of the first text-bearing run, or go at the end of the paragraph.
pub fn replace_runs(paragraph: &mut XmlElement, runs: &[StyledRun]) {
    let model = model_runs(paragraph);
    let text_runs: Vec<usize> = model
        .into_iter()
        .filter(|&i| matches!(&paragraph.children[i], XmlNode::Element(r) if has_text(r)))
        .collect();
    let anchor = text_runs.first().copied();

    let old = std::mem::take(&mut paragraph.children);
    let mut fresh: Vec<XmlNode> = runs
        .iter()
        .map(|r| XmlNode::Element(build_run(r)))
        .collect();
    let mut children = Vec::with_capacity(old.len() + fresh.len());

    for (i, mut node) in old.into_iter().enumerate() {
        if Some(i) == anchor {
            children.append(&mut fresh);
        }
        if text_runs.contains(&i) {
            if let XmlNode::Element(run) = &mut node {
                if !has_other_content(run) {
                    continue;
                }
                strip_text(run);
            }
        }
        children.push(node);
    }
    children.append(&mut fresh);
    paragraph.children = children;
}

/// Sets the font family and/or size of one model run
pub fn restyle_run(
    paragraph: &mut XmlElement,
    index: usize,
    font_family: Option<&str>,
    font_size: Option<FontSize>,
) {
    let Some(&child) = model_runs(paragraph).get(index) else {
        return;
    };
    let Some(run) = paragraph.children[child].as_element_mut() else {
        return;
    };

    if !run.has_child("w:rPr") {
        run.children.insert(0, XmlNode::Element(XmlElement::new("w:rPr")));
    }
    let Some(rpr) = run.child_mut("w:rPr") else {
        return;
    };

    if let Some(family) = font_family {
        match rpr.child_mut("w:rFonts") {
            Some(fonts) => {
                fonts.set_attr("w:ascii", family);
                fonts.set_attr("w:hAnsi", family);
                fonts.set_attr("w:cs", family);
                fonts.remove_attr("w:asciiTheme");
                fonts.remove_attr("w:hAnsiTheme");
                fonts.remove_attr("w:cstheme");
            }
            None => rpr.insert_ordered(fonts_element(family), RPR_ORDER),
        }
    }
    if let Some(size) = font_size {
        let half_points = size.half_points().to_string();
        rpr.upsert_ordered(valued("w:sz", half_points.clone()), RPR_ORDER);
        rpr.upsert_ordered(valued("w:szCs", half_points), RPR_ORDER);
    }
}

/// Paragraph style ID (`w:pPr/w:pStyle/@w:val`)
pub fn paragraph_style(paragraph: &XmlElement) -> Option<&str> {
    paragraph
        .child("w:pPr")
        .and_then(|ppr| ppr.child("w:pStyle"))
        .and_then(|s| s.attr("w:val"))
}

/// Whether the paragraph uses a heading or title style
pub fn is_heading(paragraph: &XmlElement) -> bool {
    paragraph_style(paragraph)
        .map(|style| style.starts_with("Heading") || style == "Title")
        .unwrap_or(false)
}
