//! DrawingML text runs (`a:r`, `a:br`)
//!
//! Slide paragraphs hold `a:r` runs and `a:br` line breaks; both take part in
//! the run model. `a:fld` (slide numbers, dates) is preserved as is and
//! `a:endParaRPr` always stays the last child.
//!
//! Hyperlinks live in the run properties (`a:hlinkClick`), so they are not
//! part of the style model. A rewrite puts them back on the stretch of new
//! text that still reads like the linked text.

use docrevise_core::{FontSize, RgbColor, StyleAttributes, StyledRun, Underline};

use crate::xml::{XmlElement, XmlNode};

/// Schema order of the `a:rPr` children
#[rustfmt::skip]
pub const RPR_ORDER: &[&str] = &[
    "a:ln", "a:noFill", "a:solidFill", "a:gradFill", "a:blipFill", "a:pattFill", "a:grpFill",
    "a:effectLst", "a:effectDag", "a:highlight", "a:uLnTx", "a:uLn", "a:uFillTx", "a:uFill",
    "a:latin", "a:ea", "a:cs", "a:sym", "a:hlinkClick", "a:hlinkMouseOver", "a:rtl", "a:extLst",
];

fn flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Formatting of a run from its `a:rPr`
pub fn read_properties(rpr: Option<&XmlElement>) -> StyleAttributes {
    let Some(rpr) = rpr else {
        return StyleAttributes::plain();
    };

    StyleAttributes {
        bold: rpr.attr("b").and_then(flag),
        italic: rpr.attr("i").and_then(flag),
        underline: rpr.attr("u").map(Underline::from_drawingml),
        // "+mn-lt" and friends point at theme fonts
        font_family: rpr
            .child("a:latin")
            .and_then(|l| l.attr("typeface"))
            .filter(|t| !t.starts_with('+'))
            .map(str::to_string),
        font_size: rpr
            .attr("sz")
            .and_then(|v| v.parse().ok())
            .map(FontSize::from_hundredths),
        color: rpr
            .child("a:solidFill")
            .and_then(|f| f.child("a:srgbClr"))
            .and_then(|c| c.attr("val"))
            .and_then(RgbColor::from_hex),
    }
}

/// `a:rPr` for the given formatting, `None` when nothing is set
pub fn write_properties(attributes: &StyleAttributes) -> Option<XmlElement> {
    if attributes.is_plain() {
        return None;
    }

    let bit = |on: bool| if on { "1" } else { "0" };
    let mut rpr = XmlElement::new("a:rPr");
    if let Some(size) = attributes.font_size {
        rpr.set_attr("sz", size.hundredths().to_string());
    }
    if let Some(bold) = attributes.bold {
        rpr.set_attr("b", bit(bold));
    }
    if let Some(italic) = attributes.italic {
        rpr.set_attr("i", bit(italic));
    }
    if let Some(underline) = &attributes.underline {
        rpr.set_attr("u", underline.to_drawingml());
    }
    if let Some(color) = attributes.color {
        rpr = rpr.with_child(solid_fill(color));
    }
    if let Some(family) = &attributes.font_family {
        rpr = rpr.with_child(latin(family));
    }
    Some(rpr)
}

fn solid_fill(color: RgbColor) -> XmlElement {
    let hex = color.to_hex();
    let srgb = XmlElement::new("a:srgbClr").with_attr("val", hex);
    XmlElement::new("a:solidFill").with_child(srgb)
}

fn latin(typeface: &str) -> XmlElement {
    XmlElement::new("a:latin").with_attr("typeface", typeface)
}

/// Whether the element takes part in the run model
pub fn is_model_run(element: &XmlElement) -> bool {
    element.is("a:r") || element.is("a:br")
}

/// Indices into `paragraph.children` of the runs in the run model
pub fn model_runs(paragraph: &XmlElement) -> Vec<usize> {
    paragraph
        .children
        .iter()
        .enumerate()
        .filter(|(_, n)| matches!(n, XmlNode::Element(e) if is_model_run(e)))
        .map(|(i, _)| i)
        .collect()
}

/// Text and formatting of a model run
pub fn read_run(element: &XmlElement) -> StyledRun {
    let attributes = read_properties(element.child("a:rPr"));
    if element.is("a:br") {
        return StyledRun::new("\n", attributes);
    }
    let text = element
        .child("a:t")
        .map(XmlElement::text)
        .unwrap_or_default();
    StyledRun::new(text, attributes)
}

/// Builds `a:r`/`a:br` elements for a styled run; newlines become `a:br`
pub fn build_runs(run: &StyledRun) -> Vec<XmlElement> {
    let rpr = write_properties(&run.attributes);
    let with_rpr = |name: &str| {
        let element = XmlElement::new(name);
        match &rpr {
            Some(rpr) => element.with_child(rpr.clone()),
            None => element,
        }
    };

    let mut out = Vec::new();
    for (i, line) in run.text.split('\n').enumerate() {
        if i > 0 {
            out.push(with_rpr("a:br"));
        }
        if !line.is_empty() {
            let text = XmlElement::new("a:t").with_text(line);
            out.push(with_rpr("a:r").with_child(text));
        }
    }
    out
}

/// A hyperlinked run of the paragraph before rewriting
struct Link {
    start: usize,
    text: Vec<char>,
    actions: Vec<XmlElement>,
}

/// `a:hlinkClick`/`a:hlinkMouseOver` of a run
fn link_actions(run: &XmlElement) -> Vec<XmlElement> {
    run.child("a:rPr")
        .map(|rpr| {
            rpr.elements()
                .filter(|e| e.is("a:hlinkClick") || e.is("a:hlinkMouseOver"))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// `lang`/`altLang` of a run
fn language_tags(run: &XmlElement) -> Vec<(String, String)> {
    run.child("a:rPr")
        .map(|rpr| {
            rpr.attributes
                .iter()
                .filter(|(k, _)| k == "lang" || k == "altLang")
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// Places each old link on the new text as `(start, end, link index)`
///
/// A link lands on the occurrence of its exact text nearest to its old
/// offset. A link whose text was rewritten has no occurrence and is dropped.
fn locate_links(links: &[Link], text: &[char]) -> Vec<(usize, usize, usize)> {
    let mut placed: Vec<(usize, usize, usize)> = Vec::new();
    for (index, link) in links.iter().enumerate() {
        let len = link.text.len();
        if len == 0 || len > text.len() {
            continue;
        }
        let nearest = (0..=text.len() - len)
            .filter(|&s| text[s..s + len] == link.text[..])
            .filter(|&s| placed.iter().all(|&(ps, pe, _)| s + len <= ps || s >= pe))
            .min_by_key(|&s| s.abs_diff(link.start));
        if let Some(start) = nearest {
            placed.push((start, start + len, index));
        }
    }
    placed.sort_unstable();
    placed
}

/// Cuts `runs` at the link boundaries, pairing each piece with its link
fn split_at_links(
    runs: &[StyledRun],
    placed: &[(usize, usize, usize)],
) -> Vec<(StyledRun, Option<usize>)> {
    let mut pieces = Vec::new();
    let mut offset = 0;
    for run in runs {
        let chars: Vec<char> = run.text.chars().collect();
        let end = offset + chars.len();
        let mut cuts = vec![offset, end];
        for &(start, stop, _) in placed {
            cuts.extend([start, stop].into_iter().filter(|&b| b > offset && b < end));
        }
        cuts.sort_unstable();
        cuts.dedup();

        for window in cuts.windows(2) {
            let (from, to) = (window[0], window[1]);
            let text: String = chars[from - offset..to - offset].iter().collect();
            let link = placed
                .iter()
                .find(|&&(start, stop, _)| from >= start && to <= stop)
                .map(|&(_, _, index)| index);
            pieces.push((StyledRun::new(text, run.attributes.clone()), link));
        }
        offset = end;
    }
    pieces
}

/// Puts language tags and link actions on a freshly built run
fn carry_properties(
    element: &mut XmlElement,
    language: &[(String, String)],
    actions: &[XmlElement],
) {
    let actions = if element.is("a:r") { actions } else { &[] };
    if language.is_empty() && actions.is_empty() {
        return;
    }
    if !element.has_child("a:rPr") {
        element.children.insert(0, XmlNode::Element(XmlElement::new("a:rPr")));
    }
    let Some(rpr) = element.child_mut("a:rPr") else {
        return;
    };
    let missing: Vec<(String, String)> = language
        .iter()
        .filter(|(k, _)| rpr.attr(k).is_none())
        .cloned()
        .collect();
    rpr.attributes.splice(0..0, missing);
    for action in actions {
        rpr.upsert_ordered(action.clone(), RPR_ORDER);
    }
}

/// Rewrites the paragraph's `a:r`/`a:br` children with `runs`
///
/// New runs take the place of the first old run, or go before the
/// end-of-paragraph properties. They keep the language of the first old
/// run that has one, and hyperlinked text that survives the rewrite keeps
/// its link.
pub fn replace_runs(paragraph: &mut XmlElement, runs: &[StyledRun]) {
    let indices = model_runs(paragraph);
    let anchor = indices.first().copied();

    let mut language = Vec::new();
    let mut links = Vec::new();
    let mut offset = 0;
    for element in indices
        .iter()
        .filter_map(|&i| paragraph.children[i].as_element())
    {
        let text = read_run(element).text;
        if element.is("a:r") {
            if language.is_empty() {
                language = language_tags(element);
            }
            let actions = link_actions(element);
            if !actions.is_empty() {
                links.push(Link {
                    start: offset,
                    text: text.chars().collect(),
                    actions,
                });
            }
        }
        offset += text.chars().count();
    }

    let new_text: Vec<char> = runs.iter().flat_map(|r| r.text.chars()).collect();
    let placed = locate_links(&links, &new_text);
    let mut fresh = Vec::new();
    for (run, link) in split_at_links(runs, &placed) {
        let actions: &[XmlElement] = match link {
            Some(index) => &links[index].actions,
            None => &[],
        };
        for mut element in build_runs(&run) {
            carry_properties(&mut element, &language, actions);
            fresh.push(XmlNode::Element(element));
        }
    }

    let old = std::mem::take(&mut paragraph.children);
    let mut children = Vec::with_capacity(old.len() + fresh.len());
    for (i, node) in old.into_iter().enumerate() {
        if Some(i) == anchor {
            children.append(&mut fresh);
        }
        let (is_run, is_end) = match &node {
            XmlNode::Element(e) => (is_model_run(e), e.is("a:endParaRPr")),
            _ => (false, false),
        };
        if is_run {
            continue;
        }
        if is_end {
            children.append(&mut fresh);
        }
        children.push(node);
    }
    children.append(&mut fresh);
    paragraph.children = children;
    keep_end_properties_last(paragraph);
}

fn keep_end_properties_last(paragraph: &mut XmlElement) {
    let Some(pos) = paragraph
        .children
        .iter()
        .position(|n| matches!(n, XmlNode::Element(e) if e.is("a:endParaRPr")))
    else {
        return;
    };
    let last_element = paragraph
        .children
        .iter()
        .rposition(|n| matches!(n, XmlNode::Element(_)));
    if last_element != Some(pos) {
        let end = paragraph.children.remove(pos);
        paragraph.children.push(end);
    }
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

    if !run.has_child("a:rPr") {
        run.children.insert(0, XmlNode::Element(XmlElement::new("a:rPr")));
    }
    let Some(rpr) = run.child_mut("a:rPr") else {
        return;
    };
    if let Some(family) = font_family {
        rpr.upsert_ordered(latin(family), RPR_ORDER);
    }
    if let Some(size) = font_size {
        rpr.set_attr("sz", size.hundredths().to_string());
    }
}
