//! Editable XML element tree
//!
//! Parts are parsed into a lossless tree: the XML declaration, comments,
//! processing instructions, CDATA and whitespace-only text survive a
//! parse/serialize cycle unchanged. Element and attribute names keep their
//! prefixes (`w:p`, `a:rPr`) and are matched as written.
//!
//! Text is stored unescaped and escaped again on output, so character
//! references such as `&#x2019;` come back as the literal character.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};

/// A node in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Nested element
    Element(XmlElement),
    /// Character data (unescaped)
    Text(String),
    /// CDATA section content
    CData(String),
    /// Comment content, as written
    Comment(String),
    /// Processing instruction content, as written
    ProcessingInstruction(String),
    /// Document type declaration, as written
    DocType(String),
}

impl XmlNode {
    /// The element, if this node is one
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }

    /// The element, if this node is one
    pub fn as_element_mut(&mut self) -> Option<&mut XmlElement> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// An element with ordered attributes and children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified name, e.g. `w:r`
    pub name: String,
    /// Attributes in document order, values unescaped
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: add an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder: append a child element
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder: append a text node
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Whether the qualified name matches
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Name without prefix
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Attribute value by qualified name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace an attribute, keeping its position if it exists
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Remove an attribute
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(pos).1)
    }

    /// Child elements
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Child elements, mutable
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(XmlNode::as_element_mut)
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.is(name))
    }

    /// First child element with the given name, mutable
    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.is(name))
    }

    /// Whether a direct child element with the given name exists
    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Concatenated direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                XmlNode::Text(t) | XmlNode::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Counts descendant elements matching `pred`, not descending into
    /// matches
    pub fn count_outermost<F>(&self, pred: &F) -> usize
    where
        F: Fn(&XmlElement) -> bool,
    {
        self.elements()
            .map(|e| if pred(e) { 1 } else { e.count_outermost(pred) })
            .sum()
    }

    /// Whether any descendant element matches `pred`
    pub fn contains_descendant<F>(&self, pred: &F) -> bool
    where
        F: Fn(&XmlElement) -> bool,
    {
        self.elements()
            .any(|e| pred(e) || e.contains_descendant(pred))
    }

    /// Child-index paths of descendant elements named `name`, in document
    /// order, not descending into matches
    pub fn outermost_paths(&self, name: &str) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        self.collect_paths(name, &mut path, &mut out);
        out
    }

    fn collect_paths(&self, name: &str, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        for (i, node) in self.children.iter().enumerate() {
            if let XmlNode::Element(e) = node {
                path.push(i);
                if e.is(name) {
                    out.push(path.clone());
                } else {
                    e.collect_paths(name, path, out);
                }
                path.pop();
            }
        }
    }

    /// Element at a child-index path relative to this element
    pub fn at_path(&self, path: &[usize]) -> Option<&XmlElement> {
        path.iter()
            .try_fold(self, |el, &i| el.children.get(i)?.as_element())
    }

    /// Element at a child-index path relative to this element, mutable
    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut XmlElement> {
        let mut el = self;
        for &i in path {
            el = el.children.get_mut(i)?.as_element_mut()?;
        }
        Some(el)
    }

    /// Inserts `child` before the first existing child ranked after it in
    /// `order`; unknown names rank last
    pub fn insert_ordered(&mut self, child: XmlElement, order: &[&str]) {
        let rank = |name: &str| {
            order
                .iter()
                .position(|n| *n == name)
                .unwrap_or(order.len())
        };
        let new_rank = rank(&child.name);
        let pos = self
            .children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(e) if rank(&e.name) > new_rank))
            .unwrap_or(self.children.len());
        self.children.insert(pos, XmlNode::Element(child));
    }

    /// Replaces the first child named like `child`, or inserts it in order
    pub fn upsert_ordered(&mut self, child: XmlElement, order: &[&str]) {
        match self.child_mut(&child.name) {
            Some(existing) => *existing = child,
            None => self.insert_ordered(child, order),
        }
    }

    /// Removes all direct child elements with the given name
    pub fn remove_children(&mut self, name: &str) {
        self.children
            .retain(|n| !matches!(n, XmlNode::Element(e) if e.is(name)));
    }

    fn write(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attributes {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            out.push_str(&escape_attr(v));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            write_node(child, out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// XML declaration fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    /// `version`, normally "1.0"
    pub version: String,
    /// `encoding`, as written
    pub encoding: Option<String>,
    /// `standalone` ("yes"/"no")
    pub standalone: Option<String>,
}

/// A parsed XML part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// Declaration, if present
    pub declaration: Option<XmlDeclaration>,
    /// Nodes between the declaration and the root element
    pub prolog: Vec<XmlNode>,
    /// Root element
    pub root: XmlElement,
    /// Nodes after the root element
    pub epilog: Vec<XmlNode>,
}

impl XmlDocument {
    /// Parse XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut declaration = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut buf = Vec::new();

        loop {
            let node = match reader.read_event_into(&mut buf)? {
                Event::Decl(ref d) => {
                    let version = lossy(&d.version()?);
                    let encoding = match d.encoding() {
                        Some(enc) => Some(lossy(&enc?)),
                        None => None,
                    };
                    let standalone = match d.standalone() {
                        Some(sa) => Some(lossy(&sa?)),
                        None => None,
                    };
                    declaration = Some(XmlDeclaration {
                        version,
                        encoding,
                        standalone,
                    });
                    None
                }
                Event::Start(ref e) => {
                    stack.push(start_element(e)?);
                    None
                }
                Event::Empty(ref e) => Some(XmlNode::Element(start_element(e)?)),
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        OoxmlError::invalid_structure("unbalanced closing tag")
                    })?;
                    Some(XmlNode::Element(element))
                }
                Event::Text(ref e) => Some(XmlNode::Text(e.unescape()?.into_owned())),
                Event::CData(ref e) => Some(XmlNode::CData(lossy(e))),
                Event::Comment(ref e) => Some(XmlNode::Comment(lossy(e))),
                Event::PI(ref e) => Some(XmlNode::ProcessingInstruction(lossy(e))),
                Event::DocType(ref e) => Some(XmlNode::DocType(lossy(e))),
                Event::Eof => break,
            };
            buf.clear();

            let Some(node) = node else { continue };
            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
            } else {
                match node {
                    XmlNode::Element(element) if root.is_none() => root = Some(element),
                    XmlNode::Element(_) => {
                        return Err(OoxmlError::InvalidStructure(
                            "more than one root element".to_string(),
                        ))
                    }
                    other if root.is_none() => prolog.push(other),
                    other => epilog.push(other),
                }
            }
        }

        if !stack.is_empty() {
            return Err(OoxmlError::invalid_structure("unclosed element"));
        }
        let root = root.ok_or_else(|| OoxmlError::invalid_structure("no root element"))?;

        Ok(Self {
            declaration,
            prolog,
            root,
            epilog,
        })
    }

    /// Serialize to a string
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        if let Some(decl) = &self.declaration {
            out.push_str(&format!(r#"<?xml version="{}""#, decl.version));
            if let Some(enc) = &decl.encoding {
                out.push_str(&format!(r#" encoding="{}""#, enc));
            }
            if let Some(sa) = &decl.standalone {
                out.push_str(&format!(r#" standalone="{}""#, sa));
            }
            out.push_str("?>");
        }
        for node in &self.prolog {
            write_node(node, &mut out);
        }
        self.root.write(&mut out);
        for node in &self.epilog {
            write_node(node, &mut out);
        }
        out
    }

    /// Serialize to UTF-8 bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_xml().into_bytes()
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn start_element(e: &BytesStart<'_>) -> Result<XmlElement> {
    let mut element = XmlElement::new(lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr?;
        let key = lossy(attr.key.as_ref());
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn write_node(node: &XmlNode, out: &mut String) {
    match node {
        XmlNode::Element(e) => e.write(out),
        XmlNode::Text(t) => out.push_str(&escape_text(t)),
        XmlNode::CData(t) => {
            out.push_str("<![CDATA[");
            out.push_str(t);
            out.push_str("]]>");
        }
        XmlNode::Comment(t) => {
            out.push_str("<!--");
            out.push_str(t);
            out.push_str("-->");
        }
        XmlNode::ProcessingInstruction(t) => {
            out.push_str("<?");
            out.push_str(t);
            out.push_str("?>");
        }
        XmlNode::DocType(t) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(t);
            out.push('>');
        }
    }
}

/// Escape character data
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value
///
/// Whitespace other than spaces is written as character references, since
/// attribute value normalization would turn it into spaces on the next read.
pub fn escape_attr(text: &str) -> String {
    escape_text(text)
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\r\n",
        r#"<w:document xmlns:w="urn:w" xmlns:mc="urn:mc" mc:Ignorable="w14">"#,
        "<!-- generated -->",
        "<w:body>\n  ",
        r#"<w:p><w:r><w:t xml:space="preserve"> A &amp; B </w:t></w:r></w:p>"#,
        "\n  ",
        r#"<w14:unknown w14:val="x"><?mso-application progid="Word.Document"?></w14:unknown>"#,
        "<w:sectPr/>",
        "</w:body></w:document>"
    );

    #[test]
    fn test_roundtrip_is_lossless() {
        let doc = XmlDocument::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(doc.to_xml(), SAMPLE);
    }

    #[test]
    fn test_declaration_fields() {
        let doc = XmlDocument::parse(SAMPLE.as_bytes()).unwrap();
        let decl = doc.declaration.unwrap();
        assert_eq!(decl.version, "1.0");
        assert_eq!(decl.encoding.as_deref(), Some("UTF-8"));
        assert_eq!(decl.standalone.as_deref(), Some("yes"));
        assert_eq!(doc.prolog, vec![XmlNode::Text("\r\n".to_string())]);
    }

    #[test]
    fn test_text_is_unescaped() {
        let doc = XmlDocument::parse(SAMPLE.as_bytes()).unwrap();
        let paths = doc.root.outermost_paths("w:t");
        assert_eq!(paths.len(), 1);
        let t = doc.root.at_path(&paths[0]).unwrap();
        assert_eq!(t.text(), " A & B ");
        assert_eq!(t.attr("xml:space"), Some("preserve"));
    }

    #[test]
    fn test_outermost_paths_skip_nested() {
        let xml = concat!(
            "<w:body><w:p><w:r><w:txbx><w:p/></w:txbx></w:r></w:p>",
            "<w:tbl><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl></w:body>"
        );
        let doc = XmlDocument::parse(xml.as_bytes()).unwrap();
        let paths = doc.root.outermost_paths("w:p");
        assert_eq!(paths, vec![vec![0], vec![1, 0, 0, 0]]);
    }

    #[test]
    fn test_insert_ordered() {
        let order = ["w:rFonts", "w:b", "w:i", "w:sz"];
        let mut rpr = XmlElement::new("w:rPr")
            .with_child(XmlElement::new("w:b"))
            .with_child(XmlElement::new("w:sz"));
        rpr.insert_ordered(XmlElement::new("w:i"), &order);
        rpr.insert_ordered(XmlElement::new("w:rFonts"), &order);
        rpr.insert_ordered(XmlElement::new("w:lang"), &order);
        let names: Vec<&str> = rpr.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["w:rFonts", "w:b", "w:i", "w:sz", "w:lang"]);
    }

    #[test]
    fn test_attribute_escaping() {
        let el = XmlElement::new("a:t")
            .with_attr("val", r#"say "hi" & <go>"#)
            .with_text("1 < 2");
        let mut out = String::new();
        el.write(&mut out);
        assert_eq!(
            out,
            r#"<a:t val="say &quot;hi&quot; &amp; &lt;go&gt;">1 &lt; 2</a:t>"#
        );
    }

    #[test]
    fn test_attribute_whitespace_roundtrip() {
        let xml = r#"<a:t descr="ligne 1&#10;ligne 2&#13;&#9;fin"/>"#;
        let doc = XmlDocument::parse(xml.as_bytes()).unwrap();
        assert_eq!(doc.root.attr("descr"), Some("ligne 1\nligne 2\r\tfin"));
        assert_eq!(doc.to_xml(), xml);
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        assert!(XmlDocument::parse(b"<a><b></a>").is_err());
        assert!(XmlDocument::parse(b"").is_err());
    }
}
