//! Minimal XML element tree for `Content` and `StatusDetail` payloads.
//!
//! The codec never interprets these documents beyond `MissingAttributeDetail`;
//! it only needs to check well-formedness, carry the tree, and write it back.
//! Qualified names and `xmlns` declarations are kept verbatim.
//!
//! Whitespace-only text is dropped on parse when the element also has
//! element children, so indentation disappears while a text-only element
//! such as `<v>  </v>` keeps its value. A tree written by
//! [`XmlElement::to_xml_string`] parses back to an equal tree as long as it
//! has no whitespace-only text beside child elements.

use std::fmt::{self, Display};

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};

use crate::error::XmlError;

/// A node inside an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with its attributes and children, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds an attribute (builder pattern).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Adds a child element (builder pattern).
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Adds a text node (builder pattern).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Returns the value of the named attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Concatenates the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Parses a document with exactly one root element.
    pub fn parse(text: &str) -> Result<Self, XmlError> {
        let mut roots = parse_fragment(text)?;
        if roots.len() != 1 {
            return Err(XmlError::RootCount(roots.len()));
        }
        Ok(roots.remove(0))
    }

    /// Parses UTF-8 bytes as a document with exactly one root element.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, XmlError> {
        let text = std::str::from_utf8(bytes).map_err(|_| XmlError::NotUtf8)?;
        Self::parse(text)
    }

    /// Serializes the element without an XML declaration.
    pub fn to_xml_string(&self) -> String {
        self.to_string()
    }
}

impl Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (key, value) in &self.attributes {
            write!(f, " {key}=\"{}\"", escape(value.as_str()))?;
        }
        if self.children.is_empty() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        for child in &self.children {
            match child {
                XmlNode::Element(element) => write!(f, "{element}")?,
                XmlNode::Text(text) => f.write_str(&escape(text.as_str()))?,
            }
        }
        write!(f, "</{}>", self.name)
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses a sequence of zero or more sibling elements.
///
/// Declarations, comments and processing instructions are skipped.
pub fn parse_fragment(text: &str) -> Result<Vec<XmlElement>, XmlError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut roots = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| XmlError::Malformed {
            position: u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX),
            message: e.to_string(),
        })?;
        let malformed = |message: String| XmlError::Malformed {
            position: u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX),
            message,
        };

        match event {
            Event::Start(start) => {
                stack.push(open_element(&start).map_err(malformed)?);
            }
            Event::Empty(start) => {
                let element = open_element(&start).map_err(malformed)?;
                attach(&mut stack, &mut roots, element);
            }
            Event::End(_) => {
                // quick-xml verifies the end name matches.
                if let Some(mut element) = stack.pop() {
                    drop_indentation(&mut element);
                    attach(&mut stack, &mut roots, element);
                }
            }
            Event::Text(bytes) => {
                let text = bytes.unescape().map_err(|e| malformed(e.to_string()))?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(bytes) => {
                let raw = bytes.into_inner();
                let text = std::str::from_utf8(&raw).map_err(|_| XmlError::NotUtf8)?;
                push_text(&mut stack, text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name));
    }
    Ok(roots)
}

fn open_element(start: &BytesStart<'_>) -> Result<XmlElement, String> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| e.to_string())?
        .to_string();
    let mut element = XmlElement::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let key = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|e| e.to_string())?
            .to_string();
        let value = attribute.unescape_value().map_err(|e| e.to_string())?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn attach(stack: &mut [XmlElement], roots: &mut Vec<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => roots.push(element),
    }
}

fn push_text(stack: &mut [XmlElement], text: &str) -> Result<(), XmlError> {
    if text.is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(parent) => {
            // text split by comments or CDATA stays one node
            match parent.children.last_mut() {
                Some(XmlNode::Text(previous)) => previous.push_str(text),
                _ => parent.children.push(XmlNode::Text(text.to_string())),
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(XmlError::TextOutsideRoot),
    }
}

fn drop_indentation(element: &mut XmlElement) {
    let has_elements = element
        .children
        .iter()
        .any(|node| matches!(node, XmlNode::Element(_)));
    if has_elements {
        element
            .children
            .retain(|node| !matches!(node, XmlNode::Text(text) if text.trim().is_empty()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_parse_nested_document() {
        let xml = r#"<md:record xmlns:md="urn:example:med"><md:patient id="7">Anne &amp; Bob</md:patient><md:empty/></md:record>"#;
        let root = XmlElement::parse(xml).unwrap();

        assert_eq!(root.name, "md:record");
        assert_eq!(root.attribute("xmlns:md"), Some("urn:example:med"));
        let children: Vec<_> = root.child_elements().collect();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].attribute("id"), Some("7"));
        assert_eq!(children[0].text(), "Anne & Bob");
        assert!(children[1].children.is_empty());
    }

    #[test]
    fn test_serialization_reparses_to_equal_tree() {
        let root = XmlElement::new("a")
            .with_attribute("q", "x\"<y")
            .with_child(XmlElement::new("b").with_text("1 < 2"))
            .with_child(XmlElement::new("c"));
        let text = root.to_xml_string();
        assert_eq!(XmlElement::parse(&text).unwrap(), root);
    }

    #[test]
    fn test_declaration_and_comments_are_skipped() {
        let root = XmlElement::parse("<?xml version=\"1.0\"?><!-- note --><a>t</a>").unwrap();
        assert_eq!(root.text(), "t");
    }

    #[test]
    fn test_text_around_comment_is_one_node() {
        let root = XmlElement::parse("<a>x<!-- c --> y<![CDATA[<z>]]></a>").unwrap();
        assert_eq!(root.children, vec![XmlNode::Text("x y<z>".to_string())]);
        assert_eq!(XmlElement::parse(&root.to_xml_string()).unwrap(), root);
    }

    #[test]
    fn test_whitespace_only_value_is_kept() {
        let root = XmlElement::new("v").with_text("  ");
        assert_eq!(root.to_xml_string(), "<v>  </v>");
        assert_eq!(XmlElement::parse(&root.to_xml_string()).unwrap(), root);
    }

    #[test]
    fn test_indentation_between_elements_is_dropped() {
        let root = XmlElement::parse("<a>\n  <b> </b>\n  <c/>\n</a>").unwrap();
        assert_eq!(
            root,
            XmlElement::new("a")
                .with_child(XmlElement::new("b").with_text(" "))
                .with_child(XmlElement::new("c"))
        );
    }

    #[test]
    fn test_fragment_allows_siblings() {
        let roots = parse_fragment("<a/>\n<b/>").unwrap();
        assert_eq!(roots.len(), 2);
        assert!(parse_fragment("").unwrap().is_empty());
    }

    #[test_case("<a>"; "unclosed")]
    #[test_case("<a></b>"; "mismatched end")]
    #[test_case("text"; "bare text")]
    #[test_case("<a/><b/>"; "two roots")]
    #[test_case(""; "no root")]
    fn test_parse_rejects(xml: &str) {
        assert!(XmlElement::parse(xml).is_err());
    }

    #[test]
    fn test_parse_bytes_requires_utf8() {
        assert_eq!(XmlElement::parse_bytes(&[0xff, 0xfe]), Err(XmlError::NotUtf8));
    }
}
