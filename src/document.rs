//! A minimal owned XML tree, the input of the decoder.
//!
//! Only what XML-RPC needs is kept: element names, child order, and whether text came from a
//! CDATA section. Comments and processing instructions are dropped.

use crate::error::DecodeError;

use xml::reader::{EventReader, XmlEvent};
use xml::ParserConfig;

use std::io::Read;

/// How deeply elements may nest before a document is rejected.
///
/// Comfortably above what the decoder accepts, so a value that is too deep fails there with a
/// precise limit. This one keeps huge trees from being built at all.
const MAX_TREE_DEPTH: usize = 1024;

/// A child of an `Element`.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data, with entities already resolved by the XML parser.
    Text(String),
    /// The raw contents of a `<![CDATA[...]]>` section.
    CData(String),
}

/// An XML element.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    name: String,
    has_attributes: bool,
    children: Vec<Node>,
}

impl Element {
    /// Parses a complete XML document from a reader and returns its root element.
    pub fn parse<R: Read>(reader: R) -> Result<Element, DecodeError> {
        let reader = EventReader::new_with_config(
            reader,
            ParserConfig::new()
                .cdata_to_characters(false)
                .coalesce_characters(true)
                .trim_whitespace(false),
        );

        // elements that are still open, innermost last
        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;

        for event in reader {
            match event? {
                XmlEvent::StartElement { name, attributes, .. } => {
                    if stack.len() >= MAX_TREE_DEPTH {
                        return Err(DecodeError::TooDeep(MAX_TREE_DEPTH));
                    }
                    stack.push(Element {
                        name: name.local_name,
                        has_attributes: !attributes.is_empty(),
                        children: Vec::new(),
                    });
                }
                XmlEvent::EndElement { .. } => {
                    // xml-rs guarantees balanced tags
                    if let Some(element) = stack.pop() {
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(Node::Element(element)),
                            None => root = Some(element),
                        }
                    }
                }
                XmlEvent::Characters(text) | XmlEvent::Whitespace(text) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::Text(text));
                    }
                }
                XmlEvent::CData(text) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::CData(text));
                    }
                }
                // document markers, comments and processing instructions
                _ => {}
            }
        }

        root.ok_or_else(|| DecodeError::unexpected("a root element", "an empty document"))
    }

    /// Parses a complete XML document from a string.
    pub fn parse_str(xml: &str) -> Result<Element, DecodeError> {
        Element::parse(xml.as_bytes())
    }

    /// Returns the local name of this element (without namespace prefix).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_attributes(&self) -> bool {
        self.has_attributes
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Iterates over the child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Returns the `index`th child element.
    pub fn element(&self, index: usize) -> Option<&Element> {
        self.elements().nth(index)
    }

    /// Returns the first child element named `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// Concatenates the direct text and CDATA children, as-is.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) | Node::CData(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}
