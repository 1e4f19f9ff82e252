//! Minimal generic element tree for feed documents.
//!
//! Feeds arrive as RSS 2.0 or Atom, and the normalizer needs to look at
//! them shape-agnostically (a `link` may be text or carry an `href`, a
//! `title` may be typed). This module keeps every element with its
//! qualified name, attributes and text so those decisions can be made
//! afterwards.

use crate::types::{DigestError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    /// Qualified name as written, e.g. `item` or `dc:date`.
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// Text and CDATA directly inside this element.
    pub text: String,
}

impl XmlNode {
    /// Parse a document and return its root element.
    pub fn parse(xml: &[u8]) -> Result<XmlNode> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => stack.push(XmlNode::from_start(&e)),
                Event::Empty(e) => {
                    let node = XmlNode::from_start(&e);
                    attach(&mut stack, &mut root, node);
                }
                Event::End(_) => {
                    if let Some(node) = stack.pop() {
                        attach(&mut stack, &mut root, node);
                    }
                }
                Event::Text(e) => {
                    if let Some(top) = stack.last_mut() {
                        let text = e
                            .unescape()
                            .map(|t| t.into_owned())
                            .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                        top.push_text(&text);
                    }
                }
                Event::CData(e) => {
                    if let Some(top) = stack.last_mut() {
                        top.push_text(&String::from_utf8_lossy(&e));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(DigestError::Parse(format!(
                "document ended inside <{}>",
                stack.last().map(|n| n.name.as_str()).unwrap_or("")
            )));
        }

        root.ok_or_else(|| DigestError::Parse("document has no root element".to_string()))
    }

    fn from_start(e: &BytesStart<'_>) -> Self {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let attributes = e
            .attributes()
            .flatten()
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                let value = attr
                    .unescape_value()
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                (key, value)
            })
            .collect();

        Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(text);
    }

    /// Name without namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First child whose name, prefix ignored, is `local`.
    pub fn child_local(&self, local: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.local_name() == local)
    }

    pub fn children_local<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.local_name() == local)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All text in this element and its descendants, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if !self.text.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&self.text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Trimmed text content of the first child called `name`, if non-empty.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).and_then(XmlNode::trimmed_text)
    }

    /// Like [`XmlNode::child_text`], matching on the local name.
    pub fn child_local_text(&self, local: &str) -> Option<String> {
        self.child_local(local).and_then(XmlNode::trimmed_text)
    }

    fn trimmed_text(&self) -> Option<String> {
        let text = self.text_content().trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}
