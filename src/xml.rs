//! A small owned element tree over `quick-xml` events.
//!
//! Entrez documents nest the fields we care about at varying depths, so the
//! record types in [`crate::records`] query this tree by element name instead
//! of binding a fixed serde layout.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::MiningError;

const DOCUMENT: &str = "#document";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, MiningError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| MiningError::Xml(err.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Parses a whole document. The returned element is a synthetic
    /// `#document` root holding the top-level nodes.
    pub fn parse(xml: &str) -> Result<Self, MiningError> {
        let mut reader = Reader::from_str(xml);
        let mut stack = vec![Element::named(DOCUMENT)];

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => stack.push(Element::from_start(&start)?),
                Ok(Event::Empty(start)) => {
                    let element = Element::from_start(&start)?;
                    push_node(&mut stack, Node::Element(element));
                }
                Ok(Event::End(_)) => {
                    if stack.len() < 2 {
                        return Err(MiningError::Xml("unbalanced closing tag".to_string()));
                    }
                    if let Some(element) = stack.pop() {
                        push_node(&mut stack, Node::Element(element));
                    }
                }
                Ok(Event::Text(text)) => {
                    let value = match text.unescape() {
                        Ok(value) => value.into_owned(),
                        Err(_) => String::from_utf8_lossy(&text).into_owned(),
                    };
                    if !value.trim().is_empty() {
                        push_node(&mut stack, Node::Text(value));
                    }
                }
                Ok(Event::CData(data)) => {
                    let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    if !value.trim().is_empty() {
                        push_node(&mut stack, Node::Text(value));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => {
                    return Err(MiningError::Xml(format!(
                        "{err} (byte {})",
                        reader.buffer_position()
                    )));
                }
            }
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(root), true) if root.child_elements().next().is_some() => Ok(root),
            (Some(_), true) => Err(MiningError::Xml("document has no root element".to_string())),
            _ => Err(MiningError::Xml("unclosed element at end of input".to_string())),
        }
    }

    /// Parses markup that may have several top-level elements or bare text,
    /// such as the escaped payloads some summaries embed in a text field.
    pub fn parse_fragment(fragment: &str) -> Result<Self, MiningError> {
        Self::parse(&format!("<fragment>{fragment}</fragment>"))
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text of this element and everything below it, trimmed.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.trim().to_string()
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Every element named `name` below this one, in document order.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.walk(&mut |element| {
            if element.name == name {
                found.push(element);
            }
        });
        found
    }

    pub fn find<'a>(&'a self, name: &str) -> Option<&'a Element> {
        self.find_all(name).into_iter().next()
    }

    /// Elements named `child` whose direct parent is named `parent`.
    pub fn find_children_of<'a>(&'a self, parent: &str, child: &str) -> Vec<&'a Element> {
        self.find_all(parent)
            .into_iter()
            .flat_map(|element| element.child_elements().filter(|el| el.name == child))
            .collect()
    }

    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        for element in self.child_elements() {
            visit(element);
            element.walk(visit);
        }
    }
}

fn push_node(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}
