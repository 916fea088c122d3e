//! Rendered element tree.

use serde::{Deserialize, Serialize};

/// Attribute list in insertion order; `None` is an explicit null.
pub type Attributes = Vec<(String, Option<String>)>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default)]
    pub attrs: Attributes,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    /// Element construction primitive used by every rule.
    pub fn element(tag: impl Into<String>, attrs: Attributes, children: Vec<Node>) -> Self {
        Node::Element(Element {
            tag: tag.into(),
            attrs,
            children,
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }
}

impl Element {
    /// Attribute value; `None` both when absent and when explicitly null.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(key, _)| key == name)
    }
}
