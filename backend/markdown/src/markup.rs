//! Static serializers for rendered trees.
//!
//! Host-side helpers: markup text in the shape a static UI renderer would
//! emit, and plain text with all formatting stripped.

use crate::node::{Element, Node};

const VOID_TAGS: &[&str] = &["br", "hr", "img"];

const BLOCK_TAGS: &[&str] = &[
    "p", "blockquote", "ul", "ol", "li", "table", "tr", "dl", "dt", "dd", "h1", "h2", "h3", "h4",
    "h5", "h6", "hr",
];

/// Serialize nodes to markup. Null attributes are omitted and void
/// elements get no closing tag.
pub fn to_markup(nodes: &[Node]) -> String {
    let mut output = String::new();
    for node in nodes {
        write_markup(node, &mut output);
    }
    output
}

fn write_markup(node: &Node, output: &mut String) {
    match node {
        Node::Text(text) => escape_into(text, output),
        Node::Element(el) => write_element(el, output),
    }
}

fn write_element(el: &Element, output: &mut String) {
    output.push('<');
    output.push_str(&el.tag);
    for (name, value) in &el.attrs {
        if let Some(value) = value {
            output.push(' ');
            output.push_str(name);
            output.push_str("=\"");
            escape_into(value, output);
            output.push('"');
        }
    }
    output.push('>');

    if VOID_TAGS.contains(&el.tag.as_str()) {
        return;
    }

    for child in &el.children {
        write_markup(child, output);
    }
    output.push_str("</");
    output.push_str(&el.tag);
    output.push('>');
}

fn escape_into(text: &str, output: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            _ => output.push(ch),
        }
    }
}

/// Text content of a rendered tree with all tags dropped. Blocks end in a
/// newline, `br` becomes one and images contribute their alt text.
pub fn to_plain_text(nodes: &[Node]) -> String {
    let mut output = String::new();
    for node in nodes {
        match node {
            Node::Text(text) => output.push_str(text),
            Node::Element(el) if el.tag == "br" => output.push('\n'),
            Node::Element(el) if el.tag == "img" => {
                output.push_str(el.attr("alt").unwrap_or_default());
            }
            Node::Element(el) => {
                output.push_str(&to_plain_text(&el.children));
                if BLOCK_TAGS.contains(&el.tag.as_str()) && !output.ends_with('\n') {
                    output.push('\n');
                }
            }
        }
    }
    output
}
