//! Markdown Token Stream
//!
//! The flat token shape produced by a Remarkable-style tokenizer. Block
//! structure is encoded by `<name>_open` / `<name>_close` pairs, text-level
//! content is grouped under `inline` tokens, and every other payload field
//! rides along untyped in `attrs`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type name of an inline group token.
pub const INLINE: &str = "inline";

/// Type name of a plain text leaf.
pub const TEXT: &str = "text";

/// Every token type the Remarkable tokenizer can emit.
pub const KNOWN_TOKEN_TYPES: &[&str] = &[
    "blockquote_open",
    "blockquote_close",
    "code",
    "fence",
    "fence_custom",
    "heading_open",
    "heading_close",
    "hr",
    "bullet_list_open",
    "bullet_list_close",
    "list_item_open",
    "list_item_close",
    "ordered_list_open",
    "ordered_list_close",
    "paragraph_open",
    "paragraph_close",
    "link_open",
    "link_close",
    "image",
    "table_open",
    "table_close",
    "thead_open",
    "thead_close",
    "tbody_open",
    "tbody_close",
    "tr_open",
    "tr_close",
    "th_open",
    "th_close",
    "td_open",
    "td_close",
    "strong_open",
    "strong_close",
    "em_open",
    "em_close",
    "del_open",
    "del_close",
    "ins_open",
    "ins_close",
    "mark_open",
    "mark_close",
    "sub",
    "sup",
    "hardbreak",
    "softbreak",
    "text",
    "htmlblock",
    "htmltag",
    "abbr_open",
    "abbr_close",
    "footnote_ref",
    "footnote_block_open",
    "footnote_block_close",
    "footnote_open",
    "footnote_close",
    "footnote_anchor",
    "dl_open",
    "dl_close",
    "dt_open",
    "dt_close",
    "dd_open",
    "dd_close",
];

/// One unit of tokenizer output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Nested sequence, present on `inline` tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Token>>,

    /// Per-type payload (`href`, `hLevel`, `src`, ...).
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

impl Token {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: None,
            children: None,
            attrs: Map::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(TEXT).with_content(content)
    }

    pub fn inline(children: Vec<Token>) -> Self {
        Self {
            children: Some(children),
            ..Self::new(INLINE)
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// String payload field; empty strings and non-strings count as absent.
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attrs
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Numeric payload field, accepting numbers or numeric strings.
    pub fn attr_u64(&self, name: &str) -> Option<u64> {
        match self.attrs.get(name)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Token] {
        self.children.as_deref().unwrap_or(&[])
    }
}
