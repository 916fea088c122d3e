//! Token type → element rules.
//!
//! A rule is either a bare tag name, which wraps the rendered children, or a
//! builder that reads the token's payload and produces the node itself.
//! Lookups are keyed by the token type with any `_open` suffix removed.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::error::RenderError;
use crate::node::Node;
use crate::token::Token;

pub type Builder = Arc<dyn Fn(&Token, Vec<Node>) -> Node + Send + Sync>;

/// Shared default table, read-only after first use.
pub static STANDARD_RULES: LazyLock<RuleTable> = LazyLock::new(RuleTable::standard);

#[derive(Clone)]
pub enum Rule {
    Tag(String),
    Builder(Builder),
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Tag(tag) => f.debug_tuple("Tag").field(tag).finish(),
            Rule::Builder(_) => f.write_str("Builder(..)"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: HashMap<String, Rule>,
}

/// Normalized lookup key for a token type.
pub fn rule_key(kind: &str) -> &str {
    kind.strip_suffix("_open").unwrap_or(kind)
}

impl RuleTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The default rule set for Remarkable token streams.
    pub fn standard() -> Self {
        let mut table = Self::empty();

        table.insert_builder("heading", heading);
        table.insert_builder("link", link);
        table.insert_builder("image", image);
        table.insert_builder("abbr", abbr);

        for (kind, tag) in [
            ("paragraph", "p"),
            ("blockquote", "blockquote"),
            ("bullet_list", "ul"),
            ("ordered_list", "ol"),
            ("list_item", "li"),
            ("table", "table"),
            ("thead", "thead"),
            ("tbody", "tbody"),
            ("tr", "tr"),
            ("td", "td"),
            ("th", "th"),
            ("strong", "strong"),
            ("em", "em"),
            ("del", "del"),
            ("ins", "ins"),
            ("mark", "mark"),
            ("dl", "dl"),
            ("dt", "dt"),
            ("dd", "dd"),
            ("hr", "hr"),
            ("hardbreak", "br"),
            ("softbreak", "br"),
        ] {
            table.insert_tag(kind, tag);
        }

        // Remarkable emits sup/sub as leaves carrying their text.
        table.insert_builder("sup", |token, children| wrap_content("sup", token, children));
        table.insert_builder("sub", |token, children| wrap_content("sub", token, children));

        table
    }

    pub fn insert_tag(&mut self, kind: impl Into<String>, tag: impl Into<String>) -> &mut Self {
        self.rules.insert(kind.into(), Rule::Tag(tag.into()));
        self
    }

    pub fn insert_builder<F>(&mut self, kind: impl Into<String>, builder: F) -> &mut Self
    where
        F: Fn(&Token, Vec<Node>) -> Node + Send + Sync + 'static,
    {
        self.rules.insert(kind.into(), Rule::Builder(Arc::new(builder)));
        self
    }

    /// Rule for a token type, after `_open` normalization.
    pub fn get(&self, kind: &str) -> Option<&Rule> {
        self.rules.get(rule_key(kind))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.get(kind).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Render one closed block or leaf token.
    pub fn apply(&self, token: &Token, children: Vec<Node>) -> Result<Node, RenderError> {
        match self.get(&token.kind) {
            Some(Rule::Tag(tag)) => Ok(Node::element(tag.as_str(), Vec::new(), children)),
            Some(Rule::Builder(build)) => Ok(build(token, children)),
            None => Err(RenderError::UnhandledTokenType(token.kind.clone())),
        }
    }
}

fn opt(token: &Token, name: &str) -> Option<String> {
    token.attr_str(name).map(str::to_string)
}

fn heading(token: &Token, children: Vec<Node>) -> Node {
    let level = token.attr_u64("hLevel").unwrap_or(1).clamp(1, 6);
    Node::element(format!("h{level}"), Vec::new(), children)
}

fn link(token: &Token, children: Vec<Node>) -> Node {
    let attrs = vec![
        ("href".to_string(), opt(token, "href")),
        ("title".to_string(), opt(token, "title")),
    ];
    Node::element("a", attrs, children)
}

fn image(token: &Token, _children: Vec<Node>) -> Node {
    let attrs = vec![
        ("title".to_string(), opt(token, "title")),
        ("alt".to_string(), opt(token, "alt")),
        ("src".to_string(), opt(token, "src")),
    ];
    Node::element("img", attrs, Vec::new())
}

fn abbr(token: &Token, children: Vec<Node>) -> Node {
    Node::element("abbr", vec![("title".to_string(), opt(token, "title"))], children)
}

fn wrap_content(tag: &str, token: &Token, children: Vec<Node>) -> Node {
    let children = match (&token.content, children.is_empty()) {
        (Some(content), true) => vec![Node::text(content.as_str())],
        _ => children,
    };
    Node::element(tag, Vec::new(), children)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Node {
        Node::text(s)
    }

    #[test]
    fn open_suffix_is_stripped() {
        assert_eq!(rule_key("paragraph_open"), "paragraph");
        assert_eq!(rule_key("hr"), "hr");
        assert_eq!(rule_key("paragraph_close"), "paragraph_close");
        assert!(STANDARD_RULES.contains("bullet_list_open"));
        assert!(!STANDARD_RULES.contains("bullet_list_close"));
    }

    #[test]
    fn tag_rule_wraps_children() {
        let node = STANDARD_RULES
            .apply(&Token::new("paragraph_open"), vec![text("foo")])
            .unwrap();
        assert_eq!(node, Node::element("p", vec![], vec![text("foo")]));
    }

    #[test]
    fn heading_uses_level() {
        let token = Token::new("heading_open").with_attr("hLevel", 3);
        let node = STANDARD_RULES.apply(&token, vec![text("t")]).unwrap();
        assert_eq!(node.as_element().unwrap().tag, "h3");

        let unlevelled = STANDARD_RULES.apply(&Token::new("heading_open"), vec![]).unwrap();
        assert_eq!(unlevelled.as_element().unwrap().tag, "h1");

        let deep = Token::new("heading_open").with_attr("hLevel", 9);
        assert_eq!(STANDARD_RULES.apply(&deep, vec![]).unwrap().as_element().unwrap().tag, "h6");
    }

    #[test]
    fn link_defaults_title_to_null() {
        let token = Token::new("link_open").with_attr("href", "http://google.com");
        let node = STANDARD_RULES.apply(&token, vec![text("world")]).unwrap();
        assert_eq!(
            node,
            Node::element(
                "a",
                vec![
                    ("href".into(), Some("http://google.com".into())),
                    ("title".into(), None),
                ],
                vec![text("world")],
            )
        );
    }

    #[test]
    fn image_has_no_children() {
        let token = Token::new("image")
            .with_attr("src", "/kitty.jpg")
            .with_attr("alt", "a kitty");
        let node = STANDARD_RULES.apply(&token, vec![text("ignored")]).unwrap();
        let el = node.as_element().unwrap();
        assert_eq!(el.tag, "img");
        assert_eq!(el.attr("src"), Some("/kitty.jpg"));
        assert_eq!(el.attr("alt"), Some("a kitty"));
        assert!(el.has_attr("title"));
        assert_eq!(el.attr("title"), None);
        assert!(el.children.is_empty());
    }

    #[test]
    fn abbr_carries_title() {
        let token = Token::new("abbr_open").with_attr("title", "HyperText Markup Language");
        let node = STANDARD_RULES.apply(&token, vec![text("HTML")]).unwrap();
        let el = node.as_element().unwrap();
        assert_eq!(el.attr("title"), Some("HyperText Markup Language"));
        assert_eq!(el.children, vec![text("HTML")]);
    }

    #[test]
    fn breaks_are_empty_br() {
        for kind in ["hardbreak", "softbreak"] {
            let node = STANDARD_RULES.apply(&Token::new(kind), vec![]).unwrap();
            assert_eq!(node, Node::element("br", vec![], vec![]));
        }
    }

    #[test]
    fn sup_wraps_leaf_content() {
        let token = Token::new("sup").with_content("2");
        let node = STANDARD_RULES.apply(&token, vec![]).unwrap();
        assert_eq!(node, Node::element("sup", vec![], vec![text("2")]));
    }

    #[test]
    fn unknown_type_is_unhandled() {
        let err = STANDARD_RULES.apply(&Token::new("fence"), vec![]).unwrap_err();
        assert_eq!(err, RenderError::UnhandledTokenType("fence".into()));
    }

    #[test]
    fn custom_rules_extend_the_table() {
        let mut table = RuleTable::standard();
        table
            .insert_tag("code", "code")
            .insert_builder("fence", |token, _| {
                let body = token.content.clone().unwrap_or_default();
                Node::element("pre", vec![], vec![Node::text(body)])
            });
        let fence = Token::new("fence").with_content("let x = 1;");
        assert_eq!(
            table.apply(&fence, vec![]).unwrap(),
            Node::element("pre", vec![], vec![text("let x = 1;")])
        );
        assert!(table.contains("code"));
        assert!(!RuleTable::empty().contains("paragraph"));
    }
}
