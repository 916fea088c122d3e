//! pulldown-cmark adapter.
//!
//! Reshapes pulldown-cmark's event stream into the Remarkable token shape the
//! reducer consumes: block `_open`/`_close` pairs, runs of inline content
//! grouped under one `inline` token, and images collapsed into a single
//! `image` leaf. Constructs without a default rule (code, raw HTML,
//! footnotes) keep their Remarkable type names so rendering reports them.
//!
//! pulldown-cmark leaves the inline run of a tight list item bare; it is
//! wrapped in a `paragraph_open`/`paragraph_close` pair marked `tight: true`,
//! as Remarkable does.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use std::mem;
use tracing::trace;

use crate::error::RenderError;
use crate::node::Node;
use crate::renderer::render;
use crate::token::{TEXT, Token};

/// Tokenize `source` with pulldown-cmark (tables, strikethrough and
/// footnotes enabled).
pub fn tokens_from_markdown(source: &str) -> Vec<Token> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let mut sink = TokenSink::default();
    for event in Parser::new_ext(source, options) {
        sink.event(event);
    }
    sink.finish()
}

/// Tokenize and render with the standard rules.
pub fn render_markdown(source: &str) -> Result<Vec<Node>, RenderError> {
    render(&tokens_from_markdown(source))
}

struct PendingImage {
    src: String,
    title: String,
    alt: String,
    nested: usize,
}

struct PendingCode {
    info: Option<String>,
    text: String,
}

#[derive(Default)]
struct TokenSink {
    tokens: Vec<Token>,
    inline: Vec<Token>,
    /// Open paragraphs, headings and table cells.
    leaf_blocks: usize,
    open_items: usize,
    /// A synthesized paragraph around a tight item's inline run is open.
    tight_paragraph: bool,
    in_table_head: bool,
    table_body_open: bool,
    image: Option<PendingImage>,
    code: Option<PendingCode>,
}

impl TokenSink {
    fn event(&mut self, event: Event<'_>) {
        if self.image.is_some() {
            self.image_event(event);
            return;
        }
        if self.code.is_some() {
            self.code_event(event);
            return;
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => self.push_inline(Token::new("code").with_content(code.to_string())),
            Event::Html(html) => {
                // Block HTML arrives line by line; inline tags carry no newline.
                if self.in_inline_run() || (self.open_items > 0 && !html.ends_with('\n')) {
                    self.push_inline(Token::new("htmltag").with_content(html.to_string()));
                } else {
                    self.push_block(Token::new("htmlblock").with_content(html.to_string()));
                }
            }
            Event::FootnoteReference(label) => {
                self.push_inline(Token::new("footnote_ref").with_attr("label", label.to_string()));
            }
            Event::SoftBreak => self.push_inline(Token::new("softbreak")),
            Event::HardBreak => self.push_inline(Token::new("hardbreak")),
            Event::Rule => self.push_block(Token::new("hr")),
            Event::TaskListMarker(checked) => trace!(checked, "dropping task list marker"),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.leaf_blocks += 1;
                self.push_block(Token::new("paragraph_open"));
            }
            Tag::Heading(level, _, _) => {
                self.leaf_blocks += 1;
                self.push_block(Token::new("heading_open").with_attr("hLevel", level as u32));
            }
            Tag::BlockQuote => self.push_block(Token::new("blockquote_open")),
            Tag::CodeBlock(kind) => {
                self.end_inline_run();
                let info = match kind {
                    CodeBlockKind::Fenced(info) => Some(info.to_string()),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(PendingCode {
                    info,
                    text: String::new(),
                });
            }
            Tag::List(Some(start)) => {
                self.push_block(Token::new("ordered_list_open").with_attr("order", start));
            }
            Tag::List(None) => self.push_block(Token::new("bullet_list_open")),
            Tag::Item => {
                self.open_items += 1;
                self.push_block(Token::new("list_item_open"));
            }
            Tag::FootnoteDefinition(label) => {
                self.push_block(Token::new("footnote_open").with_attr("label", label.to_string()));
            }
            Tag::Table(_) => {
                self.table_body_open = false;
                self.push_block(Token::new("table_open"));
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.push_block(Token::new("thead_open"));
                self.push_block(Token::new("tr_open"));
            }
            Tag::TableRow => {
                if !self.table_body_open {
                    self.table_body_open = true;
                    self.push_block(Token::new("tbody_open"));
                }
                self.push_block(Token::new("tr_open"));
            }
            Tag::TableCell => {
                self.leaf_blocks += 1;
                let kind = if self.in_table_head { "th_open" } else { "td_open" };
                self.push_block(Token::new(kind));
            }
            Tag::Emphasis => self.push_inline(Token::new("em_open")),
            Tag::Strong => self.push_inline(Token::new("strong_open")),
            Tag::Strikethrough => self.push_inline(Token::new("del_open")),
            Tag::Link(_, dest, title) => {
                let mut token = Token::new("link_open").with_attr("href", dest.to_string());
                if !title.is_empty() {
                    token = token.with_attr("title", title.to_string());
                }
                self.push_inline(token);
            }
            Tag::Image(_, dest, title) => {
                self.image = Some(PendingImage {
                    src: dest.to_string(),
                    title: title.to_string(),
                    alt: String::new(),
                    nested: 0,
                });
            }
        }
    }

    fn end(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.leaf_blocks = self.leaf_blocks.saturating_sub(1);
                self.push_block(Token::new("paragraph_close"));
            }
            Tag::Heading(..) => {
                self.leaf_blocks = self.leaf_blocks.saturating_sub(1);
                self.push_block(Token::new("heading_close"));
            }
            Tag::BlockQuote => self.push_block(Token::new("blockquote_close")),
            Tag::List(Some(_)) => self.push_block(Token::new("ordered_list_close")),
            Tag::List(None) => self.push_block(Token::new("bullet_list_close")),
            Tag::Item => {
                self.open_items = self.open_items.saturating_sub(1);
                self.push_block(Token::new("list_item_close"));
            }
            Tag::FootnoteDefinition(_) => self.push_block(Token::new("footnote_close")),
            Tag::Table(_) => {
                if mem::take(&mut self.table_body_open) {
                    self.push_block(Token::new("tbody_close"));
                }
                self.push_block(Token::new("table_close"));
            }
            Tag::TableHead => {
                self.in_table_head = false;
                self.push_block(Token::new("tr_close"));
                self.push_block(Token::new("thead_close"));
            }
            Tag::TableRow => self.push_block(Token::new("tr_close")),
            Tag::TableCell => {
                self.leaf_blocks = self.leaf_blocks.saturating_sub(1);
                let kind = if self.in_table_head { "th_close" } else { "td_close" };
                self.push_block(Token::new(kind));
            }
            Tag::Emphasis => self.push_inline(Token::new("em_close")),
            Tag::Strong => self.push_inline(Token::new("strong_close")),
            Tag::Strikethrough => self.push_inline(Token::new("del_close")),
            Tag::Link(..) => self.push_inline(Token::new("link_close")),
            // Consumed by the pending image and code states.
            Tag::Image(..) | Tag::CodeBlock(_) => {}
        }
    }

    fn image_event(&mut self, event: Event<'_>) {
        let Some(image) = self.image.as_mut() else {
            return;
        };
        let done = match event {
            Event::Start(Tag::Image(..)) => {
                image.nested += 1;
                false
            }
            Event::End(Tag::Image(..)) if image.nested > 0 => {
                image.nested -= 1;
                false
            }
            Event::End(Tag::Image(..)) => true,
            Event::Text(text) | Event::Code(text) => {
                image.alt.push_str(&text);
                false
            }
            _ => false,
        };
        if !done {
            return;
        }
        if let Some(image) = self.image.take() {
            let mut token = Token::new("image")
                .with_attr("src", image.src)
                .with_attr("alt", image.alt);
            if !image.title.is_empty() {
                token = token.with_attr("title", image.title);
            }
            self.push_inline(token);
        }
    }

    fn code_event(&mut self, event: Event<'_>) {
        let Some(code) = self.code.as_mut() else {
            return;
        };
        let done = match event {
            Event::Text(text) => {
                code.text.push_str(&text);
                false
            }
            Event::End(Tag::CodeBlock(_)) => true,
            _ => false,
        };
        if !done {
            return;
        }
        if let Some(code) = self.code.take() {
            let token = match code.info {
                Some(info) => Token::new("fence")
                    .with_content(code.text)
                    .with_attr("params", info),
                None => Token::new("code")
                    .with_content(code.text)
                    .with_attr("block", true),
            };
            self.push_block(token);
        }
    }

    fn in_inline_run(&self) -> bool {
        self.leaf_blocks > 0 || self.tight_paragraph
    }

    /// Inline content outside any leaf block only occurs in tight list items.
    fn open_tight_paragraph(&mut self) {
        if !self.in_inline_run() {
            self.flush_inline();
            self.tokens
                .push(Token::new("paragraph_open").with_attr("tight", true));
            self.tight_paragraph = true;
        }
    }

    fn end_inline_run(&mut self) {
        self.flush_inline();
        if mem::take(&mut self.tight_paragraph) {
            self.tokens
                .push(Token::new("paragraph_close").with_attr("tight", true));
        }
    }

    fn push_text(&mut self, text: &str) {
        self.open_tight_paragraph();
        if let Some(last) = self.inline.last_mut().filter(|t| t.kind == TEXT) {
            last.content.get_or_insert_with(String::new).push_str(text);
        } else {
            self.inline.push(Token::text(text));
        }
    }

    fn push_inline(&mut self, token: Token) {
        self.open_tight_paragraph();
        self.inline.push(token);
    }

    fn push_block(&mut self, token: Token) {
        self.end_inline_run();
        self.tokens.push(token);
    }

    fn flush_inline(&mut self) {
        if !self.inline.is_empty() {
            let children = mem::take(&mut self.inline);
            self.tokens.push(Token::inline(children));
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.end_inline_run();
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.kind.as_str()).collect()
    }

    #[test]
    fn paragraph_groups_inline_run() {
        let tokens = tokens_from_markdown("hello *world*");
        assert_eq!(kinds(&tokens), ["paragraph_open", "inline", "paragraph_close"]);
        assert_eq!(
            kinds(tokens[1].children()),
            ["text", "em_open", "text", "em_close"]
        );
        assert_eq!(tokens[1].children()[0].content.as_deref(), Some("hello "));
    }

    #[test]
    fn heading_carries_level() {
        let tokens = tokens_from_markdown("### Title");
        assert_eq!(tokens[0].kind, "heading_open");
        assert_eq!(tokens[0].attr_u64("hLevel"), Some(3));
    }

    #[test]
    fn link_without_title() {
        let tokens = tokens_from_markdown("[world](http://google.com)");
        let link = &tokens[1].children()[0];
        assert_eq!(link.kind, "link_open");
        assert_eq!(link.attr_str("href"), Some("http://google.com"));
        assert_eq!(link.attr_str("title"), None);
    }

    #[test]
    fn image_collapses_to_leaf() {
        let tokens = tokens_from_markdown(r#"![a kitty](/kitty.jpg "Kitty")"#);
        let inline = tokens[1].children();
        assert_eq!(inline.len(), 1);
        assert_eq!(inline[0].kind, "image");
        assert_eq!(inline[0].attr_str("alt"), Some("a kitty"));
        assert_eq!(inline[0].attr_str("src"), Some("/kitty.jpg"));
        assert_eq!(inline[0].attr_str("title"), Some("Kitty"));
    }

    #[test]
    fn table_gets_head_row_and_body() {
        let tokens = tokens_from_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        let blocks: Vec<&str> = kinds(&tokens)
            .into_iter()
            .filter(|k| *k != "inline")
            .collect();
        assert_eq!(
            blocks,
            [
                "table_open",
                "thead_open",
                "tr_open",
                "th_open",
                "th_close",
                "th_open",
                "th_close",
                "tr_close",
                "thead_close",
                "tbody_open",
                "tr_open",
                "td_open",
                "td_close",
                "td_open",
                "td_close",
                "tr_close",
                "tbody_close",
                "table_close",
            ]
        );
    }

    #[test]
    fn tight_items_get_a_tight_paragraph() {
        let tokens = tokens_from_markdown("- one\n- two\n");
        assert_eq!(
            kinds(&tokens),
            [
                "bullet_list_open",
                "list_item_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "list_item_close",
                "list_item_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "list_item_close",
                "bullet_list_close",
            ]
        );
        assert_eq!(tokens[2].attrs.get("tight"), Some(&serde_json::Value::Bool(true)));
        assert_eq!(tokens[3].children()[0].content.as_deref(), Some("one"));
    }

    #[test]
    fn tight_paragraph_closes_before_nested_list() {
        let tokens = tokens_from_markdown("- one\n  - inner\n");
        assert_eq!(
            kinds(&tokens)[..6],
            [
                "bullet_list_open",
                "list_item_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "bullet_list_open",
            ]
        );
    }

    #[test]
    fn html_in_tight_item_stays_inline() {
        let tokens = tokens_from_markdown("- a <b>x</b> y\n");
        assert!(!kinds(&tokens).contains(&"htmlblock"));
        assert_eq!(
            kinds(&tokens),
            [
                "bullet_list_open",
                "list_item_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "list_item_close",
                "bullet_list_close",
            ]
        );
        let inline = kinds(tokens[3].children());
        assert_eq!(inline.iter().filter(|k| **k == "htmltag").count(), 2);
    }

    #[test]
    fn fenced_code_keeps_remarkable_name() {
        let tokens = tokens_from_markdown("```rust\nlet x = 1;\n```\n");
        assert_eq!(kinds(&tokens), ["fence"]);
        assert_eq!(tokens[0].content.as_deref(), Some("let x = 1;\n"));
        assert_eq!(tokens[0].attr_str("params"), Some("rust"));
    }
}
