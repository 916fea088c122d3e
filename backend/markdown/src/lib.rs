//! Markdown token stream → element tree renderer.
//!
//! Takes the flat token sequence a Remarkable-style markdown tokenizer emits
//! and rebuilds the nested element tree (tag, attributes, children) a UI
//! layer can serialize, driven by a stack of pending closers and a table of
//! per-token-type rules.

pub mod blocks;
pub mod cmark;
pub mod config;
pub mod error;
pub mod markup;
pub mod node;
pub mod reducer;
pub mod renderer;
pub mod rules;
pub mod token;

pub use blocks::{BlockPairs, STANDARD_PAIRS};
pub use cmark::{render_markdown, tokens_from_markdown};
pub use config::{RenderConfig, ValidationReport, load_config, validate};
pub use error::{MalformedTokenStream, RenderError};
pub use markup::{to_markup, to_plain_text};
pub use node::{Attributes, Element, Node};
pub use reducer::{NestingStack, Reducer, Reduction};
pub use renderer::{Renderer, render, render_with};
pub use rules::{Builder, Rule, RuleTable, STANDARD_RULES};
pub use token::{KNOWN_TOKEN_TYPES, Token};
