//! Render entry points.
//!
//! The integration hook a markdown pipeline calls with its finished token
//! stream in place of a string renderer.

use tracing::debug;

use crate::blocks::{BlockPairs, STANDARD_PAIRS};
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::node::Node;
use crate::reducer::{NestingStack, Reducer};
use crate::rules::{RuleTable, STANDARD_RULES};
use crate::token::Token;

/// Render with the standard rules and the default (strict) config.
pub fn render(tokens: &[Token]) -> Result<Vec<Node>, RenderError> {
    render_with(&STANDARD_RULES, &STANDARD_PAIRS, &RenderConfig::default(), tokens)
}

pub fn render_with(
    rules: &RuleTable,
    pairs: &BlockPairs,
    config: &RenderConfig,
    tokens: &[Token],
) -> Result<Vec<Node>, RenderError> {
    debug!(tokens = tokens.len(), strict = config.strict, "Rendering token stream");

    let reducer = Reducer::new(rules, pairs, config);
    let mut stack = NestingStack::new();
    // Anything left after the top-level call is dropped; with an empty
    // stack nothing can be.
    let reduction = reducer.reduce(tokens, &mut stack)?;

    debug!(nodes = reduction.nodes.len(), "Rendered token stream");
    Ok(reduction.nodes)
}

/// A configured renderer owning its rule table, block pairs and config.
#[derive(Debug, Clone)]
pub struct Renderer {
    pub rules: RuleTable,
    pub pairs: BlockPairs,
    pub config: RenderConfig,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            rules: STANDARD_RULES.clone(),
            pairs: STANDARD_PAIRS.clone(),
            config,
        }
    }

    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_pairs(mut self, pairs: BlockPairs) -> Self {
        self.pairs = pairs;
        self
    }

    pub fn render(&self, tokens: &[Token]) -> Result<Vec<Node>, RenderError> {
        render_with(&self.rules, &self.pairs, &self.config, tokens)
    }
}
