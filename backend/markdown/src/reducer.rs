//! Token stream → element tree reduction.
//!
//! Walks the flat token sequence depth-first. An opener pushes its expected
//! closer onto a [`NestingStack`] and recursively reduces the following
//! tokens until that closer shows up on top of the stack; the collected
//! children are then handed to the rule table to build one node, and the
//! walk resumes after the closer. `inline` tokens are reduced with a fresh
//! stack and spliced into the current sibling list. `text` tokens become
//! text nodes. Anything else is a leaf rendered through the rule table.
//!
//! Only the top of the stack is ever compared against a token: a closer for
//! an enclosing block is never matched early. In strict mode such a closer
//! is rejected; in permissive mode it falls through to the rule lookup.

use tracing::{trace, warn};

use crate::blocks::BlockPairs;
use crate::config::RenderConfig;
use crate::error::{MalformedTokenStream, RenderError};
use crate::node::Node;
use crate::rules::RuleTable;
use crate::token::{INLINE, TEXT, Token};

/// Expected closer types, innermost last.
#[derive(Debug, Default, Clone)]
pub struct NestingStack<'p> {
    expected: Vec<&'p str>,
}

impl<'p> NestingStack<'p> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, close: &'p str) {
        self.expected.push(close);
    }

    pub fn pop(&mut self) -> Option<&'p str> {
        self.expected.pop()
    }

    pub fn top(&self) -> Option<&'p str> {
        self.expected.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.expected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }
}

/// Outcome of one reduction call.
#[derive(Debug)]
pub struct Reduction<'t> {
    pub nodes: Vec<Node>,
    /// Tokens following the closer that ended this call.
    pub rest: &'t [Token],
    /// `true` if the call stopped on the closer at the top of the stack,
    /// `false` if it ran out of input.
    pub closed: bool,
}

pub struct Reducer<'r> {
    rules: &'r RuleTable,
    pairs: &'r BlockPairs,
    config: &'r RenderConfig,
}

impl<'r> Reducer<'r> {
    pub fn new(rules: &'r RuleTable, pairs: &'r BlockPairs, config: &'r RenderConfig) -> Self {
        Self {
            rules,
            pairs,
            config,
        }
    }

    /// Reduce `tokens` into siblings until the closer on top of `stack` or
    /// the end of input. `stack` is left as it was found.
    pub fn reduce<'t>(
        &self,
        tokens: &'t [Token],
        stack: &mut NestingStack<'r>,
    ) -> Result<Reduction<'t>, RenderError> {
        let depth = stack.depth();
        self.reduce_at(tokens, stack, depth)
    }

    fn reduce_at<'t>(
        &self,
        mut tokens: &'t [Token],
        stack: &mut NestingStack<'r>,
        depth: usize,
    ) -> Result<Reduction<'t>, RenderError> {
        if depth > self.config.max_depth {
            return Err(RenderError::NestingTooDeep {
                limit: self.config.max_depth,
            });
        }

        let mut acc = Vec::new();

        while let Some((cur, rest)) = tokens.split_first() {
            tokens = rest;

            if let Some(close) = self.pairs.close_for(&cur.kind) {
                stack.push(close);
                trace!(opener = %cur.kind, depth = depth + 1, "open block");

                let block = self
                    .reduce_at(rest, stack, depth + 1)
                    .and_then(|inner| self.close_block(cur, close, inner));
                // Restore the enclosing expectation before any error escapes.
                stack.pop();

                let (node, after) = block?;
                acc.push(node);
                tokens = after;
            } else if stack.top() == Some(cur.kind.as_str()) {
                trace!(closer = %cur.kind, "close block");
                return Ok(Reduction {
                    nodes: acc,
                    rest,
                    closed: true,
                });
            } else if cur.kind == INLINE {
                // Inline runs never close an outer block.
                let mut inline_stack = NestingStack::new();
                let inner = self.reduce_at(cur.children(), &mut inline_stack, depth + 1)?;
                acc.extend(inner.nodes);
            } else if cur.kind == TEXT {
                acc.push(Node::text(cur.content.clone().unwrap_or_default()));
            } else if self.config.strict && self.pairs.is_closer(&cur.kind) {
                return Err(MalformedTokenStream::UnexpectedCloser {
                    found: cur.kind.clone(),
                    expected: stack.top().map(str::to_string),
                }
                .into());
            } else {
                acc.push(self.rules.apply(cur, Vec::new())?);
            }
        }

        Ok(Reduction {
            nodes: acc,
            rest: tokens,
            closed: false,
        })
    }

    /// Build the node for `opener` from its reduced body.
    fn close_block<'t>(
        &self,
        opener: &Token,
        close: &str,
        inner: Reduction<'t>,
    ) -> Result<(Node, &'t [Token]), RenderError> {
        if !inner.closed {
            if self.config.strict {
                return Err(MalformedTokenStream::Unclosed {
                    opener: opener.kind.clone(),
                    expected: close.to_string(),
                }
                .into());
            }
            warn!(opener = %opener.kind, expected = close, "closing block at end of input");
        }

        let node = self.rules.apply(opener, inner.nodes)?;
        Ok((node, inner.rest))
    }
}
