//! Block opener/closer pairing.
//!
//! Maps every `<name>_open` token type to its `<name>_close` counterpart. The
//! map doubles as the "is this an opener?" membership test.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::token::KNOWN_TOKEN_TYPES;

static OPEN_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)_open$").expect("static pattern"));

/// Pairs derived from the full Remarkable token vocabulary.
pub static STANDARD_PAIRS: LazyLock<BlockPairs> =
    LazyLock::new(|| BlockPairs::from_types(KNOWN_TOKEN_TYPES.iter().copied()));

#[derive(Debug, Clone, Default)]
pub struct BlockPairs {
    open_to_close: HashMap<String, String>,
    closers: HashSet<String>,
}

impl BlockPairs {
    /// Derive the pairs from a tokenizer's type vocabulary. Names without an
    /// `_open` suffix are ignored; the closer need not appear in `types`.
    pub fn from_types<'a>(types: impl IntoIterator<Item = &'a str>) -> Self {
        let mut pairs = Self::default();
        for kind in types {
            if let Some(caps) = OPEN_TOKEN_RE.captures(kind) {
                let close = format!("{}_close", &caps[1]);
                pairs.closers.insert(close.clone());
                pairs.open_to_close.insert(kind.to_string(), close);
            }
        }
        pairs
    }

    /// The closer expected after `kind`, if `kind` opens a block.
    pub fn close_for(&self, kind: &str) -> Option<&str> {
        self.open_to_close.get(kind).map(String::as_str)
    }

    pub fn is_closer(&self, kind: &str) -> bool {
        self.closers.contains(kind)
    }

    pub fn len(&self) -> usize {
        self.open_to_close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open_to_close.is_empty()
    }
}
