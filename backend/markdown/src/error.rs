use thiserror::Error;

/// Errors that abort a render. No partial tree is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("encountered unhandled token type {0}")]
    UnhandledTokenType(String),

    #[error("malformed token stream: {0}")]
    Malformed(#[from] MalformedTokenStream),

    #[error("block nesting exceeds the configured limit of {limit}")]
    NestingTooDeep { limit: usize },
}

/// Structural violations reported in strict mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedTokenStream {
    #[error("unexpected closer {found} (expected {})", .expected.as_deref().unwrap_or("no closer"))]
    UnexpectedCloser {
        found: String,
        expected: Option<String>,
    },

    #[error("{opener} reached end of input without {expected}")]
    Unclosed { opener: String, expected: String },
}
