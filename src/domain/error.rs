//! Error types for domain parsing and argument building.

use thiserror::Error;

/// Input does not conform to the domain grammar.
///
/// `position..end` is the zero-based byte range of the offending token; both
/// equal the input length when input ended early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid syntax at byte {position}: {message}")]
pub struct SyntaxError {
    pub position: usize,
    pub end: usize,
    pub message: String,
}

impl SyntaxError {
    pub(crate) fn new(position: usize, end: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            end,
            message: message.into(),
        }
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.position..self.end
    }
}

/// Errors raised while normalizing filters into RPC arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("filter argument must be a list, got {0}")]
    NotAList(String),

    #[error("invalid domain node at index {index}: {reason}")]
    InvalidNode { index: usize, reason: String },

    #[error("invalid term: {0}")]
    InvalidTerm(String),
}
