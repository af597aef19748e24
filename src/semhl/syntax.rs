//! Parser-facing interface
//!
//!     The grammars and parsers are external collaborators. What this crate needs from them
//!     is small: the visible token stream of a file, in source order, and a concrete parse
//!     tree whose terminals point into that stream. Adapters over a real parser produce both
//!     through [`TreeBuilder`]; the rest of the crate only reads the resulting [`ParseTree`].
//!
//! Offsets
//!
//!     Every span in this module counts `char`s (Unicode scalar values) of the source text
//!     and is inclusive on both ends, mirroring how token streams report start/stop indices.
//!
//! Walking
//!
//!     [`walk`] drives a [`TreeListener`] over the tree. Exit notifications fire strictly
//!     post-order (children before parents). The grammatical override engine depends on
//!     that ordering for its precedence policy, see
//!     [overrides](crate::semhl::overrides).

pub mod builder;
pub mod tree;
pub mod walker;

pub use builder::{BuildError, TreeBuilder};
pub use tree::{NodeId, NodeRef, ParseTree, RuleId, Span, Token, TokenKind};
pub use walker::{walk, TreeListener};

use thiserror::Error;

/// The external parser failed to produce a tree for a file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse source: {message}")]
pub struct ParseFailure {
    pub message: String,
}

impl ParseFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<BuildError> for ParseFailure {
    fn from(error: BuildError) -> Self {
        Self::new(error.to_string())
    }
}

/// Adapter over an external grammar.
///
/// Implementations lex and parse `source` and return the visible token stream together
/// with the concrete tree. Failing to do so is reported, never panicked on.
pub trait SourceParser {
    fn parse(&self, source: &str) -> Result<ParseTree, ParseFailure>;
}
