//! Incremental construction of a [`ParseTree`]
//!
//! Parser adapters replay their parse as a sequence of `start` / `token` / `finish_node`
//! calls. Token texts are located in the source by skipping whitespace from the cursor,
//! so adapters never have to compute character offsets themselves. Adapters that already
//! know the offsets can hand over located tokens through [`TreeBuilder::terminal`].
//!
//! The first error is kept and every later call becomes a no-op; [`TreeBuilder::finish`]
//! reports it.

use super::tree::{NodeData, NodeId, NodeKind, ParseTree, RuleId, Span, Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("token {text:?} does not match the source at offset {offset}")]
    TokenMismatch { text: String, offset: usize },
    #[error("empty token text at offset {offset}")]
    EmptyToken { offset: usize },
    #[error("token {text:?} appears outside of any production")]
    TokenOutsideNode { text: String },
    #[error("token at offset {start} starts before the previous token ends (cursor {cursor})")]
    OutOfOrder { start: usize, cursor: usize },
    #[error("token span {span} exceeds the source length {len}")]
    OutOfBounds { span: Span, len: usize },
    #[error("{open} production(s) left open")]
    Unbalanced { open: usize },
    #[error("finish_node called with no open production")]
    FinishWithoutStart,
    #[error("no production was started")]
    NoRoot,
    #[error("a second root production was started")]
    MultipleRoots,
}

pub struct TreeBuilder {
    chars: Vec<char>,
    cursor: usize,
    tokens: Vec<Token>,
    token_parents: Vec<Option<RuleId>>,
    nodes: Vec<NodeData>,
    open: Vec<NodeId>,
    root: Option<NodeId>,
    error: Option<BuildError>,
}

impl TreeBuilder {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            cursor: 0,
            tokens: Vec::new(),
            token_parents: Vec::new(),
            nodes: Vec::new(),
            open: Vec::new(),
            root: None,
            error: None,
        }
    }

    /// Opens a production; it becomes the parent of everything added until the
    /// matching [`finish_node`](Self::finish_node).
    pub fn start(&mut self, rule: impl Into<RuleId>) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        let parent = self.open.last().copied();
        if parent.is_none() && self.root.is_some() {
            return self.fail(BuildError::MultipleRoots);
        }
        let id = self.push_node(NodeKind::Rule(rule.into()), parent);
        if parent.is_none() {
            self.root = Some(id);
        }
        self.open.push(id);
        self
    }

    /// Adds a visible terminal to the open production.
    pub fn token(&mut self, kind: impl Into<TokenKind>, text: &str) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        match self.locate(kind.into(), text) {
            Ok(token) => self.add_terminal(token),
            Err(error) => self.fail(error),
        }
    }

    /// Adds a hidden-channel token (comment, directive). It joins the token stream
    /// but not the tree.
    pub fn hidden(&mut self, kind: impl Into<TokenKind>, text: &str) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        match self.locate(kind.into(), text) {
            Ok(token) => self.add_hidden(token),
            Err(error) => self.fail(error),
        }
    }

    /// Adds an already located visible terminal.
    pub fn terminal(&mut self, token: Token) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        match self.check_located(&token) {
            Ok(()) => self.add_terminal(token),
            Err(error) => self.fail(error),
        }
    }

    /// Adds an already located hidden-channel token.
    pub fn hidden_token(&mut self, token: Token) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        match self.check_located(&token) {
            Ok(()) => self.add_hidden(token),
            Err(error) => self.fail(error),
        }
    }

    pub fn finish_node(&mut self) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        let Some(id) = self.open.pop() else {
            return self.fail(BuildError::FinishWithoutStart);
        };
        let node = &self.nodes[id.index()];
        let first = node
            .children
            .iter()
            .find_map(|child| self.nodes[child.index()].tokens)
            .map(|(first, _)| first);
        let last = node
            .children
            .iter()
            .rev()
            .find_map(|child| self.nodes[child.index()].tokens)
            .map(|(_, last)| last);
        self.nodes[id.index()].tokens = first.zip(last);
        self
    }

    pub fn finish(self) -> Result<ParseTree, BuildError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if !self.open.is_empty() {
            return Err(BuildError::Unbalanced {
                open: self.open.len(),
            });
        }
        let root = self.root.ok_or(BuildError::NoRoot)?;
        Ok(ParseTree {
            tokens: self.tokens,
            nodes: self.nodes,
            root,
            token_parents: self.token_parents,
        })
    }

    fn fail(&mut self, error: BuildError) -> &mut Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }

    fn push_node(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let tokens = match kind {
            NodeKind::Terminal(index) => Some((index, index)),
            NodeKind::Rule(_) => None,
        };
        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
            tokens,
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    fn locate(&mut self, kind: TokenKind, text: &str) -> Result<Token, BuildError> {
        while self
            .chars
            .get(self.cursor)
            .is_some_and(|c| c.is_whitespace())
        {
            self.cursor += 1;
        }
        let start = self.cursor;
        let len = text.chars().count();
        if len == 0 {
            return Err(BuildError::EmptyToken { offset: start });
        }
        let matches = self
            .chars
            .get(start..start + len)
            .is_some_and(|window| window.iter().copied().eq(text.chars()));
        if !matches {
            return Err(BuildError::TokenMismatch {
                text: text.to_string(),
                offset: start,
            });
        }
        self.cursor = start + len;
        Ok(Token {
            kind,
            span: Span::new(start, start + len - 1),
            text: text.to_string(),
        })
    }

    fn check_located(&mut self, token: &Token) -> Result<(), BuildError> {
        if token.span.is_empty() {
            return Err(BuildError::EmptyToken {
                offset: token.span.start,
            });
        }
        if token.span.start < self.cursor {
            return Err(BuildError::OutOfOrder {
                start: token.span.start,
                cursor: self.cursor,
            });
        }
        if token.span.stop >= self.chars.len() {
            return Err(BuildError::OutOfBounds {
                span: token.span,
                len: self.chars.len(),
            });
        }
        self.cursor = token.span.stop + 1;
        Ok(())
    }

    fn add_terminal(&mut self, token: Token) -> &mut Self {
        let Some(parent) = self.open.last().copied() else {
            return self.fail(BuildError::TokenOutsideNode { text: token.text });
        };
        let index = self.tokens.len();
        let parent_rule = match self.nodes[parent.index()].kind {
            NodeKind::Rule(rule) => Some(rule),
            NodeKind::Terminal(_) => None,
        };
        self.tokens.push(token);
        self.token_parents.push(parent_rule);
        self.push_node(NodeKind::Terminal(index), Some(parent));
        self
    }

    fn add_hidden(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self.token_parents.push(None);
        self
    }
}
