//! Concrete parse tree
//!
//! The tree is an arena of nodes addressed by [`NodeId`]. Production nodes carry a
//! [`RuleId`], terminal nodes carry the index of their [`Token`] in the token stream,
//! which also holds hidden-channel tokens (comments, directives) that never appear in
//! the tree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lexical token-type id, as assigned by the external lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenKind(pub u16);

impl TokenKind {
    /// Synthetic end-of-file token. Token streams report its type as -1.
    pub const EOF: TokenKind = TokenKind(u16::MAX);
}

/// Grammar production id, as assigned by the external parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub u16);

/// An inclusive character span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub stop: usize,
}

impl Span {
    pub fn new(start: usize, stop: usize) -> Self {
        Self { start, stop }
    }

    /// Number of characters covered; degenerate spans (`stop < start`) cover none.
    pub fn len(&self) -> usize {
        if self.stop < self.start {
            0
        } else {
            self.stop - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.stop)
    }
}

/// A token of the visible stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Rule(RuleId),
    Terminal(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Index of the first and last token beneath this node, if any.
    pub(crate) tokens: Option<(usize, usize)>,
}

/// A parsed file: its visible token stream plus the concrete tree over it.
#[derive(Debug, Clone)]
pub struct ParseTree {
    pub(crate) tokens: Vec<Token>,
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) root: NodeId,
    /// Innermost production enclosing each token, `None` for hidden tokens.
    pub(crate) token_parents: Vec<Option<RuleId>>,
}

impl ParseTree {
    /// The full visible token stream, in source order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Innermost production enclosing the token at `index`.
    pub fn parent_rule_of(&self, index: usize) -> Option<RuleId> {
        self.token_parents.get(index).copied().flatten()
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.node(self.root)
    }

    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// A cheap, copyable handle on a node of a [`ParseTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t ParseTree,
    id: NodeId,
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data().kind {
            NodeKind::Rule(rule) => write!(f, "Rule({}) #{}", rule.0, self.id.0),
            NodeKind::Terminal(index) => {
                write!(f, "Terminal({:?}) #{}", self.tree.tokens[index].text, self.id.0)
            }
        }
    }
}

impl<'t> NodeRef<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id.index()]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t ParseTree {
        self.tree
    }

    pub fn rule(&self) -> Option<RuleId> {
        match self.data().kind {
            NodeKind::Rule(rule) => Some(rule),
            NodeKind::Terminal(_) => None,
        }
    }

    pub fn is_rule(&self, rule: impl Into<RuleId>) -> bool {
        self.rule() == Some(rule.into())
    }

    pub fn is_any_rule(&self, rules: &[RuleId]) -> bool {
        self.rule().is_some_and(|rule| rules.contains(&rule))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.data().kind, NodeKind::Terminal(_))
    }

    pub fn token(&self) -> Option<&'t Token> {
        match self.data().kind {
            NodeKind::Terminal(index) => self.tree.tokens.get(index),
            NodeKind::Rule(_) => None,
        }
    }

    pub fn is_token(&self, kind: impl Into<TokenKind>) -> bool {
        let kind = kind.into();
        self.token().is_some_and(|token| token.kind == kind)
    }

    /// Text of a terminal, `None` for productions.
    pub fn text(&self) -> Option<&'t str> {
        self.token().map(|token| token.text.as_str())
    }

    /// Whether this is a terminal whose text is one of `texts`.
    pub fn is_text_any(&self, texts: &[&str]) -> bool {
        self.text().is_some_and(|text| texts.contains(&text))
    }

    pub fn parent(&self) -> Option<NodeRef<'t>> {
        self.data().parent.map(|id| self.tree.node(id))
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn child(&self, index: usize) -> Option<NodeRef<'t>> {
        self.data()
            .children
            .get(index)
            .map(|id| self.tree.node(*id))
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeRef<'t>> + 't {
        let tree = self.tree;
        self.data().children.iter().map(move |id| tree.node(*id))
    }

    /// Direct children that are productions of `rule`.
    pub fn children_of(&self, rule: impl Into<RuleId>) -> impl Iterator<Item = NodeRef<'t>> + 't {
        let rule = rule.into();
        self.children().filter(move |child| child.rule() == Some(rule))
    }

    /// First direct child that is a production of `rule`.
    pub fn first_child_of(&self, rule: impl Into<RuleId>) -> Option<NodeRef<'t>> {
        self.children_of(rule).next()
    }

    /// The `n`-th (zero based) direct child that is a production of `rule`.
    pub fn nth_child_of(&self, rule: impl Into<RuleId>, n: usize) -> Option<NodeRef<'t>> {
        self.children_of(rule).nth(n)
    }

    pub fn has_child_of(&self, rule: impl Into<RuleId>) -> bool {
        self.first_child_of(rule).is_some()
    }

    /// Every strict descendant that is a production of `rule`, in pre-order.
    pub fn descendants_of(&self, rule: impl Into<RuleId>) -> Vec<NodeRef<'t>> {
        let rule = rule.into();
        let mut found = Vec::new();
        let mut stack: Vec<NodeRef<'t>> = self.children().rev().collect();
        while let Some(node) = stack.pop() {
            if node.rule() == Some(rule) {
                found.push(node);
            }
            stack.extend(node.children().rev());
        }
        found
    }

    /// Inclusive character span of the tokens beneath this node.
    ///
    /// Productions that matched no tokens have no span.
    pub fn span(&self) -> Option<Span> {
        let (first, last) = self.data().tokens?;
        let start = self.tree.tokens.get(first)?.span.start;
        let stop = self.tree.tokens.get(last)?.span.stop;
        Some(Span::new(start, stop))
    }
}
