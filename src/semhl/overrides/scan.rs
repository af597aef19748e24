//! Descendant scans
//!
//! Most rules have the same shape: look beneath the production that just exited for
//! a given sub-production or token kind and override it. A [`Scan`] searches the
//! strict descendants of a node in pre-order, children left to right (right to left
//! when reversed). Every match is offered to a callback:
//!
//!   - `Some(hcode)`: the match's span is overridden and its subtree is not entered;
//!     a first-only scan ends here
//!   - `None`: the scan descends into the match

use super::{Override, OverrideSet};
use crate::semhl::hcode::HCode;
use crate::semhl::syntax::{NodeRef, RuleId, TokenKind};

/// A node matched by a [`Scan`].
#[derive(Debug, Clone, Copy)]
pub enum Hit<'t> {
    Production(NodeRef<'t>),
    Terminal(NodeRef<'t>),
}

impl<'t> Hit<'t> {
    pub fn node(&self) -> NodeRef<'t> {
        match self {
            Hit::Production(node) | Hit::Terminal(node) => *node,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scan {
    productions: Vec<RuleId>,
    terminal: Option<TokenKind>,
    reversed: bool,
    first_only: bool,
}

impl Scan {
    pub fn production(rule: impl Into<RuleId>) -> Self {
        Self {
            productions: vec![rule.into()],
            ..Self::default()
        }
    }

    pub fn productions<I, R>(rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RuleId>,
    {
        Self {
            productions: rules.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn terminal(kind: impl Into<TokenKind>) -> Self {
        Self {
            terminal: Some(kind.into()),
            ..Self::default()
        }
    }

    /// Also matches terminals of `kind`.
    pub fn or_terminal(mut self, kind: impl Into<TokenKind>) -> Self {
        self.terminal = Some(kind.into());
        self
    }

    /// Visits children right to left.
    pub fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    /// Ends the scan after the first override it inserts.
    pub fn first_only(mut self) -> Self {
        self.first_only = true;
        self
    }

    fn hit<'t>(&self, node: NodeRef<'t>) -> Option<Hit<'t>> {
        if let Some(kind) = self.terminal {
            if node.is_token(kind) {
                return Some(Hit::Terminal(node));
            }
        }
        if node.is_any_rule(&self.productions) {
            return Some(Hit::Production(node));
        }
        None
    }

    fn push_children<'t>(&self, stack: &mut Vec<NodeRef<'t>>, node: NodeRef<'t>) {
        // The stack pops from the back, so the first child to visit goes last.
        if self.reversed {
            stack.extend(node.children());
        } else {
            stack.extend(node.children().rev());
        }
    }

    /// Scans beneath `root`, overriding every match `on_hit` accepts.
    ///
    /// Returns how many overrides were inserted.
    pub fn run<'t, F>(
        &self,
        root: NodeRef<'t>,
        overrides: &mut OverrideSet,
        origin: impl Into<RuleId>,
        mut on_hit: F,
    ) -> usize
    where
        F: FnMut(Hit<'t>) -> Option<HCode>,
    {
        let origin = origin.into();
        let mut inserted = 0;
        let mut stack = Vec::new();
        self.push_children(&mut stack, root);

        while let Some(node) = stack.pop() {
            let Some(hit) = self.hit(node) else {
                self.push_children(&mut stack, node);
                continue;
            };
            let Some(hcode) = on_hit(hit) else {
                self.push_children(&mut stack, node);
                continue;
            };
            if let Some(span) = node.span() {
                overrides.insert(Override {
                    start: span.start,
                    stop: span.stop,
                    hcode,
                    origin,
                });
                inserted += 1;
                if self.first_only {
                    break;
                }
            }
        }
        inserted
    }

    /// Overrides every match with `hcode`.
    pub fn assign(
        &self,
        root: NodeRef<'_>,
        overrides: &mut OverrideSet,
        origin: impl Into<RuleId>,
        hcode: HCode,
    ) -> usize {
        self.run(root, overrides, origin, |_| Some(hcode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semhl::syntax::{ParseTree, TreeBuilder};

    const LIST: RuleId = RuleId(1);
    const ITEM: RuleId = RuleId(2);
    const NAME: TokenKind = TokenKind(1);
    const COMMA: TokenKind = TokenKind(2);

    /// `a, b, c` as list(item(a) , item(b) , item(c)), with `c` nested one level deeper.
    fn list() -> ParseTree {
        let mut builder = TreeBuilder::new("a, b, c");
        builder
            .start(LIST)
            .start(ITEM)
            .token(NAME, "a")
            .finish_node()
            .token(COMMA, ",")
            .start(ITEM)
            .token(NAME, "b")
            .finish_node()
            .token(COMMA, ",")
            .start(ITEM)
            .start(ITEM)
            .token(NAME, "c")
            .finish_node()
            .finish_node()
            .finish_node();
        builder.finish().unwrap()
    }

    fn starts(set: &OverrideSet) -> Vec<usize> {
        set.sorted().iter().map(|o| o.start).collect()
    }

    #[test]
    fn test_all_matches_without_reentering() {
        let tree = list();
        let mut set = OverrideSet::new();
        let count = Scan::production(ITEM).assign(tree.root(), &mut set, LIST, HCode::Literal);
        assert_eq!(count, 3);
        assert_eq!(starts(&set), vec![0, 3, 6]);
    }

    #[test]
    fn test_first_and_last_terminal() {
        let tree = list();
        let mut first = OverrideSet::new();
        Scan::terminal(NAME)
            .first_only()
            .assign(tree.root(), &mut first, LIST, HCode::Keyword);
        assert_eq!(starts(&first), vec![0]);

        let mut last = OverrideSet::new();
        Scan::terminal(NAME)
            .reversed()
            .first_only()
            .assign(tree.root(), &mut last, LIST, HCode::Keyword);
        assert_eq!(starts(&last), vec![6]);
    }

    #[test]
    fn test_declined_matches_are_descended() {
        let tree = list();
        let mut set = OverrideSet::new();
        let mut seen = 0;
        Scan::production(ITEM).or_terminal(NAME).run(tree.root(), &mut set, LIST, |hit| {
            seen += 1;
            match hit {
                Hit::Production(_) => None,
                Hit::Terminal(node) if node.text() == Some("c") => Some(HCode::Comment),
                Hit::Terminal(_) => None,
            }
        });
        // three outer items, the nested item and three names
        assert_eq!(seen, 7);
        assert_eq!(starts(&set), vec![6]);
    }

    #[test]
    fn test_scan_excludes_the_root_itself() {
        let tree = list();
        let mut set = OverrideSet::new();
        let count = Scan::production(LIST).assign(tree.root(), &mut set, LIST, HCode::Any);
        assert_eq!(count, 0);
        assert!(set.is_empty());
    }
}
