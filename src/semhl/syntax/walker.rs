//! Depth-first tree walk with enter/exit notifications

use super::tree::{NodeRef, ParseTree};

/// Receives notifications while a [`ParseTree`] is walked.
///
/// `exit_rule` for a node fires after every notification of its subtree.
pub trait TreeListener {
    fn enter_rule(&mut self, _node: NodeRef<'_>) {}

    fn exit_rule(&mut self, _node: NodeRef<'_>) {}

    fn visit_terminal(&mut self, _node: NodeRef<'_>) {}
}

enum Step<'t> {
    Enter(NodeRef<'t>),
    Exit(NodeRef<'t>),
}

/// Walks the whole tree left to right.
///
/// Iterative, so deeply nested expressions cannot overflow the stack.
pub fn walk<L: TreeListener + ?Sized>(tree: &ParseTree, listener: &mut L) {
    let mut stack = vec![Step::Enter(tree.root())];
    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(node) if node.is_terminal() => listener.visit_terminal(node),
            Step::Enter(node) => {
                listener.enter_rule(node);
                stack.push(Step::Exit(node));
                stack.extend(node.children().rev().map(Step::Enter));
            }
            Step::Exit(node) => listener.exit_rule(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semhl::syntax::{RuleId, TokenKind, TreeBuilder};

    #[derive(Default)]
    struct Trace(Vec<String>);

    impl TreeListener for Trace {
        fn enter_rule(&mut self, node: NodeRef<'_>) {
            self.0.push(format!("enter {}", node.rule().map_or(0, |r| r.0)));
        }

        fn exit_rule(&mut self, node: NodeRef<'_>) {
            self.0.push(format!("exit {}", node.rule().map_or(0, |r| r.0)));
        }

        fn visit_terminal(&mut self, node: NodeRef<'_>) {
            self.0.push(node.text().unwrap_or_default().to_string());
        }
    }

    #[test]
    fn test_exits_are_post_order() {
        let mut builder = TreeBuilder::new("a b");
        builder
            .start(RuleId(1))
            .start(RuleId(2))
            .token(TokenKind(0), "a")
            .finish_node()
            .start(RuleId(3))
            .token(TokenKind(0), "b")
            .finish_node()
            .finish_node();
        let tree = builder.finish().unwrap();

        let mut trace = Trace::default();
        walk(&tree, &mut trace);
        assert_eq!(
            trace.0,
            vec!["enter 1", "enter 2", "a", "exit 2", "enter 3", "b", "exit 3", "exit 1"]
        );
    }

    #[test]
    fn test_deep_trees_do_not_recurse() {
        let depth = 50_000;
        let mut builder = TreeBuilder::new("x");
        for _ in 0..depth {
            builder.start(RuleId(7));
        }
        builder.token(TokenKind(0), "x");
        for _ in 0..depth {
            builder.finish_node();
        }
        let tree = builder.finish().unwrap();

        struct Count(usize);
        impl TreeListener for Count {
            fn exit_rule(&mut self, _node: NodeRef<'_>) {
                self.0 += 1;
            }
        }
        let mut count = Count(0);
        walk(&tree, &mut count);
        assert_eq!(count.0, depth);
    }
}
