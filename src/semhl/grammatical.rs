//! Grammatical override engine
//!
//!     The second stage of the engine walks the parse tree and, on every production
//!     exit, lets the language's [`RuleCatalog`] recognise grammar shapes (a class
//!     header name, a call target, a declarator list) and emit overrides for them.
//!
//!     The engine owns a single override buffer. It is cleared at the start of every
//!     walk and drained at its end, so nothing recorded for one file can leak into the
//!     next. Rules that cannot find the structure they expect emit nothing.

use super::overrides::OverrideSet;
use super::syntax::{walk, NodeRef, ParseTree, TreeListener};
use tracing::debug;

/// Per-language set of grammar rules.
pub trait RuleCatalog {
    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Called once per production, children before parents.
    fn on_exit(&self, node: NodeRef<'_>, overrides: &mut OverrideSet);
}

/// Produces the override set of one parse tree.
pub trait GrammaticalOverrideEngine {
    /// Discards any override recorded so far.
    fn reset(&mut self);

    /// Walks `tree` and returns every override its rules emitted.
    ///
    /// Implementations reset before walking and hand back a drained buffer.
    fn walk(&mut self, tree: &ParseTree) -> OverrideSet;
}

pub struct OverrideEngine<C> {
    catalog: C,
    buffer: OverrideSet,
}

impl<C: RuleCatalog> OverrideEngine<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            buffer: OverrideSet::new(),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Overrides recorded and not yet drained.
    pub fn pending(&self) -> &OverrideSet {
        &self.buffer
    }
}

impl<C: RuleCatalog> TreeListener for OverrideEngine<C> {
    fn exit_rule(&mut self, node: NodeRef<'_>) {
        self.catalog.on_exit(node, &mut self.buffer);
    }
}

impl<C: RuleCatalog> GrammaticalOverrideEngine for OverrideEngine<C> {
    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn walk(&mut self, tree: &ParseTree) -> OverrideSet {
        self.reset();
        walk(tree, self);
        let overrides = self.buffer.take();
        debug!(
            catalog = self.catalog.name(),
            nodes = tree.node_count(),
            overrides = overrides.len(),
            "grammatical walk finished"
        );
        overrides
    }
}
