//! Grammatical overrides
//!
//! Overrides are keyed by the character offset they start at and a new override always
//! replaces an existing one at the same offset. Rules fire on production exit and the
//! walk is post-order, so an enclosing production registers after everything nested
//! in it: when two rules target the same offset, the outer rule wins.
//!
//! [`resolve`] applies a finished set onto the lexical base sequence, replacing the
//! category of each token whose start offset carries an override.

mod scan;

pub use scan::{Hit, Scan};

use super::annotation::Heta;
use super::hcode::HCode;
use super::syntax::{NodeRef, RuleId, Span};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Override {
    pub start: usize,
    pub stop: usize,
    pub hcode: HCode,
    /// Production whose rule emitted the override. Diagnostic only.
    pub origin: RuleId,
}

impl Override {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.stop)
    }
}

/// Overrides collected during one tree walk, at most one per start offset.
#[derive(Debug, Clone, Default)]
pub struct OverrideSet {
    by_start: HashMap<usize, Override>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `item`, returning the override it replaced.
    pub fn insert(&mut self, item: Override) -> Option<Override> {
        self.by_start.insert(item.start, item)
    }

    /// Overrides the whole span of `node`. Nodes without tokens are ignored.
    pub fn assign(&mut self, node: NodeRef<'_>, hcode: HCode, origin: impl Into<RuleId>) -> bool {
        let Some(span) = node.span() else {
            return false;
        };
        self.insert(Override {
            start: span.start,
            stop: span.stop,
            hcode,
            origin: origin.into(),
        });
        true
    }

    pub fn get(&self, start: usize) -> Option<&Override> {
        self.by_start.get(&start)
    }

    pub fn len(&self) -> usize {
        self.by_start.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_start.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_start.clear();
    }

    /// Moves every override out, leaving the set empty.
    pub fn take(&mut self) -> OverrideSet {
        std::mem::take(self)
    }

    /// Overrides in start-offset order.
    pub fn sorted(&self) -> Vec<Override> {
        let mut items: Vec<Override> = self.by_start.values().copied().collect();
        items.sort_by_key(|item| item.start);
        items
    }
}

impl Extend<Override> for OverrideSet {
    fn extend<T: IntoIterator<Item = Override>>(&mut self, iter: T) {
        for item in iter {
            self.insert(item);
        }
    }
}

/// Applies `overrides` onto the lexical base sequence.
///
/// Token count and order are preserved; only categories change.
pub fn resolve(base: Vec<Heta>, overrides: &OverrideSet) -> Vec<Heta> {
    base.into_iter()
        .map(|mut heta| {
            if let Some(item) = heta.span().and_then(|span| overrides.get(span.start)) {
                heta.hcode = item.hcode;
            }
            heta
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semhl::annotation::Eta;
    use crate::semhl::syntax::TokenKind;

    fn heta(start: i64, text: &str, hcode: HCode) -> Heta {
        Heta::new(
            Eta {
                start,
                stop: start + text.chars().count() as i64 - 1,
                text: text.to_string(),
                token_rule: TokenKind(0),
                parent_rule: None,
                symbolic_name: String::new(),
            },
            hcode,
        )
    }

    fn item(start: usize, stop: usize, hcode: HCode, origin: u16) -> Override {
        Override {
            start,
            stop,
            hcode,
            origin: RuleId(origin),
        }
    }

    #[test]
    fn test_later_insert_replaces() {
        let mut set = OverrideSet::new();
        assert!(set.insert(item(4, 6, HCode::TypeIdentifier, 1)).is_none());
        let replaced = set.insert(item(4, 9, HCode::ClassDeclarator, 2));
        assert_eq!(replaced.map(|o| o.hcode), Some(HCode::TypeIdentifier));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(4).map(|o| o.hcode), Some(HCode::ClassDeclarator));
    }

    #[test]
    fn test_resolve_replaces_by_start_offset_only() {
        let base = vec![
            heta(0, "int", HCode::Keyword),
            heta(4, "x", HCode::Any),
            heta(6, "=", HCode::Any),
        ];
        let mut set = OverrideSet::new();
        set.insert(item(4, 4, HCode::VariableDeclarator, 1));
        set.insert(item(5, 5, HCode::FieldIdentifier, 1));

        let resolved = resolve(base.clone(), &set);
        assert_eq!(resolved.len(), base.len());
        let codes: Vec<_> = resolved.iter().map(|h| h.hcode).collect();
        assert_eq!(codes, vec![HCode::Keyword, HCode::VariableDeclarator, HCode::Any]);
        assert_eq!(resolved[1].eta, base[1].eta);
    }

    #[test]
    fn test_take_drains_the_set() {
        let mut set = OverrideSet::new();
        set.extend([item(0, 0, HCode::Keyword, 1), item(2, 3, HCode::Literal, 1)]);
        let taken = set.take();
        assert!(set.is_empty());
        assert_eq!(
            taken.sorted().iter().map(|o| o.start).collect::<Vec<_>>(),
            vec![0, 2]
        );
    }
}
