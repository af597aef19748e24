//! Lexical classification
//!
//!     The first stage of the engine maps every token, in isolation, to a highlight
//!     category through a fixed per-language table. Tables are assembled from ordered
//!     buckets: a token kind listed in more than one bucket keeps the category of the
//!     bucket added first. Kinds absent from every bucket are ANY.
//!
//!     Two refinements sit on top of the bucket table and are switched on by the
//!     [`LexicalMode`]:
//!
//!         - soft keywords: contextual keywords keep their table category only when the
//!           parser consumed them as an identifier, otherwise they are KEYWORD
//!         - preprocessing: directive tokens are highlighted like comments
//!
//!     Which mode a language runs with is a configuration decision, see
//!     [config](crate::semhl::config).

use super::annotation::{Eta, Heta};
use super::hcode::HCode;
use super::syntax::{RuleId, TokenKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LexicalMode {
    #[default]
    Plain,
    SemiLexical,
    Preprocessing,
}

impl LexicalMode {
    fn uses_soft_keywords(self) -> bool {
        matches!(self, LexicalMode::SemiLexical | LexicalMode::Preprocessing)
    }
}

impl fmt::Display for LexicalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LexicalMode::Plain => "plain",
            LexicalMode::SemiLexical => "semi-lexical",
            LexicalMode::Preprocessing => "preprocessing",
        };
        f.write_str(name)
    }
}

impl FromStr for LexicalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(LexicalMode::Plain),
            "semi-lexical" => Ok(LexicalMode::SemiLexical),
            "preprocessing" => Ok(LexicalMode::Preprocessing),
            other => Err(format!(
                "unknown lexical mode '{}', expected plain, semi-lexical or preprocessing",
                other
            )),
        }
    }
}

/// Token kind to category table of one language.
#[derive(Debug, Clone, Default)]
pub struct LexicalTable {
    categories: HashMap<TokenKind, HCode>,
    identifier_rule: Option<RuleId>,
    soft_keywords: HashSet<TokenKind>,
    directives: HashMap<TokenKind, HCode>,
}

impl LexicalTable {
    pub fn builder() -> LexicalTableBuilder {
        LexicalTableBuilder::default()
    }

    /// Category from the bucket table alone.
    pub fn lookup(&self, kind: TokenKind) -> HCode {
        self.categories.get(&kind).copied().unwrap_or(HCode::Any)
    }

    pub fn classify(&self, eta: Eta, mode: LexicalMode) -> Heta {
        let hcode = self.category_of(&eta, mode);
        Heta::new(eta, hcode)
    }

    fn category_of(&self, eta: &Eta, mode: LexicalMode) -> HCode {
        let plain = self.lookup(eta.token_rule);
        if !mode.uses_soft_keywords() {
            return plain;
        }
        let refined = if self.soft_keywords.contains(&eta.token_rule)
            && eta.parent_rule != self.identifier_rule
        {
            HCode::Keyword
        } else {
            plain
        };
        if mode == LexicalMode::Preprocessing {
            if let Some(hcode) = self.directives.get(&eta.token_rule) {
                return *hcode;
            }
        }
        refined
    }
}

#[derive(Debug, Default)]
pub struct LexicalTableBuilder {
    table: LexicalTable,
}

impl LexicalTableBuilder {
    /// Adds a bucket; kinds already present keep their earlier category.
    pub fn bucket<I, K>(mut self, hcode: HCode, kinds: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<TokenKind>,
    {
        for kind in kinds {
            self.table.categories.entry(kind.into()).or_insert(hcode);
        }
        self
    }

    /// Contextual keywords, left alone when their parent production is `identifier_rule`.
    pub fn soft_keywords<I, K>(mut self, identifier_rule: impl Into<RuleId>, kinds: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<TokenKind>,
    {
        self.table.identifier_rule = Some(identifier_rule.into());
        self.table
            .soft_keywords
            .extend(kinds.into_iter().map(Into::into));
        self
    }

    /// Directive tokens, reclassified as `hcode` in [`LexicalMode::Preprocessing`].
    pub fn directives<I, K>(mut self, hcode: HCode, kinds: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<TokenKind>,
    {
        for kind in kinds {
            self.table.directives.insert(kind.into(), hcode);
        }
        self
    }

    pub fn build(self) -> LexicalTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IF: TokenKind = TokenKind(1);
    const TRUE: TokenKind = TokenKind(2);
    const ASYNC: TokenKind = TokenKind(3);
    const HASH_IF: TokenKind = TokenKind(4);
    const IDENT_RULE: RuleId = RuleId(7);

    fn table() -> LexicalTable {
        LexicalTable::builder()
            .bucket(HCode::Keyword, [IF, TRUE])
            .bucket(HCode::Literal, [TRUE])
            .soft_keywords(IDENT_RULE, [ASYNC])
            .directives(HCode::Comment, [HASH_IF])
            .build()
    }

    fn eta(kind: TokenKind, parent: Option<RuleId>) -> Eta {
        Eta {
            start: 0,
            stop: 0,
            text: "t".to_string(),
            token_rule: kind,
            parent_rule: parent,
            symbolic_name: String::new(),
        }
    }

    #[test]
    fn test_first_bucket_wins() {
        assert_eq!(table().lookup(TRUE), HCode::Keyword);
        assert_eq!(table().lookup(TokenKind(99)), HCode::Any);
    }

    #[test]
    fn test_soft_keywords_depend_on_parent_rule() {
        let table = table();
        let as_ident = table.classify(eta(ASYNC, Some(IDENT_RULE)), LexicalMode::SemiLexical);
        assert_eq!(as_ident.hcode, HCode::Any);
        let as_keyword = table.classify(eta(ASYNC, Some(RuleId(1))), LexicalMode::SemiLexical);
        assert_eq!(as_keyword.hcode, HCode::Keyword);
        let plain = table.classify(eta(ASYNC, Some(RuleId(1))), LexicalMode::Plain);
        assert_eq!(plain.hcode, HCode::Any);
    }

    #[test]
    fn test_directives_only_in_preprocessing_mode() {
        let table = table();
        assert_eq!(
            table.classify(eta(HASH_IF, None), LexicalMode::SemiLexical).hcode,
            HCode::Any
        );
        assert_eq!(
            table.classify(eta(HASH_IF, None), LexicalMode::Preprocessing).hcode,
            HCode::Comment
        );
    }

    #[test]
    fn test_mode_names_round_trip() {
        for mode in [
            LexicalMode::Plain,
            LexicalMode::SemiLexical,
            LexicalMode::Preprocessing,
        ] {
            assert_eq!(mode.to_string().parse::<LexicalMode>(), Ok(mode));
        }
        assert!("lexical".parse::<LexicalMode>().is_err());
    }
}
