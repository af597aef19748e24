//! Enriched and highlighted token annotations
//!
//! An [`Eta`] is one token of the visible stream together with its grammar context.
//! A [`Heta`] pairs it with the category it was finally assigned. Both serialize to the
//! camelCase JSON layout used by oracle files.

use super::hcode::HCode;
use super::syntax::{ParseTree, RuleId, Span, TokenKind};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Enriched Token Annotation.
///
/// Offsets are signed: token streams report synthetic tokens (EOF, tokens conjured by
/// error recovery) with negative indices. Such tokens have no [`span`](Eta::span).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eta {
    #[serde(rename = "startIndex")]
    pub start: i64,
    #[serde(rename = "stopIndex")]
    pub stop: i64,
    pub text: String,
    #[serde(deserialize_with = "kind_or_eof", serialize_with = "signed_kind")]
    pub token_rule: TokenKind,
    #[serde(
        default,
        deserialize_with = "rule_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_rule: Option<RuleId>,
    #[serde(default)]
    pub symbolic_name: String,
}

impl Eta {
    /// Source span of the token, `None` when either offset is negative.
    pub fn span(&self) -> Option<Span> {
        let start = usize::try_from(self.start).ok()?;
        let stop = usize::try_from(self.stop).ok()?;
        Some(Span::new(start, stop))
    }

    /// Number of characters of the token text.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

fn kind_or_eof<'de, D>(deserializer: D) -> Result<TokenKind, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    if raw < 0 {
        return Ok(TokenKind::EOF);
    }
    u16::try_from(raw).map(TokenKind).map_err(|_| {
        serde::de::Error::invalid_value(serde::de::Unexpected::Signed(raw), &"a token type id")
    })
}

fn signed_kind<S: Serializer>(kind: &TokenKind, serializer: S) -> Result<S::Ok, S::Error> {
    if *kind == TokenKind::EOF {
        serializer.serialize_i64(-1)
    } else {
        serializer.serialize_u16(kind.0)
    }
}

/// Negative ids mark "no enclosing production" in oracle dumps.
fn rule_or_none<'de, D>(deserializer: D) -> Result<Option<RuleId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.and_then(|id| u16::try_from(id).ok()).map(RuleId))
}

/// Builds one [`Eta`] per token of `tree`'s visible stream, in source order.
///
/// `symbolic_name` resolves a token kind to its vocabulary name; kinds outside the
/// vocabulary are named by their numeric id.
pub fn annotate<F>(tree: &ParseTree, symbolic_name: F) -> Vec<Eta>
where
    F: Fn(TokenKind) -> Option<&'static str>,
{
    tree.tokens()
        .iter()
        .enumerate()
        .map(|(index, token)| Eta {
            start: offset(token.span.start),
            stop: offset(token.span.stop),
            text: token.text.clone(),
            token_rule: token.kind,
            parent_rule: tree.parent_rule_of(index),
            symbolic_name: symbolic_name(token.kind)
                .map(str::to_string)
                .unwrap_or_else(|| token.kind.0.to_string()),
        })
        .collect()
}

fn offset(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

/// Highlighted Enriched Token Annotation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "HetaRecord")]
pub struct Heta {
    pub eta: Eta,
    pub hcode: HCode,
}

impl Heta {
    pub fn new(eta: Eta, hcode: HCode) -> Self {
        Self { eta, hcode }
    }

    pub fn color(&self) -> Option<&'static str> {
        self.hcode.color()
    }

    pub fn span(&self) -> Option<Span> {
        self.eta.span()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HetaRecord {
    eta: Eta,
    highlight_code: HCode,
}

impl From<HetaRecord> for Heta {
    fn from(record: HetaRecord) -> Self {
        Heta::new(record.eta, record.highlight_code)
    }
}

impl Serialize for Heta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.color().is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("Heta", fields)?;
        state.serialize_field("eta", &self.eta)?;
        state.serialize_field("highlightCode", &self.hcode)?;
        if let Some(color) = self.color() {
            state.serialize_field("highlightColor", color)?;
        }
        state.end()
    }
}
