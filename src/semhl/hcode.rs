//! Highlight categories
//!
//! The closed set of categories a character can be assigned. Ordinals are the wire
//! representation shared with oracle files, learned-model predictions and baseline
//! tools, so the discriminants below must never be reordered.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A highlight category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
#[repr(u8)]
pub enum HCode {
    Any = 0,
    Keyword = 1,
    Literal = 2,
    CharStringLiteral = 3,
    Comment = 4,
    ClassDeclarator = 5,
    FunctionDeclarator = 6,
    VariableDeclarator = 7,
    TypeIdentifier = 8,
    FunctionIdentifier = 9,
    FieldIdentifier = 10,
    AnnotationDeclarator = 11,
}

/// An ordinal that does not name any [`HCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown highlight code ordinal {0}")]
pub struct UnknownHCode(pub i64);

impl HCode {
    pub const ALL: [HCode; 12] = [
        HCode::Any,
        HCode::Keyword,
        HCode::Literal,
        HCode::CharStringLiteral,
        HCode::Comment,
        HCode::ClassDeclarator,
        HCode::FunctionDeclarator,
        HCode::VariableDeclarator,
        HCode::TypeIdentifier,
        HCode::FunctionIdentifier,
        HCode::FieldIdentifier,
        HCode::AnnotationDeclarator,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: i64) -> Result<Self, UnknownHCode> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or(UnknownHCode(ordinal))
    }

    /// Display color, `None` for [`HCode::Any`].
    ///
    /// Colors are presentation only; nothing in classification or scoring reads them.
    pub fn color(self) -> Option<&'static str> {
        match self {
            HCode::Any => None,
            HCode::Keyword => Some("#cc7832"),
            HCode::Literal => Some("#6897bb"),
            HCode::CharStringLiteral => Some("#6a8759"),
            HCode::Comment => Some("#808080"),
            HCode::ClassDeclarator => Some("#a9b7c6"),
            HCode::FunctionDeclarator => Some("#ffc66d"),
            HCode::VariableDeclarator => Some("#9876aa"),
            HCode::TypeIdentifier => Some("#4e9a06"),
            HCode::FunctionIdentifier => Some("#e8bf6a"),
            HCode::FieldIdentifier => Some("#b389c5"),
            HCode::AnnotationDeclarator => Some("#bbb529"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HCode::Any => "ANY",
            HCode::Keyword => "KEYWORD",
            HCode::Literal => "LITERAL",
            HCode::CharStringLiteral => "CHAR_STRING_LITERAL",
            HCode::Comment => "COMMENT",
            HCode::ClassDeclarator => "CLASS_DECLARATOR",
            HCode::FunctionDeclarator => "FUNCTION_DECLARATOR",
            HCode::VariableDeclarator => "VARIABLE_DECLARATOR",
            HCode::TypeIdentifier => "TYPE_IDENTIFIER",
            HCode::FunctionIdentifier => "FUNCTION_IDENTIFIER",
            HCode::FieldIdentifier => "FIELD_IDENTIFIER",
            HCode::AnnotationDeclarator => "ANNOTATION_DECLARATOR",
        }
    }
}

impl fmt::Display for HCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i64> for HCode {
    type Error = UnknownHCode;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_ordinal(value)
    }
}

impl From<HCode> for i64 {
    fn from(value: HCode) -> Self {
        i64::from(value.ordinal())
    }
}
