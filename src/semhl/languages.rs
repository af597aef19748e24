//! Supported languages
//!
//! Each language module declares its vocabulary (token kinds and productions), its
//! lexical table and its grammatical rule catalog. Parser adapters map their own ids
//! onto the vocabulary; ids outside it are legal and simply match nothing.

use super::grammatical::{GrammaticalOverrideEngine, OverrideEngine};
use super::lexical::{LexicalMode, LexicalTable};
use super::syntax::{RuleId, TokenKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a vocabulary enum whose variants number from zero in declaration order.
macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident => $id:ident { $($variant:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),*
                }
            }

            pub fn from_id(id: $id) -> Option<Self> {
                Self::ALL.get(usize::from(id.0)).copied()
            }
        }

        impl From<$name> for $id {
            fn from(value: $name) -> Self {
                $id(value as u16)
            }
        }
    };
}

pub mod cpp;
pub mod csharp;
pub mod javascript;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Cpp,
    CSharp,
    JavaScript,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Cpp, Language::CSharp, Language::JavaScript];

    pub fn name(self) -> &'static str {
        match self {
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::JavaScript => "javascript",
        }
    }

    /// Lexical mode used when configuration does not pick one.
    pub fn default_mode(self) -> LexicalMode {
        match self {
            Language::Cpp => LexicalMode::Plain,
            Language::CSharp => LexicalMode::Preprocessing,
            Language::JavaScript => LexicalMode::SemiLexical,
        }
    }

    pub fn lexical_table(self) -> &'static LexicalTable {
        match self {
            Language::Cpp => &cpp::LEXICAL,
            Language::CSharp => &csharp::LEXICAL,
            Language::JavaScript => &javascript::LEXICAL,
        }
    }

    /// A fresh override engine running this language's rule catalog.
    pub fn engine(self) -> Box<dyn GrammaticalOverrideEngine + Send> {
        match self {
            Language::Cpp => Box::new(OverrideEngine::new(cpp::CppRules)),
            Language::CSharp => Box::new(OverrideEngine::new(csharp::CSharpRules)),
            Language::JavaScript => Box::new(OverrideEngine::new(javascript::JavaScriptRules)),
        }
    }

    pub fn token_name(self, kind: TokenKind) -> Option<&'static str> {
        match self {
            Language::Cpp => cpp::Token::from_id(kind).map(cpp::Token::name),
            Language::CSharp => csharp::Token::from_id(kind).map(csharp::Token::name),
            Language::JavaScript => javascript::Token::from_id(kind).map(javascript::Token::name),
        }
    }

    pub fn rule_name(self, rule: RuleId) -> Option<&'static str> {
        match self {
            Language::Cpp => cpp::Rule::from_id(rule).map(cpp::Rule::name),
            Language::CSharp => csharp::Rule::from_id(rule).map(csharp::Rule::name),
            Language::JavaScript => javascript::Rule::from_id(rule).map(javascript::Rule::name),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpp" | "c++" => Ok(Language::Cpp),
            "csharp" | "c#" => Ok(Language::CSharp),
            "javascript" | "js" => Ok(Language::JavaScript),
            other => Err(format!(
                "unsupported language '{}', expected cpp, csharp or javascript",
                other
            )),
        }
    }
}
