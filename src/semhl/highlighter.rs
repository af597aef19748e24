//! The classification pipeline
//!
//! A [`Highlighter`] runs both stages of the engine for one language: every token is
//! classified through the lexical table, then the override engine walks the tree and
//! its overrides are resolved onto the lexical base. The result is one [`Heta`] per
//! token of the visible stream, in source order.

pub use super::languages::Language;

use super::annotation::{annotate, Heta};
use super::grammatical::GrammaticalOverrideEngine;
use super::lexical::LexicalMode;
use super::overrides::resolve;
use super::syntax::{ParseFailure, ParseTree, SourceParser};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("source is empty")]
    EmptySource,
    #[error(transparent)]
    Parse(#[from] ParseFailure),
}

pub struct Highlighter {
    language: Language,
    mode: LexicalMode,
    engine: Box<dyn GrammaticalOverrideEngine + Send>,
}

impl Highlighter {
    /// A highlighter running `language` in its default lexical mode.
    pub fn new(language: Language) -> Self {
        Self::with_mode(language, language.default_mode())
    }

    pub fn with_mode(language: Language, mode: LexicalMode) -> Self {
        Self {
            language,
            mode,
            engine: language.engine(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn mode(&self) -> LexicalMode {
        self.mode
    }

    /// Lexical stage only.
    pub fn lexical(&self, tree: &ParseTree) -> Vec<Heta> {
        let language = self.language;
        let table = language.lexical_table();
        annotate(tree, |kind| language.token_name(kind))
            .into_iter()
            .map(|eta| table.classify(eta, self.mode))
            .collect()
    }

    /// Both stages over an already parsed file.
    pub fn classify(&mut self, tree: &ParseTree) -> Vec<Heta> {
        let base = self.lexical(tree);
        self.engine.reset();
        let overrides = self.engine.walk(tree);
        debug!(
            language = %self.language,
            tokens = base.len(),
            overrides = overrides.len(),
            "classified parse tree"
        );
        resolve(base, &overrides)
    }

    /// Parses `source` with `parser` and classifies it.
    pub fn classify_file(
        &mut self,
        source: &str,
        parser: &dyn SourceParser,
    ) -> Result<Vec<Heta>, HighlightError> {
        if source.is_empty() {
            return Err(HighlightError::EmptySource);
        }
        let tree = parser.parse(source)?;
        Ok(self.classify(&tree))
    }
}
